use std::str::FromStr;

use crate::error::MetricError;

/// Memory usage for one round, in GiB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemorySample {
    pub total_physical_gb: f64,
    pub used_physical_gb: f64,
    pub total_virtual_gb: f64,
    pub used_virtual_gb: f64,
}

/// Cumulative scheduler ticks since boot, taken from the aggregate `cpu` line
/// of `/proc/stat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuCounterSnapshot {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
}

/// What the CPU source hands back each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuReading {
    pub counters: CpuCounterSnapshot,
    pub core_count: i64,
}

/// A logged-in user session, as enumerated from the login records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub user: String,
    pub terminal_line: String,
    pub host: String,
}

impl CpuCounterSnapshot {
    const FIELDS: usize = 7;

    /// Ticks spent doing anything other than idling.
    pub fn busy(&self) -> u64 {
        self.user + self.nice + self.system + self.iowait + self.irq + self.softirq
    }

    /// Finds the aggregate `cpu` line in a full `/proc/stat` dump and parses it.
    pub fn from_proc_stat(contents: &str) -> Result<Self, MetricError> {
        contents
            .lines()
            .find(|line| line.split_whitespace().next() == Some("cpu"))
            .ok_or_else(|| MetricError::parse_failed("no aggregate cpu line in /proc/stat"))?
            .parse()
    }
}

impl FromStr for CpuCounterSnapshot {
    type Err = MetricError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("cpu") => {}
            Some(other) => {
                return Err(MetricError::parse_failed(format!(
                    "expected aggregate cpu line, found `{other}`"
                )));
            }
            None => return Err(MetricError::parse_failed("empty cpu line")),
        }

        // Newer kernels append steal/guest columns; only the first seven are used.
        let mut fields = [0u64; Self::FIELDS];
        for (i, slot) in fields.iter_mut().enumerate() {
            let token = tokens.next().ok_or_else(|| {
                MetricError::parse_failed(format!(
                    "expected {} cpu fields, found {i}",
                    Self::FIELDS
                ))
            })?;
            *slot = token.parse().map_err(|e| {
                MetricError::parse_failed(format!("invalid tick count `{token}`: {e}"))
            })?;
        }

        let [user, nice, system, idle, iowait, irq, softirq] = fields;
        Ok(CpuCounterSnapshot {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
        })
    }
}
