use tracing::{debug, trace};

use crate::system::snapshot::{CpuCounterSnapshot, MemorySample};

/// Guards the utilization ratio when two snapshots land in the same tick.
const TICK_EPSILON: f64 = 1e-6;

/// Counters carried from one round to the next.
///
/// `previous_total_ticks` holds only the non-idle sum; idle is kept apart so
/// the next round can rebuild the previous grand total as `total + idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollingCpuState {
    pub previous_total_ticks: u64,
    pub previous_idle_ticks: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RollingMemoryState {
    pub previous_used_gb: f64,
    pub has_previous: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaSign {
    PositiveOrZero,
    Negative,
}

/// A memory sample together with its change since the previous round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemoryReading {
    pub used_physical_gb: f64,
    pub total_physical_gb: f64,
    pub used_virtual_gb: f64,
    pub total_virtual_gb: f64,
    pub delta_abs: f64,
    pub delta_sign: DeltaSign,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuUtilization {
    /// Always within `[0, 100]`.
    pub percent_used: f64,
    pub core_count: i64,
}

impl RollingCpuState {
    pub fn from_snapshot(snapshot: &CpuCounterSnapshot) -> Self {
        Self {
            previous_total_ticks: snapshot.busy(),
            previous_idle_ticks: snapshot.idle,
        }
    }

    /// Utilization of `snapshot` relative to this state, without advancing it.
    pub fn utilization(&self, snapshot: &CpuCounterSnapshot) -> f64 {
        let total_cur = snapshot.idle as f64 + snapshot.busy() as f64;
        let total_prev = self.previous_total_ticks as f64 + self.previous_idle_ticks as f64;
        let total_delta = total_cur - total_prev;
        let idle_delta = snapshot.idle as f64 - self.previous_idle_ticks as f64;

        if total_delta == 0.0 {
            return 0.0;
        }

        let raw = ((1000.0 * (total_delta - idle_delta) / (total_delta + TICK_EPSILON) + 1.0)
            / 10.0)
            .abs();
        raw.clamp(0.0, 100.0)
    }
}

impl RollingMemoryState {
    pub fn advance(&mut self, sample: &MemorySample) -> MemoryReading {
        let current = sample.used_physical_gb;
        if !self.has_previous {
            self.previous_used_gb = current;
            self.has_previous = true;
        }

        let diff = current - self.previous_used_gb;
        self.previous_used_gb = current;

        MemoryReading {
            used_physical_gb: sample.used_physical_gb,
            total_physical_gb: sample.total_physical_gb,
            used_virtual_gb: sample.used_virtual_gb,
            total_virtual_gb: sample.total_virtual_gb,
            delta_abs: diff.abs(),
            delta_sign: if diff >= 0.0 {
                DeltaSign::PositiveOrZero
            } else {
                DeltaSign::Negative
            },
        }
    }
}

/// Turns raw per-round readings into deltas and rates.
///
/// Owned by the coordinator's thread of control; sampler threads never see it.
#[derive(Debug, Default)]
pub struct RateAggregator {
    cpu: Option<RollingCpuState>,
    memory: RollingMemoryState,
}

impl RateAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Establishes the CPU baseline before the first round.
    pub fn seed(&mut self, snapshot: &CpuCounterSnapshot) {
        let state = RollingCpuState::from_snapshot(snapshot);
        debug!(
            total = state.previous_total_ticks,
            idle = state.previous_idle_ticks,
            "cpu baseline seeded"
        );
        self.cpu = Some(state);
    }

    pub fn is_seeded(&self) -> bool {
        self.cpu.is_some()
    }

    pub fn cpu_state(&self) -> Option<RollingCpuState> {
        self.cpu
    }

    pub fn memory_state(&self) -> RollingMemoryState {
        self.memory
    }

    pub fn update_memory(&mut self, sample: &MemorySample) -> MemoryReading {
        let reading = self.memory.advance(sample);
        trace!(
            used_gb = reading.used_physical_gb,
            delta = reading.delta_abs,
            "memory updated"
        );
        reading
    }

    /// Computes utilization since the previous snapshot and advances the
    /// baseline. An unseeded aggregator seeds itself and reports zero.
    pub fn update_cpu(&mut self, snapshot: &CpuCounterSnapshot, core_count: i64) -> CpuUtilization {
        let percent_used = match self.cpu {
            Some(previous) => previous.utilization(snapshot),
            None => {
                debug!("cpu baseline missing, seeding from this round");
                0.0
            }
        };
        self.cpu = Some(RollingCpuState::from_snapshot(snapshot));
        trace!(percent_used, "cpu updated");

        CpuUtilization {
            percent_used,
            core_count,
        }
    }
}
