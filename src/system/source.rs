use sysinfo::{CpuRefreshKind, RefreshKind, System};

use super::platform;
use super::snapshot::{CpuReading, MemorySample, SessionRecord};
use crate::error::MetricError;
use crate::format::bytes_to_gib;

/// One blocking OS query producing a typed reading.
///
/// Sources hold no mutable state: every call is an independent read, which is
/// what lets the coordinator run all of them on their own threads each round.
pub trait MetricSource: Send + Sync + 'static {
    type Output: Send + 'static;

    /// Short name used for thread names and log fields.
    const NAME: &'static str;

    fn sample(&self) -> Result<Self::Output, MetricError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct MemorySource;

#[derive(Debug, Default, Clone, Copy)]
pub struct CpuSource;

#[derive(Debug, Default, Clone, Copy)]
pub struct SessionSource;

impl MetricSource for MemorySource {
    type Output = MemorySample;
    const NAME: &'static str = "memory";

    fn sample(&self) -> Result<MemorySample, MetricError> {
        let mut sys = System::new();
        sys.refresh_memory();

        let total = sys.total_memory();
        if total == 0 {
            return Err(MetricError::query_failed("total physical memory reported as 0"));
        }
        let used = total.saturating_sub(sys.free_memory());
        let swap_total = sys.total_swap();
        let swap_used = swap_total.saturating_sub(sys.free_swap());

        Ok(MemorySample {
            total_physical_gb: bytes_to_gib(total),
            used_physical_gb: bytes_to_gib(used),
            total_virtual_gb: bytes_to_gib(total + swap_total),
            used_virtual_gb: bytes_to_gib(used + swap_used),
        })
    }
}

impl MetricSource for CpuSource {
    type Output = CpuReading;
    const NAME: &'static str = "cpu";

    fn sample(&self) -> Result<CpuReading, MetricError> {
        let counters = platform::cpu_counters()?;
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()),
        );
        let core_count = match sys.cpus().len() {
            0 => return Err(MetricError::query_failed("no online cpus reported")),
            n => n as i64,
        };
        Ok(CpuReading {
            counters,
            core_count,
        })
    }
}

impl MetricSource for SessionSource {
    type Output = Vec<SessionRecord>;
    const NAME: &'static str = "sessions";

    fn sample(&self) -> Result<Vec<SessionRecord>, MetricError> {
        platform::sessions()
    }
}
