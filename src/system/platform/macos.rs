use super::{PlatformProbe, unix};
use crate::error::MetricError;
use crate::system::identity::SystemIdentity;
use crate::system::snapshot::{CpuCounterSnapshot, SessionRecord};

pub struct Platform;

impl PlatformProbe for Platform {
    fn cpu_counters() -> Result<CpuCounterSnapshot, MetricError> {
        // No /proc/stat here; the tick layout the aggregator expects is linux-only.
        Err(MetricError::unavailable(
            "cumulative cpu ticks are not exposed on macOS",
        ))
    }

    fn sessions() -> Result<Vec<SessionRecord>, MetricError> {
        unix::sessions()
    }

    fn identity() -> Result<SystemIdentity, MetricError> {
        unix::identity()
    }

    fn peak_rss_kb() -> Result<u64, MetricError> {
        // ru_maxrss is in bytes on macOS
        unix::max_rss().map(|bytes| bytes / 1024)
    }
}
