use std::io;
use std::path::Path;

use super::{PlatformProbe, unix};
use crate::error::MetricError;
use crate::system::identity::SystemIdentity;
use crate::system::snapshot::{CpuCounterSnapshot, SessionRecord};

const PROC_STAT: &str = "/proc/stat";

pub struct Platform;

impl PlatformProbe for Platform {
    fn cpu_counters() -> Result<CpuCounterSnapshot, MetricError> {
        read_counters(Path::new(PROC_STAT))
    }

    fn sessions() -> Result<Vec<SessionRecord>, MetricError> {
        unix::sessions()
    }

    fn identity() -> Result<SystemIdentity, MetricError> {
        unix::identity()
    }

    fn peak_rss_kb() -> Result<u64, MetricError> {
        // Linux reports ru_maxrss in kilobytes already.
        unix::max_rss()
    }
}

/// A missing file means procfs is not mounted, which no retry will fix.
fn read_counters(path: &Path) -> Result<CpuCounterSnapshot, MetricError> {
    let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            MetricError::unavailable(format!("{} not found", path.display()))
        }
        _ => MetricError::query_failed(format!("failed to open {}: {e}", path.display())),
    })?;
    CpuCounterSnapshot::from_proc_stat(&contents)
}
