use sysinfo::{ProcessesToUpdate, System};

use super::PlatformProbe;
use crate::error::MetricError;
use crate::system::identity::SystemIdentity;
use crate::system::snapshot::{CpuCounterSnapshot, SessionRecord};

pub struct Platform;

impl PlatformProbe for Platform {
    fn cpu_counters() -> Result<CpuCounterSnapshot, MetricError> {
        Err(MetricError::unavailable(
            "cumulative cpu ticks are not exposed on Windows",
        ))
    }

    fn sessions() -> Result<Vec<SessionRecord>, MetricError> {
        Err(MetricError::unavailable(
            "login records are not available on Windows",
        ))
    }

    fn identity() -> Result<SystemIdentity, MetricError> {
        let unknown = || "unknown".to_string();
        Ok(SystemIdentity {
            system_name: System::name().unwrap_or_else(unknown),
            machine_name: System::host_name().unwrap_or_else(unknown),
            version: System::os_version().unwrap_or_else(unknown),
            release: System::kernel_version().unwrap_or_else(unknown),
            architecture: std::env::consts::ARCH.to_string(),
        })
    }

    fn peak_rss_kb() -> Result<u64, MetricError> {
        let pid = sysinfo::get_current_pid().map_err(MetricError::query_failed)?;
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        sys.process(pid)
            .map(|process| process.memory() / 1024)
            .ok_or_else(|| MetricError::query_failed("current process not found"))
    }
}
