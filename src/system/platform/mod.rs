use crate::error::MetricError;

use super::identity::SystemIdentity;
use super::snapshot::{CpuCounterSnapshot, SessionRecord};

/// OS-specific queries behind the metric sources.
///
/// Every call is a one-shot read of OS state with no caching, so it is safe
/// to invoke from any sampler thread.
pub trait PlatformProbe {
    fn cpu_counters() -> Result<CpuCounterSnapshot, MetricError>;
    fn sessions() -> Result<Vec<SessionRecord>, MetricError>;
    fn identity() -> Result<SystemIdentity, MetricError>;
    fn peak_rss_kb() -> Result<u64, MetricError>;
}

#[cfg(unix)]
mod unix;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "macos")]
use macos as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn cpu_counters() -> Result<CpuCounterSnapshot, MetricError> {
    platform_impl::Platform::cpu_counters()
}

pub fn sessions() -> Result<Vec<SessionRecord>, MetricError> {
    platform_impl::Platform::sessions()
}

pub fn identity() -> Result<SystemIdentity, MetricError> {
    platform_impl::Platform::identity()
}

pub fn peak_rss_kb() -> Result<u64, MetricError> {
    platform_impl::Platform::peak_rss_kb()
}
