use crate::error::MetricError;

use super::platform;

/// Static facts about the host, shown in the dashboard footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemIdentity {
    pub system_name: String,
    pub machine_name: String,
    pub version: String,
    pub release: String,
    pub architecture: String,
}

impl SystemIdentity {
    pub fn query() -> Result<Self, MetricError> {
        platform::identity()
    }
}

/// Peak resident set size of this process, in kilobytes.
pub fn self_memory_kb() -> Result<u64, MetricError> {
    platform::peak_rss_kb()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_query_does_not_panic() {
        if let Ok(identity) = SystemIdentity::query() {
            assert!(!identity.architecture.is_empty());
        }
    }

    #[test]
    fn self_memory_is_nonzero_when_available() {
        if let Ok(kb) = self_memory_kb() {
            assert!(kb > 0);
        }
    }
}
