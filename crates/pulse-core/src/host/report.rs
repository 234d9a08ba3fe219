use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{META_HOST, META_TENANT_ID};

/// Outcome of one probe, as emitted by the prober.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub check_url: String,
    pub latency: Duration,
    pub response_code: u16,
    pub is_tcp_error: bool,
    /// Copied from the probed [`HostDescriptor`](super::HostDescriptor).
    pub metadata: HashMap<String, String>,
}

impl HealthReport {
    pub fn host_authority(&self) -> &str {
        self.metadata
            .get(META_HOST)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn tenant_id(&self) -> &str {
        self.metadata
            .get(META_TENANT_ID)
            .map(String::as_str)
            .unwrap_or_default()
    }
}
