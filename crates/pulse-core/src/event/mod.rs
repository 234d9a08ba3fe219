use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::host::HealthReport;

/// Host status events fired toward downstream subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    HostDown,
    HostUp,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HostDown => "HostDown",
            Self::HostUp => "HostUp",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payload of a host status event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStatusEvent {
    pub message: String,
    pub host_info: HealthReport,
}

impl HostStatusEvent {
    pub fn down(report: HealthReport) -> Self {
        Self {
            message: "Uptime test failed".to_string(),
            host_info: report,
        }
    }

    pub fn up(report: HealthReport) -> Self {
        Self {
            message: "Uptime test succeeded".to_string(),
            host_info: report,
        }
    }
}

/// Fire-and-forget event delivery. No ordering or delivery guarantee.
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    /// Fire an event on behalf of a tenant.
    async fn fire(&self, tenant_id: &str, kind: EventKind, payload: HostStatusEvent);
}
