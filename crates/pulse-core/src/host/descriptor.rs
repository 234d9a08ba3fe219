use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{META_HOST, META_TARGET_URL, META_TENANT_ID};

/// A single uptime check as configured on a tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostCheck {
    /// URL to probe.
    #[serde(rename = "url")]
    pub check_url: String,

    /// HTTP method, empty for the prober's default.
    #[serde(default)]
    pub method: String,

    /// Extra request headers.
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Base64-encoded request body.
    #[serde(default)]
    pub body: String,
}

impl HostCheck {
    /// A GET check against `url` with no headers or body.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            check_url: url.into(),
            ..Default::default()
        }
    }
}

/// A validated, addressable probe target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostDescriptor {
    /// Check URL; identity within the active set.
    pub check_url: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    /// Decoded request body.
    pub body: Option<Vec<u8>>,
    /// Always carries the target URL, tenant id and host authority.
    pub metadata: HashMap<String, String>,
}

impl HostDescriptor {
    /// Identity key within a [`HostSet`].
    pub fn id(&self) -> &str {
        &self.check_url
    }

    pub fn target_url(&self) -> &str {
        self.metadata
            .get(META_TARGET_URL)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn tenant_id(&self) -> &str {
        self.metadata
            .get(META_TENANT_ID)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn host_authority(&self) -> &str {
        self.metadata
            .get(META_HOST)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Probe targets keyed by check URL.
pub type HostSet = HashMap<String, HostDescriptor>;
