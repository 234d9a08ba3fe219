use serde::{Deserialize, Serialize};

use crate::host::HostCheck;
use crate::Result;

/// Uptime test settings of one tenant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UptimeTests {
    /// Checks to run against this tenant's upstreams.
    #[serde(default)]
    pub check_list: Vec<HostCheck>,

    /// Retention of uptime records in seconds; `0` keeps them indefinitely.
    #[serde(default)]
    pub expire_analytics_after_secs: i64,
}

/// A tenant (API) as known to the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantSpec {
    pub tenant_id: String,
    pub org_id: String,
    #[serde(default)]
    pub uptime: UptimeTests,
}

impl TenantSpec {
    pub fn new(tenant_id: impl Into<String>, org_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            org_id: org_id.into(),
            uptime: UptimeTests::default(),
        }
    }

    pub fn with_checks(mut self, checks: Vec<HostCheck>) -> Self {
        self.uptime.check_list = checks;
        self
    }

    pub fn with_retention_secs(mut self, secs: i64) -> Self {
        self.uptime.expire_analytics_after_secs = secs;
        self
    }
}

/// Resolves tenant ids to their owning organization and configuration.
pub trait TenantRegistry: Send + Sync + 'static {
    /// Look up a tenant, failing with `NotFound` for unknown ids.
    fn lookup(&self, tenant_id: &str) -> Result<TenantSpec>;

    /// Every registered tenant.
    fn list(&self) -> Vec<TenantSpec>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_builder() {
        let spec = TenantSpec::new("t1", "org1")
            .with_checks(vec![HostCheck::new("http://a.example.com/")])
            .with_retention_secs(60);

        assert_eq!(spec.tenant_id, "t1");
        assert_eq!(spec.org_id, "org1");
        assert_eq!(spec.uptime.check_list.len(), 1);
        assert_eq!(spec.uptime.expire_analytics_after_secs, 60);
    }

    #[test]
    fn test_parse_check_list() {
        let json = r#"{
            "tenant_id": "t1",
            "org_id": "o1",
            "uptime": {
                "check_list": [
                    { "url": "http://google.com:3000/" },
                    {
                        "url": "http://posttestserver.com/post.php",
                        "method": "POST",
                        "headers": { "this": "that" },
                        "body": "VEhJUyBJUyBBIEJPRFk="
                    }
                ]
            }
        }"#;

        let spec: TenantSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.uptime.check_list.len(), 2);
        assert_eq!(spec.uptime.check_list[1].method, "POST");
        assert_eq!(spec.uptime.expire_analytics_after_secs, 0);
    }
}
