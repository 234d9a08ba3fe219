use std::collections::HashMap;
use std::sync::RwLock;

use pulse_core::{PulseError, Result, TenantRegistry, TenantSpec};

/// Tenant registry held in process memory.
#[derive(Debug, Default)]
pub struct MemoryTenantRegistry {
    tenants: RwLock<HashMap<String, TenantSpec>>,
}

impl MemoryTenantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: impl IntoIterator<Item = TenantSpec>) -> Self {
        let registry = Self::new();
        for spec in specs {
            registry.insert(spec);
        }
        registry
    }

    /// Add or replace a tenant.
    pub fn insert(&self, spec: TenantSpec) {
        if let Ok(mut tenants) = self.tenants.write() {
            tenants.insert(spec.tenant_id.clone(), spec);
        }
    }

    pub fn remove(&self, tenant_id: &str) -> Option<TenantSpec> {
        self.tenants.write().ok()?.remove(tenant_id)
    }
}

impl TenantRegistry for MemoryTenantRegistry {
    fn lookup(&self, tenant_id: &str) -> Result<TenantSpec> {
        let tenants = self
            .tenants
            .read()
            .map_err(|_| PulseError::Lookup("tenant registry lock poisoned".into()))?;
        tenants
            .get(tenant_id)
            .cloned()
            .ok_or_else(|| PulseError::NotFound(format!("tenant {}", tenant_id)))
    }

    fn list(&self) -> Vec<TenantSpec> {
        self.tenants
            .read()
            .map(|t| t.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let registry = MemoryTenantRegistry::from_specs([TenantSpec::new("t1", "org1")]);
        assert_eq!(registry.lookup("t1").unwrap().org_id, "org1");
        assert!(registry.lookup("t2").unwrap_err().is_not_found());
    }

    #[test]
    fn test_insert_replaces() {
        let registry = MemoryTenantRegistry::new();
        registry.insert(TenantSpec::new("t1", "org1"));
        registry.insert(TenantSpec::new("t1", "org2"));
        assert_eq!(registry.list().len(), 1);
        assert_eq!(registry.lookup("t1").unwrap().org_id, "org2");

        assert!(registry.remove("t1").is_some());
        assert!(registry.list().is_empty());
    }
}
