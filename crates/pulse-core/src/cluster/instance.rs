use uuid::Uuid;

/// Process-lifetime identity of one service instance.
///
/// Generated once at startup and used as the owner token of the poller lease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(pub Uuid);

impl InstanceId {
    /// Generate a new random instance ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the inner UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Whether a lease value read back from the store names this instance.
    pub fn owns(&self, lease_value: &str) -> bool {
        Uuid::parse_str(lease_value)
            .map(|v| v == self.0)
            .unwrap_or(false)
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_id_generation() {
        let id1 = InstanceId::new();
        let id2 = InstanceId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_owns_lease_value() {
        let id = InstanceId::new();
        assert!(id.owns(&id.to_string()));
        assert!(!id.owns(&InstanceId::new().to_string()));
        assert!(!id.owns("garbage"));
    }
}
