use std::sync::Arc;

use chrono::{DateTime, Utc};
use pulse_core::{HealthReport, LeaseStore, ServerErrorPredicate, TenantRegistry, UptimeRecord};

/// Converts health reports into uptime records appended to a shared
/// collection.
pub struct AnalyticsRecorder {
    store: Arc<dyn LeaseStore>,
    tenants: Arc<dyn TenantRegistry>,
    collection: String,
    predicate: ServerErrorPredicate,
}

impl AnalyticsRecorder {
    pub fn new(
        store: Arc<dyn LeaseStore>,
        tenants: Arc<dyn TenantRegistry>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            tenants,
            collection: collection.into(),
            predicate: ServerErrorPredicate::default(),
        }
    }

    /// Override how response codes are classified as server errors.
    pub fn with_predicate(mut self, predicate: ServerErrorPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Build the record for a report as of `now`.
    ///
    /// An unknown tenant leaves the org empty and keeps the record forever.
    pub fn build_record(&self, report: &HealthReport, now: DateTime<Utc>) -> UptimeRecord {
        let (org_id, retention_secs) = match self.tenants.lookup(report.tenant_id()) {
            Ok(spec) => (spec.org_id, spec.uptime.expire_analytics_after_secs),
            Err(e) => {
                tracing::debug!(tenant_id = %report.tenant_id(), error = %e, "Recording uptime without org");
                (String::new(), 0)
            }
        };

        let mut record = UptimeRecord::from_report(report, org_id, self.predicate, now);
        record.set_expiry(retention_secs);
        record
    }

    /// Encode a report's record and append it to the collection.
    ///
    /// Failures are logged here; callers on the report path drop the result.
    pub async fn record(&self, report: &HealthReport) -> pulse_core::Result<()> {
        let record = self.build_record(report, Utc::now());

        let encoded = record.encode().map_err(|e| {
            tracing::error!(url = %report.check_url, error = %e, "Error encoding uptime data");
            e
        })?;

        self.store
            .append_to_collection(&self.collection, encoded)
            .await
            .map_err(|e| {
                tracing::error!(collection = %self.collection, error = %e, "Failed to store uptime data");
                e
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryLeaseStore, MemoryTenantRegistry};
    use crate::testing::{report_for, FailingLeaseStore};
    use chrono::Duration as ChronoDuration;
    use pulse_core::analytics::NEVER_EXPIRE;
    use pulse_core::TenantSpec;

    fn tenants() -> Arc<MemoryTenantRegistry> {
        Arc::new(MemoryTenantRegistry::from_specs([
            TenantSpec::new("t1", "org1").with_retention_secs(3600),
            TenantSpec::new("t2", "org2"),
        ]))
    }

    #[tokio::test]
    async fn test_record_appends_to_collection() {
        let store = Arc::new(MemoryLeaseStore::new());
        let recorder = AnalyticsRecorder::new(store.clone(), tenants(), "uptime");

        let mut report = report_for("http://api.example.com/", "t1");
        report.response_code = 503;
        recorder.record(&report).await.unwrap();

        let entries = store.collection("uptime").await;
        assert_eq!(entries.len(), 1);
        let record = UptimeRecord::decode(&entries[0]).unwrap();
        assert_eq!(record.org_id, "org1");
        assert_eq!(record.api_id, "t1");
        assert!(record.server_error);
        assert_eq!(record.expire_at, record.timestamp + ChronoDuration::hours(1));
    }

    #[tokio::test]
    async fn test_oversized_retention_still_records() {
        let store = Arc::new(MemoryLeaseStore::new());
        let tenants = Arc::new(MemoryTenantRegistry::from_specs([
            TenantSpec::new("t1", "org1").with_retention_secs(10_000_000_000_000),
            TenantSpec::new("t2", "org2").with_retention_secs(i64::MAX),
        ]));
        let recorder = AnalyticsRecorder::new(store.clone(), tenants, "uptime");

        recorder.record(&report_for("http://a.example.com/", "t1")).await.unwrap();
        recorder.record(&report_for("http://b.example.com/", "t2")).await.unwrap();

        let entries = store.collection("uptime").await;
        assert_eq!(entries.len(), 2);
        for entry in &entries {
            let record = UptimeRecord::decode(entry).unwrap();
            assert_eq!(record.expire_at, record.timestamp + NEVER_EXPIRE);
        }
    }

    #[test]
    fn test_zero_retention_is_effectively_never() {
        let recorder =
            AnalyticsRecorder::new(Arc::new(MemoryLeaseStore::new()), tenants(), "uptime");
        let now = Utc::now();
        let record = recorder.build_record(&report_for("http://a.example.com/", "t2"), now);
        assert!(record.expire_at > now + ChronoDuration::days(365 * 10));
    }

    #[test]
    fn test_unknown_tenant_leaves_org_empty() {
        let recorder =
            AnalyticsRecorder::new(Arc::new(MemoryLeaseStore::new()), tenants(), "uptime");
        let now = Utc::now();
        let record = recorder.build_record(&report_for("http://a.example.com/", "nobody"), now);
        assert_eq!(record.org_id, "");
        assert!(record.expire_at > now + ChronoDuration::days(365 * 10));
    }

    #[test]
    fn test_custom_predicate() {
        let recorder =
            AnalyticsRecorder::new(Arc::new(MemoryLeaseStore::new()), tenants(), "uptime")
                .with_predicate(ServerErrorPredicate::HTTP_ERROR);
        let mut report = report_for("http://a.example.com/", "t1");
        report.response_code = 302;
        assert!(!recorder.build_record(&report, Utc::now()).server_error);
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let recorder = AnalyticsRecorder::new(Arc::new(FailingLeaseStore), tenants(), "uptime");
        let result = recorder.record(&report_for("http://a.example.com/", "t1")).await;
        assert!(result.is_err());
    }
}
