use std::sync::{Arc, Mutex};

use pulse_core::{
    EventSink, HealthReport, HostCheck, HostDescriptor, HostSet, InstanceId, LeaseStore,
    ProbeCallback, ProbeCallbacks, Prober, PulseConfig, PulseError, Purger, Result,
    ServerErrorPredicate, TenantRegistry,
};
use tokio::task::JoinHandle;

use super::tracker::HostStateTracker;
use super::tracking::{ActiveHostSet, TrackingBatch, TrackingSetBuilder};
use crate::analytics::{AnalyticsRecorder, PurgeLoop};
use crate::cluster::{LeaderConfig, LeaderElection, ProberLifecycle};

/// Facade wiring the poller election, host state tracking and uptime
/// analytics of one service instance.
///
/// Construct one per process (or several in tests) with
/// [`HostCheckManager::builder`].
pub struct HostCheckManager {
    config: PulseConfig,
    election: Arc<LeaderElection>,
    lifecycle: Arc<ProberLifecycle>,
    tracker: Arc<HostStateTracker>,
    recorder: Arc<AnalyticsRecorder>,
    tracking: TrackingSetBuilder,
    tenants: Arc<dyn TenantRegistry>,
    purger: Option<Arc<dyn Purger>>,
    callbacks: ProbeCallbacks,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl HostCheckManager {
    pub fn builder(config: PulseConfig) -> HostCheckManagerBuilder {
        HostCheckManagerBuilder::new(config)
    }

    pub fn instance_id(&self) -> InstanceId {
        self.election.instance_id()
    }

    pub fn config(&self) -> &PulseConfig {
        &self.config
    }

    /// Leadership as of the last election tick.
    pub fn is_leader(&self) -> bool {
        self.election.is_leader()
    }

    pub async fn is_prober_running(&self) -> bool {
        self.lifecycle.is_running().await
    }

    /// Hooks handed to the prober.
    pub fn callbacks(&self) -> &ProbeCallbacks {
        &self.callbacks
    }

    pub fn tracker(&self) -> &Arc<HostStateTracker> {
        &self.tracker
    }

    pub fn recorder(&self) -> &Arc<AnalyticsRecorder> {
        &self.recorder
    }

    /// Spawn the election loop and, with analytics on, the purge loop.
    ///
    /// Has no effect once [`HostCheckManager::stop`] has run.
    pub fn start(&self) {
        if !self.config.uptime.enabled {
            tracing::info!("Uptime tests disabled");
            return;
        }
        if self.election.is_stopped() {
            tracing::warn!("Host check manager was stopped and can't be restarted");
            return;
        }

        let mut tasks = match self.tasks.lock() {
            Ok(tasks) => tasks,
            Err(_) => {
                tracing::error!("Host check manager task list poisoned");
                return;
            }
        };
        if !tasks.is_empty() {
            tracing::debug!("Host check manager already started");
            return;
        }

        tracing::info!(instance_id = %self.instance_id(), "Starting host check manager");

        let election = self.election.clone();
        let lifecycle = self.lifecycle.clone();
        tasks.push(tokio::spawn(async move { election.run(lifecycle).await }));

        if self.config.uptime.enable_uptime_analytics {
            match &self.purger {
                Some(purger) => {
                    let purge = PurgeLoop::new(
                        purger.clone(),
                        self.config.analytics.purge_interval(),
                        self.election.leader_flag(),
                        self.election.shutdown_receiver(),
                    );
                    tasks.push(tokio::spawn(async move { purge.run().await }));
                }
                None => tracing::debug!("No purger configured, skipping analytics purge loop"),
            }
        }
    }

    /// Stop the background loops and the prober, waiting for them to finish.
    /// A stopped manager stays stopped; build a new one to resume checks.
    pub async fn stop(&self) {
        self.election.stop();
        let tasks: Vec<_> = match self.tasks.lock() {
            Ok(mut tasks) => tasks.drain(..).collect(),
            Err(_) => Vec::new(),
        };
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Host check task failed");
            }
        }
        tracing::info!("Host check manager stopped");
    }

    /// Whether the host of `url` is currently marked down.
    pub async fn is_host_down(&self, url: &str) -> bool {
        self.tracker.is_down(url).await
    }

    /// Build a descriptor for one configured check.
    pub fn prepare_tracking_host(
        &self,
        check: &HostCheck,
        tenant_id: &str,
    ) -> Result<HostDescriptor> {
        TrackingSetBuilder::prepare_descriptor(check, tenant_id)
    }

    /// Replace the active set with `descriptors`.
    pub async fn update_tracking_list(&self, descriptors: Vec<HostDescriptor>) -> Arc<HostSet> {
        self.tracking.rebuild_active_set(descriptors).await
    }

    /// Rebuild the active set from every tenant's configured checks.
    ///
    /// Malformed checks are skipped and reported in the returned batch.
    pub async fn load_tenant_checks(&self) -> TrackingBatch {
        tracing::info!("Loading uptime tests");
        let mut batch = TrackingBatch::default();
        for spec in self.tenants.list() {
            batch.extend(TrackingSetBuilder::prepare_batch(
                &spec.uptime.check_list,
                &spec.tenant_id,
            ));
        }

        self.update_tracking_list(batch.descriptors.clone()).await;
        batch
    }

    pub fn active_hosts(&self) -> Arc<HostSet> {
        self.tracking.active_set()
    }
}

/// Builder for [`HostCheckManager`].
pub struct HostCheckManagerBuilder {
    config: PulseConfig,
    instance_id: Option<InstanceId>,
    store: Option<Arc<dyn LeaseStore>>,
    prober: Option<Arc<dyn Prober>>,
    tenants: Option<Arc<dyn TenantRegistry>>,
    events: Option<Arc<dyn EventSink>>,
    purger: Option<Arc<dyn Purger>>,
    predicate: ServerErrorPredicate,
}

impl HostCheckManagerBuilder {
    pub fn new(config: PulseConfig) -> Self {
        Self {
            config,
            instance_id: None,
            store: None,
            prober: None,
            tenants: None,
            events: None,
            purger: None,
            predicate: ServerErrorPredicate::default(),
        }
    }

    /// Use a fixed identity instead of a fresh one.
    pub fn instance_id(mut self, id: InstanceId) -> Self {
        self.instance_id = Some(id);
        self
    }

    pub fn store(mut self, store: Arc<dyn LeaseStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn prober(mut self, prober: Arc<dyn Prober>) -> Self {
        self.prober = Some(prober);
        self
    }

    pub fn tenants(mut self, tenants: Arc<dyn TenantRegistry>) -> Self {
        self.tenants = Some(tenants);
        self
    }

    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn purger(mut self, purger: Arc<dyn Purger>) -> Self {
        self.purger = Some(purger);
        self
    }

    pub fn server_error_predicate(mut self, predicate: ServerErrorPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn build(self) -> Result<HostCheckManager> {
        self.config.validate()?;

        let store = self.store.ok_or_else(|| required("store"))?;
        let prober = self.prober.ok_or_else(|| required("prober"))?;
        let tenants = self.tenants.ok_or_else(|| required("tenant registry"))?;
        let events = self.events.ok_or_else(|| required("event sink"))?;
        let config = self.config;

        let tracker = Arc::new(HostStateTracker::new(
            store.clone(),
            tenants.clone(),
            events,
            config.uptime.failure_window(),
            config.uptime.host_key_prefix.clone(),
        ));
        let recorder = Arc::new(
            AnalyticsRecorder::new(
                store.clone(),
                tenants.clone(),
                config.analytics.collection.clone(),
            )
            .with_predicate(self.predicate),
        );
        let callbacks = probe_callbacks(
            tracker.clone(),
            recorder.clone(),
            config.uptime.enable_uptime_analytics,
        );

        let lifecycle = Arc::new(ProberLifecycle::new(
            prober,
            Arc::new(ActiveHostSet::new()),
            config.uptime.prober_settings(),
            callbacks.clone(),
        ));
        let election = Arc::new(LeaderElection::new(
            store,
            self.instance_id.unwrap_or_default(),
            LeaderConfig::from(&config.election),
        ));

        Ok(HostCheckManager {
            tracking: TrackingSetBuilder::new(lifecycle.clone()),
            config,
            election,
            lifecycle,
            tracker,
            recorder,
            tenants,
            purger: self.purger,
            callbacks,
            tasks: Mutex::new(Vec::new()),
        })
    }
}

fn required(what: &str) -> PulseError {
    PulseError::Config(format!("host check manager requires a {}", what))
}

/// Prober hooks. Each report is handled on its own spawned task: no ordering
/// between reports and no backpressure toward the prober.
fn probe_callbacks(
    tracker: Arc<HostStateTracker>,
    recorder: Arc<AnalyticsRecorder>,
    analytics_enabled: bool,
) -> ProbeCallbacks {
    let on_down: ProbeCallback = {
        let tracker = tracker.clone();
        Arc::new(move |report: HealthReport| {
            let tracker = tracker.clone();
            tokio::spawn(async move {
                tracker.mark_down(report).await;
            });
        })
    };

    let on_up: ProbeCallback = Arc::new(move |report: HealthReport| {
        let tracker = tracker.clone();
        tokio::spawn(async move {
            tracker.mark_up(report).await;
        });
    });

    let on_report: ProbeCallback = Arc::new(move |report: HealthReport| {
        if !analytics_enabled {
            return;
        }
        let recorder = recorder.clone();
        tokio::spawn(async move {
            let _ = recorder.record(&report).await;
        });
    });

    ProbeCallbacks {
        on_down,
        on_up,
        on_report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::memory::{MemoryLeaseStore, MemoryTenantRegistry};
    use crate::testing::{report_for, CountingPurger, MockProber, ProberCall, RecordingEventSink};
    use pulse_core::{EventKind, TenantSpec, UptimeRecord};

    struct Fixture {
        store: Arc<MemoryLeaseStore>,
        prober: Arc<MockProber>,
        events: Arc<RecordingEventSink>,
        purger: Arc<CountingPurger>,
        manager: HostCheckManager,
    }

    fn tenants() -> Arc<MemoryTenantRegistry> {
        Arc::new(MemoryTenantRegistry::from_specs([
            TenantSpec::new("t1", "org1").with_checks(vec![
                HostCheck::new("http://api.example.com/health"),
                HostCheck::new("http://google.com:3000/"),
            ]),
            TenantSpec::new("t2", "org2").with_checks(vec![
                HostCheck::new("http://other.example.com/"),
                HostCheck {
                    body: "!!!".into(),
                    ..HostCheck::new("http://broken.example.com/")
                },
            ]),
        ]))
    }

    fn fixture_with(store: Arc<MemoryLeaseStore>, analytics: bool) -> Fixture {
        let mut config = PulseConfig::default();
        config.uptime.enable_uptime_analytics = analytics;

        let prober = Arc::new(MockProber::new());
        let events = Arc::new(RecordingEventSink::new());
        let purger = Arc::new(CountingPurger::new());
        let manager = HostCheckManager::builder(config)
            .store(store.clone())
            .prober(prober.clone())
            .tenants(tenants())
            .events(events.clone())
            .purger(purger.clone())
            .build()
            .unwrap();

        Fixture {
            store,
            prober,
            events,
            purger,
            manager,
        }
    }

    fn fixture(analytics: bool) -> Fixture {
        fixture_with(Arc::new(MemoryLeaseStore::new()), analytics)
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let result = HostCheckManager::builder(PulseConfig::default())
            .store(Arc::new(MemoryLeaseStore::new()))
            .build();
        assert!(matches!(result, Err(PulseError::Config(_))));
    }

    #[tokio::test]
    async fn test_load_tenant_checks_skips_malformed() {
        let f = fixture(false);
        let batch = f.manager.load_tenant_checks().await;

        assert_eq!(batch.descriptors.len(), 3);
        assert_eq!(batch.errors.len(), 1);
        assert_eq!(f.manager.active_hosts().len(), 3);
        assert!(f.manager.active_hosts().contains_key("http://google.com:3000/"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_leader_runs_prober_with_active_set() {
        let f = fixture(false);
        f.manager.load_tenant_checks().await;
        f.manager.start();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(f.manager.is_leader());
        assert!(f.manager.is_prober_running().await);
        assert_eq!(f.prober.calls(), vec![ProberCall::Init(3), ProberCall::Start]);
        assert_eq!(f.prober.settings(), Some(f.manager.config().uptime.prober_settings()));

        // Hot reset rather than a restart.
        let descriptor = f
            .manager
            .prepare_tracking_host(&HostCheck::new("http://new.example.com/"), "t1")
            .unwrap();
        f.manager.update_tracking_list(vec![descriptor]).await;
        assert_eq!(f.prober.calls().last(), Some(&ProberCall::Reset(1)));
        assert_eq!(f.prober.hosts().len(), 1);

        f.manager.stop().await;
        assert_eq!(f.prober.calls().last(), Some(&ProberCall::Stop));
        assert!(!f.manager.is_leader());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reports_drive_state_events_and_analytics() {
        let f = fixture(true);
        f.manager.load_tenant_checks().await;
        f.manager.start();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let report = report_for("http://api.example.com/health", "t1");
        assert!(f.prober.emit_down(report.clone()));
        assert!(f.prober.emit_report(report.clone()));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(f.manager.is_host_down("http://api.example.com/anything").await);
        let records = f.store.collection("pulse-uptime-analytics").await;
        assert_eq!(records.len(), 1);
        let record = UptimeRecord::decode(&records[0]).unwrap();
        assert_eq!(record.org_id, "org1");

        assert!(f.prober.emit_up(report));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!f.manager.is_host_down("http://api.example.com/anything").await);

        let kinds: Vec<_> = f.events.events().into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::HostDown, EventKind::HostUp]);

        // The purge loop sees the leader flag by its next tick.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(f.purger.count() >= 1);
        f.manager.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_analytics_disabled_records_nothing() {
        let f = fixture(false);
        f.manager.start();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(f.prober.emit_report(report_for("http://api.example.com/", "t1")));
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(f.store.collection("pulse-uptime-analytics").await.is_empty());
        assert_eq!(f.purger.count(), 0);
        f.manager.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_leader_across_instances() {
        let store = Arc::new(MemoryLeaseStore::new());
        let a = fixture_with(store.clone(), false);
        let b = fixture_with(store.clone(), false);

        a.manager.start();
        tokio::time::sleep(Duration::from_secs(1)).await;
        b.manager.start();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(a.manager.is_leader());
        assert!(!b.manager.is_leader());
        assert!(b.prober.calls().is_empty());

        // A goes away; its lease lapses and B takes over within one TTL plus
        // one poll interval.
        a.manager.stop().await;
        tokio::time::sleep(Duration::from_secs(26)).await;
        assert!(b.manager.is_leader());
        assert!(b.manager.is_prober_running().await);
        b.manager.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_after_stop_is_rejected() {
        let f = fixture(false);
        f.manager.start();
        tokio::time::sleep(Duration::from_secs(1)).await;
        f.manager.stop().await;
        let calls = f.prober.calls();
        assert_eq!(calls.last(), Some(&ProberCall::Stop));

        f.manager.start();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(f.prober.calls(), calls);
        assert!(!f.manager.is_leader());
        assert!(!f.manager.is_prober_running().await);
        assert!(f.manager.tasks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_uptime_does_not_start() {
        let mut config = PulseConfig::default();
        config.uptime.enabled = false;
        let prober = Arc::new(MockProber::new());
        let manager = HostCheckManager::builder(config)
            .store(Arc::new(MemoryLeaseStore::new()))
            .prober(prober.clone())
            .tenants(tenants())
            .events(Arc::new(RecordingEventSink::new()))
            .build()
            .unwrap();

        manager.start();
        manager.stop().await;
        assert!(prober.calls().is_empty());
        assert!(!manager.is_leader());
    }
}
