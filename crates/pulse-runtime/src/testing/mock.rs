use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pulse_core::host::{
    best_effort_authority, host_authority, META_HOST, META_TARGET_URL, META_TENANT_ID,
};
use pulse_core::{
    EventKind, EventSink, HealthReport, HostSet, HostStatusEvent, LeaseStore, ProbeCallbacks,
    Prober, ProberSettings, PulseError, Purger, Result,
};
use url::Url;

use crate::memory::FiredEvent;

/// A call received by [`MockProber`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProberCall {
    /// Init with this many hosts.
    Init(usize),
    Start,
    Stop,
    /// Host set reset to this many hosts.
    Reset(usize),
}

/// Prober that records calls and lets tests emit reports through the
/// registered callbacks.
#[derive(Default)]
pub struct MockProber {
    calls: Mutex<Vec<ProberCall>>,
    settings: Mutex<Option<ProberSettings>>,
    hosts: Mutex<HostSet>,
    callbacks: Mutex<Option<ProbeCallbacks>>,
}

impl MockProber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks that discard every report.
    pub fn noop_callbacks() -> ProbeCallbacks {
        ProbeCallbacks {
            on_down: Arc::new(|_| {}),
            on_up: Arc::new(|_| {}),
            on_report: Arc::new(|_| {}),
        }
    }

    pub fn calls(&self) -> Vec<ProberCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn settings(&self) -> Option<ProberSettings> {
        self.settings.lock().ok().and_then(|s| *s)
    }

    /// Host set as last passed to init or reset.
    pub fn hosts(&self) -> HostSet {
        self.hosts.lock().map(|h| h.clone()).unwrap_or_default()
    }

    /// Deliver a report through `on_down`. Returns false before init.
    pub fn emit_down(&self, report: HealthReport) -> bool {
        self.emit(report, |c| c.on_down.clone())
    }

    pub fn emit_up(&self, report: HealthReport) -> bool {
        self.emit(report, |c| c.on_up.clone())
    }

    pub fn emit_report(&self, report: HealthReport) -> bool {
        self.emit(report, |c| c.on_report.clone())
    }

    fn emit(
        &self,
        report: HealthReport,
        pick: impl FnOnce(&ProbeCallbacks) -> pulse_core::ProbeCallback,
    ) -> bool {
        let callback = match self.callbacks.lock() {
            Ok(guard) => guard.as_ref().map(pick),
            Err(_) => None,
        };
        match callback {
            Some(callback) => {
                callback(report);
                true
            }
            None => false,
        }
    }

    fn push(&self, call: ProberCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl Prober for MockProber {
    async fn init(&self, settings: ProberSettings, hosts: HostSet, callbacks: ProbeCallbacks) {
        self.push(ProberCall::Init(hosts.len()));
        if let Ok(mut s) = self.settings.lock() {
            *s = Some(settings);
        }
        if let Ok(mut h) = self.hosts.lock() {
            *h = hosts;
        }
        if let Ok(mut c) = self.callbacks.lock() {
            *c = Some(callbacks);
        }
    }

    async fn start(&self) {
        self.push(ProberCall::Start);
    }

    async fn stop(&self) {
        self.push(ProberCall::Stop);
    }

    async fn reset_host_set(&self, hosts: HostSet) {
        self.push(ProberCall::Reset(hosts.len()));
        if let Ok(mut h) = self.hosts.lock() {
            *h = hosts;
        }
    }
}

/// Event sink that keeps every fired event.
#[derive(Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<FiredEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<FiredEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn fire(&self, tenant_id: &str, kind: EventKind, payload: HostStatusEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(FiredEvent {
                tenant_id: tenant_id.to_string(),
                kind,
                payload,
            });
        }
    }
}

/// Purger that counts invocations.
#[derive(Default)]
pub struct CountingPurger {
    count: AtomicUsize,
}

impl CountingPurger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Purger for CountingPurger {
    async fn purge(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Store whose every operation fails.
pub struct FailingLeaseStore;

#[async_trait]
impl LeaseStore for FailingLeaseStore {
    async fn get(&self, _key: &str) -> Result<String> {
        Err(PulseError::Store("store unavailable".into()))
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        Err(PulseError::Store("store unavailable".into()))
    }

    async fn set_if_absent(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<bool> {
        Err(PulseError::Store("store unavailable".into()))
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(PulseError::Store("store unavailable".into()))
    }

    async fn append_to_collection(&self, _name: &str, _entry: Vec<u8>) -> Result<()> {
        Err(PulseError::Store("store unavailable".into()))
    }
}

/// A successful 200 report for `url` owned by `tenant_id`.
pub fn report_for(url: &str, tenant_id: &str) -> HealthReport {
    let host = Url::parse(url)
        .map(|u| host_authority(&u))
        .unwrap_or_else(|_| best_effort_authority(url));

    HealthReport {
        check_url: url.to_string(),
        latency: Duration::from_millis(25),
        response_code: 200,
        is_tcp_error: false,
        metadata: HashMap::from([
            (META_TARGET_URL.to_string(), url.to_string()),
            (META_TENANT_ID.to_string(), tenant_id.to_string()),
            (META_HOST.to_string(), host),
        ]),
    }
}
