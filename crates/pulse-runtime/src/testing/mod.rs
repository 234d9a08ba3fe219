//! Test doubles for the collaborator traits.

mod mock;

pub use mock::{
    report_for, CountingPurger, FailingLeaseStore, MockProber, ProberCall, RecordingEventSink,
};
