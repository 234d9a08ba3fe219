//! Uptime analytics recording and retention purging.

mod purge;
mod recorder;

pub use purge::PurgeLoop;
pub use recorder::AnalyticsRecorder;
