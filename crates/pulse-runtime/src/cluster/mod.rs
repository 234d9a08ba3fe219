mod leader;
mod lifecycle;

pub use leader::{LeaderConfig, LeaderElection};
pub use lifecycle::ProberLifecycle;
