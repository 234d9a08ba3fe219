mod instance;

pub use instance::InstanceId;
