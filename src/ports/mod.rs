//! Port traits the domain depends on; adapters implement them.

pub mod broker_port;
pub mod config_port;
pub mod notify_port;
pub mod state_port;
