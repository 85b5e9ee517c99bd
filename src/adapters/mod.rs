//! Concrete adapter implementations for ports.

pub mod alpaca_adapter;
pub mod file_config_adapter;
pub mod notifier;
#[cfg(feature = "sqlite")]
pub mod sqlite_adapter;
#[cfg(feature = "web")]
pub mod web;
