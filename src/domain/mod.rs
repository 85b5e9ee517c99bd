//! Core domain types and logic.
pub mod bar;
pub mod bot;
pub mod config_validation;
pub mod control;
pub mod crossover;
pub mod engine;
pub mod entry_policy;
pub mod error;
pub mod execution;
pub mod exit_policy;
pub mod indicator;
pub mod position;
pub mod price_history;
pub mod reconcile;
pub mod state;
pub mod strategy;
