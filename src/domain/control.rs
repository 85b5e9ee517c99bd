//! Start/stop flag, latest status line, and the activity log.
//!
//! Shared between the tick loop and any read-only surface, so every field is
//! independently synchronized and cheap to read.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

/// Activity log capacity; older entries fall off the end.
pub const ACTIVITY_LOG_CAPACITY: usize = 20;

pub const STOPPED_STATUS: &str = "STOPPED";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
}

/// Newest-first ring buffer.
#[derive(Debug, Default)]
pub struct ActivityLog {
    entries: Mutex<VecDeque<LogEntry>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp: Local::now(),
            message: message.into(),
        };
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.push_front(entry);
        entries.truncate(ACTIVITY_LOG_CAPACITY);
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

#[derive(Debug)]
pub struct BotControl {
    running: AtomicBool,
    status: RwLock<String>,
    log: ActivityLog,
}

impl Default for BotControl {
    fn default() -> Self {
        BotControl {
            running: AtomicBool::new(false),
            status: RwLock::new(STOPPED_STATUS.to_string()),
            log: ActivityLog::new(),
        }
    }
}

impl BotControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        self.write_status("RUNNING");
        tracing::info!("bot started");
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.write_status(STOPPED_STATUS);
        tracing::info!("bot stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ignored while stopped.
    pub fn set_status(&self, message: impl Into<String>) {
        if !self.is_running() {
            return;
        }
        self.write_status(message);
    }

    pub fn status(&self) -> String {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn append_log(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "activity");
        self.log.append(message);
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.log.entries()
    }

    fn write_status(&self, message: impl Into<String>) {
        *self.status.write().unwrap_or_else(PoisonError::into_inner) = message.into();
    }
}
