//! Domain error types.
//!
//! Families follow how the engine reacts to them: fetch failures skip the
//! dependent step for one tick, order rejections leave state untouched,
//! persistence failures propagate, notification failures are only logged.

/// Top-level error type for crossbot.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("failed to fetch {what}: {reason}")]
    Fetch { what: String, reason: String },

    #[error("{side} order rejected: {reason}")]
    OrderRejected { side: String, reason: String },

    #[error("persistence error: {reason}")]
    Persistence { reason: String },

    #[error("notification error: {reason}")]
    Notification { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BotError {
    pub fn fetch(what: impl Into<String>, reason: impl ToString) -> Self {
        BotError::Fetch {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    pub fn persistence(reason: impl ToString) -> Self {
        BotError::Persistence {
            reason: reason.to_string(),
        }
    }

    pub fn is_persistence(&self) -> bool {
        matches!(self, BotError::Persistence { .. })
    }
}

impl From<&BotError> for std::process::ExitCode {
    fn from(err: &BotError) -> Self {
        let code: u8 = match err {
            BotError::Io(_) => 1,
            BotError::ConfigParse { .. }
            | BotError::ConfigMissing { .. }
            | BotError::ConfigInvalid { .. } => 2,
            BotError::Persistence { .. } => 3,
            BotError::Fetch { .. } | BotError::OrderRejected { .. } => 4,
            BotError::Notification { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
