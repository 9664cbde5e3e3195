//! Error types for the profile bot.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Dialog error: {0}")]
    Dialog(#[from] DialogError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send response on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },

    #[error("Invalid message format: {0}")]
    InvalidMessage(String),
}

/// Dialog stack and flow errors.
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    #[error("Flow {0} is not registered")]
    UnknownFlow(String),

    #[error("Prompt {0} is not registered")]
    UnknownPrompt(String),

    #[error("Cannot begin {requested}: flow {active} is already active")]
    AlreadyActive { requested: String, active: String },

    #[error("Flow {flow} has no step {step}")]
    StepOutOfRange { flow: String, step: usize },

    #[error("Flow {flow} step {step} received unexpected input: {reason}")]
    InvalidStepInput {
        flow: String,
        step: usize,
        reason: String,
    },
}
