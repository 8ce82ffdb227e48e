use std::io;

/// Failure of a single metric source for one round.
///
/// These never escape the round that produced them: the panel fed by the
/// failing source is rendered degraded and every other panel carries on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricError {
    #[error("query failed: {0}")]
    QueryFailed(String),

    #[error("parse failed: {0}")]
    ParseFailed(String),

    #[error("unavailable: {0}")]
    Unavailable(String),
}

impl MetricError {
    pub(crate) fn query_failed<S: Into<String>>(msg: S) -> Self {
        MetricError::QueryFailed(msg.into())
    }

    pub(crate) fn parse_failed<S: Into<String>>(msg: S) -> Self {
        MetricError::ParseFailed(msg.into())
    }

    pub(crate) fn unavailable<S: Into<String>>(msg: S) -> Self {
        MetricError::Unavailable(msg.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("history buffer overflow: round {round} exceeds capacity {capacity}")]
    BufferOverflow { capacity: usize, round: usize },

    #[error("history slot {round} written out of order (next slot is {expected})")]
    OutOfOrder { expected: usize, round: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum GovernorError {
    #[error("signal delivered while waiting for exit confirmation")]
    SignalRaceDuringConfirm,

    #[error("operator input closed while waiting for exit confirmation")]
    InputClosed,

    #[error("failed to write prompt: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("number of samples must be between 1 and {max}, got {got}")]
    SampleCount { got: usize, max: usize },
}

/// Errors that end the whole run.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("failed to spawn {source_name} sampler: {error}")]
    Spawn {
        source_name: &'static str,
        error: io::Error,
    },

    #[error("failed to install signal handlers: {0}")]
    SignalSetup(io::Error),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Governor(#[from] GovernorError),

    #[error("failed to write dashboard: {0}")]
    Display(#[from] io::Error),
}
