//! Error types for the task
//!
//! Configuration problems are caught before the first screen is drawn.
//! Terminal and data-log failures are fatal and bubble up to `main`.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum BartError {
    #[error("stimulus list has {stimuli} entries but threshold list has {thresholds}")]
    ConfigMismatch { stimuli: usize, thresholds: usize },
    #[error("invalid task configuration: {0}")]
    InvalidConfig(String),
    #[error("trial already finished")]
    TrialClosed,
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
    #[error("failed to write trial record: {0}")]
    Record(#[source] io::Error),
    #[error("failed to encode trial record: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type BartResult<T> = Result<T, BartError>;
