//! Error types for rhetor operations.
//!
//! Defines error types for the major subsystems:
//! - LLM gateway calls (connectivity vs. everything else)
//! - Debate orchestration (fatal setup failures)
//! - Conversation record persistence

use thiserror::Error;

/// Errors that can occur during LLM gateway operations.
///
/// `ConnectionFailed` is kept distinct from the other variants so callers can
/// tell "backend unreachable" apart from "backend answered badly". Neither is
/// allowed to escape the orchestration core as a panic; every caller has a
/// defined degraded outcome.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Could not connect to the text-generation backend: {0}")]
    ConnectionFailed(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("Failed to parse backend response: {0}")]
    ParseError(String),

    #[error("Backend returned an empty response")]
    EmptyResponse,
}

impl LlmError {
    /// True when the backend could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::ConnectionFailed(_))
    }
}

/// Errors that can occur while driving a debate.
///
/// Only the SETUP phase can fail the run: a topic or persona stage failure
/// happens before any turn is executed. RUNNING failures truncate the
/// exchange instead, and FINALIZING is best-effort by construction.
#[derive(Debug, Error)]
pub enum DebateError {
    #[error("Debate setup failed: {0}")]
    SetupFailed(String),
}

impl From<LlmError> for DebateError {
    fn from(err: LlmError) -> Self {
        DebateError::SetupFailed(err.to_string())
    }
}

/// Errors that can occur while saving or loading conversation records.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Conversation record not found: {0}")]
    NotFound(String),
}
