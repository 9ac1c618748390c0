//! Events emitted while a debate runs.
//!
//! The driver never prints; it reports progress through these events over an
//! mpsc channel, and the presentation side renders them however it likes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::personas::Persona;

/// Structured progress notifications from the debate driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DebateEvent {
    /// A topic was chosen (user-supplied or generated).
    TopicSelected {
        /// The debated topic.
        topic: String,
        /// When the topic was fixed.
        timestamp: DateTime<Utc>,
    },
    /// Both personas are ready and their system prompts are built.
    PersonasReady {
        /// The agent that opens the debate.
        first: Persona,
        /// The opposing agent.
        second: Persona,
        /// When setup finished.
        timestamp: DateTime<Utc>,
    },
    /// A turn is about to be generated.
    TurnStarted {
        /// 1-based turn number.
        turn: u32,
        /// Who is speaking.
        speaker: String,
        /// When the turn started.
        timestamp: DateTime<Utc>,
    },
    /// A turn's first generation attempt failed; retrying once.
    TurnRetried {
        /// 1-based turn number.
        turn: u32,
        /// Who is speaking.
        speaker: String,
        /// When the retry was issued.
        timestamp: DateTime<Utc>,
    },
    /// A turn completed and was appended to the transcript.
    TurnCompleted {
        /// 1-based turn number.
        turn: u32,
        /// Who spoke.
        speaker: String,
        /// The normalized message.
        message: String,
        /// When the turn completed.
        timestamp: DateTime<Utc>,
    },
    /// Generation failed twice; the exchange stops early.
    ExchangeTruncated {
        /// Turns completed before the abort.
        completed_turns: usize,
        /// When the exchange was cut short.
        timestamp: DateTime<Utc>,
    },
    /// The post-hoc summary is available.
    SummaryReady {
        /// The generated summary.
        summary: String,
        /// When the summary arrived.
        timestamp: DateTime<Utc>,
    },
    /// The adjudicator picked a winner.
    WinnerDeclared {
        /// The winning agent's name.
        winner: String,
        /// The adjudicator's rationale.
        reason: String,
        /// When the verdict arrived.
        timestamp: DateTime<Utc>,
    },
    /// The run is finished and the record is built.
    DebateCompleted {
        /// Completed turns.
        total_turns: usize,
        /// Characters across all messages.
        total_characters: usize,
        /// Whether the exchange was cut short.
        truncated: bool,
        /// When the run finished.
        timestamp: DateTime<Utc>,
    },
}

impl DebateEvent {
    /// Creates a TopicSelected event.
    pub fn topic_selected(topic: impl Into<String>) -> Self {
        Self::TopicSelected {
            topic: topic.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a PersonasReady event.
    pub fn personas_ready(first: Persona, second: Persona) -> Self {
        Self::PersonasReady {
            first,
            second,
            timestamp: Utc::now(),
        }
    }

    /// Creates a TurnStarted event.
    pub fn turn_started(turn: u32, speaker: impl Into<String>) -> Self {
        Self::TurnStarted {
            turn,
            speaker: speaker.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a TurnRetried event.
    pub fn turn_retried(turn: u32, speaker: impl Into<String>) -> Self {
        Self::TurnRetried {
            turn,
            speaker: speaker.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a TurnCompleted event.
    pub fn turn_completed(turn: u32, speaker: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TurnCompleted {
            turn,
            speaker: speaker.into(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates an ExchangeTruncated event.
    pub fn exchange_truncated(completed_turns: usize) -> Self {
        Self::ExchangeTruncated {
            completed_turns,
            timestamp: Utc::now(),
        }
    }

    /// Creates a SummaryReady event.
    pub fn summary_ready(summary: impl Into<String>) -> Self {
        Self::SummaryReady {
            summary: summary.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a WinnerDeclared event.
    pub fn winner_declared(winner: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::WinnerDeclared {
            winner: winner.into(),
            reason: reason.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a DebateCompleted event.
    pub fn debate_completed(total_turns: usize, total_characters: usize, truncated: bool) -> Self {
        Self::DebateCompleted {
            total_turns,
            total_characters,
            truncated,
            timestamp: Utc::now(),
        }
    }
}
