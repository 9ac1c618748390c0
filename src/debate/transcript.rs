//! Transcript model and the persisted conversation record.
//!
//! The [`Transcript`] is the single source of truth for conversation state:
//! an append-only sequence of turns whose insertion order is the speaking
//! order. The [`ConversationRecord`] is a write-once projection of it, built
//! at finalize time and shaped exactly like the JSON that lands on disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::personas::Persona;

/// Characters-per-second used for the reading-duration estimate.
const READING_SPEED_CHARS_PER_SEC: usize = 20;

/// One spoken turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Name of the agent that spoke.
    pub speaker: String,
    /// The normalized message text.
    pub message: String,
    /// 1-based position in speaking order.
    pub turn: u32,
}

/// Append-only record of everything said so far.
///
/// Turns are never removed or reordered; `turn` numbers are assigned on
/// append and always match position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn, assigning the next turn number.
    pub fn record(&mut self, speaker: impl Into<String>, message: impl Into<String>) -> &Turn {
        let turn = Turn {
            speaker: speaker.into(),
            message: message.into(),
            turn: self.turns.len() as u32 + 1,
        };
        self.turns.push(turn);
        self.turns.last().expect("turn just appended")
    }

    /// The turns in speaking order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of completed turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when nothing has been said yet.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Total character count across all messages.
    pub fn total_characters(&self) -> usize {
        self.turns.iter().map(|t| t.message.chars().count()).sum()
    }

    /// Serializes the transcript as `speaker: message` lines.
    ///
    /// This is both the sliding-window context source and the shape the
    /// analyzers see.
    pub fn as_text(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}\n", t.speaker, t.message))
            .collect()
    }
}

/// Persona subset stored with the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    /// Display name.
    pub name: String,
    /// Personality description.
    pub personality: String,
    /// Communication style.
    pub style: String,
}

impl From<&Persona> for ParticipantRecord {
    fn from(persona: &Persona) -> Self {
        Self {
            name: persona.name.clone(),
            personality: persona.personality.clone(),
            style: persona.style.clone(),
        }
    }
}

/// Both participants, by seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    /// The agent that opens the debate.
    pub ai1: ParticipantRecord,
    /// The opposing agent.
    pub ai2: ParticipantRecord,
}

/// Record metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// When the record was built (ISO-8601).
    pub timestamp: DateTime<Utc>,
    /// Crate version that produced the record.
    pub version: String,
    /// The debated topic.
    pub topic: String,
    /// Both participants.
    pub participants: Participants,
    /// Completed turn count.
    pub total_turns: usize,
    /// Character count across all messages.
    pub total_characters: usize,
}

/// The full persisted/returned conversation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRecord {
    /// Run metadata.
    pub metadata: RecordMetadata,
    /// The transcript, in speaking order.
    pub conversation: Vec<Turn>,
}

impl ConversationRecord {
    /// Projects the accumulated state into the persisted shape.
    pub fn build(topic: &str, first: &Persona, second: &Persona, transcript: Transcript) -> Self {
        let total_turns = transcript.len();
        let total_characters = transcript.total_characters();

        Self {
            metadata: RecordMetadata {
                timestamp: Utc::now(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                topic: topic.to_string(),
                participants: Participants {
                    ai1: first.into(),
                    ai2: second.into(),
                },
                total_turns,
                total_characters,
            },
            conversation: transcript.turns,
        }
    }

    /// Computes display statistics for this record.
    pub fn stats(&self) -> ConversationStats {
        let ai1_name = &self.metadata.participants.ai1.name;
        let ai2_name = &self.metadata.participants.ai2.name;

        let ai1_messages = self
            .conversation
            .iter()
            .filter(|t| &t.speaker == ai1_name)
            .count();
        let ai2_messages = self
            .conversation
            .iter()
            .filter(|t| &t.speaker == ai2_name)
            .count();

        ConversationStats {
            completed_turns: self.conversation.len(),
            ai1_messages,
            ai2_messages,
            total_characters: self.metadata.total_characters,
            estimated_duration_secs: self.metadata.total_characters / READING_SPEED_CHARS_PER_SEC,
        }
    }
}

/// Summary statistics derived from a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationStats {
    /// Completed turns.
    pub completed_turns: usize,
    /// Messages spoken by the first agent.
    pub ai1_messages: usize,
    /// Messages spoken by the second agent.
    pub ai2_messages: usize,
    /// Characters across all messages.
    pub total_characters: usize,
    /// Reading-time estimate in seconds.
    pub estimated_duration_secs: usize,
}
