//! Debate orchestration.
//!
//! The driver walks one conversation through its phases (setup, alternating
//! turns, finalization), the transcript module holds the append-only
//! speaking record and the persisted projection of it, and the events module
//! carries structured progress notifications to whoever is watching.

pub mod driver;
pub mod events;
pub mod transcript;

pub use driver::{DebateDriver, DebateOutcome};
pub use events::DebateEvent;
pub use transcript::{ConversationRecord, ConversationStats, Transcript, Turn};
