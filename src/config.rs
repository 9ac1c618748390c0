//! Debate configuration.
//!
//! All tunables live in one explicit [`DebateConfig`] value that is passed
//! into each component at construction time. There is no global mutable
//! configuration; tests shrink the windows and caps through the `with_*`
//! builders.

use crate::personas::Persona;

/// Knowledge fields offered to the topic generator.
const TOPIC_FIELDS: &[&str] = &[
    "technology",
    "philosophy",
    "art",
    "science",
    "society",
    "culture",
    "history",
    "psychology",
    "economics",
    "sport",
    "cooking",
    "travel",
    "nature",
    "space",
    "medicine",
    "education",
    "politics",
    "religion",
    "ethics",
    "the future",
    "the past",
    "creativity",
    "work",
    "relationships",
    "the environment",
];

/// Configuration for one debate run.
#[derive(Debug, Clone)]
pub struct DebateConfig {
    /// Number of exchanges when the caller does not ask for a specific count.
    pub default_exchanges: u32,
    /// Lower bound on the exchange count.
    pub min_exchanges: u32,
    /// Upper bound on the exchange count.
    pub max_exchanges: u32,

    /// Sampling temperature for turn 0.
    pub base_temperature: f64,
    /// Per-turn temperature increase; later turns are nudged warmer to avoid
    /// convergent output.
    pub temperature_increment: f64,
    /// Ceiling on the per-turn temperature schedule.
    pub max_temperature: f64,
    /// Token cap per gateway call. `None` leaves the backend default.
    pub max_tokens: Option<u32>,

    /// Minimum sentences a turn should contain (prompt guidance only).
    pub min_sentences: usize,
    /// Maximum sentences a turn may contain (enforced by the normalizer).
    pub max_sentences: usize,
    /// Sliding context window: how many trailing transcript lines each turn
    /// sees.
    pub max_history_lines: usize,

    /// Sampling temperature for the post-hoc summary.
    pub summary_temperature: f64,
    /// Sentence cap requested of the summary.
    pub summary_max_sentences: usize,
    /// Sampling temperature for the winner adjudication.
    pub winner_temperature: f64,

    /// Sampling temperature for automatic topic generation.
    pub topic_temperature: f64,
    /// Word cap requested of the generated topic.
    pub topic_max_words: usize,
    /// Knowledge fields the topic generator may draw from.
    pub topic_fields: Vec<String>,

    /// Sampling temperature for persona synthesis.
    pub personality_temperature: f64,
    /// Word cap requested of each persona description.
    pub personality_max_words: usize,
    /// Word cap requested of each communication style.
    pub style_max_words: usize,
    /// Personas used when synthesis fails or its output cannot be parsed.
    pub fallback_personas: (Persona, Persona),
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            default_exchanges: 7,
            min_exchanges: 1,
            max_exchanges: 100,
            base_temperature: 0.8,
            temperature_increment: 0.02,
            max_temperature: 0.9,
            max_tokens: None,
            min_sentences: 2,
            max_sentences: 4,
            max_history_lines: 8,
            summary_temperature: 0.3,
            summary_max_sentences: 5,
            winner_temperature: 0.2,
            topic_temperature: 0.9,
            topic_max_words: 25,
            topic_fields: TOPIC_FIELDS.iter().map(|f| f.to_string()).collect(),
            personality_temperature: 0.8,
            personality_max_words: 25,
            style_max_words: 5,
            fallback_personas: Persona::fallback_pair(),
        }
    }
}

impl DebateConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sentence cap enforced on each turn.
    pub fn with_max_sentences(mut self, max: usize) -> Self {
        self.max_sentences = max.max(1);
        self
    }

    /// Sets the sliding context window size.
    pub fn with_max_history_lines(mut self, lines: usize) -> Self {
        self.max_history_lines = lines.max(1);
        self
    }

    /// Sets the exchange-count bounds.
    pub fn with_exchange_bounds(mut self, min: u32, max: u32) -> Self {
        self.min_exchanges = min.max(1);
        self.max_exchanges = max.max(self.min_exchanges);
        self
    }

    /// Sets the temperature schedule.
    pub fn with_temperature_schedule(mut self, base: f64, increment: f64, max: f64) -> Self {
        self.base_temperature = base;
        self.temperature_increment = increment;
        self.max_temperature = max;
        self
    }

    /// Clamps a requested exchange count into the configured bounds.
    pub fn clamp_exchanges(&self, requested: u32) -> u32 {
        requested.clamp(self.min_exchanges, self.max_exchanges)
    }

    /// Sampling temperature for the given 0-based turn index.
    ///
    /// `base + turn_index * increment`, capped at `max_temperature`.
    pub fn turn_temperature(&self, turn_index: u32) -> f64 {
        let scheduled = self.base_temperature + f64::from(turn_index) * self.temperature_increment;
        scheduled.min(self.max_temperature)
    }
}
