//! Persona synthesis for the two debating agents.
//!
//! One gateway call asks the backend for two maximally-contrasting profiles
//! in a fixed line-oriented key:value wire format. Parsing is deliberately
//! tolerant (order-insensitive, fuzzy key matching, junk lines ignored) and
//! total: whatever the backend does, callers always receive two usable
//! personas.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::DebateConfig;
use crate::llm::{GenerationRequest, LlmProvider, Message};

/// One debating agent's profile.
///
/// Immutable once created; owned by the conversation driver for the
/// duration of a single run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Single-token display name, formatting-stripped.
    pub name: String,
    /// Free-text personality description.
    pub personality: String,
    /// Free-text communication style.
    pub style: String,
}

impl Persona {
    /// Creates a new persona.
    pub fn new(
        name: impl Into<String>,
        personality: impl Into<String>,
        style: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            personality: personality.into(),
            style: style.into(),
        }
    }

    /// The fixed pair used whenever synthesis fails.
    pub fn fallback_pair() -> (Self, Self) {
        (
            Self::new("Nova", "Optimistic and visionary", "Enthusiastic"),
            Self::new("Atlas", "Pragmatic and analytical", "Reflective"),
        )
    }
}

/// Markdown emphasis characters that models like to wrap names in.
fn emphasis_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[*_`~]").expect("valid emphasis regex"))
}

/// Cleans a model-supplied agent name.
///
/// Strips markdown emphasis, collapses whitespace, and keeps only the first
/// whitespace-delimited token. A fully decorated name can clean down to the
/// empty string, which the parser then rejects.
pub fn clean_name(raw: &str) -> String {
    let stripped = emphasis_chars().replace_all(raw, "");
    stripped
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_string()
}

/// Builds contrasting persona pairs through the gateway.
pub struct PersonaSynthesizer {
    provider: Arc<dyn LlmProvider>,
    config: DebateConfig,
}

impl PersonaSynthesizer {
    /// Creates a new synthesizer.
    pub fn new(provider: Arc<dyn LlmProvider>, config: DebateConfig) -> Self {
        Self { provider, config }
    }

    /// Synthesizes two diametrically-opposed personas for the topic.
    ///
    /// Never fails: gateway errors, empty responses, and unparseable output
    /// all degrade to the configured fallback pair.
    pub async fn generate_profiles(&self, topic: &str) -> (Persona, Persona) {
        let mut request = GenerationRequest::new(vec![
            Message::system(
                "You are an expert creator of OPPOSED and CONTRASTING debate personas. \
                 The personas you create clash on every axis.",
            ),
            Message::user(self.profile_request(topic)),
        ])
        .with_temperature(self.config.personality_temperature);
        request.max_tokens = self.config.max_tokens;

        match self.provider.generate(request).await {
            Ok(response) => parse_profiles(&response).unwrap_or_else(|| {
                tracing::warn!("Persona output did not parse, using fallback pair");
                self.config.fallback_personas.clone()
            }),
            Err(err) => {
                tracing::warn!(error = %err, "Persona synthesis failed, using fallback pair");
                self.config.fallback_personas.clone()
            }
        }
    }

    fn profile_request(&self, topic: &str) -> String {
        format!(
            r#"Create two COMPLETELY OPPOSITE debate personas to discuss: {topic}

The personas must be DIAMETRICALLY OPPOSED in:
- World view (optimist vs pessimist)
- Thinking approach (logical vs emotional)
- Communication style (direct vs diplomatic)
- Attitude (conservative vs progressive)
- Methodology (practical vs theoretical)
- Temperament (calm vs passionate)

For each persona produce:
1. A simple name (a single proper name, no asterisks)
2. A distinctive personality in at most {personality_words} words that highlights the CONTRAST
3. A communication style in {style_words} words

REQUIRED FORMAT (follow it exactly):
NOME1: [simple name]
PERSONALITA1: [description emphasizing one extreme]
STILE1: [communication style]
NOME2: [simple name]
PERSONALITA2: [description emphasizing the opposite extreme]
STILE2: [opposite communication style]

Contrast example:
- First: rational, analytical, cold, data-driven
- Second: emotional, intuitive, warm, grounded in human experience"#,
            topic = topic,
            personality_words = self.config.personality_max_words,
            style_words = self.config.style_max_words,
        )
    }
}

/// Partially-parsed persona fields.
#[derive(Default)]
struct PartialProfile {
    name: Option<String>,
    personality: Option<String>,
    style: Option<String>,
}

impl PartialProfile {
    fn into_persona(self) -> Persona {
        Persona {
            name: self.name.unwrap_or_default(),
            personality: self.personality.unwrap_or_default(),
            style: self.style.unwrap_or_default(),
        }
    }
}

/// Parses the six-key wire format into a persona pair.
///
/// Lines are scanned independently: the first colon splits key from value,
/// keys match case-insensitively by substring, and anything unrecognized is
/// ignored. The parse is accepted only when both names survive cleaning
/// non-empty.
pub fn parse_profiles(response: &str) -> Option<(Persona, Persona)> {
    let mut first = PartialProfile::default();
    let mut second = PartialProfile::default();

    for line in response.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_uppercase();
        let value = value.trim();

        if key.contains("NOME1") {
            first.name = Some(clean_name(value));
        } else if key.contains("PERSONALITA1") {
            first.personality = Some(value.to_string());
        } else if key.contains("STILE1") {
            first.style = Some(value.to_string());
        } else if key.contains("NOME2") {
            second.name = Some(clean_name(value));
        } else if key.contains("PERSONALITA2") {
            second.personality = Some(value.to_string());
        } else if key.contains("STILE2") {
            second.style = Some(value.to_string());
        }
    }

    let has_names = first.name.as_deref().is_some_and(|n| !n.is_empty())
        && second.name.as_deref().is_some_and(|n| !n.is_empty());

    has_names.then(|| (first.into_persona(), second.into_persona()))
}
