//! Post-hoc transcript analyzers.
//!
//! Two independent single-call analyses run after the exchange: a neutral
//! summary and a winner adjudication. Both are best-effort; a gateway
//! failure or an output that fails structural validation yields an absent
//! result and never blocks finalization.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::DebateConfig;
use crate::debate::transcript::Transcript;
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::normalize::strip_formatting;

/// The adjudicated outcome of a debate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjudicationResult {
    /// Winning agent's name; always one of the two participants.
    pub winner: String,
    /// The adjudicator's rationale.
    pub reason: String,
}

/// Runs the post-hoc analyses over a finished transcript.
pub struct DebateAnalyst {
    provider: Arc<dyn LlmProvider>,
    config: DebateConfig,
}

impl DebateAnalyst {
    /// Creates a new analyst.
    pub fn new(provider: Arc<dyn LlmProvider>, config: DebateConfig) -> Self {
        Self { provider, config }
    }

    /// Generates a neutral, markdown-free summary of the conversation.
    ///
    /// Returns `None` for an empty transcript or on any gateway failure.
    pub async fn summarize(&self, topic: &str, transcript: &Transcript) -> Option<String> {
        if transcript.is_empty() {
            return None;
        }

        let mut request = GenerationRequest::new(vec![
            Message::system(
                "You are an expert analyst who writes concise conversation summaries. \
                 Always write clearly and directly, with no markdown formatting or \
                 special characters.",
            ),
            Message::user(self.summary_request(topic, transcript)),
        ])
        .with_temperature(self.config.summary_temperature);
        request.max_tokens = self.config.max_tokens;

        match self.provider.generate(request).await {
            Ok(summary) => Some(strip_formatting(&summary)),
            Err(err) => {
                tracing::warn!(error = %err, "Summary generation failed");
                None
            }
        }
    }

    /// Asks the backend to pick a winner and validates the answer shape.
    ///
    /// The prompt forbids ties; the parser accepts only a response whose
    /// final non-empty line exactly equals one of the two participant names.
    /// Anything else yields `None` - no retry, no fuzzy correction.
    pub async fn adjudicate(
        &self,
        topic: &str,
        transcript: &Transcript,
        first_name: &str,
        second_name: &str,
    ) -> Option<AdjudicationResult> {
        if transcript.is_empty() {
            return None;
        }

        let mut request = GenerationRequest::new(vec![
            Message::system(
                "You are an impartial debate judge. After long and careful consideration \
                 you must decide who won the debate between two participants. You may \
                 never answer that it is a tie, that you cannot decide, or that both \
                 won. You must choose exactly one of the two names provided. Give a \
                 short rationale, but at the end write only the winner's name on a \
                 separate line, with no formatting, markdown, asterisks, dashes or \
                 symbols. Add nothing after the name.",
            ),
            Message::user(format!(
                "Topic: {topic}\n\nCONVERSATION:\n{text}\n\nThe participants are: \
                 {first_name} and {second_name}. After careful consideration, who won \
                 the debate? Write a short rationale, then only the winner's name at \
                 the end, unformatted.",
                topic = topic,
                text = transcript.as_text(),
            )),
        ])
        .with_temperature(self.config.winner_temperature);
        request.max_tokens = self.config.max_tokens;

        match self.provider.generate(request).await {
            Ok(response) => parse_verdict(&response, first_name, second_name),
            Err(err) => {
                tracing::warn!(error = %err, "Winner adjudication failed");
                None
            }
        }
    }

    fn summary_request(&self, topic: &str, transcript: &Transcript) -> String {
        format!(
            r#"Briefly summarize this conversation between two speakers on the topic: {topic}

CONVERSATION:
{text}
Write a summary of at most {max_sentences} sentences that highlights:
1. Each speaker's main point of view
2. The contrasts that emerged
3. The key arguments discussed

IMPORTANT:
- Do NOT use markdown, asterisks, dashes or formatting
- Write naturally and fluidly
- Keep a neutral, objective tone
- Do NOT mention that the speakers are AI, treat them as ordinary participants"#,
            topic = topic,
            text = transcript.as_text(),
            max_sentences = self.config.summary_max_sentences,
        )
    }
}

/// Parses an adjudication response.
///
/// The last non-empty trimmed line is the winner candidate; everything
/// before it, joined with spaces, is the reason. At least two non-empty
/// lines are required, and the candidate must equal one of the two known
/// names exactly (case-sensitive).
pub fn parse_verdict(
    response: &str,
    first_name: &str,
    second_name: &str,
) -> Option<AdjudicationResult> {
    let lines: Vec<&str> = response
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() < 2 {
        return None;
    }

    let winner = lines[lines.len() - 1];
    if winner != first_name && winner != second_name {
        return None;
    }

    Some(AdjudicationResult {
        winner: winner.to_string(),
        reason: lines[..lines.len() - 1].join(" "),
    })
}
