//! The conversation driver.
//!
//! One driver owns one debate run and walks it through four phases:
//!
//! - **setup**: fix the topic (user-supplied or generated), synthesize the
//!   persona pair, build both system prompts. The only phase that can fail
//!   the run.
//! - **running**: alternate speakers strictly by turn parity (even turns go
//!   to the first seat), building each turn's context from the topic and a
//!   sliding window over the transcript, with a warming temperature schedule
//!   and a single retry per failed turn. A second failure truncates the
//!   exchange, keeping everything said so far.
//! - **finalizing**: run both post-hoc analyzers (independent, best-effort)
//!   and project the transcript into the persisted record.
//! - **done**: hand the outcome back. `run` consumes the driver; a finished
//!   run is not reusable.

use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::analysis::{AdjudicationResult, DebateAnalyst};
use crate::config::DebateConfig;
use crate::error::DebateError;
use crate::llm::{GenerationRequest, LlmProvider, Message};
use crate::normalize::normalize;
use crate::personas::{Persona, PersonaSynthesizer};
use crate::prompts;
use crate::topic::TopicGenerator;

use super::events::DebateEvent;
use super::transcript::{ConversationRecord, Transcript};

/// Everything a finished run hands back.
#[derive(Debug)]
pub struct DebateOutcome {
    /// The write-once conversation record.
    pub record: ConversationRecord,
    /// Post-hoc summary, when the analyzer succeeded.
    pub summary: Option<String>,
    /// Adjudicated winner, when the analyzer succeeded and validated.
    pub verdict: Option<AdjudicationResult>,
    /// True when the exchange stopped early on repeated generation failure.
    pub truncated: bool,
}

/// Output of the setup phase.
struct DebateSetup {
    topic: String,
    first: Persona,
    second: Persona,
    first_prompt: String,
    second_prompt: String,
}

/// Drives one alternating-turn debate between two personas.
pub struct DebateDriver {
    provider: Arc<dyn LlmProvider>,
    config: DebateConfig,
    debate_id: Uuid,
}

impl DebateDriver {
    /// Creates a driver for one run.
    pub fn new(provider: Arc<dyn LlmProvider>, config: DebateConfig) -> Self {
        Self {
            provider,
            config,
            debate_id: Uuid::new_v4(),
        }
    }

    /// Unique identifier of this run (logging only, not persisted).
    pub fn debate_id(&self) -> Uuid {
        self.debate_id
    }

    /// Runs the full debate.
    ///
    /// `topic` takes precedence when non-empty; otherwise one is generated.
    /// The exchange count is clamped into the configured bounds. Progress is
    /// reported through `events`; a dropped receiver is harmless.
    pub async fn run(
        self,
        topic: Option<String>,
        exchanges: u32,
        events: mpsc::Sender<DebateEvent>,
    ) -> Result<DebateOutcome, DebateError> {
        let exchanges = self.config.clamp_exchanges(exchanges);
        tracing::info!(
            debate_id = %self.debate_id,
            exchanges,
            "Starting debate run"
        );

        let setup = self.setup(topic, &events).await?;

        let (transcript, truncated) = self.run_turns(&setup, exchanges, &events).await;

        // Finalization is best-effort on both sides: a failed summary does
        // not block adjudication and vice versa.
        let analyst = DebateAnalyst::new(self.provider.clone(), self.config.clone());
        let summary = analyst.summarize(&setup.topic, &transcript).await;
        if let Some(summary) = &summary {
            emit(&events, DebateEvent::summary_ready(summary.clone())).await;
        }

        let verdict = analyst
            .adjudicate(
                &setup.topic,
                &transcript,
                &setup.first.name,
                &setup.second.name,
            )
            .await;
        if let Some(verdict) = &verdict {
            emit(
                &events,
                DebateEvent::winner_declared(verdict.winner.clone(), verdict.reason.clone()),
            )
            .await;
        }

        let record =
            ConversationRecord::build(&setup.topic, &setup.first, &setup.second, transcript);

        emit(
            &events,
            DebateEvent::debate_completed(
                record.metadata.total_turns,
                record.metadata.total_characters,
                truncated,
            ),
        )
        .await;

        tracing::info!(
            debate_id = %self.debate_id,
            turns = record.metadata.total_turns,
            truncated,
            "Debate run finished"
        );

        Ok(DebateOutcome {
            record,
            summary,
            verdict,
            truncated,
        })
    }

    /// Fixes topic, personas, and system prompts.
    async fn setup(
        &self,
        topic: Option<String>,
        events: &mpsc::Sender<DebateEvent>,
    ) -> Result<DebateSetup, DebateError> {
        let topic = match topic.map(|t| t.trim().to_string()) {
            Some(topic) if !topic.is_empty() => topic,
            _ => TopicGenerator::new(self.provider.clone(), self.config.clone())
                .generate()
                .await
                .map_err(|err| DebateError::SetupFailed(format!("topic generation: {err}")))?,
        };
        emit(events, DebateEvent::topic_selected(topic.clone())).await;

        let synthesizer = PersonaSynthesizer::new(self.provider.clone(), self.config.clone());
        let (first, second) = synthesizer.generate_profiles(&topic).await;
        emit(events, DebateEvent::personas_ready(first.clone(), second.clone())).await;

        let first_prompt = prompts::build_system_prompt(&first, false, &self.config);
        let second_prompt = prompts::build_system_prompt(&second, true, &self.config);

        Ok(DebateSetup {
            topic,
            first,
            second,
            first_prompt,
            second_prompt,
        })
    }

    /// The alternating-turn loop.
    ///
    /// Returns the transcript and whether the exchange was truncated.
    async fn run_turns(
        &self,
        setup: &DebateSetup,
        exchanges: u32,
        events: &mpsc::Sender<DebateEvent>,
    ) -> (Transcript, bool) {
        let mut transcript = Transcript::new();

        for turn_index in 0..exchanges {
            // The entire scheduling policy: parity. Even turns go to the
            // first seat.
            let (speaker, system_prompt) = if turn_index % 2 == 0 {
                (&setup.first, &setup.first_prompt)
            } else {
                (&setup.second, &setup.second_prompt)
            };

            emit(events, DebateEvent::turn_started(turn_index + 1, &speaker.name)).await;

            let context = if turn_index == 0 {
                prompts::opening_context(&setup.topic, &speaker.name, &self.config)
            } else {
                prompts::turn_context(
                    &setup.topic,
                    &transcript.as_text(),
                    &speaker.name,
                    &self.config,
                )
            };
            let context = format!("{context}{}", prompts::brevity_reminder(&self.config));

            match self
                .take_turn(system_prompt, &context, turn_index, &speaker.name, events)
                .await
            {
                Some(message) => {
                    let turn = transcript.record(&speaker.name, message);
                    emit(
                        events,
                        DebateEvent::turn_completed(turn.turn, &turn.speaker, &turn.message),
                    )
                    .await;
                }
                None => {
                    emit(events, DebateEvent::exchange_truncated(transcript.len())).await;
                    return (transcript, true);
                }
            }
        }

        (transcript, false)
    }

    /// Generates one turn, retrying exactly once with identical context.
    async fn take_turn(
        &self,
        system_prompt: &str,
        context: &str,
        turn_index: u32,
        speaker: &str,
        events: &mpsc::Sender<DebateEvent>,
    ) -> Option<String> {
        let temperature = self.config.turn_temperature(turn_index);
        let request = || {
            let mut request = GenerationRequest::new(vec![
                Message::system(system_prompt),
                Message::user(context),
            ])
            .with_temperature(temperature);
            request.max_tokens = self.config.max_tokens;
            request
        };

        match self.provider.generate(request()).await {
            Ok(raw) => Some(normalize(&raw, self.config.max_sentences)),
            Err(err) => {
                tracing::warn!(
                    debate_id = %self.debate_id,
                    turn = turn_index + 1,
                    speaker,
                    error = %err,
                    "Turn generation failed, retrying once"
                );
                emit(events, DebateEvent::turn_retried(turn_index + 1, speaker)).await;

                match self.provider.generate(request()).await {
                    Ok(raw) => Some(normalize(&raw, self.config.max_sentences)),
                    Err(err) => {
                        tracing::error!(
                            debate_id = %self.debate_id,
                            turn = turn_index + 1,
                            speaker,
                            error = %err,
                            "Retry failed, truncating the exchange"
                        );
                        None
                    }
                }
            }
        }
    }
}

/// Sends an event, ignoring a dropped receiver.
async fn emit(events: &mpsc::Sender<DebateEvent>, event: DebateEvent) {
    let _ = events.send(event).await;
}
