//! End-to-end debate flow tests.
//!
//! These drive the full orchestration loop against a scripted in-memory
//! provider: no network, fully deterministic.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use rhetor::config::DebateConfig;
use rhetor::debate::{DebateDriver, DebateEvent, DebateOutcome};
use rhetor::error::LlmError;
use rhetor::llm::{GenerationRequest, LlmProvider};

/// Profile response that yields the fixed pair NomeA / NomeB.
const PROFILES: &str = "NOME1: NomeA\nPERSONALITA1: calm and hopeful\nSTILE1: Warm\n\
                        NOME2: NomeB\nPERSONALITA2: sharp and doubtful\nSTILE2: Curt";

/// Replays a scripted sequence of results and records every request.
struct ScriptedProvider {
    script: Mutex<VecDeque<Result<String, ()>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedProvider {
    fn new(script: Vec<Result<&str, ()>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(
                script
                    .into_iter()
                    .map(|r| r.map(|s| s.to_string()))
                    .collect(),
            ),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().expect("lock").clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        self.requests.lock().expect("lock").push(request);
        match self.script.lock().expect("lock").pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(())) => Err(LlmError::RequestFailed("scripted failure".to_string())),
            None => Err(LlmError::EmptyResponse),
        }
    }
}

/// Runs a debate to completion, collecting every emitted event.
async fn run_debate(
    provider: Arc<ScriptedProvider>,
    config: DebateConfig,
    topic: Option<&str>,
    exchanges: u32,
) -> (Result<DebateOutcome, rhetor::DebateError>, Vec<DebateEvent>) {
    let (tx, mut rx) = mpsc::channel(64);
    let collector = tokio::spawn(async move {
        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        events
    });

    let driver = DebateDriver::new(provider, config);
    let outcome = driver
        .run(topic.map(|t| t.to_string()), exchanges, tx)
        .await;
    let events = collector.await.expect("collector");
    (outcome, events)
}

#[tokio::test]
async fn two_exchange_run_produces_expected_record() {
    let provider = ScriptedProvider::new(vec![
        Ok(PROFILES),
        Ok("Silence carries meaning. It frames every word."),
        Ok("Meaning needs sound. Silence is only absence."),
        Ok("They disagreed about whether silence communicates."),
        Ok("NomeB pressed the sharper argument.\nNomeB"),
    ]);

    let (outcome, events) = run_debate(
        provider,
        DebateConfig::default(),
        Some("Is silence a form of communication?"),
        2,
    )
    .await;
    let outcome = outcome.expect("run succeeds");

    let record = &outcome.record;
    assert_eq!(record.metadata.topic, "Is silence a form of communication?");
    assert_eq!(record.metadata.total_turns, 2);

    assert_eq!(record.conversation[0].speaker, "NomeA");
    assert_eq!(record.conversation[0].turn, 1);
    assert_eq!(record.conversation[1].speaker, "NomeB");
    assert_eq!(record.conversation[1].turn, 2);

    let expected_chars: usize = record
        .conversation
        .iter()
        .map(|t| t.message.chars().count())
        .sum();
    assert_eq!(record.metadata.total_characters, expected_chars);

    assert_eq!(
        outcome.summary.as_deref(),
        Some("They disagreed about whether silence communicates.")
    );
    let verdict = outcome.verdict.expect("verdict");
    assert_eq!(verdict.winner, "NomeB");
    assert_eq!(verdict.reason, "NomeB pressed the sharper argument.");
    assert!(!outcome.truncated);

    let completed: Vec<u32> = events
        .iter()
        .filter_map(|e| match e {
            DebateEvent::TurnCompleted { turn, .. } => Some(*turn),
            _ => None,
        })
        .collect();
    assert_eq!(completed, vec![1, 2]);
    assert!(events
        .iter()
        .any(|e| matches!(e, DebateEvent::WinnerDeclared { winner, .. } if winner == "NomeB")));
}

#[tokio::test]
async fn speakers_alternate_by_parity_for_the_whole_run() {
    let mut script = vec![Ok(PROFILES)];
    script.extend(vec![Ok("A point worth making. Twice over."); 5]);
    script.push(Ok("Summary text."));
    script.push(Ok("Reasoning.\nNomeA"));

    let provider = ScriptedProvider::new(script);
    let (outcome, _) = run_debate(provider, DebateConfig::default(), Some("topic"), 5).await;
    let record = outcome.expect("run succeeds").record;

    assert_eq!(record.metadata.total_turns, 5);
    for (index, turn) in record.conversation.iter().enumerate() {
        let expected = if index % 2 == 0 { "NomeA" } else { "NomeB" };
        assert_eq!(turn.speaker, expected, "turn {}", index + 1);
        assert_eq!(turn.turn as usize, index + 1);
    }
}

#[tokio::test]
async fn failed_turn_is_retried_once_with_identical_context() {
    let provider = ScriptedProvider::new(vec![
        Ok(PROFILES),
        Err(()),
        Ok("Recovered on the retry. Still standing."),
        Ok("A reply to that. Nothing more."),
        Ok("Summary text."),
        Ok("Reasoning.\nNomeA"),
    ]);

    let (outcome, events) =
        run_debate(provider.clone(), DebateConfig::default(), Some("topic"), 2).await;
    let outcome = outcome.expect("run succeeds");

    assert!(!outcome.truncated);
    assert_eq!(outcome.record.metadata.total_turns, 2);
    assert_eq!(
        outcome.record.conversation[0].message,
        "Recovered on the retry. Still standing."
    );

    // The retry re-sent exactly what failed.
    let requests = provider.requests();
    let failed = &requests[1];
    let retried = &requests[2];
    assert_eq!(
        serde_json::to_value(&failed.messages).expect("json"),
        serde_json::to_value(&retried.messages).expect("json"),
    );
    assert_eq!(failed.temperature, retried.temperature);

    assert!(events
        .iter()
        .any(|e| matches!(e, DebateEvent::TurnRetried { turn: 1, .. })));
}

#[tokio::test]
async fn second_failure_truncates_but_keeps_finished_turns() {
    let provider = ScriptedProvider::new(vec![
        Ok(PROFILES),
        Ok("One solid point. Then another."),
        Err(()),
        Err(()),
        Ok("Summary of what little was said."),
        Ok("Reasoning.\nNomeA"),
    ]);

    let (outcome, events) = run_debate(provider, DebateConfig::default(), Some("topic"), 4).await;
    let outcome = outcome.expect("run still succeeds");

    assert!(outcome.truncated);
    assert_eq!(outcome.record.metadata.total_turns, 1);
    assert_eq!(outcome.record.conversation[0].speaker, "NomeA");

    // Finalization still ran over the partial transcript.
    assert_eq!(
        outcome.summary.as_deref(),
        Some("Summary of what little was said.")
    );
    assert!(events.iter().any(
        |e| matches!(e, DebateEvent::ExchangeTruncated { completed_turns, .. } if *completed_turns == 1)
    ));
}

#[tokio::test]
async fn turn_context_windows_to_the_last_history_lines() {
    let provider = ScriptedProvider::new(vec![
        Ok(PROFILES),
        Ok("alpha one."),
        Ok("beta two."),
        Ok("gamma three."),
        Ok("delta four."),
        Ok("Summary text."),
        Ok("Reasoning.\nNomeB"),
    ]);
    let config = DebateConfig::default().with_max_history_lines(2);

    let (outcome, _) = run_debate(provider.clone(), config, Some("topic"), 4).await;
    outcome.expect("run succeeds");

    // Requests: [0] profiles, [1..=4] turns. Turn 4 sees three history
    // lines, windowed down to the last two.
    let requests = provider.requests();
    let turn4_context = &requests[4].messages[1].content;
    assert!(turn4_context.contains("NomeB: beta two.\nNomeA: gamma three."));
    assert!(!turn4_context.contains("alpha one"));
}

#[tokio::test]
async fn turn_temperatures_follow_the_schedule() {
    let provider = ScriptedProvider::new(vec![
        Ok(PROFILES),
        Ok("one."),
        Ok("two."),
        Ok("three."),
        Ok("Summary text."),
        Ok("Reasoning.\nNomeA"),
    ]);

    let (outcome, _) = run_debate(provider.clone(), DebateConfig::default(), Some("t"), 3).await;
    outcome.expect("run succeeds");

    let requests = provider.requests();
    let temp = |i: usize| requests[i].temperature.expect("temperature set");
    assert!((temp(1) - 0.80).abs() < 1e-9);
    assert!((temp(2) - 0.82).abs() < 1e-9);
    assert!((temp(3) - 0.84).abs() < 1e-9);
}

#[tokio::test]
async fn over_long_turns_are_sentence_bounded() {
    let provider = ScriptedProvider::new(vec![
        Ok(PROFILES),
        Ok("One. Two! Three? Four. Five. Six."),
        Ok("Summary text."),
        Ok("Reasoning.\nNomeA"),
    ]);

    let (outcome, _) = run_debate(provider, DebateConfig::default(), Some("t"), 1).await;
    let record = outcome.expect("run succeeds").record;
    assert_eq!(record.conversation[0].message, "One. Two. Three. Four.");
}

#[tokio::test]
async fn failed_topic_generation_is_fatal_to_setup() {
    let provider = ScriptedProvider::new(vec![Err(())]);
    let (outcome, events) = run_debate(provider, DebateConfig::default(), None, 2).await;

    assert!(outcome.is_err());
    assert!(events.is_empty(), "no turns should run after setup failure");
}

#[tokio::test]
async fn unparseable_profiles_fall_back_to_the_fixed_pair() {
    let provider = ScriptedProvider::new(vec![
        Ok("I would rather not follow formats today."),
        Ok("A first word. A second."),
        Ok("A rebuttal. A rebuttal again."),
        Ok("Summary text."),
        Ok("Reasoning.\nAtlas"),
    ]);

    let (outcome, _) = run_debate(provider, DebateConfig::default(), Some("t"), 2).await;
    let outcome = outcome.expect("run succeeds");

    let participants = &outcome.record.metadata.participants;
    assert_eq!(participants.ai1.name, "Nova");
    assert_eq!(participants.ai2.name, "Atlas");
    assert_eq!(outcome.verdict.expect("verdict").winner, "Atlas");
}

#[tokio::test]
async fn analyzer_failures_do_not_block_the_record() {
    let provider = ScriptedProvider::new(vec![
        Ok(PROFILES),
        Ok("Something short. And sweet."),
        Ok("Back at you. Briefly."),
        Err(()),
        Ok("No rationale, just a name on one line: nobody"),
    ]);

    let (outcome, _) = run_debate(provider, DebateConfig::default(), Some("t"), 2).await;
    let outcome = outcome.expect("run succeeds");

    assert!(outcome.summary.is_none());
    // Single-line adjudication fails structural validation.
    assert!(outcome.verdict.is_none());
    assert_eq!(outcome.record.metadata.total_turns, 2);
}

#[tokio::test]
async fn exchange_count_is_clamped_to_bounds() {
    let mut script = vec![Ok(PROFILES)];
    script.extend(vec![Ok("Said plainly. Said twice."); 3]);
    script.push(Ok("Summary text."));
    script.push(Ok("Reasoning.\nNomeA"));

    let provider = ScriptedProvider::new(script);
    let config = DebateConfig::default().with_exchange_bounds(1, 3);
    let (outcome, _) = run_debate(provider, config, Some("t"), 50).await;

    assert_eq!(outcome.expect("run succeeds").record.metadata.total_turns, 3);
}
