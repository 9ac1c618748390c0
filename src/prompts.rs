//! System prompts and per-turn context construction.
//!
//! Pure functions, no I/O. The system prompt fixes each agent's behavior for
//! the whole run; the context builders shape what a single turn sees. The
//! polarity asymmetry (the second agent is told to take the contrary
//! position) is intentional: it engineers genuine disagreement instead of
//! relying on the opposed personalities alone.

use crate::config::DebateConfig;
use crate::personas::Persona;

/// Builds the reusable system prompt for one persona.
///
/// `is_second` selects the contrast clause: the second agent is framed
/// oppositionally, the first independently.
pub fn build_system_prompt(persona: &Persona, is_second: bool, config: &DebateConfig) -> String {
    let personality = if persona.personality.is_empty() {
        "conversational"
    } else {
        persona.personality.as_str()
    };
    let style = if persona.style.is_empty() {
        "natural".to_string()
    } else {
        persona.style.to_lowercase()
    };

    let base = format!(
        r#"You are {name}, an AI with this personality: {personality}

Your communication style is {style}.

GROUND RULES:
1. ALWAYS answer BRIEFLY but with substance ({min}-{max} sentences at most)
2. Use natural, conversational language
3. NO emoji, NO markdown, NO asterisks, NO formatting
4. ALWAYS stay consistent with your personality
5. Express CLEAR and DISTINCTIVE opinions on the topic
6. React directly to what the other speaker says
7. Do not repeat points you have already made
8. Be concise but incisive"#,
        name = persona.name,
        personality = personality,
        style = style,
        min = config.min_sentences,
        max = config.max_sentences,
    );

    let contrast = if is_second {
        r#"

IMPORTANT: Your personality is the OPPOSITE of the other speaker's. Whenever they state a view:
- ALWAYS take the contrary position
- Point out the weaknesses in their reasoning
- Offer alternatives grounded in YOUR view of the world
- Keep your distinctive style even while disagreeing
- Never agree easily - always look for the different angle"#
    } else {
        r#"

IMPORTANT: Always keep YOUR unique perspective:
- State your opinions with conviction
- Do not let the other speaker sway you
- Defend your point of view when needed
- Try to convince them that your position holds"#
    };

    format!("{base}{contrast}")
}

/// Context for turn 0: open the debate on the topic.
pub fn opening_context(topic: &str, speaker: &str, config: &DebateConfig) -> String {
    format!(
        r#"Topic: {topic}

You are {speaker}. Open the debate by stating YOUR distinctive opinion on the topic.
Be clear about your position. At most {max} sentences."#,
        topic = topic,
        speaker = speaker,
        max = config.max_sentences,
    )
}

/// Context for every later turn: topic, windowed history, respond-to-latest.
pub fn turn_context(topic: &str, history: &str, speaker: &str, config: &DebateConfig) -> String {
    let recent = window_history(history, config.max_history_lines);
    format!(
        r#"Topic: {topic}

Recent conversation:
{recent}

Your turn, {speaker}. Respond to the latest message while keeping YOUR distinctive personality.
If you disagree, say why. If you see it differently, share your angle."#,
        topic = topic,
        recent = recent,
        speaker = speaker,
    )
}

/// Reminder appended to every turn context.
pub fn brevity_reminder(config: &DebateConfig) -> String {
    format!(
        "\n\nREMEMBER: Answer in {min}-{max} short but substantial sentences. \
         Keep YOUR distinctive personality.",
        min = config.min_sentences,
        max = config.max_sentences,
    )
}

/// Sliding window over the transcript text: the last `max_lines` lines.
///
/// Truncation is positional from the tail, not semantic.
pub fn window_history(history: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = history.trim().lines().collect();
    if lines.len() > max_lines {
        lines[lines.len() - max_lines..].join("\n")
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona() -> Persona {
        Persona::new("Nova", "Optimistic and visionary", "Enthusiastic")
    }

    #[test]
    fn system_prompt_carries_persona_and_bounds() {
        let config = DebateConfig::default();
        let prompt = build_system_prompt(&persona(), false, &config);
        assert!(prompt.contains("You are Nova"));
        assert!(prompt.contains("Optimistic and visionary"));
        assert!(prompt.contains("enthusiastic"));
        assert!(prompt.contains("2-4 sentences"));
        assert!(prompt.contains("NO emoji, NO markdown"));
    }

    #[test]
    fn polarity_clause_differs_by_seat() {
        let config = DebateConfig::default();
        let first = build_system_prompt(&persona(), false, &config);
        let second = build_system_prompt(&persona(), true, &config);

        assert!(first.contains("keep YOUR unique perspective"));
        assert!(!first.contains("contrary position"));

        assert!(second.contains("ALWAYS take the contrary position"));
        assert!(second.contains("weaknesses in their reasoning"));
        assert!(!second.contains("keep YOUR unique perspective"));
    }

    #[test]
    fn empty_persona_fields_get_neutral_defaults() {
        let config = DebateConfig::default();
        let bare = Persona::new("Echo", "", "");
        let prompt = build_system_prompt(&bare, false, &config);
        assert!(prompt.contains("this personality: conversational"));
        assert!(prompt.contains("style is natural"));
    }

    #[test]
    fn opening_context_names_topic_and_speaker() {
        let config = DebateConfig::default();
        let context = opening_context("Is silence a form of communication?", "Nova", &config);
        assert!(context.contains("Topic: Is silence a form of communication?"));
        assert!(context.contains("You are Nova"));
        assert!(context.contains("Open the debate"));
    }

    #[test]
    fn window_keeps_exactly_the_last_lines() {
        let history: String = (1..=12).map(|i| format!("line {i}\n")).collect();
        let windowed = window_history(&history, 8);
        let lines: Vec<&str> = windowed.lines().collect();
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "line 5");
        assert_eq!(lines[7], "line 12");
    }

    #[test]
    fn window_passes_short_history_through() {
        assert_eq!(window_history("a\nb\n", 8), "a\nb");
        assert_eq!(window_history("", 8), "");
    }

    #[test]
    fn turn_context_windows_history() {
        let config = DebateConfig::default().with_max_history_lines(2);
        let history = "Nova: one\nAtlas: two\nNova: three\n";
        let context = turn_context("topic", history, "Atlas", &config);
        assert!(!context.contains("Nova: one"));
        assert!(context.contains("Atlas: two\nNova: three"));
        assert!(context.contains("Your turn, Atlas"));
    }
}
