//! Automatic topic generation.
//!
//! Used when the caller does not supply a topic. Unlike persona synthesis
//! this stage has no fallback: a debate without a topic cannot start, so
//! failure here is fatal to the run (surfaced as a setup failure by the
//! driver).

use std::sync::Arc;

use crate::config::DebateConfig;
use crate::error::LlmError;
use crate::llm::{GenerationRequest, LlmProvider, Message};

/// Generates a debate-worthy topic through the gateway.
pub struct TopicGenerator {
    provider: Arc<dyn LlmProvider>,
    config: DebateConfig,
}

impl TopicGenerator {
    /// Creates a new topic generator.
    pub fn new(provider: Arc<dyn LlmProvider>, config: DebateConfig) -> Self {
        Self { provider, config }
    }

    /// Generates one topic, stripped of trailing periods.
    pub async fn generate(&self) -> Result<String, LlmError> {
        let mut request = GenerationRequest::new(vec![
            Message::system(
                "You are a generator of stimulating conversation topics covering EVERY \
                 field of human knowledge.",
            ),
            Message::user(self.topic_request()),
        ])
        .with_temperature(self.config.topic_temperature);
        request.max_tokens = self.config.max_tokens;

        let topic = self.provider.generate(request).await?;
        Ok(topic.trim().trim_end_matches('.').to_string())
    }

    fn topic_request(&self) -> String {
        let fields = self.config.topic_fields.join(", ");
        format!(
            r#"Generate ONE SINGLE conversation topic that is:
- Specific and well defined
- Likely to provoke differing opinions and debate
- Interesting to discuss
- From ANY field: {fields}, etc.

Answer with the topic ONLY, nothing else. Keep it under {max_words} words.

Variety examples:
- The impact of classical music on workplace productivity
- The role of dreams in creative problem solving
- How colors influence mood and everyday decisions
- The future of private versus public space exploration
- Cooking as a form of cultural expression
- Loneliness in the age of social media"#,
            fields = fields,
            max_words = self.config.topic_max_words,
        )
    }
}
