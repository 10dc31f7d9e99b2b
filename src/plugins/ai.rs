//! Ask AI - chat completions for `!ask`

use async_trait::async_trait;
use std::sync::Arc;

use crate::application::errors::PluginResult;
use crate::application::messaging::Trigger;
use crate::domain::entities::InboundMessage;
use crate::infrastructure::llm::{LLMMessage, LLM};
use crate::plugins::trait_def::{Plugin, PluginBase, PluginContext};

const COMMANDS: &[&str] = &["!ask"];

/// Twitch rejects chat messages longer than this
pub const MAX_CHAT_LEN: usize = 500;

/// Answers `!ask <question>` with an LLM completion
pub struct AskPlugin {
    base: PluginBase,
    llm: Arc<dyn LLM>,
    system_prompt: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl AskPlugin {
    pub fn new(llm: Arc<dyn LLM>, system_prompt: impl Into<String>) -> Self {
        Self {
            base: PluginBase::new("Ask AI"),
            llm,
            system_prompt: system_prompt.into(),
            temperature: 0.7,
            max_tokens: Some(150),
        }
    }

    pub fn with_limits(mut self, temperature: f32, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

/// Text after the command word, with its original casing
fn question_of(raw: &str) -> &str {
    let raw = raw.trim();
    match raw.split_once(char::is_whitespace) {
        Some((_, rest)) => rest.trim(),
        None => "",
    }
}

/// Collapse whitespace into single spaces and cut to `max` characters
pub fn to_chat_line(text: &str, max: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let mut cut: String = flat.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[async_trait]
impl Plugin for AskPlugin {
    fn name(&self) -> &str {
        "Ask AI"
    }

    fn description(&self) -> &str {
        "Answers chat questions with an AI completion"
    }

    fn commands(&self) -> &[&str] {
        COMMANDS
    }

    fn initialize(&mut self, ctx: PluginContext) -> PluginResult<()> {
        self.base.attach(ctx);
        Ok(())
    }

    async fn handle(&self, message: &InboundMessage) -> PluginResult<()> {
        match Trigger::parse(message.raw_text()) {
            Some(trigger) if trigger.is_any(COMMANDS) => {}
            _ => return Ok(()),
        }

        let username = message.sender();
        let question = question_of(message.raw_text());
        if question.is_empty() {
            let usage = format!("@{} Usage: !ask <question>", username);
            return self.base.reply(message, &usage).await;
        }

        let messages = vec![
            LLMMessage::system(self.system_prompt.as_str()),
            LLMMessage::user(format!("{} asks: {}", username, question)),
        ];

        let text = match self
            .llm
            .chat(messages, None, Some(self.temperature), self.max_tokens)
            .await
        {
            Ok(response) => {
                let prefix = format!("@{} ", username);
                let budget = MAX_CHAT_LEN.saturating_sub(prefix.chars().count());
                format!("{}{}", prefix, to_chat_line(&response.content, budget))
            }
            Err(e) => {
                tracing::warn!("AI completion failed for {}: {}", username, e);
                format!("@{} Sorry, I couldn't come up with an answer right now.", username)
            }
        };
        self.base.reply(message, &text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_keeps_case() {
        assert_eq!(question_of("!ask What is Rust?"), "What is Rust?");
        assert_eq!(question_of("  !ask   spaced   "), "spaced");
        assert_eq!(question_of("!ask"), "");
    }

    #[test]
    fn test_chat_line_is_flattened_and_cut() {
        assert_eq!(to_chat_line("one\n\ntwo   three", 100), "one two three");

        let long = "a".repeat(600);
        let line = to_chat_line(&long, MAX_CHAT_LEN);
        assert_eq!(line.chars().count(), MAX_CHAT_LEN);
        assert!(line.ends_with('…'));
    }
}
