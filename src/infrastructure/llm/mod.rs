//! LLM integration - chat completions for the AI plugin

pub mod traits;
pub mod providers;

#[cfg(test)]
mod tests;

pub use traits::{LLM, LLMMessage, LLMResponse, LLMError, LLMResult, LLMUsage};
pub use providers::OpenAiProvider;
