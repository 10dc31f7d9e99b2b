//! Tests for the OpenAI-compatible provider against a mock server

use mockito::Matcher;

use crate::infrastructure::llm::{LLMError, LLMMessage, OpenAiProvider, LLM};

#[tokio::test]
async fn test_chat_returns_first_choice() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(serde_json::json!({"model": "gpt-4o-mini"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{
            "model": "gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": "Four."}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
        }"#)
        .create_async()
        .await;

    let provider = OpenAiProvider::new("sk-test", None).unwrap().with_base_url(server.url());
    let response = provider
        .chat(vec![LLMMessage::user("What is 2+2?")], None, Some(0.5), Some(20))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.content, "Four.");
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.and_then(|u| u.total_tokens), Some(12));
}

#[tokio::test]
async fn test_rate_limit_is_reported() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .create_async()
        .await;

    let provider = OpenAiProvider::new("sk-test", None).unwrap().with_base_url(server.url());
    let result = provider.chat(vec![LLMMessage::user("hi")], None, None, None).await;

    assert!(matches!(result, Err(LLMError::RateLimited)));
}

#[tokio::test]
async fn test_empty_choices_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let provider = OpenAiProvider::new("sk-test", Some("local-model")).unwrap().with_base_url(server.url());
    let result = provider.chat(vec![LLMMessage::user("hi")], None, None, None).await;

    assert!(matches!(result, Err(LLMError::InvalidRequest(_))));
}

#[test]
fn test_llm_message_builder() {
    let msg = LLMMessage::user("Hello");
    assert_eq!(msg.role, "user");
    assert_eq!(msg.content, "Hello");

    let system_msg = LLMMessage::system("You are helpful.");
    assert_eq!(system_msg.role, "system");
}
