//! Intent matching integration tests

use axum::http::StatusCode;
use pandu_voice::config::NlpConfig;
use std::time::Duration;

use pandu_voice::{Error, Intent, IntentMatcher, ModelBackedMatcher, RuleBasedMatcher};
use secrecy::SecretString;
use serde_json::json;

mod common;
use common::{MockServer, silent_base_url};

fn model_matcher(base_url: &str) -> ModelBackedMatcher {
    ModelBackedMatcher::new(
        SecretString::from("sk_nlp".to_string()),
        NlpConfig {
            base_url: base_url.to_string(),
            model: "test-model".to_string(),
            timeout: Duration::from_millis(300),
        },
        RuleBasedMatcher::default(),
    )
    .unwrap()
}

fn chat_completion(content: &str) -> String {
    json!({
        "id": "chatcmpl-test",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
    .to_string()
}

#[tokio::test]
async fn test_rules_behind_trait_object() {
    let matcher: Box<dyn IntentMatcher> = Box::new(RuleBasedMatcher::default());

    let first = matcher.match_intent("Saya mau dari Gambir ke Yogyakarta").await.unwrap();
    let second = matcher.match_intent("Saya mau dari Gambir ke Yogyakarta").await.unwrap();

    assert_eq!(matcher.name(), "rules");
    assert_eq!(first, second);
    assert_eq!(first.intent, Intent::BookTicket);
    assert!(first.response_text.contains("Argo Lawu"));
    assert!(first.response_text.contains("Taksaka"));
}

#[tokio::test]
async fn test_model_reply_used() {
    let content = json!({
        "intent": "book_ticket",
        "response_text": "Kereta ke Bandung berangkat jam 10:00.",
        "entities": {"destination": "Bandung"}
    })
    .to_string();
    let server = MockServer::start(StatusCode::OK, chat_completion(&content)).await;
    let matcher = model_matcher(&server.base_url);

    let response = matcher.match_intent("tiket ke Bandung").await.unwrap();
    assert_eq!(response.intent, Intent::BookTicket);
    assert_eq!(response.response_text, "Kereta ke Bandung berangkat jam 10:00.");
    assert_eq!(response.entities["destination"], "Bandung");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/v1/chat/completions");
    assert_eq!(requests[0].header("authorization"), Some("Bearer sk_nlp"));

    let body = requests[0].json();
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["response_format"]["type"], "json_object");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "tiket ke Bandung");
}

#[tokio::test]
async fn test_model_failure_falls_back_to_rules() {
    let server = MockServer::start(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
    let matcher = model_matcher(&server.base_url);

    let response = matcher.match_intent("ke Wonosobo dong").await.unwrap();
    assert!(response.response_text.contains("Purwokerto"));
    assert_eq!(server.requests().len(), 1);

    let err = matcher.query_model("ke Wonosobo dong").await.unwrap_err();
    assert!(matches!(err, Error::Intent(_)));
}

#[tokio::test]
async fn test_unresponsive_model_falls_back_to_rules() {
    let matcher = model_matcher(&silent_base_url().await);

    let response = tokio::time::timeout(
        Duration::from_secs(5),
        matcher.match_intent("ke Wonosobo dong"),
    )
    .await
    .expect("matcher did not give up on a silent provider")
    .unwrap();

    assert!(response.response_text.contains("Purwokerto"));
    assert_eq!(response.entities["transit"], "Purwokerto");
}

#[tokio::test]
async fn test_unparsable_model_reply_falls_back() {
    let server = MockServer::start(StatusCode::OK, chat_completion("Tentu saja!")).await;
    let matcher = model_matcher(&server.base_url);

    let response = matcher.match_intent("halo").await.unwrap();
    assert_eq!(response.intent, Intent::Unknown);
    assert!(response.response_text.contains("Dari stasiun mana"));
}

#[tokio::test]
async fn test_model_matcher_rejects_empty() {
    let server = MockServer::start(StatusCode::OK, chat_completion("{}")).await;
    let matcher = model_matcher(&server.base_url);

    let err = matcher.match_intent("  ").await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(server.requests().is_empty());
}
