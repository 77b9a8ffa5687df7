//! Chat-model intent matching with keyword fallback

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{Intent, IntentMatcher, IntentResponse, RuleBasedMatcher};
use crate::config::NlpConfig;
use crate::{Error, Result};

const SYSTEM_PROMPT: &str = "Kamu adalah KAI Pandu, asisten suara stasiun kereta api. \
Balas dalam bahasa Indonesia yang singkat dan ramah. \
Jawab HANYA dengan objek JSON: \
{\"intent\": \"book_ticket\" atau \"unknown\", \
\"response_text\": kalimat balasan, \
\"entities\": objek string seperti origin, destination, date}.";

/// Intent matcher backed by an OpenAI-compatible chat completions API
///
/// Provider failures are logged and answered by the keyword rules instead.
pub struct ModelBackedMatcher {
    client: Client,
    api_key: SecretString,
    config: NlpConfig,
    fallback: RuleBasedMatcher,
}

impl ModelBackedMatcher {
    /// Create a new model-backed matcher with a bounded request timeout
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty or the HTTP client cannot be built
    pub fn new(
        api_key: SecretString,
        config: NlpConfig,
        fallback: RuleBasedMatcher,
    ) -> Result<Self> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(Error::Config(
                "OpenAI API key required for model-backed intents".to_string(),
            ));
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key,
            config,
            fallback,
        })
    }

    /// Ask the model directly, without falling back
    ///
    /// # Errors
    ///
    /// Returns `Network` on transport failure and `Intent` when the provider
    /// answers with an error status or content that is not the expected JSON
    pub async fn query_model(&self, text: &str) -> Result<IntentResponse> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: text,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.config.base_url))
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Intent(format!("intent model error {status}: {body}")));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Intent(format!("failed to parse model response: {e}")))?;

        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Intent("model returned no content".to_string()))?;

        parse_model_reply(&content)
    }
}

#[async_trait]
impl IntentMatcher for ModelBackedMatcher {
    async fn match_intent(&self, text: &str) -> Result<IntentResponse> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("utterance is empty".to_string()));
        }

        match self.query_model(text).await {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::warn!(error = %e, "intent model unavailable, using keyword rules");
                self.fallback.matches(text)
            }
        }
    }

    fn name(&self) -> &'static str {
        "model"
    }
}

/// Decode the JSON object the model was asked to produce
fn parse_model_reply(content: &str) -> Result<IntentResponse> {
    let reply: ModelReply = serde_json::from_str(content.trim())
        .map_err(|e| Error::Intent(format!("model reply is not the expected JSON: {e}")))?;

    if reply.response_text.trim().is_empty() {
        return Err(Error::Intent("model reply has empty response_text".to_string()));
    }

    let entities = reply
        .entities
        .into_iter()
        .filter_map(|(k, v)| match v {
            serde_json::Value::String(s) => Some((k, s)),
            serde_json::Value::Null => None,
            other => Some((k, other.to_string())),
        })
        .collect();

    Ok(IntentResponse {
        response_text: reply.response_text,
        intent: Intent::from_label(&reply.intent),
        entities,
    })
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ModelReply {
    #[serde(default)]
    intent: String,
    response_text: String,
    #[serde(default)]
    entities: BTreeMap<String, serde_json::Value>,
}
