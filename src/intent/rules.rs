//! Keyword-based intent matching

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{Intent, IntentMatcher, IntentResponse};
use crate::{Error, Result};

/// Reply when no rule matches
const FALLBACK_REPLY: &str =
    "Baik, saya siap membantu Anda memesan tiket. Dari stasiun mana Anda ingin berangkat?";

/// A reply triggered when every keyword occurs in the utterance
#[derive(Debug, Clone)]
pub struct KeywordRule {
    keywords: Vec<String>,
    reply: String,
    intent: Intent,
    entities: BTreeMap<String, String>,
}

impl KeywordRule {
    /// Create a rule; keywords are matched case-insensitively as substrings
    ///
    /// Blank keywords are dropped. A rule left without keywords never matches.
    #[must_use]
    pub fn new(keywords: &[&str], reply: &str, intent: Intent) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            reply: reply.to_string(),
            intent,
            entities: BTreeMap::new(),
        }
    }

    /// Attach an extracted slot to the rule's response
    #[must_use]
    pub fn with_entity(mut self, key: &str, value: &str) -> Self {
        self.entities.insert(key.to_string(), value.to_string());
        self
    }

    fn matches(&self, lowered: &str) -> bool {
        !self.keywords.is_empty() && self.keywords.iter().all(|k| lowered.contains(k.as_str()))
    }

    fn response(&self) -> IntentResponse {
        IntentResponse {
            response_text: self.reply.clone(),
            intent: self.intent,
            entities: self.entities.clone(),
        }
    }
}

/// First-match keyword rules with a fixed fallback prompt
#[derive(Debug, Clone)]
pub struct RuleBasedMatcher {
    rules: Vec<KeywordRule>,
    fallback: String,
}

impl Default for RuleBasedMatcher {
    fn default() -> Self {
        let rules = vec![
            KeywordRule::new(
                &["gambir", "yogyakarta"],
                "Ada beberapa pilihan kereta dari Gambir ke Yogyakarta. \
                 Kereta Argo Lawu berangkat jam 07:30, harga 150 ribu rupiah kelas ekonomi. \
                 Kereta Taksaka berangkat jam 09:00, harga 180 ribu rupiah kelas eksekutif. \
                 Mau pilih yang mana?",
                Intent::BookTicket,
            )
            .with_entity("origin", "Gambir")
            .with_entity("destination", "Yogyakarta")
            .with_entity("date", "today"),
            KeywordRule::new(
                &["wonosobo"],
                "Maaf, untuk ke Wonosobo Anda perlu transit di Purwokerto. \
                 Ada kereta Argo Dwipangga ke Purwokerto jam 08:00. \
                 Apakah Anda ingin saya carikan jadwal lengkapnya?",
                Intent::BookTicket,
            )
            .with_entity("destination", "Wonosobo")
            .with_entity("transit", "Purwokerto"),
        ];

        Self::new(rules, FALLBACK_REPLY)
    }
}

impl RuleBasedMatcher {
    /// Create a matcher from rules checked in order
    #[must_use]
    pub fn new(rules: Vec<KeywordRule>, fallback: &str) -> Self {
        tracing::debug!(count = rules.len(), "loaded intent rules");
        Self {
            rules,
            fallback: fallback.to_string(),
        }
    }

    /// Classify `text` synchronously
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the text is empty or whitespace only
    pub fn matches(&self, text: &str) -> Result<IntentResponse> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("utterance is empty".to_string()));
        }

        let lowered = text.to_lowercase();
        if let Some(rule) = self.rules.iter().find(|r| r.matches(&lowered)) {
            tracing::debug!(intent = rule.intent.as_str(), "intent rule matched");
            return Ok(rule.response());
        }

        Ok(IntentResponse {
            response_text: self.fallback.clone(),
            intent: Intent::Unknown,
            entities: BTreeMap::new(),
        })
    }
}

#[async_trait]
impl IntentMatcher for RuleBasedMatcher {
    async fn match_intent(&self, text: &str) -> Result<IntentResponse> {
        self.matches(text)
    }

    fn name(&self) -> &'static str {
        "rules"
    }
}
