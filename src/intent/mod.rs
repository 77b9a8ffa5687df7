//! Intent recognition for rider utterances
//!
//! Two backends share the [`IntentMatcher`] seam:
//! - [`RuleBasedMatcher`] does case-insensitive keyword matching, no network
//! - [`ModelBackedMatcher`] asks an OpenAI-compatible chat model and falls back to the rules

mod model;
mod rules;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

pub use model::ModelBackedMatcher;
pub use rules::{KeywordRule, RuleBasedMatcher};

/// Classified purpose of an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Rider wants to buy a train ticket
    BookTicket,
    /// Nothing recognised
    Unknown,
}

impl Intent {
    /// Parse an intent label, treating anything unrecognised as `Unknown`
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "book_ticket" | "bookticket" => Self::BookTicket,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BookTicket => "book_ticket",
            Self::Unknown => "unknown",
        }
    }
}

/// Reply text plus what was understood from the utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResponse {
    /// Text to speak back to the rider
    pub response_text: String,
    /// Classified intent
    pub intent: Intent,
    /// Extracted slots (origin, destination, date, ...)
    #[serde(default)]
    pub entities: BTreeMap<String, String>,
}

/// Pluggable intent recognition backend
#[async_trait]
pub trait IntentMatcher: Send + Sync {
    /// Classify `text` and produce a reply
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for empty text
    async fn match_intent(&self, text: &str) -> Result<IntentResponse>;

    /// Backend name, for logs
    fn name(&self) -> &'static str;
}
