//! Emergency assistance requests
//!
//! A rider's help request becomes an [`AlertRecord`] that is handed to a
//! [`NotificationSink`]. The rider always hears the same acknowledgement,
//! whether or not the sink delivered the alert.

mod sink;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use sink::{LogSink, NotificationSink, WebhookSink};

/// Spoken once a help request has been handed off
pub const ACKNOWLEDGEMENT: &str = "Permintaan bantuan Anda telah dikirim ke petugas terdekat. \
Petugas akan segera datang ke lokasi Anda. Mohon tetap di tempat.";

/// Where the rider is, as reported by the app
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    #[serde(default)]
    pub user_id: Option<String>,
    /// Free-form description (e.g. "Platform 2, near Gate 5")
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

/// Alert urgency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
}

/// Alert sent to station staff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub user_id: Option<String>,
    pub location: Option<String>,
    pub platform: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub urgency: Urgency,
}

impl AlertRecord {
    /// Build a high-urgency alert for `info` at `timestamp`
    #[must_use]
    pub fn new(info: &LocationInfo, timestamp: DateTime<Utc>) -> Self {
        Self {
            user_id: info.user_id.clone(),
            location: info.location.clone(),
            platform: info.platform.clone(),
            timestamp,
            urgency: Urgency::High,
        }
    }
}

/// Raise a staff alert for `info` and return the rider acknowledgement
///
/// Sink failures are logged; the acknowledgement is returned regardless.
pub async fn emergency_assistance(sink: &dyn NotificationSink, info: &LocationInfo) -> String {
    let alert = AlertRecord::new(info, Utc::now());

    match sink.publish(&alert).await {
        Ok(()) => tracing::info!(sink = sink.name(), "emergency alert dispatched"),
        Err(e) => tracing::error!(
            sink = sink.name(),
            error = %e,
            "failed to dispatch emergency alert"
        ),
    }

    ACKNOWLEDGEMENT.to_string()
}
