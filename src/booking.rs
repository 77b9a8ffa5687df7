//! Ticket orders from voice-agent conversation analysis
//!
//! After a booking conversation the voice agent posts an analysis payload
//! whose `analysis.data_collection_results` section holds one object per
//! collected slot, each with a `value`. This module flattens that section and
//! turns it into a pending [`BookingOrder`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Collected slot names
pub mod slots {
    pub const ORIGIN: &str = "stasiun_asal";
    pub const DESTINATION: &str = "stasiun_tujuan";
    pub const DEPARTURE_DATE: &str = "tanggal_keberangkatan";
    pub const DEPARTURE_TIME: &str = "jam_keberangkatan";
    pub const PAYMENT_METHOD: &str = "metode_pembayaran";
    pub const PASSENGER_COUNT: &str = "jumlah_penumpang";
}

/// Order lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    PendingPayment,
}

/// A ticket order awaiting payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingOrder {
    /// `KAI-<unix millis>`
    pub order_id: String,
    pub status: OrderStatus,
    pub origin_station: Option<String>,
    pub destination_station: Option<String>,
    pub departure_date: Option<String>,
    pub departure_time: Option<String>,
    pub passenger_count: u32,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl BookingOrder {
    /// Build an order from flattened slot values
    #[must_use]
    pub fn from_collected(values: &Map<String, Value>, now: DateTime<Utc>) -> Self {
        let passenger_count = values
            .get(slots::PASSENGER_COUNT)
            .and_then(as_count)
            .filter(|n| *n > 0)
            .unwrap_or(1);

        Self {
            order_id: format!("KAI-{}", now.timestamp_millis()),
            status: OrderStatus::PendingPayment,
            origin_station: text_slot(values, slots::ORIGIN),
            destination_station: text_slot(values, slots::DESTINATION),
            departure_date: text_slot(values, slots::DEPARTURE_DATE),
            departure_time: text_slot(values, slots::DEPARTURE_TIME),
            passenger_count,
            payment_method: text_slot(values, slots::PAYMENT_METHOD),
            created_at: now,
        }
    }
}

/// Flatten `analysis.data_collection_results.<slot>.value` into `slot -> value`
///
/// Slots without a `value` are skipped. Returns `None` when the section is
/// missing or nothing usable was collected.
#[must_use]
pub fn extract_collected_values(payload: &Value) -> Option<Map<String, Value>> {
    let Some(results) = payload
        .get("analysis")
        .and_then(|a| a.get("data_collection_results"))
        .and_then(Value::as_object)
    else {
        tracing::debug!("payload has no data_collection_results");
        return None;
    };

    let values: Map<String, Value> = results
        .iter()
        .filter_map(|(key, slot)| slot.get("value").map(|v| (key.clone(), v.clone())))
        .collect();

    (!values.is_empty()).then_some(values)
}

/// Extract a pending order from a conversation analysis payload
#[must_use]
pub fn order_from_payload(payload: &Value, now: DateTime<Utc>) -> Option<BookingOrder> {
    let values = extract_collected_values(payload)?;
    let order = BookingOrder::from_collected(&values, now);

    tracing::info!(
        order_id = %order.order_id,
        origin = ?order.origin_station,
        destination = ?order.destination_station,
        passengers = order.passenger_count,
        "booking order extracted"
    );

    Some(order)
}

fn text_slot(values: &Map<String, Value>, key: &str) -> Option<String> {
    match values.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn as_count(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
