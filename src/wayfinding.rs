//! Spoken directions toward a detected object

use crate::{Error, Result};

/// Below this distance (meters) the object is "right in front"
pub const NEAR_THRESHOLD_M: f64 = 5.0;

/// Below this distance (meters) the object is "ahead"
pub const MID_THRESHOLD_M: f64 = 20.0;

/// Proximity band of a detected object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceBand {
    /// Closer than [`NEAR_THRESHOLD_M`]
    Near,
    /// Closer than [`MID_THRESHOLD_M`]
    Mid,
    /// Anything further
    Far,
}

impl DistanceBand {
    /// Classify a distance in meters
    #[must_use]
    pub fn classify(distance_m: f64) -> Self {
        if distance_m < NEAR_THRESHOLD_M {
            Self::Near
        } else if distance_m < MID_THRESHOLD_M {
            Self::Mid
        } else {
            Self::Far
        }
    }
}

/// Guidance for an object (e.g. "Peron 3", "Gate 5") at `distance_m` meters
///
/// The distance is truncated to whole meters when spoken.
///
/// # Errors
///
/// Returns `InvalidInput` for an empty label or a negative or non-finite distance
pub fn wayfinding_guidance(label: &str, distance_m: f64) -> Result<String> {
    let label = label.trim();
    if label.is_empty() {
        return Err(Error::InvalidInput("object label is empty".to_string()));
    }
    if !distance_m.is_finite() || distance_m < 0.0 {
        return Err(Error::InvalidInput(format!(
            "distance must be a finite, non-negative number of meters, got {distance_m}"
        )));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let meters = distance_m.trunc() as u64;

    let text = match DistanceBand::classify(distance_m) {
        DistanceBand::Near => format!("{label} sudah sangat dekat, tepat di depan Anda."),
        DistanceBand::Mid => format!("{label} ada {meters} meter di depan."),
        DistanceBand::Far => format!("{label} terdeteksi, sekitar {meters} meter lagi."),
    };

    Ok(text)
}
