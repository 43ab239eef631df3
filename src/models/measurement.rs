use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One height/weight observation. `bmi` is fixed at creation and never
/// recomputed, so historical values keep the formula in effect when recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub height: f64, // cm
    pub weight: f64, // kg
    pub bmi: f64,
    pub timestamp: DateTime<Utc>,
}

impl Measurement {
    /// Create a measurement with BMI derived from height and weight
    pub fn new(height: f64, weight: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            height,
            weight,
            bmi: calculate_bmi(height, weight),
            timestamp,
        }
    }

    /// Height and weight are finite and strictly positive
    pub fn is_valid(&self) -> bool {
        self.height.is_finite() && self.height > 0.0 && self.weight.is_finite() && self.weight > 0.0
    }
}

/// weight / (height in metres)², rounded to two decimals
pub fn calculate_bmi(height_cm: f64, weight_kg: f64) -> f64 {
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    (bmi * 100.0).round() / 100.0
}
