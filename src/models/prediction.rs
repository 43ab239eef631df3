use serde::Serialize;

use super::Gender;
use crate::error::{GrowthError, Result};

/// Chart point: age in months against a value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: u32,
    pub y: f64,
}

impl SeriesPoint {
    pub fn new(x: u32, y: f64) -> Self {
        Self { x, y }
    }
}

/// `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearModel {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearModel {
    /// Ordinary least squares over every point.
    ///
    /// Ages are whole months, so the denominator `nΣx² − (Σx)²` is computed in
    /// integers and a zero-variance input is detected exactly.
    pub fn fit(series: &'static str, points: &[SeriesPoint]) -> Result<Self> {
        let n = points.len();
        if n < 2 {
            return Err(GrowthError::InsufficientData {
                required: 2,
                available: n,
            });
        }

        let sum_x: i128 = points.iter().map(|p| p.x as i128).sum();
        let sum_xx: i128 = points.iter().map(|p| (p.x as i128) * (p.x as i128)).sum();
        let denominator = n as i128 * sum_xx - sum_x * sum_x;
        if denominator == 0 {
            return Err(GrowthError::DegenerateFit {
                series,
                age_months: points[0].x,
            });
        }

        let sum_y: f64 = points.iter().map(|p| p.y).sum();
        let sum_xy: f64 = points.iter().map(|p| p.x as f64 * p.y).sum();
        let n = n as f64;
        let sum_x = sum_x as f64;

        let slope = (n * sum_xy - sum_x * sum_y) / denominator as f64;
        let intercept = (sum_y - slope * sum_x) / n;

        Ok(Self { slope, intercept })
    }

    pub fn predict(&self, x: u32) -> f64 {
        self.slope * x as f64 + self.intercept
    }
}

/// Independent fits for height and weight against age
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionModel {
    pub height: LinearModel,
    pub weight: LinearModel,
}

/// Forecast for one member plus the series needed to chart it against the
/// reference curve. The member and reference series are kept separate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthPrediction {
    pub member_id: String,
    pub gender: Gender,
    pub horizon_months: u32,
    pub last_age_months: u32,
    pub target_age_months: u32,
    pub predicted_height: f64,
    pub predicted_weight: f64,
    pub model: PredictionModel,
    pub height_series: Vec<SeriesPoint>,
    pub weight_series: Vec<SeriesPoint>,
    pub reference_series: Vec<SeriesPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(raw: &[(u32, f64)]) -> Vec<SeriesPoint> {
        raw.iter().map(|&(x, y)| SeriesPoint::new(x, y)).collect()
    }

    #[test]
    fn test_exact_linear_fit() {
        let model = LinearModel::fit("height", &points(&[(0, 100.0), (12, 112.0)])).unwrap();
        assert_eq!(model.slope, 1.0);
        assert_eq!(model.intercept, 100.0);
        assert_eq!(model.predict(24), 124.0);
    }

    #[test]
    fn test_least_squares_over_noisy_points() {
        let model = LinearModel::fit(
            "weight",
            &points(&[(0, 1.5), (1, 2.5), (2, 5.5), (3, 6.5)]),
        )
        .unwrap();
        assert!((model.slope - 1.8).abs() < 1e-9);
        assert!((model.intercept - 1.3).abs() < 1e-9);
    }

    #[test]
    fn test_identical_ages_are_degenerate() {
        let err = LinearModel::fit("height", &points(&[(7, 70.0), (7, 71.0), (7, 72.0)])).unwrap_err();
        assert!(matches!(
            err,
            GrowthError::DegenerateFit {
                series: "height",
                age_months: 7
            }
        ));
    }

    #[test]
    fn test_single_point_is_insufficient() {
        let err = LinearModel::fit("height", &points(&[(7, 70.0)])).unwrap_err();
        assert!(matches!(
            err,
            GrowthError::InsufficientData {
                required: 2,
                available: 1
            }
        ));
    }
}
