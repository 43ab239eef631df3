use tracing::debug;

use crate::error::{GrowthError, Result};
use crate::models::{
    age_in_months, GrowthPrediction, LinearModel, Member, PredictionModel, SeriesPoint,
};
use crate::reference::reference_series;
use crate::services::timeline_service::build_timeline;

/// Prediction horizons offered to users, in months
pub const PREDICTION_HORIZONS: [u32; 3] = [3, 6, 12];

const MIN_POINTS: usize = 2;

/// Forecast height and weight `horizon_months` after the member's latest
/// measurement by least-squares extrapolation over the whole timeline.
pub fn predict(member: &Member, horizon_months: u32) -> Result<GrowthPrediction> {
    let timeline = build_timeline(member);
    if timeline.len() < MIN_POINTS {
        return Err(GrowthError::InsufficientData {
            required: MIN_POINTS,
            available: timeline.len(),
        });
    }

    let ages: Vec<u32> = timeline
        .iter()
        .map(|entry| age_in_months(member.date_of_birth, entry.measurement.timestamp.date_naive()))
        .collect();

    let height_series: Vec<SeriesPoint> = ages
        .iter()
        .zip(timeline.iter())
        .map(|(&age, entry)| SeriesPoint::new(age, entry.measurement.height))
        .collect();
    let weight_series: Vec<SeriesPoint> = ages
        .iter()
        .zip(timeline.iter())
        .map(|(&age, entry)| SeriesPoint::new(age, entry.measurement.weight))
        .collect();

    let model = PredictionModel {
        height: LinearModel::fit("height", &height_series)?,
        weight: LinearModel::fit("weight", &weight_series)?,
    };

    // the timeline is sorted, so the last entry is the most recent
    let last_age_months = ages[ages.len() - 1];
    let target_age_months = last_age_months.checked_add(horizon_months).ok_or(
        GrowthError::HorizonOutOfRange {
            horizon_months,
            last_age_months,
        },
    )?;

    let predicted_height = model.height.predict(target_age_months);
    let predicted_weight = model.weight.predict(target_age_months);

    debug!(
        "Predicted member {} at {} months: {:.1} cm, {:.1} kg",
        member.id, target_age_months, predicted_height, predicted_weight
    );

    Ok(GrowthPrediction {
        member_id: member.id.clone(),
        gender: member.gender,
        horizon_months,
        last_age_months,
        target_age_months,
        predicted_height,
        predicted_weight,
        model,
        height_series,
        weight_series,
        reference_series: reference_series(member.gender),
    })
}
