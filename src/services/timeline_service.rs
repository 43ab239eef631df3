use crate::models::{Measurement, Member, Timeline, TimelineEntry};

/// Merge a member's baseline and incremental measurements into one
/// ascending, delta-annotated timeline.
///
/// Measurements whose height or weight is not a finite positive number are
/// left out. Equal timestamps keep input order: baseline first, then the
/// incremental list as stored.
pub fn build_timeline(member: &Member) -> Timeline {
    let mut valid: Vec<(usize, &Measurement)> = member
        .measurements()
        .enumerate()
        .filter(|(_, m)| m.is_valid())
        .collect();

    valid.sort_by_key(|&(position, m)| (m.timestamp, position));

    let mut entries: Vec<TimelineEntry> = Vec::with_capacity(valid.len());
    let mut previous: Option<&Measurement> = None;
    for (_, measurement) in valid {
        let (height_delta, weight_delta) = match previous {
            Some(prev) => (
                Some(round_delta(measurement.height - prev.height)),
                Some(round_delta(measurement.weight - prev.weight)),
            ),
            None => (None, None),
        };

        entries.push(TimelineEntry {
            measurement: measurement.clone(),
            height_delta,
            weight_delta,
        });
        previous = Some(measurement);
    }

    Timeline::from_entries(entries)
}

/// One decimal place; `-0.0` is normalised to `0.0`
fn round_delta(delta: f64) -> f64 {
    (delta * 10.0).round() / 10.0 + 0.0
}
