//! Reference growth curves.
//!
//! 50th percentile height by age (months) for each gender, from the 2017
//! national growth charts. Static data compiled into the crate; points are
//! returned as-is with no interpolation.

use crate::models::{Gender, SeriesPoint};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferencePoint {
    pub age_months: u32,
    pub height_cm: f64,
}

const fn point(age_months: u32, height_cm: f64) -> ReferencePoint {
    ReferencePoint {
        age_months,
        height_cm,
    }
}

pub static STANDARD_HEIGHT_MALE: &[ReferencePoint] = &[
    point(0, 49.9),
    point(3, 61.4),
    point(6, 67.6),
    point(9, 72.0),
    point(12, 75.7),
    point(18, 82.3),
    point(24, 87.1),
    point(30, 91.9),
    point(36, 96.5),
    point(48, 103.1),
    point(60, 109.6),
    point(72, 115.9),
    point(84, 122.1),
    point(96, 127.9),
    point(108, 133.4),
    point(120, 138.8),
    point(132, 144.7),
    point(144, 151.4),
    point(156, 158.6),
    point(168, 165.0),
    point(180, 169.2),
    point(192, 171.4),
    point(204, 172.6),
    point(216, 173.6),
];

pub static STANDARD_HEIGHT_FEMALE: &[ReferencePoint] = &[
    point(0, 49.1),
    point(3, 59.8),
    point(6, 65.7),
    point(9, 70.1),
    point(12, 74.0),
    point(18, 80.7),
    point(24, 85.7),
    point(30, 90.7),
    point(36, 95.4),
    point(48, 102.1),
    point(60, 108.6),
    point(72, 114.7),
    point(84, 120.8),
    point(96, 126.7),
    point(108, 132.6),
    point(120, 139.1),
    point(132, 145.8),
    point(144, 151.7),
    point(156, 155.9),
    point(168, 158.3),
    point(180, 159.5),
    point(192, 160.0),
    point(204, 160.2),
    point(216, 160.6),
];

pub fn standard_height(gender: Gender) -> &'static [ReferencePoint] {
    match gender {
        Gender::Male => STANDARD_HEIGHT_MALE,
        Gender::Female => STANDARD_HEIGHT_FEMALE,
    }
}

/// The reference table as a chart series
pub fn reference_series(gender: Gender) -> Vec<SeriesPoint> {
    standard_height(gender)
        .iter()
        .map(|p| SeriesPoint::new(p.age_months, p.height_cm))
        .collect()
}
