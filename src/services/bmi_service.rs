use serde::Serialize;
use std::fmt;

pub use crate::models::calculate_bmi;

const UNDERWEIGHT_BELOW: f64 = 18.5;
const OVERWEIGHT_FROM: f64 = 23.0;
const OBESE_MILD_FROM: f64 = 25.0;
const OBESE_MODERATE_FROM: f64 = 30.0;

/// Bands in order of increasing BMI
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BmiBand {
    Underweight,
    Normal,
    Overweight,
    ObeseMild,
    ObeseModerate,
}

impl BmiBand {
    pub fn label(&self) -> &'static str {
        match self {
            BmiBand::Underweight => "underweight",
            BmiBand::Normal => "normal",
            BmiBand::Overweight => "overweight",
            BmiBand::ObeseMild => "obese-mild",
            BmiBand::ObeseModerate => "obese-moderate",
        }
    }
}

impl fmt::Display for BmiBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}


/// Lower bounds are inclusive
pub fn classify_bmi(value: f64) -> BmiBand {
    if value < UNDERWEIGHT_BELOW {
        BmiBand::Underweight
    } else if value < OVERWEIGHT_FROM {
        BmiBand::Normal
    } else if value < OBESE_MILD_FROM {
        BmiBand::Overweight
    } else if value < OBESE_MODERATE_FROM {
        BmiBand::ObeseMild
    } else {
        BmiBand::ObeseModerate
    }
}
