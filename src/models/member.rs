use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Measurement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            other => Err(format!("unknown gender '{}'", other)),
        }
    }
}

/// A tracked profile and its embedded measurements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub baseline_measurement: Measurement,
    pub incremental_measurements: Vec<Measurement>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Member {
    /// Baseline first, then incremental measurements in stored order
    pub fn measurements(&self) -> impl Iterator<Item = &Measurement> {
        std::iter::once(&self.baseline_measurement).chain(self.incremental_measurements.iter())
    }

    pub fn has_measurement_at(&self, timestamp: DateTime<Utc>) -> bool {
        self.measurements().any(|m| m.timestamp == timestamp)
    }

    /// Age in whole months on the given date
    pub fn age_in_months_on(&self, date: NaiveDate) -> u32 {
        age_in_months(self.date_of_birth, date)
    }
}

/// `12 * (year - birth year) + (month - birth month)`, clamped at 0.
/// Day of month is ignored.
pub fn age_in_months(date_of_birth: NaiveDate, on: NaiveDate) -> u32 {
    let months = 12 * (on.year() as i64 - date_of_birth.year() as i64)
        + (on.month() as i64 - date_of_birth.month() as i64);
    months.max(0) as u32
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMember {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub height: f64,
    pub weight: f64,
}

/// Profile edit request; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMember {
    pub name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

impl UpdateMember {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.date_of_birth.is_none() && self.gender.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_in_months_ignores_day() {
        assert_eq!(age_in_months(date(2020, 1, 31), date(2021, 1, 1)), 12);
        assert_eq!(age_in_months(date(2020, 5, 10), date(2020, 8, 9)), 3);
    }

    #[test]
    fn test_age_in_months_clamps_at_zero() {
        assert_eq!(age_in_months(date(2020, 5, 10), date(2020, 5, 30)), 0);
        assert_eq!(age_in_months(date(2020, 5, 10), date(2019, 12, 1)), 0);
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!("male".parse::<Gender>(), Ok(Gender::Male));
        assert_eq!("Female".parse::<Gender>(), Ok(Gender::Female));
        assert!("other".parse::<Gender>().is_err());
        assert_eq!(Gender::Female.to_string(), "female");
    }
}
