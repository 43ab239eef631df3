use std::fmt::Write;

use crate::models::{Measurement, Member};

/// name, date of birth, record date, height (cm), weight (kg), BMI
pub const CSV_HEADER: &str = "이름,생년월일,기록일,키(cm),몸무게(kg),BMI";

const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";

/// One row per measurement: each member's baseline, then its incremental
/// measurements in stored order. Values are written as stored.
pub fn to_csv(members: &[Member]) -> String {
    let mut csv = String::with_capacity(64 * (members.len() + 1));
    csv.push_str(CSV_HEADER);
    csv.push('\n');

    for member in members {
        for measurement in member.measurements() {
            push_row(&mut csv, member, measurement);
        }
    }

    csv
}

fn push_row(csv: &mut String, member: &Member, measurement: &Measurement) {
    // writing into a String cannot fail
    let _ = writeln!(
        csv,
        "{},{},{},{},{},{}",
        escape_field(&member.name),
        member.date_of_birth,
        measurement.timestamp.format(RECORD_DATE_FORMAT),
        measurement.height,
        measurement.weight,
        measurement.bmi,
    );
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
