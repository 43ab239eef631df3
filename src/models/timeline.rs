use serde::Serialize;

use super::Measurement;

/// Direction of a change between consecutive timeline entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeDirection {
    Increase,
    Decrease,
    Unchanged,
}

impl ChangeDirection {
    pub fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            ChangeDirection::Increase
        } else if delta < 0.0 {
            ChangeDirection::Decrease
        } else {
            ChangeDirection::Unchanged
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub measurement: Measurement,
    /// Change from the previous entry, rounded to 0.1; `None` on the first entry
    pub height_delta: Option<f64>,
    pub weight_delta: Option<f64>,
}

impl TimelineEntry {
    pub fn height_change(&self) -> Option<ChangeDirection> {
        self.height_delta.map(ChangeDirection::from_delta)
    }

    pub fn weight_change(&self) -> Option<ChangeDirection> {
        self.weight_delta.map(ChangeDirection::from_delta)
    }
}

/// How much history a timeline holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineState {
    Empty,
    Single,
    Series,
}

/// Chronologically ordered, delta-annotated measurements of one member
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub(crate) fn from_entries(entries: Vec<TimelineEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first(&self) -> Option<&TimelineEntry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&TimelineEntry> {
        self.entries.last()
    }

    pub fn state(&self) -> TimelineState {
        match self.entries.len() {
            0 => TimelineState::Empty,
            1 => TimelineState::Single,
            _ => TimelineState::Series,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimelineEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a TimelineEntry;
    type IntoIter = std::slice::Iter<'a, TimelineEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
