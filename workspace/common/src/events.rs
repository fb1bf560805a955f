use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A shaded sub-range of an event window.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct HighlightWindow {
    /// Short description of the period
    pub label: String,
    pub range: DateRange,
    /// CSS color name of the shaded rectangle
    pub color: String,
}

/// Daily high price at one date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct HighPoint {
    pub date: NaiveDate,
    pub high: f64,
}

/// Daily highs of one ticker inside a fixed calendar window, with the
/// sub-ranges to highlight.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct EventWindow {
    /// Catalog label
    pub label: String,
    /// Chart title
    pub title: String,
    /// Visible calendar window
    pub range: DateRange,
    /// Shaded sub-ranges, in drawing order
    pub highlights: Vec<HighlightWindow>,
    /// Daily highs inside the window
    pub points: Vec<HighPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2020, 3, 23).unwrap(),
            NaiveDate::from_ymd_opt(2020, 4, 14).unwrap(),
        );
        assert!(range.contains(NaiveDate::from_ymd_opt(2020, 3, 23).unwrap()));
        assert!(range.contains(NaiveDate::from_ymd_opt(2020, 4, 14).unwrap()));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2020, 4, 15).unwrap()));
    }
}
