//! Daily highs around the 2020 lockdown phases.

use chrono::NaiveDate;
use common::{DateRange, EventWindow, HighPoint, HighlightWindow, PriceHistory};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Visible calendar window of the event chart.
pub fn lockdown_window() -> DateRange {
    DateRange::new(date(2020, 1, 1), date(2020, 6, 30))
}

/// The two shaded sub-ranges, in drawing order.
pub fn lockdown_phases() -> Vec<HighlightWindow> {
    vec![
        HighlightWindow {
            label: "Phase 1 Lockdown".to_string(),
            range: DateRange::new(date(2020, 3, 23), date(2020, 4, 14)),
            color: "Red".to_string(),
        },
        HighlightWindow {
            label: "Phase 2 Lockdown".to_string(),
            range: DateRange::new(date(2020, 4, 15), date(2020, 5, 3)),
            color: "Green".to_string(),
        },
    ]
}

pub fn event_title(title: &str) -> String {
    format!(
        "{}: Day's High Price during Phase 1 Lockdown(RED)(25 March \u{2013} 14 April) and Phase 2 Lockdown (GREEN)(15 April \u{2013} 3 May)",
        title
    )
}

/// Restricts `history` to the lockdown window and attaches the phases.
/// `title` is the display title of the ticker.
pub fn event_window(history: &PriceHistory, title: &str) -> EventWindow {
    let range = lockdown_window();
    EventWindow {
        label: history.label.clone(),
        title: event_title(title),
        range,
        highlights: lockdown_phases(),
        points: history
            .points
            .iter()
            .filter(|p| range.contains(p.date))
            .map(|p| HighPoint {
                date: p.date,
                high: p.high,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::PricePoint;

    #[test]
    fn test_event_window_filters_to_range() {
        let dates = [
            date(2019, 12, 31),
            date(2020, 1, 1),
            date(2020, 4, 1),
            date(2020, 6, 30),
            date(2020, 7, 1),
        ];
        let points = dates
            .into_iter()
            .map(|d| PricePoint {
                date: d,
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                adj_close: None,
                volume: 1,
            })
            .collect();
        let history = PriceHistory::new("RIL", "RELIANCE.NS", points);

        let window = event_window(&history, "RIL");

        assert_eq!(window.label, "RIL");
        assert!(window.title.starts_with("RIL: Day's High Price during Phase 1 Lockdown(RED)"));
        assert_eq!(
            window.points.iter().map(|p| p.date).collect::<Vec<_>>(),
            vec![date(2020, 1, 1), date(2020, 4, 1), date(2020, 6, 30)]
        );
        assert!(window.points.iter().all(|p| p.high == 2.0));
    }

    #[test]
    fn test_lockdown_phases() {
        let phases = lockdown_phases();

        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].color, "Red");
        assert_eq!(phases[0].range, DateRange::new(date(2020, 3, 23), date(2020, 4, 14)));
        assert_eq!(phases[1].color, "Green");
        assert_eq!(phases[1].range, DateRange::new(date(2020, 4, 15), date(2020, 5, 3)));
        assert!(phases.iter().all(|p| lockdown_window().contains(p.range.start)));
    }
}
