use common::EventWindow;
use plotly::common::{Line, Mode, Title};
use plotly::layout::{Axis, Shape, ShapeLayer, ShapeLine, ShapeType};
use plotly::{Layout, Plot, Scatter};

use crate::iso_dates;

/// Daily high inside the event window, with one shaded rectangle per
/// highlighted sub-range spanning the full plot height.
pub fn event_window_chart(window: &EventWindow) -> Plot {
    let dates = iso_dates(window.points.iter().map(|p| p.date));
    let highs: Vec<f64> = window.points.iter().map(|p| p.high).collect();

    let trace = Scatter::new(dates, highs)
        .name(&window.label)
        .mode(Mode::Lines)
        .line(Line::new().width(2.0));

    let shapes = window
        .highlights
        .iter()
        .map(|h| {
            Shape::new()
                .shape_type(ShapeType::Rect)
                .x_ref("x")
                .y_ref("paper")
                .x0(h.range.start.format("%Y-%m-%d").to_string())
                .x1(h.range.end.format("%Y-%m-%d").to_string())
                .y0(0.0)
                .y1(1.0)
                .fill_color(h.color.clone())
                .opacity(0.5)
                .layer(ShapeLayer::Below)
                .line(ShapeLine::new().width(0.0))
        })
        .collect();

    let layout = Layout::new()
        .title(Title::with_text(&window.title))
        .x_axis(
            Axis::new()
                .title(Title::with_text("Date"))
                .range(iso_dates([window.range.start, window.range.end])),
        )
        .y_axis(Axis::new().title(Title::with_text("High")))
        .shapes(shapes);

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure_json;
    use chrono::NaiveDate;
    use common::{DateRange, HighPoint, HighlightWindow};

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, m, d).unwrap()
    }

    fn window() -> EventWindow {
        EventWindow {
            label: "ICICI Bank".to_string(),
            title: "ICICI Bank: lockdown".to_string(),
            range: DateRange::new(date(1, 1), date(6, 30)),
            highlights: vec![
                HighlightWindow {
                    label: "Phase 1 Lockdown".to_string(),
                    range: DateRange::new(date(3, 23), date(4, 14)),
                    color: "Red".to_string(),
                },
                HighlightWindow {
                    label: "Phase 2 Lockdown".to_string(),
                    range: DateRange::new(date(4, 15), date(5, 3)),
                    color: "Green".to_string(),
                },
            ],
            points: vec![
                HighPoint { date: date(3, 2), high: 520.0 },
                HighPoint { date: date(3, 3), high: 515.5 },
            ],
        }
    }

    #[test]
    fn test_event_chart_shapes() {
        let figure = figure_json(&event_window_chart(&window()));
        let shapes = figure["layout"]["shapes"].as_array().unwrap();

        assert_eq!(shapes.len(), 2);
        for shape in shapes {
            assert_eq!(shape["type"], "rect");
            assert_eq!(shape["xref"], "x");
            assert_eq!(shape["yref"], "paper");
            assert_eq!(shape["y0"], 0.0);
            assert_eq!(shape["y1"], 1.0);
            assert_eq!(shape["opacity"], 0.5);
            assert_eq!(shape["layer"], "below");
            assert_eq!(shape["line"]["width"], 0.0);
        }
        assert_eq!(shapes[0]["x0"], "2020-03-23");
        assert_eq!(shapes[0]["x1"], "2020-04-14");
        assert_eq!(shapes[0]["fillcolor"], "Red");
        assert_eq!(shapes[1]["x0"], "2020-04-15");
        assert_eq!(shapes[1]["x1"], "2020-05-03");
        assert_eq!(shapes[1]["fillcolor"], "Green");
    }

    #[test]
    fn test_event_chart_trace_and_range() {
        let figure = figure_json(&event_window_chart(&window()));

        assert_eq!(figure["data"][0]["y"][1], 515.5);
        assert_eq!(figure["data"][0]["x"][0], "2020-03-02");
        assert_eq!(figure["layout"]["xaxis"]["range"][0], "2020-01-01");
        assert_eq!(figure["layout"]["xaxis"]["range"][1], "2020-06-30");
        assert_eq!(figure["layout"]["title"]["text"], "ICICI Bank: lockdown");
    }
}
