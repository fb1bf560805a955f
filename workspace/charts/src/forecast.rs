use common::{ForecastTable, PriceHistory, SeasonalProfile};
use plotly::common::{Fill, Line, Marker, Mode, Title};
use plotly::layout::{Axis, GridPattern, LayoutGrid, RangeSlider};
use plotly::{Layout, Plot, Scatter};

use crate::iso_dates;

const BAND_COLOR: &str = "rgba(0, 114, 178, 0.2)";
const LINE_COLOR: &str = "#0072B2";

/// Point forecast with its uncertainty band and the historical closes.
pub fn forecast_chart(history: &PriceHistory, table: &ForecastTable) -> Plot {
    let ds = iso_dates(table.rows.iter().map(|r| r.ds));

    let actual = Scatter::new(iso_dates(history.dates()), history.closes())
        .name("Actual")
        .mode(Mode::Markers)
        .marker(Marker::new().color("black").size(3));
    let upper = Scatter::new(ds.clone(), table.rows.iter().map(|r| r.yhat_upper).collect())
        .name("Upper Bound")
        .mode(Mode::Lines)
        .line(Line::new().width(0.0))
        .show_legend(false);
    let lower = Scatter::new(ds.clone(), table.rows.iter().map(|r| r.yhat_lower).collect())
        .name("Lower Bound")
        .mode(Mode::Lines)
        .line(Line::new().width(0.0))
        .fill(Fill::ToNextY)
        .fill_color(BAND_COLOR)
        .show_legend(false);
    let predicted = Scatter::new(ds, table.rows.iter().map(|r| r.yhat).collect())
        .name("Predicted")
        .mode(Mode::Lines)
        .line(Line::new().color(LINE_COLOR).width(2.0));

    let layout = Layout::new()
        .title(Title::with_text(&format!("Forecast plot for {} years", table.horizon_years)))
        .x_axis(
            Axis::new()
                .title(Title::with_text("Date"))
                .range_slider(RangeSlider::new().visible(true)),
        )
        .y_axis(Axis::new().title(Title::with_text("Close")));

    let mut plot = Plot::new();
    plot.add_trace(actual);
    plot.add_trace(upper);
    plot.add_trace(lower);
    plot.add_trace(predicted);
    plot.set_layout(layout);
    plot
}

/// One panel per component: the trend (with its band) over the whole
/// forecast range, then each seasonal profile over one period.
pub fn components_chart(table: &ForecastTable, profiles: &[SeasonalProfile]) -> Plot {
    let ds = iso_dates(table.rows.iter().map(|r| r.ds));
    let mut plot = Plot::new();

    plot.add_trace(
        Scatter::new(ds.clone(), table.rows.iter().map(|r| r.trend_upper).collect())
            .name("trend_upper")
            .mode(Mode::Lines)
            .line(Line::new().width(0.0))
            .show_legend(false),
    );
    plot.add_trace(
        Scatter::new(ds.clone(), table.rows.iter().map(|r| r.trend_lower).collect())
            .name("trend_lower")
            .mode(Mode::Lines)
            .line(Line::new().width(0.0))
            .fill(Fill::ToNextY)
            .fill_color(BAND_COLOR)
            .show_legend(false),
    );
    plot.add_trace(
        Scatter::new(ds, table.rows.iter().map(|r| r.trend).collect())
            .name("trend")
            .mode(Mode::Lines)
            .line(Line::new().color(LINE_COLOR).width(2.0)),
    );

    for (i, profile) in profiles.iter().enumerate() {
        let axis = i + 2;
        plot.add_trace(
            Scatter::new(profile.x.clone(), profile.y.clone())
                .name(&profile.name)
                .mode(Mode::Lines)
                .line(Line::new().color(LINE_COLOR).width(2.0))
                .x_axis(&format!("x{}", axis))
                .y_axis(&format!("y{}", axis)),
        );
    }

    let panels = 1 + profiles.len();
    let mut layout = Layout::new()
        .title(Title::with_text("Forecast components"))
        .show_legend(false)
        .height(300 * panels)
        .grid(
            LayoutGrid::new()
                .rows(panels)
                .columns(1)
                .pattern(GridPattern::Independent),
        )
        .x_axis(Axis::new().title(Title::with_text("ds")))
        .y_axis(Axis::new().title(Title::with_text("trend")));

    for (i, profile) in profiles.iter().enumerate() {
        let x_axis = Axis::new().title(Title::with_text(&profile.axis_title));
        let y_axis = Axis::new().title(Title::with_text(&profile.name));
        layout = match i {
            0 => layout.x_axis2(x_axis).y_axis2(y_axis),
            1 => layout.x_axis3(x_axis).y_axis3(y_axis),
            2 => layout.x_axis4(x_axis).y_axis4(y_axis),
            // only yearly, weekly and daily exist
            _ => layout,
        };
    }

    plot.set_layout(layout);
    plot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure_json;
    use chrono::{Days, NaiveDate};
    use common::{ForecastPoint, PricePoint};

    fn table() -> ForecastTable {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ForecastTable {
            label: "TCS".to_string(),
            horizon_years: 2,
            history_rows: 2,
            components: vec!["weekly".to_string()],
            rows: (0..4)
                .map(|d| ForecastPoint {
                    ds: start + Days::new(d),
                    trend: 10.0,
                    trend_lower: 9.0,
                    trend_upper: 11.0,
                    yhat: 10.5,
                    yhat_lower: 9.5,
                    yhat_upper: 11.5,
                    additive_terms: 0.5,
                    yearly: None,
                    weekly: Some(0.5),
                    daily: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_forecast_chart_layers() {
        let history = PriceHistory::new(
            "TCS",
            "TCS.NS",
            vec![PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                open: 1.0,
                high: 1.0,
                low: 1.0,
                close: 1.0,
                adj_close: None,
                volume: 0,
            }],
        );
        let figure = figure_json(&forecast_chart(&history, &table()));
        let data = figure["data"].as_array().unwrap();

        let names: Vec<&str> = data.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Actual", "Upper Bound", "Lower Bound", "Predicted"]);
        assert_eq!(data[2]["fill"], "tonexty");
        assert_eq!(data[3]["x"].as_array().unwrap().len(), 4);
        assert_eq!(figure["layout"]["xaxis"]["title"]["text"], "Date");
        assert_eq!(figure["layout"]["yaxis"]["title"]["text"], "Close");
        assert_eq!(figure["layout"]["title"]["text"], "Forecast plot for 2 years");
    }

    #[test]
    fn test_components_chart_panels() {
        let profiles = vec![
            SeasonalProfile {
                name: "weekly".to_string(),
                axis_title: "Day of week".to_string(),
                x: vec!["Sunday".to_string(), "Monday".to_string()],
                y: vec![0.1, -0.1],
            },
            SeasonalProfile {
                name: "daily".to_string(),
                axis_title: "Hour of day".to_string(),
                x: vec!["00:00".to_string()],
                y: vec![0.0],
            },
        ];
        let figure = figure_json(&components_chart(&table(), &profiles));
        let data = figure["data"].as_array().unwrap();

        assert_eq!(data.len(), 5);
        assert_eq!(data[3]["name"], "weekly");
        assert_eq!(data[3]["xaxis"], "x2");
        assert_eq!(data[4]["yaxis"], "y3");
        assert_eq!(figure["layout"]["grid"]["rows"], 3);
        assert_eq!(figure["layout"]["yaxis3"]["title"]["text"], "daily");
    }
}
