use common::PriceHistory;
use plotly::common::{Line, Mode, Title};
use plotly::layout::{Axis, RangeSlider};
use plotly::{Layout, Plot, Scatter};

use crate::iso_dates;

pub const RAW_CHART_TITLE: &str = "Time Series data with Rangeslider";

/// Open and close prices against date with a range slider under the x axis.
pub fn raw_price_chart(history: &PriceHistory) -> Plot {
    let dates = iso_dates(history.dates());

    let open = Scatter::new(dates.clone(), history.opens())
        .name("stock_open")
        .mode(Mode::Lines)
        .line(Line::new().width(1.5));
    let close = Scatter::new(dates, history.closes())
        .name("stock_close")
        .mode(Mode::Lines)
        .line(Line::new().width(1.5));

    let layout = Layout::new()
        .title(Title::with_text(RAW_CHART_TITLE))
        .x_axis(
            Axis::new()
                .title(Title::with_text("Date"))
                .range_slider(RangeSlider::new().visible(true)),
        )
        .y_axis(Axis::new().title(Title::with_text("Price")));

    let mut plot = Plot::new();
    plot.add_trace(open);
    plot.add_trace(close);
    plot.set_layout(layout);
    plot
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::figure_json;
    use chrono::NaiveDate;
    use common::PricePoint;

    #[test]
    fn test_raw_chart_traces_and_slider() {
        let points = (2..=4)
            .map(|day| PricePoint {
                date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                open: day as f64,
                high: 10.0,
                low: 0.0,
                close: day as f64 + 0.5,
                adj_close: None,
                volume: 1,
            })
            .collect();
        let history = PriceHistory::new("TCS", "TCS.NS", points);

        let figure = figure_json(&raw_price_chart(&history));
        let data = figure["data"].as_array().unwrap();

        assert_eq!(data.len(), 2);
        assert_eq!(data[0]["name"], "stock_open");
        assert_eq!(data[1]["name"], "stock_close");
        assert_eq!(data[0]["x"][0], "2024-01-02");
        assert_eq!(data[1]["y"][2], 4.5);
        assert_eq!(figure["layout"]["title"]["text"], RAW_CHART_TITLE);
        assert_eq!(figure["layout"]["xaxis"]["rangeslider"]["visible"], true);
    }
}
