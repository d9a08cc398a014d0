use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;

use crate::models::{PriceSeries, StockProfile};

pub const DATE_AXIS_TITLE: &str = "Date";
pub const PRICE_AXIS_TITLE: &str = "Price (USD)";

/// A single-trace line chart of daily closes.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub trace_name: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    pub dates: Vec<NaiveDate>,
    pub closes: Vec<f64>,
}

impl ChartSpec {
    pub fn for_profile(profile: &StockProfile, series: &PriceSeries) -> Self {
        let (dates, closes) = series
            .points()
            .iter()
            .map(|p| (p.date, p.close))
            .unzip();

        Self {
            title: format!(
                "1-Year Historical Prices for {} ({})",
                profile.display_name(),
                profile.ticker
            ),
            trace_name: format!("{} Close Price", profile.ticker),
            x_axis_title: DATE_AXIS_TITLE.to_string(),
            y_axis_title: PRICE_AXIS_TITLE.to_string(),
            dates,
            closes,
        }
    }

    /// Plotly figure (`data` + `layout`) ready for `Plotly.newPlot`.
    pub fn to_plotly_figure(&self) -> serde_json::Value {
        let x: Vec<String> = self
            .dates
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect();

        json!({
            "data": [{
                "type": "scatter",
                "mode": "lines",
                "name": self.trace_name,
                "x": x,
                "y": self.closes,
            }],
            "layout": {
                "title": { "text": self.title },
                "xaxis": { "title": { "text": self.x_axis_title }, "gridcolor": "#ebf0f8" },
                "yaxis": { "title": { "text": self.y_axis_title }, "gridcolor": "#ebf0f8" },
                "paper_bgcolor": "white",
                "plot_bgcolor": "white",
            }
        })
    }
}

/// The tabular part of a report; this is what gets exported.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub rows: Vec<StockProfile>,
    pub generated_at: DateTime<Utc>,
}

/// Everything one `/stock` request renders. `charts[i]` belongs to `rows[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBundle {
    pub rows: Vec<StockProfile>,
    pub charts: Vec<ChartSpec>,
}

impl ReportBundle {
    pub fn table(&self) -> ReportTable {
        ReportTable {
            rows: self.rows.clone(),
            generated_at: Utc::now(),
        }
    }
}
