//! Server-rendered HTML pages.

use uuid::Uuid;

use crate::models::{ReportBundle, PROFILE_COLUMNS};

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css";
const BOOTSTRAP_JS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/js/bootstrap.bundle.min.js";
const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, download_href: &str, head_extra: &str, body: &str) -> String {
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link href="{BOOTSTRAP_CSS}" rel="stylesheet">
    {head_extra}
</head>
<body>
    <nav class="navbar navbar-expand-lg navbar-light bg-light shadow-sm">
        <div class="container-fluid">
            <a class="navbar-brand" href="/">Stock Tracker</a>
            <button class="navbar-toggler" type="button" data-bs-toggle="collapse" data-bs-target="#navbarNav" aria-controls="navbarNav" aria-expanded="false" aria-label="Toggle navigation">
                <span class="navbar-toggler-icon"></span>
            </button>
            <div class="collapse navbar-collapse" id="navbarNav">
                <ul class="navbar-nav ms-auto">
                    <li class="nav-item"><a class="nav-link" href="/">Home</a></li>
                    <li class="nav-item"><a class="nav-link" href="{download_href}">Download Excel</a></li>
                    <li class="nav-item"><a class="nav-link" href="/about">About</a></li>
                </ul>
            </div>
        </div>
    </nav>
{body}
    <footer class="bg-light text-center text-lg-start mt-5">
        <div class="container p-4">
            <p class="text-muted mb-0">&copy; Stock Performance Tracker. All Rights Reserved.</p>
        </div>
    </footer>
    <script src="{BOOTSTRAP_JS}"></script>
</body>
</html>
"##,
        title = escape(title),
    )
}

pub fn home_page() -> String {
    let body = r##"    <div class="container text-center mt-5">
        <h1 class="mb-4">Stock Performance Tracker</h1>
        <form action="/stock" method="get" class="d-flex justify-content-center">
            <input type="text" id="ticker" name="ticker" class="form-control me-2" placeholder="Enter tickers (e.g., AAPL, MSFT)" required>
            <button type="submit" class="btn btn-primary">Get Data</button>
        </form>
    </div>"##;
    layout("Stock Performance Tracker", "/download_excel", "", body)
}

pub fn about_page() -> String {
    let body = r##"    <div class="container mt-5">
        <h1 class="mb-4">About Stock Performance Tracker</h1>
        <p>Enter one or more ticker symbols separated by commas to see a snapshot of each
        company: current and previous prices, sector, industry, country, 52-week range,
        dividend rate, next earnings date and the day's open.</p>
        <p>Every ticker also gets a chart of its daily closing prices over the past year.
        Fields the data provider does not report are shown as <code>N/A</code>.</p>
        <p>The summary table of your last lookup can be downloaded as an Excel workbook
        (<code>stock_data.xlsx</code>) or as CSV.</p>
        <a class="btn btn-primary" href="/">Back to Home</a>
    </div>"##;
    layout("About - Stock Performance Tracker", "/download_excel", "", body)
}

// Keeps serialized JSON from closing the surrounding <script> element.
fn script_safe_json(value: &serde_json::Value) -> String {
    value.to_string().replace("</", "<\\/")
}

/// Results page: the summary table, then one chart per row in the same order.
pub fn stock_page(report: &ReportBundle, report_id: Uuid) -> String {
    let excel_href = format!("/download_excel?report={}", report_id);
    let csv_href = format!("/download_csv?report={}", report_id);

    let header: String = PROFILE_COLUMNS
        .iter()
        .map(|c| format!("<th scope=\"col\">{}</th>", escape(c)))
        .collect();

    let rows: String = report
        .rows
        .iter()
        .map(|profile| {
            let cells: String = profile
                .cells()
                .iter()
                .map(|cell| format!("<td>{}</td>", escape(&cell.to_string())))
                .collect();
            format!("                <tr>{}</tr>\n", cells)
        })
        .collect();

    let charts: String = report
        .charts
        .iter()
        .enumerate()
        .map(|(i, chart)| {
            format!(
                r##"        <div class="card mb-4 shadow-sm">
            <div class="card-body">
                <div id="chart-{i}" style="height: 450px;"></div>
                <script>
                    (function () {{
                        var fig = {figure};
                        Plotly.newPlot("chart-{i}", fig.data, fig.layout, {{responsive: true}});
                    }})();
                </script>
            </div>
        </div>
"##,
                figure = script_safe_json(&chart.to_plotly_figure()),
            )
        })
        .collect();

    let body = format!(
        r##"    <div class="container mt-5">
        <h1 class="mb-4">Stock Data</h1>
        <div class="table-responsive mb-3">
            <table class="table table-striped table-bordered align-middle">
                <thead class="table-light"><tr>{header}</tr></thead>
                <tbody>
{rows}                </tbody>
            </table>
        </div>
        <div class="mb-5">
            <a class="btn btn-success me-2" href="{excel_href}">Download Excel</a>
            <a class="btn btn-outline-secondary me-2" href="{csv_href}">Download CSV</a>
            <a class="btn btn-link" href="/">Back to Home</a>
        </div>
{charts}    </div>"##
    );

    let head_extra = format!(r#"<script src="{PLOTLY_JS}"></script>"#);
    layout("Stock Data - Stock Performance Tracker", &excel_href, &head_extra, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::domain::TickerSymbol;
    use crate::models::{ChartSpec, PricePoint, PriceSeries, ProfileQuote, StockProfile};

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<b>"AT&T's"</b>"#), "&lt;b&gt;&quot;AT&amp;T&#x27;s&quot;&lt;/b&gt;");
        assert_eq!(escape("Apple Inc."), "Apple Inc.");
    }

    #[test]
    fn test_script_safe_json() {
        let value = serde_json::json!({"title": "</script><script>alert(1)"});
        assert!(!script_safe_json(&value).contains("</script>"));
    }

    #[test]
    fn test_home_page_has_ticker_form() {
        let page = home_page();
        assert!(page.contains(r#"action="/stock""#));
        assert!(page.contains(r#"name="ticker""#));
        assert!(page.contains(r#"href="/about""#));
    }

    #[test]
    fn test_layout_keeps_navbar_toggle_target() {
        let page = about_page();
        assert!(page.contains(r##"data-bs-target="#navbarNav""##));
        assert!(page.contains(r#"id="navbarNav""#));
        assert!(page.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_stock_page_renders_rows_then_charts() {
        let profile = StockProfile::from_quote(
            TickerSymbol::parse("AAPL").unwrap(),
            ProfileQuote {
                short_name: Some("Apple <Inc.>".to_string()),
                ..Default::default()
            },
        );
        let series = PriceSeries::from_points(vec![PricePoint {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            close: 169.3,
        }]);
        let chart = ChartSpec::for_profile(&profile, &series);
        let report = ReportBundle {
            rows: vec![profile],
            charts: vec![chart],
        };
        let id = Uuid::new_v4();

        let page = stock_page(&report, id);

        assert!(page.contains("<td>AAPL</td>"));
        assert!(page.contains("<td>Apple &lt;Inc.&gt;</td>"));
        assert!(page.contains("<td>N/A</td>"));
        assert!(page.contains(&format!("/download_excel?report={}", id)));
        assert!(page.contains("chart-0"));
        assert!(page.contains("2024-05-01"));
        assert!(page.find("<table").unwrap() < page.find("chart-0").unwrap());
    }
}
