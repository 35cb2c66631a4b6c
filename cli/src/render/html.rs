//! Server-side HTML for the ticker form and forecast reports.

use super::chart::price_chart_svg;
use crate::models::{NewsItem, Report, ReportBlock, TickerTable};
use crate::utils::{format_date, today, DEFAULT_START_DATE};

pub const PAGE_TITLE: &str = "Stock Price Prediction & Sentiment Analysis";

const STYLE: &str = "body{font-family:sans-serif;margin:0;background:#fafafa;color:#222}\
main{max-width:960px;margin:0 auto;padding:24px}\
form{display:flex;gap:12px;flex-wrap:wrap;align-items:end;margin-bottom:24px}\
label{display:flex;flex-direction:column;font-size:14px}\
.alert{padding:10px 14px;border-radius:4px;margin:8px 0}\
.success{background:#e6f4ea}.warning{background:#fff4e5}.error{background:#fdecea}\
table{border-collapse:collapse;width:100%;font-size:14px}\
th,td{border-bottom:1px solid #ddd;padding:6px;text-align:left}\
.prediction{font-size:20px}";

/// Values echoed back into the form inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub ticker: String,
    pub start: String,
    pub end: String,
}

impl FormState {
    /// First table ticker, 2005-01-01 through today.
    pub fn with_defaults(tickers: &TickerTable) -> Self {
        Self {
            ticker: tickers.tickers().next().unwrap_or_default().to_string(),
            start: DEFAULT_START_DATE.to_string(),
            end: format_date(today()),
        }
    }
}

/// What goes below the form.
#[derive(Debug, Clone, Copy)]
pub enum PageContent<'a> {
    Empty,
    Report(&'a Report),
    Failure(&'a str),
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render_page(tickers: &TickerTable, form: &FormState, content: PageContent<'_>) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(PAGE_TITLE)));
    html.push_str(&format!("<style>{}</style>\n</head>\n<body>\n<main>\n", STYLE));
    html.push_str(&format!("<h1>{}</h1>\n", escape(PAGE_TITLE)));
    html.push_str(&render_form(tickers, form));

    match content {
        PageContent::Empty => {}
        PageContent::Report(report) => html.push_str(&render_report(report)),
        PageContent::Failure(message) => html.push_str(&alert("error", message)),
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_form(tickers: &TickerTable, form: &FormState) -> String {
    let mut html = String::from("<form method=\"post\" action=\"/predict\">\n");

    html.push_str("<label>Select a stock:<select name=\"ticker\">");
    for ticker in tickers.tickers() {
        let selected = if ticker == form.ticker { " selected" } else { "" };
        html.push_str(&format!(
            "<option value=\"{}\"{}>{} ({})</option>",
            escape(ticker),
            selected,
            escape(&tickers.display_name(ticker)),
            escape(ticker)
        ));
    }
    html.push_str("</select></label>\n");

    html.push_str(&format!(
        "<label>Start Date<input type=\"date\" name=\"start\" value=\"{}\"></label>\n",
        escape(&form.start)
    ));
    html.push_str(&format!(
        "<label>End Date<input type=\"date\" name=\"end\" value=\"{}\"></label>\n",
        escape(&form.end)
    ));
    html.push_str("<button type=\"submit\">Fetch &amp; Predict</button>\n</form>\n");
    html
}

fn alert(kind: &str, message: &str) -> String {
    format!("<div class=\"alert {}\">{}</div>\n", kind, escape(message))
}

pub fn render_report(report: &Report) -> String {
    let mut html = format!("<section data-run-id=\"{}\">\n", escape(&report.run_id));
    for block in &report.blocks {
        html.push_str(&render_block(block));
    }
    html.push_str("</section>\n");
    html
}

fn render_block(block: &ReportBlock) -> String {
    match block {
        ReportBlock::Status(message) => format!("<p class=\"status\">{}</p>\n", escape(message)),
        ReportBlock::Success(message) => alert("success", message),
        ReportBlock::Warning(message) => alert("warning", message),
        ReportBlock::Error(message) => alert("error", message),
        ReportBlock::PriceChart(series) => {
            let chart = match price_chart_svg(series) {
                Ok(svg) => svg,
                Err(error) => alert("error", &error.to_string()),
            };
            format!("<h2>Stock Price History</h2>\n<figure>{}</figure>\n", chart)
        }
        ReportBlock::NewsTable(items) => render_news_table(items),
        ReportBlock::Prediction(prediction) => format!(
            "<h2>Stock Price Prediction</h2>\n<p class=\"prediction\">{}</p>\n",
            escape(&prediction.to_string())
        ),
    }
}

fn render_news_table(items: &[NewsItem]) -> String {
    let mut html = String::from(
        "<h2>News Sentiment Analysis</h2>\n<table>\n<thead><tr><th>title</th><th>published</th><th>sentiment_score</th></tr></thead>\n<tbody>\n",
    );
    for item in items {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{:.4}</td></tr>\n",
            escape(&item.title),
            escape(&item.published.to_string()),
            item.sentiment
        ));
    }
    html.push_str("</tbody>\n</table>\n");
    html
}
