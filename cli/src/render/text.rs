use crate::models::{NewsItem, PriceSeries, Report, ReportBlock};
use crate::utils::format_date_range;

/// Plain-text report for terminals.
pub fn render_report(report: &Report) -> String {
    let mut out = String::new();
    for block in &report.blocks {
        out.push_str(&render_block(block));
        out.push('\n');
    }
    out
}

fn render_block(block: &ReportBlock) -> String {
    match block {
        ReportBlock::Status(message) => message.clone(),
        ReportBlock::Success(message) => format!("[ok] {}", message),
        ReportBlock::Warning(message) => format!("[warning] {}", message),
        ReportBlock::Error(message) => format!("[error] {}", message),
        ReportBlock::PriceChart(series) => summarize_series(series),
        ReportBlock::NewsTable(items) => news_table(items),
        ReportBlock::Prediction(prediction) => {
            format!("\nStock Price Prediction\n{}", prediction)
        }
    }
}

fn summarize_series(series: &PriceSeries) -> String {
    match (series.first(), series.last(), series.min_close(), series.max_close()) {
        (Some(first), Some(last), Some(min), Some(max)) => format!(
            "\nStock Price History\n{}: {} closes, {}, low {:.2}, high {:.2}, last {:.2}",
            series.symbol(),
            series.len(),
            format_date_range(first.date, last.date),
            min,
            max,
            last.close
        ),
        _ => format!("\nStock Price History\n{}: no closes", series.symbol()),
    }
}

fn news_table(items: &[NewsItem]) -> String {
    let mut out = String::from("\nNews Sentiment Analysis\n");
    out.push_str(&format!("{:>9}  {:<31}  {}\n", "sentiment", "published", "title"));
    for item in items {
        out.push_str(&format!(
            "{:>9.4}  {:<31}  {}\n",
            item.sentiment,
            item.published.to_string(),
            item.title
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PricePoint, Published};
    use chrono::NaiveDate;

    #[test]
    fn test_render_report_lines() {
        let mut report = Report::new("run");
        report.status("Fetching stock data...");
        report.error("No stock data found! Please check the ticker symbol.");

        let text = render_report(&report);
        assert_eq!(
            text,
            "Fetching stock data...\n[error] No stock data found! Please check the ticker symbol.\n"
        );
    }

    #[test]
    fn test_series_and_news_sections() {
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let series = PriceSeries::new(
            "4197.KL",
            vec![
                PricePoint::new(day, 2.5),
                PricePoint::new(day.succ_opt().unwrap(), 2.1),
            ],
        );
        let mut report = Report::new("run");
        report.push(ReportBlock::PriceChart(series));
        report.push(ReportBlock::NewsTable(vec![NewsItem {
            title: "Sime Darby wins contract".to_string(),
            published: Published::Unavailable,
            sentiment: 0.5719,
        }]));

        let text = render_report(&report);
        assert!(text.contains("4197.KL: 2 closes, 2024-01-02 to 2024-01-03, low 2.10, high 2.50, last 2.10"));
        assert!(text.contains("   0.5719  No Date Available"));
        assert!(text.contains("Sime Darby wins contract"));
    }
}
