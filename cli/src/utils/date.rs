use chrono::{NaiveDate, Utc};

/// First day offered by the date pickers.
pub const DEFAULT_START_DATE: &str = "2005-01-01";

/// Parse a `YYYY-MM-DD` date string
pub fn parse_date(date_str: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("Invalid date '{}': {}", date_str, e))
}

/// Format a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2005, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Today's date in UTC
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format_round_trip() {
        let date = parse_date(" 2005-01-01 ").unwrap();
        assert_eq!(date, default_start_date());
        assert_eq!(format_date(date), DEFAULT_START_DATE);
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        assert!(parse_date("01/02/2005").is_err());
        assert!(parse_date("2005-13-01").is_err());
    }
}
