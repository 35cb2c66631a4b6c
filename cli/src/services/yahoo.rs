use super::market_data::{MarketData, MarketDataProvider};
use crate::error::MarketDataError;
use crate::models::{PricePoint, PriceSeries};
use crate::utils::Timer;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate};
use rand::Rng;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::time::Duration as StdDuration;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct ChartMeta {
    #[serde(default, rename = "gmtoffset")]
    gmt_offset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Daily history from the Yahoo Finance chart endpoint.
pub struct YahooClient {
    client: Client,
    base_url: String,
    user_agents: Vec<String>,
    random_agent: bool,
}

impl YahooClient {
    pub fn new(random_agent: bool) -> Result<Self, MarketDataError> {
        Self::with_base_url(DEFAULT_YAHOO_BASE_URL, random_agent)
    }

    pub fn with_base_url(base_url: &str, random_agent: bool) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(30))
            .gzip(true)
            .build()?;

        let user_agents = vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15".to_string(),
        ];

        Ok(YahooClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agents,
            random_agent,
        })
    }

    fn get_user_agent(&self) -> &str {
        let index = if self.random_agent {
            rand::rng().random_range(0..self.user_agents.len())
        } else {
            0
        };
        &self.user_agents[index]
    }

    /// Unix seconds at UTC midnight of `start` and of the day after `end`.
    pub fn period_bounds(start: NaiveDate, end: NaiveDate) -> (i64, i64) {
        let period1 = start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let period2 = (end + ChronoDuration::days(1))
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp();
        (period1, period2)
    }

    /// Turn a chart response body into a series clipped to `[start, end]`.
    pub fn parse_chart(
        symbol: &str,
        body: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MarketData, MarketDataError> {
        let envelope: ChartEnvelope = serde_json::from_str(body)?;

        if let Some(error) = envelope.chart.error {
            debug!(
                symbol,
                code = %error.code,
                description = error.description.as_deref().unwrap_or(""),
                "Provider reported no chart"
            );
            return Ok(MarketData::NoData {
                symbol: symbol.to_string(),
            });
        }

        let Some(result) = envelope.chart.result.and_then(|r| r.into_iter().next()) else {
            return Ok(MarketData::NoData {
                symbol: symbol.to_string(),
            });
        };

        let closes = result
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|q| q.close)
            .unwrap_or_default();

        if !result.timestamp.is_empty() && closes.len() != result.timestamp.len() {
            return Err(MarketDataError::InvalidResponse(format!(
                "{} timestamps but {} closes",
                result.timestamp.len(),
                closes.len()
            )));
        }

        let mut points = Vec::with_capacity(closes.len());
        for (i, (&timestamp, close)) in result.timestamp.iter().zip(closes).enumerate() {
            let Some(close) = close else {
                continue;
            };
            let date = timestamp
                .checked_add(result.meta.gmt_offset)
                .and_then(|local| DateTime::from_timestamp(local, 0))
                .ok_or_else(|| {
                    MarketDataError::InvalidResponse(format!(
                        "Cannot convert timestamp {} at index {}",
                        timestamp, i
                    ))
                })?
                .date_naive();

            if date >= start && date <= end && close.is_finite() {
                points.push(PricePoint::new(date, close));
            }
        }

        Ok(MarketData::from_series(PriceSeries::new(symbol, points)))
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    #[instrument(skip(self))]
    async fn fetch_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MarketData, MarketDataError> {
        if start > end {
            return Err(MarketDataError::InvalidRange { start, end });
        }

        let (period1, period2) = Self::period_bounds(start, end);
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let timer = Timer::start("market data fetch");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .header(header::ACCEPT, "application/json, text/plain, */*")
            .header(header::USER_AGENT, self.get_user_agent())
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            warn!(symbol, "Provider does not know this symbol");
            return Ok(MarketData::NoData {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            return Err(MarketDataError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        let data = Self::parse_chart(symbol, &body, start, end)?;
        match &data {
            MarketData::Series(series) => info!(
                symbol,
                rows = series.len(),
                elapsed_ms = timer.elapsed_ms(),
                "Fetched closing prices"
            ),
            MarketData::NoData { .. } => warn!(symbol, "Provider returned no rows"),
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answer a single request with `status_line` and `body`; returns the base URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{}", addr)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_bounds_include_end_date() {
        let (p1, p2) = YahooClient::period_bounds(date(2024, 1, 1), date(2024, 1, 2));
        assert_eq!(p1, 1_704_067_200);
        assert_eq!(p2 - p1, 2 * 86_400);
    }

    #[test]
    fn test_parse_chart_skips_null_closes() {
        // 2024-01-02..04 09:00 in UTC+8
        let body = r#"{"chart":{"result":[{
            "meta":{"currency":"MYR","symbol":"4197.KL","gmtoffset":28800},
            "timestamp":[1704157200,1704243600,1704330000],
            "indicators":{"quote":[{"close":[2.31,null,2.35]}]}
        }],"error":null}}"#;

        let data =
            YahooClient::parse_chart("4197.KL", body, date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        let MarketData::Series(series) = data else {
            panic!("expected a series");
        };
        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0].date, date(2024, 1, 2));
        assert_eq!(series.points()[1].date, date(2024, 1, 4));
        assert_eq!(series.closes(), vec![2.31, 2.35]);
    }

    #[test]
    fn test_parse_chart_clips_to_range() {
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":0},
            "timestamp":[1704153600,1704240000],
            "indicators":{"quote":[{"close":[1.0,2.0]}]}
        }],"error":null}}"#;

        let data =
            YahooClient::parse_chart("X", body, date(2024, 1, 3), date(2024, 1, 3)).unwrap();
        let MarketData::Series(series) = data else {
            panic!("expected a series");
        };
        assert_eq!(series.closes(), vec![2.0]);
    }

    #[test]
    fn test_parse_chart_error_is_no_data() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let data = YahooClient::parse_chart("NOPE", body, date(2024, 1, 1), date(2024, 2, 1)).unwrap();
        assert_eq!(
            data,
            MarketData::NoData {
                symbol: "NOPE".to_string()
            }
        );
    }

    #[test]
    fn test_parse_chart_without_rows_is_no_data() {
        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":28800},"indicators":{"quote":[{}]}}],"error":null}}"#;
        let data =
            YahooClient::parse_chart("4197.KL", body, date(2024, 1, 6), date(2024, 1, 7)).unwrap();
        assert!(matches!(data, MarketData::NoData { .. }));
    }

    #[test]
    fn test_parse_chart_rejects_mismatched_arrays() {
        let body = r#"{"chart":{"result":[{"timestamp":[1,2],"indicators":{"quote":[{"close":[1.0]}]}}],"error":null}}"#;
        let result = YahooClient::parse_chart("X", body, date(1970, 1, 1), date(1970, 1, 2));
        assert!(matches!(result, Err(MarketDataError::InvalidResponse(_))));
    }

    #[test]
    fn test_parse_chart_rejects_overflowing_offset() {
        let body = r#"{"chart":{"result":[{
            "meta":{"gmtoffset":9223372036854775807},
            "timestamp":[1704153600],
            "indicators":{"quote":[{"close":[1.0]}]}
        }],"error":null}}"#;
        let result = YahooClient::parse_chart("X", body, date(2024, 1, 1), date(2024, 1, 31));
        assert!(matches!(result, Err(MarketDataError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_not_found_is_no_data() {
        let base_url = serve_once("404 Not Found", "").await;
        let client = YahooClient::with_base_url(&base_url, false).unwrap();
        let result = client
            .fetch_closes("4197.KL", date(2024, 1, 1), date(2024, 1, 31))
            .await
            .unwrap();
        assert_eq!(
            result,
            MarketData::NoData {
                symbol: "4197.KL".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_server_error_is_status_failure() {
        let base_url = serve_once("503 Service Unavailable", "").await;
        let client = YahooClient::with_base_url(&base_url, false).unwrap();
        let result = client
            .fetch_closes("4197.KL", date(2024, 1, 1), date(2024, 1, 31))
            .await;
        assert!(matches!(
            result,
            Err(MarketDataError::Status { ref symbol, status: 503 }) if symbol == "4197.KL"
        ));
    }

    #[tokio::test]
    async fn test_fetch_closes_parses_served_chart() {
        let base_url = serve_once(
            "200 OK",
            r#"{"chart":{"result":[{"meta":{"gmtoffset":0},"timestamp":[1704153600,1704240000],"indicators":{"quote":[{"close":[1.5,1.6]}]}}],"error":null}}"#,
        )
        .await;
        let client = YahooClient::with_base_url(&base_url, false).unwrap();
        let result = client
            .fetch_closes("4197.KL", date(2024, 1, 1), date(2024, 1, 31))
            .await
            .unwrap();
        let MarketData::Series(series) = result else {
            panic!("expected a series");
        };
        assert_eq!(series.closes(), vec![1.5, 1.6]);
    }

    #[tokio::test]
    async fn test_rejects_inverted_range() {
        let client = YahooClient::new(false).unwrap();
        let result = client
            .fetch_closes("4197.KL", date(2024, 2, 1), date(2024, 1, 1))
            .await;
        assert!(matches!(result, Err(MarketDataError::InvalidRange { .. })));
    }
}
