use crate::error::MarketDataError;
use crate::models::PriceSeries;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Outcome of a history request that reached the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum MarketData {
    Series(PriceSeries),
    /// Provider answered with no rows: unknown symbol or no trading days in range.
    NoData { symbol: String },
}

impl MarketData {
    pub fn from_series(series: PriceSeries) -> Self {
        if series.is_empty() {
            MarketData::NoData {
                symbol: series.symbol().to_string(),
            }
        } else {
            MarketData::Series(series)
        }
    }
}

/// Source of daily closing prices for an inclusive date range.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    async fn fetch_closes(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MarketData, MarketDataError>;
}
