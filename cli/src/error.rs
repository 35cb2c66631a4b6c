use chrono::NaiveDate;
use thiserror::Error;

/// Failures talking to the market-data provider.
///
/// An empty result is not an error; it is reported as
/// [`MarketData::NoData`](crate::services::MarketData::NoData).
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("market data request failed with status {status} for {symbol}")]
    Status { symbol: String, status: u16 },
    #[error("invalid market data response: {0}")]
    InvalidResponse(String),
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("invalid symbol '{0}'")]
    InvalidSymbol(String),
}

impl From<serde_json::Error> for MarketDataError {
    fn from(error: serde_json::Error) -> Self {
        MarketDataError::InvalidResponse(error.to_string())
    }
}

/// Failures fetching or parsing the news feed.
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("news feed request failed with status {0}")]
    Status(u16),
    #[error("malformed news feed: {0}")]
    Feed(#[from] rss::Error),
    #[error("invalid news url: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Error, PartialEq)]
pub enum PreprocessError {
    #[error("cannot fit a scaler on an empty series")]
    EmptySeries,
    #[error("series contains a non-finite value at index {0}")]
    NonFinite(usize),
    #[error("not enough history to train: need at least {required} closing prices, got {actual}")]
    InsufficientHistory { required: usize, actual: usize },
}

/// Everything that aborts a forecast request.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("market data: {0}")]
    MarketData(#[from] MarketDataError),
    #[error("news: {0}")]
    News(#[from] NewsError),
    #[error("preprocessing: {0}")]
    Preprocess(#[from] PreprocessError),
    #[error("training worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("chart rendering failed: {0}")]
    Chart(String),
    #[error("chart needs at least one price point")]
    EmptySeries,
}
