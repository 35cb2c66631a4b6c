//! # pricecast - next-day closing price forecasts with news sentiment
//!
//! For one exchange-listed stock the library:
//! - fetches daily closing prices (Yahoo Finance chart API)
//! - fetches recent headlines (Google News RSS) and scores them with VADER
//! - trains a fresh two-layer LSTM on 60-day windows of the scaled closes
//! - predicts the next close and assembles a renderable report
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pricecast::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let forecaster = Forecaster::new(
//!         Arc::new(YahooClient::new(true)?),
//!         Arc::new(GoogleNewsClient::new()?),
//!         Arc::new(TickerTable::default()),
//!         ModelConfig::default(),
//!     );
//!     let report = forecaster
//!         .run(&ForecastRequest {
//!             ticker: "SIME".to_string(),
//!             start: default_start_date(),
//!             end: today(),
//!         })
//!         .await?;
//!     if let Some(prediction) = report.prediction() {
//!         println!("{prediction}");
//!     }
//!     Ok(())
//! }
//! ```

// Core modules
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

// Forecasting
pub mod model;
pub mod pipeline;
pub mod preprocessing;

// Presentation
pub mod render;

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! ```rust
    //! use pricecast::prelude::*;
    //! ```

    pub use crate::error::{ForecastError, MarketDataError, NewsError, PreprocessError};
    pub use crate::model::{ModelConfig, TrainingSummary};
    pub use crate::models::{NewsItem, Prediction, PriceSeries, Report, ReportBlock, TickerTable};
    pub use crate::pipeline::{ForecastRequest, Forecaster};
    pub use crate::services::{
        GoogleNewsClient, MarketData, MarketDataProvider, NewsProvider, YahooClient,
    };
    pub use crate::utils::{default_start_date, parse_date, today};
}

pub use utils::{init_logger, Timer};
