//! One forecast request from ticker selection to rendered report.

use crate::error::{ForecastError, PreprocessError};
use crate::model::{ModelConfig, Trainer, TrainingSummary};
use crate::models::{
    NewsOutcome, Prediction, PriceSeries, Report, ReportBlock, ResolvedTicker, TickerTable,
};
use crate::preprocessing::{last_window, MinMaxScaler, WindowedDataset};
use crate::services::{MarketData, MarketDataProvider, NewsProvider};
use crate::utils::{format_date_range, Timer};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const FETCHING_STOCK_DATA: &str = "Fetching stock data...";
pub const NO_STOCK_DATA: &str = "No stock data found! Please check the ticker symbol.";
pub const STOCK_DATA_RETRIEVED: &str = "Stock data retrieved successfully!";
pub const FETCHING_NEWS: &str = "Fetching news data...";
pub const NO_NEWS: &str = "No relevant news found!";
pub const TRAINING_MODEL: &str = "Training LSTM model...";

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub ticker: String,
    /// Inclusive
    pub start: NaiveDate,
    /// Inclusive
    pub end: NaiveDate,
}

/// Wires the providers, the ticker table and the model settings together.
#[derive(Clone)]
pub struct Forecaster {
    market: Arc<dyn MarketDataProvider>,
    news: Arc<dyn NewsProvider>,
    tickers: Arc<TickerTable>,
    model: ModelConfig,
}

impl Forecaster {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        news: Arc<dyn NewsProvider>,
        tickers: Arc<TickerTable>,
        model: ModelConfig,
    ) -> Self {
        Self {
            market,
            news,
            tickers,
            model,
        }
    }

    /// Run the fetch, news, train and predict steps in order.
    ///
    /// Missing price data and too-short histories end the report early with an
    /// error block; provider and worker failures abort with `Err`.
    #[instrument(skip(self, request), fields(ticker = %request.ticker, run_id = tracing::field::Empty))]
    pub async fn run(&self, request: &ForecastRequest) -> Result<Report, ForecastError> {
        let run_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("run_id", run_id.as_str());
        let mut report = Report::new(run_id);

        report.status(FETCHING_STOCK_DATA);
        let ticker = self.tickers.resolve(&request.ticker)?;
        info!(
            symbol = %ticker.symbol,
            range = %format_date_range(request.start, request.end),
            "Fetching closing prices"
        );

        let series = match self
            .market
            .fetch_closes(&ticker.symbol, request.start, request.end)
            .await?
        {
            MarketData::Series(series) => series,
            MarketData::NoData { symbol } => {
                warn!(%symbol, "No price data for request");
                report.error(NO_STOCK_DATA);
                return Ok(report);
            }
        };
        report.success(STOCK_DATA_RETRIEVED);
        report.push(ReportBlock::PriceChart(series.clone()));

        report.status(FETCHING_NEWS);
        match self.news.collect(&ticker).await? {
            NewsOutcome::Articles(items) => {
                info!(articles = items.len(), "Scored news headlines");
                report.push(ReportBlock::NewsTable(items));
            }
            NewsOutcome::NoArticles => {
                warn!(query = %ticker.display_name, "News feed returned no entries");
                report.warning(NO_NEWS);
            }
        }

        report.status(TRAINING_MODEL);
        match self.train_and_predict(&ticker, &series).await {
            Ok(prediction) => {
                info!(price = prediction.price, currency = %prediction.currency, "Forecast ready");
                report.push(ReportBlock::Prediction(prediction));
            }
            Err(ForecastError::Preprocess(error)) => {
                warn!(%error, "Cannot train on this series");
                report.error(error.to_string());
            }
            Err(error) => return Err(error),
        }

        Ok(report)
    }

    async fn train_and_predict(
        &self,
        ticker: &ResolvedTicker,
        series: &PriceSeries,
    ) -> Result<Prediction, ForecastError> {
        let window_end = series
            .last()
            .map(|point| point.date)
            .ok_or(PreprocessError::EmptySeries)?;

        let (scaler, scaled) = MinMaxScaler::fit_transform(&series.closes())?;
        let dataset = WindowedDataset::build(&scaled);
        dataset.ensure_trainable()?;
        let window = last_window(&scaled)?;

        let config = self.model.clone();
        let timer = Timer::start("model training");
        let (summary, scaled_prediction) = tokio::task::spawn_blocking(
            move || -> Result<(TrainingSummary, f64), ForecastError> {
                let mut trainer = Trainer::new(config);
                let summary = trainer.fit(&dataset)?;
                let next = trainer
                    .predict(&window)
                    .into_iter()
                    .next()
                    .ok_or_else(|| ForecastError::Worker("model produced no output".to_string()))?;
                Ok((summary, next))
            },
        )
        .await
        .map_err(|e| ForecastError::Worker(e.to_string()))??;
        timer.log_elapsed();

        Ok(Prediction {
            symbol: ticker.symbol.clone(),
            price: scaler.inverse_one(scaled_prediction),
            scaled: scaled_prediction,
            currency: ticker.currency.clone(),
            window_end,
            final_loss: summary.final_loss(),
        })
    }
}
