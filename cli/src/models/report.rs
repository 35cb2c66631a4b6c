use super::{NewsItem, Prediction, PriceSeries};
use serde::Serialize;

/// One rendered section of a forecast page, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ReportBlock {
    Status(String),
    Success(String),
    Warning(String),
    Error(String),
    PriceChart(PriceSeries),
    NewsTable(Vec<NewsItem>),
    Prediction(Prediction),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    pub run_id: String,
    pub blocks: Vec<ReportBlock>,
}

impl Report {
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: ReportBlock) {
        self.blocks.push(block);
    }

    pub fn status(&mut self, message: impl Into<String>) {
        self.push(ReportBlock::Status(message.into()));
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(ReportBlock::Success(message.into()));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(ReportBlock::Warning(message.into()));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(ReportBlock::Error(message.into()));
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        self.blocks.iter().find_map(|block| match block {
            ReportBlock::Prediction(prediction) => Some(prediction),
            _ => None,
        })
    }

    pub fn has_error(&self) -> bool {
        self.blocks.iter().any(|b| matches!(b, ReportBlock::Error(_)))
    }

    pub fn has_warning(&self) -> bool {
        self.blocks.iter().any(|b| matches!(b, ReportBlock::Warning(_)))
    }
}
