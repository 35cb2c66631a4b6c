use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One-step-ahead closing price for the current request only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub symbol: String,
    /// Price in currency units.
    pub price: f64,
    /// Raw network output in scaled units.
    pub scaled: f64,
    pub currency: String,
    /// Date of the last observation in the input window.
    pub window_end: NaiveDate,
    pub final_loss: Option<f64>,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicted Closing Price: {:.2} {}", self.price, self.currency)
    }
}
