use crate::error::PreprocessError;
use serde::{Deserialize, Serialize};

/// Linear map of a series onto [0, 1] using its own observed min and max.
///
/// A constant series has zero range; it is scaled by 1 instead, so values
/// map to `x - min` and the inverse still recovers them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    min: f64,
    max: f64,
}

impl MinMaxScaler {
    pub fn fit(values: &[f64]) -> Result<Self, PreprocessError> {
        if values.is_empty() {
            return Err(PreprocessError::EmptySeries);
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(PreprocessError::NonFinite(index));
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    fn scale(&self) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 {
            1.0
        } else {
            range
        }
    }

    pub fn transform_one(&self, value: f64) -> f64 {
        (value - self.min) / self.scale()
    }

    pub fn inverse_one(&self, scaled: f64) -> f64 {
        scaled * self.scale() + self.min
    }

    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform_one(v)).collect()
    }

    pub fn inverse_transform(&self, scaled: &[f64]) -> Vec<f64> {
        scaled.iter().map(|&v| self.inverse_one(v)).collect()
    }

    /// Fit on `values` and return the scaler with the scaled copy.
    pub fn fit_transform(values: &[f64]) -> Result<(Self, Vec<f64>), PreprocessError> {
        let scaler = Self::fit(values)?;
        let scaled = scaler.transform(values);
        Ok((scaler, scaled))
    }
}
