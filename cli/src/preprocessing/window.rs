use crate::error::PreprocessError;
use ndarray::{Array2, Array3};

/// Number of consecutive observations in one model input.
pub const WINDOW_SIZE: usize = 60;

/// Sliding-window regression samples over a scaled series.
///
/// `inputs` is `[samples, WINDOW_SIZE, 1]` and `targets` is `[samples, 1]`;
/// sample `k` reads `scaled[k..k + 60]` and predicts `scaled[k + 60]`.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowedDataset {
    pub inputs: Array3<f64>,
    pub targets: Array2<f64>,
    series_len: usize,
}

impl WindowedDataset {
    /// Produces `max(len - 60, 0)` samples in series order.
    pub fn build(scaled: &[f64]) -> Self {
        let samples = scaled.len().saturating_sub(WINDOW_SIZE);
        let mut inputs = Array3::zeros((samples, WINDOW_SIZE, 1));
        let mut targets = Array2::zeros((samples, 1));

        for (k, i) in (WINDOW_SIZE..scaled.len()).enumerate() {
            for (t, &value) in scaled[i - WINDOW_SIZE..i].iter().enumerate() {
                inputs[[k, t, 0]] = value;
            }
            targets[[k, 0]] = scaled[i];
        }

        Self {
            inputs,
            targets,
            series_len: scaled.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.targets.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Training needs at least one sample, i.e. more than 60 observations.
    pub fn ensure_trainable(&self) -> Result<(), PreprocessError> {
        if self.is_empty() {
            return Err(PreprocessError::InsufficientHistory {
                required: WINDOW_SIZE + 1,
                actual: self.series_len,
            });
        }
        Ok(())
    }
}

/// The final 60 scaled observations as a single-sample batch `[1, 60, 1]`.
pub fn last_window(scaled: &[f64]) -> Result<Array3<f64>, PreprocessError> {
    if scaled.len() < WINDOW_SIZE {
        return Err(PreprocessError::InsufficientHistory {
            required: WINDOW_SIZE,
            actual: scaled.len(),
        });
    }
    let tail = scaled[scaled.len() - WINDOW_SIZE..].to_vec();
    Array3::from_shape_vec((1, WINDOW_SIZE, 1), tail).map_err(|_| {
        PreprocessError::InsufficientHistory {
            required: WINDOW_SIZE,
            actual: scaled.len(),
        }
    })
}
