//! Training configuration for the price network

use serde::{Deserialize, Serialize};

/// Hyperparameters of the two-layer LSTM regressor.
///
/// Defaults reproduce the reference setup: 50 units per recurrent layer,
/// dropout 0.2, Adam at 0.001, 10 epochs of batch 32 with per-epoch shuffling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Output units of each recurrent layer
    pub units: usize,
    /// Drop probability after each recurrent layer
    pub dropout: f64,
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Reorder samples at the start of every epoch
    pub shuffle: bool,
    /// Fixed RNG seed; unseeded when `None`
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            units: 50,
            dropout: 0.2,
            epochs: 10,
            batch_size: 32,
            learning_rate: 0.001,
            shuffle: true,
            seed: None,
        }
    }
}

impl ModelConfig {
    pub fn with_units(mut self, units: usize) -> Self {
        self.units = units;
        self
    }

    pub fn with_dropout(mut self, dropout: f64) -> Self {
        self.dropout = dropout;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Clamp values that would make training meaningless.
    pub fn sanitized(mut self) -> Self {
        self.units = self.units.max(1);
        self.batch_size = self.batch_size.max(1);
        self.epochs = self.epochs.max(1);
        if !(0.0..1.0).contains(&self.dropout) {
            self.dropout = 0.0;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ModelConfig::default();
        assert_eq!(config.units, 50);
        assert_eq!(config.dropout, 0.2);
        assert_eq!(config.epochs, 10);
        assert_eq!(config.batch_size, 32);
        assert_eq!(config.learning_rate, 0.001);
        assert!(config.shuffle);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: ModelConfig = serde_yaml::from_str("epochs: 3\nseed: 42\n").unwrap();
        assert_eq!(config.epochs, 3);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.units, 50);
    }

    #[test]
    fn test_sanitized() {
        let config = ModelConfig::default()
            .with_batch_size(0)
            .with_dropout(1.5)
            .sanitized();
        assert_eq!(config.batch_size, 1);
        assert_eq!(config.dropout, 0.0);
    }
}
