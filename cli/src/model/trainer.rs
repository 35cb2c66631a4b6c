use super::adam::Adam;
use super::config::ModelConfig;
use super::layers::Parameters;
use super::network::PriceNetwork;
use crate::error::PreprocessError;
use crate::preprocessing::WindowedDataset;
use ndarray::{Array2, Array3, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

/// Outcome of one `fit` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingSummary {
    pub epochs: usize,
    pub samples: usize,
    /// Sample-weighted mean training loss per epoch
    pub loss_history: Vec<f64>,
}

impl TrainingSummary {
    pub fn final_loss(&self) -> Option<f64> {
        self.loss_history.last().copied()
    }
}

fn mse(prediction: &Array2<f64>, target: &Array2<f64>) -> f64 {
    (prediction - target).mapv(|d| d * d).mean().unwrap_or(0.0)
}

/// Owns a freshly initialized network and fits it to one dataset.
pub struct Trainer {
    config: ModelConfig,
    network: PriceNetwork,
    optimizer: Adam,
    rng: StdRng,
}

impl Trainer {
    pub fn new(config: ModelConfig) -> Self {
        let config = config.sanitized();
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let network = PriceNetwork::new(&config, &mut rng);
        let optimizer = Adam::new(config.learning_rate);

        Self {
            config,
            network,
            optimizer,
            rng,
        }
    }

    /// Mini-batch training with MSE loss.
    pub fn fit(&mut self, dataset: &WindowedDataset) -> Result<TrainingSummary, PreprocessError> {
        dataset.ensure_trainable()?;

        let samples = dataset.len();
        let mut order: Vec<usize> = (0..samples).collect();
        let mut loss_history = Vec::with_capacity(self.config.epochs);

        for epoch in 1..=self.config.epochs {
            if self.config.shuffle {
                order.shuffle(&mut self.rng);
            }

            let mut total_loss = 0.0;
            for batch in order.chunks(self.config.batch_size) {
                let inputs = dataset.inputs.select(Axis(0), batch);
                let targets = dataset.targets.select(Axis(0), batch);

                self.network.zero_grad();
                let prediction = self.network.forward(&inputs, true, &mut self.rng);
                total_loss += mse(&prediction, &targets) * batch.len() as f64;

                let grad = (&prediction - &targets) * (2.0 / prediction.len() as f64);
                self.network.backward(&grad);
                self.optimizer.step(&mut self.network);
            }

            let epoch_loss = total_loss / samples as f64;
            debug!(epoch, loss = epoch_loss, "Epoch finished");
            loss_history.push(epoch_loss);
        }

        let summary = TrainingSummary {
            epochs: self.config.epochs,
            samples,
            loss_history,
        };
        info!(
            samples,
            epochs = summary.epochs,
            final_loss = summary.final_loss(),
            "Training complete"
        );
        Ok(summary)
    }

    /// Predict the next scaled value for each window in `[batch, steps, 1]`.
    pub fn predict(&mut self, windows: &Array3<f64>) -> Vec<f64> {
        self.network
            .forward(windows, false, &mut self.rng)
            .column(0)
            .to_vec()
    }
}
