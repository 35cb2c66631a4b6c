use super::config::ModelConfig;
use super::layers::{Dense, Dropout, Parameters};
use super::lstm::Lstm;
use ndarray::{s, Array2, Array3, ArrayViewD, ArrayViewMutD, Ix2, Ix3};
use rand::Rng;

/// `LSTM(units, full sequence) -> Dropout -> LSTM(units, last step) -> Dropout -> Dense(1)`
#[derive(Debug, Clone)]
pub struct PriceNetwork {
    encoder: Lstm,
    encoder_dropout: Dropout<Ix3>,
    decoder: Lstm,
    decoder_dropout: Dropout<Ix2>,
    head: Dense,
    steps: usize,
}

impl PriceNetwork {
    pub fn new<R: Rng + ?Sized>(config: &ModelConfig, rng: &mut R) -> Self {
        Self {
            encoder: Lstm::new(1, config.units, rng),
            encoder_dropout: Dropout::new(config.dropout),
            decoder: Lstm::new(config.units, config.units, rng),
            decoder_dropout: Dropout::new(config.dropout),
            head: Dense::new(config.units, 1, rng),
            steps: 0,
        }
    }

    /// `[batch, steps, 1]` to `[batch, 1]`. Dropout is only active when
    /// `training` is set.
    pub fn forward<R: Rng + ?Sized>(
        &mut self,
        input: &Array3<f64>,
        training: bool,
        rng: &mut R,
    ) -> Array2<f64> {
        let steps = input.dim().1;
        self.steps = steps;

        let sequence = self.encoder.forward(input);
        let sequence = self.encoder_dropout.forward(sequence, training, rng);
        let decoded = self.decoder.forward(&sequence);

        let last = decoded.slice(s![.., steps.saturating_sub(1), ..]).to_owned();
        let last = self.decoder_dropout.forward(last, training, rng);
        self.head.forward(&last)
    }

    /// Backpropagate the loss gradient `[batch, 1]` from the last forward pass.
    pub fn backward(&mut self, grad_output: &Array2<f64>) {
        let batch = grad_output.nrows();
        let steps = self.steps;
        if steps == 0 {
            return;
        }

        let grad_last = self.head.backward(grad_output);
        let grad_last = self.decoder_dropout.backward(grad_last);

        let mut grad_decoded = Array3::zeros((batch, steps, self.decoder.units()));
        grad_decoded
            .slice_mut(s![.., steps - 1, ..])
            .assign(&grad_last);
        let grad_sequence = self.decoder.backward(&grad_decoded);
        let grad_sequence = self.encoder_dropout.backward(grad_sequence);
        self.encoder.backward(&grad_sequence);
    }
}

impl Parameters for PriceNetwork {
    fn visit_params(&mut self, visitor: &mut dyn FnMut(ArrayViewMutD<f64>, ArrayViewD<f64>)) {
        self.encoder.visit_params(visitor);
        self.decoder.visit_params(visitor);
        self.head.visit_params(visitor);
    }

    fn zero_grad(&mut self) {
        self.encoder.zero_grad();
        self.decoder.zero_grad();
        self.head.zero_grad();
    }
}
