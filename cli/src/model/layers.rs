use ndarray::{Array, Array1, Array2, ArrayViewD, ArrayViewMutD, Axis, Dimension};
use rand::Rng;

/// Anything that owns trainable tensors and their accumulated gradients.
pub trait Parameters {
    /// Visit each `(parameter, gradient)` pair in a stable order.
    fn visit_params(&mut self, visitor: &mut dyn FnMut(ArrayViewMutD<f64>, ArrayViewD<f64>));

    fn zero_grad(&mut self);

    fn param_count(&mut self) -> usize {
        let mut count = 0;
        self.visit_params(&mut |param, _| count += param.len());
        count
    }
}

/// Glorot/Xavier uniform initialization for a `[fan_in, fan_out]` kernel.
pub fn glorot_uniform<R: Rng + ?Sized>(fan_in: usize, fan_out: usize, rng: &mut R) -> Array2<f64> {
    let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
    Array2::from_shape_fn((fan_in, fan_out), |_| rng.random_range(-limit..limit))
}

/// Fully connected layer `y = x W + b`.
#[derive(Debug, Clone)]
pub struct Dense {
    weights: Array2<f64>,
    bias: Array1<f64>,
    grad_weights: Array2<f64>,
    grad_bias: Array1<f64>,
    input: Option<Array2<f64>>,
}

impl Dense {
    pub fn new<R: Rng + ?Sized>(input_size: usize, output_size: usize, rng: &mut R) -> Self {
        Self {
            weights: glorot_uniform(input_size, output_size, rng),
            bias: Array1::zeros(output_size),
            grad_weights: Array2::zeros((input_size, output_size)),
            grad_bias: Array1::zeros(output_size),
            input: None,
        }
    }

    /// `[batch, input_size]` to `[batch, output_size]`.
    pub fn forward(&mut self, input: &Array2<f64>) -> Array2<f64> {
        self.input = Some(input.clone());
        input.dot(&self.weights) + &self.bias
    }

    /// Accumulates weight gradients and returns the gradient w.r.t. the input.
    pub fn backward(&mut self, grad_output: &Array2<f64>) -> Array2<f64> {
        if let Some(input) = &self.input {
            self.grad_weights += &input.t().dot(grad_output);
            self.grad_bias += &grad_output.sum_axis(Axis(0));
        }
        grad_output.dot(&self.weights.t())
    }
}

impl Parameters for Dense {
    fn visit_params(&mut self, visitor: &mut dyn FnMut(ArrayViewMutD<f64>, ArrayViewD<f64>)) {
        visitor(self.weights.view_mut().into_dyn(), self.grad_weights.view().into_dyn());
        visitor(self.bias.view_mut().into_dyn(), self.grad_bias.view().into_dyn());
    }

    fn zero_grad(&mut self) {
        self.grad_weights.fill(0.0);
        self.grad_bias.fill(0.0);
    }
}

/// Inverted dropout: zeroes units with probability `rate` during training and
/// scales survivors by `1 / (1 - rate)`, so inference is the identity.
#[derive(Debug, Clone)]
pub struct Dropout<D: Dimension> {
    rate: f64,
    mask: Option<Array<f64, D>>,
}

impl<D: Dimension> Dropout<D> {
    pub fn new(rate: f64) -> Self {
        Self { rate, mask: None }
    }

    pub fn forward<R: Rng + ?Sized>(
        &mut self,
        input: Array<f64, D>,
        training: bool,
        rng: &mut R,
    ) -> Array<f64, D> {
        if !training || self.rate <= 0.0 {
            self.mask = None;
            return input;
        }

        let keep = 1.0 - self.rate;
        let mask = Array::from_shape_fn(input.raw_dim(), |_| {
            if rng.random::<f64>() < self.rate {
                0.0
            } else {
                1.0 / keep
            }
        });
        let output = input * &mask;
        self.mask = Some(mask);
        output
    }

    pub fn backward(&self, grad_output: Array<f64, D>) -> Array<f64, D> {
        match &self.mask {
            Some(mask) => grad_output * mask,
            None => grad_output,
        }
    }
}
