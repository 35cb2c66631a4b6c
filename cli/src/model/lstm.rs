//! Batched LSTM layer with backpropagation through time.
//!
//! Gate layout inside the fused `[*, 4 * units]` weights is input, forget,
//! candidate, output:
//!
//! ```text
//! z  = x_t W_x + h_{t-1} W_h + b
//! i  = sigmoid(z[0..H])      f = sigmoid(z[H..2H])
//! g  = tanh(z[2H..3H])       o = sigmoid(z[3H..4H])
//! c_t = f * c_{t-1} + i * g
//! h_t = o * tanh(c_t)
//! ```

use super::layers::{glorot_uniform, Parameters};
use ndarray::{s, Array1, Array2, Array3, ArrayViewD, ArrayViewMutD, Axis};
use rand::Rng;

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Activations kept from the forward pass for one time step.
#[derive(Debug, Clone)]
struct StepCache {
    x: Array2<f64>,
    h_prev: Array2<f64>,
    c_prev: Array2<f64>,
    i: Array2<f64>,
    f: Array2<f64>,
    g: Array2<f64>,
    o: Array2<f64>,
    tanh_c: Array2<f64>,
}

#[derive(Debug, Clone)]
pub struct Lstm {
    input_size: usize,
    units: usize,
    w_x: Array2<f64>,
    w_h: Array2<f64>,
    b: Array1<f64>,
    grad_w_x: Array2<f64>,
    grad_w_h: Array2<f64>,
    grad_b: Array1<f64>,
    cache: Vec<StepCache>,
}

impl Lstm {
    /// Glorot-uniform kernels, zero bias except a forget-gate bias of 1.
    pub fn new<R: Rng + ?Sized>(input_size: usize, units: usize, rng: &mut R) -> Self {
        let mut b = Array1::zeros(4 * units);
        b.slice_mut(s![units..2 * units]).fill(1.0);

        Self {
            input_size,
            units,
            w_x: glorot_uniform(input_size, 4 * units, rng),
            w_h: glorot_uniform(units, 4 * units, rng),
            b,
            grad_w_x: Array2::zeros((input_size, 4 * units)),
            grad_w_h: Array2::zeros((units, 4 * units)),
            grad_b: Array1::zeros(4 * units),
            cache: Vec::new(),
        }
    }

    pub fn units(&self) -> usize {
        self.units
    }

    /// `[batch, steps, input_size]` to the full hidden sequence
    /// `[batch, steps, units]`, starting from zero state.
    pub fn forward(&mut self, input: &Array3<f64>) -> Array3<f64> {
        let (batch, steps, _) = input.dim();
        let h_units = self.units;
        let mut outputs = Array3::zeros((batch, steps, h_units));
        let mut h = Array2::zeros((batch, h_units));
        let mut c = Array2::<f64>::zeros((batch, h_units));
        self.cache.clear();

        for t in 0..steps {
            let x = input.slice(s![.., t, ..]).to_owned();
            let z = x.dot(&self.w_x) + h.dot(&self.w_h) + &self.b;

            let i = z.slice(s![.., 0..h_units]).mapv(sigmoid);
            let f = z.slice(s![.., h_units..2 * h_units]).mapv(sigmoid);
            let g = z.slice(s![.., 2 * h_units..3 * h_units]).mapv(f64::tanh);
            let o = z.slice(s![.., 3 * h_units..]).mapv(sigmoid);

            let c_next = &f * &c + &i * &g;
            let tanh_c = c_next.mapv(f64::tanh);
            let h_next = &o * &tanh_c;
            outputs.slice_mut(s![.., t, ..]).assign(&h_next);

            self.cache.push(StepCache {
                x,
                h_prev: h,
                c_prev: c,
                i,
                f,
                g,
                o,
                tanh_c,
            });
            h = h_next;
            c = c_next;
        }

        outputs
    }

    /// Backpropagate `grad_output` (`[batch, steps, units]`) through the
    /// cached sequence, accumulating weight gradients. Returns the gradient
    /// w.r.t. the layer input.
    pub fn backward(&mut self, grad_output: &Array3<f64>) -> Array3<f64> {
        let (batch, steps, _) = grad_output.dim();
        let h_units = self.units;
        let mut grad_input = Array3::zeros((batch, steps, self.input_size));
        let mut dh_next = Array2::<f64>::zeros((batch, h_units));
        let mut dc_next = Array2::<f64>::zeros((batch, h_units));

        for t in (0..steps.min(self.cache.len())).rev() {
            let step = &self.cache[t];
            let dh = &grad_output.slice(s![.., t, ..]) + &dh_next;

            let d_o = &dh * &step.tanh_c;
            let dc = &dc_next + &(&dh * &step.o * &step.tanh_c.mapv(|v| 1.0 - v * v));
            let d_i = &dc * &step.g;
            let d_g = &dc * &step.i;
            let d_f = &dc * &step.c_prev;
            dc_next = &dc * &step.f;

            let mut dz = Array2::zeros((batch, 4 * h_units));
            dz.slice_mut(s![.., 0..h_units])
                .assign(&(&d_i * &step.i.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![.., h_units..2 * h_units])
                .assign(&(&d_f * &step.f.mapv(|v| v * (1.0 - v))));
            dz.slice_mut(s![.., 2 * h_units..3 * h_units])
                .assign(&(&d_g * &step.g.mapv(|v| 1.0 - v * v)));
            dz.slice_mut(s![.., 3 * h_units..])
                .assign(&(&d_o * &step.o.mapv(|v| v * (1.0 - v))));

            self.grad_w_x += &step.x.t().dot(&dz);
            self.grad_w_h += &step.h_prev.t().dot(&dz);
            self.grad_b += &dz.sum_axis(Axis(0));

            grad_input
                .slice_mut(s![.., t, ..])
                .assign(&dz.dot(&self.w_x.t()));
            dh_next = dz.dot(&self.w_h.t());
        }

        grad_input
    }
}

impl Parameters for Lstm {
    fn visit_params(&mut self, visitor: &mut dyn FnMut(ArrayViewMutD<f64>, ArrayViewD<f64>)) {
        visitor(self.w_x.view_mut().into_dyn(), self.grad_w_x.view().into_dyn());
        visitor(self.w_h.view_mut().into_dyn(), self.grad_w_h.view().into_dyn());
        visitor(self.b.view_mut().into_dyn(), self.grad_b.view().into_dyn());
    }

    fn zero_grad(&mut self) {
        self.grad_w_x.fill(0.0);
        self.grad_w_h.fill(0.0);
        self.grad_b.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_output_shape_and_bounds() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut lstm = Lstm::new(1, 4, &mut rng);
        let x = Array3::from_shape_fn((3, 7, 1), |(b, t, _)| (b + t) as f64 * 0.1);
        let h = lstm.forward(&x);

        assert_eq!(h.dim(), (3, 7, 4));
        assert!(h.iter().all(|v| v.abs() < 1.0));
        assert_eq!(lstm.param_count(), 4 * 4 + 4 * 16 + 16);
    }

    #[test]
    fn test_forget_bias_starts_at_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let lstm = Lstm::new(2, 3, &mut rng);
        assert_eq!(lstm.b.slice(s![0..3]).sum(), 0.0);
        assert_eq!(lstm.b.slice(s![3..6]).sum(), 3.0);
        assert_eq!(lstm.b.slice(s![6..]).sum(), 0.0);
    }

    #[test]
    fn test_input_gradient_matches_finite_difference() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut lstm = Lstm::new(2, 3, &mut rng);
        let x = Array3::from_shape_fn((2, 4, 2), |(b, t, k)| {
            0.3 * b as f64 - 0.2 * t as f64 + 0.1 * k as f64 + 0.05
        });

        // loss = sum of all hidden outputs
        let loss = |lstm: &mut Lstm, x: &Array3<f64>| lstm.forward(x).sum();
        lstm.forward(&x);
        let grad_output = Array3::ones((2, 4, 3));
        let analytic = lstm.backward(&grad_output);

        let eps = 1e-6;
        for index in [(0, 0, 0), (1, 2, 1), (0, 3, 1), (1, 0, 0)] {
            let mut plus = x.clone();
            plus[index] += eps;
            let mut minus = x.clone();
            minus[index] -= eps;
            let numeric = (loss(&mut lstm, &plus) - loss(&mut lstm, &minus)) / (2.0 * eps);
            assert!(
                (analytic[index] - numeric).abs() < 1e-6,
                "{index:?}: analytic {} numeric {numeric}",
                analytic[index]
            );
        }
    }
}
