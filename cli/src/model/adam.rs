//! Adam optimizer.
//!
//! Keeps exponential moving averages of each parameter's gradient (first
//! moment) and squared gradient (second moment):
//!
//! ```text
//! m = beta1 * m + (1 - beta1) * gradient
//! v = beta2 * v + (1 - beta2) * gradient^2
//! m_hat = m / (1 - beta1^t)
//! v_hat = v / (1 - beta2^t)
//! param = param - learning_rate * m_hat / (sqrt(v_hat) + epsilon)
//! ```

use super::layers::Parameters;
use ndarray::{ArrayViewD, ArrayViewMutD};

#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    /// First moments, one buffer per parameter tensor in visit order.
    m: Vec<Vec<f64>>,
    /// Second moments.
    v: Vec<Vec<f64>>,
    t: u64,
}

impl Adam {
    pub fn new(learning_rate: f64) -> Self {
        Self::with_params(learning_rate, 0.9, 0.999, 1e-7)
    }

    pub fn with_params(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: Vec::new(),
            v: Vec::new(),
            t: 0,
        }
    }

    pub fn timestep(&self) -> u64 {
        self.t
    }

    /// Apply the accumulated gradients of `model` once.
    pub fn step<P: Parameters + ?Sized>(&mut self, model: &mut P) {
        self.t += 1;
        let mut slot = 0;
        model.visit_params(&mut |param, grad| {
            self.update(slot, param, grad);
            slot += 1;
        });
    }

    fn update(&mut self, slot: usize, mut param: ArrayViewMutD<f64>, grad: ArrayViewD<f64>) {
        if self.m.len() <= slot {
            self.m.resize_with(slot + 1, Vec::new);
            self.v.resize_with(slot + 1, Vec::new);
        }
        if self.m[slot].len() != param.len() {
            self.m[slot] = vec![0.0; param.len()];
            self.v[slot] = vec![0.0; param.len()];
        }

        let bias_correction1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t as i32);
        let m = &mut self.m[slot];
        let v = &mut self.v[slot];

        for (i, (p, g)) in param.iter_mut().zip(grad.iter()).enumerate() {
            m[i] = self.beta1 * m[i] + (1.0 - self.beta1) * g;
            v[i] = self.beta2 * v[i] + (1.0 - self.beta2) * g * g;

            let m_hat = m[i] / bias_correction1;
            let v_hat = v[i] / bias_correction2;

            *p -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }
}
