use serde::{Deserialize, Serialize};

/// A penalty added to the training loss, computed over a layer's kernel weights.
///
/// Regularizers are handed to the model on every training call, so the strength used
/// is always the caller's current one.
pub trait Regularizer {
    /// Returns the penalty contributed by `kernel`.
    fn penalty(&self, kernel: &[f32]) -> f32;

    /// Accumulates the gradient of the penalty with respect to `kernel` into `grad`.
    fn accumulate_grad(&self, kernel: &[f32], grad: &mut [f32]);
}

/// Combined L1 and L2 weight penalty: `l1 * sum(|w|) + l2 * sum(w^2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct L1L2 {
    pub l1: f32,
    pub l2: f32,
}

impl L1L2 {
    /// Creates a new `L1L2` penalty.
    ///
    /// # Arguments
    /// * `l1` - The strength of the absolute value penalty.
    /// * `l2` - The strength of the squared value penalty.
    pub fn new(l1: f32, l2: f32) -> Self {
        Self { l1, l2 }
    }
}

impl Default for L1L2 {
    fn default() -> Self {
        Self::new(1e-5, 1e-5)
    }
}

impl Regularizer for L1L2 {
    fn penalty(&self, kernel: &[f32]) -> f32 {
        let (abs, sq) = kernel
            .iter()
            .fold((0., 0.), |(abs, sq), w| (abs + w.abs(), sq + w * w));

        self.l1 * abs + self.l2 * sq
    }

    fn accumulate_grad(&self, kernel: &[f32], grad: &mut [f32]) {
        for (g, w) in grad.iter_mut().zip(kernel) {
            let sign = if *w > 0. {
                1.
            } else if *w < 0. {
                -1.
            } else {
                0.
            };

            *g += self.l1 * sign + 2. * self.l2 * w;
        }
    }
}

/// The absence of regularization.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPenalty;

impl Regularizer for NoPenalty {
    fn penalty(&self, _kernel: &[f32]) -> f32 {
        0.
    }

    fn accumulate_grad(&self, _kernel: &[f32], _grad: &mut [f32]) {}
}
