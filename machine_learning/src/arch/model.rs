use std::ops::Range;

use ndarray::{Array2, ArrayView2};
use rand::Rng;

use crate::Result;

/// A differentiable model whose parameters live outside of it, in a flat slice.
pub trait Model: Send {
    /// Returns the amount of parameters in the model.
    fn size(&self) -> usize;

    /// Returns the ranges of the parameter slice that hold regularizable kernel weights.
    fn kernels(&self) -> Vec<Range<usize>>;

    /// Writes freshly initialized parameters into `params`.
    fn init_params<R: Rng>(&self, params: &mut [f32], rng: &mut R) -> Result<()>;

    /// Makes a training forward pass, caching what `backward` needs.
    ///
    /// # Arguments
    /// * `params` - The model's parameters.
    /// * `x` - The input batch, one example per row.
    /// * `rng` - The random source for stochastic layers.
    ///
    /// # Returns
    /// The prediction for the given input or an error if occurred.
    fn forward<R: Rng>(
        &mut self,
        params: &[f32],
        x: ArrayView2<f32>,
        rng: &mut R,
    ) -> Result<Array2<f32>>;

    /// Makes an inference forward pass without touching any cached state.
    fn predict(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Backpropagates `d`, the derivative of the loss with respect to the last output,
    /// writing the gradient of every parameter into `grad`.
    fn backward(&mut self, params: &[f32], grad: &mut [f32], d: Array2<f32>) -> Result<()>;
}
