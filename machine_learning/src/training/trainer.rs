use ndarray::ArrayView2;

use crate::{Result, arch::Regularizer};

/// A trainable model instance: a model together with its parameters, its optimizer state and
/// its loss function.
///
/// The regularizer is not part of the trainer, it is handed in on every call so the caller
/// owns its strength and may change it between steps.
pub trait Trainer: Send {
    /// Performs a single optimization step over one batch.
    ///
    /// # Arguments
    /// * `x` - The input batch, one example per row.
    /// * `y` - The targets, row-aligned with `x`.
    /// * `regularizer` - The weight penalty added to the loss.
    ///
    /// # Returns
    /// The batch loss, penalty included, measured before the update.
    fn train_on_batch(
        &mut self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        regularizer: &dyn Regularizer,
    ) -> Result<f32>;

    /// Computes the loss over a held-out set without updating anything.
    fn evaluate(
        &self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        regularizer: &dyn Regularizer,
    ) -> Result<f32>;

    /// Returns the flat parameter snapshot of the model.
    fn params(&self) -> &[f32];

    /// Overwrites every parameter of the model.
    ///
    /// # Returns
    /// An error, leaving the parameters untouched, if `params` has another length.
    fn set_params(&mut self, params: &[f32]) -> Result<()>;
}

impl<T: Trainer + ?Sized> Trainer for Box<T> {
    fn train_on_batch(
        &mut self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        regularizer: &dyn Regularizer,
    ) -> Result<f32> {
        (**self).train_on_batch(x, y, regularizer)
    }

    fn evaluate(
        &self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        regularizer: &dyn Regularizer,
    ) -> Result<f32> {
        (**self).evaluate(x, y, regularizer)
    }

    fn params(&self) -> &[f32] {
        (**self).params()
    }

    fn set_params(&mut self, params: &[f32]) -> Result<()> {
        (**self).set_params(params)
    }
}
