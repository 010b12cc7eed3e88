use log::trace;
use ndarray::ArrayView2;
use rand::Rng;

use super::Trainer;
use crate::{
    MlErr, Result,
    arch::{Model, Regularizer, loss::LossFn},
    optimization::Optimizer,
};

/// A model `Trainer`. Contains the relevant components needed for training a model,
/// including the model itself and the parameters it is evaluated with.
pub struct ModelTrainer<M, O, L, R>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    model: M,
    optimizer: O,
    loss_fn: L,
    params: Vec<f32>,
    grad: Vec<f32>,
    rng: R,
}

impl<M, O, L, R> ModelTrainer<M, O, L, R>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    /// Returns a new `ModelTrainer` with freshly initialized parameters.
    ///
    /// # Arguments
    /// * `model` - The model that will be trained.
    /// * `optimizer` - The optimizer that dictates how to update the parameters on each step.
    /// * `loss_fn` - The loss function used to measure the difference between a model's output and the expected one.
    /// * `rng` - A random number generator, used for initialization and stochastic layers.
    pub fn new(model: M, optimizer: O, loss_fn: L, mut rng: R) -> Result<Self> {
        let size = model.size();
        let mut params = vec![0.; size];
        model.init_params(&mut params, &mut rng)?;

        Ok(Self {
            model,
            optimizer,
            loss_fn,
            params,
            grad: vec![0.; size],
            rng,
        })
    }

    fn check_batch(x: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<()> {
        if x.nrows() != y.nrows() {
            return Err(MlErr::SizeMismatch {
                what: "batch targets",
                got: y.nrows(),
                expected: x.nrows(),
            });
        }

        Ok(())
    }

    fn check_prediction(y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> Result<()> {
        if y_pred.ncols() != y.ncols() {
            return Err(MlErr::SizeMismatch {
                what: "target width",
                got: y.ncols(),
                expected: y_pred.ncols(),
            });
        }

        Ok(())
    }

    /// Sums the regularization penalty over every kernel of the model.
    fn penalty(&self, regularizer: &dyn Regularizer) -> f32 {
        self.model
            .kernels()
            .into_iter()
            .map(|kernel| regularizer.penalty(&self.params[kernel]))
            .sum()
    }

    /// Adds the regularization gradient of every kernel into the gradient buffer.
    fn regularize(&mut self, regularizer: &dyn Regularizer) {
        for kernel in self.model.kernels() {
            regularizer.accumulate_grad(&self.params[kernel.clone()], &mut self.grad[kernel]);
        }
    }
}

impl<M, O, L, R> Trainer for ModelTrainer<M, O, L, R>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
    R: Rng + Send,
{
    fn train_on_batch(
        &mut self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        regularizer: &dyn Regularizer,
    ) -> Result<f32> {
        Self::check_batch(x, y)?;

        let y_pred = self.model.forward(&self.params, x, &mut self.rng)?;
        Self::check_prediction(y_pred.view(), y)?;

        let data_loss = self.loss_fn.loss(y_pred.view(), y);
        let penalty = self.penalty(regularizer);

        let d = self.loss_fn.loss_prime(y_pred.view(), y);
        self.model.backward(&self.params, &mut self.grad, d)?;
        self.regularize(regularizer);
        self.optimizer.update_params(&mut self.params, &self.grad)?;

        trace!(
            rows = x.nrows(),
            data_loss = data_loss,
            penalty = penalty;
            "trained on batch"
        );
        Ok(data_loss + penalty)
    }

    fn evaluate(
        &self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        regularizer: &dyn Regularizer,
    ) -> Result<f32> {
        Self::check_batch(x, y)?;

        let y_pred = self.model.predict(&self.params, x)?;
        Self::check_prediction(y_pred.view(), y)?;

        Ok(self.loss_fn.loss(y_pred.view(), y) + self.penalty(regularizer))
    }

    fn params(&self) -> &[f32] {
        &self.params
    }

    fn set_params(&mut self, params: &[f32]) -> Result<()> {
        if params.len() != self.params.len() {
            return Err(MlErr::SizeMismatch {
                what: "model parameters",
                got: params.len(),
                expected: self.params.len(),
            });
        }

        self.params.copy_from_slice(params);
        Ok(())
    }
}
