use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::{Dense, Dropout};
use crate::{Result, arch::activations::ActFn};

#[derive(Clone, Debug)]
pub enum Layer {
    Dense(Dense),
    Dropout(Dropout),
}
use Layer::*;

impl Layer {
    pub fn dense(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self::Dense(Dense::new(dim, act_fn))
    }

    pub fn dropout(rate: f32) -> Self {
        Self::Dropout(Dropout::new(rate))
    }

    /// Returns the amount of parameters this layer reads from the model's parameter slice.
    pub fn size(&self) -> usize {
        match self {
            Dense(l) => l.size(),
            Dropout(_) => 0,
        }
    }

    /// Returns the amount of leading parameters subject to weight regularization.
    pub fn kernel_size(&self) -> usize {
        match self {
            Dense(l) => l.kernel_size(),
            Dropout(_) => 0,
        }
    }

    pub fn init_params<R: Rng>(&self, params: &mut [f32], rng: &mut R) -> Result<()> {
        match self {
            Dense(l) => l.init_params(params, rng),
            Dropout(_) => Ok(()),
        }
    }

    pub fn forward<R: Rng>(
        &mut self,
        params: &[f32],
        x: ArrayView2<f32>,
        rng: &mut R,
    ) -> Result<Array2<f32>> {
        match self {
            Dense(l) => l.forward(params, x),
            Dropout(l) => Ok(l.forward(x, rng)),
        }
    }

    pub fn predict(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        match self {
            Dense(l) => l.predict(params, x),
            Dropout(l) => Ok(l.predict(x)),
        }
    }

    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        d: Array2<f32>,
    ) -> Result<Array2<f32>> {
        match self {
            Dense(l) => l.backward(params, grad, d),
            Dropout(l) => l.backward(d),
        }
    }
}
