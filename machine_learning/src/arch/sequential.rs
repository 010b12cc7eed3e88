use std::{mem, ops::Range};

use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::{Model, layers::Layer};
use crate::{MlErr, Result};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
#[derive(Clone, Debug)]
pub struct Sequential {
    layers: Vec<Layer>,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance.
    pub fn new<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = Layer>,
    {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    fn check_len(&self, what: &'static str, got: usize) -> Result<()> {
        let expected = self.size();

        if got != expected {
            return Err(MlErr::SizeMismatch {
                what,
                got,
                expected,
            });
        }

        Ok(())
    }
}

impl Model for Sequential {
    fn size(&self) -> usize {
        self.layers.iter().map(|layer| layer.size()).sum()
    }

    fn kernels(&self) -> Vec<Range<usize>> {
        let mut offset = 0;

        self.layers
            .iter()
            .filter_map(|layer| {
                let start = offset;
                offset += layer.size();

                let kernel = layer.kernel_size();
                (kernel > 0).then(|| start..start + kernel)
            })
            .collect()
    }

    fn init_params<R: Rng>(&self, params: &mut [f32], rng: &mut R) -> Result<()> {
        self.check_len("model parameters", params.len())?;

        let mut rest = params;
        for layer in &self.layers {
            let (head, tail) = mem::take(&mut rest).split_at_mut(layer.size());
            layer.init_params(head, rng)?;
            rest = tail;
        }

        Ok(())
    }

    fn forward<R: Rng>(
        &mut self,
        params: &[f32],
        x: ArrayView2<f32>,
        rng: &mut R,
    ) -> Result<Array2<f32>> {
        self.check_len("model parameters", params.len())?;

        let mut rest = params;
        let mut a = x.to_owned();

        for layer in self.layers.iter_mut() {
            let (head, tail) = rest.split_at(layer.size());
            a = layer.forward(head, a.view(), rng)?;
            rest = tail;
        }

        Ok(a)
    }

    fn predict(&self, params: &[f32], x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_len("model parameters", params.len())?;

        let mut rest = params;
        let mut a = x.to_owned();

        for layer in &self.layers {
            let (head, tail) = rest.split_at(layer.size());
            a = layer.predict(head, a.view())?;
            rest = tail;
        }

        Ok(a)
    }

    fn backward(&mut self, params: &[f32], grad: &mut [f32], d: Array2<f32>) -> Result<()> {
        self.check_len("model parameters", params.len())?;
        self.check_len("model gradient", grad.len())?;

        let mut end = params.len();
        let mut d = d;

        for layer in self.layers.iter_mut().rev() {
            let start = end - layer.size();
            d = layer.backward(&params[start..end], &mut grad[start..end], d)?;
            end = start;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::arch::activations::ActFn;

    fn mlp() -> Sequential {
        Sequential::new([
            Layer::dense((2, 3), Some(ActFn::relu())),
            Layer::dropout(0.5),
            Layer::dense((3, 1), None),
        ])
    }

    #[test]
    fn size_and_kernels_skip_parameterless_layers() {
        let model = mlp();

        assert_eq!(model.size(), 9 + 4);
        assert_eq!(model.kernels(), vec![0..6, 9..12]);
    }

    #[test]
    fn wrong_parameter_count_fails() {
        let mut model = mlp();
        let mut rng = StdRng::seed_from_u64(0);
        let x = array![[1.0, 2.0]];

        assert!(matches!(
            model.forward(&[0.0; 3], x.view(), &mut rng),
            Err(MlErr::SizeMismatch { got: 3, expected: 13, .. })
        ));
    }

    #[test]
    fn predict_matches_a_hand_computed_network() {
        let model = Sequential::new([
            Layer::dense((1, 2), Some(ActFn::relu())),
            Layer::dropout(0.5),
            Layer::dense((2, 1), None),
        ]);
        // w1 = [1, -1], b1 = [0, 0], w2 = [2, 3], b2 = [1]
        let params = [1.0, -1.0, 0.0, 0.0, 2.0, 3.0, 1.0];
        let x = array![[2.0], [-1.0]];

        let y = model.predict(&params, x.view()).unwrap();

        assert_eq!(y, array![[5.0f32], [4.0]]);
    }

    #[test]
    fn backward_fills_every_layer_gradient() {
        let mut model = Sequential::new([
            Layer::dense((1, 1), None),
            Layer::dense((1, 1), None),
        ]);
        // y = 3 * (2 * x + 1) + 0
        let params = [2.0, 1.0, 3.0, 0.0];
        let mut grad = [0.0; 4];
        let mut rng = StdRng::seed_from_u64(0);
        let x = array![[1.0]];

        let y = model.forward(&params, x.view(), &mut rng).unwrap();
        assert_eq!(y, array![[9.0f32]]);

        model
            .backward(&params, &mut grad, array![[1.0]])
            .unwrap();

        // dy/dw1 = 3 * x, dy/db1 = 3, dy/dw2 = h, dy/db2 = 1
        assert_eq!(grad, [3.0, 3.0, 3.0, 1.0]);
    }
}
