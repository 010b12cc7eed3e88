use ndarray::{Array2, ArrayView2};
use rand::Rng;

use crate::{MlErr, Result};

/// Inverted dropout: during training every unit is zeroed with probability `rate` and the
/// survivors are scaled by `1 / (1 - rate)`, inference is the identity.
#[derive(Clone, Debug)]
pub struct Dropout {
    rate: f32,
    mask: Array2<f32>,
}

impl Dropout {
    /// Creates a new `Dropout` layer.
    ///
    /// # Arguments
    /// * `rate` - The probability of dropping a unit, in `[0, 1)`.
    pub fn new(rate: f32) -> Self {
        Self {
            rate,
            mask: Array2::zeros((0, 0)),
        }
    }

    pub fn forward<R: Rng>(&mut self, x: ArrayView2<f32>, rng: &mut R) -> Array2<f32> {
        let keep = 1. - self.rate;

        self.mask = Array2::from_shape_simple_fn(x.raw_dim(), || {
            if rng.random::<f32>() < keep {
                1. / keep
            } else {
                0.
            }
        });

        &x * &self.mask
    }

    pub fn predict(&self, x: ArrayView2<f32>) -> Array2<f32> {
        x.to_owned()
    }

    pub fn backward(&mut self, d: Array2<f32>) -> Result<Array2<f32>> {
        if d.dim() != self.mask.dim() {
            return Err(MlErr::SizeMismatch {
                what: "dropout delta",
                got: d.len(),
                expected: self.mask.len(),
            });
        }

        Ok(d * &self.mask)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn zero_rate_is_the_identity() {
        let mut dropout = Dropout::new(0.0);
        let mut rng = StdRng::seed_from_u64(0);
        let x = Array2::from_elem((3, 4), 2.0);

        assert_eq!(dropout.forward(x.view(), &mut rng), x);
        assert_eq!(dropout.backward(x.clone()).unwrap(), x);
    }

    #[test]
    fn survivors_are_rescaled_and_the_mask_is_reused_backwards() {
        let mut dropout = Dropout::new(0.5);
        let mut rng = StdRng::seed_from_u64(3);
        let x = Array2::from_elem((8, 8), 1.0);

        let y = dropout.forward(x.view(), &mut rng);
        assert!(y.iter().all(|&v| v == 0.0 || v == 2.0));

        let d = dropout.backward(Array2::from_elem((8, 8), 1.0)).unwrap();
        assert_eq!(d, y);
    }

    #[test]
    fn inference_does_not_drop() {
        let dropout = Dropout::new(0.9);
        let x = Array2::from_elem((2, 2), 5.0);

        assert_eq!(dropout.predict(x.view()), x);
    }
}
