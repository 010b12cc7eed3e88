use machine_learning::arch::L1L2;
use rand::{Rng, seq::IndexedRandom};

use crate::{PbtErr, Result};

/// A hyperparameter value that a member can explore and exploit.
pub trait Hyperparameter {
    /// Multiplies the value in place by a factor drawn uniformly from `factors`.
    ///
    /// Vector values scale every component by the same factor. No clamping is applied to
    /// the result.
    ///
    /// # Errors
    /// `PbtErr::EmptyFactors` if `factors` is empty, in which case the value is untouched.
    fn perturb<R: Rng + ?Sized>(&mut self, factors: &[f32], rng: &mut R) -> Result<()>;

    /// Overwrites this value with a copy of `other`'s.
    fn replace_with(&mut self, other: &Self);
}

fn pick<R: Rng + ?Sized>(factors: &[f32], rng: &mut R) -> Result<f32> {
    factors.choose(rng).copied().ok_or(PbtErr::EmptyFactors)
}

impl Hyperparameter for f32 {
    fn perturb<R: Rng + ?Sized>(&mut self, factors: &[f32], rng: &mut R) -> Result<()> {
        *self *= pick(factors, rng)?;
        Ok(())
    }

    fn replace_with(&mut self, other: &Self) {
        *self = *other;
    }
}

impl Hyperparameter for L1L2 {
    fn perturb<R: Rng + ?Sized>(&mut self, factors: &[f32], rng: &mut R) -> Result<()> {
        let factor = pick(factors, rng)?;

        self.l1 *= factor;
        self.l2 *= factor;
        Ok(())
    }

    fn replace_with(&mut self, other: &Self) {
        *self = *other;
    }
}
