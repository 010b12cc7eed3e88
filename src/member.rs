use std::num::NonZeroUsize;

use log::{debug, info, trace};
use machine_learning::{arch::L1L2, training::Trainer};
use rand::{Rng, rngs::StdRng};

use crate::{
    PbtErr, Result,
    data::BatchSource,
    hyperparameter::Hyperparameter,
    readiness::{Countdown, ReadyState},
};

/// The factors a member's hyperparameter is multiplied by when exploring.
pub const EXPLORE_FACTORS: [f32; 2] = [0.8, 1.2];

/// One member of a population.
///
/// A member owns its data cursor, its regularization hyperparameter, its model and its
/// random source. The model never keeps a copy of the hyperparameter, the current value
/// is handed to it on every training and evaluation call.
pub struct Member<T = Box<dyn Trainer>, R = StdRng>
where
    T: Trainer,
    R: Rng,
{
    batch_source: BatchSource,
    countdown: Countdown,
    total_steps: u64,
    hyperparameter: L1L2,
    model: T,
    rng: R,
}

impl<T, R> Member<T, R>
where
    T: Trainer,
    R: Rng,
{
    /// Creates a new `Member`.
    ///
    /// # Arguments
    /// * `batch_source` - The source of this member's training and validation data.
    /// * `steps_to_ready` - The amount of steps between readiness checks.
    /// * `hyperparameter` - The initial regularization strengths.
    /// * `model` - The model this member trains.
    /// * `rng` - The random source used when exploring.
    pub fn new(
        batch_source: BatchSource,
        steps_to_ready: NonZeroUsize,
        hyperparameter: L1L2,
        model: T,
        rng: R,
    ) -> Self {
        Self {
            batch_source,
            countdown: Countdown::new(steps_to_ready),
            total_steps: 0,
            hyperparameter,
            model,
            rng,
        }
    }

    /// Trains the model on the next batch.
    ///
    /// # Returns
    /// The training loss of the batch, or the model's error. On error the step counters
    /// are left as they were.
    pub fn step(&mut self) -> Result<f32> {
        let batch = self.batch_source.next_batch();
        let loss = self
            .model
            .train_on_batch(batch.x, batch.y, &self.hyperparameter)?;

        self.total_steps += 1;
        self.countdown.tick();

        trace!(step = self.total_steps, loss = loss; "trained member");
        Ok(loss)
    }

    /// Evaluates the model on the validation set with the current hyperparameter.
    pub fn eval(&self) -> Result<f32> {
        let validation = self.batch_source.validation();
        let loss = self
            .model
            .evaluate(validation.x, validation.y, &self.hyperparameter)?;

        info!(step = self.total_steps, loss = loss; "evaluated member");
        Ok(loss)
    }

    /// Returns true once per readiness cycle.
    ///
    /// The first call after the cycle is over restarts it at its full length and returns
    /// true, any steps taken past its end are discarded.
    pub fn ready(&mut self) -> bool {
        let overrun = match self.countdown.state() {
            ReadyState::Due { overrun } => overrun,
            ReadyState::Counting { .. } => 0,
        };
        let ready = self.countdown.poll();

        if ready {
            debug!(step = self.total_steps, overrun = overrun; "member ready");
        }

        ready
    }

    /// Perturbs the hyperparameter by one of the `EXPLORE_FACTORS`, leaving the weights as
    /// they are.
    pub fn explore(&mut self) -> Result<()> {
        self.hyperparameter.perturb(&EXPLORE_FACTORS, &mut self.rng)?;

        info!(l1 = self.hyperparameter.l1, l2 = self.hyperparameter.l2; "explored");
        Ok(())
    }

    /// Copies `other`'s weights and hyperparameter into this member.
    ///
    /// Data cursor and step counters are kept. Nothing is modified if the models don't
    /// have the same amount of parameters.
    pub fn replace_with<U, Q>(&mut self, other: &Member<U, Q>) -> Result<()>
    where
        U: Trainer,
        Q: Rng,
    {
        let params = other.model.params();
        let expected = self.model.params().len();
        if params.len() != expected {
            return Err(PbtErr::WeightsMismatch {
                got: params.len(),
                expected,
            });
        }

        self.model.set_params(params)?;
        self.hyperparameter.replace_with(&other.hyperparameter);

        info!(
            l1 = self.hyperparameter.l1,
            l2 = self.hyperparameter.l2;
            "replaced with a better member"
        );
        Ok(())
    }

    /// Returns the amount of optimization steps taken since construction.
    #[inline]
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Returns the steps left in the current cycle, negative once it has been overrun.
    #[inline]
    pub fn steps_remaining(&self) -> i64 {
        self.countdown.remaining()
    }

    #[inline]
    pub fn steps_to_ready(&self) -> NonZeroUsize {
        self.countdown.steps_to_ready()
    }

    #[inline]
    pub fn ready_state(&self) -> ReadyState {
        self.countdown.state()
    }

    #[inline]
    pub fn hyperparameter(&self) -> &L1L2 {
        &self.hyperparameter
    }

    #[inline]
    pub fn model(&self) -> &T {
        &self.model
    }

    #[inline]
    pub fn batch_source(&self) -> &BatchSource {
        &self.batch_source
    }
}

#[cfg(test)]
mod tests {
    use machine_learning::{MlErr, arch::Regularizer};
    use ndarray::{Array2, ArrayView2};
    use rand::SeedableRng;

    use super::*;

    /// Records every call instead of training anything.
    struct Recorder {
        params: Vec<f32>,
        batch_rows: Vec<usize>,
        penalties: Vec<f32>,
    }

    impl Recorder {
        fn new(params: Vec<f32>) -> Self {
            Self {
                params,
                batch_rows: Vec::new(),
                penalties: Vec::new(),
            }
        }
    }

    impl Trainer for Recorder {
        fn train_on_batch(
            &mut self,
            x: ArrayView2<f32>,
            _y: ArrayView2<f32>,
            regularizer: &dyn Regularizer,
        ) -> machine_learning::Result<f32> {
            self.batch_rows.push(x.nrows());
            self.penalties.push(regularizer.penalty(&[1.0]));
            Ok(x.nrows() as f32)
        }

        fn evaluate(
            &self,
            x: ArrayView2<f32>,
            _y: ArrayView2<f32>,
            regularizer: &dyn Regularizer,
        ) -> machine_learning::Result<f32> {
            Ok(x.nrows() as f32 + regularizer.penalty(&[1.0]))
        }

        fn params(&self) -> &[f32] {
            &self.params
        }

        fn set_params(&mut self, params: &[f32]) -> machine_learning::Result<()> {
            if params.len() != self.params.len() {
                return Err(MlErr::SizeMismatch {
                    what: "params",
                    got: params.len(),
                    expected: self.params.len(),
                });
            }
            self.params.copy_from_slice(params);
            Ok(())
        }
    }

    fn member(params: Vec<f32>, reg: L1L2, seed: u64) -> Member<Recorder> {
        let source = BatchSource::new(
            Array2::zeros((100, 2)),
            Array2::zeros((100, 1)),
            Array2::zeros((10, 2)),
            Array2::zeros((10, 1)),
            64,
        )
        .unwrap();

        Member::new(
            source,
            NonZeroUsize::new(5).unwrap(),
            reg,
            Recorder::new(params),
            StdRng::seed_from_u64(seed),
        )
    }

    #[test]
    fn steps_cycle_through_the_batches() {
        let mut m = member(vec![0.0], L1L2::default(), 0);

        let losses: Vec<_> = (0..3).map(|_| m.step().unwrap()).collect();

        assert_eq!(losses, [64.0, 36.0, 64.0]);
        assert_eq!(m.model().batch_rows, [64, 36, 64]);
        assert_eq!(m.total_steps(), 3);
        assert_eq!(m.steps_remaining(), 2);
    }

    #[test]
    fn readiness_cycle() {
        let mut m = member(vec![0.0], L1L2::default(), 0);

        for _ in 0..4 {
            m.step().unwrap();
            assert!(!m.ready());
        }
        m.step().unwrap();

        assert!(m.ready());
        assert!(!m.ready());
        assert_eq!(m.steps_remaining(), 5);
        assert_eq!(m.total_steps(), 5);
    }

    #[test]
    fn overrun_steps_are_discarded() {
        let mut m = member(vec![0.0], L1L2::default(), 0);
        for _ in 0..7 {
            m.step().unwrap();
        }
        assert_eq!(m.ready_state(), ReadyState::Due { overrun: 2 });

        assert!(m.ready());
        for _ in 0..4 {
            m.step().unwrap();
        }
        assert!(!m.ready());
        m.step().unwrap();
        assert!(m.ready());
        assert_eq!(m.total_steps(), 12);
    }

    #[test]
    fn explore_changes_the_hyperparameter_only() {
        let mut m = member(vec![1.0, 2.0], L1L2::new(1.0, 1.0), 4);

        m.explore().unwrap();

        let reg = *m.hyperparameter();
        assert!(reg.l1 == 0.8 || reg.l1 == 1.2);
        assert_eq!(reg.l1, reg.l2);
        assert_eq!(m.model().params(), [1.0, 2.0]);
        assert_eq!(m.total_steps(), 0);
    }

    #[test]
    fn next_step_sees_the_explored_hyperparameter() {
        let mut m = member(vec![0.0], L1L2::new(1.0, 1.0), 5);
        m.step().unwrap();

        m.explore().unwrap();
        m.step().unwrap();

        let reg = *m.hyperparameter();
        assert_eq!(m.model().penalties, [2.0, reg.l1 + reg.l2]);
    }

    #[test]
    fn eval_uses_the_validation_set_and_current_hyperparameter() {
        let m = member(vec![0.0], L1L2::new(0.5, 0.25), 0);

        assert_eq!(m.eval().unwrap(), 10.75);
        assert_eq!(m.batch_source().cursor(), 0);
    }

    #[test]
    fn replace_with_copies_weights_and_hyperparameter_but_not_progress() {
        let mut a = member(vec![0.0, 0.0], L1L2::new(1.0, 1.0), 0);
        let mut b = member(vec![3.0, 4.0], L1L2::new(2.0, 3.0), 1);
        for _ in 0..3 {
            b.step().unwrap();
        }
        a.step().unwrap();

        a.replace_with(&b).unwrap();

        assert_eq!(a.model().params(), [3.0, 4.0]);
        assert_eq!(*a.hyperparameter(), L1L2::new(2.0, 3.0));
        assert_eq!(a.total_steps(), 1);
        assert_eq!(a.steps_remaining(), 4);
        assert_eq!(a.batch_source().cursor(), 1);

        // No aliasing, the copy is by value.
        b.explore().unwrap();
        assert_eq!(*a.hyperparameter(), L1L2::new(2.0, 3.0));
    }

    #[test]
    fn failed_replace_leaves_everything_untouched() {
        let mut a = member(vec![0.0, 0.0], L1L2::new(1.0, 1.0), 0);
        let b = member(vec![3.0, 4.0, 5.0], L1L2::new(2.0, 3.0), 1);

        assert!(matches!(
            a.replace_with(&b),
            Err(PbtErr::WeightsMismatch { got: 3, expected: 2 })
        ));
        assert_eq!(a.model().params(), [0.0, 0.0]);
        assert_eq!(*a.hyperparameter(), L1L2::new(1.0, 1.0));
    }
}
