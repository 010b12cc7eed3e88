use std::num::NonZeroUsize;

use log::info;
use machine_learning::training::TrainerBuilder;
use ndarray::Array2;
use rand::{SeedableRng, rngs::StdRng};

use crate::{Member, MemberConfig, PbtErr, Result, data::BatchSource};

/// Builds `Member`s from a `MemberConfig`.
#[derive(Default)]
pub struct MemberBuilder;

impl MemberBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Builds a `Member` owning the given data.
    ///
    /// # Arguments
    /// * `config` - The member's configuration.
    /// * `train` - The training inputs and targets, one example per row.
    /// * `eval` - The held-out inputs and targets.
    ///
    /// # Returns
    /// A member with a freshly initialized model, or an error if the configuration or the
    /// data can't be used.
    pub fn build(
        &self,
        config: &MemberConfig,
        train: (Array2<f32>, Array2<f32>),
        eval: (Array2<f32>, Array2<f32>),
    ) -> Result<Member> {
        let steps_to_ready = NonZeroUsize::new(config.steps_to_ready)
            .ok_or_else(|| PbtErr::InvalidConfig("steps_to_ready must be positive".into()))?;

        let (train_x, train_y) = train;
        let (eval_x, eval_y) = eval;
        let batch_source = BatchSource::new(train_x, train_y, eval_x, eval_y, config.batch_size)?;

        let mut spec = config.trainer.clone();
        spec.seed = spec.seed.or(config.seed);
        let model = TrainerBuilder::new().build(
            &spec,
            batch_source.input_dim(),
            batch_source.output_dim(),
        )?;

        info!(
            steps_to_ready = steps_to_ready.get(),
            batch_size = config.batch_size,
            params = model.params().len();
            "built member"
        );

        Ok(Member::new(
            batch_source,
            steps_to_ready,
            config.hyperparameter,
            model,
            self.generate_rng(config.seed),
        ))
    }

    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
