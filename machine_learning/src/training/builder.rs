use log::debug;
use rand::{SeedableRng, rngs::StdRng};

use super::{ModelTrainer, Trainer};
use crate::{
    MlErr, Result,
    arch::{
        Model, Sequential,
        activations::ActFn,
        layers::Layer,
        loss::{LossFn, Mse},
    },
    optimization::{Adam, GradientDescent, Optimizer},
    spec::{ActFnSpec, LayerSpec, LossFnSpec, ModelSpec, OptimizerSpec, TrainerSpec},
};

/// Builds `Trainer`s given a specification.
#[derive(Default)]
pub struct TrainerBuilder;

impl TrainerBuilder {
    /// Creates a new `TrainerBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `Trainer` following a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification for the trainer.
    /// * `input_dim` - The amount of features of each input row.
    /// * `output_dim` - The amount of targets of each row, the width of the last dense layer.
    ///
    /// # Returns
    /// A trainer with freshly initialized parameters, or an error if the spec can't be built.
    pub fn build(
        &self,
        spec: &TrainerSpec,
        input_dim: usize,
        output_dim: usize,
    ) -> Result<Box<dyn Trainer>> {
        self.resolve_model(spec, input_dim, output_dim)
    }

    fn resolve_model(
        &self,
        spec: &TrainerSpec,
        input_dim: usize,
        output_dim: usize,
    ) -> Result<Box<dyn Trainer>> {
        match &spec.model {
            ModelSpec::Sequential {
                layers: layer_specs,
            } => {
                let mut width = input_dim;
                let mut layers = Vec::with_capacity(layer_specs.len());
                for ls in layer_specs {
                    let layer = self.resolve_layer(*ls, width)?;
                    if let Layer::Dense(dense) = &layer {
                        width = dense.dim().1;
                    }
                    layers.push(layer);
                }

                if !layers.iter().any(|l| matches!(l, Layer::Dense(_))) {
                    return Err(MlErr::InvalidSpec(
                        "a sequential model needs at least one dense layer".into(),
                    ));
                }

                if width != output_dim {
                    return Err(MlErr::SizeMismatch {
                        what: "model output width",
                        got: width,
                        expected: output_dim,
                    });
                }

                let model = Sequential::new(layers);
                debug!(
                    input_dim = input_dim,
                    output_dim = output_dim,
                    size = model.size();
                    "resolved sequential model"
                );
                self.resolve_optimizer(spec, model)
            }
        }
    }

    fn resolve_layer(&self, spec: LayerSpec, input_dim: usize) -> Result<Layer> {
        match spec {
            LayerSpec::Dense { units, act_fn } => {
                if units == 0 || input_dim == 0 {
                    return Err(MlErr::InvalidSpec(format!(
                        "dense layer ({input_dim}, {units}) has an empty side"
                    )));
                }

                let factory = |act_fn| Layer::dense((input_dim, units), act_fn);
                Ok(self.resolve_act_fn(act_fn, factory))
            }
            LayerSpec::Dropout { rate } => {
                if !(0.0..1.0).contains(&rate) {
                    return Err(MlErr::InvalidSpec(format!(
                        "dropout rate {rate} is outside [0, 1)"
                    )));
                }

                Ok(Layer::dropout(rate))
            }
        }
    }

    fn resolve_act_fn<F>(&self, spec: Option<ActFnSpec>, layer_factory: F) -> Layer
    where
        F: FnOnce(Option<ActFn>) -> Layer,
    {
        let Some(act_fn) = spec else {
            return layer_factory(None);
        };

        let act_fn = match act_fn {
            ActFnSpec::Relu => Some(ActFn::relu()),
            ActFnSpec::Sigmoid { amp } => Some(ActFn::sigmoid(amp)),
        };

        layer_factory(act_fn)
    }

    fn resolve_optimizer<M>(&self, spec: &TrainerSpec, model: M) -> Result<Box<dyn Trainer>>
    where
        M: Model + 'static,
    {
        match spec.optimizer {
            OptimizerSpec::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => {
                Self::check_learning_rate(learning_rate)?;
                let optimizer = Adam::new(model.size(), learning_rate, beta1, beta2, epsilon);
                self.resolve_loss(spec, model, optimizer)
            }
            OptimizerSpec::GradientDescent { learning_rate } => {
                Self::check_learning_rate(learning_rate)?;
                let optimizer = GradientDescent::new(learning_rate);
                self.resolve_loss(spec, model, optimizer)
            }
        }
    }

    fn check_learning_rate(learning_rate: f32) -> Result<()> {
        if !learning_rate.is_finite() || learning_rate <= 0. {
            return Err(MlErr::InvalidSpec(format!(
                "learning rate {learning_rate} must be positive"
            )));
        }

        Ok(())
    }

    fn resolve_loss<M, O>(
        &self,
        spec: &TrainerSpec,
        model: M,
        optimizer: O,
    ) -> Result<Box<dyn Trainer>>
    where
        M: Model + 'static,
        O: Optimizer + 'static,
    {
        match spec.loss {
            LossFnSpec::Mse => {
                let loss = Mse::new();
                self.terminate_build(spec, model, optimizer, loss)
            }
        }
    }

    fn terminate_build<M, O, L>(
        &self,
        spec: &TrainerSpec,
        model: M,
        optimizer: O,
        loss: L,
    ) -> Result<Box<dyn Trainer>>
    where
        M: Model + 'static,
        O: Optimizer + 'static,
        L: LossFn + 'static,
    {
        let rng = self.generate_rng(spec.seed);
        let trainer = ModelTrainer::new(model, optimizer, loss, rng)?;

        Ok(Box::new(trainer))
    }

    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::Array2;

    use super::*;
    use crate::arch::NoPenalty;

    fn seeded(model: ModelSpec) -> TrainerSpec {
        TrainerSpec {
            model,
            seed: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn default_spec_builds_the_64_unit_network() {
        let trainer = TrainerBuilder::new()
            .build(&seeded(ModelSpec::default()), 3, 1)
            .unwrap();

        // (3 + 1) * 64 + (64 + 1) * 1
        assert_eq!(trainer.params().len(), 321);
    }

    #[test]
    fn same_seed_gives_the_same_initial_parameters() {
        let spec = seeded(ModelSpec::default());
        let a = TrainerBuilder::new().build(&spec, 2, 1).unwrap();
        let b = TrainerBuilder::new().build(&spec, 2, 1).unwrap();

        assert_eq!(a.params(), b.params());
    }

    #[test]
    fn built_trainer_evaluates_batches() {
        let trainer = TrainerBuilder::new()
            .build(&seeded(ModelSpec::default()), 2, 1)
            .unwrap();
        let x = Array2::from_elem((4, 2), 0.5);
        let y = Array2::zeros((4, 1));

        let loss = trainer.evaluate(x.view(), y.view(), &NoPenalty).unwrap();
        assert!(loss.is_finite());
    }

    #[test]
    fn output_width_must_match_the_targets() {
        let result = TrainerBuilder::new().build(&seeded(ModelSpec::default()), 2, 3);

        assert!(matches!(
            result,
            Err(MlErr::SizeMismatch { got: 1, expected: 3, .. })
        ));
    }

    #[test]
    fn dropout_only_model_is_rejected() {
        let spec = seeded(ModelSpec::Sequential {
            layers: vec![LayerSpec::Dropout { rate: 0.5 }],
        });

        assert!(matches!(
            TrainerBuilder::new().build(&spec, 1, 1),
            Err(MlErr::InvalidSpec(_))
        ));
    }

    #[test]
    fn invalid_dropout_rate_is_rejected() {
        let spec = seeded(ModelSpec::Sequential {
            layers: vec![
                LayerSpec::Dense {
                    units: 1,
                    act_fn: None,
                },
                LayerSpec::Dropout { rate: 1.0 },
            ],
        });

        assert!(TrainerBuilder::new().build(&spec, 1, 1).is_err());
    }

    #[test]
    fn non_positive_learning_rate_is_rejected() {
        let spec = TrainerSpec {
            optimizer: OptimizerSpec::GradientDescent { learning_rate: 0.0 },
            ..seeded(ModelSpec::default())
        };

        assert!(TrainerBuilder::new().build(&spec, 1, 1).is_err());
    }
}
