use serde::{Deserialize, Serialize};

/// The specification for the `ActFn` enum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFnSpec {
    Relu,
    Sigmoid { amp: f32 },
}

/// The specification for the `Layer` enum.
///
/// Input widths are not part of the specification, they are inferred from the data the
/// model is built for and from the preceding layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSpec {
    Dense {
        units: usize,
        #[serde(default)]
        act_fn: Option<ActFnSpec>,
    },
    Dropout {
        rate: f32,
    },
}

/// The specification for the `Model` trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSpec {
    Sequential { layers: Vec<LayerSpec> },
}

impl Default for ModelSpec {
    /// `Dense(64, relu) -> Dropout(0.2) -> Dense(1)`.
    fn default() -> Self {
        Self::Sequential {
            layers: vec![
                LayerSpec::Dense {
                    units: 64,
                    act_fn: Some(ActFnSpec::Relu),
                },
                LayerSpec::Dropout { rate: 0.2 },
                LayerSpec::Dense {
                    units: 1,
                    act_fn: None,
                },
            ],
        }
    }
}

/// The specification for the `Optimizer` trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    Adam {
        #[serde(default = "defaults::adam_learning_rate")]
        learning_rate: f32,
        #[serde(default = "defaults::beta1")]
        beta1: f32,
        #[serde(default = "defaults::beta2")]
        beta2: f32,
        #[serde(default = "defaults::epsilon")]
        epsilon: f32,
    },
    GradientDescent {
        learning_rate: f32,
    },
}

impl Default for OptimizerSpec {
    fn default() -> Self {
        Self::Adam {
            learning_rate: defaults::adam_learning_rate(),
            beta1: defaults::beta1(),
            beta2: defaults::beta2(),
            epsilon: defaults::epsilon(),
        }
    }
}

mod defaults {
    pub fn adam_learning_rate() -> f32 {
        1e-3
    }

    pub fn beta1() -> f32 {
        0.9
    }

    pub fn beta2() -> f32 {
        0.999
    }

    pub fn epsilon() -> f32 {
        1e-7
    }
}

/// The specification for the `LossFn` trait.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFnSpec {
    #[default]
    #[serde(alias = "mean_squared_error")]
    Mse,
}

/// The specification for a `Trainer`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerSpec {
    pub model: ModelSpec,
    pub optimizer: OptimizerSpec,
    pub loss: LossFnSpec,
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_the_default_trainer() {
        let spec: TrainerSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(spec, TrainerSpec::default());
    }

    #[test]
    fn optimizer_fields_fall_back_to_adam_defaults() {
        let spec: OptimizerSpec =
            serde_json::from_str(r#"{ "adam": { "learning_rate": 0.01 } }"#).unwrap();

        assert_eq!(
            spec,
            OptimizerSpec::Adam {
                learning_rate: 0.01,
                beta1: 0.9,
                beta2: 0.999,
                epsilon: 1e-7,
            }
        );
    }

    #[test]
    fn loss_accepts_its_long_name() {
        let spec: LossFnSpec = serde_json::from_str(r#""mean_squared_error""#).unwrap();
        assert_eq!(spec, LossFnSpec::Mse);
    }

    #[test]
    fn full_trainer_document() {
        let json = r#"{
            "model": { "sequential": { "layers": [
                { "dense": { "units": 8, "act_fn": { "sigmoid": { "amp": 1.0 } } } },
                { "dropout": { "rate": 0.1 } },
                { "dense": { "units": 2 } }
            ] } },
            "optimizer": { "gradient_descent": { "learning_rate": 0.5 } },
            "loss": "mse",
            "seed": 42
        }"#;

        let spec: TrainerSpec = serde_json::from_str(json).unwrap();

        let ModelSpec::Sequential { layers } = &spec.model;
        assert_eq!(layers.len(), 3);
        assert_eq!(
            layers[2],
            LayerSpec::Dense {
                units: 2,
                act_fn: None
            }
        );
        assert_eq!(
            spec.optimizer,
            OptimizerSpec::GradientDescent { learning_rate: 0.5 }
        );
        assert_eq!(spec.seed, Some(42));
    }
}
