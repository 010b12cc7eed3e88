pub mod activations;
pub mod layers;
pub mod loss;
mod model;
mod regularizer;
mod sequential;

pub use model::Model;
pub use regularizer::{L1L2, NoPenalty, Regularizer};
pub use sequential::Sequential;
