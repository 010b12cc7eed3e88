pub mod arch;
pub mod error;
pub mod optimization;
pub mod spec;
pub mod training;

pub use error::{MlErr, Result};
