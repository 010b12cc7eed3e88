pub mod batch_source;

pub use batch_source::{BatchRef, BatchSource};
