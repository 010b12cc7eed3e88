use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire machine learning module.
pub type Result<T> = std::result::Result<T, MlErr>;

/// The machine learning module's error type.
#[derive(Debug)]
pub enum MlErr {
    /// A shape invariant was violated (e.g. a parameter slice of the wrong length).
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A specification could not be turned into a runnable component.
    InvalidSpec(String),
}

impl Display for MlErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MlErr::SizeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch for {what}, got {got} and expected {expected}"
            ),
            MlErr::InvalidSpec(msg) => write!(f, "Invalid specification: {msg}"),
        }
    }
}

impl Error for MlErr {}
