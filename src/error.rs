use std::{error::Error, fmt, io};

use machine_learning::MlErr;

/// The pbt module's result type.
pub type Result<T> = std::result::Result<T, PbtErr>;

/// Population member failures.
#[derive(Debug)]
pub enum PbtErr {
    /// A configuration value can't be used (e.g. a zero batch size).
    InvalidConfig(String),
    /// Two row-aligned arrays disagree on a dimension.
    LengthMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A weight transplant between members with different parameter counts.
    WeightsMismatch { got: usize, expected: usize },
    /// A perturbation was requested with no factors to choose from.
    EmptyFactors,
    Ml(MlErr),
    Io(io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for PbtErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PbtErr::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            PbtErr::LengthMismatch {
                what,
                got,
                expected,
            } => write!(f, "length mismatch for {what}: got {got}, expected {expected}"),
            PbtErr::WeightsMismatch { got, expected } => write!(
                f,
                "weights length mismatch: got {got}, expected {expected}"
            ),
            PbtErr::EmptyFactors => write!(f, "no perturbation factors to choose from"),
            PbtErr::Ml(e) => write!(f, "model error: {e}"),
            PbtErr::Io(e) => write!(f, "io error: {e}"),
            PbtErr::Json(e) => write!(f, "json error: {e}"),
        }
    }
}

impl Error for PbtErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PbtErr::Ml(e) => Some(e),
            PbtErr::Io(e) => Some(e),
            PbtErr::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MlErr> for PbtErr {
    fn from(value: MlErr) -> Self {
        Self::Ml(value)
    }
}

impl From<io::Error> for PbtErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for PbtErr {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
