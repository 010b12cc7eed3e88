pub mod builder;
pub mod config;
pub mod data;
pub mod error;
pub mod hyperparameter;
pub mod member;
pub mod readiness;

pub use builder::MemberBuilder;
pub use config::MemberConfig;
pub use data::{BatchRef, BatchSource};
pub use error::{PbtErr, Result};
pub use hyperparameter::Hyperparameter;
pub use member::{EXPLORE_FACTORS, Member};
pub use readiness::{Countdown, ReadyState};
