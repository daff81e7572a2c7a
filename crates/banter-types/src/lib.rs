//! Shared types and error hierarchy for Banter.

pub mod error;
pub mod generation;
pub mod model;
pub mod util;

pub use error::{ConfigError, ModelError, TransportError};
pub use generation::*;
pub use model::*;
pub use util::*;
