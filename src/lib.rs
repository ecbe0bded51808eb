pub use error::AppError;

/// Main layers (dependency flow: CLI → Core → Utils/Storage)
pub mod cli; // Command-line interface
pub mod core; // Value model, flattening, pure helpers
pub mod storage; // Configuration persistence

/// Support modules (used across layers)
pub mod display; // Output formatting
pub mod error; // Error handling
pub mod utils; // File handles, opener, validation

pub use crate::core::flatten::{Flattener, flatten};
pub use crate::core::value::{ContainerKind, SharedValue, Value};

pub type Result<T> = std::result::Result<T, AppError>;
