//! Quantum gate simulation on classical state vectors
//!
//! This crate applies quantum gates to the state vector of a multi-qubit
//! register. Gates are built from explicit unitary matrices, from boolean
//! oracle definitions, or as lazy gates that act on a few positions of a large
//! register without building its full matrix. Gates compose sequentially, in
//! parallel (tensor product) and by repetition.

pub mod error;
pub mod quantum;

pub use error::{GateError, Result};

// Create a prelude module for convenient imports
pub mod prelude {
    pub use crate::quantum::prelude::*;
}

// Version and crate information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
