// src/quantum/mod.rs
//! Quantum registers and the gates acting on them
//!
//! Registers are plain state vectors. Gates are immutable values: dense
//! matrices, lazy gates touching a few positions of a larger register,
//! closed-form permutations, and composites of these.

pub mod bits;
pub mod state;
pub mod operator;
pub mod structural;
pub mod gate;
pub mod lazy;
pub mod oracle;
pub mod gate_operations;

pub use state::{QReg, Qubit, ONE, ZERO};
pub use operator::{LinearOperator, Operator, SparseMatrix, Storage};
pub use structural::{Structural, StructuralKind};
pub use gate::{DenseGate, Gate, SequenceGate, TensorGate};
pub use lazy::LazyGate;
pub use oracle::oracle_gate;

/// Re-export commonly used types and traits
pub mod prelude {
    pub use super::{QReg, Qubit, ONE, ZERO};
    pub use super::{DenseGate, Gate, LazyGate, Structural};
    pub use super::{LinearOperator, Operator, Storage};
    pub use super::oracle_gate;
    pub use super::gate_operations::{compose, repeat, sequence, stack, tensor};
    pub use crate::error::{GateError, Result};
}
