// src/quantum/gate_operations.rs
//! Named composition operations over gates
//!
//! Free-function forms of [`Gate::compose_sequential`],
//! [`Gate::compose_parallel`] and [`Gate::repeat`], plus folds that chain a
//! list of gates in time (`sequence`) or stack them across the register
//! (`stack`).

use crate::error::{GateError, Result};
use super::gate::Gate;

/// `first` followed by `second`
pub fn compose(first: &Gate, second: &Gate) -> Result<Gate> {
    first.compose_sequential(second)
}

/// `high ⊗ low`
pub fn tensor(high: &Gate, low: &Gate) -> Result<Gate> {
    high.compose_parallel(low)
}

/// `gate` applied `count` times
pub fn repeat(gate: &Gate, count: u32) -> Result<Gate> {
    gate.repeat(count)
}

/// Gates applied one after another, first to last
pub fn sequence(gates: &[Gate]) -> Result<Gate> {
    let (first, rest) = gates.split_first().ok_or(GateError::EmptyComposition)?;
    rest.iter()
        .try_fold(first.clone(), |acc, gate| acc.compose_sequential(gate))
}

/// Gates side by side, the first on the leftmost qubits of a label
///
/// Use `Gate::identity` for qubits that should be left alone.
pub fn stack(gates: &[Gate]) -> Result<Gate> {
    let (first, rest) = gates.split_first().ok_or(GateError::EmptyComposition)?;
    rest.iter()
        .try_fold(first.clone(), |acc, gate| acc.compose_parallel(gate))
}
