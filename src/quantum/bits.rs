// src/quantum/bits.rs
//! Basis indexing helpers
//!
//! A basis index of an n-qubit register is an integer in `0..2^n`. Position `p`
//! of the register is bit `p` of the index. Labels are written most significant
//! bit first, so the label `"011"` names index 3.

use crate::error::{GateError, Result};

/// Dimension of the state space of `qubits` qubits (2^qubits)
pub fn dimension(qubits: usize) -> Result<usize> {
    if qubits >= usize::BITS as usize {
        return Err(GateError::RegisterTooLarge { qubits });
    }
    Ok(1 << qubits)
}

/// Qubit count whose state space has exactly `dim` entries, if `dim` is a power of two
pub fn qubits_for_dimension(dim: usize) -> Option<usize> {
    if dim.is_power_of_two() {
        Some(dim.trailing_zeros() as usize)
    } else {
        None
    }
}

/// Value (0 or 1) of the qubit at `position` in `index`
#[inline]
pub fn bit(index: usize, position: usize) -> usize {
    (index >> position) & 1
}

/// Packs the bits of `index` found at `positions` so that `positions[i]` lands on bit `i`
///
/// Used as the spectator key: indices sharing the same spectator assignment
/// get the same packed value.
pub fn pack_bits(index: usize, positions: &[usize]) -> usize {
    positions
        .iter()
        .enumerate()
        .fold(0, |acc, (i, &q)| acc | (bit(index, q) << i))
}

/// Gathers the bits of `index` found at `positions`, `positions[0]` most significant
///
/// Used as the target key: it is the row/column of a local operator whose
/// first target is its leading qubit.
pub fn gather_bits(index: usize, positions: &[usize]) -> usize {
    let m = positions.len();
    positions
        .iter()
        .enumerate()
        .fold(0, |acc, (i, &q)| acc | (bit(index, q) << (m - i - 1)))
}

/// Binary label of `index`, `qubits` characters wide, most significant bit first
pub fn basis_label(index: usize, qubits: usize) -> String {
    if qubits == 0 {
        return String::new();
    }
    format!("{:0width$b}", index, width = qubits)
}

/// All basis labels of a `qubits`-qubit register in index order
pub fn basis_labels(qubits: usize) -> Result<Vec<String>> {
    let dim = dimension(qubits)?;
    Ok((0..dim).map(|i| basis_label(i, qubits)).collect())
}

/// Parses a label of `0`/`1` characters into its basis index
pub fn parse_label(label: &str) -> Result<usize> {
    if !label.chars().all(|c| c == '0' || c == '1') {
        return Err(GateError::InvalidBitString {
            input: label.to_string(),
        });
    }
    if label.is_empty() {
        return Ok(0);
    }
    usize::from_str_radix(label, 2).map_err(|_| GateError::RegisterTooLarge {
        qubits: label.len(),
    })
}
