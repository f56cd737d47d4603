// src/quantum/structural.rs
//! Closed-form permutation gates
//!
//! These gates know their index permutation in advance and store no matrix.
//! They act on vectors of exactly their declared dimension, either as a whole
//! register gate or as the local block operator of a lazy gate.

use ndarray::{s, Array1, Array2, ArrayView1};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};
use super::bits;
use super::operator::{check_length, LinearOperator};

/// Which fixed permutation is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructuralKind {
    /// Swap the last two amplitudes: NOT on the lowest qubit, controlled on all others being 1
    SwapLastPair,
    /// Reverse the amplitude order: NOT on every qubit
    Reverse,
}

/// A fixed permutation over `2^qubits` amplitudes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "StructuralRepr")]
pub struct Structural {
    kind: StructuralKind,
    qubits: usize,
}

#[derive(Deserialize)]
struct StructuralRepr {
    kind: StructuralKind,
    qubits: usize,
}

impl TryFrom<StructuralRepr> for Structural {
    type Error = GateError;

    fn try_from(repr: StructuralRepr) -> Result<Self> {
        match repr.kind {
            StructuralKind::SwapLastPair if repr.qubits == 0 => Err(GateError::DimensionMismatch {
                qubits: 0,
                expected: 2,
                actual: 1,
            }),
            StructuralKind::SwapLastPair => Self::swap_last_pair(repr.qubits - 1),
            StructuralKind::Reverse => Self::reverse(repr.qubits),
        }
    }
}

impl Structural {
    /// Multi-controlled NOT with `controls` control qubits
    pub fn swap_last_pair(controls: usize) -> Result<Self> {
        bits::dimension(controls + 1)?;
        Ok(Structural {
            kind: StructuralKind::SwapLastPair,
            qubits: controls + 1,
        })
    }

    /// NOT on each of `qubits` qubits
    pub fn reverse(qubits: usize) -> Result<Self> {
        bits::dimension(qubits)?;
        Ok(Structural {
            kind: StructuralKind::Reverse,
            qubits,
        })
    }

    pub fn kind(&self) -> StructuralKind {
        self.kind
    }

    pub fn qubit_count(&self) -> usize {
        self.qubits
    }

    /// Index that the amplitude at `index` moves to
    pub fn permute(&self, index: usize) -> usize {
        let last = self.dim() - 1;
        match self.kind {
            StructuralKind::Reverse => last - index,
            StructuralKind::SwapLastPair if index == last => last - 1,
            StructuralKind::SwapLastPair if index + 1 == last => last,
            StructuralKind::SwapLastPair => index,
        }
    }
}

impl LinearOperator for Structural {
    fn dim(&self) -> usize {
        1 << self.qubits
    }

    fn apply_to_vector(&self, vector: ArrayView1<Complex64>) -> Result<Array1<Complex64>> {
        let dim = self.dim();
        check_length(dim, vector.len())?;

        match self.kind {
            StructuralKind::Reverse => Ok(vector.slice(s![..;-1]).to_owned()),
            StructuralKind::SwapLastPair => {
                let mut out = vector.to_owned();
                out.swap(dim - 1, dim - 2);
                Ok(out)
            }
        }
    }

    fn to_matrix(&self) -> Array2<Complex64> {
        let dim = self.dim();
        let mut matrix = Array2::zeros((dim, dim));
        for col in 0..dim {
            matrix[[self.permute(col), col]] = Complex64::new(1.0, 0.0);
        }
        matrix
    }

    fn nonzeros(&self) -> usize {
        self.dim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Array1<Complex64> {
        (0..n).map(|i| Complex64::new(i as f64, -(i as f64))).collect()
    }

    #[test]
    fn test_swap_last_pair() {
        let cnot = Structural::swap_last_pair(1).unwrap();
        assert_eq!(cnot.dim(), 4);

        let out = cnot.apply_to_vector(ramp(4).view()).unwrap();
        let expected: Vec<f64> = vec![0.0, 1.0, 3.0, 2.0];
        assert_eq!(out.iter().map(|a| a.re).collect::<Vec<_>>(), expected);

        // Toffoli on three qubits
        let toffoli = Structural::swap_last_pair(2).unwrap().to_matrix();
        for i in 0..8 {
            let j = if i >= 6 { i ^ 1 } else { i };
            assert_eq!(toffoli[[j, i]], Complex64::new(1.0, 0.0));
        }
    }

    #[test]
    fn test_reverse_is_not_on_every_qubit() {
        let rev = Structural::reverse(3).unwrap();
        for i in 0..8 {
            assert_eq!(rev.permute(i), i ^ 0b111);
        }

        let v = ramp(8);
        let once = rev.apply_to_vector(v.view()).unwrap();
        assert_eq!(once[0], v[7]);
        let twice = rev.apply_to_vector(once.view()).unwrap();
        assert_eq!(twice, v);
    }

    #[test]
    fn test_matrix_matches_vector_action() {
        for s in [
            Structural::swap_last_pair(0).unwrap(),
            Structural::swap_last_pair(3).unwrap(),
            Structural::reverse(0).unwrap(),
            Structural::reverse(2).unwrap(),
        ] {
            let v = ramp(s.dim());
            assert_eq!(s.to_matrix().dot(&v), s.apply_to_vector(v.view()).unwrap());
        }
    }

    #[test]
    fn test_wrong_length_rejected() {
        let rev = Structural::reverse(2).unwrap();
        assert!(rev.apply_to_vector(ramp(8).view()).is_err());
    }
}
