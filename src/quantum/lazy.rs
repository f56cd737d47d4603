// src/quantum/lazy.rs
//! Gates acting on a few qubits of a large register
//!
//! A [`LazyGate`] holds a small m-qubit operator and the m register positions
//! it acts on. At construction it sorts the 2^n basis indices so that every
//! run of 2^m consecutive entries shares one spectator assignment and lists
//! the target assignments in increasing order. Applying the gate then gathers
//! each run, applies the small operator and scatters the result back. The
//! full 2^n × 2^n matrix is never built.

use ndarray::{Array1, ArrayView1};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};
use super::bits;
use super::gate::DenseGate;
use super::operator::{check_length, LinearOperator, Operator, Storage};
use super::state::QReg;

/// A local operator embedded at chosen positions of an n-qubit register
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LazyGateSpec", into = "LazyGateSpec")]
pub struct LazyGate {
    operator: Operator,
    qbpos: Vec<usize>,
    specpos: Vec<usize>,
    qreg_size: usize,
    /// Basis indices grouped by spectator assignment, then ordered by target assignment
    bases: Vec<usize>,
}

/// What a lazy gate is built from; the permutation table is derived
#[derive(Serialize, Deserialize)]
struct LazyGateSpec {
    operator: Operator,
    targets: Vec<usize>,
    qreg_size: usize,
}

impl TryFrom<LazyGateSpec> for LazyGate {
    type Error = GateError;

    fn try_from(parts: LazyGateSpec) -> Result<Self> {
        LazyGate::new(parts.operator, parts.targets, parts.qreg_size)
    }
}

impl From<LazyGate> for LazyGateSpec {
    fn from(gate: LazyGate) -> Self {
        LazyGateSpec {
            operator: gate.operator,
            targets: gate.qbpos,
            qreg_size: gate.qreg_size,
        }
    }
}

impl LazyGate {
    /// Embed `operator` at `targets` inside a `qreg_size`-qubit register
    ///
    /// `targets[0]` is the most significant qubit of the operator's own basis.
    /// Positions count from the least significant bit of a basis index.
    pub fn new(operator: Operator, targets: Vec<usize>, qreg_size: usize) -> Result<Self> {
        let dim = bits::dimension(qreg_size)?;
        let m = targets.len();
        if m > qreg_size {
            return Err(GateError::TooManyTargets {
                targets: m,
                qreg_size,
            });
        }

        let mut seen = vec![false; qreg_size];
        for &position in &targets {
            if position >= qreg_size {
                return Err(GateError::TargetOutOfRange {
                    position,
                    qreg_size,
                });
            }
            if seen[position] {
                return Err(GateError::DuplicateTarget { position });
            }
            seen[position] = true;
        }

        operator.validate()?;
        let msize = 1 << m;
        if operator.dim() != msize {
            return Err(GateError::DimensionMismatch {
                qubits: m,
                expected: msize,
                actual: operator.dim(),
            });
        }

        let specpos: Vec<usize> = (0..qreg_size).filter(|q| !seen[*q]).collect();

        let mut bases: Vec<usize> = (0..dim).collect();
        bases.sort_by_key(|&b| bits::pack_bits(b, &specpos));
        for block in bases.chunks_mut(msize) {
            block.sort_by_key(|&b| bits::gather_bits(b, &targets));
        }

        tracing::debug!(
            qreg_size,
            targets = ?targets,
            blocks = dim / msize,
            "built lazy gate permutation table"
        );

        Ok(LazyGate {
            operator,
            qbpos: targets,
            specpos,
            qreg_size,
            bases,
        })
    }

    /// Embed a square matrix, storing it densely
    pub fn from_matrix(
        matrix: ndarray::Array2<Complex64>,
        targets: Vec<usize>,
        qreg_size: usize,
    ) -> Result<Self> {
        Self::new(Operator::from_matrix(matrix, Storage::Dense)?, targets, qreg_size)
    }

    /// Embed the action of a dense gate
    pub fn from_gate(gate: &DenseGate, targets: Vec<usize>, qreg_size: usize) -> Result<Self> {
        Self::new(gate.operator().clone(), targets, qreg_size)
    }

    pub fn qubit_count(&self) -> usize {
        self.qreg_size
    }

    /// Positions the local operator acts on, in operator order
    pub fn targets(&self) -> &[usize] {
        &self.qbpos
    }

    /// Untouched positions, ascending
    pub fn spectators(&self) -> &[usize] {
        &self.specpos
    }

    /// The basis index permutation table
    pub fn permutation(&self) -> &[usize] {
        &self.bases
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    fn block_size(&self) -> usize {
        1 << self.qbpos.len()
    }

    /// Apply to a register of exactly `qubit_count` qubits
    pub fn apply(&self, qreg: &QReg) -> Result<QReg> {
        if qreg.qubit_count() != self.qreg_size {
            return Err(GateError::SizeMismatch {
                expected: self.qreg_size,
                actual: qreg.qubit_count(),
            });
        }
        let new_state = self.apply_to_vector(qreg.state().view())?;
        QReg::from_state(self.qreg_size, new_state)
    }

    pub(crate) fn apply_to_vector(&self, state: ArrayView1<Complex64>) -> Result<Array1<Complex64>> {
        check_length(self.bases.len(), state.len())?;

        let mut new_state = Array1::zeros(state.len());
        for block in self.bases.chunks(self.block_size()) {
            let local: Array1<Complex64> = block.iter().map(|&i| state[i]).collect();
            let transformed = self.operator.apply_to_vector(local.view())?;
            for (&i, amp) in block.iter().zip(transformed.iter()) {
                new_state[i] = *amp;
            }
        }
        Ok(new_state)
    }

    /// The equivalent dense gate over the whole register
    pub fn to_dense(&self) -> Result<DenseGate> {
        let dim = self.bases.len();
        let local = self.operator.to_matrix();
        let mut matrix = ndarray::Array2::zeros((dim, dim));
        for block in self.bases.chunks(self.block_size()) {
            for (r, &row) in block.iter().enumerate() {
                for (c, &col) in block.iter().enumerate() {
                    matrix[[row, col]] = local[[r, c]];
                }
            }
        }
        DenseGate::new(matrix, self.qreg_size)
    }
}
