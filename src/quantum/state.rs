// src/quantum/state.rs
//! Quantum register representation
//!
//! A register holds the complex amplitudes of an n-qubit state in basis index
//! order. Gates never modify a register; they produce a new one.

use std::fmt::{self, Display};
use ndarray::Array1;
use num_complex::Complex64;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};
use super::bits;

/// A single qubit `alpha|0> + beta|1>`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Qubit {
    pub alpha: Complex64,
    pub beta: Complex64,
}

/// The |0> qubit
pub const ZERO: Qubit = Qubit {
    alpha: Complex64::new(1.0, 0.0),
    beta: Complex64::new(0.0, 0.0),
};

/// The |1> qubit
pub const ONE: Qubit = Qubit {
    alpha: Complex64::new(0.0, 0.0),
    beta: Complex64::new(1.0, 0.0),
};

impl Qubit {
    pub fn new(alpha: Complex64, beta: Complex64) -> Self {
        Qubit { alpha, beta }
    }
}

/// An n-qubit register: a qubit count and 2^n amplitudes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QReg {
    qubit_count: usize,
    state: Array1<Complex64>,
}

impl QReg {
    /// The all-zero register |0...0>
    pub fn new(qubit_count: usize) -> Result<Self> {
        Self::basis(qubit_count, 0)
    }

    /// Create a register from an explicit state vector
    ///
    /// The vector must have exactly 2^qubit_count entries. Normalization is
    /// not checked.
    pub fn from_state(qubit_count: usize, state: Array1<Complex64>) -> Result<Self> {
        let expected = bits::dimension(qubit_count)?;
        if state.len() != expected {
            return Err(GateError::StateLengthMismatch {
                expected,
                actual: state.len(),
            });
        }
        Ok(QReg { qubit_count, state })
    }

    /// The computational basis state |index>
    pub fn basis(qubit_count: usize, index: usize) -> Result<Self> {
        let dim = bits::dimension(qubit_count)?;
        if index >= dim {
            return Err(GateError::BasisIndexOutOfRange {
                index,
                qubits: qubit_count,
            });
        }

        let mut state = Array1::zeros(dim);
        state[index] = Complex64::new(1.0, 0.0);
        Ok(QReg { qubit_count, state })
    }

    /// The basis state named by a label such as `"011"`
    pub fn from_label(label: &str) -> Result<Self> {
        let index = bits::parse_label(label)?;
        Self::basis(label.len(), index)
    }

    /// Tensor product of single qubits, the first qubit being the leftmost label character
    pub fn from_qubits(qubits: &[Qubit]) -> Result<Self> {
        bits::dimension(qubits.len())?;

        let mut state = Array1::from_elem(1, Complex64::new(1.0, 0.0));
        for q in qubits {
            let mut next = Array1::zeros(state.len() * 2);
            for (i, amp) in state.iter().enumerate() {
                next[2 * i] = amp * q.alpha;
                next[2 * i + 1] = amp * q.beta;
            }
            state = next;
        }

        Ok(QReg {
            qubit_count: qubits.len(),
            state,
        })
    }

    /// A random normalized state
    pub fn random<R: Rng + ?Sized>(qubit_count: usize, rng: &mut R) -> Result<Self> {
        let dim = bits::dimension(qubit_count)?;
        let mut state: Array1<Complex64> = (0..dim)
            .map(|_| Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)))
            .collect();

        let norm = state.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
        if norm > 0.0 {
            state.mapv_inplace(|a| a / norm);
        } else {
            state[0] = Complex64::new(1.0, 0.0);
        }

        Ok(QReg { qubit_count, state })
    }

    /// Number of qubits
    pub fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    /// Dimension of the state space (2^n)
    pub fn dimension(&self) -> usize {
        self.state.len()
    }

    /// The amplitudes in basis index order
    pub fn state(&self) -> &Array1<Complex64> {
        &self.state
    }

    /// Consume the register, returning its amplitudes
    pub fn into_state(self) -> Array1<Complex64> {
        self.state
    }

    /// Amplitude of the basis state named by `label`
    pub fn amplitude(&self, label: &str) -> Result<Complex64> {
        if label.len() != self.qubit_count {
            return Err(GateError::SizeMismatch {
                expected: self.qubit_count,
                actual: label.len(),
            });
        }
        Ok(self.state[bits::parse_label(label)?])
    }

    /// Basis labels in index order
    pub fn bases(&self) -> Vec<String> {
        (0..self.dimension())
            .map(|i| bits::basis_label(i, self.qubit_count))
            .collect()
    }

    /// Squared norm of the state
    pub fn norm_sqr(&self) -> f64 {
        self.state.iter().map(|a| a.norm_sqr()).sum()
    }

    /// Whether two registers agree amplitude by amplitude within `tolerance`
    pub fn approx_eq(&self, other: &QReg, tolerance: f64) -> bool {
        self.qubit_count == other.qubit_count
            && self
                .state
                .iter()
                .zip(other.state.iter())
                .all(|(a, b)| (a - b).norm() < tolerance)
    }
}

impl Display for QReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, amp) in self.state.iter().enumerate() {
            let sign = if amp.im < 0.0 { '-' } else { '+' };
            let amp_str = format!("{:.2}{}{:.2}j", amp.re, sign, amp.im.abs());
            writeln!(
                f,
                "{:<16} |{}>",
                amp_str,
                bits::basis_label(i, self.qubit_count)
            )?;
        }
        Ok(())
    }
}
