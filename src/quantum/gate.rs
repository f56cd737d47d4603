// src/quantum/gate.rs
//! Quantum gates and their composition
//!
//! A [`Gate`] is one of a closed set of variants sharing a single capability:
//! `apply` a register and get a new register back. Gates combine into new
//! gates through sequential composition, parallel (tensor) composition and
//! repetition. Two dense gates collapse into one dense gate; any other pair is
//! kept as a composite that applies its parts in turn.

use ndarray::{array, s, Array1, Array2, ArrayView1};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};
use super::bits;
use super::lazy::LazyGate;
use super::operator::{LinearOperator, Operator, Storage};
use super::state::QReg;
use super::structural::Structural;

/// Common constants used by gates
pub mod constants {
    /// 1/sqrt(2)
    pub const FRAC_1_SQRT_2: f64 = 0.7071067811865475;

    /// Default tolerance for approximate comparisons
    pub const TOLERANCE: f64 = 1e-10;

    /// Smallest dimension for which automatic storage considers a sparse map
    pub const SPARSE_MIN_DIMENSION: usize = 8;

    /// Largest fraction of nonzero entries for which automatic storage picks a sparse map
    pub const SPARSE_DENSITY_THRESHOLD: f64 = 0.25;
}

fn check_register(expected: usize, qreg: &QReg) -> Result<()> {
    if qreg.qubit_count() != expected {
        return Err(GateError::SizeMismatch {
            expected,
            actual: qreg.qubit_count(),
        });
    }
    Ok(())
}

/// A gate given by its full 2^k × 2^k matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DenseGateRepr")]
pub struct DenseGate {
    qubit_count: usize,
    operator: Operator,
}

#[derive(Deserialize)]
struct DenseGateRepr {
    qubit_count: usize,
    operator: Operator,
}

impl TryFrom<DenseGateRepr> for DenseGate {
    type Error = GateError;

    fn try_from(repr: DenseGateRepr) -> Result<Self> {
        DenseGate::from_operator(repr.operator, repr.qubit_count)
    }
}

impl DenseGate {
    /// Create a gate from a square matrix of dimension 2^qubit_count
    pub fn new(matrix: Array2<Complex64>, qubit_count: usize) -> Result<Self> {
        Self::with_storage(matrix, qubit_count, Storage::Auto)
    }

    /// Create a gate, choosing how its matrix is stored
    pub fn with_storage(
        matrix: Array2<Complex64>,
        qubit_count: usize,
        storage: Storage,
    ) -> Result<Self> {
        Self::from_operator(Operator::from_matrix(matrix, storage)?, qubit_count)
    }

    /// Create a gate from an already built operator
    pub fn from_operator(operator: Operator, qubit_count: usize) -> Result<Self> {
        operator.validate()?;
        let expected = bits::dimension(qubit_count)?;
        if operator.dim() != expected {
            return Err(GateError::DimensionMismatch {
                qubits: qubit_count,
                expected,
                actual: operator.dim(),
            });
        }
        Ok(DenseGate {
            qubit_count,
            operator,
        })
    }

    // matrix known to be square of dimension 2^qubit_count
    fn fixed(matrix: Array2<Complex64>, qubit_count: usize) -> Self {
        DenseGate {
            qubit_count,
            operator: Operator::from_square(matrix, Storage::Auto),
        }
    }

    pub fn qubit_count(&self) -> usize {
        self.qubit_count
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// The full matrix, whatever the storage
    pub fn matrix(&self) -> Array2<Complex64> {
        self.operator.to_matrix()
    }

    /// Apply to a register of exactly `qubit_count` qubits
    pub fn apply(&self, qreg: &QReg) -> Result<QReg> {
        check_register(self.qubit_count, qreg)?;
        let new_state = self.operator.apply_to_vector(qreg.state().view())?;
        QReg::from_state(self.qubit_count, new_state)
    }

    /// `self` followed by `next`: the matrix `next · self`
    pub fn then(&self, next: &DenseGate) -> Result<DenseGate> {
        if self.qubit_count != next.qubit_count {
            return Err(GateError::SizeMismatch {
                expected: self.qubit_count,
                actual: next.qubit_count,
            });
        }
        Ok(DenseGate {
            qubit_count: self.qubit_count,
            operator: next.operator.product(&self.operator),
        })
    }

    /// Kronecker product `self ⊗ other` over `k1 + k2` qubits
    pub fn tensor(&self, other: &DenseGate) -> Result<DenseGate> {
        let qubit_count = self.qubit_count + other.qubit_count;
        bits::dimension(qubit_count)?;
        Ok(DenseGate {
            qubit_count,
            operator: self.operator.kron(&other.operator),
        })
    }

    /// `self` applied `count` times in a row
    pub fn repeat(&self, count: u32) -> Result<DenseGate> {
        match count {
            0 => Err(GateError::InvalidRepetition { count }),
            1 => Ok(self.clone()),
            _ => (1..count).try_fold(self.clone(), |acc, _| acc.then(self)),
        }
    }

    /// Conjugate transpose
    pub fn adjoint(&self) -> DenseGate {
        DenseGate {
            qubit_count: self.qubit_count,
            operator: self.operator.adjoint(),
        }
    }

    /// Whether `U†U` is the identity within `tolerance`
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        let m = self.matrix();
        let product = m.t().mapv(|v| v.conj()).dot(&m);
        product.indexed_iter().all(|((i, j), v)| {
            let expected = if i == j { 1.0 } else { 0.0 };
            (v - Complex64::new(expected, 0.0)).norm() < tolerance
        })
    }
}

/// Gates applied one after another, all over the same qubit count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SequenceGateRepr")]
pub struct SequenceGate {
    qubit_count: usize,
    gates: Vec<Gate>,
}

#[derive(Deserialize)]
struct SequenceGateRepr {
    qubit_count: usize,
    gates: Vec<Gate>,
}

impl TryFrom<SequenceGateRepr> for SequenceGate {
    type Error = GateError;

    fn try_from(repr: SequenceGateRepr) -> Result<Self> {
        if let Some(bad) = repr.gates.iter().find(|g| g.qubit_count() != repr.qubit_count) {
            return Err(GateError::SizeMismatch {
                expected: repr.qubit_count,
                actual: bad.qubit_count(),
            });
        }
        Ok(SequenceGate {
            qubit_count: repr.qubit_count,
            gates: repr.gates,
        })
    }
}

impl SequenceGate {
    /// The gates in application order
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }
}

/// Two gates side by side: `high` on the most significant qubits, `low` on the rest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensorGate {
    high: Box<Gate>,
    low: Box<Gate>,
}

impl TensorGate {
    pub fn high(&self) -> &Gate {
        &self.high
    }

    pub fn low(&self) -> &Gate {
        &self.low
    }

    fn qubit_count(&self) -> usize {
        self.high.qubit_count() + self.low.qubit_count()
    }

    fn apply_to_vector(&self, vector: ArrayView1<Complex64>) -> Result<Array1<Complex64>> {
        let low_dim = bits::dimension(self.low.qubit_count())?;
        let high_dim = bits::dimension(self.high.qubit_count())?;
        super::operator::check_length(high_dim * low_dim, vector.len())?;

        let mut out = vector.to_owned();

        // low gate on each contiguous block
        for hi in 0..high_dim {
            let (start, end) = (hi * low_dim, (hi + 1) * low_dim);
            let block = self.low.apply_to_vector(out.slice(s![start..end]))?;
            out.slice_mut(s![start..end]).assign(&block);
        }

        // high gate on each strided column
        let step = low_dim as isize;
        for lo in 0..low_dim {
            let column = self.high.apply_to_vector(out.slice(s![lo..;step]))?;
            out.slice_mut(s![lo..;step]).assign(&column);
        }

        Ok(out)
    }
}

/// A quantum gate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Gate {
    /// Full matrix over the whole register
    Dense(DenseGate),
    /// Small operator on selected positions of a larger register
    Lazy(LazyGate),
    /// Fixed permutation with no stored matrix
    Permutation(Structural),
    /// Gates applied in order
    Sequence(SequenceGate),
    /// Gates side by side
    Tensor(TensorGate),
}

impl Gate {
    /// Number of qubits the gate acts on
    pub fn qubit_count(&self) -> usize {
        match self {
            Gate::Dense(g) => g.qubit_count(),
            Gate::Lazy(g) => g.qubit_count(),
            Gate::Permutation(p) => p.qubit_count(),
            Gate::Sequence(g) => g.qubit_count,
            Gate::Tensor(g) => g.qubit_count(),
        }
    }

    /// Apply the gate, producing a new register
    pub fn apply(&self, qreg: &QReg) -> Result<QReg> {
        check_register(self.qubit_count(), qreg)?;
        tracing::trace!(qubits = qreg.qubit_count(), gate = self.kind(), "applying gate");
        let new_state = self.apply_to_vector(qreg.state().view())?;
        QReg::from_state(qreg.qubit_count(), new_state)
    }

    /// Apply the gate to a raw amplitude vector of length 2^qubit_count
    pub fn apply_to_vector(&self, vector: ArrayView1<Complex64>) -> Result<Array1<Complex64>> {
        match self {
            Gate::Dense(g) => g.operator.apply_to_vector(vector),
            Gate::Lazy(g) => g.apply_to_vector(vector),
            Gate::Permutation(p) => p.apply_to_vector(vector),
            Gate::Sequence(seq) => {
                let mut state = vector.to_owned();
                for gate in &seq.gates {
                    state = gate.apply_to_vector(state.view())?;
                }
                Ok(state)
            }
            Gate::Tensor(t) => t.apply_to_vector(vector),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Gate::Dense(_) => "dense",
            Gate::Lazy(_) => "lazy",
            Gate::Permutation(_) => "permutation",
            Gate::Sequence(_) => "sequence",
            Gate::Tensor(_) => "tensor",
        }
    }

    /// `self` followed by `next`
    ///
    /// Two dense gates multiply into one dense gate; anything else becomes a
    /// sequence.
    pub fn compose_sequential(&self, next: &Gate) -> Result<Gate> {
        if self.qubit_count() != next.qubit_count() {
            return Err(GateError::SizeMismatch {
                expected: self.qubit_count(),
                actual: next.qubit_count(),
            });
        }

        if let (Gate::Dense(a), Gate::Dense(b)) = (self, next) {
            return a.then(b).map(Gate::Dense);
        }

        let mut gates = Vec::new();
        for gate in [self, next] {
            match gate {
                Gate::Sequence(seq) => gates.extend(seq.gates.iter().cloned()),
                other => gates.push(other.clone()),
            }
        }
        tracing::debug!(
            qubits = self.qubit_count(),
            steps = gates.len(),
            "composed gate sequence"
        );
        Ok(Gate::Sequence(SequenceGate {
            qubit_count: self.qubit_count(),
            gates,
        }))
    }

    /// `self ⊗ other`: `self` on the high qubits, `other` on the low qubits
    ///
    /// Two dense gates give their Kronecker product; anything else is applied
    /// block by block without building the full matrix.
    pub fn compose_parallel(&self, other: &Gate) -> Result<Gate> {
        if let (Gate::Dense(a), Gate::Dense(b)) = (self, other) {
            return a.tensor(b).map(Gate::Dense);
        }

        bits::dimension(self.qubit_count() + other.qubit_count())?;
        tracing::debug!(
            high = self.qubit_count(),
            low = other.qubit_count(),
            "composed tensor gate"
        );
        Ok(Gate::Tensor(TensorGate {
            high: Box::new(self.clone()),
            low: Box::new(other.clone()),
        }))
    }

    /// `self` applied `count` times
    ///
    /// Dense gates multiply out; anything else becomes one flat sequence.
    pub fn repeat(&self, count: u32) -> Result<Gate> {
        let steps = match (count, self) {
            (0, _) => return Err(GateError::InvalidRepetition { count }),
            (1, _) => return Ok(self.clone()),
            (_, Gate::Dense(g)) => return g.repeat(count).map(Gate::Dense),
            (_, Gate::Sequence(seq)) => seq.gates.as_slice(),
            (_, other) => std::slice::from_ref(other),
        };

        let gates: Vec<Gate> = steps
            .iter()
            .cycle()
            .take(steps.len() * count as usize)
            .cloned()
            .collect();
        tracing::debug!(
            qubits = self.qubit_count(),
            count,
            steps = gates.len(),
            "repeated gate as sequence"
        );
        Ok(Gate::Sequence(SequenceGate {
            qubit_count: self.qubit_count(),
            gates,
        }))
    }

    /// Full 2^n × 2^n matrix of the gate
    ///
    /// Builds the matrix column by column from basis vectors, so it costs
    /// O(4^n) memory. Meant for small gates and for checking lazy ones.
    pub fn to_matrix(&self) -> Result<Array2<Complex64>> {
        match self {
            Gate::Dense(g) => Ok(g.matrix()),
            Gate::Permutation(p) => Ok(p.to_matrix()),
            _ => {
                let dim = bits::dimension(self.qubit_count())?;
                let mut matrix = Array2::zeros((dim, dim));
                for col in 0..dim {
                    let mut basis = Array1::zeros(dim);
                    basis[col] = Complex64::new(1.0, 0.0);
                    let image = self.apply_to_vector(basis.view())?;
                    matrix.column_mut(col).assign(&image);
                }
                Ok(matrix)
            }
        }
    }

    /// Collapse into a single dense gate
    pub fn to_dense(&self) -> Result<DenseGate> {
        match self {
            Gate::Dense(g) => Ok(g.clone()),
            other => DenseGate::new(other.to_matrix()?, other.qubit_count()),
        }
    }

    /// Identity on `qubit_count` qubits
    pub fn identity(qubit_count: usize) -> Result<Gate> {
        let dim = bits::dimension(qubit_count)?;
        let diagonal = Array1::from_elem(dim, Complex64::new(1.0, 0.0));
        Ok(Gate::Dense(DenseGate::fixed(Array2::from_diag(&diagonal), qubit_count)))
    }

    /// Hadamard gate
    pub fn hadamard() -> Gate {
        let h = Complex64::new(constants::FRAC_1_SQRT_2, 0.0);
        Gate::Dense(DenseGate::fixed(array![[h, h], [h, -h]], 1))
    }

    /// Pauli-X (NOT) gate
    pub fn not() -> Gate {
        Gate::Dense(DenseGate::fixed(permutation_matrix(&[1, 0]), 1))
    }

    /// Controlled NOT, control on the first (high) qubit
    pub fn cnot() -> Gate {
        Gate::Dense(DenseGate::fixed(permutation_matrix(&[0, 1, 3, 2]), 2))
    }

    /// Controlled NOT, control on the second (low) qubit
    pub fn cnot_reversed() -> Gate {
        Gate::Dense(DenseGate::fixed(permutation_matrix(&[0, 3, 2, 1]), 2))
    }

    /// Toffoli gate: NOT on the last qubit when both others are 1
    pub fn ccnot() -> Gate {
        Gate::Dense(DenseGate::fixed(
            permutation_matrix(&[0, 1, 2, 3, 4, 5, 7, 6]),
            3,
        ))
    }

    /// SWAP gate
    pub fn swap() -> Gate {
        Gate::Dense(DenseGate::fixed(permutation_matrix(&[0, 2, 1, 3]), 2))
    }

    /// Phase shift on a single qubit: |1> picks up e^{i phi}
    pub fn phase_shift(phi: f64) -> Gate {
        let zero = Complex64::new(0.0, 0.0);
        let one = Complex64::new(1.0, 0.0);
        Gate::Dense(DenseGate::fixed(
            array![[one, zero], [zero, Complex64::from_polar(1.0, phi)]],
            1,
        ))
    }

    /// Multi-controlled NOT as a closed-form permutation
    pub fn multi_controlled_not(controls: usize) -> Result<Gate> {
        Structural::swap_last_pair(controls).map(Gate::Permutation)
    }

    /// NOT on every qubit as a closed-form permutation
    pub fn reverse(qubit_count: usize) -> Result<Gate> {
        Structural::reverse(qubit_count).map(Gate::Permutation)
    }
}

/// Matrix with a 1 at `[image[col], col]` for each column
fn permutation_matrix(image: &[usize]) -> Array2<Complex64> {
    let dim = image.len();
    let mut matrix = Array2::zeros((dim, dim));
    for (col, &row) in image.iter().enumerate() {
        matrix[[row, col]] = Complex64::new(1.0, 0.0);
    }
    matrix
}

impl From<DenseGate> for Gate {
    fn from(g: DenseGate) -> Self {
        Gate::Dense(g)
    }
}

impl From<LazyGate> for Gate {
    fn from(g: LazyGate) -> Self {
        Gate::Lazy(g)
    }
}

impl From<Structural> for Gate {
    fn from(s: Structural) -> Self {
        Gate::Permutation(s)
    }
}
