// src/quantum/operator.rs
//! Linear operators over fixed-size complex vectors
//!
//! Gates store their action as an [`Operator`]: a dense array, a sparse map of
//! nonzero entries, or a closed-form structural permutation. Dense vs sparse
//! storage is picked when the operator is built.

use std::collections::BTreeMap;
use ndarray::{Array1, Array2, ArrayView1};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{GateError, Result};
use super::gate::constants::{SPARSE_DENSITY_THRESHOLD, SPARSE_MIN_DIMENSION};
use super::structural::Structural;

/// Something that maps a complex vector of fixed length to another of the same length
pub trait LinearOperator {
    /// Length of the vectors this operator acts on
    fn dim(&self) -> usize;

    /// Apply the operator, returning a new vector
    fn apply_to_vector(&self, vector: ArrayView1<Complex64>) -> Result<Array1<Complex64>>;

    /// Dense matrix form
    fn to_matrix(&self) -> Array2<Complex64>;

    /// Number of nonzero matrix entries
    fn nonzeros(&self) -> usize;
}

pub(crate) fn check_length(dim: usize, len: usize) -> Result<()> {
    if dim != len {
        return Err(GateError::StateLengthMismatch {
            expected: dim,
            actual: len,
        });
    }
    Ok(())
}

fn is_zero(value: &Complex64) -> bool {
    value.re == 0.0 && value.im == 0.0
}

/// How an operator built from a matrix should be stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Storage {
    /// Sparse when the matrix is large and mostly zero, dense otherwise
    #[default]
    Auto,
    Dense,
    Sparse,
}

impl Storage {
    fn prefers_sparse(self, dim: usize, nonzeros: usize) -> bool {
        match self {
            Storage::Dense => false,
            Storage::Sparse => true,
            Storage::Auto => {
                dim >= SPARSE_MIN_DIMENSION
                    && (nonzeros as f64) <= SPARSE_DENSITY_THRESHOLD * (dim * dim) as f64
            }
        }
    }
}

/// Square matrix holding only its nonzero entries, row by row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SparseMatrixRepr")]
pub struct SparseMatrix {
    dim: usize,
    rows: Vec<BTreeMap<usize, Complex64>>,
}

#[derive(Deserialize)]
struct SparseMatrixRepr {
    dim: usize,
    rows: Vec<BTreeMap<usize, Complex64>>,
}

impl TryFrom<SparseMatrixRepr> for SparseMatrix {
    type Error = GateError;

    fn try_from(repr: SparseMatrixRepr) -> Result<Self> {
        if repr.rows.len() != repr.dim {
            return Err(GateError::NonSquareMatrix {
                rows: repr.rows.len(),
                cols: repr.dim,
            });
        }
        let entries = repr
            .rows
            .into_iter()
            .enumerate()
            .flat_map(|(row, cols)| cols.into_iter().map(move |(col, value)| (row, col, value)));
        Self::from_entries(repr.dim, entries)
    }
}

impl SparseMatrix {
    /// Empty (all zero) matrix
    pub fn zeros(dim: usize) -> Self {
        SparseMatrix {
            dim,
            rows: vec![BTreeMap::new(); dim],
        }
    }

    /// Build from `(row, col, value)` triples; later triples overwrite earlier ones
    pub fn from_entries<I>(dim: usize, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (usize, usize, Complex64)>,
    {
        let mut matrix = Self::zeros(dim);
        for (row, col, value) in entries {
            if row >= dim || col >= dim {
                return Err(GateError::BasisIndexOutOfRange {
                    index: row.max(col),
                    qubits: super::bits::qubits_for_dimension(dim).unwrap_or(0),
                });
            }
            matrix.set(row, col, value);
        }
        Ok(matrix)
    }

    /// Copy the nonzero entries of a square dense matrix
    pub fn from_dense(matrix: &Array2<Complex64>) -> Self {
        let dim = matrix.nrows();
        let mut sparse = Self::zeros(dim);
        for ((row, col), value) in matrix.indexed_iter() {
            sparse.set(row, col, *value);
        }
        sparse
    }

    fn set(&mut self, row: usize, col: usize, value: Complex64) {
        if is_zero(&value) {
            self.rows[row].remove(&col);
        } else {
            self.rows[row].insert(col, value);
        }
    }

    /// Entry at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.rows
            .get(row)
            .and_then(|r| r.get(&col))
            .copied()
            .unwrap_or_default()
    }

    /// Nonzero entries as `(row, col, value)` in row-major order
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, Complex64)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(row, cols)| cols.iter().map(move |(&col, &value)| (row, col, value)))
    }

    /// Matrix product `self · rhs`
    pub fn dot(&self, rhs: &SparseMatrix) -> SparseMatrix {
        let mut result = Self::zeros(self.dim);
        for (i, row) in self.rows.iter().enumerate() {
            let mut acc: BTreeMap<usize, Complex64> = BTreeMap::new();
            for (&k, &a) in row {
                for (&j, &b) in &rhs.rows[k] {
                    *acc.entry(j).or_default() += a * b;
                }
            }
            acc.retain(|_, v| !is_zero(v));
            result.rows[i] = acc;
        }
        result
    }

    /// Kronecker product `self ⊗ rhs`
    pub fn kron(&self, rhs: &SparseMatrix) -> SparseMatrix {
        let n2 = rhs.dim;
        let mut result = Self::zeros(self.dim * n2);
        for (i, j, a) in self.entries() {
            for (k, l, b) in rhs.entries() {
                result.set(i * n2 + k, j * n2 + l, a * b);
            }
        }
        result
    }

    /// Conjugate transpose
    pub fn adjoint(&self) -> SparseMatrix {
        let mut result = Self::zeros(self.dim);
        for (row, col, value) in self.entries() {
            result.set(col, row, value.conj());
        }
        result
    }
}

impl LinearOperator for SparseMatrix {
    fn dim(&self) -> usize {
        self.dim
    }

    fn apply_to_vector(&self, vector: ArrayView1<Complex64>) -> Result<Array1<Complex64>> {
        check_length(self.dim, vector.len())?;
        Ok(self
            .rows
            .iter()
            .map(|cols| cols.iter().map(|(&col, &value)| value * vector[col]).sum::<Complex64>())
            .collect())
    }

    fn to_matrix(&self) -> Array2<Complex64> {
        let mut matrix = Array2::zeros((self.dim, self.dim));
        for (row, col, value) in self.entries() {
            matrix[[row, col]] = value;
        }
        matrix
    }

    fn nonzeros(&self) -> usize {
        self.rows.iter().map(BTreeMap::len).sum()
    }
}

fn dense_nonzeros(matrix: &Array2<Complex64>) -> usize {
    matrix.iter().filter(|v| !is_zero(v)).count()
}

/// Storage of a gate's action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operator {
    Dense(Array2<Complex64>),
    Sparse(SparseMatrix),
    Structural(Structural),
}

impl Operator {
    /// Build from a square matrix, storing it as `storage` asks
    pub fn from_matrix(matrix: Array2<Complex64>, storage: Storage) -> Result<Self> {
        let (rows, cols) = matrix.dim();
        if rows != cols {
            return Err(GateError::NonSquareMatrix { rows, cols });
        }

        Ok(Self::from_square(matrix, storage))
    }

    pub(crate) fn from_square(matrix: Array2<Complex64>, storage: Storage) -> Self {
        if storage.prefers_sparse(matrix.nrows(), dense_nonzeros(&matrix)) {
            Operator::Sparse(SparseMatrix::from_dense(&matrix))
        } else {
            Operator::Dense(matrix)
        }
    }

    /// Build from a sparse matrix, densifying it if `storage` asks for that
    pub fn from_sparse(matrix: SparseMatrix, storage: Storage) -> Self {
        if storage.prefers_sparse(matrix.dim(), matrix.nonzeros()) {
            Operator::Sparse(matrix)
        } else {
            Operator::Dense(matrix.to_matrix())
        }
    }

    /// Check that the operator is a square matrix
    ///
    /// Sparse and structural operators are square by construction; a dense
    /// array handed in directly may not be.
    pub fn validate(&self) -> Result<()> {
        if let Operator::Dense(m) = self {
            let (rows, cols) = m.dim();
            if rows != cols {
                return Err(GateError::NonSquareMatrix { rows, cols });
            }
        }
        Ok(())
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, Operator::Sparse(_))
    }

    fn to_sparse(&self) -> SparseMatrix {
        match self {
            Operator::Sparse(m) => m.clone(),
            other => SparseMatrix::from_dense(&other.to_matrix()),
        }
    }

    /// Matrix product `self · rhs`; both must have the same dimension
    pub fn product(&self, rhs: &Operator) -> Operator {
        match (self, rhs) {
            (Operator::Dense(a), Operator::Dense(b)) => Operator::Dense(a.dot(b)),
            (Operator::Dense(_), _) | (_, Operator::Dense(_)) => {
                Operator::Dense(self.to_matrix().dot(&rhs.to_matrix()))
            }
            _ => Operator::from_sparse(self.to_sparse().dot(&rhs.to_sparse()), Storage::Auto),
        }
    }

    /// Kronecker product `self ⊗ rhs`
    pub fn kron(&self, rhs: &Operator) -> Operator {
        match (self, rhs) {
            (Operator::Dense(a), Operator::Dense(b)) => Operator::Dense(kron_dense(a, b)),
            (Operator::Dense(_), _) | (_, Operator::Dense(_)) => {
                Operator::Dense(kron_dense(&self.to_matrix(), &rhs.to_matrix()))
            }
            _ => Operator::from_sparse(self.to_sparse().kron(&rhs.to_sparse()), Storage::Auto),
        }
    }

    /// Conjugate transpose
    pub fn adjoint(&self) -> Operator {
        match self {
            Operator::Dense(m) => Operator::Dense(m.t().mapv(|v| v.conj())),
            Operator::Sparse(m) => Operator::Sparse(m.adjoint()),
            // both structural permutations are involutions
            Operator::Structural(s) => Operator::Structural(*s),
        }
    }
}

impl LinearOperator for Operator {
    fn dim(&self) -> usize {
        match self {
            Operator::Dense(m) => m.nrows(),
            Operator::Sparse(m) => m.dim(),
            Operator::Structural(s) => s.dim(),
        }
    }

    fn apply_to_vector(&self, vector: ArrayView1<Complex64>) -> Result<Array1<Complex64>> {
        match self {
            Operator::Dense(m) => {
                check_length(m.ncols(), vector.len())?;
                Ok(m.dot(&vector))
            }
            Operator::Sparse(m) => m.apply_to_vector(vector),
            Operator::Structural(s) => s.apply_to_vector(vector),
        }
    }

    fn to_matrix(&self) -> Array2<Complex64> {
        match self {
            Operator::Dense(m) => m.clone(),
            Operator::Sparse(m) => m.to_matrix(),
            Operator::Structural(s) => s.to_matrix(),
        }
    }

    fn nonzeros(&self) -> usize {
        match self {
            Operator::Dense(m) => dense_nonzeros(m),
            Operator::Sparse(m) => m.nonzeros(),
            Operator::Structural(s) => s.nonzeros(),
        }
    }
}

impl From<Structural> for Operator {
    fn from(s: Structural) -> Self {
        Operator::Structural(s)
    }
}

impl From<SparseMatrix> for Operator {
    fn from(m: SparseMatrix) -> Self {
        Operator::Sparse(m)
    }
}

/// Kronecker product of two dense matrices
pub fn kron_dense(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (n1, m1) = a.dim();
    let (n2, m2) = b.dim();

    let mut result = Array2::zeros((n1 * n2, m1 * m2));
    for i in 0..n1 {
        for j in 0..m1 {
            let aij = a[[i, j]];
            if is_zero(&aij) {
                continue;
            }
            for k in 0..n2 {
                for l in 0..m2 {
                    result[[i * n2 + k, j * m2 + l]] = aij * b[[k, l]];
                }
            }
        }
    }
    result
}
