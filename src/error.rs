//! Error types for gate construction and application

use thiserror::Error;

/// Errors raised while building or applying gates
///
/// Every variant is a precondition violation detected synchronously, either
/// when a gate or register is constructed or when a gate is applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// Register (or second gate) size does not match the gate's qubit count
    #[error("gate acts on {expected} qubits, but got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Matrix is not square
    #[error("only square matrices allowed, got {rows}x{cols}")]
    NonSquareMatrix { rows: usize, cols: usize },

    /// Matrix dimension disagrees with the declared qubit count
    #[error("matrix dimension {actual} does not match {qubits} qubits (expected {expected})")]
    DimensionMismatch {
        qubits: usize,
        expected: usize,
        actual: usize,
    },

    /// State vector length is not 2^n
    #[error("state vector length mismatch: expected {expected}, got {actual}")]
    StateLengthMismatch { expected: usize, actual: usize },

    /// Lazy gate target outside the register
    #[error("target position {position} out of range for {qreg_size}-qubit register")]
    TargetOutOfRange { position: usize, qreg_size: usize },

    /// Lazy gate target listed twice
    #[error("target position {position} given more than once")]
    DuplicateTarget { position: usize },

    /// More targets than qubits in the register
    #[error("{targets} target positions do not fit in a {qreg_size}-qubit register")]
    TooManyTargets { targets: usize, qreg_size: usize },

    /// Basis indices of this register would not fit in `usize`
    #[error("{qubits}-qubit register is too large to index")]
    RegisterTooLarge { qubits: usize },

    /// Oracle input strings of different lengths
    #[error("oracle input {input:?} has length {actual}, expected {expected}")]
    InconsistentOracleInput {
        expected: usize,
        actual: usize,
        input: String,
    },

    /// A string that should be a bit string contains something other than 0/1
    #[error("{input:?} is not a bit string")]
    InvalidBitString { input: String },

    /// Empty oracle definition without an explicit input size
    #[error("oracle input size cannot be inferred from an empty definition")]
    MissingOracleSize,

    /// Basis index outside the register's state space
    #[error("basis index {index} is out of range for {qubits}-qubit register")]
    BasisIndexOutOfRange { index: usize, qubits: usize },

    /// Sequence or stack of no gates
    #[error("cannot compose an empty list of gates")]
    EmptyComposition,

    /// Gate repeated zero times
    #[error("gate repetition count must be at least 1, got {count}")]
    InvalidRepetition { count: u32 },
}

/// Result type for gate operations
pub type Result<T> = std::result::Result<T, GateError>;
