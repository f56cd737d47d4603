// src/quantum/oracle.rs
//! Oracle gates from boolean predicates
//!
//! A predicate over L-bit inputs is given as the list of inputs it accepts.
//! The oracle acts on L+1 qubits: the input bits (high) and one output bit
//! (lowest). It flips the output bit exactly when the input is accepted,
//! which makes it a permutation and hence unitary.

use std::collections::BTreeSet;
use num_complex::Complex64;

use crate::error::{GateError, Result};
use super::bits;
use super::gate::DenseGate;
use super::operator::{Operator, SparseMatrix, Storage};

/// Build the oracle gate for the predicate accepting exactly `fdef`
///
/// `in_size` is the input width. It may be omitted when `fdef` is non-empty, in
/// which case it is taken from the first entry; every entry must then have
/// that same length.
pub fn oracle_gate<S: AsRef<str>>(fdef: &[S], in_size: Option<usize>) -> Result<DenseGate> {
    let in_size = match (in_size, fdef.first()) {
        (Some(n), _) => n,
        (None, Some(first)) => first.as_ref().len(),
        (None, None) => return Err(GateError::MissingOracleSize),
    };

    let mut accepted = BTreeSet::new();
    for input in fdef {
        let input = input.as_ref();
        if input.len() != in_size {
            return Err(GateError::InconsistentOracleInput {
                expected: in_size,
                actual: input.len(),
                input: input.to_string(),
            });
        }
        accepted.insert(bits::parse_label(input)?);
    }

    let reg_size = in_size + 1;
    let dim = bits::dimension(reg_size)?;
    let one = Complex64::new(1.0, 0.0);

    // prefix x owns columns 2x (output 0) and 2x+1 (output 1)
    let entries = (0..dim / 2).flat_map(|x| {
        let (zero_col, one_col) = (2 * x, 2 * x + 1);
        if accepted.contains(&x) {
            [(one_col, zero_col, one), (zero_col, one_col, one)]
        } else {
            [(zero_col, zero_col, one), (one_col, one_col, one)]
        }
    });
    let matrix = SparseMatrix::from_entries(dim, entries)?;

    tracing::debug!(
        in_size,
        accepted = accepted.len(),
        "built oracle gate"
    );

    DenseGate::from_operator(Operator::from_sparse(matrix, Storage::Auto), reg_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantum::operator::LinearOperator;

    #[test]
    fn test_always_false_oracle_is_identity() {
        let empty: [&str; 0] = [];
        let gate = oracle_gate(&empty, Some(2)).unwrap();
        assert_eq!(gate.qubit_count(), 3);

        let m = gate.matrix();
        for ((i, j), v) in m.indexed_iter() {
            let expected = if i == j { 1.0 } else { 0.0 };
            assert_eq!(*v, Complex64::new(expected, 0.0));
        }
    }

    #[test]
    fn test_always_true_oracle_flips_output() {
        let gate = oracle_gate(&["0", "1"], None).unwrap();
        let m = gate.matrix();
        for col in 0..4usize {
            assert_eq!(m[[col ^ 1, col]], Complex64::new(1.0, 0.0));
        }
    }

    #[test]
    fn test_oracle_storage_is_sparse_for_wide_inputs() {
        let gate = oracle_gate(&["101"], None).unwrap();
        assert!(gate.operator().is_sparse());
        assert_eq!(gate.operator().nonzeros(), 16);
    }

    #[test]
    fn test_invalid_definitions() {
        assert_eq!(
            oracle_gate(&["00", "1"], None),
            Err(GateError::InconsistentOracleInput {
                expected: 2,
                actual: 1,
                input: "1".to_string()
            })
        );
        assert_eq!(
            oracle_gate(&["00"], Some(3)),
            Err(GateError::InconsistentOracleInput {
                expected: 3,
                actual: 2,
                input: "00".to_string()
            })
        );
        let empty: [String; 0] = [];
        assert_eq!(oracle_gate(&empty, None), Err(GateError::MissingOracleSize));
        assert_eq!(
            oracle_gate(&["0a"], None),
            Err(GateError::InvalidBitString { input: "0a".to_string() })
        );
    }
}
