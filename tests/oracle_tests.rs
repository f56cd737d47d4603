use num_complex::Complex64;

use qcomp::quantum::gate::constants::{FRAC_1_SQRT_2, TOLERANCE};
use qcomp::prelude::*;

#[cfg(test)]
mod oracle_tests {
    use super::*;

    fn apply_label(gate: &DenseGate, label: &str) -> QReg {
        gate.apply(&QReg::from_label(label).unwrap()).unwrap()
    }

    #[test]
    fn test_oracle_flips_output_for_accepted_inputs() {
        let oracle = oracle_gate(&["00", "10"], None).unwrap();
        assert_eq!(oracle.qubit_count(), 3);

        // accepted prefix 00
        assert_eq!(apply_label(&oracle, "000"), QReg::from_label("001").unwrap());
        assert_eq!(apply_label(&oracle, "001"), QReg::from_label("000").unwrap());
        // accepted prefix 10
        assert_eq!(apply_label(&oracle, "100"), QReg::from_label("101").unwrap());
        assert_eq!(apply_label(&oracle, "101"), QReg::from_label("100").unwrap());
        // rejected prefixes are left alone
        for label in ["010", "011", "110", "111"] {
            assert_eq!(apply_label(&oracle, label), QReg::from_label(label).unwrap());
        }
    }

    #[test]
    fn test_oracle_is_a_permutation() {
        let oracle = oracle_gate(&["001", "111", "010"], None).unwrap();
        let m = oracle.matrix();
        for i in 0..16 {
            let row_sum: Complex64 = m.row(i).iter().sum();
            let col_sum: Complex64 = m.column(i).iter().sum();
            assert_eq!(row_sum, Complex64::new(1.0, 0.0));
            assert_eq!(col_sum, Complex64::new(1.0, 0.0));
        }
        assert!(oracle.is_unitary(TOLERANCE));
    }

    #[test]
    fn test_oracle_is_self_inverse() {
        let oracle = oracle_gate(&["01", "11"], None).unwrap();
        let twice = oracle.repeat(2).unwrap();
        let id = Gate::identity(3).unwrap().to_dense().unwrap();
        assert_eq!(twice.matrix(), id.matrix());
    }

    #[test]
    fn test_phase_kickback() {
        // output qubit in (|0> - |1>)/sqrt(2): accepted inputs pick up a sign
        let minus = Qubit::new(
            Complex64::new(FRAC_1_SQRT_2, 0.0),
            Complex64::new(-FRAC_1_SQRT_2, 0.0),
        );
        let oracle = oracle_gate(&["1"], None).unwrap();

        let accepted = QReg::from_qubits(&[ONE, minus]).unwrap();
        let out = oracle.apply(&accepted).unwrap();
        let expected: Vec<Complex64> = accepted.state().iter().map(|a| -a).collect();
        for (a, b) in out.state().iter().zip(expected.iter()) {
            assert!((a - b).norm() < TOLERANCE);
        }

        let rejected = QReg::from_qubits(&[ZERO, minus]).unwrap();
        assert!(oracle.apply(&rejected).unwrap().approx_eq(&rejected, TOLERANCE));
    }

    #[test]
    fn test_oracle_composes_with_lazy_gates() {
        // oracle embedded on positions (3, 2, 0) of a 4-qubit register
        let oracle = oracle_gate(&["11"], None).unwrap();
        let lazy = LazyGate::from_gate(&oracle, vec![3, 2, 0], 4).unwrap();

        let out = lazy.apply(&QReg::from_label("1100").unwrap()).unwrap();
        assert_eq!(out, QReg::from_label("1101").unwrap());

        let out = lazy.apply(&QReg::from_label("1010").unwrap()).unwrap();
        assert_eq!(out, QReg::from_label("1010").unwrap());
    }

    #[test]
    fn test_explicit_size_for_empty_definition() {
        let empty: Vec<String> = Vec::new();
        let oracle = oracle_gate(&empty, Some(1)).unwrap();
        assert_eq!(oracle.qubit_count(), 2);
        assert_eq!(apply_label(&oracle, "11"), QReg::from_label("11").unwrap());
    }

    #[test]
    fn test_inconsistent_lengths_rejected() {
        assert!(matches!(
            oracle_gate(&["010", "01"], None),
            Err(GateError::InconsistentOracleInput { expected: 3, actual: 2, .. })
        ));
    }
}
