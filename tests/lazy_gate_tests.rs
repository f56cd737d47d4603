use ndarray::Array2;
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use qcomp::quantum::gate::constants::TOLERANCE;
use qcomp::quantum::gate_operations::stack;
use qcomp::prelude::*;

#[cfg(test)]
mod lazy_gate_tests {
    use super::*;

    fn random_matrix(rng: &mut StdRng, dim: usize) -> Array2<Complex64> {
        Array2::from_shape_fn((dim, dim), |_| {
            Complex64::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
        })
    }

    /// Brute-force embedding of `u` at `targets` inside an n-qubit register
    fn embed(u: &Array2<Complex64>, targets: &[usize], n: usize) -> Array2<Complex64> {
        let dim = 1usize << n;
        let mask: usize = targets.iter().map(|&q| 1usize << q).sum();
        let m = targets.len();
        let local = |b: usize| {
            targets
                .iter()
                .enumerate()
                .fold(0, |acc, (i, &q)| acc | (((b >> q) & 1) << (m - 1 - i)))
        };
        Array2::from_shape_fn((dim, dim), |(r, c)| {
            if r & !mask == c & !mask {
                u[[local(r), local(c)]]
            } else {
                Complex64::new(0.0, 0.0)
            }
        })
    }

    /// Every ordered selection of distinct positions from 0..n, including the empty one
    fn ordered_subsets(n: usize) -> Vec<Vec<usize>> {
        fn extend(prefix: &mut Vec<usize>, n: usize, out: &mut Vec<Vec<usize>>) {
            out.push(prefix.clone());
            for q in 0..n {
                if !prefix.contains(&q) {
                    prefix.push(q);
                    extend(prefix, n, out);
                    prefix.pop();
                }
            }
        }
        let mut out = Vec::new();
        extend(&mut Vec::new(), n, &mut out);
        out
    }

    fn assert_close(a: &Array2<Complex64>, b: &Array2<Complex64>, context: &str) {
        for ((i, j), x) in a.indexed_iter() {
            assert!(
                (x - b[[i, j]]).norm() < TOLERANCE,
                "{}: mismatch at [{},{}]: {} vs {}",
                context, i, j, x, b[[i, j]]
            );
        }
    }

    #[test]
    fn test_lazy_gate_matches_dense_embedding_exhaustively() {
        let mut rng = StdRng::seed_from_u64(11);
        for n in 1..=4 {
            for targets in ordered_subsets(n) {
                let u = random_matrix(&mut rng, 1 << targets.len());
                let gate = LazyGate::from_matrix(u.clone(), targets.clone(), n).unwrap();
                let expected = embed(&u, &targets, n);

                // every basis input, through the gather/scatter path
                let actual = Gate::Lazy(gate.clone()).to_matrix().unwrap();
                let context = format!("n={} targets={:?}", n, targets);
                assert_close(&actual, &expected, &context);

                // and through the materialized dense gate
                assert_close(&gate.to_dense().unwrap().matrix(), &expected, &context);
            }
        }
    }

    #[test]
    fn test_lazy_single_qubit_matches_identity_stack() {
        // position p is kron slot n-1-p
        let n = 4;
        let h = Gate::hadamard();
        for p in 0..n {
            let lazy = LazyGate::from_gate(&h.to_dense().unwrap(), vec![p], n).unwrap();
            let slots: Vec<Gate> = (0..n)
                .map(|slot| if slot == n - 1 - p { h.clone() } else { Gate::identity(1).unwrap() })
                .collect();
            let dense = stack(&slots).unwrap();
            assert_close(
                &lazy.to_dense().unwrap().matrix(),
                &dense.to_matrix().unwrap(),
                &format!("position {}", p),
            );
        }
    }

    #[test]
    fn test_lazy_cnot_on_non_adjacent_qubits() {
        // control at position 3, target at position 0, 4 qubits
        let cnot = Gate::cnot().to_dense().unwrap();
        let gate = LazyGate::from_gate(&cnot, vec![3, 0], 4).unwrap();

        let out = gate.apply(&QReg::from_label("1000").unwrap()).unwrap();
        assert_eq!(out, QReg::from_label("1001").unwrap());

        let out = gate.apply(&QReg::from_label("0110").unwrap()).unwrap();
        assert_eq!(out, QReg::from_label("0110").unwrap());

        let out = gate.apply(&QReg::from_label("1111").unwrap()).unwrap();
        assert_eq!(out, QReg::from_label("1110").unwrap());
    }

    #[test]
    fn test_lazy_apply_leaves_input_untouched() {
        let mut rng = StdRng::seed_from_u64(12);
        let reg = QReg::random(3, &mut rng).unwrap();
        let snapshot = reg.clone();
        let gate = LazyGate::from_matrix(random_matrix(&mut rng, 2), vec![2], 3).unwrap();

        let first = gate.apply(&reg).unwrap();
        let second = gate.apply(&reg).unwrap();
        assert_eq!(reg, snapshot);
        assert_eq!(first, second);
    }

    #[test]
    fn test_lazy_gate_over_full_register() {
        let mut rng = StdRng::seed_from_u64(13);
        let u = random_matrix(&mut rng, 8);
        let gate = LazyGate::from_matrix(u.clone(), vec![2, 1, 0], 3).unwrap();
        assert!(gate.spectators().is_empty());
        assert_eq!(gate.permutation(), &[0, 1, 2, 3, 4, 5, 6, 7]);

        let reg = QReg::random(3, &mut rng).unwrap();
        let dense = DenseGate::new(u, 3).unwrap();
        assert!(gate
            .apply(&reg)
            .unwrap()
            .approx_eq(&dense.apply(&reg).unwrap(), TOLERANCE));
    }

    #[test]
    fn test_multi_controlled_not_as_local_operator() {
        // Toffoli on positions (4, 2, 0) of a 5-qubit register
        let op = Operator::from(Structural::swap_last_pair(2).unwrap());
        let gate = LazyGate::new(op, vec![4, 2, 0], 5).unwrap();
        let reference = LazyGate::from_gate(&Gate::ccnot().to_dense().unwrap(), vec![4, 2, 0], 5)
            .unwrap();

        assert_eq!(
            Gate::Lazy(gate).to_matrix().unwrap(),
            Gate::Lazy(reference).to_matrix().unwrap()
        );
    }

    #[test]
    fn test_lazy_gate_serde_rebuilds_permutation() {
        let local = Array2::from_shape_fn((4, 4), |(i, j)| Complex64::new((i * 4 + j) as f64, 0.5));
        let gate = LazyGate::from_matrix(local, vec![3, 1], 5).unwrap();

        let json = serde_json::to_string(&gate).unwrap();
        assert!(!json.contains("bases"));

        let back: LazyGate = serde_json::from_str(&json).unwrap();
        assert_eq!(back.permutation(), gate.permutation());
        assert_eq!(back, gate);
    }

    #[test]
    fn test_lazy_gate_deserialization_is_validated() {
        let json = r#"{"operator":{"Structural":{"kind":"Reverse","qubits":1}},"targets":[7],"qreg_size":3}"#;
        assert!(serde_json::from_str::<LazyGate>(json).is_err());
    }
}
