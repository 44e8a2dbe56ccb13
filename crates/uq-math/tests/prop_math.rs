// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Property-Based Tests (proptest) for uq-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for uq-math using proptest.
//!
//! Covers: Householder least squares, pivoted row selection, symmetric
//! eigendecomposition, Gauss rule exactness.

use ndarray::{Array1, Array2};
use proptest::prelude::*;
use uq_math::linalg::{
    lstsq_qr, pivoted_row_selection, pivoted_row_selection_by_key, svd_small, symmetric_eigen,
};
use uq_math::orthopoly::PolyFamily;

/// Well-conditioned tall matrix: shifted identity block plus a smooth tail.
fn tall_matrix(m: usize, n: usize, seed: f64) -> Array2<f64> {
    Array2::from_shape_fn((m, n), |(i, j)| {
        let base = if i == j { 3.0 } else { 0.0 };
        base + ((i * n + j) as f64 * 0.37 + seed).sin() * 0.2
    })
}

// ── Least Squares Properties ─────────────────────────────────────────

proptest! {
    /// Consistent systems are solved exactly with zero residual.
    #[test]
    fn lstsq_recovers_exact_solution(
        n in 1usize..8,
        extra in 0usize..10,
        seed in -3.0f64..3.0,
    ) {
        let m = n + extra;
        let a = tall_matrix(m, n, seed);
        let x_true = Array1::from_shape_fn(n, |j| (j as f64 + 1.0) * 0.5 - seed);
        let b = a.dot(&x_true);

        let sol = lstsq_qr(&a, &b).unwrap();
        for j in 0..n {
            prop_assert!((sol.coefficients[j] - x_true[j]).abs() < 1e-9,
                "x[{}] = {}, expected {}", j, sol.coefficients[j], x_true[j]);
        }
        prop_assert!(sol.residual_norm < 1e-9);
    }

    /// The least-squares residual is orthogonal to the column space.
    #[test]
    fn lstsq_residual_orthogonal(n in 1usize..6, extra in 1usize..10, seed in -3.0f64..3.0) {
        let m = n + extra;
        let a = tall_matrix(m, n, seed);
        let b = Array1::from_shape_fn(m, |i| (i as f64 * 1.3 + seed).cos());

        let sol = lstsq_qr(&a, &b).unwrap();
        let r = &a.dot(&sol.coefficients) - &b;
        let at_r = a.t().dot(&r);
        for j in 0..n {
            prop_assert!(at_r[j].abs() < 1e-9, "A^T r [{}] = {}", j, at_r[j]);
        }
        let norm = r.mapv(|v| v * v).sum().sqrt();
        prop_assert!((norm - sol.residual_norm).abs() < 1e-9);
    }
}

// ── Decomposition Properties ─────────────────────────────────────────

proptest! {
    /// Eigenpairs of symmetric matrices satisfy A v = lambda v.
    #[test]
    fn symmetric_eigen_pairs(n in 1usize..10, seed in -2.0f64..2.0) {
        let a = Array2::from_shape_fn((n, n), |(i, j)| {
            ((i + j) as f64 * 0.7 + seed).sin() + if i == j { 1.0 } else { 0.0 }
        });
        let (vals, vecs) = symmetric_eigen(&a);
        for k in 0..n {
            let v = vecs.column(k);
            let av = a.dot(&v);
            for i in 0..n {
                prop_assert!((av[i] - vals[k] * v[i]).abs() < 1e-9);
            }
        }
    }

    /// SVD reconstructs the input matrix.
    #[test]
    fn svd_reconstruction(m in 2usize..8, n in 1usize..6, seed in -2.0f64..2.0) {
        prop_assume!(m >= n);
        let a = tall_matrix(m, n, seed);
        let (u, sigma, vt) = svd_small(&a);
        for i in 0..m {
            for j in 0..n {
                let mut acc = 0.0;
                for k in 0..sigma.len() {
                    acc += u[[i, k]] * sigma[k] * vt[[k, j]];
                }
                prop_assert!((acc - a[[i, j]]).abs() < 1e-8,
                    "({}, {}): {} vs {}", i, j, acc, a[[i, j]]);
            }
        }
    }

    /// Pivoted selection returns distinct rows and the requested count.
    #[test]
    fn pivoted_selection_distinct(m in 1usize..30, n in 1usize..6, frac in 0.0f64..=1.0) {
        let a = tall_matrix(m, n, 0.3);
        let count = ((m as f64) * frac).round() as usize;
        let picks = pivoted_row_selection(&a, count).unwrap();
        prop_assert_eq!(picks.len(), count);
        let mut sorted = picks.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), count);
        prop_assert!(picks.iter().all(|&i| i < m));
    }

    /// Keyed selection picks the same rows however the rows are ordered,
    /// including rows duplicated in norm.
    #[test]
    fn keyed_selection_invariant_under_row_order(
        order in Just((0usize..16).collect::<Vec<_>>()).prop_shuffle(),
        count in 1usize..12,
    ) {
        // Mirror-symmetric rows on a 4 x 4 grid give many exact norm ties.
        let nodes = [-0.8, -0.3, 0.3, 0.8];
        let row = |r: usize| {
            let (x, y) = (nodes[r / 4], nodes[r % 4]);
            [1.0, x, y, x * y, x * x + y * y]
        };
        let a = Array2::from_shape_fn((16, 5), |(i, j)| row(i)[j]);
        let keys: Vec<usize> = (0..16).collect();
        let base = pivoted_row_selection_by_key(&a, count, &keys).unwrap();

        let shuffled = Array2::from_shape_fn((16, 5), |(i, j)| row(order[i])[j]);
        let picks = pivoted_row_selection_by_key(&shuffled, count, &order).unwrap();
        let mapped: Vec<usize> = picks.iter().map(|&r| order[r]).collect();
        prop_assert_eq!(mapped, base);
    }
}

// ── Gauss Rule Properties ────────────────────────────────────────────

proptest! {
    /// An n-point Legendre rule integrates x^k exactly for k <= 2n - 1.
    #[test]
    fn legendre_rule_exactness(n in 1usize..10) {
        let rule = PolyFamily::Legendre.gauss_rule(n);
        for k in 0..(2 * n) {
            let approx = rule.integrate(|x| x.powi(k as i32));
            let exact = if k % 2 == 1 { 0.0 } else { 1.0 / (k as f64 + 1.0) };
            prop_assert!((approx - exact).abs() < 1e-10,
                "n={} k={} approx={} exact={}", n, k, approx, exact);
        }
    }

    /// Nodes lie inside the support and are strictly increasing.
    #[test]
    fn rule_nodes_sorted(n in 2usize..12) {
        for family in [PolyFamily::Legendre, PolyFamily::Hermite, PolyFamily::Laguerre] {
            let rule = family.gauss_rule(n);
            for w in rule.nodes.windows(2) {
                prop_assert!(w[0] < w[1]);
            }
            match family {
                PolyFamily::Legendre => prop_assert!(rule.nodes.iter().all(|x| x.abs() < 1.0)),
                PolyFamily::Laguerre => prop_assert!(rule.nodes.iter().all(|x| *x > 0.0)),
                PolyFamily::Hermite => {}
            }
        }
    }
}
