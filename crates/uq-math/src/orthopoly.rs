// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Orthogonal Polynomials and Gauss Rules
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Orthonormal polynomial families and their Gauss quadrature rules.
//!
//! Every family is orthonormal with respect to a probability measure in
//! standard coordinates:
//!   Legendre: uniform on [-1, 1]
//!   Hermite : standard normal
//!   Laguerre: unit-rate exponential on [0, inf)
//! Polynomials follow the three-term recurrence
//!   sqrt(b_{n+1}) p_{n+1} = (x - a_n) p_n - sqrt(b_n) p_{n-1}
//! and Gauss rules come from the Jacobi matrix (Golub-Welsch).

use crate::linalg::symmetric_eigen;
use ndarray::Array2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolyFamily {
    Legendre,
    Hermite,
    Laguerre,
}

impl PolyFamily {
    /// Recurrence coefficients (a_n, b_n). `b_0 = 1` for a probability measure.
    pub fn recurrence(&self, n: usize) -> (f64, f64) {
        let nf = n as f64;
        match self {
            PolyFamily::Legendre => {
                let b = if n == 0 {
                    1.0
                } else {
                    nf * nf / (4.0 * nf * nf - 1.0)
                };
                (0.0, b)
            }
            PolyFamily::Hermite => (0.0, if n == 0 { 1.0 } else { nf }),
            PolyFamily::Laguerre => (2.0 * nf + 1.0, if n == 0 { 1.0 } else { nf * nf }),
        }
    }

    /// Orthonormal polynomials p_0..=p_degree evaluated at `x`.
    pub fn eval_all(&self, degree: usize, x: f64) -> Vec<f64> {
        let mut out = Vec::with_capacity(degree + 1);
        let mut prev = 0.0;
        let mut curr = 1.0;
        out.push(curr);
        for n in 0..degree {
            let (a_n, b_n) = self.recurrence(n);
            let (_, b_next) = self.recurrence(n + 1);
            let sqrt_bn = if n == 0 { 0.0 } else { b_n.sqrt() };
            let next = ((x - a_n) * curr - sqrt_bn * prev) / b_next.sqrt();
            prev = curr;
            curr = next;
            out.push(curr);
        }
        out
    }

    /// Single orthonormal polynomial p_degree(x).
    pub fn eval(&self, degree: usize, x: f64) -> f64 {
        self.eval_all(degree, x)[degree]
    }

    /// `n`-point Gauss rule for this family's measure.
    pub fn gauss_rule(&self, n: usize) -> GaussRule {
        if n == 0 {
            return GaussRule {
                nodes: Vec::new(),
                weights: Vec::new(),
            };
        }

        let mut jacobi = Array2::zeros((n, n));
        for k in 0..n {
            let (a_k, _) = self.recurrence(k);
            jacobi[[k, k]] = a_k;
            if k + 1 < n {
                let (_, b_next) = self.recurrence(k + 1);
                let off = b_next.sqrt();
                jacobi[[k, k + 1]] = off;
                jacobi[[k + 1, k]] = off;
            }
        }

        // Eigenvalues come back ascending, so nodes are already sorted.
        let (nodes, vectors) = symmetric_eigen(&jacobi);
        let weights: Vec<f64> = (0..n).map(|k| vectors[[0, k]] * vectors[[0, k]]).collect();
        let total: f64 = weights.iter().sum();

        GaussRule {
            nodes: nodes.to_vec(),
            weights: weights.iter().map(|w| w / total).collect(),
        }
    }
}

/// Gauss quadrature nodes and probability weights (weights sum to 1).
#[derive(Debug, Clone)]
pub struct GaussRule {
    pub nodes: Vec<f64>,
    pub weights: Vec<f64>,
}

impl GaussRule {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Expectation of `f` under the rule's measure.
    pub fn integrate<F: Fn(f64) -> f64>(&self, f: F) -> f64 {
        self.nodes
            .iter()
            .zip(&self.weights)
            .map(|(&x, &w)| w * f(x))
            .sum()
    }
}
