// ─────────────────────────────────────────────────────────────────────
// SCPN UQ Core — Polynomial Basis
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Multi-index sets and multivariate orthonormal bases.
//!
//! Index sets are ordered graded-lexicographically: by total degree, then
//! ascending lexicographic order, so the zero multi-index is always first
//! and repeated builds are identical.

use crate::parameter::Parameter;
use ndarray::{Array1, Array2, ArrayView1};
use uq_types::config::IndexRule;
use uq_types::error::{UqError, UqResult};

/// Ordered set of multi-indices, one per basis polynomial.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSet {
    rule: IndexRule,
    orders: Vec<usize>,
    elements: Vec<Vec<usize>>,
}

impl IndexSet {
    pub fn new(rule: IndexRule, orders: &[usize]) -> UqResult<Self> {
        if orders.is_empty() {
            return Err(UqError::InvalidBasis(
                "index set requires at least one dimension".to_string(),
            ));
        }
        let max_order = orders.iter().copied().max().unwrap_or(0);

        let mut elements = match rule {
            IndexRule::TotalOrder => total_order_multi_index(orders, max_order),
            IndexRule::Tensor => tensor_multi_index(orders),
            IndexRule::Hyperbolic { q } => {
                if !(q > 0.0 && q <= 1.0) {
                    return Err(UqError::InvalidBasis(format!(
                        "hyperbolic q must lie in (0, 1], got {q}"
                    )));
                }
                let limit = max_order as f64 + 1e-12;
                total_order_multi_index(orders, max_order)
                    .into_iter()
                    .filter(|alpha| {
                        let s: f64 = alpha.iter().map(|&a| (a as f64).powf(q)).sum();
                        s.powf(1.0 / q) <= limit
                    })
                    .collect()
            }
        };
        elements.sort_by(|a, b| {
            let da: usize = a.iter().sum();
            let db: usize = b.iter().sum();
            da.cmp(&db).then_with(|| a.cmp(b))
        });

        Ok(Self {
            rule,
            orders: orders.to_vec(),
            elements,
        })
    }

    pub fn rule(&self) -> IndexRule {
        self.rule
    }

    pub fn orders(&self) -> &[usize] {
        &self.orders
    }

    pub fn elements(&self) -> &[Vec<usize>] {
        &self.elements
    }

    pub fn cardinality(&self) -> usize {
        self.elements.len()
    }

    pub fn dimensions(&self) -> usize {
        self.orders.len()
    }

    /// Position of `alpha` in the set.
    pub fn position(&self, alpha: &[usize]) -> Option<usize> {
        self.elements.iter().position(|e| e.as_slice() == alpha)
    }
}

/// Closed-form size of the total-order set: C(dims + order, order).
pub fn total_order_cardinality(dims: usize, order: usize) -> usize {
    let mut acc: u128 = 1;
    for k in 1..=order as u128 {
        acc = acc * (dims as u128 + k) / k;
    }
    acc as usize
}

fn total_order_multi_index(caps: &[usize], order: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current = vec![0usize; caps.len()];
    for total in 0..=order {
        enumerate_multi_index(0, total, caps, &mut current, &mut out);
    }
    out
}

fn enumerate_multi_index(
    dim: usize,
    remaining: usize,
    caps: &[usize],
    current: &mut [usize],
    out: &mut Vec<Vec<usize>>,
) {
    if dim + 1 == current.len() {
        if remaining <= caps[dim] {
            current[dim] = remaining;
            out.push(current.to_vec());
        }
        return;
    }
    for v in 0..=remaining.min(caps[dim]) {
        current[dim] = v;
        enumerate_multi_index(dim + 1, remaining - v, caps, current, out);
    }
}

fn tensor_multi_index(caps: &[usize]) -> Vec<Vec<usize>> {
    let mut out = vec![Vec::with_capacity(caps.len())];
    for &cap in caps {
        out = out
            .into_iter()
            .flat_map(|prefix| {
                (0..=cap).map(move |v| {
                    let mut next = prefix.clone();
                    next.push(v);
                    next
                })
            })
            .collect();
    }
    out
}

/// Multivariate orthonormal polynomial basis over a list of parameters.
#[derive(Debug, Clone)]
pub struct Basis {
    parameters: Vec<Parameter>,
    index_set: IndexSet,
    /// Highest degree used per dimension.
    max_degrees: Vec<usize>,
}

impl Basis {
    pub fn new(parameters: Vec<Parameter>, rule: IndexRule, orders: &[usize]) -> UqResult<Self> {
        if parameters.len() != orders.len() {
            return Err(UqError::InvalidBasis(format!(
                "{} orders given for {} parameters",
                orders.len(),
                parameters.len()
            )));
        }
        let index_set = IndexSet::new(rule, orders)?;
        Ok(Self::from_index_set(parameters, index_set))
    }

    /// Total-order basis of uniform degree.
    pub fn total_order(parameters: Vec<Parameter>, order: usize) -> UqResult<Self> {
        let orders = vec![order; parameters.len()];
        Self::new(parameters, IndexRule::TotalOrder, &orders)
    }

    fn from_index_set(parameters: Vec<Parameter>, index_set: IndexSet) -> Self {
        let mut max_degrees = vec![0usize; index_set.dimensions()];
        for alpha in index_set.elements() {
            for (d, &a) in alpha.iter().enumerate() {
                max_degrees[d] = max_degrees[d].max(a);
            }
        }
        Self {
            parameters,
            index_set,
            max_degrees,
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn index_set(&self) -> &IndexSet {
        &self.index_set
    }

    pub fn cardinality(&self) -> usize {
        self.index_set.cardinality()
    }

    pub fn dimensions(&self) -> usize {
        self.parameters.len()
    }

    /// Evaluate every basis polynomial at one standard-space point.
    pub fn evaluate_standard(&self, xi: ArrayView1<'_, f64>) -> Array1<f64> {
        let univariate: Vec<Vec<f64>> = self
            .parameters
            .iter()
            .zip(&self.max_degrees)
            .enumerate()
            .map(|(d, (p, &deg))| p.family().eval_all(deg, xi[d]))
            .collect();

        let mut row = Array1::zeros(self.cardinality());
        for (term_idx, alpha) in self.index_set.elements().iter().enumerate() {
            let mut val = 1.0;
            for (d, &a) in alpha.iter().enumerate() {
                val *= univariate[d][a];
            }
            row[term_idx] = val;
        }
        row
    }

    /// Design matrix with shape (n_points, cardinality) for standard points.
    pub fn design_matrix(&self, points: &Array2<f64>) -> Array2<f64> {
        let mut a = Array2::zeros((points.nrows(), self.cardinality()));
        for i in 0..points.nrows() {
            let row = self.evaluate_standard(points.row(i));
            a.row_mut(i).assign(&row);
        }
        a
    }

    /// Map a physical point to standard coordinates.
    pub fn to_standard(&self, x: &[f64]) -> UqResult<Array1<f64>> {
        if x.len() != self.dimensions() {
            return Err(UqError::DimensionMismatch {
                expected: self.dimensions(),
                got: x.len(),
            });
        }
        Ok(Array1::from_iter(
            self.parameters
                .iter()
                .zip(x)
                .map(|(p, &v)| p.to_standard(v)),
        ))
    }
}
