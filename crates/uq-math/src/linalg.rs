//! Linear algebra utilities.
//!
//! Jacobi symmetric eigensolver, small SVD, Householder least squares and
//! greedy pivoted row selection for quadrature subsampling.

use ndarray::{Array1, Array2};
use uq_types::error::{UqError, UqResult};

/// Relative pivot threshold below which a least-squares system is singular.
pub const SINGULAR_PIVOT_RTOL: f64 = 1e-12;

/// Relative residual norm below which pivoted selection treats the
/// remaining rows as exhausted.
const EXHAUSTED_RTOL: f64 = 1e-10;

/// Squared residual norms this close (relative) to the largest are tied.
pub const PIVOT_TIE_RTOL: f64 = 1e-9;

/// Symmetric eigendecomposition by cyclic Jacobi rotations.
///
/// Returns (eigenvalues, eigenvectors) sorted by ascending eigenvalue, with
/// eigenvectors stored as columns. Intended for the small matrices used here
/// (Jacobi recurrence matrices, normal matrices of a few hundred columns).
pub fn symmetric_eigen(a: &Array2<f64>) -> (Array1<f64>, Array2<f64>) {
    let n = a.nrows();
    let mut s = a.clone();
    let mut v = Array2::eye(n);
    let max_sweeps = 100;

    let scale = s.iter().map(|x| x.abs()).fold(0.0_f64, f64::max).max(1e-300);

    for _ in 0..max_sweeps {
        let mut off_diag = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                off_diag += s[[i, j]].abs();
            }
        }
        if off_diag <= 1e-15 * scale {
            break;
        }

        for i in 0..n {
            for j in (i + 1)..n {
                // Negligible against the diagonal: drop instead of rotating.
                if s[[i, j]].abs() <= 1e-18 * (s[[i, i]].abs() + s[[j, j]].abs())
                    || s[[i, j]].abs() <= 1e-300
                {
                    s[[i, j]] = 0.0;
                    s[[j, i]] = 0.0;
                    continue;
                }
                let tau = (s[[j, j]] - s[[i, i]]) / (2.0 * s[[i, j]]);
                let t = if tau >= 0.0 {
                    1.0 / (tau + (1.0 + tau * tau).sqrt())
                } else {
                    -1.0 / (-tau + (1.0 + tau * tau).sqrt())
                };
                let cos = 1.0 / (1.0 + t * t).sqrt();
                let sin = t * cos;

                let sii = s[[i, i]];
                let sjj = s[[j, j]];
                let sij = s[[i, j]];
                s[[i, i]] = cos * cos * sii - 2.0 * sin * cos * sij + sin * sin * sjj;
                s[[j, j]] = sin * sin * sii + 2.0 * sin * cos * sij + cos * cos * sjj;
                s[[i, j]] = 0.0;
                s[[j, i]] = 0.0;

                for r in 0..n {
                    if r == i || r == j {
                        continue;
                    }
                    let ri = s[[r, i]];
                    let rj = s[[r, j]];
                    s[[r, i]] = cos * ri - sin * rj;
                    s[[i, r]] = s[[r, i]];
                    s[[r, j]] = sin * ri + cos * rj;
                    s[[j, r]] = s[[r, j]];
                }

                for r in 0..n {
                    let vi = v[[r, i]];
                    let vj = v[[r, j]];
                    v[[r, i]] = cos * vi - sin * vj;
                    v[[r, j]] = sin * vi + cos * vj;
                }
            }
        }
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| {
        s[[i, i]]
            .partial_cmp(&s[[j, j]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut values = Array1::zeros(n);
    let mut vectors = Array2::zeros((n, n));
    for (idx, &col) in order.iter().enumerate() {
        values[idx] = s[[col, col]];
        for r in 0..n {
            vectors[[r, idx]] = v[[r, col]];
        }
    }
    (values, vectors)
}

/// Simple SVD for small matrices via the eigendecomposition of A^T A.
///
/// Returns (U, sigma, Vt) where A ≈ U * diag(sigma) * Vt, sigma descending.
/// Matches `numpy.linalg.svd(A, full_matrices=False)` up to column signs.
pub fn svd_small(a: &Array2<f64>) -> (Array2<f64>, Array1<f64>, Array2<f64>) {
    let (m, n) = a.dim();
    let k = m.min(n);

    let ata = a.t().dot(a);
    let (eigvals, eigvecs) = symmetric_eigen(&ata);

    // Ascending eigenvalues, so walk from the back for descending sigma.
    let mut sigma = Array1::zeros(k);
    let mut vt = Array2::zeros((k, n));
    for idx in 0..k {
        let col = n - 1 - idx;
        sigma[idx] = eigvals[col].max(0.0).sqrt();
        for j in 0..n {
            vt[[idx, j]] = eigvecs[[j, col]];
        }
    }

    let mut u = Array2::zeros((m, k));
    for idx in 0..k {
        if sigma[idx] > 1e-14 {
            let inv_s = 1.0 / sigma[idx];
            for i in 0..m {
                let mut sum = 0.0;
                for j in 0..n {
                    sum += a[[i, j]] * vt[[idx, j]];
                }
                u[[i, idx]] = sum * inv_s;
            }
        }
    }

    (u, sigma, vt)
}

/// 2-norm condition number `sigma_max / sigma_min`; infinite when singular.
pub fn condition_number(a: &Array2<f64>) -> f64 {
    let (_, sigma, _) = svd_small(a);
    let Some(&s_max) = sigma.first() else {
        return f64::INFINITY;
    };
    let s_min = sigma[sigma.len() - 1];
    if s_min <= 0.0 {
        return f64::INFINITY;
    }
    s_max / s_min
}

/// Least-squares solution with its residual.
#[derive(Debug, Clone)]
pub struct LstsqSolution {
    pub coefficients: Array1<f64>,
    /// `|| A x - b ||_2`
    pub residual_norm: f64,
}

/// Solve `min || A x - b ||_2` by Householder QR.
///
/// Errors with `RankDeficient` when A has fewer rows than columns and with
/// `SingularSystem` when a diagonal entry of R falls below
/// `SINGULAR_PIVOT_RTOL * max |R_kk|`.
pub fn lstsq_qr(a: &Array2<f64>, b: &Array1<f64>) -> UqResult<LstsqSolution> {
    let (m, n) = a.dim();
    if b.len() != m {
        return Err(UqError::DimensionMismatch {
            expected: m,
            got: b.len(),
        });
    }
    if n == 0 {
        return Err(UqError::LinAlg(
            "least squares requires at least one column".to_string(),
        ));
    }
    if m < n {
        return Err(UqError::RankDeficient {
            evaluations: m,
            cardinality: n,
        });
    }

    let mut r = a.clone();
    let mut qtb = b.clone();
    let mut v = vec![0.0; m];

    for k in 0..n {
        let norm = (k..m).map(|i| r[[i, k]] * r[[i, k]]).sum::<f64>().sqrt();
        if norm == 0.0 {
            continue;
        }
        let alpha = if r[[k, k]] > 0.0 { -norm } else { norm };

        let len = m - k;
        for i in 0..len {
            v[i] = r[[k + i, k]];
        }
        v[0] -= alpha;
        let v_norm2: f64 = v[..len].iter().map(|x| x * x).sum();
        if v_norm2 == 0.0 {
            continue;
        }

        for j in k..n {
            let dot: f64 = (0..len).map(|i| v[i] * r[[k + i, j]]).sum();
            let f = 2.0 * dot / v_norm2;
            for i in 0..len {
                r[[k + i, j]] -= f * v[i];
            }
        }
        let dot: f64 = (0..len).map(|i| v[i] * qtb[k + i]).sum();
        let f = 2.0 * dot / v_norm2;
        for i in 0..len {
            qtb[k + i] -= f * v[i];
        }
    }

    let max_pivot = (0..n).map(|k| r[[k, k]].abs()).fold(0.0_f64, f64::max);
    for k in 0..n {
        let pivot = r[[k, k]];
        if max_pivot == 0.0 || pivot.abs() <= SINGULAR_PIVOT_RTOL * max_pivot {
            return Err(UqError::SingularSystem { column: k, pivot });
        }
    }

    let mut x = Array1::zeros(n);
    for k in (0..n).rev() {
        let mut acc = qtb[k];
        for j in (k + 1)..n {
            acc -= r[[k, j]] * x[j];
        }
        x[k] = acc / r[[k, k]];
    }

    let residual_norm = qtb.iter().skip(n).map(|v| v * v).sum::<f64>().sqrt();
    if !x.iter().all(|v: &f64| v.is_finite()) {
        return Err(UqError::LinAlg(
            "least-squares coefficients contain non-finite values".to_string(),
        ));
    }

    Ok(LstsqSolution {
        coefficients: x,
        residual_norm,
    })
}

/// Greedy row selection: QR with column pivoting applied to A^T.
///
/// Ties go to the lowest row index. See [`pivoted_row_selection_by_key`].
pub fn pivoted_row_selection(a: &Array2<f64>, count: usize) -> UqResult<Vec<usize>> {
    let keys: Vec<usize> = (0..a.nrows()).collect();
    pivoted_row_selection_by_key(a, count, &keys)
}

/// Greedy row selection with caller-supplied tie-breaking.
///
/// Each step takes the unselected rows whose residual norm lies within
/// `PIVOT_TIE_RTOL` of the largest, picks the one with the smallest key,
/// and deflates every unselected row against it with modified Gram-Schmidt.
/// When the residuals are exhausted (the selected rows span the row space)
/// selection restarts from the original rows of the unselected set, so up
/// to `nrows` rows can be requested.
pub fn pivoted_row_selection_by_key<K: Ord>(
    a: &Array2<f64>,
    count: usize,
    keys: &[K],
) -> UqResult<Vec<usize>> {
    let (m, n) = a.dim();
    if keys.len() != m {
        return Err(UqError::DimensionMismatch {
            expected: m,
            got: keys.len(),
        });
    }
    if count > m {
        return Err(UqError::LinAlg(format!(
            "cannot select {count} rows from a matrix with {m} rows"
        )));
    }

    let mut residual = a.clone();
    let mut selected = Vec::with_capacity(count);
    let mut taken = vec![false; m];
    let mut norms2: Vec<f64> = (0..m)
        .map(|i| (0..n).map(|j| a[[i, j]] * a[[i, j]]).sum())
        .collect();
    let max_norm2 = norms2.iter().cloned().fold(0.0_f64, f64::max);
    let exhausted2 = EXHAUSTED_RTOL * EXHAUSTED_RTOL * max_norm2;
    let mut q = vec![0.0; n];

    while selected.len() < count {
        let Some(mut pick) = pick_pivot(&norms2, &taken, keys) else {
            break;
        };

        if norms2[pick] <= exhausted2 {
            // Row space spanned: restart deflation on the remaining rows.
            for i in 0..m {
                if taken[i] {
                    continue;
                }
                for j in 0..n {
                    residual[[i, j]] = a[[i, j]];
                }
                norms2[i] = (0..n).map(|j| a[[i, j]] * a[[i, j]]).sum();
            }
            pick = pick_pivot(&norms2, &taken, keys).unwrap_or(pick);
        }

        taken[pick] = true;
        selected.push(pick);

        let norm = norms2[pick].sqrt();
        if norm <= 0.0 {
            continue;
        }
        for j in 0..n {
            q[j] = residual[[pick, j]] / norm;
        }
        for i in 0..m {
            if taken[i] {
                continue;
            }
            let dot: f64 = (0..n).map(|j| residual[[i, j]] * q[j]).sum();
            for j in 0..n {
                residual[[i, j]] -= dot * q[j];
            }
            norms2[i] = (0..n).map(|j| residual[[i, j]] * residual[[i, j]]).sum();
        }
    }

    Ok(selected)
}

/// Smallest-key row among the unselected rows tied for the largest norm.
fn pick_pivot<K: Ord>(norms2: &[f64], taken: &[bool], keys: &[K]) -> Option<usize> {
    let max = (0..norms2.len())
        .filter(|&i| !taken[i])
        .map(|i| norms2[i])
        .reduce(f64::max)?;
    let floor = max - PIVOT_TIE_RTOL * max;
    (0..norms2.len())
        .filter(|&i| !taken[i] && norms2[i] >= floor)
        .min_by(|&i, &j| keys[i].cmp(&keys[j]))
}
