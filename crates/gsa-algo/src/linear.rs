//! Dense linear algebra kernel for the analysis engine.
//!
//! Every matrix in the engine is a dense `Vec<Vec<f64>>`: the networks
//! this engine targets are interactive-scale (tens of buses), where dense
//! LU beats any sparse machinery on both simplicity and constant factors.
//! A near-zero pivot is not a numerical footnote here, it is the signal
//! that the network has split into islands, so the kernel surfaces it as
//! [`GsaError::Singular`] and callers branch on it.

use gsa_core::{GsaError, GsaResult};

/// Pivot magnitude below which the matrix is declared singular.
const PIVOT_EPS: f64 = 1e-12;

/// Invert a square matrix via LU decomposition with partial pivoting.
///
/// Returns [`GsaError::Singular`] when any pivot magnitude drops below
/// `1e-12`, which for a reduced susceptance matrix means the underlying
/// network is disconnected.
pub fn invert(a: &[Vec<f64>]) -> GsaResult<Vec<Vec<f64>>> {
    let n = a.len();
    if n == 0 {
        return Ok(vec![]);
    }

    let mut lu: Vec<Vec<f64>> = a.to_vec();
    let mut perm: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let mut max_val = lu[k][k].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            if lu[i][k].abs() > max_val {
                max_val = lu[i][k].abs();
                max_row = i;
            }
        }

        if max_val < PIVOT_EPS {
            return Err(GsaError::Singular(format!(
                "pivot {:.3e} at column {} below threshold",
                max_val, k
            )));
        }

        if max_row != k {
            lu.swap(k, max_row);
            perm.swap(k, max_row);
        }

        for i in (k + 1)..n {
            lu[i][k] /= lu[k][k];
            for j in (k + 1)..n {
                let factor = lu[i][k] * lu[k][j];
                lu[i][j] -= factor;
            }
        }
    }

    // Solve A·x = e_col for each unit vector, permuted
    let mut inverse = vec![vec![0.0; n]; n];
    for col in 0..n {
        let mut x = vec![0.0; n];
        for (i, &p) in perm.iter().enumerate() {
            x[i] = if p == col { 1.0 } else { 0.0 };
        }

        // Forward substitution (L has implicit unit diagonal)
        for i in 1..n {
            for j in 0..i {
                let factor = lu[i][j] * x[j];
                x[i] -= factor;
            }
        }

        // Back substitution
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                let factor = lu[i][j] * x[j];
                x[i] -= factor;
            }
            x[i] /= lu[i][i];
        }

        for i in 0..n {
            inverse[i][col] = x[i];
        }
    }

    Ok(inverse)
}

/// Solve the square system `A·x = b` via LU with partial pivoting.
pub fn solve(a: &[Vec<f64>], b: &[f64]) -> GsaResult<Vec<f64>> {
    let n = a.len();
    if n == 0 {
        return Ok(vec![]);
    }
    if b.len() != n {
        return Err(GsaError::Other(format!(
            "dimension mismatch: matrix {}x{}, rhs {}",
            n,
            n,
            b.len()
        )));
    }

    let mut lu: Vec<Vec<f64>> = a.to_vec();
    let mut x: Vec<f64> = b.to_vec();

    for k in 0..n {
        let mut max_val = lu[k][k].abs();
        let mut max_row = k;
        for i in (k + 1)..n {
            if lu[i][k].abs() > max_val {
                max_val = lu[i][k].abs();
                max_row = i;
            }
        }

        if max_val < PIVOT_EPS {
            return Err(GsaError::Singular(format!(
                "pivot {:.3e} at column {} below threshold",
                max_val, k
            )));
        }

        if max_row != k {
            lu.swap(k, max_row);
            x.swap(k, max_row);
        }

        for i in (k + 1)..n {
            lu[i][k] /= lu[k][k];
            let factor = lu[i][k] * x[k];
            x[i] -= factor;
            for j in (k + 1)..n {
                let factor = lu[i][k] * lu[k][j];
                lu[i][j] -= factor;
            }
        }
    }

    for i in (0..n).rev() {
        for j in (i + 1)..n {
            let factor = lu[i][j] * x[j];
            x[i] -= factor;
        }
        x[i] /= lu[i][i];
    }

    Ok(x)
}

/// Matrix-vector product `A·v`.
pub fn mat_vec(a: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    a.iter()
        .map(|row| row.iter().zip(v).map(|(aij, vj)| aij * vj).sum())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_invert_identity() {
        let a = vec![vec![1.0, 0.0], vec![0.0, 1.0]];
        let inv = invert(&a).unwrap();
        assert!(approx_eq(inv[0][0], 1.0));
        assert!(approx_eq(inv[0][1], 0.0));
        assert!(approx_eq(inv[1][1], 1.0));
    }

    #[test]
    fn test_invert_round_trip() {
        let a = vec![
            vec![4.0, 1.0, 0.0],
            vec![1.0, 3.0, -1.0],
            vec![0.0, -1.0, 2.0],
        ];
        let inv = invert(&a).unwrap();

        // A · A⁻¹ should be identity
        for i in 0..3 {
            let col: Vec<f64> = (0..3).map(|j| inv[j][i]).collect();
            let prod = mat_vec(&a, &col);
            for (j, &v) in prod.iter().enumerate() {
                let expect = if i == j { 1.0 } else { 0.0 };
                assert!(approx_eq(v, expect), "({},{}) = {}", j, i, v);
            }
        }
    }

    #[test]
    fn test_invert_requires_pivoting() {
        // Zero on the diagonal, but nonsingular
        let a = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let inv = invert(&a).unwrap();
        assert!(approx_eq(inv[0][1], 1.0));
        assert!(approx_eq(inv[1][0], 1.0));
    }

    #[test]
    fn test_singular_matrix_detected() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let err = invert(&a).unwrap_err();
        assert!(err.is_singular());
    }

    #[test]
    fn test_solve_simple_system() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let b = vec![5.0, 10.0];
        let x = solve(&a, &b).unwrap();
        assert!(approx_eq(x[0], 1.0));
        assert!(approx_eq(x[1], 3.0));
    }

    #[test]
    fn test_empty_matrix() {
        assert!(invert(&[]).unwrap().is_empty());
        assert!(solve(&[], &[]).unwrap().is_empty());
    }
}
