//! Small dense linear algebra for principal components.
//!
//! Eigenpairs of the (symmetric) covariance matrix are found with classical
//! Jacobi rotations: repeatedly zero the largest off-diagonal entry until
//! every one of them is below the tolerance.

use crate::error::{FeatureError, Result};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Off-diagonal magnitude treated as zero
pub const DEFAULT_TOLERANCE: f64 = 1e-12;

/// Eigenpairs of a symmetric matrix
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    /// Eigenvalues, largest first
    pub values: Array1<f64>,
    /// Unit eigenvectors as columns, aligned with `values`
    pub vectors: Array2<f64>,
}

/// Sample covariance (n - 1 denominator) of already centred columns.
///
/// # Errors
/// [`FeatureError::InvalidParameter`] with fewer than two rows.
pub fn covariance(centred: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
    let n = centred.nrows();
    if n < 2 {
        return Err(FeatureError::InvalidParameter(format!(
            "covariance needs at least 2 rows, got {n}"
        )));
    }
    Ok(centred.t().dot(&centred) / (n - 1) as f64)
}

/// Column means ignoring non-finite entries; 0 for an all-missing column.
pub fn finite_means(values: ArrayView2<'_, f64>) -> Vec<f64> {
    values
        .axis_iter(Axis(1))
        .map(|column| {
            let (sum, count) = column
                .iter()
                .filter(|v| v.is_finite())
                .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
            if count == 0 { 0.0 } else { sum / count as f64 }
        })
        .collect()
}

/// Eigendecomposition of a symmetric matrix.
///
/// # Errors
/// [`FeatureError::Dimension`] if the matrix is not square.
pub fn symmetric_eigen(matrix: &Array2<f64>, tolerance: f64) -> Result<SymmetricEigen> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return Err(FeatureError::Dimension(format!(
            "eigendecomposition of a {}x{} matrix",
            n,
            matrix.ncols()
        )));
    }

    let mut a = matrix.clone();
    let mut vectors = Array2::<f64>::eye(n);

    // Each rotation zeroes one pair; allow many passes over all pairs
    let max_rotations = 100 * n * n.max(2);
    for _ in 0..max_rotations {
        let Some((p, q)) = largest_off_diagonal(&a, tolerance) else {
            break;
        };
        let (c, s) = rotation(a[[p, p]], a[[q, q]], a[[p, q]]);
        rotate(&mut a, &mut vectors, p, q, c, s);
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]));

    let values = order.iter().map(|&i| a[[i, i]]).collect();
    let vectors = vectors.select(Axis(1), &order);

    Ok(SymmetricEigen { values, vectors })
}

/// Position of the largest off-diagonal entry above `tolerance`.
fn largest_off_diagonal(a: &Array2<f64>, tolerance: f64) -> Option<(usize, usize)> {
    let n = a.nrows();
    let mut best = None;
    let mut largest = tolerance;
    for i in 0..n {
        for j in (i + 1)..n {
            let magnitude = a[[i, j]].abs();
            if magnitude > largest {
                largest = magnitude;
                best = Some((i, j));
            }
        }
    }
    best
}

/// Cosine and sine of the rotation that zeroes `a[p][q]`.
fn rotation(app: f64, aqq: f64, apq: f64) -> (f64, f64) {
    let theta = (aqq - app) / (2.0 * apq);
    let t = theta.signum() / (theta.abs() + (1.0 + theta * theta).sqrt());
    let c = 1.0 / (1.0 + t * t).sqrt();
    (c, t * c)
}

fn rotate(a: &mut Array2<f64>, v: &mut Array2<f64>, p: usize, q: usize, c: f64, s: f64) {
    let n = a.nrows();
    let (app, aqq, apq) = (a[[p, p]], a[[q, q]], a[[p, q]]);

    a[[p, p]] = c * c * app - 2.0 * c * s * apq + s * s * aqq;
    a[[q, q]] = s * s * app + 2.0 * c * s * apq + c * c * aqq;
    a[[p, q]] = 0.0;
    a[[q, p]] = 0.0;

    for i in (0..n).filter(|&i| i != p && i != q) {
        let (aip, aiq) = (a[[i, p]], a[[i, q]]);
        a[[i, p]] = c * aip - s * aiq;
        a[[p, i]] = a[[i, p]];
        a[[i, q]] = s * aip + c * aiq;
        a[[q, i]] = a[[i, q]];
    }

    for i in 0..n {
        let (vip, viq) = (v[[i, p]], v[[i, q]]);
        v[[i, p]] = c * vip - s * viq;
        v[[i, q]] = s * vip + c * viq;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_diagonal_matrix_sorted() {
        let m = array![[1.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 2.0]];
        let eigen = symmetric_eigen(&m, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(eigen.values.to_vec(), vec![3.0, 2.0, 1.0]);
        assert_abs_diff_eq!(eigen.vectors[[1, 0]].abs(), 1.0);
    }

    #[test]
    fn test_reconstructs_symmetric_matrix() {
        let m = array![
            [4.0, 1.0, 0.5, 0.2],
            [1.0, 3.0, 0.3, 0.1],
            [0.5, 0.3, 2.0, 0.4],
            [0.2, 0.1, 0.4, 1.0]
        ];
        let eigen = symmetric_eigen(&m, DEFAULT_TOLERANCE).unwrap();

        let lambda = Array2::from_diag(&eigen.values);
        let rebuilt = eigen.vectors.dot(&lambda).dot(&eigen.vectors.t());
        for i in 0..4 {
            for j in 0..4 {
                assert_abs_diff_eq!(rebuilt[[i, j]], m[[i, j]], epsilon = 1e-9);
            }
        }
        for w in eigen.values.windows(2) {
            assert!(w[0] >= w[1]);
        }
    }

    #[test]
    fn test_single_entry_matrix() {
        let eigen = symmetric_eigen(&array![[5.0]], DEFAULT_TOLERANCE).unwrap();
        assert_eq!(eigen.values.to_vec(), vec![5.0]);
        assert_eq!(eigen.vectors[[0, 0]], 1.0);
    }

    #[test]
    fn test_non_square_rejected() {
        let m = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            symmetric_eigen(&m, DEFAULT_TOLERANCE),
            Err(FeatureError::Dimension(_))
        ));
    }

    #[test]
    fn test_covariance_and_means() {
        let x = array![[1.0, 2.0], [3.0, f64::NAN], [5.0, 6.0]];
        assert_eq!(finite_means(x.view()), vec![3.0, 4.0]);

        let centred = array![[-1.0, -2.0], [1.0, 2.0]];
        let cov = covariance(centred.view()).unwrap();
        assert_abs_diff_eq!(cov[[0, 0]], 2.0);
        assert_abs_diff_eq!(cov[[0, 1]], 4.0);
        assert_abs_diff_eq!(cov[[1, 1]], 8.0);
    }
}
