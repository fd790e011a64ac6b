//! Small dense linear algebra helpers shared by the strategies.

use nalgebra::{DMatrix, DVector, SymmetricEigen};
use ndarray::{ArrayViewD, Zip};

/// Inner product of two arrays of the same shape, as if both were flattened.
pub fn dot(a: ArrayViewD<'_, f64>, b: ArrayViewD<'_, f64>) -> f64 {
    Zip::from(a).and(b).fold(0f64, |acc, &x, &y| acc + x * y)
}

/// Euclidean norm of the flattened array.
pub fn norm(a: ArrayViewD<'_, f64>) -> f64 {
    a.fold(0f64, |acc, &x| acc + x * x).sqrt()
}

/// Sherman-Morrison rank one update of an inverse.
///
/// Given `a_inv` = A⁻¹, computes `A⁻¹ - g (vᵀA⁻¹)` with `g = A⁻¹u / (e + vᵀA⁻¹u)`, which is the
/// inverse of `A + uvᵀ/e`.
///
/// # Arguments
/// * `a_inv` - The square matrix to update.
/// * `u`, `v` - The rank one factors.
/// * `e` - Inverse weight of the rank one term.
pub fn sherman_morrison(
    a_inv: &DMatrix<f64>,
    u: &DVector<f64>,
    v: &DVector<f64>,
    e: f64,
) -> DMatrix<f64> {
    let a_inv_u = a_inv * u;
    let v_a_inv = v.transpose() * a_inv;
    let g = &a_inv_u / (e + v.dot(&a_inv_u));
    a_inv - g * v_a_inv
}

/// Principal square root of a symmetric matrix, keeping only its real part.
///
/// Negative eigenvalues (numerical residue on a PSD matrix) have a purely imaginary root, so
/// they contribute nothing.
pub fn sqrtm_symmetric(m: &DMatrix<f64>) -> DMatrix<f64> {
    let SymmetricEigen {
        eigenvectors,
        eigenvalues,
        ..
    } = SymmetricEigen::new(m.clone());

    let roots = eigenvalues.map(|lambda| lambda.max(0.).sqrt());
    &eigenvectors * DMatrix::from_diagonal(&roots) * eigenvectors.transpose()
}
