use nalgebra::DMatrix;
use ndarray::prelude::*;
use std::cmp::Ordering;

#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex<f64>;

/// Conjugate transpose of a complex matrix
pub fn dagger(mat: ArrayView2<c64>) -> Array2<c64> {
    mat.t().mapv(|val| val.conj())
}

/// Complex identity matrix of dimension `n`
pub fn complex_eye(n: usize) -> Array2<c64> {
    Array2::from_diag(&Array1::from_elem(n, c64::new(1.0, 0.0)))
}

/// Promote a real array to a complex one
pub fn to_complex<D: Dimension>(arr: &Array<f64, D>) -> Array<c64, D> {
    arr.mapv(|val| c64::new(val, 0.0))
}

/// Largest absolute deviation of `U U^+` from the identity
pub fn unitarity_error(mat: ArrayView2<c64>) -> f64 {
    let product: Array2<c64> = mat.dot(&dagger(mat));
    let n: usize = product.dim().0;
    let mut err: f64 = 0.0;
    for i in 0..n {
        for j in 0..n {
            let target: f64 = if i == j { 1.0 } else { 0.0 };
            err = err.max((product[[i, j]] - c64::new(target, 0.0)).norm());
        }
    }
    err
}

/// Diagonalize a Hermitian matrix. The eigenvalues are returned in ascending
/// order, the eigenvectors are the columns of the second array.
pub fn eigh(mat: ArrayView2<c64>) -> (Array1<f64>, Array2<c64>) {
    let n: usize = mat.dim().0;
    let na_mat: DMatrix<c64> = DMatrix::from_fn(n, n, |i, j| mat[[i, j]]);
    let eigen = na_mat.symmetric_eigen();

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|a, b| {
        eigen.eigenvalues[*a]
            .partial_cmp(&eigen.eigenvalues[*b])
            .unwrap_or(Ordering::Equal)
    });

    let mut values: Array1<f64> = Array1::zeros(n);
    let mut vectors: Array2<c64> = Array2::zeros((n, n));
    for (new_idx, old_idx) in order.iter().enumerate() {
        values[new_idx] = eigen.eigenvalues[*old_idx];
        for row in 0..n {
            vectors[[row, new_idx]] = eigen.eigenvectors[(row, *old_idx)];
        }
    }
    (values, vectors)
}

/// exp(-i H t) for a Hermitian matrix H
pub fn propagator_hermitian(ham: ArrayView2<c64>, time: f64) -> Array2<c64> {
    let (values, vectors): (Array1<f64>, Array2<c64>) = eigh(ham);
    let phases: Array1<c64> = values.mapv(|val| (c64::new(0.0, -1.0) * val * time).exp());
    vectors.dot(&Array::from_diag(&phases)).dot(&dagger(vectors.view()))
}

/// Hermitian part of a matrix, (A + A^+)/2
pub fn hermitize(mat: ArrayView2<c64>) -> Array2<c64> {
    (&mat + &dagger(mat)) * c64::new(0.5, 0.0)
}

/// Squared norm of a complex vector
pub fn norm_sqr(vec: ArrayView1<c64>) -> f64 {
    vec.iter().map(|val| val.norm_sqr()).sum()
}
