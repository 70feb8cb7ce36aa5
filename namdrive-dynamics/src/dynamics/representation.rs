use crate::dynamics::statistics::projector;
use crate::errors::DynamicsError;
use crate::initialization::Representation;
use crate::interface::{HamiltonianAdapter, HamiltonianHierarchy, ModelRequest};
use crate::utils::{c64, dagger};
use ndarray::prelude::*;

/// Transform the amplitudes of all trajectories from `rep_in` to `rep_out`
/// with the raw basis transforms of `ham`:
/// dia -> adi: `C_adi = U^+ C_dia`, adi -> dia: `C_dia = U C_adi`
pub fn transform_amplitudes(
    rep_in: Representation,
    rep_out: Representation,
    coefficients: ArrayView2<c64>,
    ham: &HamiltonianHierarchy,
) -> Array2<c64> {
    if rep_in == rep_out {
        return coefficients.to_owned();
    }
    let ntraj: usize = coefficients.ncols();
    let nout: usize = match rep_out {
        Representation::Diabatic => ham.child(0).ndia(),
        Representation::Adiabatic => ham.child(0).nadi(),
    };
    let mut transformed: Array2<c64> = Array2::zeros((nout, ntraj));
    for (traj, mut column) in transformed.axis_iter_mut(Axis(1)).enumerate() {
        let u: &Array2<c64> = &ham.child(traj).basis_transform;
        let c: ArrayView1<c64> = coefficients.column(traj);
        match rep_out {
            Representation::Adiabatic => column.assign(&dagger(u.view()).dot(&c)),
            Representation::Diabatic => column.assign(&u.dot(&c)),
        }
    }
    transformed
}

/// Evaluate the Hamiltonian at the coordinates `q` and fill the amplitudes of
/// `rep_out` from those of `rep_in`. Returns the evaluated hierarchy.
pub fn init_amplitudes(
    q: ArrayView2<f64>,
    cdia: &mut Array2<c64>,
    cadi: &mut Array2<c64>,
    adapter: &dyn HamiltonianAdapter,
    request: &ModelRequest,
    rep_in: Representation,
    rep_out: Representation,
) -> Result<HamiltonianHierarchy, DynamicsError> {
    let ham: HamiltonianHierarchy = adapter.compute_model(q, request)?;
    match (rep_in, rep_out) {
        (Representation::Diabatic, Representation::Adiabatic) => {
            *cadi = transform_amplitudes(rep_in, rep_out, cdia.view(), &ham);
        }
        (Representation::Adiabatic, Representation::Diabatic) => {
            *cdia = transform_amplitudes(rep_in, rep_out, cadi.view(), &ham);
        }
        _ => {}
    }
    Ok(ham)
}

/// Raw adiabatic amplitudes to the dynamically consistent basis, `P^+ C`
pub fn raw_to_dynconsyst(coefficients: ArrayView2<c64>, projectors: &[Array2<c64>]) -> Array2<c64> {
    let mut transformed: Array2<c64> = Array2::zeros(coefficients.raw_dim());
    for (traj, mut column) in transformed.axis_iter_mut(Axis(1)).enumerate() {
        let proj: &Array2<c64> = projector(projectors, traj);
        column.assign(&dagger(proj.view()).dot(&coefficients.column(traj)));
    }
    transformed
}

/// Dynamically consistent amplitudes to the raw adiabatic basis, `P C`
pub fn dynconsyst_to_raw(coefficients: ArrayView2<c64>, projectors: &[Array2<c64>]) -> Array2<c64> {
    let mut transformed: Array2<c64> = Array2::zeros(coefficients.raw_dim());
    for (traj, mut column) in transformed.axis_iter_mut(Axis(1)).enumerate() {
        let proj: &Array2<c64> = projector(projectors, traj);
        column.assign(&proj.dot(&coefficients.column(traj)));
    }
    transformed
}
