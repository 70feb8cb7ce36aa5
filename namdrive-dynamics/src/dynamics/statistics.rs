use crate::initialization::Representation;
use crate::interface::{HamiltonianData, HamiltonianHierarchy};
use crate::utils::{c64, dagger};
use ndarray::prelude::*;
use rayon::prelude::*;

/// Ensemble averages of the kinetic, potential and total energies and their
/// standard deviations over the trajectories
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnergyAggregates {
    pub ekin: f64,
    pub epot: f64,
    pub etot: f64,
    pub d_ekin: f64,
    pub d_epot: f64,
    pub d_etot: f64,
}

impl EnergyAggregates {
    fn from_samples(ekin: &[f64], epot: &[f64]) -> Self {
        let etot: Vec<f64> = ekin.iter().zip(epot.iter()).map(|(k, v)| k + v).collect();
        let (ekin_ave, d_ekin): (f64, f64) = mean_and_deviation(ekin);
        let (epot_ave, d_epot): (f64, f64) = mean_and_deviation(epot);
        let (etot_ave, d_etot): (f64, f64) = mean_and_deviation(&etot);
        EnergyAggregates {
            ekin: ekin_ave,
            epot: epot_ave,
            etot: etot_ave,
            d_ekin,
            d_epot,
            d_etot,
        }
    }
}

fn mean_and_deviation(values: &[f64]) -> (f64, f64) {
    let n: f64 = values.len() as f64;
    let mean: f64 = values.iter().sum::<f64>() / n;
    let variance: f64 = values.iter().map(|val| (val - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Projector of trajectory `traj`, shared in reduced mode
pub(crate) fn projector(projectors: &[Array2<c64>], traj: usize) -> &Array2<c64> {
    if projectors.len() == 1 {
        &projectors[0]
    } else {
        &projectors[traj]
    }
}

fn outer(c: ArrayView1<c64>) -> Array2<c64> {
    let n: usize = c.len();
    Array2::from_shape_fn((n, n), |(i, j)| c[i] * c[j].conj())
}

/// Adiabatic Hamiltonian in the dynamically consistent basis, `P^+ H_adi P`
pub fn consistent_hamiltonian(data: &HamiltonianData, proj: &Array2<c64>) -> Array2<c64> {
    dagger(proj.view()).dot(&data.ham_adi).dot(proj)
}

/// Kinetic energy of the momenta `p` of one trajectory
pub fn kinetic_energy(p: ArrayView1<f64>, i_m: ArrayView1<f64>) -> f64 {
    0.5 * p.iter().zip(i_m.iter()).map(|(p, im)| p * p * im).sum::<f64>()
}

/// The consistent and raw adiabatic and the diabatic amplitudes of one
/// trajectory, derived from the propagated representation
fn amplitudes(
    data: &HamiltonianData,
    proj: &Array2<c64>,
    cdia: ArrayView1<c64>,
    cadi: ArrayView1<c64>,
    rep_tdse: Representation,
) -> (Array1<c64>, Array1<c64>, Array1<c64>) {
    let u: &Array2<c64> = &data.basis_transform;
    match rep_tdse {
        Representation::Adiabatic => {
            let c_raw: Array1<c64> = proj.dot(&cadi);
            let c_dia: Array1<c64> = u.dot(&c_raw);
            (cadi.to_owned(), c_raw, c_dia)
        }
        Representation::Diabatic => {
            let c_raw: Array1<c64> = dagger(u.view()).dot(&cdia);
            let c_cons: Array1<c64> = dagger(proj.view()).dot(&c_raw);
            (c_cons, c_raw, cdia.to_owned())
        }
    }
}

/// Ensemble-averaged density matrices `(dm_dia, dm_adi, dm_dia_raw, dm_adi_raw)`.
///
/// `dm_adi` is built from the dynamically consistent amplitudes, `dm_adi_raw`
/// from the raw ones. `dm_dia` is the density of the diabatic amplitudes and
/// `dm_dia_raw` maps `dm_adi` with the raw transform, `U dm_adi U^+`; the two
/// differ while the projectors reorder the states.
pub fn compute_dm(
    ham: &HamiltonianHierarchy,
    cdia: ArrayView2<c64>,
    cadi: ArrayView2<c64>,
    projectors: &[Array2<c64>],
    rep_tdse: Representation,
) -> (Array2<c64>, Array2<c64>, Array2<c64>, Array2<c64>) {
    let ntraj: usize = cdia.ncols();
    let (ndia, nadi): (usize, usize) = (cdia.nrows(), cadi.nrows());
    let zeros = || {
        (
            Array2::<c64>::zeros((ndia, ndia)),
            Array2::<c64>::zeros((nadi, nadi)),
            Array2::<c64>::zeros((ndia, ndia)),
            Array2::<c64>::zeros((nadi, nadi)),
        )
    };

    let (dm_dia, dm_adi, dm_dia_raw, dm_adi_raw) = (0..ntraj)
        .into_par_iter()
        .map(|traj| {
            let data: &HamiltonianData = ham.child(traj);
            let proj: &Array2<c64> = projector(projectors, traj);
            let (c_cons, c_raw, c_dia) =
                amplitudes(data, proj, cdia.column(traj), cadi.column(traj), rep_tdse);
            let u: &Array2<c64> = &data.basis_transform;
            let c_dia_cons: Array1<c64> = u.dot(&c_cons);
            (
                outer(c_dia.view()),
                outer(c_cons.view()),
                outer(c_dia_cons.view()),
                outer(c_raw.view()),
            )
        })
        .reduce(zeros, |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2, a.3 + b.3));

    let norm: c64 = c64::new(1.0 / ntraj as f64, 0.0);
    (
        dm_dia * norm,
        dm_adi * norm,
        dm_dia_raw * norm,
        dm_adi_raw * norm,
    )
}

/// Fraction of trajectories in every consistent adiabatic state and the
/// corresponding populations of the raw states, `|P[j, s]|^2` weighted
pub fn compute_sh_statistics(
    nstates: usize,
    states: &[usize],
    projectors: &[Array2<c64>],
) -> (Array1<f64>, Array1<f64>) {
    let ntraj: usize = states.len();
    let weight: f64 = 1.0 / ntraj as f64;
    let mut pops: Array1<f64> = Array1::zeros(nstates);
    let mut pops_raw: Array1<f64> = Array1::zeros(nstates);
    for (traj, state) in states.iter().enumerate() {
        pops[*state] += weight;
        let proj: &Array2<c64> = projector(projectors, traj);
        if *state < proj.ncols() {
            for (raw, val) in proj.column(*state).iter().enumerate() {
                pops_raw[raw] += weight * val.norm_sqr();
            }
        }
    }
    (pops, pops_raw)
}

/// Energies of a surface hopping ensemble: the potential energy of every
/// trajectory is the consistent adiabatic energy of its active state.
pub fn compute_etot_tsh(
    ham: &HamiltonianHierarchy,
    p: ArrayView2<f64>,
    projectors: &[Array2<c64>],
    states: &[usize],
    i_m: ArrayView2<f64>,
) -> EnergyAggregates {
    let (ekin, epot): (Vec<f64>, Vec<f64>) = (0..p.ncols())
        .into_par_iter()
        .map(|traj| {
            let ham_cons: Array2<c64> =
                consistent_hamiltonian(ham.child(traj), projector(projectors, traj));
            let state: usize = states[traj];
            (
                kinetic_energy(p.column(traj), i_m.column(0)),
                ham_cons[[state, state]].re,
            )
        })
        .unzip();
    EnergyAggregates::from_samples(&ekin, &epot)
}

/// Energies of an Ehrenfest ensemble: the potential energy of every
/// trajectory is the expectation value of the electronic Hamiltonian.
pub fn compute_etot(
    ham: &HamiltonianHierarchy,
    p: ArrayView2<f64>,
    cdia: ArrayView2<c64>,
    cadi: ArrayView2<c64>,
    projectors: &[Array2<c64>],
    i_m: ArrayView2<f64>,
    rep_tdse: Representation,
) -> EnergyAggregates {
    let (ekin, epot): (Vec<f64>, Vec<f64>) = (0..p.ncols())
        .into_par_iter()
        .map(|traj| {
            let data: &HamiltonianData = ham.child(traj);
            let (c, h): (ArrayView1<c64>, Array2<c64>) = match rep_tdse {
                Representation::Adiabatic => (
                    cadi.column(traj),
                    consistent_hamiltonian(data, projector(projectors, traj)),
                ),
                Representation::Diabatic => (cdia.column(traj), data.ham_dia.clone()),
            };
            let norm: f64 = c.iter().map(|val| val.norm_sqr()).sum();
            let expectation: c64 = c.mapv(|val| val.conj()).dot(&h.dot(&c));
            let epot: f64 = if norm > 0.0 { expectation.re / norm } else { 0.0 };
            (kinetic_energy(p.column(traj), i_m.column(0)), epot)
        })
        .unzip();
    EnergyAggregates::from_samples(&ekin, &epot)
}
