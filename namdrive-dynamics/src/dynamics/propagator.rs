use crate::dynamics::decoherence::{decoherence_from, DecoherenceCorrection};
use crate::dynamics::hopping::{
    acceptor_from, hop, proposal_from, rescaler_from, HopAcceptor, HopContext, HopProposal,
    MomentumRescaler,
};
use crate::dynamics::statistics::{consistent_hamiltonian, projector};
use crate::dynamics::thermostat::Thermostat;
use crate::dynamics::tracking::{tracker_from, update_projector_with, StateTracker};
use crate::errors::DynamicsError;
use crate::initialization::{
    ControlParameters, DecoherenceAlgorithm, DynamicalVariables, ForceMethod, Representation,
    TimeOverlapMethod, TshMethod,
};
use crate::interface::{HamiltonianAdapter, HamiltonianData, HamiltonianHierarchy, ModelRequest, Propagator};
use crate::utils::{c64, dagger, hermitize, norm_sqr, propagator_hermitian};
use log::debug;
use ndarray::prelude::*;
use rand::distributions::Standard;
use rand::rngs::StdRng;
use rand::Rng;
use rayon::prelude::*;

/// Velocity-verlet propagator for the nuclei combined with the exact
/// exponential integration of the electronic amplitudes. The algorithms of the
/// quantum-classical coupling are selected once from the [ControlParameters].
pub struct ReferencePropagator {
    tracker: Box<dyn StateTracker>,
    proposal: Box<dyn HopProposal>,
    acceptor: Box<dyn HopAcceptor>,
    rescaler: Box<dyn MomentumRescaler>,
    decoherence: Box<dyn DecoherenceCorrection>,
}

/// Result of the electronic step of one trajectory
struct ElectronicStep {
    /// propagated amplitudes in the representation of the TD-SE
    c: Array1<c64>,
    /// Hamiltonian of the step in the basis of the hops
    hvib_sh: Array2<c64>,
    /// energies of the states of the basis of the hops at the end of the step
    energies_sh: Array1<f64>,
}

impl ReferencePropagator {
    pub fn new(control: &ControlParameters) -> Self {
        ReferencePropagator {
            tracker: tracker_from(control.state_tracking),
            proposal: proposal_from(control.tsh_method),
            acceptor: acceptor_from(control),
            rescaler: rescaler_from(control.momenta_rescaling),
            decoherence: decoherence_from(control),
        }
    }
}

/// Express the amplitudes `c` of one trajectory given in `from` in the basis
/// `to`. Adiabatic amplitudes refer to the dynamically consistent basis.
fn convert(
    c: ArrayView1<c64>,
    from: Representation,
    to: Representation,
    data: &HamiltonianData,
    proj: &Array2<c64>,
) -> Array1<c64> {
    match (from, to) {
        (Representation::Adiabatic, Representation::Diabatic) => {
            data.basis_transform.dot(&proj.dot(&c))
        }
        (Representation::Diabatic, Representation::Adiabatic) => {
            dagger(proj.view()).dot(&dagger(data.basis_transform.view()).dot(&c))
        }
        _ => c.to_owned(),
    }
}

fn source_column(
    dyn_var: &DynamicalVariables,
    traj: usize,
    rep_tdse: Representation,
) -> ArrayView1<'_, c64> {
    match rep_tdse {
        Representation::Adiabatic => dyn_var.cadi.column(traj),
        Representation::Diabatic => dyn_var.cdia.column(traj),
    }
}

/// Forces `-dE/dq` on the nuclei of one trajectory
fn trajectory_forces(
    dyn_var: &DynamicalVariables,
    data: &HamiltonianData,
    traj: usize,
    control: &ControlParameters,
) -> Array1<f64> {
    let ndof: usize = dyn_var.ndof();
    let proj: &Array2<c64> = projector(&dyn_var.projectors, traj);
    let state: usize = dyn_var.act_states[traj];

    // the force is the negative expectation value of dH/dq for the vector c
    let (derivatives, c): (&[Array2<c64>], Array1<c64>) = match (control.force_method, control.rep_force) {
        (ForceMethod::None, _) => return Array1::zeros(ndof),
        (ForceMethod::StateSpecific, Representation::Adiabatic) => {
            (data.d1ham_adi.as_slice(), proj.column(state).to_owned())
        }
        (ForceMethod::StateSpecific, Representation::Diabatic) => {
            let mut unit: Array1<c64> = Array1::zeros(data.ndia());
            if state < unit.len() {
                unit[state] = c64::new(1.0, 0.0);
            }
            (data.d1ham_dia.as_slice(), unit)
        }
        (ForceMethod::Ehrenfest, Representation::Adiabatic) => {
            let c_cons: Array1<c64> = convert(
                source_column(dyn_var, traj, control.rep_tdse),
                control.rep_tdse,
                Representation::Adiabatic,
                data,
                proj,
            );
            (data.d1ham_adi.as_slice(), proj.dot(&c_cons))
        }
        (ForceMethod::Ehrenfest, Representation::Diabatic) => (
            data.d1ham_dia.as_slice(),
            convert(
                source_column(dyn_var, traj, control.rep_tdse),
                control.rep_tdse,
                Representation::Diabatic,
                data,
                proj,
            ),
        ),
    };

    let norm: f64 = norm_sqr(c.view());
    let c_conj: Array1<c64> = c.mapv(|val| val.conj());
    Array1::from_shape_fn(ndof, |dof| match derivatives.get(dof) {
        Some(d1ham) if norm > 0.0 => -c_conj.dot(&d1ham.dot(&c)).re / norm,
        _ => 0.0,
    })
}

/// Forces on all trajectories, ndof x ntraj. Constrained DOFs feel no force.
fn compute_forces(
    dyn_var: &DynamicalVariables,
    ham: &HamiltonianHierarchy,
    control: &ControlParameters,
) -> Array2<f64> {
    let (ndof, ntraj): (usize, usize) = dyn_var.q.dim();
    let mut forces: Array2<f64> = Array2::zeros((ndof, ntraj));
    if control.force_method == ForceMethod::None {
        return forces;
    }
    let columns: Vec<Array1<f64>> = (0..ntraj)
        .into_par_iter()
        .map(|traj| trajectory_forces(dyn_var, ham.child(traj), traj, control))
        .collect();
    for (traj, column) in columns.iter().enumerate() {
        forces.column_mut(traj).assign(column);
    }
    freeze_dofs(&mut forces, &control.constrained_dofs);
    forces
}

fn freeze_dofs(values: &mut Array2<f64>, dofs: &[usize]) {
    for dof in dofs.iter() {
        values.row_mut(*dof).fill(0.0);
    }
}

/// Overlap `U(t-dt)^+ U(t)` of the raw adiabatic states of two snapshots
fn raw_time_overlap(
    old: &HamiltonianData,
    new: &HamiltonianData,
    method: TimeOverlapMethod,
) -> Result<Array2<c64>, DynamicsError> {
    match method {
        TimeOverlapMethod::OnTheFly => {
            Ok(dagger(old.basis_transform.view()).dot(&new.basis_transform))
        }
        TimeOverlapMethod::External => new.time_overlap_adi.clone().ok_or_else(|| {
            DynamicsError::PropagationFailure(
                "the model does not provide the time overlap of the adiabatic states".to_string(),
            )
        }),
    }
}

/// Integrate the TD-SE of one trajectory over one nuclear step. The
/// Hamiltonian is interpolated linearly between the two snapshots and every
/// substep is integrated with the exact exponential of the midpoint Hamiltonian.
fn electronic_step(
    c: ArrayView1<c64>,
    old: &HamiltonianData,
    new: &HamiltonianData,
    p_old: &Array2<c64>,
    p_new: &Array2<c64>,
    st_cons: &Array2<c64>,
    control: &ControlParameters,
) -> ElectronicStep {
    let dt: f64 = control.dt;
    let nsubsteps: usize = control.num_electronic_substeps.max(1);
    let energies_old: Array2<c64> = consistent_hamiltonian(old, p_old);
    let energies_new: Array2<c64> = consistent_hamiltonian(new, p_new);
    // -i (St - St^+) / (2 dt)
    let nac: Array2<c64> = (st_cons - &dagger(st_cons.view())) * c64::new(0.0, -0.5 / dt);

    let (h_start, h_end, coupling): (&Array2<c64>, &Array2<c64>, Option<&Array2<c64>>) =
        match control.rep_tdse {
            Representation::Adiabatic => (&energies_old, &energies_new, Some(&nac)),
            Representation::Diabatic => (&old.ham_dia, &new.ham_dia, None),
        };

    let mut c: Array1<c64> = c.to_owned();
    for substep in 0..nsubsteps {
        let weight: f64 = (substep as f64 + 0.5) / nsubsteps as f64;
        let mut hamiltonian: Array2<c64> =
            h_start * c64::new(1.0 - weight, 0.0) + h_end * c64::new(weight, 0.0);
        if let Some(nac) = coupling {
            hamiltonian += nac;
        }
        let step: Array2<c64> =
            propagator_hermitian(hermitize(hamiltonian.view()).view(), dt / nsubsteps as f64);
        c = step.dot(&c);
    }

    let (hvib_sh, energies_sh): (Array2<c64>, Array1<f64>) = match control.rep_sh {
        Representation::Adiabatic => (
            (&energies_old + &energies_new) * c64::new(0.5, 0.0) + &nac,
            energies_new.diag().mapv(|val| val.re),
        ),
        Representation::Diabatic => (
            (&old.ham_dia + &new.ham_dia) * c64::new(0.5, 0.0),
            new.ham_dia.diag().mapv(|val| val.re),
        ),
    };

    ElectronicStep {
        c,
        hvib_sh,
        energies_sh,
    }
}

fn quantum_kinetic_energy(p: ArrayView1<f64>, i_m: ArrayView1<f64>, dofs: &[usize]) -> f64 {
    0.5 * dofs.iter().map(|dof| p[*dof] * p[*dof] * i_m[*dof]).sum::<f64>()
}

impl Propagator for ReferencePropagator {
    fn advance(
        &mut self,
        dyn_var: &mut DynamicalVariables,
        ham: &mut HamiltonianHierarchy,
        adapter: &dyn HamiltonianAdapter,
        request: &ModelRequest,
        control: &ControlParameters,
        rng: &mut StdRng,
        thermostats: &mut [Box<dyn Thermostat>],
    ) -> Result<(), DynamicsError> {
        let ntraj: usize = dyn_var.ntraj();
        let dt: f64 = control.dt;
        if !thermostats.is_empty() && thermostats.len() != ntraj {
            return Err(DynamicsError::invalid(format!(
                "{} thermostats were given for {} trajectories",
                thermostats.len(),
                ntraj
            )));
        }

        // first half step of the momenta and full step of the coordinates
        let forces: Array2<f64> = compute_forces(dyn_var, ham, control);
        dyn_var.p.scaled_add(0.5 * dt, &forces);
        freeze_dofs(&mut dyn_var.p, &control.constrained_dofs);
        let velocities: Array2<f64> = &dyn_var.p * &dyn_var.i_m;
        dyn_var.q.scaled_add(dt, &velocities);

        // amplitudes in the basis of the hops before the electronic step
        let c_sh_old: Vec<Array1<c64>> = (0..ntraj)
            .map(|traj| {
                convert(
                    source_column(dyn_var, traj, control.rep_tdse),
                    control.rep_tdse,
                    control.rep_sh,
                    ham.child(traj),
                    projector(&dyn_var.projectors, traj),
                )
            })
            .collect();

        // electronic structure at the new geometry
        let new_ham: HamiltonianHierarchy = adapter.compute_model(dyn_var.q.view(), request)?;
        if new_ham.nchildren() != ham.nchildren() {
            return Err(DynamicsError::PropagationFailure(format!(
                "the model returned {} children, but {} were expected",
                new_ham.nchildren(),
                ham.nchildren()
            )));
        }
        let old_ham: HamiltonianHierarchy = std::mem::replace(ham, new_ham);
        let ham_now: &HamiltonianHierarchy = ham;

        // continuation of the state identities and phases
        let tracker: &dyn StateTracker = self.tracker.as_ref();
        let (new_projectors, st_cons): (Vec<Array2<c64>>, Vec<Array2<c64>>) = (0..dyn_var
            .projectors
            .len())
            .into_par_iter()
            .map(|idx| {
                let st_raw: Array2<c64> = raw_time_overlap(
                    old_ham.child(idx),
                    ham_now.child(idx),
                    control.time_overlap_method,
                )?;
                Ok(update_projector_with(
                    st_raw.view(),
                    dyn_var.projectors[idx].view(),
                    tracker,
                    control,
                ))
            })
            .collect::<Result<Vec<(Array2<c64>, Array2<c64>)>, DynamicsError>>()?
            .into_iter()
            .unzip();
        let old_projectors: Vec<Array2<c64>> =
            std::mem::replace(&mut dyn_var.projectors, new_projectors);

        // electronic step
        let steps: Vec<ElectronicStep> = (0..ntraj)
            .into_par_iter()
            .map(|traj| {
                electronic_step(
                    source_column(dyn_var, traj, control.rep_tdse),
                    old_ham.child(traj),
                    ham_now.child(traj),
                    projector(&old_projectors, traj),
                    projector(&dyn_var.projectors, traj),
                    projector(&st_cons, traj),
                    control,
                )
            })
            .collect();
        for (traj, step) in steps.iter().enumerate() {
            match control.rep_tdse {
                Representation::Adiabatic => dyn_var.cadi.column_mut(traj).assign(&step.c),
                Representation::Diabatic => dyn_var.cdia.column_mut(traj).assign(&step.c),
            }
        }

        // second half step of the momenta
        let forces: Array2<f64> = compute_forces(dyn_var, ham, control);
        dyn_var.p.scaled_add(0.5 * dt, &forces);
        freeze_dofs(&mut dyn_var.p, &control.constrained_dofs);

        // surface hopping and decoherence
        for (traj, step) in steps.iter().enumerate() {
            let data: &HamiltonianData = ham.child(traj);
            let proj: &Array2<c64> = projector(&dyn_var.projectors, traj);
            let mut c_sh: Array1<c64> = convert(
                source_column(dyn_var, traj, control.rep_tdse),
                control.rep_tdse,
                control.rep_sh,
                data,
                proj,
            );
            let old_state: usize = dyn_var.act_states[traj];

            let mut proposed: usize = old_state;
            if control.tsh_method != TshMethod::Adiabatic {
                let ctx = HopContext {
                    c_old: c_sh_old[traj].view(),
                    c_new: c_sh.view(),
                    hvib: step.hvib_sh.view(),
                    state: old_state,
                    dt,
                };
                let probabilities: Array1<f64> = self.proposal.probabilities(&ctx);
                let ksi: f64 = rng.sample(Standard);
                proposed = hop(probabilities.view(), old_state, ksi);
            }

            let mut new_state: usize = old_state;
            if proposed != old_state {
                let kinetic_energy: f64 = quantum_kinetic_energy(
                    dyn_var.p.column(traj),
                    dyn_var.i_m.column(0),
                    &control.quantum_dofs,
                );
                if self.acceptor.accept(
                    step.energies_sh.view(),
                    old_state,
                    proposed,
                    kinetic_energy,
                    rng,
                ) {
                    new_state = self.rescaler.rescale(
                        dyn_var.p.column_mut(traj),
                        dyn_var.i_m.column(0),
                        &control.quantum_dofs,
                        step.energies_sh.view(),
                        old_state,
                        proposed,
                    );
                }
                debug!(
                    "trajectory {}: hop {} -> {} proposed, active state {}",
                    traj, old_state, proposed, new_state
                );
            }

            if control.decoherence != DecoherenceAlgorithm::None {
                let kinetic_energy: f64 = quantum_kinetic_energy(
                    dyn_var.p.column(traj),
                    dyn_var.i_m.column(0),
                    &control.quantum_dofs,
                );
                self.decoherence.apply(
                    c_sh.view_mut(),
                    step.energies_sh.view(),
                    new_state,
                    proposed != old_state,
                    kinetic_energy,
                    dt,
                );
                let c: Array1<c64> =
                    convert(c_sh.view(), control.rep_sh, control.rep_tdse, data, proj);
                match control.rep_tdse {
                    Representation::Adiabatic => dyn_var.cadi.column_mut(traj).assign(&c),
                    Representation::Diabatic => dyn_var.cdia.column_mut(traj).assign(&c),
                }
            }
            dyn_var.act_states[traj] = new_state;
        }

        // coupling to the bath
        for (traj, thermostat) in thermostats.iter_mut().enumerate() {
            thermostat.scale_momenta(dyn_var.p.column_mut(traj), dyn_var.i_m.column(0));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initialization::DynamicConfiguration;
    use crate::utils::{complex_eye, unitarity_error};
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    /// Tully's single avoided crossing
    struct AvoidedCrossing;

    impl HamiltonianAdapter for AvoidedCrossing {
        fn compute_single(
            &self,
            q: ArrayView1<f64>,
            _request: &ModelRequest,
        ) -> Result<HamiltonianData, DynamicsError> {
            let x: f64 = q[0];
            let (a, b, c, d): (f64, f64, f64, f64) = (0.01, 1.6, 0.005, 1.0);
            let (v11, dv11): (f64, f64) = if x >= 0.0 {
                (a * (1.0 - (-b * x).exp()), a * b * (-b * x).exp())
            } else {
                (-a * (1.0 - (b * x).exp()), a * b * (b * x).exp())
            };
            let v12: f64 = c * (-d * x * x).exp();
            let dv12: f64 = -2.0 * d * x * v12;
            let ham: Array2<c64> = array![[v11, v12], [v12, -v11]].mapv(|val| c64::new(val, 0.0));
            let d1ham: Array2<c64> =
                array![[dv11, dv12], [dv12, -dv11]].mapv(|val| c64::new(val, 0.0));
            Ok(HamiltonianData::from_diabatic(ham, vec![d1ham]))
        }
    }

    /// Constant Hamiltonian whose second eigenvector flips its sign on every
    /// odd timestep
    struct SignFlipping;

    impl HamiltonianAdapter for SignFlipping {
        fn compute_single(
            &self,
            _q: ArrayView1<f64>,
            request: &ModelRequest,
        ) -> Result<HamiltonianData, DynamicsError> {
            let ham: Array2<c64> =
                array![[-0.01, 0.0], [0.0, 0.01]].mapv(|val| c64::new(val, 0.0));
            let mut data = HamiltonianData::from_diabatic(ham, vec![Array2::zeros((2, 2))]);
            if request.timestep % 2 == 1 {
                data.basis_transform
                    .column_mut(1)
                    .mapv_inplace(|val| -val);
            }
            Ok(data)
        }
    }

    fn control(config: DynamicConfiguration) -> ControlParameters {
        config.validate(1).unwrap()
    }

    fn variables(q: f64, p: f64, ntraj: usize, state: usize) -> DynamicalVariables {
        let mut cadi: Array2<c64> = Array2::zeros((2, ntraj));
        cadi.row_mut(state).fill(c64::new(1.0, 0.0));
        DynamicalVariables::new(
            Array2::from_elem((1, ntraj), q),
            Array2::from_elem((1, ntraj), p),
            array![[1.0 / 2000.0]],
            Array2::zeros((2, ntraj)),
            cadi,
            vec![state; ntraj],
            vec![complex_eye(2); ntraj],
        )
    }

    fn request(timestep: usize, nchildren: usize) -> ModelRequest {
        ModelRequest {
            timestep,
            nchildren,
            rep_ham: Representation::Diabatic,
        }
    }

    #[test]
    fn avoided_crossing_keeps_projectors_unitary_and_amplitudes_normalized() {
        let mut config = DynamicConfiguration::default();
        config.dt = 10.0;
        config.hopping.tsh_method = 0;
        config.hopping.momenta_rescaling_algo = 101;
        let control: ControlParameters = control(config);
        let mut dyn_var: DynamicalVariables = variables(-4.0, 20.0, 3, 0);
        let adapter = AvoidedCrossing;
        let mut ham: HamiltonianHierarchy =
            adapter.compute_model(dyn_var.q.view(), &request(0, 3)).unwrap();
        let mut propagator = ReferencePropagator::new(&control);
        let mut rng: StdRng = StdRng::seed_from_u64(7);

        for step in 0..300 {
            propagator
                .advance(
                    &mut dyn_var,
                    &mut ham,
                    &adapter,
                    &request(step, 3),
                    &control,
                    &mut rng,
                    &mut [],
                )
                .unwrap();
        }
        for traj in 0..3 {
            assert!(unitarity_error(dyn_var.projectors[traj].view()) < 1e-10);
            assert_abs_diff_eq!(norm_sqr(dyn_var.cadi.column(traj)), 1.0, epsilon = 1e-8);
        }
        // the trajectories went through the crossing region
        assert!(dyn_var.q.iter().all(|x| *x > 0.0));
    }

    #[test]
    fn energy_is_conserved_on_a_single_surface() {
        let mut config = DynamicConfiguration::default();
        config.dt = 5.0;
        let control: ControlParameters = control(config);
        let mut dyn_var: DynamicalVariables = variables(-2.0, 15.0, 1, 0);
        let adapter = AvoidedCrossing;
        let mut ham: HamiltonianHierarchy =
            adapter.compute_model(dyn_var.q.view(), &request(0, 1)).unwrap();
        let energy = |dyn_var: &DynamicalVariables, ham: &HamiltonianHierarchy| -> f64 {
            let ham_cons: Array2<c64> =
                consistent_hamiltonian(ham.child(0), &dyn_var.projectors[0]);
            0.5 * dyn_var.p[[0, 0]].powi(2) * dyn_var.i_m[[0, 0]]
                + ham_cons[[dyn_var.act_states[0], dyn_var.act_states[0]]].re
        };
        let e_start: f64 = energy(&dyn_var, &ham);
        let mut propagator = ReferencePropagator::new(&control);
        let mut rng: StdRng = StdRng::seed_from_u64(1);
        for step in 0..200 {
            propagator
                .advance(&mut dyn_var, &mut ham, &adapter, &request(step, 1), &control, &mut rng, &mut [])
                .unwrap();
        }
        assert_abs_diff_eq!(energy(&dyn_var, &ham), e_start, epsilon = 1e-4);
    }

    #[test]
    fn sign_flip_of_the_model_is_compensated() {
        let mut config = DynamicConfiguration::default();
        config.force_method = 0;
        let control: ControlParameters = control(config);
        let mut dyn_var: DynamicalVariables = variables(0.0, 0.0, 1, 0);
        dyn_var.cadi = array![[c64::new(0.6, 0.0)], [c64::new(0.8, 0.0)]];
        let adapter = SignFlipping;
        let mut ham: HamiltonianHierarchy =
            adapter.compute_model(dyn_var.q.view(), &request(0, 1)).unwrap();
        let mut propagator = ReferencePropagator::new(&control);
        let mut rng: StdRng = StdRng::seed_from_u64(3);
        propagator
            .advance(&mut dyn_var, &mut ham, &adapter, &request(1, 1), &control, &mut rng, &mut [])
            .unwrap();

        assert_abs_diff_eq!(dyn_var.projectors[0][[1, 1]].re, -1.0, epsilon = 1e-12);
        // without couplings only the dynamical phases change
        assert_abs_diff_eq!(dyn_var.cadi[[0, 0]].norm(), 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(dyn_var.cadi[[1, 0]].norm(), 0.8, epsilon = 1e-12);
    }

    #[test]
    fn missing_external_time_overlap_is_a_failure() {
        let mut config = DynamicConfiguration::default();
        config.time_overlap_method = 1;
        let control: ControlParameters = control(config);
        let mut dyn_var: DynamicalVariables = variables(0.0, 0.0, 1, 0);
        let adapter = SignFlipping;
        let mut ham: HamiltonianHierarchy =
            adapter.compute_model(dyn_var.q.view(), &request(0, 1)).unwrap();
        let mut propagator = ReferencePropagator::new(&control);
        let mut rng: StdRng = StdRng::seed_from_u64(3);
        let result = propagator.advance(
            &mut dyn_var,
            &mut ham,
            &adapter,
            &request(1, 1),
            &control,
            &mut rng,
            &mut [],
        );
        assert!(matches!(result, Err(DynamicsError::PropagationFailure(_))));
    }

    #[test]
    fn constrained_dofs_do_not_move() {
        let mut config = DynamicConfiguration::default();
        config.constrained_dofs = vec![0];
        let control: ControlParameters = control(config);
        let mut dyn_var: DynamicalVariables = variables(0.5, 0.0, 1, 0);
        let adapter = AvoidedCrossing;
        let mut ham: HamiltonianHierarchy =
            adapter.compute_model(dyn_var.q.view(), &request(0, 1)).unwrap();
        let mut propagator = ReferencePropagator::new(&control);
        let mut rng: StdRng = StdRng::seed_from_u64(3);
        for step in 0..5 {
            propagator
                .advance(&mut dyn_var, &mut ham, &adapter, &request(step, 1), &control, &mut rng, &mut [])
                .unwrap();
        }
        assert_eq!(dyn_var.q[[0, 0]], 0.5);
        assert_eq!(dyn_var.p[[0, 0]], 0.0);
    }
}
