use crate::dynamics::representation::{dynconsyst_to_raw, raw_to_dynconsyst, transform_amplitudes};
use crate::dynamics::statistics::{
    compute_dm, compute_etot, compute_etot_tsh, compute_sh_statistics, EnergyAggregates,
};
use crate::dynamics::thermostat::{create_thermostats, Thermostat};
use crate::errors::DynamicsError;
use crate::initialization::{
    ControlParameters, DynamicalVariables, ForceMethod, Representation, TimeOverlapMethod,
};
use crate::interface::{HamiltonianAdapter, HamiltonianHierarchy, ModelRequest, Propagator};
use crate::output::{
    print_footer_dynamics, print_header_dynamics, print_progress, MemorySaver, Observable,
    OutputSinks, Property,
};
use crate::utils::{c64, complex_eye, dagger};
use log::debug;
use ndarray::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::time::Instant;

/// Index of the tabulated snapshot used in step `step`
pub fn file_index(step: usize, icond: usize, nfiles: usize) -> usize {
    (step + icond) % nfiles.max(1)
}

/// Drives the ensemble through the steps of one run. It owns everything that
/// persists between steps apart from the dynamical variables: the current
/// Hamiltonian, the basis transforms of the previous step, the time overlaps,
/// the thermostats and the output sinks.
pub struct PropagationEngine<'a> {
    control: &'a ControlParameters,
    adapter: &'a dyn HamiltonianAdapter,
    ham: HamiltonianHierarchy,
    basis_history: Vec<Array2<c64>>,
    time_overlaps: Vec<Array2<c64>>,
    thermostats: Vec<Box<dyn Thermostat>>,
    sinks: OutputSinks,
}

impl<'a> PropagationEngine<'a> {
    /// Check the dynamical variables, evaluate the Hamiltonian at the initial
    /// geometry and open the output sinks
    pub fn new(
        dyn_var: &DynamicalVariables,
        adapter: &'a dyn HamiltonianAdapter,
        control: &'a ControlParameters,
    ) -> Result<Self, DynamicsError> {
        dyn_var.check_dimensions(control.is_nbra, control.rep_sh)?;
        let ntraj: usize = dyn_var.ntraj();
        let request = ModelRequest {
            timestep: control.icond,
            nchildren: if control.is_nbra { 1 } else { ntraj },
            rep_ham: control.rep_ham,
        };
        let ham: HamiltonianHierarchy = adapter.compute_model(dyn_var.q.view(), &request)?;
        if ham.nchildren() != request.nchildren {
            return Err(DynamicsError::PropagationFailure(format!(
                "the model returned {} children, but {} were requested",
                ham.nchildren(),
                request.nchildren
            )));
        }
        let data = ham.child(0);
        if data.ndia() != dyn_var.ndia() || data.nadi() != dyn_var.nadi() {
            return Err(DynamicsError::invalid(format!(
                "the model has {} diabatic and {} adiabatic states, but the amplitudes have {} and {}",
                data.ndia(),
                data.nadi(),
                dyn_var.ndia(),
                dyn_var.nadi()
            )));
        }

        let basis_history: Vec<Array2<c64>> = ham
            .children
            .iter()
            .map(|child| child.basis_transform.clone())
            .collect();
        let time_overlaps: Vec<Array2<c64>> = vec![complex_eye(dyn_var.nadi()); ham.nchildren()];

        Ok(PropagationEngine {
            control,
            adapter,
            ham,
            basis_history,
            time_overlaps,
            thermostats: create_thermostats(control, ntraj),
            sinks: OutputSinks::from_control(control)?,
        })
    }

    pub fn hamiltonian(&self) -> &HamiltonianHierarchy {
        &self.ham
    }

    pub fn time_overlaps(&self) -> &[Array2<c64>] {
        &self.time_overlaps
    }

    /// Recompute the amplitudes of the representation that is not propagated
    pub fn reconcile(&self, dyn_var: &mut DynamicalVariables) {
        match self.control.rep_tdse {
            Representation::Diabatic => {
                let cadi_raw: Array2<c64> = transform_amplitudes(
                    Representation::Diabatic,
                    Representation::Adiabatic,
                    dyn_var.cdia.view(),
                    &self.ham,
                );
                dyn_var.cadi = raw_to_dynconsyst(cadi_raw.view(), &dyn_var.projectors);
            }
            Representation::Adiabatic => {
                let cadi_raw: Array2<c64> =
                    dynconsyst_to_raw(dyn_var.cadi.view(), &dyn_var.projectors);
                dyn_var.cdia = transform_amplitudes(
                    Representation::Adiabatic,
                    Representation::Diabatic,
                    cadi_raw.view(),
                    &self.ham,
                );
            }
        }
    }

    /// Energy aggregates of the ensemble. Reduced runs report zero energies.
    pub fn energies(&self, dyn_var: &DynamicalVariables) -> EnergyAggregates {
        if self.control.is_nbra {
            return EnergyAggregates::default();
        }
        match self.control.force_method {
            ForceMethod::Ehrenfest => compute_etot(
                &self.ham,
                dyn_var.p.view(),
                dyn_var.cdia.view(),
                dyn_var.cadi.view(),
                &dyn_var.projectors,
                dyn_var.i_m.view(),
                self.control.rep_tdse,
            ),
            _ => compute_etot_tsh(
                &self.ham,
                dyn_var.p.view(),
                &dyn_var.projectors,
                &dyn_var.act_states,
                dyn_var.i_m.view(),
            ),
        }
    }

    /// Bath energy averaged over the trajectories
    fn thermostat_energy(&self) -> f64 {
        if self.thermostats.is_empty() {
            return 0.0;
        }
        self.thermostats.iter().map(|thermostat| thermostat.energy()).sum::<f64>()
            / self.thermostats.len() as f64
    }

    /// Emit the ensemble observables of levels 1 to 3
    fn emit_statistics(&mut self, step: usize, dyn_var: &DynamicalVariables) -> Result<(), DynamicsError> {
        if self.sinks.is_empty() {
            return Ok(());
        }
        let energies: EnergyAggregates = self.energies(dyn_var);
        let etherm: f64 = self.thermostat_energy();
        let time: f64 = step as f64 * self.control.dt;
        let sinks: &mut OutputSinks = &mut self.sinks;

        sinks.emit(step, None, Property::Timestep, || Observable::Scalar(step as f64))?;
        sinks.emit(step, None, Property::Time, || Observable::Scalar(time))?;
        sinks.emit(step, None, Property::EkinAve, || Observable::Scalar(energies.ekin))?;
        sinks.emit(step, None, Property::EpotAve, || Observable::Scalar(energies.epot))?;
        sinks.emit(step, None, Property::EtotAve, || Observable::Scalar(energies.etot))?;
        sinks.emit(step, None, Property::DEkinAve, || Observable::Scalar(energies.d_ekin))?;
        sinks.emit(step, None, Property::DEpotAve, || Observable::Scalar(energies.d_epot))?;
        sinks.emit(step, None, Property::DEtotAve, || Observable::Scalar(energies.d_etot))?;
        sinks.emit(step, None, Property::Etherm, || Observable::Scalar(etherm))?;
        sinks.emit(step, None, Property::ENhc, || {
            Observable::Scalar(energies.etot + etherm)
        })?;

        sinks.emit(step, None, Property::States, || {
            Observable::Indices(dyn_var.act_states.clone())
        })?;

        if sinks.max_level() < 3 {
            return Ok(());
        }
        let nstates: usize = match self.control.rep_sh {
            Representation::Adiabatic => dyn_var.nadi(),
            Representation::Diabatic => dyn_var.ndia(),
        };
        let (pops, pops_raw): (Array1<f64>, Array1<f64>) =
            compute_sh_statistics(nstates, &dyn_var.act_states, &dyn_var.projectors);
        let (dm_dia, dm_adi, dm_dia_raw, dm_adi_raw) = compute_dm(
            &self.ham,
            dyn_var.cdia.view(),
            dyn_var.cadi.view(),
            &dyn_var.projectors,
            self.control.rep_tdse,
        );
        sinks.emit(step, None, Property::ShPop, || Observable::vector(pops.view()))?;
        sinks.emit(step, None, Property::ShPopRaw, || Observable::vector(pops_raw.view()))?;
        sinks.emit(step, None, Property::DAdi, || Observable::complex(dm_adi.view()))?;
        sinks.emit(step, None, Property::DAdiRaw, || Observable::complex(dm_adi_raw.view()))?;
        sinks.emit(step, None, Property::DDia, || Observable::complex(dm_dia.view()))?;
        sinks.emit(step, None, Property::DDiaRaw, || Observable::complex(dm_dia_raw.view()))?;
        sinks.emit(step, None, Property::Q, || Observable::real(dyn_var.q.view()))?;
        sinks.emit(step, None, Property::P, || Observable::real(dyn_var.p.view()))?;
        sinks.emit(step, None, Property::Cadi, || Observable::complex(dyn_var.cadi.view()))?;
        sinks.emit(step, None, Property::Cdia, || Observable::complex(dyn_var.cdia.view()))?;
        Ok(())
    }

    /// Time overlaps of the raw adiabatic states with respect to the previous
    /// step, followed by the per-trajectory observables of level 4
    fn update_time_overlaps(
        &mut self,
        step: usize,
        dyn_var: &DynamicalVariables,
    ) -> Result<(), DynamicsError> {
        let ham: &HamiltonianHierarchy = &self.ham;
        match self.control.time_overlap_method {
            TimeOverlapMethod::OnTheFly => {
                self.time_overlaps
                    .par_iter_mut()
                    .zip(self.basis_history.par_iter_mut())
                    .enumerate()
                    .for_each(|(traj, (overlap, u_prev))| {
                        let u_now: &Array2<c64> = &ham.child(traj).basis_transform;
                        *overlap = dagger(u_prev.view()).dot(u_now);
                        u_prev.assign(u_now);
                    });
            }
            TimeOverlapMethod::External => {
                for (traj, overlap) in self.time_overlaps.iter_mut().enumerate() {
                    *overlap = ham.child(traj).time_overlap_adi.clone().ok_or_else(|| {
                        DynamicsError::PropagationFailure(format!(
                            "the model provides no time overlap for trajectory {} in step {}",
                            traj, step
                        ))
                    })?;
                }
            }
        }

        if self.sinks.max_level() < 4 {
            return Ok(());
        }
        for traj in 0..self.time_overlaps.len() {
            let data = ham.child(traj);
            let sinks: &mut OutputSinks = &mut self.sinks;
            sinks.emit(step, Some(traj), Property::HvibAdi, || {
                Observable::Complex(data.hvib_adi(dyn_var.p.column(traj), dyn_var.i_m.column(0)))
            })?;
            sinks.emit(step, Some(traj), Property::HvibDia, || {
                Observable::Complex(data.hvib_dia())
            })?;
            sinks.emit(step, Some(traj), Property::St, || {
                Observable::complex(self.time_overlaps[traj].view())
            })?;
            sinks.emit(step, Some(traj), Property::BasisTransform, || {
                Observable::complex(data.basis_transform.view())
            })?;
            sinks.emit(step, Some(traj), Property::Projector, || {
                Observable::complex(dyn_var.projector(traj).view())
            })?;
        }
        Ok(())
    }

    /// One iteration of the ensemble loop: reconcile the representations, emit
    /// the observables, update the time overlaps and advance by one step
    pub fn step(
        &mut self,
        step: usize,
        dyn_var: &mut DynamicalVariables,
        propagator: &mut dyn Propagator,
        rng: &mut StdRng,
    ) -> Result<(), DynamicsError> {
        if !self.control.is_nbra {
            self.reconcile(dyn_var);
        }
        self.emit_statistics(step, dyn_var)?;
        self.update_time_overlaps(step, dyn_var)?;

        let request = ModelRequest {
            timestep: file_index(step, self.control.icond, self.control.nfiles),
            nchildren: self.ham.nchildren(),
            rep_ham: self.control.rep_ham,
        };
        debug!("step {}: model snapshot {}", step, request.timestep);
        propagator.advance(
            dyn_var,
            &mut self.ham,
            self.adapter,
            &request,
            self.control,
            rng,
            &mut self.thermostats,
        )?;
        self.sinks.end_step(step)
    }

    /// Close the sinks, the in-memory data is written to disk and returned
    pub fn finalize(self) -> Result<Option<MemorySaver>, DynamicsError> {
        self.sinks.finalize()
    }
}

/// Propagate the ensemble `dyn_var` for `control.nsteps` steps. Returns the
/// in-memory output if a memory sink was configured.
pub fn run_dynamics(
    dyn_var: &mut DynamicalVariables,
    adapter: &dyn HamiltonianAdapter,
    propagator: &mut dyn Propagator,
    control: &ControlParameters,
    rng: &mut StdRng,
) -> Result<Option<MemorySaver>, DynamicsError> {
    let timer: Instant = Instant::now();
    print_header_dynamics(dyn_var.ntraj(), control);

    let mut engine = PropagationEngine::new(dyn_var, adapter, control)?;
    let frequency: usize = ((control.progress_frequency * control.nsteps as f64) as usize).max(1);
    for step in 0..control.nsteps {
        engine.step(step, dyn_var, propagator, rng)?;
        if (step + 1) % frequency == 0 {
            print_progress(step + 1, control.nsteps, timer.elapsed().as_secs_f64());
        }
    }
    let saver: Option<MemorySaver> = engine.finalize()?;

    print_footer_dynamics(timer.elapsed().as_secs_f64());
    Ok(saver)
}
