use crate::errors::DynamicsError;
use crate::initialization::DynamicConfiguration;
use crate::output::Property;
use log::warn;
use serde::{Deserialize, Serialize};

/// Electronic basis
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Representation {
    Diabatic,
    Adiabatic,
}

impl Representation {
    pub fn from_code(option: &str, code: i32) -> Result<Self, DynamicsError> {
        match code {
            0 => Ok(Representation::Diabatic),
            1 => Ok(Representation::Adiabatic),
            _ => Err(DynamicsError::unknown(option, code)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForceMethod {
    None,
    StateSpecific,
    Ehrenfest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeOverlapMethod {
    OnTheFly,
    External,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingAlgorithm {
    None,
    MaxOverlap,
    MinCost,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TshMethod {
    Adiabatic,
    Fssh,
    Gfsh,
    Mssh,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HopAcceptance {
    AcceptAll,
    AdiabaticEnergy,
    QuantumBoltzmann,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MomentumRescaling {
    None,
    Uniform { reverse_on_frustrated: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoherenceAlgorithm {
    None,
    EnergyBased,
    Instantaneous,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollapseOption {
    KeepPhase,
    ResetPhase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnsembleType {
    Nve,
    Nvt,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThermostatType {
    NoseHooverChain,
    Berendsen,
}

/// Validated, typed form of [DynamicConfiguration]. It is built once at the
/// start of a run; the propagation loop never inspects integer codes.
#[derive(Clone, Debug)]
pub struct ControlParameters {
    pub nsteps: usize,
    pub dt: f64,
    pub num_electronic_substeps: usize,
    pub rep_tdse: Representation,
    pub rep_ham: Representation,
    pub rep_sh: Representation,
    pub rep_force: Representation,
    pub force_method: ForceMethod,
    pub time_overlap_method: TimeOverlapMethod,
    pub do_phase_correction: bool,
    pub phase_correction_tol: f64,
    pub state_tracking: TrackingAlgorithm,
    pub tsh_method: TshMethod,
    pub hop_acceptance: HopAcceptance,
    pub momenta_rescaling: MomentumRescaling,
    pub decoherence: DecoherenceAlgorithm,
    pub decoherence_c_param: f64,
    pub decoherence_eps_param: f64,
    pub collapse_option: CollapseOption,
    pub ensemble: EnsembleType,
    pub temperature: f64,
    pub thermostat_type: ThermostatType,
    pub thermostat_tau: f64,
    pub nhc_size: usize,
    pub quantum_dofs: Vec<usize>,
    pub thermostat_dofs: Vec<usize>,
    pub constrained_dofs: Vec<usize>,
    pub is_nbra: bool,
    pub icond: usize,
    pub nfiles: usize,
    pub prefix: String,
    pub prefix2: String,
    pub mem_output_level: i32,
    pub txt_output_level: i32,
    pub txt2_output_level: i32,
    pub npz_output_level: i32,
    pub progress_frequency: f64,
    pub properties_to_save: Vec<Property>,
}

/// Log an unknown selector and continue with the fallback branch
fn or_fallback<T: std::fmt::Debug>(result: Result<T, DynamicsError>, fallback: T) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!("WARNING: {}, falling back to {:?}", err, fallback);
            fallback
        }
    }
}

fn check_dofs(name: &str, dofs: &[usize], ndof: usize) -> Result<(), DynamicsError> {
    if let Some(dof) = dofs.iter().find(|dof| **dof >= ndof) {
        return Err(DynamicsError::invalid(format!(
            "{} contains the index {}, but the system only has {} nuclear DOFs",
            name, dof, ndof
        )));
    }
    Ok(())
}

impl DynamicConfiguration {
    /// Convert the raw configuration into [ControlParameters] for a system with
    /// `ndof` nuclear degrees of freedom.
    ///
    /// Unknown representation, force-method, time-overlap, ensemble and
    /// thermostat codes are fatal, as are the known but unsupported DISH hops
    /// and A-FSSH, BCSH and MFSD decoherence. Other unknown algorithm
    /// selectors fall back to the branch that switches the algorithm off and
    /// are reported as warnings.
    pub fn validate(&self, ndof: usize) -> Result<ControlParameters, DynamicsError> {
        let rep_tdse = Representation::from_code("rep_tdse", self.rep_tdse).map_err(|e| e.promote())?;
        let rep_ham = Representation::from_code("rep_ham", self.rep_ham).map_err(|e| e.promote())?;
        let rep_sh = Representation::from_code("rep_sh", self.rep_sh).map_err(|e| e.promote())?;
        let rep_force =
            Representation::from_code("rep_force", self.rep_force).map_err(|e| e.promote())?;

        let force_method: ForceMethod = match self.force_method {
            0 => ForceMethod::None,
            1 => ForceMethod::StateSpecific,
            2 => ForceMethod::Ehrenfest,
            code => return Err(DynamicsError::unknown("force_method", code).promote()),
        };
        let time_overlap_method: TimeOverlapMethod = match self.time_overlap_method {
            0 => TimeOverlapMethod::OnTheFly,
            1 => TimeOverlapMethod::External,
            code => return Err(DynamicsError::unknown("time_overlap_method", code).promote()),
        };
        let ensemble: EnsembleType = match self.thermostat.ensemble {
            0 => EnsembleType::Nve,
            1 => EnsembleType::Nvt,
            code => return Err(DynamicsError::unknown("ensemble", code).promote()),
        };
        let thermostat_type: ThermostatType = match self.thermostat.thermostat_type {
            0 => ThermostatType::NoseHooverChain,
            1 => ThermostatType::Berendsen,
            code => return Err(DynamicsError::unknown("thermostat_type", code).promote()),
        };
        if self.hopping.tsh_method == 3 {
            return Err(DynamicsError::invalid("tsh_method = 3 (DISH) is not supported"));
        }
        if let code @ 2..=4 = self.decoherence.decoherence_algo {
            return Err(DynamicsError::invalid(format!(
                "decoherence_algo = {} (A-FSSH, BCSH, MFSD) is not supported",
                code
            )));
        }

        let state_tracking: TrackingAlgorithm = or_fallback(
            match self.state_tracking_algo {
                0 => Ok(TrackingAlgorithm::None),
                1 => Ok(TrackingAlgorithm::MaxOverlap),
                2 => Ok(TrackingAlgorithm::MinCost),
                code => Err(DynamicsError::unknown("state_tracking_algo", code)),
            },
            TrackingAlgorithm::None,
        );
        let tsh_method: TshMethod = or_fallback(
            match self.hopping.tsh_method {
                -1 => Ok(TshMethod::Adiabatic),
                0 => Ok(TshMethod::Fssh),
                1 => Ok(TshMethod::Gfsh),
                2 => Ok(TshMethod::Mssh),
                code => Err(DynamicsError::unknown("tsh_method", code)),
            },
            TshMethod::Adiabatic,
        );
        let hop_acceptance: HopAcceptance = or_fallback(
            match self.hopping.hop_acceptance_algo {
                0 => Ok(HopAcceptance::AcceptAll),
                10 => Ok(HopAcceptance::AdiabaticEnergy),
                31 => Ok(HopAcceptance::QuantumBoltzmann),
                code => Err(DynamicsError::unknown("hop_acceptance_algo", code)),
            },
            HopAcceptance::AcceptAll,
        );
        let momenta_rescaling: MomentumRescaling = or_fallback(
            match self.hopping.momenta_rescaling_algo {
                0 => Ok(MomentumRescaling::None),
                100 => Ok(MomentumRescaling::Uniform {
                    reverse_on_frustrated: false,
                }),
                101 => Ok(MomentumRescaling::Uniform {
                    reverse_on_frustrated: true,
                }),
                code => Err(DynamicsError::unknown("momenta_rescaling_algo", code)),
            },
            MomentumRescaling::None,
        );
        let decoherence: DecoherenceAlgorithm = or_fallback(
            match self.decoherence.decoherence_algo {
                -1 => Ok(DecoherenceAlgorithm::None),
                0 => Ok(DecoherenceAlgorithm::EnergyBased),
                1 => Ok(DecoherenceAlgorithm::Instantaneous),
                code => Err(DynamicsError::unknown("decoherence_algo", code)),
            },
            DecoherenceAlgorithm::None,
        );
        let collapse_option: CollapseOption = or_fallback(
            match self.decoherence.collapse_option {
                0 => Ok(CollapseOption::KeepPhase),
                1 => Ok(CollapseOption::ResetPhase),
                code => Err(DynamicsError::unknown("collapse_option", code)),
            },
            CollapseOption::KeepPhase,
        );

        if !(self.dt > 0.0) {
            return Err(DynamicsError::invalid(format!(
                "the timestep dt = {} should be positive",
                self.dt
            )));
        }
        if self.num_electronic_substeps == 0 {
            return Err(DynamicsError::invalid(
                "num_electronic_substeps is 0, should be at least 1",
            ));
        }
        if self.nfiles == 0 {
            return Err(DynamicsError::invalid("nfiles is 0, should be at least 1"));
        }
        if self.phase_correction_tol < 0.0 {
            return Err(DynamicsError::invalid(format!(
                "phase_correction_tol = {} should not be negative",
                self.phase_correction_tol
            )));
        }
        if ensemble == EnsembleType::Nvt && !(self.thermostat.tau > 0.0) {
            return Err(DynamicsError::invalid(format!(
                "the thermostat coupling time tau = {} should be positive",
                self.thermostat.tau
            )));
        }
        if ensemble == EnsembleType::Nvt
            && thermostat_type == ThermostatType::NoseHooverChain
            && self.thermostat.nhc_size == 0
        {
            return Err(DynamicsError::invalid(
                "NHC_size is 0, a Nose-Hoover chain needs at least 1 thermostat",
            ));
        }

        let quantum_dofs: Vec<usize> = match &self.quantum_dofs {
            Some(dofs) => dofs.clone(),
            None => (0..ndof).collect(),
        };
        check_dofs("quantum_dofs", &quantum_dofs, ndof)?;
        check_dofs("thermostat_dofs", &self.thermostat.thermostat_dofs, ndof)?;
        check_dofs("constrained_dofs", &self.constrained_dofs, ndof)?;

        let is_nbra: bool = match self.is_nbra {
            0 => false,
            1 => true,
            code => or_fallback(Err(DynamicsError::unknown("is_nbra", code)), false),
        };

        let mut properties_to_save: Vec<Property> = Vec::new();
        for name in self.output.properties_to_save.iter() {
            match Property::from_name(name) {
                Some(property) => properties_to_save.push(property),
                None => warn!("WARNING: the property `{}` is not known and is not saved", name),
            }
        }

        Ok(ControlParameters {
            nsteps: self.nsteps,
            dt: self.dt,
            num_electronic_substeps: self.num_electronic_substeps,
            rep_tdse,
            rep_ham,
            rep_sh,
            rep_force,
            force_method,
            time_overlap_method,
            do_phase_correction: self.do_phase_correction != 0,
            phase_correction_tol: self.phase_correction_tol,
            state_tracking,
            tsh_method,
            hop_acceptance,
            momenta_rescaling,
            decoherence,
            decoherence_c_param: self.decoherence.decoherence_c_param,
            decoherence_eps_param: self.decoherence.decoherence_eps_param,
            collapse_option,
            ensemble,
            temperature: self.thermostat.temperature,
            thermostat_type,
            thermostat_tau: self.thermostat.tau,
            nhc_size: self.thermostat.nhc_size,
            quantum_dofs,
            thermostat_dofs: self.thermostat.thermostat_dofs.clone(),
            constrained_dofs: self.constrained_dofs.clone(),
            is_nbra,
            icond: self.icond,
            nfiles: self.nfiles,
            prefix: self.output.prefix.clone(),
            prefix2: self.output.prefix2.clone(),
            mem_output_level: self.output.mem_output_level,
            txt_output_level: self.output.txt_output_level,
            txt2_output_level: self.output.txt2_output_level,
            npz_output_level: self.output.npz_output_level,
            progress_frequency: self.output.progress_frequency,
            properties_to_save,
        })
    }
}
