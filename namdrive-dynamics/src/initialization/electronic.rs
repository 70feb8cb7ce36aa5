use crate::defaults::POPULATION_TOLERANCE;
use crate::errors::DynamicsError;
use crate::initialization::{ElectronicInitConfiguration, Representation};
use crate::utils::{c64, complex_eye};
use log::warn;
use ndarray::prelude::*;
use rand::Rng;
use std::f64::consts::PI;

/// How the electronic amplitudes and active states of the ensemble are set up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElectronicSampling {
    /// unit amplitude on `istate`
    FixedState,
    /// unit-modulus amplitude with a random phase on `istate`
    RandomPhase,
    /// coherent superposition sqrt(pop_i), active state drawn from the populations
    Populations,
    /// as [ElectronicSampling::Populations] with a random phase on every state
    PopulationsRandomPhase,
}

impl ElectronicSampling {
    /// Unknown codes are reported and replaced by [ElectronicSampling::FixedState]
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ElectronicSampling::FixedState,
            1 => ElectronicSampling::RandomPhase,
            2 => ElectronicSampling::Populations,
            3 => ElectronicSampling::PopulationsRandomPhase,
            _ => {
                warn!(
                    "WARNING in init_electronic_dyn_var: the init_type = {} is not known. \
                     Allowed values are: [0, 1, 2, 3]. Using 0",
                    code
                );
                ElectronicSampling::FixedState
            }
        }
    }
}

/// Select a state index from the populations `pops` for the uniform number `ksi`
pub fn set_random_state(pops: &[f64], ksi: f64) -> usize {
    let mut sum: f64 = 0.0;
    for (state, pop) in pops.iter().enumerate() {
        sum += pop;
        if ksi < sum {
            return state;
        }
    }
    // rounding may leave the last cumulative sum slightly below 1
    pops.len() - 1
}

fn random_phase<R: Rng>(rng: &mut R) -> c64 {
    let ksi: f64 = rng.gen_range(0.0..1.0);
    c64::new((2.0 * PI * ksi).cos(), (2.0 * PI * ksi).sin())
}

/// Build the amplitudes in both representations (the one not requested by
/// `params.rep` stays zero), the projectors (identities) and the active states.
///
/// Returns `(Cdia, Cadi, projectors, states)`. In the reduced (`is_nbra`) mode a
/// single projector is shared by all trajectories.
pub fn init_electronic_dyn_var<R: Rng>(
    params: &ElectronicInitConfiguration,
    rng: &mut R,
) -> Result<(Array2<c64>, Array2<c64>, Vec<Array2<c64>>, Vec<usize>), DynamicsError> {
    let sampling: ElectronicSampling = ElectronicSampling::from_code(params.init_type);
    let rep: Representation = Representation::from_code("rep", params.rep).map_err(|e| e.promote())?;
    let nstates: usize = params.nstates;
    let ntraj: usize = params.ntraj;
    let istate: usize = params.istate;
    let istates: &[f64] = &params.istates;

    if ntraj < 1 {
        return Err(DynamicsError::invalid(format!(
            "ntraj is {}, should be at least 1",
            ntraj
        )));
    }
    if nstates < 1 {
        return Err(DynamicsError::invalid("nstates is 0, should be at least 1"));
    }
    match sampling {
        ElectronicSampling::FixedState | ElectronicSampling::RandomPhase => {
            if istate >= nstates {
                return Err(DynamicsError::invalid(format!(
                    "the istate is {}, but should be less than {}",
                    istate, nstates
                )));
            }
        }
        ElectronicSampling::Populations | ElectronicSampling::PopulationsRandomPhase => {
            if istates.len() != nstates {
                return Err(DynamicsError::invalid(format!(
                    "the istates array is of length {}, but should be of length {}",
                    istates.len(),
                    nstates
                )));
            }
            if let Some(pop) = istates.iter().find(|pop| **pop < 0.0) {
                return Err(DynamicsError::invalid(format!(
                    "the istates array contains the negative population {}",
                    pop
                )));
            }
            let sum: f64 = istates.iter().sum();
            if (sum - 1.0).abs() > POPULATION_TOLERANCE {
                return Err(DynamicsError::invalid(format!(
                    "the sum of the entries in the istates array is {}, but should be 1.0",
                    sum
                )));
            }
        }
    }

    let mut coefficients: Array2<c64> = Array2::zeros((nstates, ntraj));
    let mut states: Vec<usize> = Vec::with_capacity(ntraj);

    for traj in 0..ntraj {
        match sampling {
            ElectronicSampling::FixedState => {
                coefficients[[istate, traj]] = c64::new(1.0, 0.0);
                states.push(istate);
            }
            ElectronicSampling::RandomPhase => {
                coefficients[[istate, traj]] = random_phase(rng);
                states.push(istate);
            }
            ElectronicSampling::Populations => {
                for (state, pop) in istates.iter().enumerate() {
                    coefficients[[state, traj]] = c64::new(pop.sqrt(), 0.0);
                }
                let ksi: f64 = rng.gen_range(0.0..1.0);
                states.push(set_random_state(istates, ksi));
            }
            ElectronicSampling::PopulationsRandomPhase => {
                for (state, pop) in istates.iter().enumerate() {
                    coefficients[[state, traj]] = random_phase(rng) * pop.sqrt();
                }
                let ksi: f64 = rng.gen_range(0.0..1.0);
                states.push(set_random_state(istates, ksi));
            }
        }
    }

    let zeros: Array2<c64> = Array2::zeros((nstates, ntraj));
    let (cdia, cadi): (Array2<c64>, Array2<c64>) = match rep {
        Representation::Diabatic => (coefficients, zeros),
        Representation::Adiabatic => (zeros, coefficients),
    };

    let nprojectors: usize = if params.is_nbra == 1 { 1 } else { ntraj };
    let projectors: Vec<Array2<c64>> = (0..nprojectors).map(|_| complex_eye(nstates)).collect();

    Ok((cdia, cadi, projectors, states))
}
