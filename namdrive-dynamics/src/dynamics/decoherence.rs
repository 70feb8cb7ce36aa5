use crate::initialization::{CollapseOption, ControlParameters, DecoherenceAlgorithm};
use crate::utils::c64;
use ndarray::prelude::*;

/// Correction of the amplitudes of one trajectory after the hopping step
pub trait DecoherenceCorrection: Send + Sync {
    /// * `c` - amplitudes in the basis of the hops
    /// * `energies` - energies of the states of that basis
    /// * `state` - active state after the hopping step
    /// * `attempted` - a hop to another state was proposed in this step
    fn apply(
        &self,
        c: ArrayViewMut1<c64>,
        energies: ArrayView1<f64>,
        state: usize,
        attempted: bool,
        kinetic_energy: f64,
        dt: f64,
    );
}

pub struct NoDecoherence;

/// Energy-based decoherence correction according to eqn. (17) in
/// G. Granucci, M. Persico,
/// "Critical appraisal of the fewest switches algorithm for surface hopping",
/// J. Chem. Phys. 126, 134114 (2007)
/// The amplitudes of the states J != K decay exponentially, C'_J = exp(-dt/tau_JK) C_J
/// with tau_JK = (C + eps / Ekin) / |E_J - E_K|, so that the coherences decay
/// quickly if the energy gap between the two states is large.
pub struct EnergyBasedDecoherence {
    pub c_param: f64,
    pub eps_param: f64,
}

/// Instantaneous decoherence: the wavefunction collapses onto the active
/// state whenever a hop was attempted
pub struct InstantaneousDecoherence {
    pub collapse_option: CollapseOption,
}

impl DecoherenceCorrection for NoDecoherence {
    fn apply(&self, _: ArrayViewMut1<c64>, _: ArrayView1<f64>, _: usize, _: bool, _: f64, _: f64) {}
}

impl DecoherenceCorrection for EnergyBasedDecoherence {
    fn apply(
        &self,
        mut c: ArrayViewMut1<c64>,
        energies: ArrayView1<f64>,
        state: usize,
        _attempted: bool,
        kinetic_energy: f64,
        dt: f64,
    ) {
        let norm: f64 = c.iter().map(|val| val.norm_sqr()).sum();
        let mut sm: f64 = 0.0;
        for j in (0..c.len()).filter(|j| *j != state) {
            let tau: f64 = 1.0 / (energies[j] - energies[state]).abs()
                * (self.c_param + self.eps_param / kinetic_energy);
            c[j] *= (-dt / tau).exp();
            sm += c[j].norm_sqr();
        }
        let active: f64 = c[state].norm_sqr();
        let remaining: f64 = (norm - sm).max(0.0);
        if active > 0.0 {
            c[state] *= (remaining / active).sqrt();
        } else {
            c[state] = c64::new(remaining.sqrt(), 0.0);
        }
    }
}

impl DecoherenceCorrection for InstantaneousDecoherence {
    fn apply(
        &self,
        c: ArrayViewMut1<c64>,
        _energies: ArrayView1<f64>,
        state: usize,
        attempted: bool,
        _kinetic_energy: f64,
        _dt: f64,
    ) {
        if attempted {
            collapse(c, state, self.collapse_option);
        }
    }
}

/// Collapse the wavefunction onto `state`
pub fn collapse(mut c: ArrayViewMut1<c64>, state: usize, option: CollapseOption) {
    let active: c64 = c[state];
    c.fill(c64::new(0.0, 0.0));
    c[state] = match option {
        CollapseOption::KeepPhase if active.norm() > 0.0 => active / active.norm(),
        _ => c64::new(1.0, 0.0),
    };
}

pub fn decoherence_from(control: &ControlParameters) -> Box<dyn DecoherenceCorrection> {
    match control.decoherence {
        DecoherenceAlgorithm::None => Box::new(NoDecoherence),
        DecoherenceAlgorithm::EnergyBased => Box::new(EnergyBasedDecoherence {
            c_param: control.decoherence_c_param,
            eps_param: control.decoherence_eps_param,
        }),
        DecoherenceAlgorithm::Instantaneous => Box::new(InstantaneousDecoherence {
            collapse_option: control.collapse_option,
        }),
    }
}
