use crate::constants::K_BOLTZMANN;
use crate::initialization::{ControlParameters, HopAcceptance, MomentumRescaling, TshMethod};
use crate::utils::c64;
use log::debug;
use ndarray::prelude::*;
use rand::distributions::Standard;
use rand::rngs::StdRng;
use rand::Rng;

/// Electronic data of one trajectory for the hop proposal, given in the basis
/// in which the hops are performed
pub struct HopContext<'a> {
    /// amplitudes at the beginning of the step
    pub c_old: ArrayView1<'a, c64>,
    /// amplitudes at the end of the step
    pub c_new: ArrayView1<'a, c64>,
    /// the Hamiltonian that propagated the amplitudes
    pub hvib: ArrayView2<'a, c64>,
    pub state: usize,
    pub dt: f64,
}

/// Probabilities to hop from the active state into every state
pub trait HopProposal: Send + Sync {
    fn probabilities(&self, ctx: &HopContext) -> Array1<f64>;
}

/// Decides whether a proposed hop from `old` to `new` is carried out
pub trait HopAcceptor: Send + Sync {
    fn accept(
        &self,
        energies: ArrayView1<f64>,
        old: usize,
        new: usize,
        kinetic_energy: f64,
        rng: &mut StdRng,
    ) -> bool;
}

/// Adjusts the momenta after an accepted hop. Returns the final active state,
/// which is `old` if the hop turns out to be frustrated.
pub trait MomentumRescaler: Send + Sync {
    fn rescale(
        &self,
        p: ArrayViewMut1<f64>,
        i_m: ArrayView1<f64>,
        quantum_dofs: &[usize],
        energies: ArrayView1<f64>,
        old: usize,
        new: usize,
    ) -> usize;
}

/// Populations of all states
fn populations(c: ArrayView1<c64>) -> Array1<f64> {
    c.mapv(|val| val.re.powi(2) + val.im.powi(2))
}

/// Adiabatic dynamics, the active state never changes
pub struct NoHops;

/// Fewest switches surface hopping
/// J. C. Tully, J. Chem. Phys. 93, 1061 (1990)
pub struct Fssh;

/// Global flux surface hopping, the probabilities only depend on the change
/// of the populations during the step
/// L. Wang, D. Trivedi, O. V. Prezhdo, J. Chem. Theory Comput. 10, 3598 (2014)
pub struct Gfsh;

/// Markov state surface hopping, the probability to be in a state is its
/// population
pub struct Mssh;

impl HopProposal for NoHops {
    fn probabilities(&self, ctx: &HopContext) -> Array1<f64> {
        Array1::zeros(ctx.c_new.len())
    }
}

impl HopProposal for Fssh {
    fn probabilities(&self, ctx: &HopContext) -> Array1<f64> {
        let nstates: usize = ctx.c_new.len();
        let state: usize = ctx.state;
        let c: ArrayView1<c64> = ctx.c_new;
        let mut probabilities: Array1<f64> = Array1::zeros(nstates);
        let rho_ss: f64 = c[state].norm_sqr();
        if rho_ss < f64::EPSILON {
            return probabilities;
        }
        for j in (0..nstates).filter(|j| *j != state) {
            // population flux from the active state into state j
            let rho_sj: c64 = c[state] * c[j].conj();
            let flux: f64 = 2.0 * (ctx.hvib[[j, state]] * rho_sj).im;
            probabilities[j] = (ctx.dt * flux / rho_ss).max(0.0);
        }
        probabilities
    }
}

impl HopProposal for Gfsh {
    fn probabilities(&self, ctx: &HopContext) -> Array1<f64> {
        let nstates: usize = ctx.c_new.len();
        let state: usize = ctx.state;
        let old_occupations: Array1<f64> = populations(ctx.c_old);
        let changes: Array1<f64> = populations(ctx.c_new) - &old_occupations;
        let mut probabilities: Array1<f64> = Array1::zeros(nstates);

        if changes[state] < 0.0 && old_occupations[state] > f64::EPSILON {
            let gain: f64 = changes.iter().filter(|val| **val > 0.0).sum();
            for j in (0..nstates).filter(|j| changes[*j] > 0.0) {
                probabilities[j] =
                    -1.0 * (changes[state] / old_occupations[state]) * changes[j] / gain;
            }
        }
        probabilities
    }
}

impl HopProposal for Mssh {
    fn probabilities(&self, ctx: &HopContext) -> Array1<f64> {
        let occupations: Array1<f64> = populations(ctx.c_new);
        let norm: f64 = occupations.sum();
        if norm > 0.0 {
            occupations / norm
        } else {
            occupations
        }
    }
}

/// Select the target state for the uniform random number `ksi`. The active
/// state is kept if `ksi` is beyond the total probability.
pub fn hop(probabilities: ArrayView1<f64>, state: usize, ksi: f64) -> usize {
    let mut sum: f64 = 0.0;
    for (target, prob) in probabilities.iter().enumerate() {
        if *prob > 0.0 {
            sum += prob;
            if ksi < sum {
                return target;
            }
        }
    }
    state
}

pub struct AcceptAll;

/// Hops upwards are only accepted if the kinetic energy covers the gap
pub struct AdiabaticEnergyAcceptance;

/// Hops upwards are accepted with the Boltzmann probability of the gap
pub struct QuantumBoltzmannAcceptance {
    pub temperature: f64,
}

impl HopAcceptor for AcceptAll {
    fn accept(&self, _: ArrayView1<f64>, _: usize, _: usize, _: f64, _: &mut StdRng) -> bool {
        true
    }
}

impl HopAcceptor for AdiabaticEnergyAcceptance {
    fn accept(
        &self,
        energies: ArrayView1<f64>,
        old: usize,
        new: usize,
        kinetic_energy: f64,
        _rng: &mut StdRng,
    ) -> bool {
        energies[new] - energies[old] <= kinetic_energy
    }
}

impl HopAcceptor for QuantumBoltzmannAcceptance {
    fn accept(
        &self,
        energies: ArrayView1<f64>,
        old: usize,
        new: usize,
        _kinetic_energy: f64,
        rng: &mut StdRng,
    ) -> bool {
        let gap: f64 = energies[new] - energies[old];
        if gap <= 0.0 {
            return true;
        }
        let boltz: f64 = (-gap / (K_BOLTZMANN * self.temperature)).exp();
        let ksi: f64 = rng.sample(Standard);
        ksi < boltz
    }
}

pub struct NoRescaling;

/// Uniform rescaling of the momenta of the quantum DOFs so that the total
/// energy is conserved
pub struct UniformRescaling {
    pub reverse_on_frustrated: bool,
}

impl MomentumRescaler for NoRescaling {
    fn rescale(
        &self,
        _: ArrayViewMut1<f64>,
        _: ArrayView1<f64>,
        _: &[usize],
        _: ArrayView1<f64>,
        _old: usize,
        new: usize,
    ) -> usize {
        new
    }
}

impl MomentumRescaler for UniformRescaling {
    fn rescale(
        &self,
        mut p: ArrayViewMut1<f64>,
        i_m: ArrayView1<f64>,
        quantum_dofs: &[usize],
        energies: ArrayView1<f64>,
        old: usize,
        new: usize,
    ) -> usize {
        let kinetic_energy: f64 = 0.5
            * quantum_dofs
                .iter()
                .map(|dof| p[*dof] * p[*dof] * i_m[*dof])
                .sum::<f64>();
        let gap: f64 = energies[new] - energies[old];

        // hop is rejected when kinetic energy is too low
        if gap > kinetic_energy {
            debug!(
                "frustrated hop {} -> {}: gap {:.6} Ha, kinetic energy {:.6} Ha",
                old, new, gap, kinetic_energy
            );
            if self.reverse_on_frustrated {
                for dof in quantum_dofs.iter() {
                    p[*dof] = -p[*dof];
                }
            }
            return old;
        }
        if kinetic_energy > 0.0 {
            let scale: f64 = ((kinetic_energy - gap) / kinetic_energy).sqrt();
            for dof in quantum_dofs.iter() {
                p[*dof] *= scale;
            }
        }
        new
    }
}

pub fn proposal_from(method: TshMethod) -> Box<dyn HopProposal> {
    match method {
        TshMethod::Adiabatic => Box::new(NoHops),
        TshMethod::Fssh => Box::new(Fssh),
        TshMethod::Gfsh => Box::new(Gfsh),
        TshMethod::Mssh => Box::new(Mssh),
    }
}

pub fn acceptor_from(control: &ControlParameters) -> Box<dyn HopAcceptor> {
    match control.hop_acceptance {
        HopAcceptance::AcceptAll => Box::new(AcceptAll),
        HopAcceptance::AdiabaticEnergy => Box::new(AdiabaticEnergyAcceptance),
        HopAcceptance::QuantumBoltzmann => Box::new(QuantumBoltzmannAcceptance {
            temperature: control.temperature,
        }),
    }
}

pub fn rescaler_from(rescaling: MomentumRescaling) -> Box<dyn MomentumRescaler> {
    match rescaling {
        MomentumRescaling::None => Box::new(NoRescaling),
        MomentumRescaling::Uniform {
            reverse_on_frustrated,
        } => Box::new(UniformRescaling {
            reverse_on_frustrated,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    #[test]
    fn gfsh_moves_the_lost_population() {
        let c_old: Array1<c64> = array![c64::new(1.0, 0.0), c64::new(0.0, 0.0)];
        let c_new: Array1<c64> = array![c64::new(0.9_f64.sqrt(), 0.0), c64::new(0.0, 0.1_f64.sqrt())];
        let hvib: Array2<c64> = Array2::zeros((2, 2));
        let ctx = HopContext {
            c_old: c_old.view(),
            c_new: c_new.view(),
            hvib: hvib.view(),
            state: 0,
            dt: 1.0,
        };
        let probabilities = Gfsh.probabilities(&ctx);
        assert_abs_diff_eq!(probabilities[1], 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(probabilities[0], 0.0);
    }

    #[test]
    fn fssh_follows_the_flux() {
        let c: Array1<c64> = array![c64::new(0.8, 0.0), c64::new(0.6, 0.0)];
        // H_10 = -i d v with d v = 0.01
        let hvib: Array2<c64> = array![
            [c64::new(0.0, 0.0), c64::new(0.0, 0.01)],
            [c64::new(0.0, -0.01), c64::new(0.0, 0.0)]
        ];
        let ctx = HopContext {
            c_old: c.view(),
            c_new: c.view(),
            hvib: hvib.view(),
            state: 0,
            dt: 2.0,
        };
        let forward = Fssh.probabilities(&ctx);
        // 2 dt Re(c_0 c_1^* d v) / |c_0|^2 with the sign of the flux
        assert_abs_diff_eq!(forward[1], 0.0, epsilon = 1e-14);
        let ctx = HopContext { state: 1, ..ctx };
        let backward = Fssh.probabilities(&ctx);
        assert_abs_diff_eq!(backward[0], 2.0 * 2.0 * 0.48 * 0.01 / 0.36, epsilon = 1e-12);
    }

    #[test]
    fn mssh_uses_the_populations() {
        let c: Array1<c64> = array![c64::new(0.6, 0.0), c64::new(0.0, 0.8)];
        let hvib: Array2<c64> = Array2::zeros((2, 2));
        let ctx = HopContext {
            c_old: c.view(),
            c_new: c.view(),
            hvib: hvib.view(),
            state: 0,
            dt: 1.0,
        };
        let probabilities = Mssh.probabilities(&ctx);
        assert_abs_diff_eq!(probabilities[1], 0.64, epsilon = 1e-12);
        assert_eq!(hop(probabilities.view(), 0, 0.5), 1);
        assert_eq!(hop(probabilities.view(), 0, 0.2), 0);
    }

    #[test]
    fn hop_keeps_the_state_beyond_the_total_probability() {
        assert_eq!(hop(array![0.0, 0.1].view(), 0, 0.5), 0);
        assert_eq!(hop(array![0.0, 0.1].view(), 0, 0.05), 1);
    }

    #[test]
    fn uniform_rescaling_conserves_energy() {
        let mut p: Array1<f64> = array![30.0, 5.0];
        let i_m: Array1<f64> = array![0.0005, 0.001];
        let energies: Array1<f64> = array![0.0, 0.05];
        let ekin_before: f64 = 0.5 * (900.0 * 0.0005 + 25.0 * 0.001);
        let rescaler = UniformRescaling {
            reverse_on_frustrated: false,
        };
        let state = rescaler.rescale(p.view_mut(), i_m.view(), &[0, 1], energies.view(), 0, 1);
        assert_eq!(state, 1);
        let ekin_after: f64 = 0.5 * (p[0] * p[0] * 0.0005 + p[1] * p[1] * 0.001);
        assert_abs_diff_eq!(ekin_after + 0.05, ekin_before, epsilon = 1e-12);
    }

    #[test]
    fn frustrated_hop_reverses_momenta() {
        let mut p: Array1<f64> = array![1.0, 2.0];
        let i_m: Array1<f64> = array![0.001, 0.001];
        let energies: Array1<f64> = array![0.0, 0.05];
        let rescaler = UniformRescaling {
            reverse_on_frustrated: true,
        };
        let state = rescaler.rescale(p.view_mut(), i_m.view(), &[1], energies.view(), 0, 1);
        assert_eq!(state, 0);
        assert_eq!(p, array![1.0, -2.0]);
    }

    #[test]
    fn boltzmann_acceptance() {
        let mut rng = StdRng::seed_from_u64(21);
        let energies: Array1<f64> = array![0.0, 1.0];
        let acceptor = QuantumBoltzmannAcceptance { temperature: 300.0 };
        assert!(acceptor.accept(energies.view(), 1, 0, 0.0, &mut rng));
        assert!(!acceptor.accept(energies.view(), 0, 1, 0.0, &mut rng));
        assert!(!AdiabaticEnergyAcceptance.accept(energies.view(), 0, 1, 0.5, &mut rng));
        assert!(AcceptAll.accept(energies.view(), 0, 1, 0.0, &mut rng));
    }
}
