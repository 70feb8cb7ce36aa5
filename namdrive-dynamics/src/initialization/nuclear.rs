use crate::errors::DynamicsError;
use crate::initialization::NuclearInitConfiguration;
use log::warn;
use ndarray::prelude::*;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// How the nuclear coordinates and momenta of the ensemble are sampled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NuclearSampling {
    /// identical copies of the mean values
    Fixed,
    /// momenta drawn from the harmonic-oscillator ground state, coordinates fixed
    Momenta,
    /// coordinates drawn from the harmonic-oscillator ground state, momenta fixed
    Coordinates,
    /// both coordinates and momenta drawn independently
    Both,
}

impl NuclearSampling {
    /// Unknown codes are reported and replaced by [NuclearSampling::Fixed]
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => NuclearSampling::Fixed,
            1 => NuclearSampling::Momenta,
            2 => NuclearSampling::Coordinates,
            3 => NuclearSampling::Both,
            _ => {
                warn!(
                    "WARNING in init_nuclear_dyn_var: the init_type = {} is not known. \
                     Allowed values are: [0, 1, 2, 3]. Using 0",
                    code
                );
                NuclearSampling::Fixed
            }
        }
    }
}

/// Width of the coordinate distribution of the ground state of a harmonic
/// oscillator with force constant `k` and mass `m`
pub fn coordinate_width(k: f64, m: f64) -> f64 {
    (0.5 * (1.0 / (k * m)).sqrt()).sqrt()
}

/// Width of the momentum distribution of the ground state of a harmonic
/// oscillator with force constant `k` and mass `m`
pub fn momentum_width(k: f64, m: f64) -> f64 {
    (0.5 * (k * m).sqrt()).sqrt()
}

/// Fill every column of `arr` with samples of N(mean, sigma), row by row
fn sample<R: Rng>(
    arr: &mut Array2<f64>,
    mean: ArrayView1<f64>,
    sigma: ArrayView1<f64>,
    rng: &mut R,
) -> Result<(), DynamicsError> {
    for (dof, mut row) in arr.axis_iter_mut(Axis(0)).enumerate() {
        if sigma[dof] == 0.0 {
            row.fill(mean[dof]);
            continue;
        }
        let dist = Normal::new(mean[dof], sigma[dof]).map_err(|_| {
            DynamicsError::invalid(format!(
                "the width {} of the distribution of DOF {} is not valid",
                sigma[dof], dof
            ))
        })?;
        row.iter_mut().for_each(|val| *val = dist.sample(rng));
    }
    Ok(())
}

/// Build the coordinates `q` (ndof x ntraj), momenta `p` (ndof x ntraj) and
/// inverse masses `iM` (ndof x 1) of an ensemble of `params.ntraj` trajectories.
///
/// * `q0`, `p0` - mean coordinates and momenta of every DOF
/// * `masses` - masses of every DOF
/// * `params.force_constant` - force constant of the harmonic oscillator whose
///   ground state defines the sampling widths, one per DOF
pub fn init_nuclear_dyn_var<R: Rng>(
    q0: &[f64],
    p0: &[f64],
    masses: &[f64],
    params: &NuclearInitConfiguration,
    rng: &mut R,
) -> Result<(Array2<f64>, Array2<f64>, Array2<f64>), DynamicsError> {
    let sampling: NuclearSampling = NuclearSampling::from_code(params.init_type);
    let force_constant: &[f64] = &params.force_constant;
    let ntraj: usize = params.ntraj;

    if q0.len() != p0.len() {
        return Err(DynamicsError::invalid(format!(
            "the length of Q is {}, the length of P is {}, but they should be equal",
            q0.len(),
            p0.len()
        )));
    }
    if q0.len() != masses.len() {
        return Err(DynamicsError::invalid(format!(
            "the length of Q is {}, the length of M is {}, but they should be equal",
            q0.len(),
            masses.len()
        )));
    }
    if q0.len() != force_constant.len() {
        return Err(DynamicsError::invalid(format!(
            "the length of Q is {}, the length of force_constant is {}, but they should be equal",
            q0.len(),
            force_constant.len()
        )));
    }
    if ntraj < 1 {
        return Err(DynamicsError::invalid(format!(
            "ntraj is {}, should be at least 1",
            ntraj
        )));
    }
    if let Some(mass) = masses.iter().find(|mass| !(**mass > 0.0)) {
        return Err(DynamicsError::invalid(format!(
            "the mass {} is not positive",
            mass
        )));
    }

    let ndof: usize = q0.len();
    let i_m: Array2<f64> = Array2::from_shape_fn((ndof, 1), |(dof, _)| 1.0 / masses[dof]);
    let mean_q: ArrayView1<f64> = ArrayView1::from(q0);
    let mean_p: ArrayView1<f64> = ArrayView1::from(p0);

    let mut sigma_q: Array1<f64> = Array1::zeros(ndof);
    let mut sigma_p: Array1<f64> = Array1::zeros(ndof);
    for dof in 0..ndof {
        let (k, m): (f64, f64) = (force_constant[dof], masses[dof]);
        if sampling != NuclearSampling::Fixed && !(k > 0.0) {
            return Err(DynamicsError::invalid(format!(
                "the force constant {} of DOF {} should be positive for sampling",
                k, dof
            )));
        }
        match sampling {
            NuclearSampling::Fixed => {}
            NuclearSampling::Momenta => sigma_p[dof] = momentum_width(k, m),
            NuclearSampling::Coordinates => sigma_q[dof] = coordinate_width(k, m),
            NuclearSampling::Both => {
                sigma_q[dof] = coordinate_width(k, m);
                sigma_p[dof] = momentum_width(k, m);
            }
        }
    }

    let mut q: Array2<f64> = Array2::zeros((ndof, ntraj));
    let mut p: Array2<f64> = Array2::zeros((ndof, ntraj));
    sample(&mut q, mean_q, sigma_q.view(), rng)?;
    sample(&mut p, mean_p, sigma_p.view(), rng)?;

    Ok((q, p, i_m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(init_type: i32, force_constant: Vec<f64>, ntraj: usize) -> NuclearInitConfiguration {
        NuclearInitConfiguration {
            init_type,
            force_constant,
            ntraj,
        }
    }

    #[test]
    fn fixed_sampling_reproduces_means() {
        let mut rng = StdRng::seed_from_u64(1);
        let (q, p, i_m) = init_nuclear_dyn_var(
            &[-4.0, 1.5],
            &[20.0, 0.0],
            &[2000.0, 1000.0],
            &params(0, vec![0.01, 0.01], 7),
            &mut rng,
        )
        .unwrap();
        assert_eq!(q.dim(), (2, 7));
        assert!(q.row(0).iter().all(|val| *val == -4.0));
        assert!(q.row(1).iter().all(|val| *val == 1.5));
        assert!(p.row(0).iter().all(|val| *val == 20.0));
        assert!(p.row(1).iter().all(|val| *val == 0.0));
        assert_abs_diff_eq!(i_m[[0, 0]], 5.0e-4);
        assert_abs_diff_eq!(i_m[[1, 0]], 1.0e-3);
    }

    #[test]
    fn momentum_sampling_keeps_coordinates() {
        let mut rng = StdRng::seed_from_u64(2);
        let (q, p, _) = init_nuclear_dyn_var(
            &[-4.0],
            &[20.0],
            &[2000.0],
            &params(1, vec![0.01], 5000),
            &mut rng,
        )
        .unwrap();
        assert!(q.iter().all(|val| *val == -4.0));
        let mean: f64 = p.mean().unwrap();
        let width: f64 = momentum_width(0.01, 2000.0);
        let std: f64 = p.std(0.0);
        assert_abs_diff_eq!(mean, 20.0, epsilon = 5.0 * width / (5000.0_f64).sqrt());
        assert_abs_diff_eq!(std, width, epsilon = 0.1 * width);
    }

    #[test]
    fn both_sampled() {
        let mut rng = StdRng::seed_from_u64(3);
        let (q, p, _) = init_nuclear_dyn_var(
            &[0.0],
            &[0.0],
            &[1.0],
            &params(3, vec![1.0], 4000),
            &mut rng,
        )
        .unwrap();
        // k = m = 1: both widths are sqrt(0.5)
        assert_abs_diff_eq!(q.std(0.0), (0.5_f64).sqrt(), epsilon = 0.05);
        assert_abs_diff_eq!(p.std(0.0), (0.5_f64).sqrt(), epsilon = 0.05);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut rng = StdRng::seed_from_u64(4);
        let result = init_nuclear_dyn_var(
            &[0.0, 1.0],
            &[0.0],
            &[1.0, 1.0],
            &params(0, vec![1.0, 1.0], 1),
            &mut rng,
        );
        assert!(matches!(result, Err(DynamicsError::InvalidInput(_))));
    }

    #[test]
    fn zero_trajectories_are_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let result =
            init_nuclear_dyn_var(&[0.0], &[0.0], &[1.0], &params(0, vec![1.0], 0), &mut rng);
        match result {
            Err(DynamicsError::InvalidInput(message)) => assert!(message.contains("ntraj is 0")),
            _ => panic!("ntraj = 0 must be rejected"),
        }
    }

    #[test]
    fn unknown_mode_falls_back_to_fixed() {
        assert_eq!(NuclearSampling::from_code(9), NuclearSampling::Fixed);
    }
}
