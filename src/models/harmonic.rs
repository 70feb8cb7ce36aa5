use crate::io::HarmonicConfig;
use crate::models::{derivatives_along_first_dof, two_by_two};
use namdrive_dynamics::errors::DynamicsError;
use namdrive_dynamics::interface::{HamiltonianAdapter, HamiltonianData, ModelRequest};
use ndarray::prelude::*;

/// Two shifted parabolas with a constant coupling,
/// `V_ii = k/2 (x - x_i)^2 + E_i` and `V_12 = V`
#[derive(Clone, Copy, Debug)]
pub struct TwoStateHarmonic {
    pub force_constant: f64,
    pub centers: [f64; 2],
    pub energies: [f64; 2],
    pub coupling: f64,
}

impl From<HarmonicConfig> for TwoStateHarmonic {
    fn from(config: HarmonicConfig) -> Self {
        TwoStateHarmonic {
            force_constant: config.force_constant,
            centers: config.centers,
            energies: config.energies,
            coupling: config.coupling,
        }
    }
}

impl HamiltonianAdapter for TwoStateHarmonic {
    fn compute_single(
        &self,
        q: ArrayView1<f64>,
        _request: &ModelRequest,
    ) -> Result<HamiltonianData, DynamicsError> {
        if q.is_empty() {
            return Err(DynamicsError::invalid("the model needs at least one nuclear DOF"));
        }
        let x: f64 = q[0];
        let k: f64 = self.force_constant;
        let [x1, x2] = self.centers;
        let [e1, e2] = self.energies;
        let ham = two_by_two(
            0.5 * k * (x - x1).powi(2) + e1,
            self.coupling,
            0.5 * k * (x - x2).powi(2) + e2,
        );
        let d1ham = two_by_two(k * (x - x1), 0.0, k * (x - x2));
        Ok(HamiltonianData::from_diabatic(
            ham,
            derivatives_along_first_dof(d1ham, q.len()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use namdrive_dynamics::initialization::Representation;
    use namdrive_dynamics::utils::c64;

    #[test]
    fn diabatic_minima() {
        let model = TwoStateHarmonic {
            force_constant: 0.01,
            centers: [-1.0, 1.0],
            energies: [0.0, -0.01],
            coupling: 0.0,
        };
        let request = ModelRequest {
            timestep: 0,
            nchildren: 1,
            rep_ham: Representation::Diabatic,
        };
        let data = model.compute_single(array![1.0].view(), &request).unwrap();
        assert_abs_diff_eq!(data.ham_dia[[1, 1]].re, -0.01);
        assert_abs_diff_eq!(data.ham_dia[[0, 0]].re, 0.02, epsilon = 1e-15);
        assert_eq!(data.d1ham_dia[0][[1, 1]], c64::new(0.0, 0.0));
        // the lower adiabatic state is the second diabatic one
        assert_abs_diff_eq!(data.adiabatic_energies()[0], -0.01, epsilon = 1e-15);
    }
}
