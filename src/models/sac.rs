use crate::io::SacConfig;
use crate::models::{derivatives_along_first_dof, two_by_two};
use namdrive_dynamics::errors::DynamicsError;
use namdrive_dynamics::interface::{HamiltonianAdapter, HamiltonianData, ModelRequest};
use ndarray::prelude::*;

/// Tully's single avoided crossing
/// J. C. Tully, "Molecular dynamics with electronic transitions",
/// J. Chem. Phys. 93, 1061 (1990)
///
/// V11 = A (1 - exp(-B x)) for x >= 0, -A (1 - exp(B x)) otherwise,
/// V22 = -V11 and V12 = C exp(-D x^2)
#[derive(Clone, Copy, Debug)]
pub struct SingleAvoidedCrossing {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl From<SacConfig> for SingleAvoidedCrossing {
    fn from(config: SacConfig) -> Self {
        SingleAvoidedCrossing {
            a: config.a,
            b: config.b,
            c: config.c,
            d: config.d,
        }
    }
}

impl SingleAvoidedCrossing {
    /// Diabatic potential energies and their derivatives,
    /// `(v11, v12, dv11, dv12)`
    pub fn potential(&self, x: f64) -> (f64, f64, f64, f64) {
        let (v11, dv11): (f64, f64) = if x >= 0.0 {
            let e: f64 = (-self.b * x).exp();
            (self.a * (1.0 - e), self.a * self.b * e)
        } else {
            let e: f64 = (self.b * x).exp();
            (-self.a * (1.0 - e), self.a * self.b * e)
        };
        let v12: f64 = self.c * (-self.d * x * x).exp();
        let dv12: f64 = -2.0 * self.d * x * v12;
        (v11, v12, dv11, dv12)
    }
}

impl HamiltonianAdapter for SingleAvoidedCrossing {
    fn compute_single(
        &self,
        q: ArrayView1<f64>,
        _request: &ModelRequest,
    ) -> Result<HamiltonianData, DynamicsError> {
        if q.is_empty() {
            return Err(DynamicsError::invalid("the model needs at least one nuclear DOF"));
        }
        let (v11, v12, dv11, dv12) = self.potential(q[0]);
        Ok(HamiltonianData::from_diabatic(
            two_by_two(v11, v12, -v11),
            derivatives_along_first_dof(two_by_two(dv11, dv12, -dv11), q.len()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use namdrive_dynamics::initialization::Representation;

    fn model() -> SingleAvoidedCrossing {
        SingleAvoidedCrossing {
            a: 0.01,
            b: 1.6,
            c: 0.005,
            d: 1.0,
        }
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let sac = model();
        let h: f64 = 1e-6;
        for x in [-2.0, -0.3, 0.4, 1.7] {
            let (v11_p, v12_p, _, _) = sac.potential(x + h);
            let (v11_m, v12_m, _, _) = sac.potential(x - h);
            let (_, _, dv11, dv12) = sac.potential(x);
            assert_abs_diff_eq!(dv11, (v11_p - v11_m) / (2.0 * h), epsilon = 1e-8);
            assert_abs_diff_eq!(dv12, (v12_p - v12_m) / (2.0 * h), epsilon = 1e-8);
        }
    }

    #[test]
    fn gap_at_the_crossing_is_twice_the_coupling() {
        let request = ModelRequest {
            timestep: 0,
            nchildren: 1,
            rep_ham: Representation::Diabatic,
        };
        let data = model()
            .compute_single(array![0.0, 3.0].view(), &request)
            .unwrap();
        let energies = data.adiabatic_energies();
        assert_abs_diff_eq!(energies[1] - energies[0], 0.01, epsilon = 1e-12);
        assert_eq!(data.d1ham_dia.len(), 2);
        assert_eq!(data.d1ham_dia[1], Array2::zeros((2, 2)));
    }
}
