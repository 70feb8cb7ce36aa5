mod harmonic;
mod sac;
mod tabulated;

pub use harmonic::TwoStateHarmonic;
pub use sac::SingleAvoidedCrossing;
pub use tabulated::TabulatedHamiltonian;

use crate::io::ModelConfig;
use anyhow::{bail, Result};
use namdrive_dynamics::interface::HamiltonianAdapter;
use namdrive_dynamics::utils::c64;
use ndarray::prelude::*;

/// Create the Hamiltonian selected in the `[model]` table
pub fn model_from(config: &ModelConfig) -> Result<Box<dyn HamiltonianAdapter>> {
    let model: Box<dyn HamiltonianAdapter> = match config.model.as_str() {
        "sac" => Box::new(SingleAvoidedCrossing::from(config.sac)),
        "harmonic" => Box::new(TwoStateHarmonic::from(config.harmonic)),
        "tabulated" => Box::new(TabulatedHamiltonian::new(&config.tabulated.prefix)),
        other => bail!(
            "the model {} is not known, use one of sac, harmonic or tabulated",
            other
        ),
    };
    Ok(model)
}

/// Real symmetric 2x2 matrix `[[v11, v12], [v12, v22]]` as complex matrix
pub(crate) fn two_by_two(v11: f64, v12: f64, v22: f64) -> Array2<c64> {
    array![[v11, v12], [v12, v22]].mapv(|val| c64::new(val, 0.0))
}

/// Derivatives of a one-dimensional model for a system with `ndof` DOFs. Only
/// DOF 0 enters the model.
pub(crate) fn derivatives_along_first_dof(d1ham: Array2<c64>, ndof: usize) -> Vec<Array2<c64>> {
    let dim = d1ham.raw_dim();
    let mut derivatives: Vec<Array2<c64>> = vec![d1ham];
    derivatives.extend((1..ndof).map(|_| Array2::zeros(dim.clone())));
    derivatives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_model_is_rejected() {
        let mut config: ModelConfig = toml::from_str("").unwrap();
        config.model = String::from("morse");
        assert!(model_from(&config).is_err());
        config.model = String::from("harmonic");
        assert!(model_from(&config).is_ok());
    }
}
