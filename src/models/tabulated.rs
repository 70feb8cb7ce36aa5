use namdrive_dynamics::errors::DynamicsError;
use namdrive_dynamics::interface::{HamiltonianAdapter, HamiltonianData, ModelRequest};
use namdrive_dynamics::utils::{c64, to_complex};
use ndarray::prelude::*;
use ndarray_npy::read_npy;
use std::path::{Path, PathBuf};

/// Precomputed adiabatic Hamiltonians and time overlaps along a single
/// reference trajectory (neglect of back-reaction). Snapshot `n` is stored as
/// `<prefix>/Hvib_re_<n>.npy` and `<prefix>/St_re_<n>.npy`, with an optional
/// `<prefix>/St_im_<n>.npy`. The coordinates are ignored, the snapshot is
/// selected by the timestep of the request.
#[derive(Clone, Debug)]
pub struct TabulatedHamiltonian {
    pub prefix: PathBuf,
}

impl TabulatedHamiltonian {
    pub fn new<P: AsRef<Path>>(prefix: P) -> Self {
        TabulatedHamiltonian {
            prefix: prefix.as_ref().to_path_buf(),
        }
    }

    pub fn file_path(&self, name: &str, timestep: usize) -> PathBuf {
        self.prefix.join(format!("{}_{}.npy", name, timestep))
    }

    fn read(&self, name: &str, timestep: usize) -> Result<Array2<f64>, DynamicsError> {
        let path: PathBuf = self.file_path(name, timestep);
        read_npy(&path).map_err(|err| {
            DynamicsError::PropagationFailure(format!(
                "unable to read {}: {}",
                path.display(),
                err
            ))
        })
    }
}

impl HamiltonianAdapter for TabulatedHamiltonian {
    fn compute_single(
        &self,
        _q: ArrayView1<f64>,
        request: &ModelRequest,
    ) -> Result<HamiltonianData, DynamicsError> {
        let timestep: usize = request.timestep;
        let energies: Array2<f64> = self.read("Hvib_re", timestep)?;
        let mut time_overlap: Array2<c64> = to_complex(&self.read("St_re", timestep)?);
        if self.file_path("St_im", timestep).exists() {
            let imaginary: Array2<f64> = self.read("St_im", timestep)?;
            time_overlap.zip_mut_with(&imaginary, |val, im| val.im = *im);
        }
        if energies.dim() != time_overlap.dim() || energies.nrows() != energies.ncols() {
            return Err(DynamicsError::PropagationFailure(format!(
                "snapshot {}: the shapes {:?} of Hvib and {:?} of St do not match",
                timestep,
                energies.dim(),
                time_overlap.dim()
            )));
        }
        Ok(HamiltonianData::from_adiabatic(
            to_complex(&energies),
            Vec::new(),
            Vec::new(),
            Some(time_overlap),
        ))
    }
}
