#![allow(dead_code)]

use namdrive_dynamics::errors::DynamicsError;
use namdrive_dynamics::initialization::{ControlParameters, DynamicConfiguration, DynamicalVariables};
use namdrive_dynamics::interface::{HamiltonianAdapter, HamiltonianData, ModelRequest};
use namdrive_dynamics::utils::{c64, complex_eye};
use ndarray::prelude::*;
use std::path::Path;
use std::sync::Mutex;

/// Tully's single avoided crossing along DOF 0
pub struct AvoidedCrossing;

impl HamiltonianAdapter for AvoidedCrossing {
    fn compute_single(
        &self,
        q: ArrayView1<f64>,
        _request: &ModelRequest,
    ) -> Result<HamiltonianData, DynamicsError> {
        let x: f64 = q[0];
        let (a, b, c, d): (f64, f64, f64, f64) = (0.01, 1.6, 0.005, 1.0);
        let (v11, dv11): (f64, f64) = if x >= 0.0 {
            (a * (1.0 - (-b * x).exp()), a * b * (-b * x).exp())
        } else {
            (-a * (1.0 - (b * x).exp()), a * b * (b * x).exp())
        };
        let v12: f64 = c * (-d * x * x).exp();
        let dv12: f64 = -2.0 * d * x * v12;
        Ok(HamiltonianData::from_diabatic(
            real(array![[v11, v12], [v12, -v11]]),
            vec![real(array![[dv11, dv12], [dv12, -dv11]])],
        ))
    }
}

/// Constant two-state Hamiltonian. On odd snapshots the raw adiabatic states
/// are reordered and the sign of one of them is flipped.
pub struct Reordering;

impl HamiltonianAdapter for Reordering {
    fn compute_single(
        &self,
        _q: ArrayView1<f64>,
        request: &ModelRequest,
    ) -> Result<HamiltonianData, DynamicsError> {
        let mut data = HamiltonianData::from_diabatic(
            real(array![[-0.01, 0.002], [0.002, 0.01]]),
            vec![Array2::zeros((2, 2))],
        );
        if request.timestep % 2 == 1 {
            let u: Array2<c64> = data.basis_transform.clone();
            data.basis_transform.column_mut(0).assign(&u.column(1).mapv(|val| -val));
            data.basis_transform.column_mut(1).assign(&u.column(0));
            let energies: Array1<f64> = data.adiabatic_energies();
            data.ham_adi = Array2::from_diag(&array![energies[1], energies[0]].mapv(|val| c64::new(val, 0.0)));
        }
        Ok(data)
    }
}

/// Constant adiabatic Hamiltonian that is only known together with its time
/// overlaps. The second state changes its sign between any two snapshots.
pub struct SignFlipping;

impl HamiltonianAdapter for SignFlipping {
    fn compute_single(
        &self,
        q: ArrayView1<f64>,
        _request: &ModelRequest,
    ) -> Result<HamiltonianData, DynamicsError> {
        let ndof: usize = q.len();
        Ok(HamiltonianData::from_adiabatic(
            real(array![[-0.01, 0.0], [0.0, 0.01]]),
            vec![Array2::zeros((2, 2)); ndof],
            vec![Array2::zeros((2, 2)); ndof],
            Some(real(array![[1.0, 0.0], [0.0, -1.0]])),
        ))
    }
}

/// Wraps a model and records the snapshot index of every request
pub struct Recording<A> {
    pub model: A,
    pub timesteps: Mutex<Vec<usize>>,
}

impl<A: HamiltonianAdapter> Recording<A> {
    pub fn new(model: A) -> Self {
        Recording {
            model,
            timesteps: Mutex::new(Vec::new()),
        }
    }

    pub fn timesteps(&self) -> Vec<usize> {
        self.timesteps.lock().unwrap().clone()
    }
}

impl<A: HamiltonianAdapter> HamiltonianAdapter for Recording<A> {
    fn compute_single(
        &self,
        q: ArrayView1<f64>,
        request: &ModelRequest,
    ) -> Result<HamiltonianData, DynamicsError> {
        self.model.compute_single(q, request)
    }

    fn compute_model(
        &self,
        q: ArrayView2<f64>,
        request: &ModelRequest,
    ) -> Result<namdrive_dynamics::interface::HamiltonianHierarchy, DynamicsError> {
        self.timesteps.lock().unwrap().push(request.timestep);
        let children = (0..request.nchildren)
            .map(|traj| self.model.compute_single(q.column(traj), request))
            .collect::<Result<Vec<HamiltonianData>, DynamicsError>>()?;
        Ok(namdrive_dynamics::interface::HamiltonianHierarchy::new(children))
    }
}

pub fn real(mat: Array2<f64>) -> Array2<c64> {
    mat.mapv(|val| c64::new(val, 0.0))
}

/// Default settings writing all output below `dir`
pub fn configuration(dir: &Path) -> DynamicConfiguration {
    let mut config = DynamicConfiguration::default();
    config.output.prefix = dir.join("out").to_string_lossy().to_string();
    config.output.prefix2 = dir.join("out2").to_string_lossy().to_string();
    config
}

pub fn control(config: &DynamicConfiguration, ndof: usize) -> ControlParameters {
    config.validate(ndof).unwrap()
}

/// `ntraj` identical trajectories of a two-state system, all in state `state`
pub fn variables(q: f64, p: f64, ntraj: usize, state: usize, nprojectors: usize) -> DynamicalVariables {
    let mut cadi: Array2<c64> = Array2::zeros((2, ntraj));
    cadi.row_mut(state).fill(c64::new(1.0, 0.0));
    DynamicalVariables::new(
        Array2::from_elem((1, ntraj), q),
        Array2::from_elem((1, ntraj), p),
        array![[1.0 / 2000.0]],
        Array2::zeros((2, ntraj)),
        cadi,
        vec![state; ntraj],
        vec![complex_eye(2); nprojectors],
    )
}
