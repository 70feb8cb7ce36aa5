use crate::dynamics::Thermostat;
use crate::errors::DynamicsError;
use crate::initialization::{ControlParameters, DynamicalVariables, Representation};
use crate::utils::{c64, dagger, eigh, to_complex};
use ndarray::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;

/// Parameters handed to a [HamiltonianAdapter] together with the coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelRequest {
    /// index of the tabulated snapshot, `(i + icond) mod nfiles`
    pub timestep: usize,
    /// number of children of the hierarchy, `ntraj` or 1 in reduced mode
    pub nchildren: usize,
    /// basis in which the model defines its Hamiltonian
    pub rep_ham: Representation,
}

/// Electronic-structure data of a single trajectory
#[derive(Clone, Debug)]
pub struct HamiltonianData {
    /// ndia x ndia
    pub ham_dia: Array2<c64>,
    /// nadi x nadi, diagonal in the raw adiabatic basis
    pub ham_adi: Array2<c64>,
    /// derivatives of the diabatic Hamiltonian, one matrix per DOF
    pub d1ham_dia: Vec<Array2<c64>>,
    /// `U^+ dH U`, one matrix per DOF
    pub d1ham_adi: Vec<Array2<c64>>,
    /// derivative couplings `<i|d/dR j>`, one matrix per DOF
    pub dc1_adi: Vec<Array2<c64>>,
    /// raw adiabatic basis in terms of the diabatic one, ndia x nadi
    pub basis_transform: Array2<c64>,
    /// overlap of the adiabatic states at the previous and current snapshot
    pub time_overlap_adi: Option<Array2<c64>>,
}

impl HamiltonianData {
    /// Build the adiabatic data from a diabatic Hamiltonian and its derivatives
    /// by diagonalization.
    pub fn from_diabatic(ham_dia: Array2<c64>, d1ham_dia: Vec<Array2<c64>>) -> Self {
        let (energies, basis_transform): (Array1<f64>, Array2<c64>) = eigh(ham_dia.view());
        let nadi: usize = energies.len();
        let u_dagger: Array2<c64> = dagger(basis_transform.view());

        let d1ham_adi: Vec<Array2<c64>> = d1ham_dia
            .iter()
            .map(|d1ham| u_dagger.dot(d1ham).dot(&basis_transform))
            .collect();
        let dc1_adi: Vec<Array2<c64>> = d1ham_adi
            .iter()
            .map(|d1ham| {
                Array2::from_shape_fn((nadi, nadi), |(i, j)| {
                    let gap: f64 = energies[j] - energies[i];
                    if i == j || gap.abs() < f64::EPSILON {
                        c64::new(0.0, 0.0)
                    } else {
                        d1ham[[i, j]] / gap
                    }
                })
            })
            .collect();

        HamiltonianData {
            ham_dia,
            ham_adi: Array::from_diag(&to_complex(&energies)),
            d1ham_dia,
            d1ham_adi,
            dc1_adi,
            basis_transform,
            time_overlap_adi: None,
        }
    }

    /// Build the data of a model that is only known in the adiabatic basis.
    /// The diabatic basis is identified with the adiabatic one.
    pub fn from_adiabatic(
        ham_adi: Array2<c64>,
        d1ham_adi: Vec<Array2<c64>>,
        dc1_adi: Vec<Array2<c64>>,
        time_overlap_adi: Option<Array2<c64>>,
    ) -> Self {
        let nadi: usize = ham_adi.nrows();
        HamiltonianData {
            ham_dia: ham_adi.clone(),
            ham_adi,
            d1ham_dia: d1ham_adi.clone(),
            d1ham_adi,
            dc1_adi,
            basis_transform: Array2::from_diag(&Array1::from_elem(nadi, c64::new(1.0, 0.0))),
            time_overlap_adi,
        }
    }

    pub fn ndia(&self) -> usize {
        self.ham_dia.nrows()
    }

    pub fn nadi(&self) -> usize {
        self.ham_adi.nrows()
    }

    /// Raw adiabatic energies
    pub fn adiabatic_energies(&self) -> Array1<f64> {
        self.ham_adi.diag().mapv(|val| val.re)
    }

    /// Vibronic Hamiltonian in the raw adiabatic basis, `H_adi - i sum_k v_k d_k`
    pub fn hvib_adi(&self, p: ArrayView1<f64>, i_m: ArrayView1<f64>) -> Array2<c64> {
        let mut hvib: Array2<c64> = self.ham_adi.clone();
        for (dof, dc1) in self.dc1_adi.iter().enumerate() {
            let velocity: f64 = p[dof] * i_m[dof];
            hvib.scaled_add(c64::new(0.0, -velocity), dc1);
        }
        hvib
    }

    /// Vibronic Hamiltonian in the diabatic basis. The diabatic states do not
    /// depend on the coordinates, so there is no coupling term.
    pub fn hvib_dia(&self) -> Array2<c64> {
        self.ham_dia.clone()
    }
}

/// One [HamiltonianData] per trajectory (one shared child in reduced mode)
#[derive(Clone, Debug)]
pub struct HamiltonianHierarchy {
    pub children: Vec<HamiltonianData>,
}

impl HamiltonianHierarchy {
    pub fn new(children: Vec<HamiltonianData>) -> Self {
        HamiltonianHierarchy { children }
    }

    pub fn nchildren(&self) -> usize {
        self.children.len()
    }

    /// The data that belongs to trajectory `traj`
    pub fn child(&self, traj: usize) -> &HamiltonianData {
        if self.children.len() == 1 {
            &self.children[0]
        } else {
            &self.children[traj]
        }
    }
}

/// Trait that provides the interface to an electronic-structure model. For
/// identical coordinates and requests the results must be identical.
pub trait HamiltonianAdapter: Sync {
    /// Hamiltonian data of a single trajectory with coordinates `q`
    fn compute_single(
        &self,
        q: ArrayView1<f64>,
        request: &ModelRequest,
    ) -> Result<HamiltonianData, DynamicsError>;

    /// Hamiltonian data of the whole ensemble. Child `j` is computed from the
    /// coordinates of trajectory `j`; a single child uses trajectory 0.
    fn compute_model(
        &self,
        q: ArrayView2<f64>,
        request: &ModelRequest,
    ) -> Result<HamiltonianHierarchy, DynamicsError> {
        if request.nchildren == 0 || request.nchildren > q.ncols() {
            return Err(DynamicsError::invalid(format!(
                "{} children were requested for {} trajectories",
                request.nchildren,
                q.ncols()
            )));
        }
        let children: Vec<HamiltonianData> = (0..request.nchildren)
            .into_par_iter()
            .map(|traj| self.compute_single(q.column(traj), request))
            .collect::<Result<Vec<HamiltonianData>, DynamicsError>>()?;
        Ok(HamiltonianHierarchy::new(children))
    }
}

/// Advances the whole ensemble by one nuclear timestep
pub trait Propagator {
    /// Mutates `dyn_var` and `ham` in place. Projectors stay unitary and the
    /// amplitudes keep their norm, except for decoherence collapses.
    fn advance(
        &mut self,
        dyn_var: &mut DynamicalVariables,
        ham: &mut HamiltonianHierarchy,
        adapter: &dyn HamiltonianAdapter,
        request: &ModelRequest,
        control: &ControlParameters,
        rng: &mut StdRng,
        thermostats: &mut [Box<dyn Thermostat>],
    ) -> Result<(), DynamicsError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::unitarity_error;
    use approx::assert_abs_diff_eq;

    fn two_level(x: f64) -> (Array2<c64>, Vec<Array2<c64>>) {
        let ham: Array2<c64> = array![
            [c64::new(x, 0.0), c64::new(0.01, 0.0)],
            [c64::new(0.01, 0.0), c64::new(-x, 0.0)]
        ];
        let d1ham: Array2<c64> = array![
            [c64::new(1.0, 0.0), c64::new(0.0, 0.0)],
            [c64::new(0.0, 0.0), c64::new(-1.0, 0.0)]
        ];
        (ham, vec![d1ham])
    }

    #[test]
    fn diabatic_data_is_diagonalized() {
        let (ham, d1ham) = two_level(0.02);
        let data = HamiltonianData::from_diabatic(ham, d1ham);
        let energies: Array1<f64> = data.adiabatic_energies();
        assert!(energies[0] < energies[1]);
        assert_abs_diff_eq!(energies[1], (0.02_f64.powi(2) + 0.01_f64.powi(2)).sqrt(), epsilon = 1e-12);
        assert!(unitarity_error(data.basis_transform.view()) < 1e-12);
    }

    #[test]
    fn derivative_couplings_are_antihermitian() {
        let (ham, d1ham) = two_level(0.005);
        let data = HamiltonianData::from_diabatic(ham, d1ham);
        let dc1: &Array2<c64> = &data.dc1_adi[0];
        let sum: c64 = dc1[[0, 1]] + dc1[[1, 0]].conj();
        assert_abs_diff_eq!(sum.norm(), 0.0, epsilon = 1e-10);
        assert_eq!(dc1[[0, 0]], c64::new(0.0, 0.0));
    }

    #[test]
    fn vibronic_hamiltonian_is_hermitian() {
        let (ham, d1ham) = two_level(0.005);
        let data = HamiltonianData::from_diabatic(ham, d1ham);
        let hvib: Array2<c64> = data.hvib_adi(array![10.0].view(), array![1.0 / 2000.0].view());
        let diff: c64 = hvib[[0, 1]] - hvib[[1, 0]].conj();
        assert_abs_diff_eq!(diff.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn shared_child() {
        let (ham, d1ham) = two_level(0.0);
        let hierarchy = HamiltonianHierarchy::new(vec![HamiltonianData::from_diabatic(ham, d1ham)]);
        assert_eq!(hierarchy.child(5).nadi(), 2);
    }
}
