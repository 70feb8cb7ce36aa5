use crate::errors::DynamicsError;
use crate::initialization::Representation;
use crate::utils::c64;
use ndarray::prelude::*;

/// The complete per-run state of the ensemble. Columns of every matrix index
/// the trajectories.
#[derive(Clone, Debug)]
pub struct DynamicalVariables {
    /// coordinates, ndof x ntraj
    pub q: Array2<f64>,
    /// momenta, ndof x ntraj
    pub p: Array2<f64>,
    /// inverse masses, ndof x 1
    pub i_m: Array2<f64>,
    /// diabatic amplitudes, ndia x ntraj
    pub cdia: Array2<c64>,
    /// adiabatic amplitudes in the dynamically consistent basis, nadi x ntraj
    pub cadi: Array2<c64>,
    /// active state of every trajectory
    pub act_states: Vec<usize>,
    /// cumulative projectors, one per trajectory or one shared in reduced mode
    pub projectors: Vec<Array2<c64>>,
}

impl DynamicalVariables {
    pub fn new(
        q: Array2<f64>,
        p: Array2<f64>,
        i_m: Array2<f64>,
        cdia: Array2<c64>,
        cadi: Array2<c64>,
        act_states: Vec<usize>,
        projectors: Vec<Array2<c64>>,
    ) -> Self {
        DynamicalVariables {
            q,
            p,
            i_m,
            cdia,
            cadi,
            act_states,
            projectors,
        }
    }

    pub fn ndof(&self) -> usize {
        self.q.nrows()
    }

    pub fn ntraj(&self) -> usize {
        self.q.ncols()
    }

    pub fn ndia(&self) -> usize {
        self.cdia.nrows()
    }

    pub fn nadi(&self) -> usize {
        self.cadi.nrows()
    }

    /// The projector belonging to trajectory `traj`
    pub fn projector(&self, traj: usize) -> &Array2<c64> {
        if self.projectors.len() == 1 {
            &self.projectors[0]
        } else {
            &self.projectors[traj]
        }
    }

    /// Check that all containers agree on the number of trajectories, DOFs and
    /// states. In reduced mode exactly one projector is expected. Active
    /// states index the basis `rep_sh` in which hops are made.
    pub fn check_dimensions(
        &self,
        is_nbra: bool,
        rep_sh: Representation,
    ) -> Result<(), DynamicsError> {
        let (ndof, ntraj): (usize, usize) = self.q.dim();
        let nadi: usize = self.nadi();
        if ntraj == 0 {
            return Err(DynamicsError::invalid("the ensemble contains no trajectories"));
        }
        if self.p.dim() != (ndof, ntraj) {
            return Err(DynamicsError::invalid(format!(
                "the shape of p is {:?}, but the shape of q is {:?}",
                self.p.dim(),
                (ndof, ntraj)
            )));
        }
        if self.i_m.dim() != (ndof, 1) {
            return Err(DynamicsError::invalid(format!(
                "the shape of iM is {:?}, but should be {:?}",
                self.i_m.dim(),
                (ndof, 1)
            )));
        }
        if self.cdia.ncols() != ntraj || self.cadi.ncols() != ntraj {
            return Err(DynamicsError::invalid(format!(
                "Cdia has {} and Cadi has {} columns, but there are {} trajectories",
                self.cdia.ncols(),
                self.cadi.ncols(),
                ntraj
            )));
        }
        if self.act_states.len() != ntraj {
            return Err(DynamicsError::invalid(format!(
                "there are {} active states for {} trajectories",
                self.act_states.len(),
                ntraj
            )));
        }
        let nproj: usize = if is_nbra { 1 } else { ntraj };
        if self.projectors.len() != nproj {
            return Err(DynamicsError::invalid(format!(
                "there are {} projectors, but {} are expected",
                self.projectors.len(),
                nproj
            )));
        }
        if let Some(proj) = self.projectors.iter().find(|proj| proj.dim() != (nadi, nadi)) {
            return Err(DynamicsError::invalid(format!(
                "a projector has the shape {:?}, but should be {:?}",
                proj.dim(),
                (nadi, nadi)
            )));
        }
        let nstates: usize = match rep_sh {
            Representation::Diabatic => self.ndia(),
            Representation::Adiabatic => nadi,
        };
        if let Some(state) = self.act_states.iter().find(|state| **state >= nstates) {
            return Err(DynamicsError::invalid(format!(
                "the active state {} is out of range for {} {:?} states",
                state, nstates, rep_sh
            )));
        }
        Ok(())
    }
}
