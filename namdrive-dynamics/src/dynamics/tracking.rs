use crate::initialization::{ControlParameters, TrackingAlgorithm};
use crate::utils::{c64, dagger};
use ndarray::prelude::*;

/// Assigns the raw adiabatic states of a new snapshot to the dynamically
/// consistent states of the previous one.
pub trait StateTracker: Send + Sync {
    /// `weights[[i, j]]` is the squared overlap of consistent state `i` with the
    /// new raw state `j`. Returns a permutation, `perm[i]` is the raw state
    /// that continues consistent state `i`.
    fn assignment(&self, weights: ArrayView2<f64>) -> Vec<usize>;
}

/// Keep the energy ordering of the raw states
pub struct NoTracking;

/// Greedy assignment: repeatedly take the largest remaining overlap
pub struct MaxOverlapTracking;

/// Assignment that maximizes the total squared overlap
pub struct MinCostTracking;

impl StateTracker for NoTracking {
    fn assignment(&self, weights: ArrayView2<f64>) -> Vec<usize> {
        (0..weights.nrows()).collect()
    }
}

impl StateTracker for MaxOverlapTracking {
    fn assignment(&self, weights: ArrayView2<f64>) -> Vec<usize> {
        let n: usize = weights.nrows();
        let mut perm: Vec<usize> = vec![0; n];
        let mut row_done: Vec<bool> = vec![false; n];
        let mut col_done: Vec<bool> = vec![false; n];
        for _ in 0..n {
            let mut best: Option<(usize, usize, f64)> = None;
            for i in (0..n).filter(|i| !row_done[*i]) {
                for j in (0..n).filter(|j| !col_done[*j]) {
                    let w: f64 = weights[[i, j]];
                    match best {
                        Some((_, _, best_w)) if !(w > best_w) => {}
                        _ => best = Some((i, j, w)),
                    }
                }
            }
            if let Some((i, j, _)) = best {
                perm[i] = j;
                row_done[i] = true;
                col_done[j] = true;
            }
        }
        perm
    }
}

impl StateTracker for MinCostTracking {
    fn assignment(&self, weights: ArrayView2<f64>) -> Vec<usize> {
        let cost: Array2<f64> = weights.mapv(|w| if w.is_finite() { -w } else { 0.0 });
        min_cost_assignment(cost.view())
    }
}

pub fn tracker_from(algorithm: TrackingAlgorithm) -> Box<dyn StateTracker> {
    match algorithm {
        TrackingAlgorithm::None => Box::new(NoTracking),
        TrackingAlgorithm::MaxOverlap => Box::new(MaxOverlapTracking),
        TrackingAlgorithm::MinCost => Box::new(MinCostTracking),
    }
}

/// Solve the square assignment problem with the Hungarian method (O(n^3)).
/// Returns `assignment[row] = column` with minimal total cost.
pub fn min_cost_assignment(cost: ArrayView2<f64>) -> Vec<usize> {
    let n: usize = cost.nrows();
    // potentials and matching are 1-based, index 0 is the virtual start column
    let mut u: Vec<f64> = vec![0.0; n + 1];
    let mut v: Vec<f64> = vec![0.0; n + 1];
    let mut matched_row: Vec<usize> = vec![0; n + 1];
    let mut way: Vec<usize> = vec![0; n + 1];

    for row in 1..=n {
        matched_row[0] = row;
        let mut j0: usize = 0;
        let mut minv: Vec<f64> = vec![f64::INFINITY; n + 1];
        let mut used: Vec<bool> = vec![false; n + 1];
        loop {
            used[j0] = true;
            let i0: usize = matched_row[j0];
            let mut delta: f64 = f64::INFINITY;
            let mut j1: usize = 0;
            for j in 1..=n {
                if !used[j] {
                    let reduced: f64 = cost[[i0 - 1, j - 1]] - u[i0] - v[j];
                    if reduced < minv[j] {
                        minv[j] = reduced;
                        way[j] = j0;
                    }
                    if minv[j] < delta {
                        delta = minv[j];
                        j1 = j;
                    }
                }
            }
            for j in 0..=n {
                if used[j] {
                    u[matched_row[j]] += delta;
                    v[j] -= delta;
                } else {
                    minv[j] -= delta;
                }
            }
            j0 = j1;
            if matched_row[j0] == 0 {
                break;
            }
        }
        loop {
            let j1: usize = way[j0];
            matched_row[j0] = matched_row[j1];
            j0 = j1;
            if j0 == 0 {
                break;
            }
        }
    }

    let mut assignment: Vec<usize> = vec![0; n];
    for col in 1..=n {
        if matched_row[col] > 0 {
            assignment[matched_row[col] - 1] = col - 1;
        }
    }
    assignment
}

/// Phases that make the overlaps `x[[i, perm[i]]]` real and positive. Overlaps
/// smaller than `tol` keep the phase 1.
pub fn get_phase_corrections(x: ArrayView2<c64>, perm: &[usize], tol: f64) -> Array1<c64> {
    perm.iter()
        .enumerate()
        .map(|(i, j)| {
            let overlap: c64 = x[[i, *j]];
            let magnitude: f64 = overlap.norm();
            if magnitude > tol {
                overlap.conj() / magnitude
            } else {
                c64::new(1.0, 0.0)
            }
        })
        .collect()
}

/// Update the projector of one trajectory from the raw time overlap
/// `St_raw = U(t-1)^+ U(t)`.
///
/// With `X = P_old^+ St_raw` the tracker picks the permutation and the phase
/// correction the phases; `P_new[perm[i], i]` holds the phase of state `i`.
/// Returns `(P_new, St_cons)` with `St_cons = P_old^+ St_raw P_new`. As a
/// product of a permutation and a diagonal phase matrix `P_new` is unitary.
pub fn update_projector(
    st_raw: ArrayView2<c64>,
    p_old: ArrayView2<c64>,
    tracker: &dyn StateTracker,
    do_phase_correction: bool,
    tol: f64,
) -> (Array2<c64>, Array2<c64>) {
    let nadi: usize = p_old.nrows();
    let x: Array2<c64> = dagger(p_old).dot(&st_raw);
    let weights: Array2<f64> = x.mapv(|val| val.norm_sqr());
    let perm: Vec<usize> = tracker.assignment(weights.view());

    let phases: Array1<c64> = if do_phase_correction {
        get_phase_corrections(x.view(), &perm, tol)
    } else {
        Array1::from_elem(nadi, c64::new(1.0, 0.0))
    };

    let mut p_new: Array2<c64> = Array2::zeros((nadi, nadi));
    for (state, raw) in perm.iter().enumerate() {
        p_new[[*raw, state]] = phases[state];
    }
    let st_cons: Array2<c64> = x.dot(&p_new);
    (p_new, st_cons)
}

/// [update_projector] with the settings of a run
pub fn update_projector_with(
    st_raw: ArrayView2<c64>,
    p_old: ArrayView2<c64>,
    tracker: &dyn StateTracker,
    control: &ControlParameters,
) -> (Array2<c64>, Array2<c64>) {
    update_projector(
        st_raw,
        p_old,
        tracker,
        control.do_phase_correction,
        control.phase_correction_tol,
    )
}
