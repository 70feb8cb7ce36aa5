mod common;

use approx::assert_abs_diff_eq;
use common::*;
use namdrive_dynamics::dynamics::{run_dynamics, ReferencePropagator};
use namdrive_dynamics::errors::DynamicsError;
use namdrive_dynamics::initialization::{ControlParameters, DynamicalVariables};
use namdrive_dynamics::output::{MemorySaver, Observable};
use namdrive_dynamics::utils::{c64, unitarity_error};
use ndarray::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn complex_records(saver: &MemorySaver, name: &str) -> Vec<Array2<c64>> {
    saver
        .get(name)
        .iter()
        .filter_map(|record| match &record.value {
            Observable::Complex(arr) => Some(arr.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn snapshots_are_cycled_through() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = configuration(dir.path());
    config.nsteps = 5;
    config.icond = 1;
    config.nfiles = 3;
    let control: ControlParameters = control(&config, 1);
    let adapter = Recording::new(AvoidedCrossing);
    let mut dyn_var: DynamicalVariables = variables(-4.0, 20.0, 2, 0, 2);
    let mut propagator = ReferencePropagator::new(&control);
    let mut rng = StdRng::seed_from_u64(3);
    run_dynamics(&mut dyn_var, &adapter, &mut propagator, &control, &mut rng).unwrap();

    // initial geometry first, then one request per step
    assert_eq!(adapter.timesteps(), vec![1, 1, 2, 0, 1, 2]);
}

#[test]
fn reordered_and_sign_flipped_states_are_followed() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = configuration(dir.path());
    config.nsteps = 6;
    config.dt = 20.0;
    config.force_method = 0;
    config.output.mem_output_level = 3;
    let control: ControlParameters = control(&config, 1);
    let mut dyn_var: DynamicalVariables = variables(0.0, 0.0, 1, 0, 1);
    let mut propagator = ReferencePropagator::new(&control);
    let mut rng = StdRng::seed_from_u64(4);
    let saver: MemorySaver =
        run_dynamics(&mut dyn_var, &Reordering, &mut propagator, &control, &mut rng)
            .unwrap()
            .unwrap();

    // the lower state keeps its identity although its raw index alternates
    let ground: f64 = -(0.01_f64.powi(2) + 0.002_f64.powi(2)).sqrt();
    for epot in saver.scalars("Epot_ave") {
        assert_abs_diff_eq!(epot, ground, epsilon = 1e-12);
    }
    assert_eq!(dyn_var.act_states, vec![0]);
    assert_abs_diff_eq!(dyn_var.cadi[[0, 0]].norm(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(dyn_var.cadi[[1, 0]].norm(), 0.0, epsilon = 1e-12);

    // the diabatic density does not see the reordering
    let densities: Vec<Array2<c64>> = complex_records(&saver, "D_dia");
    assert_eq!(densities.len(), 6);
    for dm in densities.iter() {
        for (val, reference) in dm.iter().zip(densities[0].iter()) {
            assert_abs_diff_eq!(val.re, reference.re, epsilon = 1e-10);
            assert_abs_diff_eq!(val.im, reference.im, epsilon = 1e-10);
        }
    }
    // while the raw populations switch between the two raw states
    let raw_pops: Vec<f64> = saver
        .get("SH_pop_raw")
        .iter()
        .filter_map(|record| match &record.value {
            Observable::Real(arr) => Some(arr[[0, 0]]),
            _ => None,
        })
        .collect();
    assert_eq!(raw_pops.len(), 6);
    assert_abs_diff_eq!(raw_pops[0], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(raw_pops[1], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(raw_pops[2], 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(raw_pops[3], 1.0, epsilon = 1e-12);

    // after the last step (snapshot 5) the states are swapped
    let proj: &Array2<c64> = &dyn_var.projectors[0];
    assert!(unitarity_error(proj.view()) < 1e-12);
    assert_abs_diff_eq!(proj[[0, 0]].norm(), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(proj[[1, 0]].norm(), 1.0, epsilon = 1e-12);
}

#[test]
fn reduced_mode_shares_one_hamiltonian() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = configuration(dir.path());
    config.nsteps = 4;
    config.is_nbra = 1;
    config.force_method = 0;
    config.output.mem_output_level = 4;
    config.output.properties_to_save = vec!["Etot_ave".to_string(), "St".to_string()];
    let control: ControlParameters = control(&config, 1);
    let mut dyn_var: DynamicalVariables = variables(-1.0, 0.0, 3, 0, 1);
    let mut propagator = ReferencePropagator::new(&control);
    let mut rng = StdRng::seed_from_u64(6);
    let saver: MemorySaver =
        run_dynamics(&mut dyn_var, &AvoidedCrossing, &mut propagator, &control, &mut rng)
            .unwrap()
            .unwrap();

    for etot in saver.scalars("Etot_ave") {
        assert_eq!(etot, 0.0);
    }
    let overlaps = saver.get("St");
    assert_eq!(overlaps.len(), 4);
    assert!(overlaps.iter().all(|record| record.traj == Some(0)));
    assert_eq!(dyn_var.projectors.len(), 1);
    for traj in 0..3 {
        let norm: f64 = dyn_var.cadi.column(traj).iter().map(|c| c.norm_sqr()).sum();
        assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-12);
    }
}

#[test]
fn supplied_time_overlaps_are_used() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = configuration(dir.path());
    config.nsteps = 4;
    config.force_method = 0;
    config.time_overlap_method = 1;
    config.output.mem_output_level = 4;
    config.output.properties_to_save = vec!["St".to_string(), "projector".to_string()];
    let control: ControlParameters = control(&config, 1);
    let mut dyn_var: DynamicalVariables = variables(0.0, 0.0, 2, 0, 2);
    let mut propagator = ReferencePropagator::new(&control);
    let mut rng = StdRng::seed_from_u64(13);
    let saver: MemorySaver =
        run_dynamics(&mut dyn_var, &SignFlipping, &mut propagator, &control, &mut rng)
            .unwrap()
            .unwrap();

    let overlaps: Vec<Array2<c64>> = complex_records(&saver, "St");
    assert_eq!(overlaps.len(), 8);
    for st in overlaps.iter() {
        assert_eq!(st, &real(array![[1.0, 0.0], [0.0, -1.0]]));
    }
    // the projector absorbs the sign of the second state in every other step
    let records = saver.get("projector");
    assert_eq!(records.len(), 8);
    for record in records.iter() {
        let sign: f64 = if record.step % 2 == 0 { 1.0 } else { -1.0 };
        match &record.value {
            Observable::Complex(proj) => {
                assert!(unitarity_error(proj.view()) < 1e-12);
                assert_abs_diff_eq!(proj[[0, 0]].re, 1.0, epsilon = 1e-12);
                assert_abs_diff_eq!(proj[[1, 1]].re, sign, epsilon = 1e-12);
            }
            other => panic!("unexpected value {:?}", other),
        }
    }
    // without couplings the population stays in the initial state
    for traj in 0..2 {
        assert_abs_diff_eq!(dyn_var.cadi[[0, traj]].norm(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dyn_var.cadi[[1, traj]].norm(), 0.0, epsilon = 1e-12);
    }
}

#[test]
fn missing_time_overlaps_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = configuration(dir.path());
    config.nsteps = 2;
    config.time_overlap_method = 1;
    let control: ControlParameters = control(&config, 1);
    let mut dyn_var: DynamicalVariables = variables(-4.0, 20.0, 2, 0, 2);
    let mut propagator = ReferencePropagator::new(&control);
    let mut rng = StdRng::seed_from_u64(14);
    let outcome = run_dynamics(&mut dyn_var, &AvoidedCrossing, &mut propagator, &control, &mut rng);
    assert!(matches!(outcome, Err(DynamicsError::PropagationFailure(_))));
}
