use crate::dynamics::engine::run_dynamics;
use crate::dynamics::propagator::ReferencePropagator;
use crate::dynamics::representation::init_amplitudes;
use crate::errors::DynamicsError;
use crate::initialization::{
    init_electronic_dyn_var, init_nuclear_dyn_var, ControlParameters, DynamicConfiguration,
    DynamicalVariables, ElectronicInitConfiguration, NuclearInitConfiguration, Representation,
};
use crate::interface::{HamiltonianAdapter, ModelRequest};
use crate::output::{print_set_header, MemorySaver};
use crate::utils::c64;
use log::{debug, warn};
use ndarray::prelude::*;
use rand::rngs::StdRng;

/// Sample the electronic variables for the nuclear ensemble `q`, `p`, `i_m`
/// and propagate it with the [ReferencePropagator]. If the amplitudes are
/// sampled in another representation than the one that is propagated, they
/// are transformed with the Hamiltonian of `model0`, or of `adapter` if no
/// separate initial model is given.
pub fn generic_recipe(
    q: Array2<f64>,
    p: Array2<f64>,
    i_m: Array2<f64>,
    dyn_config: &DynamicConfiguration,
    adapter: &dyn HamiltonianAdapter,
    model0: Option<&dyn HamiltonianAdapter>,
    elec: &ElectronicInitConfiguration,
    rng: &mut StdRng,
) -> Result<Option<MemorySaver>, DynamicsError> {
    let control: ControlParameters = dyn_config.validate(q.nrows())?;

    let mut elec_params: ElectronicInitConfiguration = elec.clone();
    if elec_params.ntraj != q.ncols() {
        debug!(
            "electronic sampling: ntraj {} replaced by the size of the nuclear ensemble {}",
            elec_params.ntraj,
            q.ncols()
        );
        elec_params.ntraj = q.ncols();
    }
    elec_params.is_nbra = dyn_config.is_nbra;
    let rep_init: Representation =
        Representation::from_code("rep", elec.rep).map_err(|err| err.promote())?;

    let (mut cdia, mut cadi, projectors, states): (
        Array2<c64>,
        Array2<c64>,
        Vec<Array2<c64>>,
        Vec<usize>,
    ) = init_electronic_dyn_var(&elec_params, rng)?;

    if rep_init != control.rep_tdse {
        let request = ModelRequest {
            timestep: control.icond,
            nchildren: if control.is_nbra { 1 } else { q.ncols() },
            rep_ham: control.rep_ham,
        };
        init_amplitudes(
            q.view(),
            &mut cdia,
            &mut cadi,
            model0.unwrap_or(adapter),
            &request,
            rep_init,
            control.rep_tdse,
        )?;
    }

    let mut dyn_var = DynamicalVariables::new(q, p, i_m, cdia, cadi, states, projectors);
    let mut propagator = ReferencePropagator::new(&control);
    run_dynamics(&mut dyn_var, adapter, &mut propagator, &control, rng)
}

/// Mean geometry, momenta and masses of one set of initial conditions with
/// the settings of its ensemble
#[derive(Clone, Debug)]
pub struct InitialConditionSet {
    pub q0: Vec<f64>,
    pub p0: Vec<f64>,
    pub masses: Vec<f64>,
    pub dynamics: DynamicConfiguration,
    pub nuclear: NuclearInitConfiguration,
    pub electronic: ElectronicInitConfiguration,
}

/// A set whose run did not complete
#[derive(Debug)]
pub struct SetFailure {
    pub index: usize,
    pub error: DynamicsError,
}

/// Outcome of [run_multiple_sets], one entry per completed set
#[derive(Debug, Default)]
pub struct MultipleSetsResult {
    pub completed: Vec<(usize, Option<MemorySaver>)>,
    pub failures: Vec<SetFailure>,
}

/// Run every set one after the other. The output of set `idx` is written
/// with the prefix `<prefix>_<idx>`. The first failing set aborts the whole
/// run, unless `continue_on_error` is set.
pub fn run_multiple_sets(
    sets: &[InitialConditionSet],
    adapter: &dyn HamiltonianAdapter,
    model0: Option<&dyn HamiltonianAdapter>,
    continue_on_error: bool,
    rng: &mut StdRng,
) -> Result<MultipleSetsResult, DynamicsError> {
    let mut result = MultipleSetsResult::default();
    for (idx, set) in sets.iter().enumerate() {
        let mut dyn_config: DynamicConfiguration = set.dynamics.clone();
        dyn_config.output.prefix = format!("{}_{}", set.dynamics.output.prefix, idx);
        dyn_config.output.prefix2 = format!("{}_{}", set.dynamics.output.prefix2, idx);
        print_set_header(idx, sets.len(), &dyn_config.output.prefix);

        let outcome: Result<Option<MemorySaver>, DynamicsError> =
            init_nuclear_dyn_var(&set.q0, &set.p0, &set.masses, &set.nuclear, rng).and_then(
                |(q, p, i_m)| {
                    generic_recipe(
                        q,
                        p,
                        i_m,
                        &dyn_config,
                        adapter,
                        model0,
                        &set.electronic,
                        rng,
                    )
                },
            );
        match outcome {
            Ok(saver) => result.completed.push((idx, saver)),
            Err(error) if continue_on_error => {
                warn!("WARNING: set {} failed: {}", idx, error);
                result.failures.push(SetFailure { index: idx, error });
            }
            Err(error) => return Err(error),
        }
    }
    Ok(result)
}
