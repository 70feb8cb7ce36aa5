pub use engine::{file_index, run_dynamics, PropagationEngine};
pub use propagator::ReferencePropagator;
pub use recipes::*;
pub use representation::*;
pub use statistics::*;
pub use thermostat::*;

pub mod decoherence;
pub mod engine;
pub mod hopping;
pub mod propagator;
pub mod recipes;
pub mod representation;
pub mod statistics;
pub mod thermostat;
pub mod tracking;
