use crate::initialization::ControlParameters;
use log::{info, warn};

pub fn print_header_dynamics(ntraj: usize, control: &ControlParameters) {
    warn!("{:^90}", "");
    warn!("{: ^90}", "Nonadiabatic Molecular Dynamics");
    warn!("{:-^90}", "");
    info!("{: <35} {:>12}", "number of trajectories:", ntraj);
    info!("{: <35} {:>12}", "number of steps:", control.nsteps);
    info!("{: <35} {:>12.4}", "timestep (a.u.):", control.dt);
    info!("{: <35} {:>12}", "propagated representation:", format!("{:?}", control.rep_tdse));
    info!("{: <35} {:>12}", "surface hopping method:", format!("{:?}", control.tsh_method));
    info!("{: <35} {:>12}", "decoherence:", format!("{:?}", control.decoherence));
    info!("{: <35} {:>12}", "reduced (NBRA) mode:", control.is_nbra);
    warn!("{:-^90}", "");
}

pub fn print_progress(step: usize, nsteps: usize, timing: f64) {
    info!(
        "{:>40} {:>8} / {:<8} {:>16.2} s",
        "step", step, nsteps, timing
    );
}

pub fn print_footer_dynamics(timing: f64) {
    warn!("{:-<90} ", "");
    warn!(
        "{:>78} {:>8.2} s",
        "Molecular Dynamics finished in", timing
    );
}

pub fn print_set_header(index: usize, nsets: usize, prefix: &str) {
    warn!("{:^90}", "");
    warn!("{: ^90}", format!("Initial conditions set {} / {}", index + 1, nsets));
    warn!("{: ^90}", format!("output prefix: {}", prefix));
    warn!("{:-^90}", "");
}
