use crate::io::Configuration;
use crate::utils::Timer;
use clap::{crate_name, crate_version};
use log::{info, warn};

const LOG_WIDTH: usize = 80;
const BANNER: [&str; 3] = [
    "Ensemble driver for nonadiabatic molecular dynamics",
    "surface hopping and Ehrenfest",
    "model and tabulated Hamiltonians",
];

pub fn write_header(config: &Configuration) {
    let title: String = format!("{} {}", crate_name!().to_uppercase(), crate_version!());
    warn!("{:=^LOG_WIDTH$}", "");
    warn!("{: ^LOG_WIDTH$}", title);
    warn!("{:-^LOG_WIDTH$}", "");
    for line in BANNER.iter() {
        warn!("{: ^LOG_WIDTH$}", line);
    }
    warn!("{:=^LOG_WIDTH$}", "");
    info!("{: <35} {:>12}", "model Hamiltonian:", config.model.model);
    if let Some(model0) = &config.model0 {
        info!("{: <35} {:>12}", "initial model Hamiltonian:", model0.model);
    }
    info!("{: <35} {:>12}", "sets of initial conditions:", config.sets.len());
    info!(
        "{: <35} {:>12}",
        "threads:", config.parallelization.number_of_cores
    );
    match config.dynamics.seed {
        Some(seed) => info!("{: <35} {:>12}", "random seed:", seed),
        None => info!("{: <35} {:>12}", "random seed:", "entropy"),
    }
    warn!("{: ^LOG_WIDTH$}", "");
}

pub fn write_footer(timer: Timer, completed: usize, nsets: usize) {
    warn!("{: ^LOG_WIDTH$}", "");
    warn!("{:>68} {:>8}", "completed sets:", format!("{} / {}", completed, nsets));
    warn!("{:>68} {:>8.2} s", "total elapsed time:", timer.elapsed());
    warn!("{:=^LOG_WIDTH$}", "");
}
