use crate::defaults::INPUT_FILE_NAME;
use crate::io::{read_input, write_footer, write_header, Configuration};
use crate::models::model_from;
use crate::utils::Timer;
use anyhow::{Context, Result};
use clap::{crate_name, crate_version, Arg, Command};
use env_logger::Builder;
use log::{warn, LevelFilter};
use namdrive_dynamics::dynamics::{run_multiple_sets, InitialConditionSet, MultipleSetsResult};
use namdrive_dynamics::interface::HamiltonianAdapter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;
use std::path::Path;
use std::process;

mod defaults;
mod io;
mod models;
mod utils;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:?}", err);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    // Input.
    let matches = Command::new(crate_name!())
        .version(crate_version!())
        .about("ensemble driver for nonadiabatic molecular dynamics")
        .arg(
            Arg::new("input-File")
                .help("Sets the input file to use")
                .required(false)
                .index(1),
        )
        .get_matches();
    let input_file: &str = matches.value_of("input-File").unwrap_or(INPUT_FILE_NAME);
    let config: Configuration = read_input(Path::new(input_file))?;

    // Multithreading.
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.parallelization.number_of_cores)
        .build_global()
        .context("Unable to set up the thread pool")?;

    // Logging.
    // The log level is set.
    let log_level: LevelFilter = match config.verbose {
        2 => LevelFilter::Trace,
        1 => LevelFilter::Debug,
        0 => LevelFilter::Info,
        -1 => LevelFilter::Warn,
        -2 => LevelFilter::Error,
        _ => LevelFilter::Info,
    };
    // and the logger is build.
    Builder::new()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .filter(None, log_level)
        .init();

    // The program header is written to the command line.
    write_header(&config);
    // and the total wall-time timer is started.
    let timer: Timer = Timer::start();

    let adapter: Box<dyn HamiltonianAdapter> = model_from(&config.model)?;
    let model0: Option<Box<dyn HamiltonianAdapter>> = match &config.model0 {
        Some(model_config) => Some(model_from(model_config)?),
        None => None,
    };
    let sets: Vec<InitialConditionSet> = config.initial_condition_sets();
    let mut rng: StdRng = match config.dynamics.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let result: MultipleSetsResult =
        run_multiple_sets(
            &sets,
            adapter.as_ref(),
            model0.as_deref(),
            config.continue_on_error,
            &mut rng,
        )
        .context("The dynamics failed")?;
    for failure in result.failures.iter() {
        warn!("set {} did not finish: {}", failure.index, failure.error);
    }

    write_footer(timer, result.completed.len(), sets.len());
    Ok(())
}
