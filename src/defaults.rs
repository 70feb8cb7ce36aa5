// input file that is read if no file is given on the command line
pub const INPUT_FILE_NAME: &str = "namdrive.toml";
// -2 error, -1 warn, 0 info, 1 debug, 2 trace
pub const VERBOSE: i8 = 0;
pub const NUMBER_OF_CORES: usize = 1;
pub const CONTINUE_ON_ERROR: bool = false;

// MODEL HAMILTONIANS
// one of "sac", "harmonic" or "tabulated"
pub const MODEL: &str = "sac";
// Tully's single avoided crossing, J. C. Tully, J. Chem. Phys. 93, 1061 (1990)
pub const SAC_A: f64 = 0.01;
pub const SAC_B: f64 = 1.6;
pub const SAC_C: f64 = 0.005;
pub const SAC_D: f64 = 1.0;
// two shifted parabolas, all values in atomic units
pub const HARMONIC_FORCE_CONSTANT: f64 = 0.01;
pub const HARMONIC_CENTERS: [f64; 2] = [-1.0, 1.0];
pub const HARMONIC_ENERGIES: [f64; 2] = [0.0, -0.01];
pub const HARMONIC_COUPLING: f64 = 0.001;
// directory with the Hvib_re_<n>.npy and St_re_<n>.npy files
pub const TABULATED_PREFIX: &str = "hvib";

// INITIAL CONDITIONS
// mean coordinates, momenta and masses of the default set
pub const Q0: f64 = -4.0;
pub const P0: f64 = 20.0;
pub const MASS: f64 = 2000.0;
