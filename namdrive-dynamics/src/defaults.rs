// dynamics settings read by DynamicConfiguration::from_file
pub const CONFIG_FILE_NAME: &str = "dynamics.toml";
// file written by the in-memory saver at the end of a run
pub const MEM_DATA_FILE_NAME: &str = "mem_data.json";
// archive streamed by the binary saver
pub const NPZ_DATA_FILE_NAME: &str = "data.npz";
// number of nuclear steps
pub const NSTEPS: usize = 1;
// nuclear and electronic timestep in a.u. of time (1 fs)
pub const DT: f64 = 41.0;
pub const NUM_ELECTRONIC_SUBSTEPS: usize = 1;
// representation codes: 0 - diabatic, 1 - adiabatic
pub const REP_TDSE: i32 = 1;
pub const REP_HAM: i32 = 0;
pub const REP_SH: i32 = 1;
pub const REP_FORCE: i32 = 1;
// 0 - no forces, 1 - state-specific, 2 - Ehrenfest
pub const FORCE_METHOD: i32 = 1;
// 0 - on-the-fly from the basis transforms, 1 - supplied by the Hamiltonian
pub const TIME_OVERLAP_METHOD: i32 = 0;
pub const DO_PHASE_CORRECTION: i32 = 1;
// smallest overlap magnitude for which a phase is extracted
pub const PHASE_CORRECTION_TOL: f64 = 1.0e-3;
// 0 - no tracking, 1 - greedy maximal overlap, 2 - minimal-cost assignment
pub const STATE_TRACKING_ALGO: i32 = 2;
// -1 - no hops, 0 - FSSH, 1 - GFSH, 2 - MSSH
pub const TSH_METHOD: i32 = -1;
// 0 - accept all, 10 - adiabatic energy, 31 - quantum Boltzmann
pub const HOP_ACCEPTANCE_ALGO: i32 = 0;
// 0 - no rescaling, 100 - uniform, 101 - uniform with reversal on frustrated hops
pub const MOMENTA_RESCALING_ALGO: i32 = 0;
// -1 - none, 0 - energy-based decoherence correction, 1 - instantaneous decoherence
pub const DECOHERENCE_ALGO: i32 = -1;
// empirical parameters of the energy-based decoherence correction (hartree)
pub const DECOHERENCE_C_PARAM: f64 = 1.0;
pub const DECOHERENCE_EPS_PARAM: f64 = 0.1;
// 0 - rescale the amplitudes and keep their phase, 1 - reset them to 1+0i
pub const COLLAPSE_OPTION: i32 = 0;
// temperature (K)
pub const TEMPERATURE: f64 = 300.0;
// 0 - NVE, 1 - NVT
pub const ENSEMBLE: i32 = 0;
// 0 - Nose-Hoover chain, 1 - Berendsen
pub const THERMOSTAT_TYPE: i32 = 0;
// coupling time of the bath in a.u. of time
pub const THERMOSTAT_TAU: f64 = 1000.0;
// number of thermostats in a Nose-Hoover chain
pub const NHC_SIZE: usize = 1;
pub const IS_NBRA: i32 = 0;
pub const ICOND: usize = 0;
pub const NFILES: usize = 1;
pub const PREFIX: &str = "out";
pub const PREFIX2: &str = "out2";
pub const MEM_OUTPUT_LEVEL: i32 = -1;
pub const TXT_OUTPUT_LEVEL: i32 = -1;
pub const TXT2_OUTPUT_LEVEL: i32 = -1;
pub const NPZ_OUTPUT_LEVEL: i32 = -1;
pub const PROGRESS_FREQUENCY: f64 = 0.1;
pub const PROPERTIES_TO_SAVE: [&str; 26] = [
    "timestep",
    "time",
    "Ekin_ave",
    "Epot_ave",
    "Etot_ave",
    "dEkin_ave",
    "dEpot_ave",
    "dEtot_ave",
    "Etherm",
    "E_NHC",
    "states",
    "SH_pop",
    "SH_pop_raw",
    "D_adi",
    "D_adi_raw",
    "D_dia",
    "D_dia_raw",
    "q",
    "p",
    "Cadi",
    "Cdia",
    "hvib_adi",
    "hvib_dia",
    "St",
    "basis_transform",
    "projector",
];
// tolerance on the sum of the initial populations
pub const POPULATION_TOLERANCE: f64 = 1.0e-5;
// nuclear sampling: 0 - fixed, 1 - momenta, 2 - coordinates, 3 - both
pub const NUCLEAR_INIT_TYPE: i32 = 0;
pub const FORCE_CONSTANT: f64 = 0.001;
// electronic sampling: 0 - fixed state, 1 - random phase, 2 - populations, 3 - populations + phases
pub const ELECTRONIC_INIT_TYPE: i32 = 0;
pub const NSTATES: usize = 1;
pub const ISTATE: usize = 0;
pub const INIT_REP: i32 = 1;
pub const NTRAJ: usize = 1;
