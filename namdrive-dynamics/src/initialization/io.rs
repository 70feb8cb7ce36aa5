use crate::defaults::*;
use crate::errors::DynamicsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_nsteps() -> usize {
    NSTEPS
}
fn default_dt() -> f64 {
    DT
}
fn default_num_electronic_substeps() -> usize {
    NUM_ELECTRONIC_SUBSTEPS
}
fn default_rep_tdse() -> i32 {
    REP_TDSE
}
fn default_rep_ham() -> i32 {
    REP_HAM
}
fn default_rep_sh() -> i32 {
    REP_SH
}
fn default_rep_force() -> i32 {
    REP_FORCE
}
fn default_force_method() -> i32 {
    FORCE_METHOD
}
fn default_time_overlap_method() -> i32 {
    TIME_OVERLAP_METHOD
}
fn default_do_phase_correction() -> i32 {
    DO_PHASE_CORRECTION
}
fn default_phase_correction_tol() -> f64 {
    PHASE_CORRECTION_TOL
}
fn default_state_tracking_algo() -> i32 {
    STATE_TRACKING_ALGO
}
fn default_tsh_method() -> i32 {
    TSH_METHOD
}
fn default_hop_acceptance_algo() -> i32 {
    HOP_ACCEPTANCE_ALGO
}
fn default_momenta_rescaling_algo() -> i32 {
    MOMENTA_RESCALING_ALGO
}
fn default_decoherence_algo() -> i32 {
    DECOHERENCE_ALGO
}
fn default_decoherence_c_param() -> f64 {
    DECOHERENCE_C_PARAM
}
fn default_decoherence_eps_param() -> f64 {
    DECOHERENCE_EPS_PARAM
}
fn default_collapse_option() -> i32 {
    COLLAPSE_OPTION
}
fn default_temperature() -> f64 {
    TEMPERATURE
}
fn default_ensemble() -> i32 {
    ENSEMBLE
}
fn default_thermostat_tau() -> f64 {
    THERMOSTAT_TAU
}
fn default_thermostat_type() -> i32 {
    THERMOSTAT_TYPE
}
fn default_nhc_size() -> usize {
    NHC_SIZE
}
fn default_is_nbra() -> i32 {
    IS_NBRA
}
fn default_icond() -> usize {
    ICOND
}
fn default_nfiles() -> usize {
    NFILES
}
fn default_prefix() -> String {
    String::from(PREFIX)
}
fn default_prefix2() -> String {
    String::from(PREFIX2)
}
fn default_mem_output_level() -> i32 {
    MEM_OUTPUT_LEVEL
}
fn default_txt_output_level() -> i32 {
    TXT_OUTPUT_LEVEL
}
fn default_txt2_output_level() -> i32 {
    TXT2_OUTPUT_LEVEL
}
fn default_npz_output_level() -> i32 {
    NPZ_OUTPUT_LEVEL
}
fn default_progress_frequency() -> f64 {
    PROGRESS_FREQUENCY
}
fn default_properties_to_save() -> Vec<String> {
    PROPERTIES_TO_SAVE.iter().map(|name| name.to_string()).collect()
}
fn default_hopping_config() -> HoppingConfiguration {
    HoppingConfiguration::default()
}
fn default_decoherence_config() -> DecoherenceConfiguration {
    DecoherenceConfiguration::default()
}
fn default_thermostat_config() -> ThermostatConfiguration {
    ThermostatConfiguration::default()
}
fn default_output_config() -> OutputConfiguration {
    OutputConfiguration::default()
}
fn default_nuclear_init_type() -> i32 {
    NUCLEAR_INIT_TYPE
}
fn default_force_constant() -> Vec<f64> {
    vec![FORCE_CONSTANT]
}
fn default_electronic_init_type() -> i32 {
    ELECTRONIC_INIT_TYPE
}
fn default_nstates() -> usize {
    NSTATES
}
fn default_istate() -> usize {
    ISTATE
}
fn default_istates() -> Vec<f64> {
    vec![1.0]
}
fn default_init_rep() -> i32 {
    INIT_REP
}
fn default_ntraj() -> usize {
    NTRAJ
}

/// Settings of the ensemble propagation. Integer selectors follow the codes
/// listed in [defaults](crate::defaults); they are converted into closed
/// enumerations by [DynamicConfiguration::validate].
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DynamicConfiguration {
    #[serde(default = "default_nsteps")]
    pub nsteps: usize,
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default = "default_num_electronic_substeps")]
    pub num_electronic_substeps: usize,
    #[serde(default = "default_rep_tdse")]
    pub rep_tdse: i32,
    #[serde(default = "default_rep_ham")]
    pub rep_ham: i32,
    #[serde(default = "default_rep_sh")]
    pub rep_sh: i32,
    #[serde(default = "default_rep_force")]
    pub rep_force: i32,
    #[serde(default = "default_force_method")]
    pub force_method: i32,
    #[serde(default = "default_time_overlap_method")]
    pub time_overlap_method: i32,
    #[serde(default = "default_do_phase_correction")]
    pub do_phase_correction: i32,
    #[serde(default = "default_phase_correction_tol")]
    pub phase_correction_tol: f64,
    #[serde(default = "default_state_tracking_algo")]
    pub state_tracking_algo: i32,
    #[serde(default = "default_is_nbra")]
    pub is_nbra: i32,
    #[serde(default = "default_icond")]
    pub icond: usize,
    #[serde(default = "default_nfiles")]
    pub nfiles: usize,
    #[serde(default)]
    pub quantum_dofs: Option<Vec<usize>>,
    #[serde(default)]
    pub constrained_dofs: Vec<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_hopping_config")]
    pub hopping: HoppingConfiguration,
    #[serde(default = "default_decoherence_config")]
    pub decoherence: DecoherenceConfiguration,
    #[serde(default = "default_thermostat_config")]
    pub thermostat: ThermostatConfiguration,
    #[serde(default = "default_output_config")]
    pub output: OutputConfiguration,
}

impl Default for DynamicConfiguration {
    fn default() -> Self {
        Self {
            nsteps: default_nsteps(),
            dt: default_dt(),
            num_electronic_substeps: default_num_electronic_substeps(),
            rep_tdse: default_rep_tdse(),
            rep_ham: default_rep_ham(),
            rep_sh: default_rep_sh(),
            rep_force: default_rep_force(),
            force_method: default_force_method(),
            time_overlap_method: default_time_overlap_method(),
            do_phase_correction: default_do_phase_correction(),
            phase_correction_tol: default_phase_correction_tol(),
            state_tracking_algo: default_state_tracking_algo(),
            is_nbra: default_is_nbra(),
            icond: default_icond(),
            nfiles: default_nfiles(),
            quantum_dofs: None,
            constrained_dofs: Vec::new(),
            seed: None,
            hopping: default_hopping_config(),
            decoherence: default_decoherence_config(),
            thermostat: default_thermostat_config(),
            output: default_output_config(),
        }
    }
}

/// Hop proposal, acceptance and the momentum adjustment after hops
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HoppingConfiguration {
    #[serde(default = "default_tsh_method")]
    pub tsh_method: i32,
    #[serde(default = "default_hop_acceptance_algo")]
    pub hop_acceptance_algo: i32,
    #[serde(default = "default_momenta_rescaling_algo")]
    pub momenta_rescaling_algo: i32,
}

impl Default for HoppingConfiguration {
    fn default() -> Self {
        Self {
            tsh_method: default_tsh_method(),
            hop_acceptance_algo: default_hop_acceptance_algo(),
            momenta_rescaling_algo: default_momenta_rescaling_algo(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DecoherenceConfiguration {
    #[serde(default = "default_decoherence_algo")]
    pub decoherence_algo: i32,
    #[serde(default = "default_decoherence_c_param", rename = "decoherence_C_param")]
    pub decoherence_c_param: f64,
    #[serde(default = "default_decoherence_eps_param")]
    pub decoherence_eps_param: f64,
    #[serde(default = "default_collapse_option")]
    pub collapse_option: i32,
}

impl Default for DecoherenceConfiguration {
    fn default() -> Self {
        Self {
            decoherence_algo: default_decoherence_algo(),
            decoherence_c_param: default_decoherence_c_param(),
            decoherence_eps_param: default_decoherence_eps_param(),
            collapse_option: default_collapse_option(),
        }
    }
}

/// Struct that holds the parameters of the bath
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ThermostatConfiguration {
    #[serde(default = "default_ensemble")]
    pub ensemble: i32,
    #[serde(default = "default_temperature", rename = "Temperature")]
    pub temperature: f64,
    #[serde(default = "default_thermostat_type")]
    pub thermostat_type: i32,
    #[serde(default = "default_thermostat_tau")]
    pub tau: f64,
    #[serde(default = "default_nhc_size", rename = "NHC_size")]
    pub nhc_size: usize,
    #[serde(default)]
    pub thermostat_dofs: Vec<usize>,
}

impl Default for ThermostatConfiguration {
    fn default() -> Self {
        Self {
            ensemble: default_ensemble(),
            temperature: default_temperature(),
            thermostat_type: default_thermostat_type(),
            tau: default_thermostat_tau(),
            nhc_size: default_nhc_size(),
            thermostat_dofs: Vec::new(),
        }
    }
}

/// Struct that controls which observables are saved and where
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OutputConfiguration {
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_prefix2")]
    pub prefix2: String,
    #[serde(default = "default_mem_output_level")]
    pub mem_output_level: i32,
    #[serde(default = "default_txt_output_level")]
    pub txt_output_level: i32,
    #[serde(default = "default_txt2_output_level")]
    pub txt2_output_level: i32,
    #[serde(default = "default_npz_output_level", alias = "hdf5_output_level")]
    pub npz_output_level: i32,
    #[serde(default = "default_progress_frequency")]
    pub progress_frequency: f64,
    #[serde(default = "default_properties_to_save")]
    pub properties_to_save: Vec<String>,
}

impl Default for OutputConfiguration {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            prefix2: default_prefix2(),
            mem_output_level: default_mem_output_level(),
            txt_output_level: default_txt_output_level(),
            txt2_output_level: default_txt2_output_level(),
            npz_output_level: default_npz_output_level(),
            progress_frequency: default_progress_frequency(),
            properties_to_save: default_properties_to_save(),
        }
    }
}

/// Parameters of the nuclear sampling
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct NuclearInitConfiguration {
    #[serde(default = "default_nuclear_init_type")]
    pub init_type: i32,
    #[serde(default = "default_force_constant")]
    pub force_constant: Vec<f64>,
    #[serde(default = "default_ntraj")]
    pub ntraj: usize,
}

impl Default for NuclearInitConfiguration {
    fn default() -> Self {
        Self {
            init_type: default_nuclear_init_type(),
            force_constant: default_force_constant(),
            ntraj: default_ntraj(),
        }
    }
}

/// Parameters of the electronic sampling
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ElectronicInitConfiguration {
    #[serde(default = "default_electronic_init_type")]
    pub init_type: i32,
    #[serde(default = "default_nstates")]
    pub nstates: usize,
    #[serde(default = "default_istate")]
    pub istate: usize,
    #[serde(default = "default_istates")]
    pub istates: Vec<f64>,
    #[serde(default = "default_init_rep")]
    pub rep: i32,
    #[serde(default = "default_ntraj")]
    pub ntraj: usize,
    #[serde(default = "default_is_nbra")]
    pub is_nbra: i32,
}

impl Default for ElectronicInitConfiguration {
    fn default() -> Self {
        Self {
            init_type: default_electronic_init_type(),
            nstates: default_nstates(),
            istate: default_istate(),
            istates: default_istates(),
            rep: default_init_rep(),
            ntraj: default_ntraj(),
            is_nbra: default_is_nbra(),
        }
    }
}

impl DynamicConfiguration {
    /// Read the configuration from a toml file. If the file does not exist,
    /// the default settings are returned and written to `path`.
    pub fn from_file(path: &Path) -> Result<Self, DynamicsError> {
        let config_string: String = if path.exists() {
            fs::read_to_string(path)?
        } else {
            String::new()
        };
        let config: Self = toml::from_str(&config_string)
            .map_err(|err| DynamicsError::Serialization(err.to_string()))?;

        if !path.exists() {
            let config_string: String = toml::to_string(&config)
                .map_err(|err| DynamicsError::Serialization(err.to_string()))?;
            fs::write(path, config_string)?;
        }
        Ok(config)
    }
}
