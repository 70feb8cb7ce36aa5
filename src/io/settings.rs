use crate::defaults::*;
use namdrive_dynamics::dynamics::InitialConditionSet;
use namdrive_dynamics::initialization::{
    DynamicConfiguration, ElectronicInitConfiguration, NuclearInitConfiguration,
};
use serde::{Deserialize, Serialize};

fn default_verbose() -> i8 {
    VERBOSE
}
fn default_number_of_cores() -> usize {
    NUMBER_OF_CORES
}
fn default_continue_on_error() -> bool {
    CONTINUE_ON_ERROR
}
fn default_model() -> String {
    String::from(MODEL)
}
fn default_sac_a() -> f64 {
    SAC_A
}
fn default_sac_b() -> f64 {
    SAC_B
}
fn default_sac_c() -> f64 {
    SAC_C
}
fn default_sac_d() -> f64 {
    SAC_D
}
fn default_harmonic_force_constant() -> f64 {
    HARMONIC_FORCE_CONSTANT
}
fn default_harmonic_centers() -> [f64; 2] {
    HARMONIC_CENTERS
}
fn default_harmonic_energies() -> [f64; 2] {
    HARMONIC_ENERGIES
}
fn default_harmonic_coupling() -> f64 {
    HARMONIC_COUPLING
}
fn default_tabulated_prefix() -> String {
    String::from(TABULATED_PREFIX)
}
fn default_sac_config() -> SacConfig {
    let sac_config: SacConfig = toml::from_str("").unwrap();
    return sac_config;
}
fn default_harmonic_config() -> HarmonicConfig {
    let harmonic_config: HarmonicConfig = toml::from_str("").unwrap();
    return harmonic_config;
}
fn default_tabulated_config() -> TabulatedConfig {
    let tabulated_config: TabulatedConfig = toml::from_str("").unwrap();
    return tabulated_config;
}
fn default_model_config() -> ModelConfig {
    let model_config: ModelConfig = toml::from_str("").unwrap();
    return model_config;
}
fn default_parallelization_config() -> ParallelizationConfig {
    let parallelization_config: ParallelizationConfig = toml::from_str("").unwrap();
    return parallelization_config;
}
fn default_sets() -> Vec<SetConfig> {
    vec![SetConfig {
        q: vec![Q0],
        p: vec![P0],
        masses: vec![MASS],
    }]
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Configuration {
    #[serde(default = "default_verbose")]
    pub verbose: i8,
    #[serde(default = "default_continue_on_error")]
    pub continue_on_error: bool,
    #[serde(default = "default_parallelization_config")]
    pub parallelization: ParallelizationConfig,
    #[serde(default = "default_model_config")]
    pub model: ModelConfig,
    /// Hamiltonian used to transform the initial amplitudes, `model` if absent
    #[serde(default)]
    pub model0: Option<ModelConfig>,
    #[serde(default = "default_sets")]
    pub sets: Vec<SetConfig>,
    #[serde(default)]
    pub nuclear: NuclearInitConfiguration,
    #[serde(default)]
    pub electronic: ElectronicInitConfiguration,
    #[serde(default)]
    pub dynamics: DynamicConfiguration,
}

impl Configuration {
    /// Combine every `[[sets]]` entry with the shared sampling and dynamics
    /// settings
    pub fn initial_condition_sets(&self) -> Vec<InitialConditionSet> {
        self.sets
            .iter()
            .map(|set| InitialConditionSet {
                q0: set.q.clone(),
                p0: set.p.clone(),
                masses: set.masses.clone(),
                dynamics: self.dynamics.clone(),
                nuclear: self.nuclear.clone(),
                electronic: self.electronic.clone(),
            })
            .collect()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ParallelizationConfig {
    #[serde(default = "default_number_of_cores")]
    pub number_of_cores: usize,
}

/// Mean coordinates, momenta and masses of one set of initial conditions
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SetConfig {
    pub q: Vec<f64>,
    pub p: Vec<f64>,
    #[serde(rename = "M")]
    pub masses: Vec<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_sac_config")]
    pub sac: SacConfig,
    #[serde(default = "default_harmonic_config")]
    pub harmonic: HarmonicConfig,
    #[serde(default = "default_tabulated_config")]
    pub tabulated: TabulatedConfig,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct SacConfig {
    #[serde(default = "default_sac_a")]
    pub a: f64,
    #[serde(default = "default_sac_b")]
    pub b: f64,
    #[serde(default = "default_sac_c")]
    pub c: f64,
    #[serde(default = "default_sac_d")]
    pub d: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct HarmonicConfig {
    #[serde(default = "default_harmonic_force_constant")]
    pub force_constant: f64,
    #[serde(default = "default_harmonic_centers")]
    pub centers: [f64; 2],
    #[serde(default = "default_harmonic_energies")]
    pub energies: [f64; 2],
    #[serde(default = "default_harmonic_coupling")]
    pub coupling: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TabulatedConfig {
    #[serde(default = "default_tabulated_prefix")]
    pub prefix: String,
}
