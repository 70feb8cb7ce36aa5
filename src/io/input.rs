use crate::io::Configuration;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read the input file. If it does not exist, the default settings are used
/// and written to `path`, so that the user can see all the used options.
pub fn read_input(path: &Path) -> Result<Configuration> {
    let config_string: String = if path.exists() {
        fs::read_to_string(path)
            .with_context(|| format!("Unable to read the input file {}", path.display()))?
    } else {
        String::new()
    };
    let config: Configuration = toml::from_str(&config_string)
        .with_context(|| format!("Unable to parse the input file {}", path.display()))?;

    if !path.exists() {
        let config_string: String =
            toml::to_string(&config).context("Unable to serialize the default settings")?;
        fs::write(path, config_string)
            .with_context(|| format!("Unable to write the input file {}", path.display()))?;
    }
    Ok(config)
}
