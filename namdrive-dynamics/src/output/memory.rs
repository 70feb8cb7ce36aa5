use crate::defaults::MEM_DATA_FILE_NAME;
use crate::errors::DynamicsError;
use crate::output::{Observable, OutputSink, Property};
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One stored value of a property
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Record {
    pub step: usize,
    pub traj: Option<usize>,
    pub value: Observable,
}

/// Sink that keeps every record in memory. At the end of a run the data is
/// written to `<prefix>/mem_data.json` and returned to the caller.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MemorySaver {
    pub prefix: PathBuf,
    pub level: i32,
    pub data: HashMap<String, Vec<Record>>,
}

impl MemorySaver {
    pub fn new(prefix: PathBuf, level: i32) -> Self {
        MemorySaver {
            prefix,
            level,
            data: HashMap::new(),
        }
    }

    /// All records of the property with the given name
    pub fn get(&self, name: &str) -> &[Record] {
        self.data
            .get(name)
            .map(|records| records.as_slice())
            .unwrap_or(&[])
    }

    /// Scalar time series of a level 1 property
    pub fn scalars(&self, name: &str) -> Vec<f64> {
        self.get(name)
            .iter()
            .filter_map(|record| match record.value {
                Observable::Scalar(value) => Some(value),
                _ => None,
            })
            .collect()
    }

    pub fn file_path(&self) -> PathBuf {
        self.prefix.join(MEM_DATA_FILE_NAME)
    }

    pub fn save_to_file(&self) -> Result<(), DynamicsError> {
        fs::create_dir_all(&self.prefix)?;
        let json: String = serde_json::to_string(self)?;
        fs::write(self.file_path(), json)?;
        Ok(())
    }

    pub fn from_file(path: &Path) -> Result<Self, DynamicsError> {
        let json: String = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl OutputSink for MemorySaver {
    fn level(&self) -> i32 {
        self.level
    }

    fn save(
        &mut self,
        step: usize,
        traj: Option<usize>,
        property: Property,
        value: &Observable,
    ) -> Result<(), DynamicsError> {
        self.data
            .entry(property.name().to_string())
            .or_insert_with(Vec::new)
            .push(Record {
                step,
                traj,
                value: value.clone(),
            });
        Ok(())
    }
}
