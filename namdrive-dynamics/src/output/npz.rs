use crate::defaults::NPZ_DATA_FILE_NAME;
use crate::errors::DynamicsError;
use crate::output::{Observable, OutputSink, Property};
use ndarray::prelude::*;
use ndarray_npy::NpzWriter;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Sink that streams every record into the binary archive
/// `<prefix>/data.npz`. Each record is one array, named `<property>_<step>`
/// or `<property>_<step>_<traj>` for per-trajectory data. The archive is
/// only complete after [OutputSink::finish] was called.
pub struct NpzSaver {
    path: PathBuf,
    level: i32,
    writer: Option<NpzWriter<File>>,
}

impl NpzSaver {
    pub fn create(directory: &Path, level: i32) -> Result<Self, DynamicsError> {
        fs::create_dir_all(directory)?;
        let path: PathBuf = directory.join(NPZ_DATA_FILE_NAME);
        let file: File = File::create(&path)?;
        Ok(NpzSaver {
            path,
            level,
            writer: Some(NpzWriter::new(file)),
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.path
    }
}

pub fn entry_name(property: Property, step: usize, traj: Option<usize>) -> String {
    match traj {
        Some(traj) => format!("{}_{}_{}", property.name(), step, traj),
        None => format!("{}_{}", property.name(), step),
    }
}

impl OutputSink for NpzSaver {
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
        let writer: &mut NpzWriter<File> = self.writer.as_mut().ok_or_else(|| {
            DynamicsError::Serialization(format!("{} is already closed", self.path.display()))
        })?;
        let name: String = entry_name(property, step, traj);
        match value {
            Observable::Scalar(val) => writer.add_array(name, &arr0(*val))?,
            Observable::Indices(indices) => {
                let indices: Array1<i64> = indices.iter().map(|idx| *idx as i64).collect();
                writer.add_array(name, &indices)?
            }
            Observable::Real(arr) => writer.add_array(name, arr)?,
            Observable::Complex(arr) => writer.add_array(name, arr)?,
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), DynamicsError> {
        if let Some(writer) = self.writer.take() {
            writer.finish()?;
        }
        Ok(())
    }
}
