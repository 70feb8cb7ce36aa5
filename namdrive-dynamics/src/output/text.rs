use crate::errors::DynamicsError;
use crate::output::{Observable, OutputSink, Property};
use hashbrown::HashMap;
use itertools::Itertools;
use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Sink that writes one whitespace separated text file `<name>.txt` per
/// property into its directory. Lines are buffered during a step and appended
/// when the step is finished.
pub struct TextSaver {
    directory: PathBuf,
    level: i32,
    buffer: HashMap<Property, Vec<String>>,
}

impl TextSaver {
    /// Create the directory and truncate the files of all properties the
    /// sink will receive
    pub fn create(
        directory: PathBuf,
        level: i32,
        properties: &[Property],
    ) -> Result<Self, DynamicsError> {
        fs::create_dir_all(&directory)?;
        for property in properties.iter().filter(|property| property.level() <= level) {
            File::create(file_path(&directory, *property))?;
        }
        Ok(TextSaver {
            directory,
            level,
            buffer: HashMap::new(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }
}

pub fn file_path(directory: &Path, property: Property) -> PathBuf {
    directory.join(format!("{}.txt", property.name()))
}

/// One line of text: the step, the trajectory index for per-trajectory data
/// and the flattened values (real and imaginary parts for complex data)
fn format_line(step: usize, traj: Option<usize>, value: &Observable) -> String {
    let mut line: String = step.to_string();
    if let Some(traj) = traj {
        line.push(' ');
        line.push_str(&traj.to_string());
    }
    let values: String = match value {
        Observable::Scalar(val) => format!("{:.8e}", val),
        Observable::Indices(indices) => indices.iter().join(" "),
        Observable::Real(arr) => arr.iter().map(|val| format!("{:.8e}", val)).join(" "),
        Observable::Complex(arr) => arr
            .iter()
            .map(|val| format!("{:.8e} {:.8e}", val.re, val.im))
            .join(" "),
    };
    line.push(' ');
    line.push_str(&values);
    line
}

impl OutputSink for TextSaver {
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
        self.buffer
            .entry(property)
            .or_insert_with(Vec::new)
            .push(format_line(step, traj, value));
        Ok(())
    }

    fn end_step(&mut self, _step: usize) -> Result<(), DynamicsError> {
        for (property, lines) in self.buffer.drain() {
            let path: PathBuf = file_path(&self.directory, property);
            let file: File = OpenOptions::new().create(true).append(true).open(path)?;
            let mut stream = BufWriter::new(file);
            for line in lines.iter() {
                writeln!(stream, "{}", line)?;
            }
            stream.flush()?;
        }
        Ok(())
    }
}
