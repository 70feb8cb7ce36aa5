use crate::errors::DynamicsError;
use crate::initialization::ControlParameters;
use crate::output::{MemorySaver, NpzSaver, Observable, Property, TextSaver};
use hashbrown::HashSet;
use log::debug;
use std::path::{Path, PathBuf};

/// A destination for the observables of a run. A sink only receives the
/// properties whose level does not exceed its own level.
pub trait OutputSink {
    fn level(&self) -> i32;

    /// Store `value` for `step`; `traj` is set for per-trajectory properties
    fn save(
        &mut self,
        step: usize,
        traj: Option<usize>,
        property: Property,
        value: &Observable,
    ) -> Result<(), DynamicsError>;

    /// Called after the propagation of `step` has finished
    fn end_step(&mut self, _step: usize) -> Result<(), DynamicsError> {
        Ok(())
    }

    /// Called once after the last step
    fn finish(&mut self) -> Result<(), DynamicsError> {
        Ok(())
    }
}

/// The set of sinks configured for a run. A property is handed to a sink only
/// if both the sink level and the `properties_to_save` list admit it.
pub struct OutputSinks {
    memory: Option<MemorySaver>,
    files: Vec<Box<dyn OutputSink>>,
    properties: HashSet<Property>,
}

impl OutputSinks {
    /// Open the sinks whose level is positive. Text sinks truncate their files,
    /// the binary sink starts a new archive under `prefix`.
    pub fn from_control(control: &ControlParameters) -> Result<Self, DynamicsError> {
        let properties: HashSet<Property> = control.properties_to_save.iter().copied().collect();
        let memory: Option<MemorySaver> = if control.mem_output_level > 0 {
            Some(MemorySaver::new(
                PathBuf::from(&control.prefix),
                control.mem_output_level,
            ))
        } else {
            None
        };
        let mut files: Vec<Box<dyn OutputSink>> = Vec::new();
        if control.txt_output_level > 0 {
            files.push(Box::new(TextSaver::create(
                PathBuf::from(&control.prefix),
                control.txt_output_level,
                &control.properties_to_save,
            )?));
        }
        if control.txt2_output_level > 0 {
            files.push(Box::new(TextSaver::create(
                PathBuf::from(&control.prefix2),
                control.txt2_output_level,
                &control.properties_to_save,
            )?));
        }
        if control.npz_output_level > 0 {
            files.push(Box::new(NpzSaver::create(
                Path::new(&control.prefix),
                control.npz_output_level,
            )?));
        }
        debug!(
            "output sinks: memory {}, files {}",
            memory.is_some(),
            files.len()
        );
        Ok(OutputSinks {
            memory,
            files,
            properties,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_none() && self.files.is_empty()
    }

    /// Highest level over all sinks, 0 if there is none
    pub fn max_level(&self) -> i32 {
        let memory: i32 = self.memory.as_ref().map_or(0, |saver| saver.level());
        self.files
            .iter()
            .map(|sink| sink.level())
            .fold(memory, i32::max)
    }

    /// True if at least one sink would store `property`
    pub fn admits(&self, property: Property) -> bool {
        self.properties.contains(&property) && self.max_level() >= property.level()
    }

    /// Hand `property` to every sink that admits it. The value is only built
    /// if some sink needs it.
    pub fn emit<F>(
        &mut self,
        step: usize,
        traj: Option<usize>,
        property: Property,
        value: F,
    ) -> Result<(), DynamicsError>
    where
        F: FnOnce() -> Observable,
    {
        if !self.admits(property) {
            return Ok(());
        }
        let value: Observable = value();
        if let Some(saver) = self.memory.as_mut() {
            if saver.level() >= property.level() {
                saver.save(step, traj, property, &value)?;
            }
        }
        for sink in self.files.iter_mut() {
            if sink.level() >= property.level() {
                sink.save(step, traj, property, &value)?;
            }
        }
        Ok(())
    }

    pub fn end_step(&mut self, step: usize) -> Result<(), DynamicsError> {
        if let Some(saver) = self.memory.as_mut() {
            saver.end_step(step)?;
        }
        for sink in self.files.iter_mut() {
            sink.end_step(step)?;
        }
        Ok(())
    }

    /// Close the file sinks, write the in-memory data to
    /// `<prefix>/mem_data.json` and return it
    pub fn finalize(mut self) -> Result<Option<MemorySaver>, DynamicsError> {
        for sink in self.files.iter_mut() {
            sink.finish()?;
        }
        match self.memory {
            Some(saver) => {
                saver.save_to_file()?;
                Ok(Some(saver))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initialization::DynamicConfiguration;

    fn control(mem: i32, properties: &[&str]) -> ControlParameters {
        let mut config = DynamicConfiguration::default();
        config.output.mem_output_level = mem;
        config.output.properties_to_save = properties.iter().map(|name| name.to_string()).collect();
        config.validate(1).unwrap()
    }

    #[test]
    fn no_level_no_sink() {
        let sinks = OutputSinks::from_control(&control(-1, &["time"])).unwrap();
        assert!(sinks.is_empty());
        assert!(!sinks.admits(Property::Time));
    }

    #[test]
    fn both_gates_must_pass() {
        let mut sinks = OutputSinks::from_control(&control(2, &["time", "SH_pop", "states"])).unwrap();
        assert!(sinks.admits(Property::Time));
        assert!(sinks.admits(Property::States));
        // level 3 property with a level 2 sink
        assert!(!sinks.admits(Property::ShPop));
        // not in the list
        assert!(!sinks.admits(Property::EkinAve));

        let mut built: bool = false;
        sinks
            .emit(0, None, Property::ShPop, || {
                built = true;
                Observable::Scalar(0.0)
            })
            .unwrap();
        assert!(!built);
    }

    #[test]
    fn binary_sink_counts_towards_the_level() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = DynamicConfiguration::default();
        config.output.prefix = dir.path().join("out").to_string_lossy().to_string();
        config.output.npz_output_level = 2;
        let control = config.validate(1).unwrap();
        let mut sinks = OutputSinks::from_control(&control).unwrap();
        assert!(!sinks.is_empty());
        assert_eq!(sinks.max_level(), 2);
        assert!(sinks.admits(Property::States));
        assert!(!sinks.admits(Property::Q));
        sinks
            .emit(0, None, Property::Time, || Observable::Scalar(0.0))
            .unwrap();
        sinks.end_step(0).unwrap();
        assert!(sinks.finalize().unwrap().is_none());
        assert!(dir.path().join("out").join("data.npz").exists());
    }
}
