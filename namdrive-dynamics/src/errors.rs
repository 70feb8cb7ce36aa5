use ndarray_npy::WriteNpzError;
use std::error;
use std::fmt;
use std::io;

/// Errors raised by the ensemble driver and its collaborators.
#[derive(Debug)]
pub enum DynamicsError {
    /// Dimension mismatches, out-of-range indices, unnormalized populations, ...
    InvalidInput(String),
    /// An integer selector that does not correspond to any known algorithm.
    UnknownOption { option: String, value: i32 },
    /// Failure reported by the Hamiltonian adapter or the single-step propagator.
    PropagationFailure(String),
    Io(io::Error),
    Serialization(String),
}

impl DynamicsError {
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        DynamicsError::InvalidInput(message.into())
    }

    pub fn unknown(option: &str, value: i32) -> Self {
        DynamicsError::UnknownOption {
            option: option.to_string(),
            value,
        }
    }

    /// Promote an unknown selector to a fatal input error. Used where no
    /// fallback branch exists.
    pub fn promote(self) -> Self {
        match self {
            DynamicsError::UnknownOption { option, value } => DynamicsError::InvalidInput(
                format!("the value {} of option `{}` is not known", value, option),
            ),
            other => other,
        }
    }
}

impl fmt::Display for DynamicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicsError::InvalidInput(message) => write!(f, "invalid input: {}", message),
            DynamicsError::UnknownOption { option, value } => {
                write!(f, "unknown value {} for option `{}`", value, option)
            }
            DynamicsError::PropagationFailure(message) => {
                write!(f, "propagation failed: {}", message)
            }
            DynamicsError::Io(err) => write!(f, "i/o error: {}", err),
            DynamicsError::Serialization(message) => write!(f, "serialization error: {}", message),
        }
    }
}

impl error::Error for DynamicsError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            DynamicsError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for DynamicsError {
    fn from(err: io::Error) -> Self {
        DynamicsError::Io(err)
    }
}

impl From<serde_json::Error> for DynamicsError {
    fn from(err: serde_json::Error) -> Self {
        DynamicsError::Serialization(err.to_string())
    }
}

impl From<WriteNpzError> for DynamicsError {
    fn from(err: WriteNpzError) -> Self {
        DynamicsError::Serialization(err.to_string())
    }
}
