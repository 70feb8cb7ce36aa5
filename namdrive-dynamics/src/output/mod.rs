pub use helper::*;
pub use memory::*;
pub use npz::*;
pub use sink::*;
pub use text::*;

pub mod helper;
pub mod memory;
pub mod npz;
pub mod sink;
pub mod text;

use crate::utils::c64;
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

/// Every observable that can be written by an [OutputSink]. The level of a
/// property is the smallest output level at which it is emitted.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    Timestep,
    Time,
    EkinAve,
    EpotAve,
    EtotAve,
    DEkinAve,
    DEpotAve,
    DEtotAve,
    Etherm,
    ENhc,
    States,
    ShPop,
    ShPopRaw,
    DAdi,
    DAdiRaw,
    DDia,
    DDiaRaw,
    Q,
    P,
    Cadi,
    Cdia,
    HvibAdi,
    HvibDia,
    St,
    BasisTransform,
    Projector,
}

impl Property {
    pub const ALL: [Property; 26] = [
        Property::Timestep,
        Property::Time,
        Property::EkinAve,
        Property::EpotAve,
        Property::EtotAve,
        Property::DEkinAve,
        Property::DEpotAve,
        Property::DEtotAve,
        Property::Etherm,
        Property::ENhc,
        Property::States,
        Property::ShPop,
        Property::ShPopRaw,
        Property::DAdi,
        Property::DAdiRaw,
        Property::DDia,
        Property::DDiaRaw,
        Property::Q,
        Property::P,
        Property::Cadi,
        Property::Cdia,
        Property::HvibAdi,
        Property::HvibDia,
        Property::St,
        Property::BasisTransform,
        Property::Projector,
    ];

    /// Name used in the input file, as key of the memory sink and as file name
    /// of the text sinks
    pub fn name(&self) -> &'static str {
        match self {
            Property::Timestep => "timestep",
            Property::Time => "time",
            Property::EkinAve => "Ekin_ave",
            Property::EpotAve => "Epot_ave",
            Property::EtotAve => "Etot_ave",
            Property::DEkinAve => "dEkin_ave",
            Property::DEpotAve => "dEpot_ave",
            Property::DEtotAve => "dEtot_ave",
            Property::Etherm => "Etherm",
            Property::ENhc => "E_NHC",
            Property::States => "states",
            Property::ShPop => "SH_pop",
            Property::ShPopRaw => "SH_pop_raw",
            Property::DAdi => "D_adi",
            Property::DAdiRaw => "D_adi_raw",
            Property::DDia => "D_dia",
            Property::DDiaRaw => "D_dia_raw",
            Property::Q => "q",
            Property::P => "p",
            Property::Cadi => "Cadi",
            Property::Cdia => "Cdia",
            Property::HvibAdi => "hvib_adi",
            Property::HvibDia => "hvib_dia",
            Property::St => "St",
            Property::BasisTransform => "basis_transform",
            Property::Projector => "projector",
        }
    }

    pub fn from_name(name: &str) -> Option<Property> {
        Property::ALL.iter().copied().find(|property| property.name() == name)
    }

    pub fn level(&self) -> i32 {
        match self {
            Property::Timestep
            | Property::Time
            | Property::EkinAve
            | Property::EpotAve
            | Property::EtotAve
            | Property::DEkinAve
            | Property::DEpotAve
            | Property::DEtotAve
            | Property::Etherm
            | Property::ENhc => 1,
            Property::States => 2,
            Property::ShPop
            | Property::ShPopRaw
            | Property::DAdi
            | Property::DAdiRaw
            | Property::DDia
            | Property::DDiaRaw
            | Property::Q
            | Property::P
            | Property::Cadi
            | Property::Cdia => 3,
            Property::HvibAdi
            | Property::HvibDia
            | Property::St
            | Property::BasisTransform
            | Property::Projector => 4,
        }
    }
}

/// Value of a property at one step. Arrays are owned copies, so sinks never
/// hold references into the live state.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Observable {
    Scalar(f64),
    Indices(Vec<usize>),
    Real(Array2<f64>),
    Complex(Array2<c64>),
}

impl Observable {
    pub fn vector(values: ArrayView1<f64>) -> Self {
        Observable::Real(values.to_owned().insert_axis(Axis(1)))
    }

    pub fn real(values: ArrayView2<f64>) -> Self {
        Observable::Real(values.to_owned())
    }

    pub fn complex(values: ArrayView2<c64>) -> Self {
        Observable::Complex(values.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::PROPERTIES_TO_SAVE;

    #[test]
    fn names_round_trip() {
        for property in Property::ALL.iter() {
            assert_eq!(Property::from_name(property.name()), Some(*property));
        }
        assert_eq!(Property::from_name("Etot"), None);
    }

    #[test]
    fn default_list_covers_every_property() {
        assert_eq!(PROPERTIES_TO_SAVE.len(), Property::ALL.len());
        for name in PROPERTIES_TO_SAVE.iter() {
            assert!(Property::from_name(name).is_some(), "{} is not known", name);
        }
    }

    #[test]
    fn levels() {
        assert_eq!(Property::Time.level(), 1);
        assert_eq!(Property::ENhc.level(), 1);
        assert_eq!(Property::States.level(), 2);
        assert_eq!(Property::Cdia.level(), 3);
        assert_eq!(Property::Projector.level(), 4);
    }
}
