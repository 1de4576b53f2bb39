pub mod formation;
pub mod settings;

pub use formation::{FormationConfig, RtnOffset, TargetPoint, VehicleSpec};
pub use settings::{DispersionConfig, PropagatorSettings};
