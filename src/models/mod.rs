pub mod elements;
pub mod spacecraft;
pub mod state;

pub use elements::OrbitalElements;
pub use spacecraft::SpacecraftProperties;
pub use state::{CartesianState, SpacecraftState};
