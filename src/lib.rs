pub mod analysis;
pub mod config;
pub mod constants;
pub mod coordinates;
pub mod error;
pub mod integrators;
pub mod models;
pub mod physics;
pub mod propagation;
pub mod search;

pub use error::CoreError;
