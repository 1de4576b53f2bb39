use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::spacecraft::SpacecraftProperties;

/// Inertial position/velocity pair.
///
/// Implements `Add` and `Mul<f64>` so the generic RK4 integrator can form
/// its stage combinations; integration never mutates a state in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartesianState {
    pub position: na::Vector3<f64>,
    pub velocity: na::Vector3<f64>,
}

impl CartesianState {
    pub fn new(position: na::Vector3<f64>, velocity: na::Vector3<f64>) -> Self {
        CartesianState { position, velocity }
    }

    pub fn zero() -> Self {
        CartesianState {
            position: na::Vector3::zeros(),
            velocity: na::Vector3::zeros(),
        }
    }
}

impl std::ops::Add for CartesianState {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        CartesianState {
            position: self.position + other.position,
            velocity: self.velocity + other.velocity,
        }
    }
}

impl std::ops::Mul<f64> for CartesianState {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        CartesianState {
            position: self.position * scalar,
            velocity: self.velocity * scalar,
        }
    }
}

/// One vehicle's propagation state plus the drag properties that travel
/// with it. Each propagation run (and each Monte Carlo trial) owns its own
/// copy; nothing here is shared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpacecraftState {
    pub id: String,
    pub state: CartesianState,
    pub drag_coefficient: f64,
    pub reference_area: f64,
    pub mass: f64,
}

impl SpacecraftState {
    pub fn new(
        id: impl Into<String>,
        state: CartesianState,
        drag_coefficient: f64,
        reference_area: f64,
        mass: f64,
    ) -> Result<Self, CoreError> {
        if !(mass > 0.0) {
            return Err(CoreError::NonPositiveMass(mass));
        }
        Ok(SpacecraftState {
            id: id.into(),
            state,
            drag_coefficient,
            reference_area,
            mass,
        })
    }
}

impl SpacecraftProperties for SpacecraftState {
    fn mass(&self) -> f64 {
        self.mass
    }

    fn drag_coefficient(&self) -> f64 {
        self.drag_coefficient
    }

    fn reference_area(&self) -> f64 {
        self.reference_area
    }
}
