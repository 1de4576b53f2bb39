use super::drag::drag_acceleration;
use super::gravity::{gravity_acceleration, j2_acceleration};
use crate::error::CoreError;
use crate::models::{CartesianState, SpacecraftProperties};

pub trait EquationsOfMotion {
    type State;

    fn compute_derivative(&self, state: &Self::State) -> Result<Self::State, CoreError>;
}

/// Point-mass orbital dynamics: central gravity plus optional J2 and drag
/// terms. Borrows the spacecraft properties immutably so many integrations
/// can share one configuration.
pub struct OrbitDynamics<'a, T: SpacecraftProperties> {
    spacecraft: &'a T,
    include_j2: bool,
    include_drag: bool,
    solar_flux_index: f64,
}

impl<'a, T: SpacecraftProperties> OrbitDynamics<'a, T> {
    pub fn new(
        spacecraft: &'a T,
        include_j2: bool,
        include_drag: bool,
        solar_flux_index: f64,
    ) -> Self {
        OrbitDynamics {
            spacecraft,
            include_j2,
            include_drag,
            solar_flux_index,
        }
    }

    /// Pure two-body dynamics, used by conservation checks.
    pub fn two_body(spacecraft: &'a T) -> Self {
        Self::new(spacecraft, false, false, 0.0)
    }
}

impl<'a, T: SpacecraftProperties> EquationsOfMotion for OrbitDynamics<'a, T> {
    type State = CartesianState;

    fn compute_derivative(&self, state: &CartesianState) -> Result<CartesianState, CoreError> {
        if state.position.magnitude() < f64::EPSILON {
            return Err(CoreError::ZeroMagnitudePosition);
        }

        let mut acceleration = gravity_acceleration(&state.position);
        if self.include_j2 {
            acceleration += j2_acceleration(&state.position);
        }
        if self.include_drag {
            acceleration += drag_acceleration(
                self.spacecraft,
                &state.position,
                &state.velocity,
                self.solar_flux_index,
            );
        }

        Ok(CartesianState {
            position: state.velocity,
            velocity: acceleration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SpacecraftState;
    use nalgebra as na;

    #[test]
    fn derivative_of_position_is_velocity() {
        let sat = SpacecraftState::new("sat-1", CartesianState::zero(), 2.2, 1.0, 100.0).unwrap();
        let dynamics = OrbitDynamics::two_body(&sat);
        let state = CartesianState::new(
            na::Vector3::new(7.0e6, 0.0, 0.0),
            na::Vector3::new(0.0, 7.5e3, 0.0),
        );
        let derivative = dynamics.compute_derivative(&state).unwrap();
        assert_eq!(derivative.position, state.velocity);
        assert!(derivative.velocity.x < 0.0);
    }

    #[test]
    fn zero_position_is_fatal() {
        let sat = SpacecraftState::new("sat-1", CartesianState::zero(), 2.2, 1.0, 100.0).unwrap();
        let dynamics = OrbitDynamics::new(&sat, true, true, 150.0);
        let state = CartesianState::zero();
        assert!(matches!(
            dynamics.compute_derivative(&state),
            Err(CoreError::ZeroMagnitudePosition)
        ));
    }
}
