use crate::error::CoreError;
use crate::physics::dynamics::EquationsOfMotion;

/// Classical fixed-step 4-stage Runge-Kutta integrator.
///
/// `advance` is functional: it evaluates the equations of motion at four
/// offset states and returns a fresh state, never mutating the input. That
/// contract is what lets Monte Carlo trials run the same integrator
/// concurrently on their own state copies.
pub struct RK4<T: EquationsOfMotion> {
    eom: T,
}

impl<T: EquationsOfMotion> RK4<T>
where
    T::State: Clone + std::ops::Add<Output = T::State> + std::ops::Mul<f64, Output = T::State>,
{
    pub fn new(eom: T) -> Self {
        RK4 { eom }
    }

    pub fn advance(&self, state: &T::State, dt: f64) -> Result<T::State, CoreError> {
        let k1 = self.eom.compute_derivative(state)?;

        let state2 = state.clone() + k1.clone() * (dt / 2.0);
        let k2 = self.eom.compute_derivative(&state2)?;

        let state3 = state.clone() + k2.clone() * (dt / 2.0);
        let k3 = self.eom.compute_derivative(&state3)?;

        let state4 = state.clone() + k3.clone() * dt;
        let k4 = self.eom.compute_derivative(&state4)?;

        Ok(state.clone() + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CartesianState, SpacecraftState};
    use crate::physics::dynamics::OrbitDynamics;
    use crate::physics::orbital::OrbitalMechanics;
    use nalgebra as na;

    // One unperturbed period of a circular orbit should preserve the orbit
    // radius to well under 0.01% at dt = period / 1000.
    #[test]
    fn two_body_circular_orbit_conserves_radius() {
        let a = 7.0e6;
        let sat = SpacecraftState::new("sat-1", CartesianState::zero(), 2.2, 1.0, 100.0).unwrap();
        let dynamics = OrbitDynamics::two_body(&sat);
        let integrator = RK4::new(dynamics);

        let speed = (crate::constants::MU_EARTH / a).sqrt();
        let mut state = CartesianState::new(
            na::Vector3::new(a, 0.0, 0.0),
            na::Vector3::new(0.0, speed, 0.0),
        );

        let period = OrbitalMechanics::orbital_period(a);
        let steps = 1000;
        let dt = period / steps as f64;
        for _ in 0..steps {
            state = integrator.advance(&state, dt).unwrap();
        }

        let radius_error = (state.position.magnitude() - a).abs() / a;
        assert!(radius_error < 1e-4, "radius error {radius_error}");

        // After a full period the spacecraft is back near its start
        let closure = (state.position - na::Vector3::new(a, 0.0, 0.0)).magnitude();
        assert!(closure < a * 1e-4, "closure {closure}");
    }

    #[test]
    fn advance_does_not_mutate_the_input() {
        let sat = SpacecraftState::new("sat-1", CartesianState::zero(), 2.2, 1.0, 100.0).unwrap();
        let dynamics = OrbitDynamics::two_body(&sat);
        let integrator = RK4::new(dynamics);

        let state = CartesianState::new(
            na::Vector3::new(7.0e6, 0.0, 0.0),
            na::Vector3::new(0.0, 7.5e3, 0.0),
        );
        let before = state;
        let after = integrator.advance(&state, 10.0).unwrap();
        assert_eq!(state, before);
        assert_ne!(after, before);
    }
}
