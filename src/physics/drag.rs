use super::environment::Environment;
use crate::constants::EARTH_ANGULAR_VELOCITY;
use crate::models::spacecraft::SpacecraftProperties;
use nalgebra as na;

/// Atmospheric drag acceleration -½ρ·Cd·(A/m)·|v_rel|·v_rel, where v_rel
/// subtracts the co-rotating atmosphere velocity ω⊕ × r.
///
/// Returns zero when the density has underflowed or the relative velocity
/// vanishes; mass positivity is enforced at `SpacecraftState` construction.
pub fn drag_acceleration<T: SpacecraftProperties>(
    spacecraft: &T,
    position: &na::Vector3<f64>,
    velocity: &na::Vector3<f64>,
    solar_flux_index: f64,
) -> na::Vector3<f64> {
    let env = Environment::new(position, solar_flux_index);
    if env.density <= 0.0 {
        return na::Vector3::zeros();
    }

    let earth_rotation = na::Vector3::new(0.0, 0.0, EARTH_ANGULAR_VELOCITY);
    let v_rel = velocity - earth_rotation.cross(position);
    let speed = v_rel.magnitude();
    if speed == 0.0 {
        return na::Vector3::zeros();
    }

    let scale = -0.5
        * env.density
        * spacecraft.drag_coefficient()
        * spacecraft.ballistic_coefficient()
        * speed;
    v_rel * scale
}
