use crate::constants::{EARTH_J2, MU_EARTH, WGS84_A};
use nalgebra as na;

/// Central-body acceleration -μr/|r|³. Callers guarantee a nonzero
/// position; `OrbitDynamics` rejects zero-magnitude states before the force
/// evaluation.
pub fn gravity_acceleration(position: &na::Vector3<f64>) -> na::Vector3<f64> {
    let r = position.magnitude();
    -MU_EARTH / (r * r * r) * position
}

/// First-order J2 oblateness acceleration in the inertial frame.
pub fn j2_acceleration(position: &na::Vector3<f64>) -> na::Vector3<f64> {
    let r = position.magnitude();
    let z_ratio_sq = (position.z / r).powi(2);
    let k = -1.5 * EARTH_J2 * MU_EARTH * WGS84_A.powi(2) / r.powi(5);

    na::Vector3::new(
        k * position.x * (1.0 - 5.0 * z_ratio_sq),
        k * position.y * (1.0 - 5.0 * z_ratio_sq),
        k * position.z * (3.0 - 5.0 * z_ratio_sq),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::R_EARTH_MEAN;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    #[test_case(
        na::Vector3::new(R_EARTH_MEAN, 0.0, 0.0),
        9.82;
        "surface gravity"
    )]
    #[test_case(
        na::Vector3::new(6.871e6, 0.0, 0.0),
        8.44;
        "gravity at 500 km altitude"
    )]
    fn gravity_magnitude(position: na::Vector3<f64>, expected: f64) {
        let accel = gravity_acceleration(&position);
        assert_abs_diff_eq!(accel.magnitude(), expected, epsilon = 1e-2);
        // Always points back toward the center
        assert!(accel.dot(&position) < 0.0);
    }

    #[test]
    fn j2_pulls_harder_over_the_equator_than_the_pole() {
        let r = 7.0e6;
        let equator = j2_acceleration(&na::Vector3::new(r, 0.0, 0.0));
        let pole = j2_acceleration(&na::Vector3::new(0.0, 0.0, r));
        // Equatorial term adds to the inward pull, polar term opposes it.
        assert!(equator.x < 0.0);
        assert!(pole.z > 0.0);
        assert_abs_diff_eq!(pole.z, -2.0 * equator.x, epsilon = 1e-12);
    }

    #[test]
    fn j2_is_a_small_perturbation() {
        let position = na::Vector3::new(5.0e6, 3.0e6, 2.0e6);
        let ratio = j2_acceleration(&position).magnitude()
            / gravity_acceleration(&position).magnitude();
        assert!(ratio < 3.0 * EARTH_J2);
    }
}
