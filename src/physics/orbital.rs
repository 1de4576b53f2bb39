use crate::constants::{
    EARTH_J2, KEPLER_MAX_ITERATIONS, KEPLER_TOLERANCE, MU_EARTH, PI, WGS84_A,
};
use crate::error::CoreError;
use crate::models::{CartesianState, OrbitalElements};
use nalgebra as na;

// Below this the orbit is treated as circular/equatorial for angle recovery.
const SINGULARITY_TOLERANCE: f64 = 1e-11;
// Specific orbital energy (J/kg) below which a state counts as parabolic.
const PARABOLIC_ENERGY_TOLERANCE: f64 = 1e-3;

/// Outcome of one Newton solve of Kepler's equation. On a blown iteration
/// budget `eccentric_anomaly` holds the last iterate and `converged` is
/// false; callers use the iterate as a documented approximation.
#[derive(Debug, Clone, Copy)]
pub struct KeplerSolution {
    pub eccentric_anomaly: f64,
    pub converged: bool,
    pub iterations: usize,
}

/// First-order J2 secular rates. `mean_anomaly_rate` is the secular
/// correction on top of `mean_motion`, not the total rate.
#[derive(Debug, Clone, Copy)]
pub struct J2SecularRates {
    pub mean_motion: f64,
    pub raan_rate: f64,
    pub arg_perigee_rate: f64,
    pub mean_anomaly_rate: f64,
}

pub struct OrbitalMechanics;

impl OrbitalMechanics {
    /// Solves Kepler's equation M = E - e·sin(E) for the eccentric anomaly
    /// by Newton-Raphson with an explicit tolerance and iteration budget.
    pub fn solve_kepler(
        mean_anomaly: f64,
        eccentricity: f64,
        tolerance: f64,
        max_iterations: usize,
    ) -> KeplerSolution {
        let m = wrap_angle(mean_anomaly);
        if eccentricity < SINGULARITY_TOLERANCE {
            return KeplerSolution {
                eccentric_anomaly: m,
                converged: true,
                iterations: 0,
            };
        }

        // Initial guess
        let mut e_anom = if m < PI {
            m + eccentricity / 2.0
        } else {
            m - eccentricity / 2.0
        };

        for iteration in 1..=max_iterations {
            let delta =
                (e_anom - eccentricity * e_anom.sin() - m) / (1.0 - eccentricity * e_anom.cos());
            e_anom -= delta;
            if delta.abs() <= tolerance {
                return KeplerSolution {
                    eccentric_anomaly: wrap_angle(e_anom),
                    converged: true,
                    iterations: iteration,
                };
            }
        }

        KeplerSolution {
            eccentric_anomaly: wrap_angle(e_anom),
            converged: false,
            iterations: max_iterations,
        }
    }

    /// Converts classical elements to an inertial Cartesian state.
    ///
    /// Solves Kepler's equation for the eccentric anomaly, converts to true
    /// anomaly, then rotates the perifocal state through the argument of
    /// perigee, inclination, and RAAN.
    pub fn classical_to_cartesian(elements: &OrbitalElements) -> Result<CartesianState, CoreError> {
        elements.validate()?;
        let (a, e) = (elements.semi_major_axis, elements.eccentricity);

        let kepler = Self::solve_kepler(
            elements.mean_anomaly,
            e,
            KEPLER_TOLERANCE,
            KEPLER_MAX_ITERATIONS,
        );
        let e_anom = kepler.eccentric_anomaly;
        let nu = 2.0 * ((1.0 + e).sqrt() * (e_anom / 2.0).sin())
            .atan2((1.0 - e).sqrt() * (e_anom / 2.0).cos());

        let p = a * (1.0 - e * e);
        let r_mag = p / (1.0 + e * nu.cos());

        // Position and velocity in the orbital plane
        let r_orbital = na::Vector3::new(r_mag * nu.cos(), r_mag * nu.sin(), 0.0);
        let v_orbital = na::Vector3::new(
            -(MU_EARTH / p).sqrt() * nu.sin(),
            (MU_EARTH / p).sqrt() * (e + nu.cos()),
            0.0,
        );

        let rot_arg_perigee =
            na::Rotation3::from_axis_angle(&na::Vector3::z_axis(), elements.arg_perigee);
        let rot_inclination =
            na::Rotation3::from_axis_angle(&na::Vector3::x_axis(), elements.inclination);
        let rot_raan = na::Rotation3::from_axis_angle(&na::Vector3::z_axis(), elements.raan);

        let transform = rot_raan * rot_inclination * rot_arg_perigee;
        Ok(CartesianState::new(
            transform * r_orbital,
            transform * v_orbital,
        ))
    }

    /// Recovers classical elements from an inertial Cartesian state via the
    /// angular-momentum and eccentricity vectors. Rejects parabolic and
    /// hyperbolic states; this engine handles elliptical orbits only.
    pub fn cartesian_to_classical(state: &CartesianState) -> Result<OrbitalElements, CoreError> {
        let r = &state.position;
        let v = &state.velocity;
        let r_mag = r.magnitude();
        let v_mag = v.magnitude();
        if r_mag < f64::EPSILON {
            return Err(CoreError::ZeroMagnitudePosition);
        }
        if v_mag < f64::EPSILON {
            return Err(CoreError::ZeroMagnitudeVelocity);
        }

        let h = r.cross(v);
        let h_mag = h.magnitude();
        if h_mag < f64::EPSILON {
            return Err(CoreError::ZeroAngularMomentum);
        }

        let e_vec = ((v_mag * v_mag - MU_EARTH / r_mag) * r - r.dot(v) * v) / MU_EARTH;
        let e = e_vec.magnitude();

        let specific_energy = v_mag * v_mag / 2.0 - MU_EARTH / r_mag;
        if specific_energy.abs() < PARABOLIC_ENERGY_TOLERANCE || e >= 1.0 {
            return Err(CoreError::NonElliptical {
                energy: specific_energy,
                eccentricity: e,
            });
        }
        let a = -MU_EARTH / (2.0 * specific_energy);
        if a <= 0.0 {
            return Err(CoreError::NonElliptical {
                energy: specific_energy,
                eccentricity: e,
            });
        }

        let inclination = (h.z / h_mag).acos();

        // Node vector
        let k = na::Vector3::new(0.0, 0.0, 1.0);
        let n = k.cross(&h);
        let n_mag = n.magnitude();

        let raan = if n_mag < SINGULARITY_TOLERANCE {
            0.0
        } else {
            wrap_angle(n.y.atan2(n.x))
        };

        // atan2 components share the common factor dropped by dividing the
        // out-of-plane projection by |h|
        let arg_perigee = if e < SINGULARITY_TOLERANCE {
            0.0
        } else if n_mag < SINGULARITY_TOLERANCE {
            wrap_angle(e_vec.y.atan2(e_vec.x))
        } else {
            wrap_angle((h.dot(&n.cross(&e_vec)) / h_mag).atan2(n.dot(&e_vec)))
        };

        let nu = if e < SINGULARITY_TOLERANCE {
            if n_mag < SINGULARITY_TOLERANCE {
                wrap_angle(r.y.atan2(r.x))
            } else {
                // Argument of latitude doubles as the true anomaly when
                // perigee is undefined
                wrap_angle((h.dot(&n.cross(r)) / h_mag).atan2(n.dot(r)))
            }
        } else {
            wrap_angle((h.dot(&e_vec.cross(r)) / h_mag).atan2(e_vec.dot(r)))
        };

        let e_anom = Self::true_to_eccentric_anomaly(nu, e);
        let mean_anomaly = Self::eccentric_to_mean_anomaly(e_anom, e);

        OrbitalElements::new(a, e, inclination, raan, arg_perigee, mean_anomaly)
    }

    pub fn true_to_eccentric_anomaly(nu: f64, e: f64) -> f64 {
        if e < SINGULARITY_TOLERANCE {
            return wrap_angle(nu);
        }
        wrap_angle(((1.0 - e * e).sqrt() * nu.sin()).atan2(e + nu.cos()))
    }

    pub fn eccentric_to_mean_anomaly(e_anom: f64, e: f64) -> f64 {
        wrap_angle(e_anom - e * e_anom.sin())
    }

    /// Closed-form first-order J2 secular rates for the node, perigee, and
    /// mean anomaly (all rad/s).
    pub fn j2_secular_rates(
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
    ) -> J2SecularRates {
        let n = (MU_EARTH / semi_major_axis.powi(3)).sqrt();
        let p = semi_major_axis * (1.0 - eccentricity * eccentricity);
        let k = 1.5 * EARTH_J2 * n * (WGS84_A / p).powi(2);
        let sin_i_sq = inclination.sin().powi(2);

        J2SecularRates {
            mean_motion: n,
            raan_rate: -k * inclination.cos(),
            arg_perigee_rate: k * (2.0 - 2.5 * sin_i_sq),
            mean_anomaly_rate: k * (1.0 - eccentricity * eccentricity).sqrt()
                * (1.0 - 1.5 * sin_i_sq),
        }
    }

    /// Unperturbed two-body period (s).
    pub fn orbital_period(semi_major_axis: f64) -> f64 {
        2.0 * PI * (semi_major_axis.powi(3) / MU_EARTH).sqrt()
    }
}

/// Wraps an angle to [0, 2π).
pub fn wrap_angle(angle: f64) -> f64 {
    angle.rem_euclid(2.0 * PI)
}
