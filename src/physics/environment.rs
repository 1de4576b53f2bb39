use crate::constants::*;
use nalgebra as na;

/// Atmospheric conditions at a position.
///
/// Exponential density profile anchored at 200 km, with the scale height
/// growing with the configured solar-flux index. Densities below the floor
/// clamp to zero so drag vanishes cleanly at high altitude.
pub struct Environment {
    pub altitude: f64,
    pub density: f64,
    pub scale_height: f64,
}

impl Environment {
    pub fn new(position: &na::Vector3<f64>, solar_flux_index: f64) -> Self {
        let altitude = position.magnitude() - R_EARTH_MEAN;

        let flux_scale = 1.0 + (solar_flux_index - NOMINAL_SOLAR_FLUX) / (4.0 * NOMINAL_SOLAR_FLUX);
        let scale_height = ATMOSPHERE_BASE_SCALE_HEIGHT * flux_scale.max(0.5);

        let density = ATMOSPHERE_REFERENCE_DENSITY
            * (-(altitude - ATMOSPHERE_REFERENCE_ALTITUDE) / scale_height).exp();
        let density = if density.is_finite() && density >= ATMOSPHERE_DENSITY_FLOOR {
            density
        } else {
            0.0
        };

        Environment {
            altitude,
            density,
            scale_height,
        }
    }
}
