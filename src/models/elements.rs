use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Classical (Keplerian) orbital elements. Elliptical orbits only.
///
/// Angles are in radians; the semi-major axis is in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub raan: f64,
    pub arg_perigee: f64,
    pub mean_anomaly: f64,
}

impl OrbitalElements {
    pub fn new(
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: f64,
        raan: f64,
        arg_perigee: f64,
        mean_anomaly: f64,
    ) -> Result<Self, CoreError> {
        let elements = OrbitalElements {
            semi_major_axis,
            eccentricity,
            inclination,
            raan,
            arg_perigee,
            mean_anomaly,
        };
        elements.validate()?;
        Ok(elements)
    }

    /// Invariant check: a > 0 and 0 <= e < 1.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.semi_major_axis > 0.0) {
            return Err(CoreError::NonPositiveSemiMajorAxis(self.semi_major_axis));
        }
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(CoreError::EccentricityOutOfRange(self.eccentricity));
        }
        Ok(())
    }
}
