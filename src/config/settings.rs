use hifitime::{Duration, Epoch};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const DEFAULT_TIME_STEP_S: f64 = 10.0;
pub const DEFAULT_DRAG_COEFFICIENT: f64 = 2.2;
pub const DEFAULT_BALLISTIC_COEFFICIENT: f64 = 0.025; // m²/kg
pub const DEFAULT_PRIMARY_LIMIT_KM: f64 = 30.0;
pub const DEFAULT_WAIVER_LIMIT_KM: f64 = 70.0;
pub const MONTE_CARLO_RUN_FLOOR: usize = 500;

/// Propagation and compliance configuration for one run.
///
/// Built once by the external scenario-loading layer and treated as
/// read-only afterwards; every routine in this crate borrows it immutably.
#[derive(Debug, Clone)]
pub struct PropagatorSettings {
    pub start_time: Epoch,
    /// Definition epoch of the nominal elements; the mean anomaly is
    /// advanced from here to `start_time` before the fleet is built.
    pub epoch_time: Epoch,
    pub stop_time: Epoch,
    pub time_step_seconds: f64,
    pub drag_coefficient: f64,
    /// Drag area-to-mass ratio (m²/kg).
    pub ballistic_coefficient: f64,
    /// F10.7-like index scaling the atmospheric scale height.
    pub solar_flux_index: f64,
    /// Compliance evaluation instant; `None` means the window midpoint.
    pub evaluation_time: Option<Epoch>,
    pub primary_limit_km: f64,
    pub waiver_limit_km: f64,
    pub plane_intersection_limit_km: Option<f64>,
}

impl PropagatorSettings {
    pub fn new(start_time: Epoch, stop_time: Epoch) -> Self {
        PropagatorSettings {
            start_time,
            epoch_time: start_time,
            stop_time,
            time_step_seconds: DEFAULT_TIME_STEP_S,
            drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
            ballistic_coefficient: DEFAULT_BALLISTIC_COEFFICIENT,
            solar_flux_index: crate::constants::NOMINAL_SOLAR_FLUX,
            evaluation_time: None,
            primary_limit_km: DEFAULT_PRIMARY_LIMIT_KM,
            waiver_limit_km: DEFAULT_WAIVER_LIMIT_KM,
            plane_intersection_limit_km: None,
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(self.time_step_seconds > 0.0) {
            return Err(CoreError::NonPositiveTimeStep(self.time_step_seconds));
        }
        if self.stop_time < self.start_time {
            return Err(CoreError::InvertedTimeWindow {
                start: self.start_time,
                stop: self.stop_time,
            });
        }
        Ok(())
    }

    pub fn duration_seconds(&self) -> f64 {
        (self.stop_time - self.start_time).to_seconds()
    }

    /// Evaluation instant as seconds past `start_time`, clamped into the
    /// propagation window. Defaults to the window midpoint.
    pub fn evaluation_offset_seconds(&self) -> f64 {
        let duration = self.duration_seconds();
        match self.evaluation_time {
            Some(t) => (t - self.start_time).to_seconds().clamp(0.0, duration),
            None => duration / 2.0,
        }
    }

    pub fn epoch_at_offset(&self, offset_seconds: f64) -> Epoch {
        self.start_time + Duration::from_seconds(offset_seconds)
    }
}

/// Monte Carlo dispersion parameters. Read-only for the whole harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispersionConfig {
    pub sample_count: usize,
    pub semi_major_axis_sigma_m: f64,
    pub inclination_sigma_deg: f64,
    /// Sigma of the multiplicative drag-coefficient scale, centered on 1.
    pub drag_coefficient_sigma: f64,
    pub seed: u64,
}

impl DispersionConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        for sigma in [
            self.semi_major_axis_sigma_m,
            self.inclination_sigma_deg,
            self.drag_coefficient_sigma,
        ] {
            if !(sigma >= 0.0) {
                return Err(CoreError::InvalidDispersionSigma(sigma));
            }
        }
        Ok(())
    }

    /// Effective trial count, never below the configured floor.
    pub fn run_count(&self) -> usize {
        self.sample_count.max(MONTE_CARLO_RUN_FLOOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn settings(duration_s: f64) -> PropagatorSettings {
        let start = Epoch::from_gregorian_utc(2024, 3, 15, 0, 0, 0, 0);
        PropagatorSettings::new(start, start + Duration::from_seconds(duration_s))
    }

    #[test]
    fn evaluation_defaults_to_midpoint() {
        assert_abs_diff_eq!(settings(5400.0).evaluation_offset_seconds(), 2700.0);
    }

    #[test]
    fn evaluation_time_is_clamped_into_window() {
        let mut s = settings(5400.0);
        s.evaluation_time = Some(s.stop_time + Duration::from_seconds(900.0));
        assert_abs_diff_eq!(s.evaluation_offset_seconds(), 5400.0);

        s.evaluation_time = Some(s.start_time - Duration::from_seconds(900.0));
        assert_abs_diff_eq!(s.evaluation_offset_seconds(), 0.0);
    }

    #[test]
    fn inverted_window_is_a_config_error() {
        let start = Epoch::from_gregorian_utc(2024, 3, 15, 0, 0, 0, 0);
        let mut s = PropagatorSettings::new(start, start - Duration::from_seconds(600.0));
        assert!(matches!(
            s.validate(),
            Err(CoreError::InvertedTimeWindow { .. })
        ));

        // An evaluation instant on an inverted window must stay behind the
        // validate() gate; a zero-length window itself is fine.
        s.stop_time = s.start_time;
        s.evaluation_time = Some(s.start_time);
        assert!(s.validate().is_ok());
        assert_abs_diff_eq!(s.evaluation_offset_seconds(), 0.0);
    }

    #[test]
    fn run_count_honors_floor() {
        let config = DispersionConfig {
            sample_count: 10,
            semi_major_axis_sigma_m: 0.0,
            inclination_sigma_deg: 0.0,
            drag_coefficient_sigma: 0.0,
            seed: 1,
        };
        assert_eq!(config.run_count(), MONTE_CARLO_RUN_FLOOR);
    }

    #[test]
    fn negative_sigma_is_a_config_error() {
        let config = DispersionConfig {
            sample_count: 600,
            semi_major_axis_sigma_m: -1.0,
            inclination_sigma_deg: 0.0,
            drag_coefficient_sigma: 0.0,
            seed: 1,
        };
        assert!(config.validate().is_err());
    }
}
