use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::{EARTH_ANGULAR_VELOCITY, MU_EARTH, PI};
use crate::error::CoreError;
use crate::physics::orbital::OrbitalMechanics;

/// Iteration and tolerance budgets for the bisection. Explicit so callers
/// can tune or test convergence behavior directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SolverOptions {
    pub max_bracket_expansions: usize,
    pub max_bisection_iterations: usize,
    pub residual_tolerance: f64,
    pub bracket_tolerance_km: f64,
    /// Initial half-width of the bracket, as a fraction of the seed
    /// semi-major axis; doubles on every expansion.
    pub initial_bracket_fraction: f64,
}

impl Default for SolverOptions {
    fn default() -> Self {
        SolverOptions {
            max_bracket_expansions: 40,
            max_bisection_iterations: 80,
            residual_tolerance: 1e-10,
            bracket_tolerance_km: 1e-9,
            initial_bracket_fraction: 0.01,
        }
    }
}

/// Result record, produced once per invocation. `converged = false` with a
/// best-effort semi-major axis means "no solution in range", a recoverable
/// outcome rather than an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RepeatGroundTrackSolution {
    pub semi_major_axis_km: f64,
    pub nodal_period_s: f64,
    pub repeat_ratio: f64,
    pub residual: f64,
    pub converged: bool,
    pub iterations: usize,
}

/// Bisection root-finder for the repeat-ground-track resonance
/// `(ω⊕ − Ω̇(a)) / nodal_rate(a) = repeat_cycle_days / orbits_per_cycle`,
/// where the nodal rate combines the mean motion with the J2 secular
/// perigee and mean-anomaly corrections.
pub struct RepeatGroundTrackSolver {
    eccentricity: f64,
    inclination: f64,
    options: SolverOptions,
}

impl RepeatGroundTrackSolver {
    pub fn new(eccentricity: f64, inclination: f64) -> Self {
        Self::with_options(eccentricity, inclination, SolverOptions::default())
    }

    pub fn with_options(eccentricity: f64, inclination: f64, options: SolverOptions) -> Self {
        RepeatGroundTrackSolver {
            eccentricity,
            inclination,
            options,
        }
    }

    pub fn solve(
        &self,
        repeat_cycle_days: f64,
        orbits_per_cycle: f64,
    ) -> Result<RepeatGroundTrackSolution, CoreError> {
        if !(repeat_cycle_days > 0.0) || !(orbits_per_cycle > 0.0) {
            return Err(CoreError::InvalidRepeatCycle {
                days: repeat_cycle_days,
                orbits: orbits_per_cycle,
            });
        }
        let target_ratio = repeat_cycle_days / orbits_per_cycle;

        // Seed from the unperturbed two-body resonance
        let n0 = EARTH_ANGULAR_VELOCITY / target_ratio;
        let seed = (MU_EARTH / (n0 * n0)).cbrt();

        let mut delta = self.options.initial_bracket_fraction;
        let mut lo = (seed * (1.0 - delta)).max(seed * 1e-3);
        let mut hi = seed * (1.0 + delta);
        let mut f_lo = self.residual(lo, target_ratio);
        let mut f_hi = self.residual(hi, target_ratio);

        let mut expansions = 0;
        while f_lo.signum() == f_hi.signum() && expansions < self.options.max_bracket_expansions {
            delta *= 2.0;
            lo = (seed * (1.0 - delta)).max(seed * 1e-3);
            hi = seed * (1.0 + delta);
            f_lo = self.residual(lo, target_ratio);
            f_hi = self.residual(hi, target_ratio);
            expansions += 1;
        }

        if f_lo.signum() == f_hi.signum() {
            debug!(
                "no sign change after {expansions} expansions for ratio {target_ratio}; \
                 reporting best-effort midpoint"
            );
            return Ok(self.solution_at(0.5 * (lo + hi), target_ratio, false, expansions));
        }

        let bracket_tolerance_m = self.options.bracket_tolerance_km * 1000.0;
        let mut iterations = 0;
        let mut mid = 0.5 * (lo + hi);
        let mut f_mid = self.residual(mid, target_ratio);
        while iterations < self.options.max_bisection_iterations {
            mid = 0.5 * (lo + hi);
            f_mid = self.residual(mid, target_ratio);
            if f_mid.abs() < self.options.residual_tolerance || hi - lo < bracket_tolerance_m {
                break;
            }
            if f_mid.signum() == f_lo.signum() {
                lo = mid;
                f_lo = f_mid;
            } else {
                hi = mid;
            }
            iterations += 1;
        }

        let converged =
            f_mid.abs() < self.options.residual_tolerance || hi - lo < bracket_tolerance_m;
        Ok(self.solution_at(mid, target_ratio, converged, iterations))
    }

    /// Days of node-relative Earth rotation per nodal orbit, minus the
    /// target ratio.
    fn residual(&self, semi_major_axis: f64, target_ratio: f64) -> f64 {
        self.achieved_ratio(semi_major_axis) - target_ratio
    }

    fn achieved_ratio(&self, semi_major_axis: f64) -> f64 {
        let rates = OrbitalMechanics::j2_secular_rates(
            semi_major_axis,
            self.eccentricity,
            self.inclination,
        );
        let nodal_rate = rates.mean_motion + rates.mean_anomaly_rate + rates.arg_perigee_rate;
        (EARTH_ANGULAR_VELOCITY - rates.raan_rate) / nodal_rate
    }

    fn solution_at(
        &self,
        semi_major_axis: f64,
        target_ratio: f64,
        converged: bool,
        iterations: usize,
    ) -> RepeatGroundTrackSolution {
        let rates = OrbitalMechanics::j2_secular_rates(
            semi_major_axis,
            self.eccentricity,
            self.inclination,
        );
        let nodal_rate = rates.mean_motion + rates.mean_anomaly_rate + rates.arg_perigee_rate;

        RepeatGroundTrackSolution {
            semi_major_axis_km: semi_major_axis / 1000.0,
            nodal_period_s: 2.0 * PI / nodal_rate,
            repeat_ratio: self.achieved_ratio(semi_major_axis),
            residual: self.residual(semi_major_axis, target_ratio),
            converged,
            iterations,
        }
    }
}
