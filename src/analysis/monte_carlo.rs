use log::{debug, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::compliance::ComplianceEvaluator;
use crate::analysis::stats::{summarize, MetricStats};
use crate::config::formation::{FormationConfig, TargetPoint};
use crate::config::settings::{DispersionConfig, PropagatorSettings};
use crate::error::CoreError;
use crate::models::OrbitalElements;
use crate::propagation::{build_fleet, propagate_fleet, ForceConfig};

/// Everything the aggregation step needs from one trial.
#[derive(Debug, Clone)]
struct TrialOutcome {
    centroid_abs_km: f64,
    worst_abs_km: f64,
    per_vehicle_eval_abs_km: Vec<f64>,
    per_vehicle_max_abs_km: Vec<f64>,
    per_vehicle_min_abs_km: Vec<f64>,
    plane_distance_km: Option<f64>,
    primary_compliant: bool,
    waiver_compliant: bool,
    plane_compliant: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub trial_count: usize,
    /// Trials that died on an invalid dispersed orbit; fatal to the trial,
    /// not to the run.
    pub failed_trial_count: usize,
    pub seed: u64,
    pub centroid_abs: MetricStats,
    pub worst_abs: MetricStats,
    pub per_vehicle_eval_abs: Vec<MetricStats>,
    pub per_vehicle_max_abs: Vec<MetricStats>,
    pub per_vehicle_min_abs: Vec<MetricStats>,
    pub plane_distance: Option<MetricStats>,
    pub primary_compliance_fraction: f64,
    pub waiver_compliance_fraction: f64,
    pub plane_compliance_fraction: f64,
    pub evaluation_time_offset_s: f64,
    pub primary_limit_km: f64,
    pub waiver_limit_km: f64,
}

/// Repeats the full propagation + compliance pipeline under sampled
/// parameter uncertainty.
///
/// Each trial draws from its own generator seeded by
/// `seed.wrapping_add(trial_index)`, so trials are order-independent and
/// may run in parallel; the aggregate for a fixed seed and run count is
/// bit-identical across runs and thread schedules.
pub struct MonteCarloHarness<'a> {
    nominal: &'a OrbitalElements,
    formation: &'a FormationConfig,
    target: &'a TargetPoint,
    settings: &'a PropagatorSettings,
    dispersion: &'a DispersionConfig,
}

impl<'a> MonteCarloHarness<'a> {
    pub fn new(
        nominal: &'a OrbitalElements,
        formation: &'a FormationConfig,
        target: &'a TargetPoint,
        settings: &'a PropagatorSettings,
        dispersion: &'a DispersionConfig,
    ) -> Self {
        MonteCarloHarness {
            nominal,
            formation,
            target,
            settings,
            dispersion,
        }
    }

    pub fn run(&self) -> Result<MonteCarloSummary, CoreError> {
        self.nominal.validate()?;
        self.settings.validate()?;
        self.dispersion.validate()?;

        let run_count = self.dispersion.run_count();
        debug!(
            "starting Monte Carlo: {run_count} trials, seed {}",
            self.dispersion.seed
        );

        // Trial order in the output vector is fixed by the index, so the
        // reduction below is independent of execution order.
        let outcomes: Vec<(usize, Result<TrialOutcome, CoreError>)> = (0..run_count)
            .into_par_iter()
            .map(|trial| (trial, self.run_trial(trial as u64)))
            .collect();

        let mut successes = Vec::with_capacity(run_count);
        let mut first_error = None;
        for (trial, outcome) in outcomes {
            match outcome {
                Ok(outcome) => successes.push(outcome),
                Err(error) => {
                    warn!("trial {trial} failed: {error}");
                    if first_error.is_none() {
                        first_error = Some(error);
                    }
                }
            }
        }
        if successes.is_empty() {
            // Every trial failing is a configuration problem, not noise
            return Err(first_error.unwrap_or(CoreError::EmptyTrajectory));
        }

        let failed_trial_count = run_count - successes.len();
        let vehicle_count = successes[0].per_vehicle_eval_abs_km.len();

        let centroid_abs: Vec<f64> = successes.iter().map(|t| t.centroid_abs_km).collect();
        let worst_abs: Vec<f64> = successes.iter().map(|t| t.worst_abs_km).collect();

        let per_vehicle_eval_abs = (0..vehicle_count)
            .map(|v| {
                summarize(
                    &successes
                        .iter()
                        .map(|t| t.per_vehicle_eval_abs_km[v])
                        .collect::<Vec<_>>(),
                )
            })
            .collect();
        let per_vehicle_max_abs = (0..vehicle_count)
            .map(|v| {
                summarize(
                    &successes
                        .iter()
                        .map(|t| t.per_vehicle_max_abs_km[v])
                        .collect::<Vec<_>>(),
                )
            })
            .collect();
        let per_vehicle_min_abs = (0..vehicle_count)
            .map(|v| {
                summarize(
                    &successes
                        .iter()
                        .map(|t| t.per_vehicle_min_abs_km[v])
                        .collect::<Vec<_>>(),
                )
            })
            .collect();

        let plane_distances: Vec<f64> = successes
            .iter()
            .filter_map(|t| t.plane_distance_km)
            .collect();
        let plane_distance = if plane_distances.is_empty() {
            None
        } else {
            Some(summarize(&plane_distances))
        };

        let n = successes.len() as f64;
        let fraction = |predicate: fn(&TrialOutcome) -> bool| {
            successes.iter().filter(|t| predicate(t)).count() as f64 / n
        };

        Ok(MonteCarloSummary {
            trial_count: run_count,
            failed_trial_count,
            seed: self.dispersion.seed,
            centroid_abs: summarize(&centroid_abs),
            worst_abs: summarize(&worst_abs),
            per_vehicle_eval_abs,
            per_vehicle_max_abs,
            per_vehicle_min_abs,
            plane_distance,
            primary_compliance_fraction: fraction(|t| t.primary_compliant),
            waiver_compliance_fraction: fraction(|t| t.waiver_compliant),
            plane_compliance_fraction: fraction(|t| t.plane_compliant),
            evaluation_time_offset_s: self.settings.evaluation_offset_seconds(),
            primary_limit_km: self.settings.primary_limit_km,
            waiver_limit_km: self.settings.waiver_limit_km,
        })
    }

    fn run_trial(&self, trial_index: u64) -> Result<TrialOutcome, CoreError> {
        let mut rng = StdRng::seed_from_u64(self.dispersion.seed.wrapping_add(trial_index));

        // Fixed draw order: semi-major axis, inclination, drag scale
        let delta_sma = normal_draw(&mut rng, self.dispersion.semi_major_axis_sigma_m)?;
        let delta_inclination_deg = normal_draw(&mut rng, self.dispersion.inclination_sigma_deg)?;
        let drag_scale =
            (1.0 + normal_draw(&mut rng, self.dispersion.drag_coefficient_sigma)?).max(0.0);

        let dispersed = OrbitalElements {
            semi_major_axis: self.nominal.semi_major_axis + delta_sma,
            inclination: self.nominal.inclination + delta_inclination_deg.to_radians(),
            ..*self.nominal
        };
        dispersed.validate()?;

        let mut trial_settings = self.settings.clone();
        trial_settings.drag_coefficient *= drag_scale;

        let fleet = build_fleet(&dispersed, self.formation, &trial_settings)?;
        let trajectories = propagate_fleet(&fleet, &trial_settings, ForceConfig::default())?;
        let report = ComplianceEvaluator::new(self.target, self.formation, &trial_settings)
            .evaluate(&trajectories)?;
        let summary = report.summary;

        Ok(TrialOutcome {
            centroid_abs_km: summary.centroid_abs_km,
            worst_abs_km: summary.worst_vehicle_abs_km,
            per_vehicle_eval_abs_km: summary
                .per_vehicle_cross_track_at_evaluation_km
                .iter()
                .map(|v| v.abs())
                .collect(),
            per_vehicle_max_abs_km: summary
                .vehicle_extrema
                .iter()
                .map(|e| e.max_abs_km)
                .collect(),
            per_vehicle_min_abs_km: summary
                .vehicle_extrema
                .iter()
                .map(|e| e.min_abs_km)
                .collect(),
            plane_distance_km: summary.plane_intersection.as_ref().map(|p| p.distance_km),
            primary_compliant: summary.primary_compliant,
            waiver_compliant: summary.waiver_compliant,
            plane_compliant: summary
                .plane_intersection
                .as_ref()
                .map(|p| p.compliant)
                .unwrap_or(false),
        })
    }
}

fn normal_draw(rng: &mut StdRng, sigma: f64) -> Result<f64, CoreError> {
    let normal = Normal::new(0.0, sigma).map_err(|_| CoreError::InvalidDispersionSigma(sigma))?;
    Ok(normal.sample(rng))
}
