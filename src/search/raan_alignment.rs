use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::compliance::ComplianceEvaluator;
use crate::config::formation::{FormationConfig, TargetPoint};
use crate::config::settings::PropagatorSettings;
use crate::error::CoreError;
use crate::models::OrbitalElements;
use crate::propagation::{build_fleet, propagate_fleet, ForceConfig};

/// Grid and refinement shape for the RAAN search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RaanSearchConfig {
    pub domain_start_deg: f64,
    pub domain_end_deg: f64,
    /// Coarse grid points over the domain; clamped to at least 3.
    pub coarse_samples: usize,
    /// Local refinement rounds around the incumbent best; at least 1.
    pub refinement_rounds: usize,
    /// Points per refinement round; the window half-width shrinks by
    /// (refinement_samples - 1) each round.
    pub refinement_samples: usize,
}

impl Default for RaanSearchConfig {
    fn default() -> Self {
        RaanSearchConfig {
            domain_start_deg: 0.0,
            domain_end_deg: 360.0,
            coarse_samples: 24,
            refinement_rounds: 3,
            refinement_samples: 5,
        }
    }
}

/// One scored RAAN candidate: the metric is the centroid absolute
/// cross-track at the evaluation epoch of a single deterministic
/// propagation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RaanCandidate {
    pub raan_deg: f64,
    pub centroid_abs_km: f64,
    pub worst_abs_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaanAlignmentResult {
    pub best: RaanCandidate,
    /// Every candidate evaluated, coarse grid first, in evaluation order.
    pub trace: Vec<RaanCandidate>,
}

/// Coarse-to-fine grid search selecting the RAAN that minimizes the
/// centroid absolute cross-track error.
///
/// This is local optimization: a response multimodal at a scale finer than
/// the coarse grid spacing can steer the refinement to a secondary minimum.
/// That is an accepted limitation of the scheme, not something this
/// implementation attempts to paper over.
pub struct RaanAlignmentSearch<'a> {
    nominal: &'a OrbitalElements,
    formation: &'a FormationConfig,
    target: &'a TargetPoint,
    settings: &'a PropagatorSettings,
    forces: ForceConfig,
}

impl<'a> RaanAlignmentSearch<'a> {
    pub fn new(
        nominal: &'a OrbitalElements,
        formation: &'a FormationConfig,
        target: &'a TargetPoint,
        settings: &'a PropagatorSettings,
        forces: ForceConfig,
    ) -> Self {
        RaanAlignmentSearch {
            nominal,
            formation,
            target,
            settings,
            forces,
        }
    }

    pub fn run(&self, config: &RaanSearchConfig) -> Result<RaanAlignmentResult, CoreError> {
        self.nominal.validate()?;
        self.settings.validate()?;
        let span = config.domain_end_deg - config.domain_start_deg;
        if !(span > 0.0) {
            return Err(CoreError::EmptySearchDomain {
                start: config.domain_start_deg,
                end: config.domain_end_deg,
            });
        }

        let coarse_samples = config.coarse_samples.max(3);
        let rounds = config.refinement_rounds.max(1);
        let refinement_samples = config.refinement_samples.max(3);

        // Endpoint-exclusive coarse grid; 0° and 360° are the same plane.
        let spacing = span / coarse_samples as f64;
        let coarse_points: Vec<f64> = (0..coarse_samples)
            .map(|i| config.domain_start_deg + i as f64 * spacing)
            .collect();

        let mut trace = self.score_batch(&coarse_points)?;
        let mut best = pick_best(&trace);
        debug!(
            "coarse RAAN grid done: best {:.3} deg at {:.3} km",
            best.raan_deg, best.centroid_abs_km
        );

        let mut half_width = spacing;
        for round in 0..rounds {
            half_width /= (refinement_samples - 1) as f64;
            let step = 2.0 * half_width / (refinement_samples - 1) as f64;
            let points: Vec<f64> = (0..refinement_samples)
                .map(|i| {
                    (best.raan_deg - half_width + i as f64 * step)
                        .clamp(config.domain_start_deg, config.domain_end_deg)
                })
                .collect();

            let candidates = self.score_batch(&points)?;
            trace.extend_from_slice(&candidates);

            let round_best = pick_best(&candidates);
            if round_best.centroid_abs_km < best.centroid_abs_km {
                best = round_best;
            }
            debug!(
                "refinement round {round}: best {:.4} deg at {:.4} km",
                best.raan_deg, best.centroid_abs_km
            );
        }

        Ok(RaanAlignmentResult { best, trace })
    }

    /// Candidate evaluations are independent; score them in parallel but
    /// keep the input order in the output.
    fn score_batch(&self, raan_degs: &[f64]) -> Result<Vec<RaanCandidate>, CoreError> {
        raan_degs
            .par_iter()
            .map(|&raan_deg| self.score(raan_deg))
            .collect()
    }

    fn score(&self, raan_deg: f64) -> Result<RaanCandidate, CoreError> {
        let elements = OrbitalElements {
            raan: raan_deg.to_radians(),
            ..*self.nominal
        };
        let fleet = build_fleet(&elements, self.formation, self.settings)?;
        let trajectories = propagate_fleet(&fleet, self.settings, self.forces)?;
        let report = ComplianceEvaluator::new(self.target, self.formation, self.settings)
            .evaluate(&trajectories)?;

        Ok(RaanCandidate {
            raan_deg,
            centroid_abs_km: report.summary.centroid_abs_km,
            worst_abs_km: report.summary.worst_vehicle_abs_km,
        })
    }
}

/// First-encountered minimum wins ties, keeping results independent of
/// evaluation order.
fn pick_best(candidates: &[RaanCandidate]) -> RaanCandidate {
    let mut best = candidates[0];
    for candidate in &candidates[1..] {
        if candidate.centroid_abs_km < best.centroid_abs_km {
            best = *candidate;
        }
    }
    best
}
