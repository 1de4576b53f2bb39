use nalgebra as na;
use serde::{Deserialize, Serialize};

use crate::config::formation::{FormationConfig, TargetPoint};
use crate::config::settings::PropagatorSettings;
use crate::coordinates::groundtrack::{
    direction_to_latlon, earth_rotation_angle, eci_to_ecef, great_circle_distance_km,
    signed_cross_track_km, subsatellite_point,
};
use crate::error::CoreError;
use crate::physics::orbital::OrbitalMechanics;
use crate::propagation::Trajectory;

// Plane normals closer than this are treated as coplanar; their
// intersection is numerically meaningless.
const COPLANAR_TOLERANCE: f64 = 1e-9;

/// Signed cross-track snapshot of the whole fleet at one sampled epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceSample {
    pub time_offset_s: f64,
    pub per_vehicle_cross_track_km: Vec<f64>,
    pub centroid_cross_track_km: f64,
    pub worst_vehicle_abs_km: f64,
}

impl ComplianceSample {
    /// Centroid is the mean of the signed values; the sign convention is
    /// what allows cancellation across vehicles on opposite sides of the
    /// target. Worst-vehicle is the largest absolute value.
    pub fn from_values(time_offset_s: f64, per_vehicle_cross_track_km: Vec<f64>) -> Self {
        let n = per_vehicle_cross_track_km.len().max(1) as f64;
        let centroid = per_vehicle_cross_track_km.iter().sum::<f64>() / n;
        let worst = per_vehicle_cross_track_km
            .iter()
            .fold(0.0_f64, |acc, v| acc.max(v.abs()));
        ComplianceSample {
            time_offset_s,
            per_vehicle_cross_track_km,
            centroid_cross_track_km: centroid,
            worst_vehicle_abs_km: worst,
        }
    }
}

/// Primary compliance needs the centroid inside the primary limit and the
/// worst vehicle inside the waiver limit; waiver compliance needs only the
/// latter.
pub fn compliance_flags(
    centroid_abs_km: f64,
    worst_abs_km: f64,
    primary_limit_km: f64,
    waiver_limit_km: f64,
) -> (bool, bool) {
    let waiver = worst_abs_km <= waiver_limit_km;
    let primary = centroid_abs_km <= primary_limit_km && waiver;
    (primary, waiver)
}

/// Running absolute cross-track extrema for one vehicle, with the
/// timestamps at which each extremum was first seen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleExtrema {
    pub vehicle_id: String,
    pub max_abs_km: f64,
    pub max_abs_time_offset_s: f64,
    pub min_abs_km: f64,
    pub min_abs_time_offset_s: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaneIntersectionResult {
    pub distance_km: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    /// True only when a plane-separation limit is configured and met.
    pub compliant: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub evaluation_time_offset_s: f64,
    pub per_vehicle_cross_track_at_evaluation_km: Vec<f64>,
    pub centroid_cross_track_km: f64,
    pub centroid_abs_km: f64,
    pub worst_vehicle_abs_km: f64,
    pub primary_compliant: bool,
    pub waiver_compliant: bool,
    pub orbital_period_s: f64,
    pub vehicle_extrema: Vec<VehicleExtrema>,
    pub plane_intersection: Option<PlaneIntersectionResult>,
    pub primary_limit_km: f64,
    pub waiver_limit_km: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub samples: Vec<ComplianceSample>,
    pub summary: ComplianceSummary,
}

/// Converts propagated inertial trajectories into ground-relative
/// cross-track statistics against a fixed surface target.
pub struct ComplianceEvaluator<'a> {
    target: &'a TargetPoint,
    formation: &'a FormationConfig,
    settings: &'a PropagatorSettings,
}

impl<'a> ComplianceEvaluator<'a> {
    pub fn new(
        target: &'a TargetPoint,
        formation: &'a FormationConfig,
        settings: &'a PropagatorSettings,
    ) -> Self {
        ComplianceEvaluator {
            target,
            formation,
            settings,
        }
    }

    pub fn evaluate(&self, trajectories: &[Trajectory]) -> Result<ComplianceReport, CoreError> {
        self.settings.validate()?;
        if trajectories.is_empty() {
            return Err(CoreError::EmptyFormation);
        }
        let sample_count = trajectories[0].samples.len();
        if sample_count == 0 {
            return Err(CoreError::EmptyTrajectory);
        }
        for trajectory in &trajectories[1..] {
            if trajectory.samples.len() != sample_count {
                return Err(CoreError::TrajectoryLengthMismatch(
                    sample_count,
                    trajectory.samples.len(),
                ));
            }
        }

        let mut samples = Vec::with_capacity(sample_count);
        let mut extrema: Vec<VehicleExtrema> = trajectories
            .iter()
            .map(|t| VehicleExtrema {
                vehicle_id: t.vehicle_id.clone(),
                max_abs_km: f64::NEG_INFINITY,
                max_abs_time_offset_s: 0.0,
                min_abs_km: f64::INFINITY,
                min_abs_time_offset_s: 0.0,
            })
            .collect();

        for index in 0..sample_count {
            let time_offset_s = trajectories[0].samples[index].time_offset_s;
            let epoch = self.settings.epoch_at_offset(time_offset_s);
            let values: Vec<f64> = trajectories
                .iter()
                .map(|trajectory| {
                    let subpoint =
                        subsatellite_point(&trajectory.samples[index].state.position, &epoch);
                    signed_cross_track_km(&subpoint, self.target)
                })
                .collect();

            for (tracker, value) in extrema.iter_mut().zip(&values) {
                let abs = value.abs();
                // Strict comparisons keep the first-seen extremum timestamp
                if abs > tracker.max_abs_km {
                    tracker.max_abs_km = abs;
                    tracker.max_abs_time_offset_s = time_offset_s;
                }
                if abs < tracker.min_abs_km {
                    tracker.min_abs_km = abs;
                    tracker.min_abs_time_offset_s = time_offset_s;
                }
            }

            samples.push(ComplianceSample::from_values(time_offset_s, values));
        }

        let evaluation_offset = self.settings.evaluation_offset_seconds();
        let evaluation_index = nearest_sample_index(&samples, evaluation_offset);
        let evaluation = &samples[evaluation_index];

        let centroid_abs = evaluation.centroid_cross_track_km.abs();
        let (primary_compliant, waiver_compliant) = compliance_flags(
            centroid_abs,
            evaluation.worst_vehicle_abs_km,
            self.settings.primary_limit_km,
            self.settings.waiver_limit_km,
        );

        let plane_intersection = self.plane_intersection(trajectories, evaluation_index);

        let initial_elements =
            OrbitalMechanics::cartesian_to_classical(&trajectories[0].samples[0].state)?;
        let orbital_period_s = OrbitalMechanics::orbital_period(initial_elements.semi_major_axis);

        let summary = ComplianceSummary {
            evaluation_time_offset_s: evaluation.time_offset_s,
            per_vehicle_cross_track_at_evaluation_km: evaluation.per_vehicle_cross_track_km.clone(),
            centroid_cross_track_km: evaluation.centroid_cross_track_km,
            centroid_abs_km: centroid_abs,
            worst_vehicle_abs_km: evaluation.worst_vehicle_abs_km,
            primary_compliant,
            waiver_compliant,
            orbital_period_s,
            vehicle_extrema: extrema,
            plane_intersection,
            primary_limit_km: self.settings.primary_limit_km,
            waiver_limit_km: self.settings.waiver_limit_km,
        };

        Ok(ComplianceReport { samples, summary })
    }

    /// Intersects the great circles of the two declared plane groups and
    /// reports the ground distance of the nearer intersection to the
    /// target. Returns `None` unless exactly two non-degenerate groups are
    /// declared.
    fn plane_intersection(
        &self,
        trajectories: &[Trajectory],
        evaluation_index: usize,
    ) -> Option<PlaneIntersectionResult> {
        let groups = self.formation.plane_groups();
        if groups.len() != 2 {
            return None;
        }

        let mut normals = Vec::with_capacity(2);
        for (_, members) in &groups {
            let mut sum = na::Vector3::zeros();
            for &member in members {
                let state = trajectories.get(member)?.samples[evaluation_index].state;
                let h = state.position.cross(&state.velocity);
                sum += h.try_normalize(f64::EPSILON)?;
            }
            normals.push(sum.try_normalize(f64::EPSILON)?);
        }

        let line = normals[0].cross(&normals[1]);
        if line.magnitude() < COPLANAR_TOLERANCE {
            return None;
        }

        let time_offset_s = trajectories[0].samples[evaluation_index].time_offset_s;
        let epoch = self.settings.epoch_at_offset(time_offset_s);
        let rotation_angle = earth_rotation_angle(&epoch);

        let best = [line, -line]
            .iter()
            .map(|direction| {
                let ecef = eci_to_ecef(direction, rotation_angle);
                let (latitude_deg, longitude_deg) = direction_to_latlon(&ecef);
                let distance_km = great_circle_distance_km(
                    latitude_deg,
                    longitude_deg,
                    self.target.latitude_deg,
                    self.target.longitude_deg,
                );
                (distance_km, latitude_deg, longitude_deg)
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))?;

        let compliant = self
            .settings
            .plane_intersection_limit_km
            .map(|limit| best.0 <= limit)
            .unwrap_or(false);

        Some(PlaneIntersectionResult {
            distance_km: best.0,
            latitude_deg: best.1,
            longitude_deg: best.2,
            compliant,
        })
    }
}

fn nearest_sample_index(samples: &[ComplianceSample], target_offset_s: f64) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, sample) in samples.iter().enumerate() {
        let distance = (sample.time_offset_s - target_offset_s).abs();
        if distance < best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best
}
