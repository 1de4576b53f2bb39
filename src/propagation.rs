use serde::{Deserialize, Serialize};

use crate::config::formation::FormationConfig;
use crate::config::settings::PropagatorSettings;
use crate::error::CoreError;
use crate::integrators::RK4;
use crate::models::{CartesianState, OrbitalElements, SpacecraftState};
use crate::constants::MU_EARTH;
use crate::physics::dynamics::OrbitDynamics;
use crate::physics::orbital::{wrap_angle, OrbitalMechanics};

// Only the area-to-mass ratio matters for drag; the reference mass just
// fixes the split between area and mass.
const REFERENCE_MASS_KG: f64 = 100.0;

/// Which perturbations the force model applies.
#[derive(Debug, Clone, Copy)]
pub struct ForceConfig {
    pub include_j2: bool,
    pub include_drag: bool,
}

impl Default for ForceConfig {
    fn default() -> Self {
        ForceConfig {
            include_j2: true,
            include_drag: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub time_offset_s: f64,
    pub state: CartesianState,
}

/// Time-ordered state history of one vehicle over `[start, stop]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    pub vehicle_id: String,
    pub samples: Vec<TrajectorySample>,
}

/// Builds one `SpacecraftState` per formation vehicle by offsetting the
/// nominal state in its radial/along-track/cross-track frame. Every vehicle
/// gets its own copy; nothing is shared between propagation runs.
pub fn build_fleet(
    nominal: &OrbitalElements,
    formation: &FormationConfig,
    settings: &PropagatorSettings,
) -> Result<Vec<SpacecraftState>, CoreError> {
    if formation.vehicles.is_empty() {
        return Err(CoreError::EmptyFormation);
    }

    // The elements are defined at epoch_time; advance the mean anomaly to
    // the propagation start at the two-body rate.
    let mut elements = *nominal;
    let epoch_gap_s = (settings.start_time - settings.epoch_time).to_seconds();
    if epoch_gap_s != 0.0 {
        let mean_motion = (MU_EARTH / elements.semi_major_axis.powi(3)).sqrt();
        elements.mean_anomaly = wrap_angle(elements.mean_anomaly + mean_motion * epoch_gap_s);
    }

    let reference = OrbitalMechanics::classical_to_cartesian(&elements)?;
    let radial = reference
        .position
        .try_normalize(f64::EPSILON)
        .ok_or(CoreError::ZeroMagnitudePosition)?;
    let h = reference.position.cross(&reference.velocity);
    let cross_track = h
        .try_normalize(f64::EPSILON)
        .ok_or(CoreError::ZeroAngularMomentum)?;
    let along_track = cross_track.cross(&radial);

    let area = settings.ballistic_coefficient * REFERENCE_MASS_KG;

    formation
        .vehicles
        .iter()
        .map(|vehicle| {
            let offset_m = 1000.0
                * (vehicle.offset.radial_km * radial
                    + vehicle.offset.along_track_km * along_track
                    + vehicle.offset.cross_track_km * cross_track);
            let state = CartesianState::new(reference.position + offset_m, reference.velocity);
            SpacecraftState::new(
                vehicle.id.clone(),
                state,
                settings.drag_coefficient,
                area,
                REFERENCE_MASS_KG,
            )
        })
        .collect()
}

/// Propagates one vehicle across the settings window at the fixed step,
/// recording every step. The final step may land past `stop_time`; the
/// boundary check is inclusive, matching the fixed-step contract.
pub fn propagate_vehicle(
    vehicle: &SpacecraftState,
    settings: &PropagatorSettings,
    forces: ForceConfig,
) -> Result<Trajectory, CoreError> {
    settings.validate()?;

    let dynamics = OrbitDynamics::new(
        vehicle,
        forces.include_j2,
        forces.include_drag,
        settings.solar_flux_index,
    );
    let integrator = RK4::new(dynamics);

    let duration = settings.duration_seconds();
    let dt = settings.time_step_seconds;

    let mut samples = Vec::with_capacity((duration / dt).ceil() as usize + 1);
    let mut state = vehicle.state;
    let mut t = 0.0;
    samples.push(TrajectorySample {
        time_offset_s: t,
        state,
    });

    while t < duration {
        state = integrator.advance(&state, dt)?;
        t += dt;
        samples.push(TrajectorySample {
            time_offset_s: t,
            state,
        });
    }

    Ok(Trajectory {
        vehicle_id: vehicle.id.clone(),
        samples,
    })
}

/// Propagates every vehicle of a fleet with one shared configuration.
pub fn propagate_fleet(
    fleet: &[SpacecraftState],
    settings: &PropagatorSettings,
    forces: ForceConfig,
) -> Result<Vec<Trajectory>, CoreError> {
    fleet
        .iter()
        .map(|vehicle| propagate_vehicle(vehicle, settings, forces))
        .collect()
}
