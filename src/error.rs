use hifitime::Epoch;
use thiserror::Error;

/// Fatal configuration and geometry errors.
///
/// Numeric non-convergence is deliberately not represented here: the Kepler
/// solver falls back to its last iterate and the repeat-ground-track solver
/// reports `converged = false`, both as structured result fields.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("semi-major axis must be positive, got {0} m")]
    NonPositiveSemiMajorAxis(f64),
    #[error("eccentricity must lie in [0, 1), got {0}")]
    EccentricityOutOfRange(f64),
    #[error("position vector has zero magnitude")]
    ZeroMagnitudePosition,
    #[error("velocity vector has zero magnitude")]
    ZeroMagnitudeVelocity,
    #[error("angular momentum is zero; orbit plane is undefined")]
    ZeroAngularMomentum,
    #[error("state is not elliptical (specific energy {energy} J/kg, eccentricity {eccentricity})")]
    NonElliptical { energy: f64, eccentricity: f64 },
    #[error("spacecraft mass must be positive, got {0} kg")]
    NonPositiveMass(f64),
    #[error("formation has no vehicles")]
    EmptyFormation,
    #[error("propagation produced no samples")]
    EmptyTrajectory,
    #[error("trajectories have mismatched sample counts ({0} vs {1})")]
    TrajectoryLengthMismatch(usize, usize),
    #[error("dispersion sigma must be non-negative, got {0}")]
    InvalidDispersionSigma(f64),
    #[error("repeat cycle requires positive days and orbits, got {days} days / {orbits} orbits")]
    InvalidRepeatCycle { days: f64, orbits: f64 },
    #[error("time step must be positive, got {0} s")]
    NonPositiveTimeStep(f64),
    #[error("stop time {stop} precedes start time {start}")]
    InvertedTimeWindow { start: Epoch, stop: Epoch },
    #[error("search domain is empty ({start}..{end} deg)")]
    EmptySearchDomain { start: f64, end: f64 },
}
