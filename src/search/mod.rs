pub mod raan_alignment;
pub mod repeat_ground_track;

pub use raan_alignment::{RaanAlignmentResult, RaanAlignmentSearch, RaanCandidate, RaanSearchConfig};
pub use repeat_ground_track::{RepeatGroundTrackSolution, RepeatGroundTrackSolver, SolverOptions};
