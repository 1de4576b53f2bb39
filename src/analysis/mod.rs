pub mod compliance;
pub mod monte_carlo;
pub mod stats;

pub use compliance::{ComplianceEvaluator, ComplianceReport, ComplianceSample, ComplianceSummary};
pub use monte_carlo::{MonteCarloHarness, MonteCarloSummary};
pub use stats::MetricStats;
