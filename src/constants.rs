pub const MU_EARTH: f64 = 3.986004418e14; // Earth gravitational parameter (m³/s²)
pub const EARTH_J2: f64 = 1.08262668e-3; // Earth's J2 oblateness coefficient
pub const EARTH_ANGULAR_VELOCITY: f64 = 7.2921150e-5; // Earth's rotation rate (rad/s)
pub const WGS84_A: f64 = 6378137.0; // Semi-major axis [m]
pub const WGS84_F: f64 = 1.0 / 298.257223563; // Flattening
pub const R_EARTH_MEAN: f64 = 6.371e6; // Mean radius of Earth (m)

// Exponential atmosphere, anchored at 200 km
pub const ATMOSPHERE_REFERENCE_ALTITUDE: f64 = 200_000.0; // m
pub const ATMOSPHERE_REFERENCE_DENSITY: f64 = 2.789e-10; // kg/m³ at 200 km
pub const ATMOSPHERE_BASE_SCALE_HEIGHT: f64 = 37_500.0; // m
pub const ATMOSPHERE_DENSITY_FLOOR: f64 = 1e-18; // kg/m³; drag is zero below this
pub const NOMINAL_SOLAR_FLUX: f64 = 150.0; // F10.7 value the scale height is tuned at

// Kepler equation solver budgets
pub const KEPLER_TOLERANCE: f64 = 1e-12;
pub const KEPLER_MAX_ITERATIONS: usize = 60;

// Math
pub const PI: f64 = std::f64::consts::PI;
