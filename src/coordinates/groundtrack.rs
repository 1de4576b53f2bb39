use crate::config::formation::TargetPoint;
use crate::constants::*;
use crate::physics::orbital::wrap_angle;
use hifitime::Epoch;
use nalgebra as na;

#[derive(Debug, Clone, Copy)]
pub struct GeodeticPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

/// Earth Rotation Angle at an epoch (rad), from the IAU 2000 linear model
/// in UT1 days since J2000.0. UT1-UTC is neglected here; sub-kilometer
/// ground accuracy does not warrant an EOP feed.
pub fn earth_rotation_angle(epoch: &Epoch) -> f64 {
    let jd = epoch.to_jde_utc_days();
    wrap_angle(2.0 * PI * (0.7790572732640 + 1.00273781191135448 * (jd - 2451545.0)))
}

/// Rotate an inertial position into the Earth-fixed frame.
pub fn eci_to_ecef(position: &na::Vector3<f64>, rotation_angle: f64) -> na::Vector3<f64> {
    na::Rotation3::from_axis_angle(&na::Vector3::z_axis(), -rotation_angle) * position
}

/// Convert an Earth-fixed Cartesian position to geodetic coordinates
/// (WGS84), iterating on the latitude.
pub fn ecef_to_geodetic(position: &na::Vector3<f64>) -> GeodeticPoint {
    let x = position[0];
    let y = position[1];
    let z = position[2];

    let longitude = y.atan2(x);

    let a = WGS84_A;
    let f = WGS84_F;
    let b = a * (1.0 - f);
    let e2 = 2.0 * f - f * f; // First eccentricity squared

    let p = (x * x + y * y).sqrt();

    // On the rotation axis the longitude is undefined
    if p < 1e-10 {
        let latitude: f64 = if z < 0.0 { -PI / 2.0 } else { PI / 2.0 };
        let altitude = (z.abs() - b).max(0.0);
        return GeodeticPoint {
            latitude_deg: latitude.to_degrees(),
            longitude_deg: 0.0,
            altitude_m: altitude,
        };
    }

    // Initial guess, then iterate; usually converges in 2-3 iterations
    let mut latitude = z.atan2(p * (1.0 - e2));
    for _ in 0..5 {
        let sin_lat = latitude.sin();
        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let h = p / latitude.cos() - n;

        let prev_lat = latitude;
        latitude = (z / p).atan2(1.0 - e2 * n / (n + h));
        if (latitude - prev_lat).abs() < 1e-12 {
            break;
        }
    }

    let sin_lat = latitude.sin();
    let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let altitude = p / latitude.cos() - n;

    GeodeticPoint {
        latitude_deg: latitude.to_degrees(),
        longitude_deg: longitude.to_degrees(),
        altitude_m: altitude,
    }
}

/// Sub-satellite geodetic point for an inertial position at an epoch.
pub fn subsatellite_point(position_eci: &na::Vector3<f64>, epoch: &Epoch) -> GeodeticPoint {
    let ecef = eci_to_ecef(position_eci, earth_rotation_angle(epoch));
    ecef_to_geodetic(&ecef)
}

/// Great-circle surface distance between two lat/lon points (km),
/// haversine on the mean Earth radius.
pub fn great_circle_distance_km(
    lat1_deg: f64,
    lon1_deg: f64,
    lat2_deg: f64,
    lon2_deg: f64,
) -> f64 {
    let lat1 = lat1_deg.to_radians();
    let lat2 = lat2_deg.to_radians();
    let dlat = (lat2_deg - lat1_deg).to_radians();
    let dlon = (lon2_deg - lon1_deg).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    R_EARTH_MEAN / 1000.0 * c
}

/// Signed cross-track offset of a sub-satellite point from the target (km):
/// the great-circle distance, positive when the sub-satellite point lies
/// north of the target's latitude. The sign is what lets a formation
/// centroid cancel across vehicles on opposite sides of the target.
pub fn signed_cross_track_km(subpoint: &GeodeticPoint, target: &TargetPoint) -> f64 {
    let distance = great_circle_distance_km(
        subpoint.latitude_deg,
        subpoint.longitude_deg,
        target.latitude_deg,
        target.longitude_deg,
    );
    if subpoint.latitude_deg >= target.latitude_deg {
        distance
    } else {
        -distance
    }
}

/// Geocentric latitude/longitude (deg) of a unit direction in the
/// Earth-fixed frame. Used to place orbit-plane intersections on the
/// ground.
pub fn direction_to_latlon(direction: &na::Vector3<f64>) -> (f64, f64) {
    let unit = direction.normalize();
    (unit.z.asin().to_degrees(), unit.y.atan2(unit.x).to_degrees())
}
