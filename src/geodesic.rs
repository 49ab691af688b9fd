//! Ellipsoidal distances along a route.
//!
//! Uses the Vincenty inverse formula on the WGS-84 ellipsoid. Vincenty does
//! not converge for nearly antipodal points; those pairs fall back to the
//! great-circle haversine distance, which is off by at most ~0.5% and never
//! occurs between consecutive vertices of a driving route.

use crate::polyline::Coordinate;

/// WGS-84 semi-major axis in meters.
const WGS84_A: f64 = 6_378_137.0;

/// WGS-84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// WGS-84 semi-minor axis in meters.
const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

/// Mean Earth radius in meters (IUGG), used by the haversine fallback.
const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE_THRESHOLD: f64 = 1e-12;

/// Geodesic distance between two points in meters.
pub fn distance_meters(from: Coordinate, to: Coordinate) -> f64 {
    vincenty_meters(from, to)
        .filter(|meters| meters.is_finite() && *meters >= 0.0)
        .unwrap_or_else(|| haversine_meters(from, to))
}

/// Cumulative distance in meters at every point of `points`.
///
/// The result is index-aligned with `points` and starts at 0. Fewer than two
/// points carry no distance information and produce an empty vector.
pub fn cumulative_distances(points: &[Coordinate]) -> Vec<f64> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut distances = Vec::with_capacity(points.len());
    distances.push(0.0);
    let mut total = 0.0;
    for pair in points.windows(2) {
        total += distance_meters(pair[0], pair[1]);
        distances.push(total);
    }

    distances
}

/// Vincenty inverse solution. `None` when the iteration does not converge.
pub fn vincenty_meters(from: Coordinate, to: Coordinate) -> Option<f64> {
    let l = (to.lon - from.lon).to_radians();
    let u1 = ((1.0 - WGS84_F) * from.lat.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * to.lat.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // coincident points
            return Some(0.0);
        }

        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
        // equatorial line: cos_sq_alpha == 0
        let cos_2sigma_m = if cos_sq_alpha != 0.0 {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
        } else {
            0.0
        };
        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));

        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))));

        if lambda.abs() > std::f64::consts::PI {
            return None;
        }
        if (lambda - previous).abs() < CONVERGENCE_THRESHOLD {
            let u_sq = cos_sq_alpha * (WGS84_A.powi(2) - WGS84_B.powi(2)) / WGS84_B.powi(2);
            let a = 1.0
                + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = b
                * sin_sigma
                * (cos_2sigma_m
                    + b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m.powi(2))
                            - b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma.powi(2))
                                * (-3.0 + 4.0 * cos_2sigma_m.powi(2))));

            return Some(WGS84_B * a * (sigma - delta_sigma));
        }
    }

    None
}

/// Great-circle distance on a sphere of the mean Earth radius.
pub fn haversine_meters(from: Coordinate, to: Coordinate) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    MEAN_EARTH_RADIUS_M * c
}
