//! Fixed-interval sampling along a route.
//!
//! Picks, for every multiple of the interval strictly inside the route, the
//! route vertex whose cumulative distance is closest to it. Vertices are not
//! interpolated; a sample sits on a real vertex of the geometry, which is all
//! a reverse geocoder needs.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::polyline::Coordinate;

/// A route vertex chosen for one interval target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SamplePoint {
    /// Index of the vertex in the route geometry.
    pub index: usize,
    pub coordinate: Coordinate,
    /// Cumulative distance from the route start at this vertex, in meters.
    pub distance_m: f64,
}

/// Samples `points` every `interval_m` meters.
///
/// `distances` must be the cumulative distances of `points` (see
/// [`crate::geodesic::cumulative_distances`]). Targets are `k * interval_m`
/// for `k = 1, 2, ...` while the target is strictly below the route total,
/// so neither the start nor the end of the route is ever sampled and a route
/// no longer than one interval yields nothing.
pub fn sample_at_intervals(
    points: &[Coordinate],
    distances: &[f64],
    interval_m: f64,
) -> Result<Vec<SamplePoint>> {
    if !interval_m.is_finite() || interval_m <= 0.0 {
        return Err(Error::input(format!(
            "sampling interval must be a positive number of meters, got {}",
            interval_m
        )));
    }
    if points.len() != distances.len() {
        return Err(Error::input(format!(
            "{} route points but {} cumulative distances",
            points.len(),
            distances.len()
        )));
    }

    let Some(&total) = distances.last() else {
        return Ok(Vec::new());
    };

    let mut samples = Vec::new();
    let mut step: u64 = 1;
    let mut target = interval_m;
    while target < total {
        if let Some(index) = nearest_index(distances, target) {
            samples.push(SamplePoint {
                index,
                coordinate: points[index],
                distance_m: distances[index],
            });
        }
        step += 1;
        target = interval_m * step as f64;
    }

    tracing::debug!(
        total_m = total,
        interval_m,
        samples = samples.len(),
        "sampled route"
    );

    Ok(samples)
}

/// Index of the distance closest to `target`. Ties go to the earliest index.
pub fn nearest_index(distances: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, distance) in distances.iter().enumerate() {
        let delta = (distance - target).abs();
        match best {
            Some((_, best_delta)) if delta >= best_delta => {}
            _ => best = Some((index, delta)),
        }
    }
    best.map(|(index, _)| index)
}
