//! Sample point to place name resolution.

use rayon::prelude::*;

use crate::config::ResolverConfig;
use crate::polyline::Coordinate;
use crate::sampler::SamplePoint;
use crate::traits::ReverseGeocoder;

/// Display string used when no provider name is available: `(lat, lon)` to
/// four decimals.
pub fn format_coordinate(coordinate: Coordinate) -> String {
    format!("({:.4}, {:.4})", coordinate.lat, coordinate.lon)
}

/// Turns sample points into display names through a reverse geocoder.
///
/// A failed lookup never fails the batch: it degrades to
/// [`format_coordinate`] for that one point.
pub struct PlaceResolver<'a, G> {
    geocoder: &'a G,
    max_parallel_lookups: usize,
}

impl<'a, G> PlaceResolver<'a, G>
where
    G: ReverseGeocoder + Sync,
{
    pub fn new(geocoder: &'a G, config: &ResolverConfig) -> Self {
        Self {
            geocoder,
            max_parallel_lookups: config.max_parallel_lookups.max(1),
        }
    }

    pub fn resolve(&self, point: &SamplePoint) -> String {
        match self.geocoder.reverse_geocode(point.coordinate) {
            Ok(admin) => match admin.display_name() {
                Some(name) => name.to_string(),
                None => {
                    tracing::debug!(index = point.index, "no administrative name, using coordinates");
                    format_coordinate(point.coordinate)
                }
            },
            Err(err) => {
                tracing::warn!(
                    index = point.index,
                    lat = point.coordinate.lat,
                    lon = point.coordinate.lon,
                    error = %err,
                    "reverse geocoding failed, using coordinates"
                );
                format_coordinate(point.coordinate)
            }
        }
    }

    /// Resolves every point; the result is in the same order as `points`.
    pub fn resolve_all(&self, points: &[SamplePoint]) -> Vec<String> {
        if self.max_parallel_lookups == 1 || points.len() < 2 {
            return points.iter().map(|point| self.resolve(point)).collect();
        }

        let threads = self.max_parallel_lookups.min(points.len());
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            // indexed collect keeps sample order
            Ok(pool) => pool.install(|| points.par_iter().map(|point| self.resolve(point)).collect()),
            Err(err) => {
                tracing::warn!(error = %err, "could not start lookup pool, resolving sequentially");
                points.iter().map(|point| self.resolve(point)).collect()
            }
        }
    }
}
