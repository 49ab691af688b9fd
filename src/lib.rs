//! route-places: agent tools for places along a driving route and city weather.
//!
//! The route pipeline decodes a provider polyline, measures it on the
//! ellipsoid, samples it at fixed intervals and names every sample.

pub mod config;
pub mod error;
pub mod geodesic;
pub mod ors;
pub mod polyline;
pub mod resolver;
pub mod route;
pub mod sampler;
pub mod tools;
pub mod traits;
pub mod weather;

pub use error::{Error, Result};
pub use polyline::Coordinate;
