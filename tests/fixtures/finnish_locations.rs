//! Real Finnish towns for realistic test fixtures.
//!
//! Coordinates are town centres taken from OpenStreetMap, rounded to four
//! decimals.

use route_places::Coordinate;

/// A named location with coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lon: f64) -> Self {
        Self { name, lat, lon }
    }

    pub fn coords(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

pub const HELSINKI: Location = Location::new("Helsinki", 60.1699, 24.9384);
pub const LOHJA: Location = Location::new("Lohja", 60.2486, 24.0653);
pub const SALO: Location = Location::new("Salo", 60.3838, 23.1250);
pub const TURKU: Location = Location::new("Turku", 60.4518, 22.2666);
pub const TAMPERE: Location = Location::new("Tampere", 61.4985, 23.7732);
pub const JYVASKYLA: Location = Location::new("Jyväskylä", 62.2426, 25.7473);
pub const OULU: Location = Location::new("Oulu", 65.0121, 25.4651);
pub const KEMI: Location = Location::new("Kemi", 65.7364, 24.5637);
pub const ROVANIEMI: Location = Location::new("Rovaniemi", 66.4990, 25.7129);

/// Every fixture town, used by the fake reverse geocoder.
pub const TOWNS: &[Location] = &[
    HELSINKI, LOHJA, SALO, TURKU, TAMPERE, JYVASKYLA, OULU, KEMI, ROVANIEMI,
];

/// E18 westwards from Helsinki, as waypoints.
pub const HELSINKI_TURKU: &[Location] = &[HELSINKI, LOHJA, SALO, TURKU];

/// Tampere to Rovaniemi through the Finnish interior and up the coast.
pub const TAMPERE_ROVANIEMI: &[Location] = &[TAMPERE, JYVASKYLA, OULU, KEMI, ROVANIEMI];

pub fn find(name: &str) -> Option<Location> {
    TOWNS.iter().copied().find(|town| town.name.eq_ignore_ascii_case(name))
}
