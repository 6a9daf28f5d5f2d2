pub mod catalog;
pub mod constellations;
pub mod coords;
pub mod deep_sky;
pub mod events;
pub mod kepler;
pub mod moons;
pub mod planets;
pub mod satellites;
pub mod showers;
pub mod time;

pub use catalog::{CatalogError, IngestStats, StarCatalog, StarRecord};
pub use constellations::{ConstellationFigure, FIGURES};
pub use coords::{
    cartesian_to_horizontal, equatorial_to_horizontal, horizontal_to_cartesian,
    horizontal_to_equatorial, Direction3, Equatorial, GeoLocation, Horizontal, ScenePosition,
    MOON_SPHERE_FACTOR, SATELLITE_RADIUS, SKY_RADIUS,
};
pub use deep_sky::{DeepSkyEntry, DeepSkyError, DeepSkyKind, DeepSkyStats};
pub use events::{upcoming_events, AstroEvent, EventKind};
pub use kepler::{MinorBody, MinorBodyError, OrbitalElements};
pub use moons::{all_moons, lod_visible, MoonEphemeris, MoonKind, MOON_LOD_FOV_DEG};
pub use planets::{all_bodies, body_ephemeris, moon_phase_deg, Body, BodyEphemeris};
pub use satellites::{
    parse_tle_text, SatState, SatTopocentric, Satellite, SatelliteError, Tle,
};
pub use showers::{active_showers, MeteorShower, SHOWERS};
pub use time::{gmst_hours, julian_date, lst_hours, SkyTime};
