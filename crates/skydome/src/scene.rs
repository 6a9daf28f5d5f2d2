//! Scene data model.
//!
//! A `Scene` is the per-instant, per-observer value the renderer consumes:
//! every catalogued object with validated scene-sphere coordinates. Scenes
//! are plain values; once built they are independent of the engine.
//!
//! The INVARIANT downstream code relies on: every `ScenePosition` in a
//! scene has finite components. Objects that fail to compute are either
//! dropped (stars, deep-sky) or emitted at the nadir sentinel with
//! `is_visible = false` (Solar System bodies, satellites).

use skydome_core::coords::cartesian_to_horizontal;
use skydome_core::deep_sky::DeepSkyKind;
use skydome_core::moons::MoonKind;
use skydome_core::planets::Body;
use skydome_core::{GeoLocation, Horizontal, ScenePosition, SkyTime};

/// Options controlling scene construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    /// 0 = dark sky, 1 = city; scales the magnitude limits
    pub light_pollution: f64,
    pub include_minor_bodies: bool,
    pub include_satellites: bool,
    /// Camera field of view, drives the moon level-of-detail hint
    pub camera_fov_deg: f64,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            light_pollution: 0.0,
            include_minor_bodies: true,
            include_satellites: true,
            camera_fov_deg: 60.0,
        }
    }
}

/// A star with per-instant display attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedStar {
    pub id: u32,
    pub name: String,
    pub apparent_mag: f64,
    pub spectral_class: String,
    pub altaz: Horizontal,
    pub position: ScenePosition,
    pub is_visible: bool,
    /// Display color hex by spectral class
    pub color: &'static str,
    pub size: f64,
    pub opacity: f64,
}

/// A Solar System body. Always reported visible so a selected body can be
/// navigated to; the renderer decides styling below the horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDisplay {
    pub body: Body,
    pub name: &'static str,
    pub altaz: Horizontal,
    pub position: ScenePosition,
    pub is_visible: bool,
    pub magnitude: Option<f64>,
    /// Lunar phase [0, 360), Moon only: 0 new, 180 full
    pub phase_deg: Option<f64>,
    pub distance_km: f64,
    pub angular_diameter_rad: f64,
}

/// A natural satellite, drawn just inside the sky sphere in front of its
/// parent. `parent_index` points into `Scene.bodies`.
#[derive(Debug, Clone, PartialEq)]
pub struct MoonDisplay {
    pub name: &'static str,
    pub parent_index: usize,
    pub kind: MoonKind,
    pub altaz: Horizontal,
    pub position: ScenePosition,
    pub is_visible: bool,
    pub magnitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeepSkyDisplay {
    pub id: u32,
    pub name: String,
    pub kind: DeepSkyKind,
    pub altaz: Horizontal,
    pub position: ScenePosition,
    pub is_visible: bool,
    pub magnitude: f64,
    pub size_arcmin: f64,
    pub constellation: String,
    pub description: String,
}

/// A constellation stick figure with resolved line segments. Segments
/// whose endpoint stars are missing from the catalog are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstellationDisplay {
    pub name: &'static str,
    pub abbreviation: &'static str,
    pub segments: Vec<(ScenePosition, ScenePosition)>,
    pub label_position: ScenePosition,
    pub is_visible: bool,
}

/// A meteor-shower radiant.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowerDisplay {
    pub id: u32,
    pub name: &'static str,
    pub altaz: Horizontal,
    pub position: ScenePosition,
    pub is_active: bool,
    pub is_visible: bool,
    pub zhr: u32,
    pub speed_km_s: f64,
    pub parent_body: &'static str,
}

/// A minor body. `position` is the orrery-frame heliocentric mapping;
/// `altaz` is the geocentric sky direction.
#[derive(Debug, Clone, PartialEq)]
pub struct MinorBodyDisplay {
    pub name: String,
    pub altaz: Horizontal,
    pub position: ScenePosition,
    pub is_visible: bool,
    pub magnitude: f64,
    pub helio_distance_au: f64,
    pub geo_distance_au: f64,
}

/// An artificial satellite on the inner (radius 90) sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct SatelliteDisplay {
    pub name: String,
    pub norad_id: u64,
    pub altaz: Horizontal,
    pub position: ScenePosition,
    pub is_visible: bool,
    pub range_km: f64,
}

/// Per-scene diagnostics: inputs, outputs, and drops by reason. Per-entry
/// failures never fail the scene; they land here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneHealth {
    pub stars_in: usize,
    pub stars_out: usize,
    pub stars_filtered: usize,
    pub stars_nonfinite: usize,
    pub deep_sky_filtered: usize,
    pub deep_sky_nonfinite: usize,
    pub segments_dropped: usize,
    pub kepler_nonconverged: usize,
    pub satellites_dead: usize,
}

/// The per-instant scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub instant: SkyTime,
    pub observer: GeoLocation,
    pub lst_hours: f64,
    pub stars: Vec<ProcessedStar>,
    pub bodies: Vec<BodyDisplay>,
    pub moons: Vec<MoonDisplay>,
    pub constellations: Vec<ConstellationDisplay>,
    pub deep_sky: Vec<DeepSkyDisplay>,
    pub meteor_showers: Vec<ShowerDisplay>,
    pub minor_bodies: Vec<MinorBodyDisplay>,
    pub satellites: Vec<SatelliteDisplay>,
    pub health: SceneHealth,
}

/// The common positional capability every scene object exposes. Generic
/// consumers (search, view queries) program against this; branching
/// consumers match on `SkyObject`.
pub trait Positioned {
    fn altaz(&self) -> Horizontal;
    fn position(&self) -> ScenePosition;
    fn is_visible(&self) -> bool;
}

macro_rules! impl_positioned {
    ($($ty:ty),+) => {
        $(impl Positioned for $ty {
            fn altaz(&self) -> Horizontal {
                self.altaz
            }
            fn position(&self) -> ScenePosition {
                self.position
            }
            fn is_visible(&self) -> bool {
                self.is_visible
            }
        })+
    };
}

impl_positioned!(
    ProcessedStar,
    BodyDisplay,
    MoonDisplay,
    DeepSkyDisplay,
    ShowerDisplay,
    MinorBodyDisplay,
    SatelliteDisplay
);

impl Positioned for ConstellationDisplay {
    fn altaz(&self) -> Horizontal {
        cartesian_to_horizontal(self.label_position)
    }
    fn position(&self) -> ScenePosition {
        self.label_position
    }
    fn is_visible(&self) -> bool {
        self.is_visible
    }
}

/// Tagged view over every object kind in a scene.
#[derive(Debug, Clone, Copy)]
pub enum SkyObject<'a> {
    Star(&'a ProcessedStar),
    Body(&'a BodyDisplay),
    Moon(&'a MoonDisplay),
    DeepSky(&'a DeepSkyDisplay),
    Meteor(&'a ShowerDisplay),
    MinorBody(&'a MinorBodyDisplay),
    Satellite(&'a SatelliteDisplay),
    Constellation(&'a ConstellationDisplay),
}

impl<'a> SkyObject<'a> {
    pub fn as_positioned(&self) -> &dyn Positioned {
        match self {
            SkyObject::Star(o) => *o,
            SkyObject::Body(o) => *o,
            SkyObject::Moon(o) => *o,
            SkyObject::DeepSky(o) => *o,
            SkyObject::Meteor(o) => *o,
            SkyObject::MinorBody(o) => *o,
            SkyObject::Satellite(o) => *o,
            SkyObject::Constellation(o) => *o,
        }
    }
}

impl Scene {
    /// Iterate every object in the scene as a tagged value.
    pub fn objects(&self) -> impl Iterator<Item = SkyObject<'_>> {
        self.stars
            .iter()
            .map(SkyObject::Star)
            .chain(self.bodies.iter().map(SkyObject::Body))
            .chain(self.moons.iter().map(SkyObject::Moon))
            .chain(self.deep_sky.iter().map(SkyObject::DeepSky))
            .chain(self.meteor_showers.iter().map(SkyObject::Meteor))
            .chain(self.minor_bodies.iter().map(SkyObject::MinorBody))
            .chain(self.satellites.iter().map(SkyObject::Satellite))
            .chain(self.constellations.iter().map(SkyObject::Constellation))
    }

    /// Case-insensitive lookup across every named object kind.
    pub fn find_by_name(&self, name: &str) -> Option<SkyObject<'_>> {
        let needle = name.trim().to_lowercase();
        self.objects().find(|obj| {
            let candidate = match obj {
                SkyObject::Star(o) => o.name.as_str(),
                SkyObject::Body(o) => o.name,
                SkyObject::Moon(o) => o.name,
                SkyObject::DeepSky(o) => o.name.as_str(),
                SkyObject::Meteor(o) => o.name,
                SkyObject::MinorBody(o) => o.name.as_str(),
                SkyObject::Satellite(o) => o.name.as_str(),
                SkyObject::Constellation(o) => o.name,
            };
            candidate.to_lowercase() == needle
        })
    }
}
