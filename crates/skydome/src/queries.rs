//! Scene-level queries: visibility counts and the initial-view heuristic.

use skydome_core::planets::Body;

use crate::scene::{BodyDisplay, ProcessedStar, Scene};

/// Default view when nothing bright is up: due south, mid-sky.
const FALLBACK_VIEW: (f64, f64) = (180.0, 45.0);

/// Stars brighter than this steer the initial view.
const BRIGHT_STAR_LIMIT: f64 = 3.0;

/// Fixed weight for each Solar System body above the horizon.
const BODY_WEIGHT: f64 = 5.0;

/// Per-kind counts of visible objects in a scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibleCounts {
    pub stars: usize,
    pub bodies: usize,
    pub moons: usize,
    pub deep_sky: usize,
    pub constellations: usize,
    pub active_showers: usize,
    pub minor_bodies: usize,
    pub satellites: usize,
}

impl VisibleCounts {
    pub fn total(&self) -> usize {
        self.stars
            + self.bodies
            + self.moons
            + self.deep_sky
            + self.constellations
            + self.active_showers
            + self.minor_bodies
            + self.satellites
    }
}

pub fn visible_counts(scene: &Scene) -> VisibleCounts {
    VisibleCounts {
        stars: scene.stars.iter().filter(|s| s.is_visible).count(),
        bodies: scene
            .bodies
            .iter()
            .filter(|b| b.altaz.altitude_deg > 0.0)
            .count(),
        moons: scene.moons.iter().filter(|m| m.is_visible).count(),
        deep_sky: scene.deep_sky.iter().filter(|d| d.is_visible).count(),
        constellations: scene
            .constellations
            .iter()
            .filter(|c| c.is_visible)
            .count(),
        active_showers: scene
            .meteor_showers
            .iter()
            .filter(|s| s.is_active)
            .count(),
        minor_bodies: scene.minor_bodies.iter().filter(|m| m.is_visible).count(),
        satellites: scene.satellites.iter().filter(|s| s.is_visible).count(),
    }
}

/// Pick the (azimuth, altitude) a viewer should start looking at: the
/// brightness-weighted centroid of the bright visible stars, pulled toward
/// any Solar System bodies above the horizon.
///
/// Azimuth is cyclic, so the centroid is taken on the unit circle
/// (sin/cos components, recovered with atan2) rather than by averaging
/// raw degrees, which would point the wrong way across the 0/360 seam.
pub fn best_initial_view(stars: &[ProcessedStar], bodies: &[BodyDisplay]) -> (f64, f64) {
    let mut weight_sum = 0.0;
    let mut sin_sum = 0.0;
    let mut cos_sum = 0.0;
    let mut alt_sum = 0.0;

    for star in stars {
        if !star.is_visible || star.apparent_mag >= BRIGHT_STAR_LIMIT {
            continue;
        }
        let weight = 2.512_f64.powf(BRIGHT_STAR_LIMIT - star.apparent_mag);
        let az = star.altaz.azimuth_deg.to_radians();
        sin_sum += weight * az.sin();
        cos_sum += weight * az.cos();
        alt_sum += weight * star.altaz.altitude_deg;
        weight_sum += weight;
    }

    if weight_sum == 0.0 {
        return FALLBACK_VIEW;
    }

    for body in bodies {
        if body.body == Body::Sun || body.altaz.altitude_deg <= 0.0 {
            continue;
        }
        let az = body.altaz.azimuth_deg.to_radians();
        sin_sum += BODY_WEIGHT * az.sin();
        cos_sum += BODY_WEIGHT * az.cos();
        alt_sum += BODY_WEIGHT * body.altaz.altitude_deg;
        weight_sum += BODY_WEIGHT;
    }

    let azimuth = skydome_core::coords::normalize_degrees(sin_sum.atan2(cos_sum).to_degrees());
    let altitude = (alt_sum / weight_sum).clamp(20.0, 70.0);
    (azimuth, altitude)
}
