//! Keplerian propagation for minor bodies.
//!
//! Heliocentric elliptical orbits (e < 1) from JPL-style elements: mean
//! anomaly propagated from epoch, Kepler's equation solved for eccentric
//! anomaly, then rotated from the orbital plane to the J2000 ecliptic.
//! Positions are geocentric-approximate: callers needing the view from
//! Earth subtract the Earth vector, as `geocentric_state` does.

use crate::coords::{ecliptic_to_equatorial, Equatorial, ScenePosition, OBLIQUITY_J2000};
use crate::planets::{heliocentric_position, Planet};
use serde::Deserialize;
use std::f64::consts::PI;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinorBodyError {
    #[error("minor-body feed is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("minor-body feed contained no usable records")]
    Empty,
}

/// Scene units per AU for the orrery-style minor-body positions.
pub const AU_SCENE_SCALE: f64 = 2.5;

/// Convergence tolerance for the eccentric anomaly, radians.
const KEPLER_TOLERANCE: f64 = 1e-8;

/// Iteration cap; the last iterate is returned unconverged past this.
const KEPLER_MAX_ITERATIONS: usize = 10;

/// Eccentricity threshold below which plain fixed-point iteration is used.
const FIXED_POINT_MAX_E: f64 = 0.2;

/// Heliocentric Keplerian orbital elements. Angles in degrees, distances in
/// AU, mean motion in degrees per day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    pub semi_major_axis_au: f64,
    /// e in [0, 1) for the bodies in scope
    pub eccentricity: f64,
    pub inclination_deg: f64,
    /// Longitude of ascending node (Ω)
    pub ascending_node_deg: f64,
    /// Argument of perihelion (ω)
    pub arg_perihelion_deg: f64,
    /// Mean anomaly at epoch (M₀)
    pub mean_anomaly_deg: f64,
    /// Epoch of the elements, Julian Date (TDB)
    pub epoch_jd: f64,
    /// Mean motion (n)
    pub mean_motion_deg_per_day: f64,
}

/// A named minor body: elements plus the photometric absolute magnitude H.
#[derive(Debug, Clone, PartialEq)]
pub struct MinorBody {
    pub name: String,
    pub elements: OrbitalElements,
    pub abs_magnitude: f64,
}

/// Pluto, J2000 elements (JPL). Served through this module because VSOP87
/// carries no Pluto theory.
pub const PLUTO: OrbitalElements = OrbitalElements {
    semi_major_axis_au: 39.48211675,
    eccentricity: 0.2488273,
    inclination_deg: 17.14175,
    ascending_node_deg: 110.30347,
    arg_perihelion_deg: 113.76329,
    mean_anomaly_deg: 14.86205,
    epoch_jd: 2451545.0,
    mean_motion_deg_per_day: 0.0039753,
};

/// The bundled minor-body table (JPL elements, epoch J2000).
pub fn bundled() -> Vec<MinorBody> {
    // Format: (name, a, e, i, Ω, ω, M₀, n, H)
    #[rustfmt::skip]
    let table: &[(&str, f64, f64, f64, f64, f64, f64, f64, f64)] = &[
        ("1 Ceres",  2.7660, 0.0758, 10.594,  80.306,  73.597,  95.989, 0.21408, 3.34),
        ("2 Pallas", 2.7724, 0.2305, 34.837, 173.096, 310.049,  59.699, 0.21355, 4.13),
        ("3 Juno",   2.6682, 0.2562, 12.989, 169.853, 248.139,  33.077, 0.22612, 5.33),
        ("4 Vesta",  2.3615, 0.0887,  7.140, 103.810, 151.198, 205.652, 0.27154, 3.20),
    ];

    table
        .iter()
        .map(|&(name, a, e, i, node, peri, m0, n, h)| MinorBody {
            name: name.to_string(),
            elements: OrbitalElements {
                semi_major_axis_au: a,
                eccentricity: e,
                inclination_deg: i,
                ascending_node_deg: node,
                arg_perihelion_deg: peri,
                mean_anomaly_deg: m0,
                epoch_jd: 2451545.0,
                mean_motion_deg_per_day: n,
            },
            abs_magnitude: h,
        })
        .collect()
}

/// JSON feed record for one minor body: JPL-style elements in degrees/AU.
#[derive(Debug, Deserialize)]
struct FeedRecord {
    name: String,
    a: f64,
    e: f64,
    i: f64,
    om: f64,
    w: f64,
    ma: f64,
    #[serde(default = "default_epoch_jd")]
    epoch_jd: f64,
    n: f64,
    #[serde(default = "default_abs_magnitude")]
    h: f64,
}

fn default_epoch_jd() -> f64 {
    2451545.0
}

fn default_abs_magnitude() -> f64 {
    10.0
}

/// Parse a JSON array of minor-body elements. Records with eccentricity
/// outside [0, 1) are skipped; only the bound-orbit propagator lives here.
pub fn from_json<R: io::Read>(reader: R) -> Result<(Vec<MinorBody>, usize), MinorBodyError> {
    let records: Vec<FeedRecord> = serde_json::from_reader(reader)?;
    let mut skipped = 0;

    let bodies: Vec<MinorBody> = records
        .into_iter()
        .filter_map(|r| {
            if !(0.0..1.0).contains(&r.e) || r.a <= 0.0 || r.n <= 0.0 {
                skipped += 1;
                return None;
            }
            Some(MinorBody {
                name: r.name,
                elements: OrbitalElements {
                    semi_major_axis_au: r.a,
                    eccentricity: r.e,
                    inclination_deg: r.i,
                    ascending_node_deg: r.om,
                    arg_perihelion_deg: r.w,
                    mean_anomaly_deg: r.ma,
                    epoch_jd: r.epoch_jd,
                    mean_motion_deg_per_day: r.n,
                },
                abs_magnitude: r.h,
            })
        })
        .collect();

    if bodies.is_empty() {
        return Err(MinorBodyError::Empty);
    }
    Ok((bodies, skipped))
}

/// Result of solving Kepler's equation.
#[derive(Debug, Clone, Copy)]
pub struct KeplerSolution {
    /// Eccentric anomaly in radians (the last iterate when unconverged)
    pub eccentric_anomaly_rad: f64,
    pub converged: bool,
}

/// Solve M = E - e·sin E for E.
///
/// Fixed-point iteration for small eccentricities, Newton's method
/// otherwise. Stops at |ΔE| < 1e-8 rad or 10 iterations, whichever first.
pub fn solve_kepler(mean_anomaly_rad: f64, eccentricity: f64) -> KeplerSolution {
    let m = mean_anomaly_rad.rem_euclid(2.0 * PI);
    let mut e_anom = m;
    let mut converged = false;

    if eccentricity < FIXED_POINT_MAX_E {
        for _ in 0..KEPLER_MAX_ITERATIONS {
            let next = m + eccentricity * e_anom.sin();
            let delta = next - e_anom;
            e_anom = next;
            if delta.abs() < KEPLER_TOLERANCE {
                converged = true;
                break;
            }
        }
    } else {
        for _ in 0..KEPLER_MAX_ITERATIONS {
            let delta = (e_anom - eccentricity * e_anom.sin() - m)
                / (1.0 - eccentricity * e_anom.cos());
            e_anom -= delta;
            if delta.abs() < KEPLER_TOLERANCE {
                converged = true;
                break;
            }
        }
    }

    KeplerSolution {
        eccentric_anomaly_rad: e_anom,
        converged,
    }
}

/// Heliocentric position in the J2000 ecliptic frame, AU.
#[derive(Debug, Clone, Copy)]
pub struct HeliocentricState {
    pub x_au: f64,
    pub y_au: f64,
    pub z_au: f64,
    pub converged: bool,
}

impl HeliocentricState {
    pub fn distance_au(&self) -> f64 {
        (self.x_au * self.x_au + self.y_au * self.y_au + self.z_au * self.z_au).sqrt()
    }

    /// Map to the orrery scene frame: scene x = ecliptic X, scene y =
    /// ecliptic Z (up), scene z = -ecliptic Y, scaled by AU_SCENE_SCALE.
    pub fn scene_position(&self) -> ScenePosition {
        ScenePosition::new(
            self.x_au * AU_SCENE_SCALE,
            self.z_au * AU_SCENE_SCALE,
            -self.y_au * AU_SCENE_SCALE,
        )
    }
}

/// Propagate elements to the given Julian Date.
pub fn heliocentric_state(elements: &OrbitalElements, jd: f64) -> HeliocentricState {
    let dt_days = jd - elements.epoch_jd;
    let mean_anomaly_deg =
        (elements.mean_anomaly_deg + elements.mean_motion_deg_per_day * dt_days).rem_euclid(360.0);
    let m = mean_anomaly_deg * PI / 180.0;

    let e = elements.eccentricity;
    let solution = solve_kepler(m, e);
    let big_e = solution.eccentric_anomaly_rad;

    // Position in the orbital plane.
    let a = elements.semi_major_axis_au;
    let x_orb = a * (big_e.cos() - e);
    let y_orb = a * (1.0 - e * e).sqrt() * big_e.sin();

    let true_anomaly = y_orb.atan2(x_orb);
    let r = (x_orb * x_orb + y_orb * y_orb).sqrt();

    // Argument of latitude.
    let u = elements.arg_perihelion_deg * PI / 180.0 + true_anomaly;
    let node = elements.ascending_node_deg * PI / 180.0;
    let incl = elements.inclination_deg * PI / 180.0;

    let (sin_u, cos_u) = u.sin_cos();
    let (sin_node, cos_node) = node.sin_cos();
    let cos_i = incl.cos();

    HeliocentricState {
        x_au: r * (cos_node * cos_u - sin_node * sin_u * cos_i),
        y_au: r * (sin_node * cos_u + cos_node * sin_u * cos_i),
        z_au: r * sin_u * incl.sin(),
        converged: solution.converged,
    }
}

/// Geocentric view of a propagated body.
#[derive(Debug, Clone, Copy)]
pub struct GeocentricState {
    pub equatorial: Equatorial,
    /// Distance from Earth in AU
    pub distance_au: f64,
    /// Distance from the Sun in AU
    pub helio_distance_au: f64,
    pub converged: bool,
}

/// Propagate and subtract the Earth's heliocentric vector to get the
/// apparent geocentric position.
pub fn geocentric_state(elements: &OrbitalElements, jde: f64) -> GeocentricState {
    let helio = heliocentric_state(elements, jde);
    let (ex, ey, ez) = heliocentric_position(Planet::Earth, jde);

    let gx = helio.x_au - ex;
    let gy = helio.y_au - ey;
    let gz = helio.z_au - ez;
    let distance_au = (gx * gx + gy * gy + gz * gz).sqrt();

    let lon = gy.atan2(gx);
    let lat = (gz / distance_au).asin();
    let equatorial = ecliptic_to_equatorial(lon, lat, OBLIQUITY_J2000)
        .normalize()
        .to_equatorial();

    GeocentricState {
        equatorial,
        distance_au,
        helio_distance_au: helio.distance_au(),
        converged: helio.converged,
    }
}

/// Apparent magnitude from the H, 5·log10(r·Δ) distance law.
pub fn apparent_magnitude(abs_magnitude: f64, helio_au: f64, geo_au: f64) -> f64 {
    abs_magnitude + 5.0 * (helio_au * geo_au).log10()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_orbit_identity() {
        // e = 0: E equals M exactly, first iteration.
        let sol = solve_kepler(1.0, 0.0);
        assert!(sol.converged);
        assert!((sol.eccentric_anomaly_rad - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_solver_satisfies_equation() {
        for &(m, e) in &[
            (0.3, 0.05),
            (2.5, 0.15),
            (1.0, 0.25),
            (4.7, 0.6),
            (0.1, 0.95),
        ] {
            let sol = solve_kepler(m, e);
            let residual = sol.eccentric_anomaly_rad - e * sol.eccentric_anomaly_rad.sin()
                - m.rem_euclid(2.0 * PI);
            assert!(
                residual.abs() < 1e-7,
                "M={m}, e={e}: residual {residual}, converged={}",
                sol.converged
            );
        }
    }

    #[test]
    fn test_ceres_heliocentric_distance() {
        // Ten years past J2000 Ceres must sit between perihelion and
        // aphelion for a = 2.77, e = 0.076.
        let ceres = &bundled()[0];
        let jd = 2451545.0 + 10.0 * 365.25;
        let state = heliocentric_state(&ceres.elements, jd);
        assert!(state.converged);

        let r = state.distance_au();
        assert!(
            (2.55..=2.98).contains(&r),
            "Ceres heliocentric distance {r} AU outside perihelion/aphelion bounds"
        );
    }

    #[test]
    fn test_perihelion_distance_at_zero_anomaly() {
        // M = 0 at epoch means perihelion: r = a(1 - e).
        let elements = OrbitalElements {
            semi_major_axis_au: 2.0,
            eccentricity: 0.1,
            inclination_deg: 5.0,
            ascending_node_deg: 30.0,
            arg_perihelion_deg: 60.0,
            mean_anomaly_deg: 0.0,
            epoch_jd: 2451545.0,
            mean_motion_deg_per_day: 0.3,
        };
        let state = heliocentric_state(&elements, 2451545.0);
        assert!((state.distance_au() - 2.0 * 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_scene_mapping_axis_swap() {
        let state = HeliocentricState {
            x_au: 1.0,
            y_au: 2.0,
            z_au: 3.0,
            converged: true,
        };
        let pos = state.scene_position();
        assert_eq!(pos.x, 1.0 * AU_SCENE_SCALE);
        assert_eq!(pos.y, 3.0 * AU_SCENE_SCALE);
        assert_eq!(pos.z, -2.0 * AU_SCENE_SCALE);
    }

    #[test]
    fn test_pluto_distance_range() {
        // Pluto stays within its perihelion/aphelion band.
        for years in [0.0, 6.0, 12.0, 24.0] {
            let state = heliocentric_state(&PLUTO, 2451545.0 + years * 365.25);
            let r = state.distance_au();
            assert!(
                (29.5..=49.5).contains(&r),
                "Pluto at {r} AU after {years} years"
            );
        }
    }

    #[test]
    fn test_geocentric_subtraction() {
        // A minor body is closer to Earth than to the Sun near opposition
        // and farther near conjunction; either way the difference from the
        // heliocentric distance is bounded by Earth's 1 AU orbit.
        let vesta = &bundled()[3];
        let state = geocentric_state(&vesta.elements, 2460310.5);
        assert!(state.converged);
        assert!((state.helio_distance_au - state.distance_au).abs() <= 1.02);
        assert!(state.equatorial.ra_hours >= 0.0 && state.equatorial.ra_hours < 24.0);
        assert!(state.equatorial.dec_deg.abs() <= 90.0);
    }

    #[test]
    fn test_apparent_magnitude_distance_law() {
        // Ceres near opposition is ~7th magnitude.
        let mag = apparent_magnitude(3.34, 2.77, 1.8);
        assert!((6.5..=8.5).contains(&mag), "Ceres magnitude {mag}");
    }

    #[test]
    fn test_feed_parse_skips_unbound_orbits() {
        let feed = r#"[
            {"name": "1 Ceres", "a": 2.766, "e": 0.0758, "i": 10.59, "om": 80.3, "w": 73.6, "ma": 95.99, "n": 0.21408, "h": 3.34},
            {"name": "Oumuamua", "a": -1.27, "e": 1.2, "i": 122.7, "om": 24.6, "w": 241.8, "ma": 51.1, "n": 0.69}
        ]"#;
        let (bodies, skipped) = from_json(feed.as_bytes()).unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(skipped, 1);
        assert_eq!(bodies[0].name, "1 Ceres");
        assert_eq!(bodies[0].elements.epoch_jd, 2451545.0, "epoch defaults to J2000");
    }

    #[test]
    fn test_minor_body_moves() {
        let ceres = &bundled()[0];
        let a = heliocentric_state(&ceres.elements, 2451545.0);
        let b = heliocentric_state(&ceres.elements, 2451545.0 + 100.0);
        let moved = ((a.x_au - b.x_au).powi(2)
            + (a.y_au - b.y_au).powi(2)
            + (a.z_au - b.z_au).powi(2))
        .sqrt();
        // ~100 days of a 4.6-year orbit sweeps a sizeable arc.
        assert!(moved > 0.5, "Ceres moved only {moved} AU in 100 days");
    }
}
