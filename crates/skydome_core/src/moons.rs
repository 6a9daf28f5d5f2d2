//! Natural-satellite positions.
//!
//! Jupiter's Galilean moons are computed from their orbital periods and
//! J2000 mean longitudes in Jupiter's equatorial plane (IAU pole), then
//! rotated into the J2000 frame. Every other planet's moons use a
//! schematic table of nominal separations with evenly spaced orientation
//! angles: a recognizable configuration, NOT an ephemeris. Consumers must
//! present schematic moons as such; `MoonKind` carries the distinction.

use crate::coords::{Direction3, Equatorial, ARCSEC_PER_RAD};
use crate::kepler::solve_kepler;
use crate::planets::{body_ephemeris, Body};
use crate::time::SkyTime;
use std::f64::consts::PI;

/// Default camera field-of-view threshold below which moons are flagged
/// visible. A hint for the renderer, not a hard filter.
pub const MOON_LOD_FOV_DEG: f64 = 40.0;

/// How a moon's position was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoonKind {
    /// Propagated from orbital elements (Galilean moons)
    Orbital,
    /// Nominal separation at an evenly spaced angle; not a real position
    Schematic,
}

/// Computed sky position of one moon at one instant.
#[derive(Debug, Clone)]
pub struct MoonEphemeris {
    pub name: &'static str,
    pub parent: Body,
    pub kind: MoonKind,
    pub equatorial: Equatorial,
    pub magnitude: f64,
    /// Angular separation from the parent, arcseconds
    pub separation_arcsec: f64,
}

/// Whether moons should be shown for the given camera field of view.
pub fn lod_visible(camera_fov_deg: f64) -> bool {
    camera_fov_deg < MOON_LOD_FOV_DEG
}

/// Jupiter's north pole (IAU 2015): RA 268.057°, Dec 64.495°. Orients the
/// plane the Galilean moons orbit in.
const JUPITER_POLE: Equatorial = Equatorial {
    ra_hours: 268.057 / 15.0,
    dec_deg: 64.495,
};

/// Orthonormal basis of a planet's equatorial plane in the J2000 frame.
/// Galilean orbits are evaluated as angular offsets along these axes and
/// added to the parent's sky direction.
struct EquatorPlane {
    /// Toward the ascending node of the planet's equator on the J2000
    /// equator: 90 degrees of right ascension ahead of the pole, dec 0.
    node: Direction3,
    /// In-plane axis completing the right-handed (node, in_plane, pole)
    /// basis.
    in_plane: Direction3,
}

impl EquatorPlane {
    fn of(pole: Equatorial) -> Self {
        let pole_dir = Direction3::from_equatorial(pole);
        let node = Direction3::from_equatorial(Equatorial {
            ra_hours: (pole.ra_hours + 6.0).rem_euclid(24.0),
            dec_deg: 0.0,
        });
        Self {
            in_plane: pole_dir.cross(&node),
            node,
        }
    }

    /// Map an in-plane angular offset (radians along the node and
    /// in-plane axes) to a J2000 offset vector.
    fn offset(&self, along_node: f64, along_plane: f64) -> Direction3 {
        Direction3::new(
            along_node * self.node.x + along_plane * self.in_plane.x,
            along_node * self.node.y + along_plane * self.in_plane.y,
            along_node * self.node.z + along_plane * self.in_plane.z,
        )
    }
}

/// Orbital data for a Galilean moon.
struct GalileanMoon {
    name: &'static str,
    semi_major_axis_km: f64,
    orbital_period_days: f64,
    eccentricity: f64,
    mean_longitude_j2000_deg: f64,
    magnitude: f64,
}

const GALILEAN_MOONS: [GalileanMoon; 4] = [
    GalileanMoon {
        name: "Io",
        semi_major_axis_km: 421_700.0,
        orbital_period_days: 1.769137786,
        eccentricity: 0.0041,
        mean_longitude_j2000_deg: 200.39,
        magnitude: 5.0,
    },
    GalileanMoon {
        name: "Europa",
        semi_major_axis_km: 671_034.0,
        orbital_period_days: 3.551181041,
        eccentricity: 0.0094,
        mean_longitude_j2000_deg: 36.39,
        magnitude: 5.3,
    },
    GalileanMoon {
        name: "Ganymede",
        semi_major_axis_km: 1_070_412.0,
        orbital_period_days: 7.15455296,
        eccentricity: 0.0013,
        mean_longitude_j2000_deg: 180.57,
        magnitude: 4.6,
    },
    GalileanMoon {
        name: "Callisto",
        semi_major_axis_km: 1_882_709.0,
        orbital_period_days: 16.6890184,
        eccentricity: 0.0074,
        mean_longitude_j2000_deg: 180.16,
        magnitude: 5.7,
    },
];

/// Schematic moon entry: nominal separation and magnitude only. The
/// orientation angle is assigned evenly around the parent at runtime.
struct SchematicMoon {
    name: &'static str,
    parent: Body,
    separation_arcsec: f64,
    magnitude: f64,
}

#[rustfmt::skip]
const SCHEMATIC_MOONS: &[SchematicMoon] = &[
    SchematicMoon { name: "Phobos",    parent: Body::Mars,    separation_arcsec:  25.0, magnitude: 11.3 },
    SchematicMoon { name: "Deimos",    parent: Body::Mars,    separation_arcsec:  62.0, magnitude: 12.4 },
    SchematicMoon { name: "Titan",     parent: Body::Saturn,  separation_arcsec: 197.0, magnitude:  8.3 },
    SchematicMoon { name: "Rhea",      parent: Body::Saturn,  separation_arcsec:  77.0, magnitude:  9.7 },
    SchematicMoon { name: "Tethys",    parent: Body::Saturn,  separation_arcsec:  43.0, magnitude: 10.2 },
    SchematicMoon { name: "Dione",     parent: Body::Saturn,  separation_arcsec:  55.0, magnitude: 10.4 },
    SchematicMoon { name: "Enceladus", parent: Body::Saturn,  separation_arcsec:  33.0, magnitude: 11.7 },
    SchematicMoon { name: "Iapetus",   parent: Body::Saturn,  separation_arcsec: 515.0, magnitude: 11.0 },
    SchematicMoon { name: "Titania",   parent: Body::Uranus,  separation_arcsec:  33.0, magnitude: 13.9 },
    SchematicMoon { name: "Oberon",    parent: Body::Uranus,  separation_arcsec:  44.0, magnitude: 14.1 },
    SchematicMoon { name: "Ariel",     parent: Body::Uranus,  separation_arcsec:  19.0, magnitude: 14.3 },
    SchematicMoon { name: "Umbriel",   parent: Body::Uranus,  separation_arcsec:  27.0, magnitude: 15.0 },
    SchematicMoon { name: "Miranda",   parent: Body::Uranus,  separation_arcsec:  10.0, magnitude: 16.5 },
    SchematicMoon { name: "Triton",    parent: Body::Neptune, separation_arcsec:  15.0, magnitude: 13.5 },
    SchematicMoon { name: "Charon",    parent: Body::Pluto,   separation_arcsec:   0.9, magnitude: 16.8 },
];

/// Galilean moon positions from their in-plane Kepler motion.
fn galilean_ephemerides(time: &SkyTime, out: &mut Vec<MoonEphemeris>) {
    let jde = time.julian_date_tdb();
    let t = jde - 2451545.0;

    let jupiter = body_ephemeris(Body::Jupiter, time);
    let jupiter_dir = Direction3::from_equatorial(jupiter.equatorial);
    let jupiter_dist_km = jupiter.distance_km;
    let plane = EquatorPlane::of(JUPITER_POLE);

    for moon in &GALILEAN_MOONS {
        let n = 360.0 / moon.orbital_period_days;
        let m_deg = (moon.mean_longitude_j2000_deg + n * t).rem_euclid(360.0);
        let solution = solve_kepler(m_deg * PI / 180.0, moon.eccentricity);
        let big_e = solution.eccentric_anomaly_rad;

        let e = moon.eccentricity;
        let true_anomaly =
            2.0 * ((1.0 + e).sqrt() * (big_e / 2.0).tan()).atan2((1.0 - e).sqrt());
        let r_km = moon.semi_major_axis_km * (1.0 - e * big_e.cos());

        // In-plane position as an angular offset seen from Earth.
        let ang_x = r_km * true_anomaly.cos() / jupiter_dist_km;
        let ang_y = r_km * true_anomaly.sin() / jupiter_dist_km;

        let offset = plane.offset(ang_x, ang_y);
        let moon_dir = Direction3::new(
            jupiter_dir.x + offset.x,
            jupiter_dir.y + offset.y,
            jupiter_dir.z + offset.z,
        )
        .normalize();

        let separation_arcsec =
            (ang_x * ang_x + ang_y * ang_y).sqrt() * ARCSEC_PER_RAD;

        out.push(MoonEphemeris {
            name: moon.name,
            parent: Body::Jupiter,
            kind: MoonKind::Orbital,
            equatorial: moon_dir.to_equatorial(),
            magnitude: moon.magnitude,
            separation_arcsec,
        });
    }
}

/// Schematic moon positions: the nominal separation applied at an evenly
/// spaced angle per sibling, so each family fans out recognizably.
fn schematic_ephemerides(time: &SkyTime, out: &mut Vec<MoonEphemeris>) {
    let parents = [Body::Mars, Body::Saturn, Body::Uranus, Body::Neptune, Body::Pluto];

    for parent in parents {
        let siblings: Vec<&SchematicMoon> =
            SCHEMATIC_MOONS.iter().filter(|m| m.parent == parent).collect();
        if siblings.is_empty() {
            continue;
        }

        let parent_eq = body_ephemeris(parent, time).equatorial;
        let cos_dec = (parent_eq.dec_deg * PI / 180.0).cos().max(1e-6);
        let step = 360.0 / siblings.len() as f64;

        for (i, moon) in siblings.iter().enumerate() {
            let angle = (i as f64 * step).to_radians();
            let sep_deg = moon.separation_arcsec / 3600.0;

            let equatorial = Equatorial {
                ra_hours: (parent_eq.ra_hours + sep_deg * angle.cos() / cos_dec / 15.0)
                    .rem_euclid(24.0),
                dec_deg: (parent_eq.dec_deg + sep_deg * angle.sin()).clamp(-90.0, 90.0),
            };

            out.push(MoonEphemeris {
                name: moon.name,
                parent,
                kind: MoonKind::Schematic,
                equatorial,
                magnitude: moon.magnitude,
                separation_arcsec: moon.separation_arcsec,
            });
        }
    }
}

/// All modeled moons at the given instant.
pub fn all_moons(time: &SkyTime) -> Vec<MoonEphemeris> {
    let mut out = Vec::with_capacity(GALILEAN_MOONS.len() + SCHEMATIC_MOONS.len());
    galilean_ephemerides(time, &mut out);
    schematic_ephemerides(time, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Direction3;

    fn angular_separation_arcsec(a: Equatorial, b: Equatorial) -> f64 {
        let da = Direction3::from_equatorial(a);
        let db = Direction3::from_equatorial(b);
        da.dot(&db).clamp(-1.0, 1.0).acos() * ARCSEC_PER_RAD
    }

    #[test]
    fn test_moon_census() {
        let time = SkyTime::from_utc(2024, 1, 1, 0, 0, 0.0);
        let moons = all_moons(&time);
        assert_eq!(moons.len(), 4 + SCHEMATIC_MOONS.len());
        assert_eq!(moons.iter().filter(|m| m.kind == MoonKind::Orbital).count(), 4);
        assert!(moons.iter().all(|m| m.parent != Body::Sun && m.parent != Body::Moon));
    }

    #[test]
    fn test_galilean_separation_bounded() {
        let time = SkyTime::from_utc(2024, 1, 1, 0, 0, 0.0);
        let jupiter = body_ephemeris(Body::Jupiter, &time);

        for moon in all_moons(&time).iter().filter(|m| m.kind == MoonKind::Orbital) {
            let sep = angular_separation_arcsec(moon.equatorial, jupiter.equatorial);
            let elements = GALILEAN_MOONS.iter().find(|g| g.name == moon.name).unwrap();
            let max_arcsec =
                (elements.semi_major_axis_km / jupiter.distance_km).atan() * ARCSEC_PER_RAD;

            eprintln!("{}: {:.1}\" (max {:.1}\")", moon.name, sep, max_arcsec);
            assert!(
                sep <= max_arcsec * 1.2,
                "{} separation {sep}\" exceeds max {max_arcsec}\"",
                moon.name
            );
        }
    }

    #[test]
    fn test_io_moves_between_instants() {
        let t1 = SkyTime::from_utc(2024, 1, 1, 0, 0, 0.0);
        let t2 = SkyTime::from_utc(2024, 1, 1, 10, 0, 0.0);

        let io1 = all_moons(&t1).into_iter().find(|m| m.name == "Io").unwrap();
        let io2 = all_moons(&t2).into_iter().find(|m| m.name == "Io").unwrap();

        // Ten hours is almost a quarter of Io's orbit.
        let moved = angular_separation_arcsec(io1.equatorial, io2.equatorial);
        assert!(moved > 5.0, "Io moved only {moved}\" in 10 hours");
    }

    #[test]
    fn test_schematic_separations_match_table() {
        let time = SkyTime::from_utc(2024, 1, 1, 0, 0, 0.0);
        let moons = all_moons(&time);

        for entry in SCHEMATIC_MOONS {
            let moon = moons.iter().find(|m| m.name == entry.name).unwrap();
            assert_eq!(moon.kind, MoonKind::Schematic);

            let parent_eq = body_ephemeris(entry.parent, &time).equatorial;
            let sep = angular_separation_arcsec(moon.equatorial, parent_eq);
            assert!(
                (sep - entry.separation_arcsec).abs() < entry.separation_arcsec * 0.05 + 0.5,
                "{}: schematic separation {sep}\" vs nominal {}\"",
                entry.name,
                entry.separation_arcsec
            );
        }
    }

    #[test]
    fn test_schematic_siblings_fan_out() {
        // Saturn's six schematic moons must not stack on one azimuthal ray.
        let time = SkyTime::from_utc(2024, 1, 1, 0, 0, 0.0);
        let moons = all_moons(&time);
        let saturnian: Vec<_> = moons.iter().filter(|m| m.parent == Body::Saturn).collect();
        assert_eq!(saturnian.len(), 6);

        for a in 0..saturnian.len() {
            for b in a + 1..saturnian.len() {
                let sep = angular_separation_arcsec(
                    saturnian[a].equatorial,
                    saturnian[b].equatorial,
                );
                assert!(sep > 1.0, "{} and {} coincide", saturnian[a].name, saturnian[b].name);
            }
        }
    }

    #[test]
    fn test_lod_threshold() {
        assert!(lod_visible(10.0));
        assert!(lod_visible(39.9));
        assert!(!lod_visible(40.0));
        assert!(!lod_visible(60.0));
    }

    #[test]
    fn test_equator_plane_basis() {
        let plane = EquatorPlane::of(JUPITER_POLE);
        let pole = Direction3::from_equatorial(JUPITER_POLE);

        // The node lies in both equators: dec 0 and orthogonal to the pole.
        assert!(plane.node.z.abs() < 1e-12);
        assert!(plane.node.dot(&pole).abs() < 1e-9);

        // Orthonormal and right-handed: node x in_plane recovers the pole.
        assert!((plane.node.dot(&plane.node) - 1.0).abs() < 1e-9);
        assert!((plane.in_plane.dot(&plane.in_plane) - 1.0).abs() < 1e-9);
        assert!(plane.in_plane.dot(&plane.node).abs() < 1e-9);
        assert!(plane.in_plane.dot(&pole).abs() < 1e-9);
        let rebuilt = plane.node.cross(&plane.in_plane);
        assert!((rebuilt.x - pole.x).abs() < 1e-9);
        assert!((rebuilt.y - pole.y).abs() < 1e-9);
        assert!((rebuilt.z - pole.z).abs() < 1e-9);
    }

    #[test]
    fn test_equator_plane_offset_stays_in_plane() {
        // Any in-plane offset must have no component along the pole.
        let plane = EquatorPlane::of(JUPITER_POLE);
        let pole = Direction3::from_equatorial(JUPITER_POLE);
        for (a, b) in [(1.0, 0.0), (0.0, 1.0), (-0.3, 0.7), (0.5, 0.5)] {
            let offset = plane.offset(a, b);
            assert!(offset.dot(&pole).abs() < 1e-9, "offset ({a}, {b}) left the plane");
        }
        // And the node-aligned offset is the node itself.
        let along = plane.offset(1.0, 0.0);
        assert!((along.x - plane.node.x).abs() < 1e-12);
        assert!((along.y - plane.node.y).abs() < 1e-12);
        assert!((along.z - plane.node.z).abs() < 1e-12);
    }
}
