//! The per-instant scene pipeline.
//!
//! One LST per scene, then every catalog entry is projected into the
//! observer frame and validated. Individual failures are silent drops
//! counted in `SceneHealth`; nothing here fails the scene.

use std::collections::HashMap;

use log::debug;
use skydome_core::coords::{
    equatorial_to_horizontal, horizontal_to_cartesian, ScenePosition, MOON_SPHERE_FACTOR,
    SATELLITE_RADIUS, SKY_RADIUS,
};
use skydome_core::kepler;
use skydome_core::moons;
use skydome_core::planets;
use skydome_core::satellites::Satellite;
use skydome_core::showers::SHOWERS;
use skydome_core::time::{gmst_hours, lst_hours};
use skydome_core::{constellations, GeoLocation, Horizontal, SkyTime};

use crate::fetch::Catalogs;
use crate::scene::{
    BodyDisplay, ConstellationDisplay, DeepSkyDisplay, MinorBodyDisplay, MoonDisplay,
    ProcessedStar, SatelliteDisplay, Scene, SceneHealth, SceneOptions, ShowerDisplay,
};

/// Magnitude range the size/opacity ramps span: Sirius-bright to the
/// naked-eye limit.
const MAG_BRIGHT: f64 = -1.5;
const MAG_SPAN: f64 = 6.5;

/// Display color by spectral class (first letter), O through M plus the
/// cool dwarf and carbon classes.
pub fn spectral_to_color(spectral_class: &str) -> &'static str {
    match spectral_class.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('O') => "#9db4ff",
        Some('B') => "#aabfff",
        Some('A') => "#cad8ff",
        Some('F') => "#f8f7ff",
        Some('G') => "#fff4ea",
        Some('K') => "#ffd2a1",
        Some('M') => "#ffcc6f",
        Some('L') => "#ff9d70",
        Some('T') => "#ff7d59",
        Some('C') => "#ff5f52",
        Some('S') => "#ffb37f",
        _ => "#fff4ea",
    }
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

fn mag_ramp(mag: f64) -> f64 {
    ((mag - MAG_BRIGHT) / MAG_SPAN).clamp(0.0, 1.0)
}

/// Build a complete scene. Satellites are taken `&mut` because a failed
/// propagation permanently kills the satellite.
pub(crate) fn build(
    catalogs: &Catalogs,
    satellites: &mut [Satellite],
    observer: GeoLocation,
    instant: SkyTime,
    options: &SceneOptions,
) -> Scene {
    let lst = lst_hours(gmst_hours(instant.julian_date_utc()), observer.longitude_deg);
    let mut health = SceneHealth::default();

    let lp = options.light_pollution.clamp(0.0, 1.0);
    let star_mag_limit = 6.5 - lp * 3.5;
    let deep_sky_mag_limit = 7.0 - lp * 4.0;

    // Stars, in catalog (brightest-first) order.
    let mut stars = Vec::with_capacity(catalogs.stars.len());
    health.stars_in = catalogs.stars.len();
    for record in catalogs.stars.stars() {
        if record.apparent_mag > star_mag_limit {
            health.stars_filtered += 1;
            continue;
        }

        let altaz = equatorial_to_horizontal(
            skydome_core::Equatorial {
                ra_hours: record.ra_hours,
                dec_deg: record.dec_deg,
            },
            observer.latitude_deg,
            lst,
        );
        let position = horizontal_to_cartesian(altaz, SKY_RADIUS);
        if !position.is_finite() {
            health.stars_nonfinite += 1;
            debug!("dropping star {} with non-finite position", record.name);
            continue;
        }

        let t = mag_ramp(record.apparent_mag);
        stars.push(ProcessedStar {
            id: record.id,
            name: record.name.clone(),
            apparent_mag: record.apparent_mag,
            spectral_class: record.spectral_class.clone(),
            altaz,
            position,
            is_visible: altaz.altitude_deg > 0.0,
            color: spectral_to_color(&record.spectral_class),
            size: lerp(0.8, 0.15, t),
            opacity: lerp(1.0, 0.4, t),
        });
    }
    health.stars_out = stars.len();

    // Case-insensitive name index; first (brightest) occurrence wins.
    let mut star_index: HashMap<String, usize> = HashMap::with_capacity(stars.len());
    for (i, star) in stars.iter().enumerate() {
        star_index.entry(star.name.to_lowercase()).or_insert(i);
    }

    let bodies = process_bodies(observer, instant, lst);
    let moons = process_moons(&bodies, observer, instant, lst, options);
    let constellations = process_constellations(&stars, &star_index, &mut health);
    let deep_sky = process_deep_sky(catalogs, observer, lst, deep_sky_mag_limit, &mut health);
    let meteor_showers = process_showers(observer, instant, lst);

    let minor_bodies = if options.include_minor_bodies {
        process_minor_bodies(catalogs, observer, instant, lst, &mut health)
    } else {
        Vec::new()
    };

    let satellites = if options.include_satellites {
        process_satellites(satellites, observer, instant, &mut health)
    } else {
        Vec::new()
    };

    Scene {
        instant,
        observer,
        lst_hours: lst,
        stars,
        bodies,
        moons,
        constellations,
        deep_sky,
        meteor_showers,
        minor_bodies,
        satellites,
        health,
    }
}

/// Solar System bodies are never dropped and never hidden: a selected
/// planet must always be navigable. Non-finite output degrades to the
/// sentinel instead.
fn process_bodies(observer: GeoLocation, instant: SkyTime, lst: f64) -> Vec<BodyDisplay> {
    planets::all_bodies(&instant)
        .into_iter()
        .map(|eph| {
            let altaz = equatorial_to_horizontal(eph.equatorial, observer.latitude_deg, lst);
            let position = horizontal_to_cartesian(altaz, SKY_RADIUS);
            let (position, is_visible) = if position.is_finite() {
                (position, true)
            } else {
                (ScenePosition::sentinel(), false)
            };
            BodyDisplay {
                body: eph.body,
                name: eph.body.name(),
                altaz,
                position,
                is_visible,
                magnitude: eph.magnitude,
                phase_deg: eph.phase_deg,
                distance_km: eph.distance_km,
                angular_diameter_rad: eph.angular_diameter_rad,
            }
        })
        .collect()
}

/// Moons ride slightly inside the sky sphere so they draw in front of
/// their parent. Visibility is the level-of-detail hint: only shown when
/// the camera is zoomed in far enough to separate them.
fn process_moons(
    bodies: &[BodyDisplay],
    observer: GeoLocation,
    instant: SkyTime,
    lst: f64,
    options: &SceneOptions,
) -> Vec<MoonDisplay> {
    let lod = moons::lod_visible(options.camera_fov_deg);

    moons::all_moons(&instant)
        .into_iter()
        .filter_map(|moon| {
            let parent_index = bodies.iter().position(|b| b.body == moon.parent)?;
            let altaz = equatorial_to_horizontal(moon.equatorial, observer.latitude_deg, lst);
            let position =
                horizontal_to_cartesian(altaz, SKY_RADIUS * MOON_SPHERE_FACTOR);
            let (position, is_visible) = if position.is_finite() {
                (position, lod)
            } else {
                (ScenePosition::sentinel(), false)
            };
            Some(MoonDisplay {
                name: moon.name,
                parent_index,
                kind: moon.kind,
                altaz,
                position,
                is_visible,
                magnitude: moon.magnitude,
            })
        })
        .collect()
}

/// Resolve figures against the processed stars. A segment survives only
/// when both endpoints resolved; a figure survives with at least one
/// segment.
fn process_constellations(
    stars: &[ProcessedStar],
    star_index: &HashMap<String, usize>,
    health: &mut SceneHealth,
) -> Vec<ConstellationDisplay> {
    let mut out = Vec::new();

    for figure in constellations::FIGURES {
        let mut segments = Vec::with_capacity(figure.segments.len());
        let mut any_visible = false;
        let mut centroid = ScenePosition::default();

        for (from, to) in figure.segments {
            let a = star_index.get(&from.to_lowercase());
            let b = star_index.get(&to.to_lowercase());
            let (Some(&a), Some(&b)) = (a, b) else {
                health.segments_dropped += 1;
                continue;
            };

            let (sa, sb) = (&stars[a], &stars[b]);
            segments.push((sa.position, sb.position));
            any_visible |= sa.is_visible || sb.is_visible;
            centroid.x += sa.position.x + sb.position.x;
            centroid.y += sa.position.y + sb.position.y;
            centroid.z += sa.position.z + sb.position.z;
        }

        if segments.is_empty() {
            continue;
        }

        out.push(ConstellationDisplay {
            name: figure.name,
            abbreviation: figure.abbreviation,
            label_position: centroid.rescaled(SKY_RADIUS),
            segments,
            is_visible: any_visible,
        });
    }

    out
}

fn process_deep_sky(
    catalogs: &Catalogs,
    observer: GeoLocation,
    lst: f64,
    mag_limit: f64,
    health: &mut SceneHealth,
) -> Vec<DeepSkyDisplay> {
    let mut out = Vec::with_capacity(catalogs.deep_sky.len());

    for entry in &catalogs.deep_sky {
        if entry.magnitude > mag_limit {
            health.deep_sky_filtered += 1;
            continue;
        }

        let altaz = equatorial_to_horizontal(
            skydome_core::Equatorial {
                ra_hours: entry.ra_hours,
                dec_deg: entry.dec_deg,
            },
            observer.latitude_deg,
            lst,
        );
        let position = horizontal_to_cartesian(altaz, SKY_RADIUS);
        if !position.is_finite() {
            health.deep_sky_nonfinite += 1;
            continue;
        }

        out.push(DeepSkyDisplay {
            id: entry.id,
            name: entry.name.clone(),
            kind: entry.kind,
            altaz,
            position,
            is_visible: altaz.altitude_deg > 0.0,
            magnitude: entry.magnitude,
            size_arcmin: entry.size_arcmin,
            constellation: entry.constellation.clone(),
            description: entry.description.clone(),
        });
    }

    out
}

fn process_showers(observer: GeoLocation, instant: SkyTime, lst: f64) -> Vec<ShowerDisplay> {
    let (month, day) = instant.month_day();

    SHOWERS
        .iter()
        .map(|shower| {
            let altaz = equatorial_to_horizontal(shower.radiant, observer.latitude_deg, lst);
            let position = horizontal_to_cartesian(altaz, SKY_RADIUS);
            let is_active = shower.active_on(month, day);
            ShowerDisplay {
                id: shower.id,
                name: shower.name,
                altaz,
                position,
                is_active,
                is_visible: is_active && altaz.altitude_deg > 0.0,
                zhr: shower.zhr,
                speed_km_s: shower.speed_km_s,
                parent_body: shower.parent_body,
            }
        })
        .collect()
}

/// Minor bodies carry two positions: the sky direction (altaz) and the
/// heliocentric orrery mapping (position). A non-converged Kepler solve
/// keeps the last iterate but marks the body not visible.
fn process_minor_bodies(
    catalogs: &Catalogs,
    observer: GeoLocation,
    instant: SkyTime,
    lst: f64,
    health: &mut SceneHealth,
) -> Vec<MinorBodyDisplay> {
    let jde = instant.julian_date_tdb();
    let mut out = Vec::with_capacity(catalogs.minor_bodies.len());

    for body in &catalogs.minor_bodies {
        let geo = kepler::geocentric_state(&body.elements, jde);
        let helio = kepler::heliocentric_state(&body.elements, jde);

        let altaz = equatorial_to_horizontal(geo.equatorial, observer.latitude_deg, lst);
        let position = helio.scene_position();
        let (position, mut is_visible) = if position.is_finite() {
            (position, altaz.altitude_deg > 0.0)
        } else {
            (ScenePosition::sentinel(), false)
        };

        if !geo.converged {
            health.kepler_nonconverged += 1;
            is_visible = false;
        }

        out.push(MinorBodyDisplay {
            name: body.name.clone(),
            altaz,
            position,
            is_visible,
            magnitude: kepler::apparent_magnitude(
                body.abs_magnitude,
                geo.helio_distance_au,
                geo.distance_au,
            ),
            helio_distance_au: geo.helio_distance_au,
            geo_distance_au: geo.distance_au,
        });
    }

    out
}

/// Live satellites project onto the inner sphere; dead ones emit the
/// sentinel and stay dead.
fn process_satellites(
    satellites: &mut [Satellite],
    observer: GeoLocation,
    instant: SkyTime,
    health: &mut SceneHealth,
) -> Vec<SatelliteDisplay> {
    satellites
        .iter_mut()
        .map(|sat| match sat.observe(&instant, &observer) {
            Some(obs) => SatelliteDisplay {
                name: sat.name.clone(),
                norad_id: sat.norad_id,
                altaz: obs.horizontal,
                position: horizontal_to_cartesian(obs.horizontal, SATELLITE_RADIUS),
                is_visible: obs.horizontal.altitude_deg > 0.0,
                range_km: obs.range_km,
            },
            None => {
                health.satellites_dead += 1;
                SatelliteDisplay {
                    name: sat.name.clone(),
                    norad_id: sat.norad_id,
                    altaz: Horizontal {
                        altitude_deg: -90.0,
                        azimuth_deg: 0.0,
                    },
                    position: ScenePosition::sentinel(),
                    is_visible: false,
                    range_km: 0.0,
                }
            }
        })
        .collect()
}
