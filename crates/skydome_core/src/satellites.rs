//! Earth-orbiting satellites from NORAD two-line element sets.
//!
//! Element parsing and the SGP4 perturbation model come from the `sgp4`
//! crate (WGS-72/84 geopotential); this module adds the observer geometry:
//! TEME position rotated to ECEF by GMST, then a closed-form ENU matrix to
//! topocentric (azimuth, elevation, range).
//!
//! Each satellite is a small state machine: `Initialized` until a
//! propagation produces an error or a non-finite position, then terminally
//! `Dead` (decayed or invalid elements). Dead satellites report nothing and
//! stay dead.

use crate::coords::{normalize_degrees, GeoLocation, Horizontal};
use crate::time::{gmst_hours, julian_date, SkyTime};
use log::{debug, warn};
use std::f64::consts::PI;
use thiserror::Error;

/// Earth's mean equatorial radius in km
const EARTH_RADIUS_KM: f64 = 6378.137;

#[derive(Debug, Error)]
pub enum SatelliteError {
    #[error("TLE rejected by SGP4 initializer: {0}")]
    Elements(String),
    #[error("TLE epoch field is malformed: {0}")]
    Epoch(String),
}

/// A raw two-line element set with its optional name line.
#[derive(Debug, Clone, PartialEq)]
pub struct Tle {
    pub name: String,
    pub line1: String,
    pub line2: String,
}

/// Satellite lifecycle: `Parsed -> Initialized` happens in `from_tle`;
/// `Dead` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatState {
    Initialized,
    Dead,
}

/// Topocentric view of a satellite from an observer.
#[derive(Debug, Clone, Copy)]
pub struct SatTopocentric {
    pub horizontal: Horizontal,
    /// Slant range from the observer in km
    pub range_km: f64,
}

/// An SGP4-initialized satellite.
pub struct Satellite {
    pub name: String,
    pub norad_id: u64,
    constants: sgp4::Constants,
    epoch_jd: f64,
    state: SatState,
}

impl Satellite {
    /// Initialize SGP4 constants from a TLE.
    pub fn from_tle(tle: &Tle) -> Result<Self, SatelliteError> {
        let elements = sgp4::Elements::from_tle(
            Some(tle.name.clone()),
            tle.line1.as_bytes(),
            tle.line2.as_bytes(),
        )
        .map_err(|e| SatelliteError::Elements(e.to_string()))?;

        let constants = sgp4::Constants::from_elements(&elements)
            .map_err(|e| SatelliteError::Elements(e.to_string()))?;

        Ok(Self {
            name: tle.name.clone(),
            norad_id: elements.norad_id,
            constants,
            epoch_jd: tle_epoch_jd(&tle.line1)?,
            state: SatState::Initialized,
        })
    }

    pub fn state(&self) -> SatState {
        self.state
    }

    pub fn is_dead(&self) -> bool {
        self.state == SatState::Dead
    }

    /// Epoch of the element set as a UTC Julian Date.
    pub fn epoch_jd(&self) -> f64 {
        self.epoch_jd
    }

    /// TEME position in km at the instant, or None once the satellite is
    /// dead. A failed or non-finite propagation kills the satellite.
    pub fn propagate_teme(&mut self, time: &SkyTime) -> Option<[f64; 3]> {
        if self.is_dead() {
            return None;
        }

        let minutes = (time.julian_date_utc() - self.epoch_jd) * 1440.0;
        match self.constants.propagate(sgp4::MinutesSinceEpoch(minutes)) {
            Ok(prediction) => {
                let p = prediction.position;
                if p.iter().all(|v| v.is_finite()) {
                    Some(p)
                } else {
                    warn!("satellite {} produced a non-finite position; marking dead", self.name);
                    self.state = SatState::Dead;
                    None
                }
            }
            Err(e) => {
                warn!("satellite {} propagation failed ({e}); marking dead", self.name);
                self.state = SatState::Dead;
                None
            }
        }
    }

    /// Topocentric (azimuth, elevation, range) for an observer, or None
    /// once the satellite is dead.
    pub fn observe(&mut self, time: &SkyTime, observer: &GeoLocation) -> Option<SatTopocentric> {
        let teme = self.propagate_teme(time)?;
        let jd_ut = time.julian_date_utc();
        Some(topocentric_from_teme(teme, jd_ut, observer))
    }
}

/// Rotate a TEME/ECI position into ECEF using GMST, then project into the
/// observer's east-north-up frame.
fn topocentric_from_teme(teme: [f64; 3], jd_ut: f64, observer: &GeoLocation) -> SatTopocentric {
    let theta = gmst_hours(jd_ut) * 15.0 * PI / 180.0;
    let (sin_t, cos_t) = theta.sin_cos();

    // ECI -> ECEF: rotate by GMST about the pole.
    let x = cos_t * teme[0] + sin_t * teme[1];
    let y = -sin_t * teme[0] + cos_t * teme[1];
    let z = teme[2];

    let lat = observer.latitude_deg * PI / 180.0;
    let lon = observer.longitude_deg * PI / 180.0;
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();

    // Observer on a spherical Earth; good to the accuracy goals here.
    let obs_x = EARTH_RADIUS_KM * cos_lat * cos_lon;
    let obs_y = EARTH_RADIUS_KM * cos_lat * sin_lon;
    let obs_z = EARTH_RADIUS_KM * sin_lat;

    let dx = x - obs_x;
    let dy = y - obs_y;
    let dz = z - obs_z;
    let range_km = (dx * dx + dy * dy + dz * dz).sqrt();

    // ENU projection.
    let east = -sin_lon * dx + cos_lon * dy;
    let north = -sin_lat * cos_lon * dx - sin_lat * sin_lon * dy + cos_lat * dz;
    let up = cos_lat * cos_lon * dx + cos_lat * sin_lon * dy + sin_lat * dz;

    let elevation = (up / range_km).clamp(-1.0, 1.0).asin() * 180.0 / PI;
    let azimuth = normalize_degrees(east.atan2(north) * 180.0 / PI);

    SatTopocentric {
        horizontal: Horizontal {
            altitude_deg: elevation,
            azimuth_deg: azimuth,
        },
        range_km,
    }
}

/// Epoch of a TLE (line 1, columns 19-32: two-digit year + fractional day
/// of year) as a UTC Julian Date.
fn tle_epoch_jd(line1: &str) -> Result<f64, SatelliteError> {
    let field = line1
        .get(18..32)
        .ok_or_else(|| SatelliteError::Epoch("line 1 shorter than 32 columns".into()))?;

    let year2: i32 = field[..2]
        .trim()
        .parse()
        .map_err(|_| SatelliteError::Epoch(format!("bad epoch year in `{field}`")))?;
    let day_of_year: f64 = field[2..]
        .trim()
        .parse()
        .map_err(|_| SatelliteError::Epoch(format!("bad epoch day in `{field}`")))?;

    // NORAD convention: 57-99 are 19xx, 00-56 are 20xx.
    let year = if year2 >= 57 { 1900 + year2 } else { 2000 + year2 };

    Ok(julian_date(year, 1, 1, 0, 0, 0.0) + (day_of_year - 1.0))
}

/// Split Celestrak-style TLE text (optional name line, then lines 1 and 2)
/// into element sets. Malformed groups are skipped and counted.
pub fn parse_tle_text(text: &str) -> (Vec<Tle>, usize) {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .collect();

    let mut sets = Vec::new();
    let mut skipped = 0;
    let mut pending_name: Option<&str> = None;

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.starts_with("1 ") {
            if i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
                let name = pending_name.take().unwrap_or("").trim();
                sets.push(Tle {
                    name: if name.is_empty() {
                        format!("NORAD {}", line.get(2..7).unwrap_or("?").trim())
                    } else {
                        name.to_string()
                    },
                    line1: line.to_string(),
                    line2: lines[i + 1].to_string(),
                });
                i += 2;
                continue;
            }
            skipped += 1;
            debug!("TLE line 1 without a matching line 2: {line}");
            i += 1;
        } else if line.starts_with("2 ") {
            skipped += 1;
            i += 1;
        } else {
            pending_name = Some(line);
            i += 1;
        }
    }

    (sets, skipped)
}

/// A recent-enough ISS element set used as the bundled sample.
pub const SAMPLE_TLES: &str = "\
ISS (ZARYA)
1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992
2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008
";

#[cfg(test)]
mod tests {
    use super::*;

    fn iss() -> Satellite {
        let (sets, skipped) = parse_tle_text(SAMPLE_TLES);
        assert_eq!(skipped, 0);
        Satellite::from_tle(&sets[0]).expect("sample TLE must initialize")
    }

    fn iss_epoch_time() -> SkyTime {
        SkyTime::from_jd(iss().epoch_jd())
    }

    #[test]
    fn test_tle_group_parsing() {
        let (sets, skipped) = parse_tle_text(SAMPLE_TLES);
        assert_eq!(sets.len(), 1);
        assert_eq!(skipped, 0);
        assert_eq!(sets[0].name, "ISS (ZARYA)");

        // A dangling line 1 is skipped, later sets still parse.
        let text = format!("1 00005U 58002B   00179.78495062\n{SAMPLE_TLES}");
        let (sets, skipped) = parse_tle_text(&text);
        assert_eq!(sets.len(), 1);
        assert_eq!(skipped, 1);
    }

    #[test]
    fn test_unnamed_set_gets_norad_name() {
        let text = SAMPLE_TLES
            .lines()
            .skip(1)
            .collect::<Vec<_>>()
            .join("\n");
        let (sets, _) = parse_tle_text(&text);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name, "NORAD 25544");
    }

    #[test]
    fn test_epoch_parsing() {
        let sat = iss();
        assert_eq!(sat.norad_id, 25544);

        // 2020 day 194.88612269: JD 2458849.5 (2020-01-01) + 193.886...
        let expected = 2458849.5 + 193.88612269;
        assert!(
            (sat.epoch_jd() - expected).abs() < 1e-6,
            "epoch {} vs expected {}",
            sat.epoch_jd(),
            expected
        );
    }

    #[test]
    fn test_epoch_century_rule() {
        // Year 98 is 1998, year 20 is 2020.
        let jd98 = tle_epoch_jd("1 25544U 98067A   98001.00000000 -.00002218  00000-0 -31515-4 0  9992").unwrap();
        assert!((jd98 - julian_date(1998, 1, 1, 0, 0, 0.0)).abs() < 1e-9);
    }

    #[test]
    fn test_iss_orbital_radius() {
        let mut sat = iss();
        let teme = sat.propagate_teme(&iss_epoch_time()).expect("propagation at epoch");
        let r = (teme[0] * teme[0] + teme[1] * teme[1] + teme[2] * teme[2]).sqrt();
        // LEO: ~420 km altitude.
        assert!(
            (EARTH_RADIUS_KM + 300.0..EARTH_RADIUS_KM + 600.0).contains(&r),
            "ISS orbital radius {r} km"
        );
        assert_eq!(sat.state(), SatState::Initialized);
    }

    #[test]
    fn test_observation_geometry() {
        let mut sat = iss();
        let observer = GeoLocation::new(37.77, -122.42);
        let obs = sat.observe(&iss_epoch_time(), &observer).unwrap();

        assert!(obs.horizontal.altitude_deg.abs() <= 90.0);
        assert!((0.0..360.0).contains(&obs.horizontal.azimuth_deg));
        // Between grazing overhead and the far side of the orbit.
        assert!(
            obs.range_km > 300.0 && obs.range_km < 15_000.0,
            "range {} km",
            obs.range_km
        );
    }

    #[test]
    fn test_96_minute_pass_sweep() {
        // A 96-minute sweep bracketing a pass: the satellite must rise
        // and set (at least two horizon crossings) with the altitude
        // bounded throughout.
        let mut sat = iss();
        let observer = GeoLocation::new(37.77, -122.42);
        let epoch = iss_epoch_time();

        // Coarse minute scan for the first sample above the horizon; the
        // ISS ground track reaches a mid-latitude observer several times
        // a day, but not necessarily in the first orbit after epoch.
        let mut rise_minute = None;
        for minute in 0..(36 * 60) {
            let t = epoch.plus_days(minute as f64 / 1440.0);
            let obs = sat.observe(&t, &observer).expect("healthy TLE near epoch");
            assert!((-90.0..=90.0).contains(&obs.horizontal.altitude_deg));
            if obs.horizontal.altitude_deg > 0.0 {
                rise_minute = Some(minute);
                break;
            }
        }
        let rise_minute = rise_minute.expect("no pass within 36 hours of epoch");

        let start = epoch.plus_days((rise_minute as f64 - 10.0) / 1440.0);
        let mut previous_alt: Option<f64> = None;
        let mut crossings = 0;
        for minute in 0..=96 {
            let t = start.plus_days(minute as f64 / 1440.0);
            let obs = sat.observe(&t, &observer).expect("healthy TLE near epoch");

            let alt = obs.horizontal.altitude_deg;
            assert!((-90.0..=90.0).contains(&alt));
            if let Some(prev) = previous_alt {
                if (prev <= 0.0) != (alt <= 0.0) {
                    crossings += 1;
                }
            }
            previous_alt = Some(alt);
        }

        eprintln!("pass {rise_minute} min after epoch; crossings in 96 min: {crossings}");
        assert!(crossings >= 2, "expected a rise and a set in 96 minutes, got {crossings}");
    }

    #[test]
    fn test_dead_satellite_is_terminal() {
        let mut sat = iss();
        sat.state = SatState::Dead;

        assert!(sat.observe(&iss_epoch_time(), &GeoLocation::new(0.0, 0.0)).is_none());
        // Still dead, still nothing: the transition is idempotent.
        assert!(sat.is_dead());
        assert!(sat.propagate_teme(&iss_epoch_time()).is_none());
        assert!(sat.is_dead());
    }

    #[test]
    fn test_zenith_pass_elevation() {
        // A synthetic point directly above the observer must read ~90 deg.
        let observer = GeoLocation::new(0.0, 0.0);
        let jd = 2451545.0;
        // Observer meridian at this GMST, on the equator.
        let theta = gmst_hours(jd) * 15.0 * PI / 180.0;
        let r = EARTH_RADIUS_KM + 400.0;
        let teme = [r * theta.cos(), r * theta.sin(), 0.0];

        let obs = topocentric_from_teme(teme, jd, &observer);
        assert!(
            obs.horizontal.altitude_deg > 89.9,
            "zenith elevation {}",
            obs.horizontal.altitude_deg
        );
        assert!((obs.range_km - 400.0).abs() < 1.0);
    }
}
