use hifitime::{Epoch, TimeScale};

use crate::coords::normalize_hours;

/// Julian Date of the J2000.0 epoch.
pub const JD_J2000: f64 = 2451545.0;

/// Wrapper around hifitime::Epoch for engine time handling.
/// Provides conversions between UTC and the time scales needed for ephemeris
/// calculations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyTime {
    epoch: Epoch,
}

impl SkyTime {
    /// Create a new SkyTime from UTC components.
    pub fn from_utc(year: i32, month: u8, day: u8, hour: u8, minute: u8, second: f64) -> Self {
        let secs = second.floor() as u8;
        let nanos = ((second - second.floor()) * 1_000_000_000.0) as u32;
        let epoch = Epoch::from_gregorian_utc(year, month, day, hour, minute, secs, nanos);
        Self { epoch }
    }

    /// Create a SkyTime for the current moment.
    pub fn now() -> Self {
        Self {
            epoch: Epoch::now().unwrap(),
        }
    }

    /// Create a SkyTime from a Julian Date (UTC).
    pub fn from_jd(jd: f64) -> Self {
        let epoch = Epoch::from_jde_utc(jd);
        Self { epoch }
    }

    /// Get the underlying hifitime Epoch.
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Get Julian Date in UTC scale.
    pub fn julian_date_utc(&self) -> f64 {
        self.epoch.to_jde_utc_days()
    }

    /// Get Julian Date in TDB (Barycentric Dynamical Time) scale.
    /// This is the time scale used by VSOP87 for planetary positions.
    pub fn julian_date_tdb(&self) -> f64 {
        self.epoch.to_jde_tdb_days()
    }

    /// Get Julian Date in TT (Terrestrial Time) scale.
    pub fn julian_date_tt(&self) -> f64 {
        self.epoch.to_jde_tt_days()
    }

    /// Convert to TDB epoch (for VSOP87).
    pub fn to_tdb(&self) -> Epoch {
        self.epoch.to_time_scale(TimeScale::TDB)
    }

    /// Get Julian centuries from J2000.0 in TDB.
    pub fn julian_centuries_tdb(&self) -> f64 {
        (self.julian_date_tdb() - JD_J2000) / 36525.0
    }

    /// The instant shifted by a (possibly fractional, possibly negative)
    /// number of days.
    pub fn plus_days(&self, days: f64) -> Self {
        Self::from_jd(self.julian_date_utc() + days)
    }

    /// Civil UTC (month, day) of this instant, for calendar-window checks.
    pub fn month_day(&self) -> (u8, u8) {
        let (_, month, day) = civil_from_jd(self.julian_date_utc());
        (month, day)
    }

    /// Civil UTC year of this instant.
    pub fn year(&self) -> i32 {
        civil_from_jd(self.julian_date_utc()).0
    }
}

impl Default for SkyTime {
    fn default() -> Self {
        Self::now()
    }
}

/// Julian Date from a UTC civil date using the standard Gregorian algorithm.
///
/// January and February count as months 13 and 14 of the previous year; the
/// Gregorian reform correction is b = 2 - ⌊y/100⌋ + ⌊y/400⌋.
pub fn julian_date(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> f64 {
    let (y, m) = if month <= 2 {
        (year - 1, month + 12)
    } else {
        (year, month)
    };
    let y = y as f64;
    let m = m as f64;

    let b = 2.0 - (y / 100.0).floor() + (y / 400.0).floor();

    let day_fraction =
        day as f64 + (hour as f64 + minute as f64 / 60.0 + second / 3600.0) / 24.0;

    (365.25 * (y + 4716.0)).floor() + (30.6001 * (m + 1.0)).floor() + day_fraction + b - 1524.5
}

/// Civil UTC (year, month, day) for a Julian Date; the inverse of
/// `julian_date`, Gregorian calendar.
pub fn civil_from_jd(jd: f64) -> (i32, u8, u8) {
    let jd = jd + 0.5;
    let z = jd.floor();

    let a = if z < 2_299_161.0 {
        z
    } else {
        let alpha = ((z - 1_867_216.25) / 36524.25).floor();
        z + 1.0 + alpha - (alpha / 4.0).floor()
    };

    let b = a + 1524.0;
    let c = ((b - 122.1) / 365.25).floor();
    let d = (365.25 * c).floor();
    let e = ((b - d) / 30.6001).floor();

    let day = b - d - (30.6001 * e).floor();
    let month = if e < 14.0 { e - 1.0 } else { e - 13.0 };
    let year = if month > 2.0 { c - 4716.0 } else { c - 4715.0 };

    (year as i32, month as u8, day as u8)
}

/// Greenwich Mean Sidereal Time in hours [0, 24) for a UT Julian Date.
///
/// IAU 1982 expression with the 1.00273790935 sidereal rate term.
pub fn gmst_hours(jd_ut: f64) -> f64 {
    // Previous midnight (JD ending in .5) and UT hours since it.
    let jd0 = (jd_ut - 0.5).floor() + 0.5;
    let ut_hours = (jd_ut - jd0) * 24.0;
    let d0 = jd0 - JD_J2000;
    let t = (jd_ut - JD_J2000) / 36525.0;

    let gmst = 6.697374558 + 0.06570982441908 * d0 + 1.00273790935 * ut_hours + 0.000026 * t * t;
    normalize_hours(gmst)
}

/// Local Mean Sidereal Time in hours [0, 24).
pub fn lst_hours(gmst_hours: f64, longitude_deg: f64) -> f64 {
    normalize_hours(gmst_hours + longitude_deg / 15.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_j2000_epoch() {
        // J2000.0 is January 1, 2000, 12:00 TT; UTC JD should be close.
        let time = SkyTime::from_utc(2000, 1, 1, 12, 0, 0.0);
        let jd = time.julian_date_utc();
        assert!((jd - JD_J2000).abs() < 0.01);
    }

    #[test]
    fn test_julian_centuries() {
        let j2000 = SkyTime::from_utc(2000, 1, 1, 12, 0, 0.0);
        assert!(j2000.julian_centuries_tdb().abs() < 0.001);

        let j2100 = SkyTime::from_utc(2100, 1, 1, 12, 0, 0.0);
        assert!((j2100.julian_centuries_tdb() - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_gregorian_julian_date() {
        // Meeus, Astronomical Algorithms, ch. 7 worked examples.
        assert_relative_eq!(julian_date(2000, 1, 1, 12, 0, 0.0), 2451545.0, epsilon = 1e-9);
        assert_relative_eq!(julian_date(1999, 1, 1, 0, 0, 0.0), 2451179.5, epsilon = 1e-9);
        // January reduces to month 13 of the previous year.
        assert_relative_eq!(julian_date(1987, 1, 27, 0, 0, 0.0), 2446822.5, epsilon = 1e-9);
        assert_relative_eq!(julian_date(1988, 6, 19, 12, 0, 0.0), 2447332.0, epsilon = 1e-9);
    }

    #[test]
    fn test_julian_date_matches_hifitime() {
        for (y, mo, d, h, mi) in [
            (2000, 3, 20, 7, 35),
            (2024, 12, 22, 0, 0),
            (1970, 1, 1, 0, 0),
            (2036, 8, 5, 23, 59),
        ] {
            let own = julian_date(y, mo, d, h, mi, 0.0);
            let hifi = SkyTime::from_utc(y, mo as u8, d as u8, h as u8, mi as u8, 0.0)
                .julian_date_utc();
            assert!(
                (own - hifi).abs() < 1e-6,
                "{}-{}-{}: {} vs {}",
                y,
                mo,
                d,
                own,
                hifi
            );
        }
    }

    #[test]
    fn test_civil_from_jd_inverts_julian_date() {
        for (y, mo, d) in [(2000, 1, 1), (1999, 12, 31), (2024, 2, 29), (2025, 8, 1)] {
            let jd = julian_date(y, mo, d, 6, 0, 0.0);
            assert_eq!(civil_from_jd(jd), (y, mo as u8, d as u8));
        }
    }

    #[test]
    fn test_gmst_at_j2000() {
        // Known value: 18.697374558 h at JD 2451545.0.
        assert_relative_eq!(gmst_hours(JD_J2000), 18.697374558, epsilon = 1e-6);
    }

    #[test]
    fn test_gmst_daily_advance() {
        // One solar day advances GMST by ~3m56.6s = 0.0657098 h (mod 24).
        let jd = 2460310.25;
        let delta = normalize_hours(gmst_hours(jd + 1.0) - gmst_hours(jd));
        assert!(
            (delta - 0.06570982).abs() < 1e-4,
            "daily sidereal advance was {delta}"
        );
    }

    #[test]
    fn test_lst_wraps() {
        assert_relative_eq!(lst_hours(23.5, 30.0), 1.5, epsilon = 1e-9);
        assert_relative_eq!(lst_hours(1.0, -30.0), 23.0, epsilon = 1e-9);
    }

    #[test]
    fn test_plus_days() {
        let t = SkyTime::from_utc(2024, 3, 1, 0, 0, 0.0);
        let later = t.plus_days(2.5);
        assert_relative_eq!(
            later.julian_date_utc() - t.julian_date_utc(),
            2.5,
            epsilon = 1e-9
        );
        assert_eq!(later.month_day(), (3, 3));
    }
}
