//! Meteor-shower calendar.
//!
//! Annual showers with their radiants, activity windows, and peak dates
//! (IMO working-list values). Activity windows may wrap the year boundary
//! (Quadrantids); the window test handles that explicitly.

use crate::coords::Equatorial;
use crate::time::SkyTime;

/// A calendar (month, day) pair.
pub type MonthDay = (u8, u8);

/// An annual meteor shower.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeteorShower {
    pub id: u32,
    pub name: &'static str,
    pub peak: MonthDay,
    /// Closed activity window; may wrap the year boundary
    pub active_start: MonthDay,
    pub active_end: MonthDay,
    /// Zenithal hourly rate at peak
    pub zhr: u32,
    pub radiant: Equatorial,
    pub parent_body: &'static str,
    pub speed_km_s: f64,
}

/// The annual shower working list.
#[rustfmt::skip]
pub const SHOWERS: &[MeteorShower] = &[
    MeteorShower { id: 1, name: "Quadrantids",      peak: (1, 3),   active_start: (12, 28), active_end: (1, 12),
                   zhr: 110, radiant: Equatorial { ra_hours: 15.30, dec_deg:  49.5 }, parent_body: "196256 (2003 EH1)",      speed_km_s: 41.0 },
    MeteorShower { id: 2, name: "Lyrids",           peak: (4, 22),  active_start: (4, 14),  active_end: (4, 30),
                   zhr: 18,  radiant: Equatorial { ra_hours: 18.07, dec_deg:  34.0 }, parent_body: "C/1861 G1 (Thatcher)",   speed_km_s: 49.0 },
    MeteorShower { id: 3, name: "Eta Aquariids",    peak: (5, 6),   active_start: (4, 19),  active_end: (5, 28),
                   zhr: 50,  radiant: Equatorial { ra_hours: 22.47, dec_deg:  -1.0 }, parent_body: "1P/Halley",              speed_km_s: 66.0 },
    MeteorShower { id: 4, name: "Delta Aquariids",  peak: (7, 30),  active_start: (7, 12),  active_end: (8, 23),
                   zhr: 25,  radiant: Equatorial { ra_hours: 22.67, dec_deg: -16.0 }, parent_body: "96P/Machholz",           speed_km_s: 41.0 },
    MeteorShower { id: 5, name: "Perseids",         peak: (8, 12),  active_start: (7, 17),  active_end: (8, 24),
                   zhr: 100, radiant: Equatorial { ra_hours:  3.28, dec_deg:  58.0 }, parent_body: "109P/Swift-Tuttle",      speed_km_s: 59.0 },
    MeteorShower { id: 6, name: "Orionids",         peak: (10, 21), active_start: (10, 2),  active_end: (11, 7),
                   zhr: 20,  radiant: Equatorial { ra_hours:  6.35, dec_deg:  16.0 }, parent_body: "1P/Halley",              speed_km_s: 66.0 },
    MeteorShower { id: 7, name: "Leonids",          peak: (11, 17), active_start: (11, 6),  active_end: (11, 30),
                   zhr: 15,  radiant: Equatorial { ra_hours: 10.27, dec_deg:  22.0 }, parent_body: "55P/Tempel-Tuttle",      speed_km_s: 71.0 },
    MeteorShower { id: 8, name: "Geminids",         peak: (12, 14), active_start: (12, 4),  active_end: (12, 20),
                   zhr: 150, radiant: Equatorial { ra_hours:  7.55, dec_deg:  32.0 }, parent_body: "3200 Phaethon",          speed_km_s: 35.0 },
    MeteorShower { id: 9, name: "Ursids",           peak: (12, 22), active_start: (12, 17), active_end: (12, 26),
                   zhr: 10,  radiant: Equatorial { ra_hours: 14.47, dec_deg:  76.0 }, parent_body: "8P/Tuttle",              speed_km_s: 33.0 },
];

fn ordinal(md: MonthDay) -> u16 {
    md.0 as u16 * 100 + md.1 as u16
}

impl MeteorShower {
    /// Whether the shower is active on the given calendar date. Windows
    /// with start > end wrap across the new year.
    pub fn active_on(&self, month: u8, day: u8) -> bool {
        let d = ordinal((month, day));
        let start = ordinal(self.active_start);
        let end = ordinal(self.active_end);
        if start <= end {
            (start..=end).contains(&d)
        } else {
            d >= start || d <= end
        }
    }
}

/// Showers active at the given instant (UTC calendar date).
pub fn active_showers(time: &SkyTime) -> Vec<&'static MeteorShower> {
    let (month, day) = time.month_day();
    SHOWERS.iter().filter(|s| s.active_on(month, day)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perseids_window() {
        let perseids = SHOWERS.iter().find(|s| s.name == "Perseids").unwrap();
        assert!(perseids.active_on(8, 12));
        assert!(perseids.active_on(7, 17));
        assert!(perseids.active_on(8, 24));
        assert!(!perseids.active_on(8, 25));
        assert!(!perseids.active_on(6, 30));
        assert!(!perseids.active_on(1, 3));
    }

    #[test]
    fn test_quadrantids_wrap_year_boundary() {
        let quads = SHOWERS.iter().find(|s| s.name == "Quadrantids").unwrap();
        // Active on both sides of the new year.
        assert!(quads.active_on(12, 28));
        assert!(quads.active_on(12, 31));
        assert!(quads.active_on(1, 1));
        assert!(quads.active_on(1, 12));
        // Inactive just outside the window.
        assert!(!quads.active_on(12, 27));
        assert!(!quads.active_on(1, 13));
        assert!(!quads.active_on(6, 15));
    }

    #[test]
    fn test_active_showers_august() {
        let time = SkyTime::from_utc(2024, 8, 12, 3, 0, 0.0);
        let active = active_showers(&time);
        let names: Vec<_> = active.iter().map(|s| s.name).collect();
        assert!(names.contains(&"Perseids"), "active on Aug 12: {names:?}");
        assert!(names.contains(&"Delta Aquariids"));
        assert!(!names.contains(&"Geminids"));
    }

    #[test]
    fn test_new_years_eve_activity() {
        let time = SkyTime::from_utc(2024, 12, 31, 23, 0, 0.0);
        let names: Vec<_> = active_showers(&time).iter().map(|s| s.name).collect();
        assert!(names.contains(&"Quadrantids"));
    }

    #[test]
    fn test_ids_unique_and_peaks_inside_windows() {
        let mut ids: Vec<u32> = SHOWERS.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), SHOWERS.len());

        for s in SHOWERS {
            assert!(
                s.active_on(s.peak.0, s.peak.1),
                "{} peaks outside its own window",
                s.name
            );
            assert!(s.zhr > 0);
            assert!(s.speed_km_s > 10.0 && s.speed_km_s < 75.0);
        }
    }
}
