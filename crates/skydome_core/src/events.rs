//! Upcoming astronomical events.
//!
//! Enumerates lunar phase instants, meteor-shower peaks, and the solar
//! longitude crossings (equinoxes and solstices) inside a look-ahead
//! window. Phase and longitude instants are found by a coarse scan for a
//! bracketing sign change followed by bisection.

use crate::coords::normalize_degrees_signed;
use crate::planets::{moon_phase_deg, sun_apparent_longitude_deg};
use crate::showers::SHOWERS;
use crate::time::{julian_date, SkyTime};

/// Event classes, in tie-break order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    MoonPhase,
    MeteorPeak,
    Solstice,
    Equinox,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::MoonPhase => "moon_phase",
            EventKind::MeteorPeak => "meteor_peak",
            EventKind::Solstice => "solstice",
            EventKind::Equinox => "equinox",
        }
    }
}

/// One upcoming event.
#[derive(Debug, Clone, PartialEq)]
pub struct AstroEvent {
    /// Instant of the event, UTC Julian Date
    pub jd: f64,
    pub kind: EventKind,
    pub name: String,
}

impl AstroEvent {
    pub fn time(&self) -> SkyTime {
        SkyTime::from_jd(self.jd)
    }
}

const MOON_PHASE_TARGETS: [(f64, &str); 4] = [
    (0.0, "New Moon"),
    (90.0, "First Quarter"),
    (180.0, "Full Moon"),
    (270.0, "Last Quarter"),
];

// Solar longitude targets; season names follow the northern convention.
const SUN_LONGITUDE_TARGETS: [(f64, EventKind, &str); 4] = [
    (0.0, EventKind::Equinox, "March Equinox"),
    (90.0, EventKind::Solstice, "June Solstice"),
    (180.0, EventKind::Equinox, "September Equinox"),
    (270.0, EventKind::Solstice, "December Solstice"),
];

/// All events in `[from, from + days_ahead]`, sorted by instant with ties
/// broken by kind then name.
pub fn upcoming_events(from: &SkyTime, days_ahead: f64) -> Vec<AstroEvent> {
    let start_jd = from.julian_date_utc();
    let end_jd = start_jd + days_ahead;
    let mut events = Vec::new();

    // Next instant of each principal lunar phase. The phase angle advances
    // ~12.2 deg/day, so a half-day scan step cannot skip a crossing.
    for (target, name) in MOON_PHASE_TARGETS {
        let f = |jd: f64| {
            normalize_degrees_signed(moon_phase_deg(&SkyTime::from_jd(jd)) - target)
        };
        if let Some(jd) = next_upward_crossing(&f, start_jd, end_jd, 0.5) {
            events.push(AstroEvent {
                jd,
                kind: EventKind::MoonPhase,
                name: name.to_string(),
            });
        }
    }

    // Solar longitude crossings; ~1 deg/day, a one-day step suffices. A
    // 366-day window can hold the same crossing twice, so keep scanning
    // past the first hit.
    for (target, kind, name) in SUN_LONGITUDE_TARGETS {
        let f = |jd: f64| {
            normalize_degrees_signed(sun_apparent_longitude_deg(jd) - target)
        };
        let mut scan_from = start_jd;
        while let Some(jd) = next_upward_crossing(&f, scan_from, end_jd, 1.0) {
            events.push(AstroEvent {
                jd,
                kind,
                name: name.to_string(),
            });
            scan_from = jd + 180.0;
        }
    }

    // Shower peaks this year or next that land inside the window.
    let year = from.year();
    for shower in SHOWERS {
        for y in [year, year + 1] {
            let jd = julian_date(y, shower.peak.0 as u32, shower.peak.1 as u32, 0, 0, 0.0);
            if jd >= start_jd && jd <= end_jd {
                events.push(AstroEvent {
                    jd,
                    kind: EventKind::MeteorPeak,
                    name: shower.name.to_string(),
                });
            }
        }
    }

    events.sort_by(|a, b| {
        a.jd.total_cmp(&b.jd)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.name.cmp(&b.name))
    });
    events
}

/// First upward zero crossing of a cyclic signed-degree function in
/// [start, end], or None. The wrap discontinuity at ±180 also changes
/// sign; it is rejected by requiring the bracket to sit near zero.
fn next_upward_crossing<F: Fn(f64) -> f64>(f: F, start: f64, end: f64, step: f64) -> Option<f64> {
    let mut prev_jd = start;
    let mut prev = f(start);

    let mut jd = start + step;
    while jd <= end + step {
        let jd_clamped = jd.min(end);
        let value = f(jd_clamped);

        if prev < 0.0 && value >= 0.0 && prev > -90.0 && value < 90.0 {
            return Some(bisect(&f, prev_jd, jd_clamped));
        }

        if jd_clamped >= end {
            break;
        }
        prev = value;
        prev_jd = jd_clamped;
        jd += step;
    }
    None
}

/// Bisect a bracketed upward crossing down to sub-second resolution.
fn bisect<F: Fn(f64) -> f64>(f: &F, mut lo: f64, mut hi: f64) -> f64 {
    for _ in 0..50 {
        let mid = 0.5 * (lo + hi);
        if f(mid) < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-7 {
            break;
        }
    }
    0.5 * (lo + hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(events: &'a [AstroEvent], name: &str) -> Option<&'a AstroEvent> {
        events.iter().find(|e| e.name == name)
    }

    #[test]
    fn test_full_moon_september_2024() {
        let from = SkyTime::from_utc(2024, 9, 1, 0, 0, 0.0);
        let events = upcoming_events(&from, 30.0);

        let full = find(&events, "Full Moon").expect("a full moon within 30 days");
        // Known instant: 2024-09-18 02:34 UTC.
        let expected = julian_date(2024, 9, 18, 2, 34, 0.0);
        assert!(
            (full.jd - expected).abs() < 0.2,
            "full moon off by {} days",
            full.jd - expected
        );
    }

    #[test]
    fn test_all_four_phases_within_a_lunation_and_a_half() {
        let from = SkyTime::from_utc(2024, 3, 1, 0, 0, 0.0);
        let events = upcoming_events(&from, 45.0);
        for name in ["New Moon", "First Quarter", "Full Moon", "Last Quarter"] {
            let e = find(&events, name).unwrap_or_else(|| panic!("{name} missing"));
            assert!(e.jd > from.julian_date_utc());
            assert_eq!(e.kind, EventKind::MoonPhase);
        }
    }

    #[test]
    fn test_december_solstice_2024() {
        let from = SkyTime::from_utc(2024, 12, 1, 0, 0, 0.0);
        let events = upcoming_events(&from, 40.0);

        let solstice = find(&events, "December Solstice").expect("solstice in window");
        assert_eq!(solstice.kind, EventKind::Solstice);
        // Known instant: 2024-12-21 09:20 UTC.
        let expected = julian_date(2024, 12, 21, 9, 20, 0.0);
        assert!(
            (solstice.jd - expected).abs() < 0.6,
            "solstice off by {} days",
            solstice.jd - expected
        );
    }

    #[test]
    fn test_march_equinox_2025() {
        let from = SkyTime::from_utc(2025, 3, 1, 0, 0, 0.0);
        let events = upcoming_events(&from, 30.0);

        let equinox = find(&events, "March Equinox").expect("equinox in window");
        assert_eq!(equinox.kind, EventKind::Equinox);
        // Known instant: 2025-03-20 09:01 UTC.
        let expected = julian_date(2025, 3, 20, 9, 1, 0.0);
        assert!(
            (equinox.jd - expected).abs() < 0.6,
            "equinox off by {} days",
            equinox.jd - expected
        );
    }

    #[test]
    fn test_geminids_peak_in_window() {
        let from = SkyTime::from_utc(2024, 12, 1, 0, 0, 0.0);
        let events = upcoming_events(&from, 30.0);
        let geminids = find(&events, "Geminids").expect("Geminids peak in December");
        assert_eq!(geminids.kind, EventKind::MeteorPeak);
        assert!((geminids.jd - julian_date(2024, 12, 14, 0, 0, 0.0)).abs() < 1e-9);
    }

    #[test]
    fn test_peak_rollover_to_next_year() {
        // A late-December window must pick up January peaks of next year.
        let from = SkyTime::from_utc(2024, 12, 20, 0, 0, 0.0);
        let events = upcoming_events(&from, 30.0);
        let quads = find(&events, "Quadrantids").expect("January peak via next-year path");
        assert!((quads.jd - julian_date(2025, 1, 3, 0, 0, 0.0)).abs() < 1e-9);
    }

    #[test]
    fn test_events_sorted() {
        let from = SkyTime::from_utc(2024, 6, 1, 0, 0, 0.0);
        let events = upcoming_events(&from, 90.0);
        assert!(!events.is_empty());
        for pair in events.windows(2) {
            assert!(
                pair[0].jd <= pair[1].jd
                    || (pair[0].jd == pair[1].jd && pair[0].kind <= pair[1].kind),
                "events out of order: {:?} then {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_year_window_has_all_seasons() {
        let from = SkyTime::from_utc(2024, 1, 10, 0, 0, 0.0);
        let events = upcoming_events(&from, 365.0);
        for name in [
            "March Equinox",
            "June Solstice",
            "September Equinox",
            "December Solstice",
        ] {
            assert!(find(&events, name).is_some(), "{name} missing from year window");
        }
        // Every shower peaks at least once a year.
        for shower in SHOWERS {
            assert!(
                find(&events, shower.name).is_some(),
                "{} missing from year window",
                shower.name
            );
        }
    }
}
