//! Deep-sky object catalog.
//!
//! The network feed is a JSON array of SIMBAD-style records
//! (`{main_id, ra_deg, dec_deg, otype}`); a bundled Messier subset serves
//! as the offline fallback. Feed RA arrives in degrees and is normalized
//! to hours here.

use std::io;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeepSkyError {
    #[error("deep-sky feed is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("deep-sky feed contained no mappable objects")]
    Empty,
}

/// Classification used for display and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeepSkyKind {
    Galaxy,
    Nebula,
    Cluster,
    Planetary,
    Supernova,
}

impl DeepSkyKind {
    pub fn name(&self) -> &'static str {
        match self {
            DeepSkyKind::Galaxy => "galaxy",
            DeepSkyKind::Nebula => "nebula",
            DeepSkyKind::Cluster => "cluster",
            DeepSkyKind::Planetary => "planetary",
            DeepSkyKind::Supernova => "supernova",
        }
    }

    /// Map a SIMBAD `otype` code. Codes outside the supported set return
    /// None and the record is skipped.
    pub fn from_otype(otype: &str) -> Option<Self> {
        match otype.trim() {
            "G" | "GiG" | "GiP" | "AGN" | "Sy1" | "Sy2" | "QSO" => Some(DeepSkyKind::Galaxy),
            "PN" => Some(DeepSkyKind::Planetary),
            "HII" | "RNe" => Some(DeepSkyKind::Nebula),
            "SNR" => Some(DeepSkyKind::Supernova),
            "Cl*" | "GlC" | "OpC" | "As*" => Some(DeepSkyKind::Cluster),
            _ => None,
        }
    }
}

/// A catalogued deep-sky object.
#[derive(Debug, Clone, PartialEq)]
pub struct DeepSkyEntry {
    pub id: u32,
    pub name: String,
    pub kind: DeepSkyKind,
    /// Right Ascension in hours [0, 24), J2000
    pub ra_hours: f64,
    /// Declination in degrees, J2000
    pub dec_deg: f64,
    pub magnitude: f64,
    pub size_arcmin: f64,
    pub constellation: String,
    pub description: String,
}

/// Feed record; only the four SIMBAD columns are guaranteed, the rest are
/// carried when a richer mirror provides them.
#[derive(Debug, Deserialize)]
struct FeedRecord {
    main_id: String,
    ra_deg: f64,
    dec_deg: f64,
    otype: String,
    #[serde(default = "default_magnitude")]
    mag: f64,
    #[serde(default = "default_size")]
    size_arcmin: f64,
    #[serde(default)]
    constellation: String,
    #[serde(default)]
    description: String,
}

// Typical Messier-class defaults for feeds that omit photometry.
fn default_magnitude() -> f64 {
    8.0
}

fn default_size() -> f64 {
    10.0
}

/// Per-ingest counters for the deep-sky feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeepSkyStats {
    pub records: usize,
    pub kept: usize,
    pub unmapped_type: usize,
}

/// Parse the JSON feed. Unknown `otype` codes are skipped and counted.
pub fn from_json<R: io::Read>(reader: R) -> Result<(Vec<DeepSkyEntry>, DeepSkyStats), DeepSkyError> {
    let records: Vec<FeedRecord> = serde_json::from_reader(reader)?;
    let mut stats = DeepSkyStats {
        records: records.len(),
        ..Default::default()
    };

    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        let Some(kind) = DeepSkyKind::from_otype(&record.otype) else {
            stats.unmapped_type += 1;
            debug!("unmapped deep-sky otype `{}` for {}", record.otype, record.main_id);
            continue;
        };
        entries.push(DeepSkyEntry {
            id: entries.len() as u32 + 1,
            name: record.main_id,
            kind,
            // Feed RA is degrees; the engine works in hours.
            ra_hours: record.ra_deg / 15.0,
            dec_deg: record.dec_deg,
            magnitude: record.mag,
            size_arcmin: record.size_arcmin,
            constellation: record.constellation,
            description: record.description,
        });
    }

    stats.kept = entries.len();
    if entries.is_empty() {
        return Err(DeepSkyError::Empty);
    }
    Ok((entries, stats))
}

/// Bundled fallback: a hand-picked Messier (plus southern showpiece) subset.
pub fn bundled() -> Vec<DeepSkyEntry> {
    // Format: (name, kind, RA hours, Dec degrees, Vmag, size arcmin,
    //          constellation, description)
    #[rustfmt::skip]
    let objects: &[(&str, DeepSkyKind, f64, f64, f64, f64, &str, &str)] = &[
        ("M31 Andromeda Galaxy",   DeepSkyKind::Galaxy,     0.712,  41.269,  3.4, 178.0, "Andromeda",        "Nearest large spiral galaxy"),
        ("M33 Triangulum Galaxy",  DeepSkyKind::Galaxy,     1.565,  30.660,  5.7,  62.0, "Triangulum",       "Face-on spiral of the Local Group"),
        ("M42 Orion Nebula",       DeepSkyKind::Nebula,     5.588,  -5.391,  4.0,  65.0, "Orion",            "Bright star-forming region in Orion's sword"),
        ("M45 Pleiades",           DeepSkyKind::Cluster,    3.790,  24.117,  1.6, 110.0, "Taurus",           "The Seven Sisters open cluster"),
        ("M44 Beehive Cluster",    DeepSkyKind::Cluster,    8.670,  19.983,  3.7,  95.0, "Cancer",           "Naked-eye open cluster"),
        ("M13 Hercules Cluster",   DeepSkyKind::Cluster,   16.695,  36.460,  5.8,  20.0, "Hercules",         "Northern showpiece globular cluster"),
        ("Omega Centauri",         DeepSkyKind::Cluster,   13.446, -47.479,  3.9,  36.0, "Centaurus",        "Largest globular cluster of the Milky Way"),
        ("47 Tucanae",             DeepSkyKind::Cluster,    0.401, -72.081,  4.1,  31.0, "Tucana",           "Southern globular beside the SMC"),
        ("M57 Ring Nebula",        DeepSkyKind::Planetary, 18.893,  33.029,  8.8,   1.4, "Lyra",             "Classic planetary nebula ring"),
        ("M27 Dumbbell Nebula",    DeepSkyKind::Planetary, 19.994,  22.721,  7.5,   8.0, "Vulpecula",        "Bright, large planetary nebula"),
        ("M1 Crab Nebula",         DeepSkyKind::Supernova,  5.575,  22.014,  8.4,   6.0, "Taurus",           "Remnant of the 1054 supernova"),
        ("M8 Lagoon Nebula",       DeepSkyKind::Nebula,    18.060, -24.387,  6.0,  90.0, "Sagittarius",      "Emission nebula near the galactic center"),
        ("Carina Nebula",          DeepSkyKind::Nebula,    10.752, -59.867,  1.0, 120.0, "Carina",           "Vast southern star-forming complex"),
        ("M51 Whirlpool Galaxy",   DeepSkyKind::Galaxy,    13.497,  47.195,  8.4,  11.0, "Canes Venatici",   "Interacting face-on spiral"),
        ("M81 Bode's Galaxy",      DeepSkyKind::Galaxy,     9.926,  69.065,  6.9,  27.0, "Ursa Major",       "Bright spiral paired with M82"),
        ("M104 Sombrero Galaxy",   DeepSkyKind::Galaxy,    12.666, -11.623,  8.0,   9.0, "Virgo",            "Edge-on spiral with a dust lane"),
    ];

    objects
        .iter()
        .enumerate()
        .map(|(i, &(name, kind, ra_hours, dec_deg, mag, size, con, desc))| DeepSkyEntry {
            id: i as u32 + 1,
            name: name.to_string(),
            kind,
            ra_hours,
            dec_deg,
            magnitude: mag,
            size_arcmin: size,
            constellation: con.to_string(),
            description: desc.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otype_map() {
        assert_eq!(DeepSkyKind::from_otype("G"), Some(DeepSkyKind::Galaxy));
        assert_eq!(DeepSkyKind::from_otype("QSO"), Some(DeepSkyKind::Galaxy));
        assert_eq!(DeepSkyKind::from_otype("Sy2"), Some(DeepSkyKind::Galaxy));
        assert_eq!(DeepSkyKind::from_otype("PN"), Some(DeepSkyKind::Planetary));
        assert_eq!(DeepSkyKind::from_otype("HII"), Some(DeepSkyKind::Nebula));
        assert_eq!(DeepSkyKind::from_otype("RNe"), Some(DeepSkyKind::Nebula));
        assert_eq!(DeepSkyKind::from_otype("SNR"), Some(DeepSkyKind::Supernova));
        assert_eq!(DeepSkyKind::from_otype("GlC"), Some(DeepSkyKind::Cluster));
        assert_eq!(DeepSkyKind::from_otype("As*"), Some(DeepSkyKind::Cluster));
        assert_eq!(DeepSkyKind::from_otype("**"), None);
        assert_eq!(DeepSkyKind::from_otype(""), None);
    }

    #[test]
    fn test_feed_parse_and_ra_normalization() {
        let feed = r#"[
            {"main_id": "M  31", "ra_deg": 10.685, "dec_deg": 41.269, "otype": "G"},
            {"main_id": "M  57", "ra_deg": 283.396, "dec_deg": 33.029, "otype": "PN"},
            {"main_id": "HD 1",  "ra_deg": 1.0,    "dec_deg": 2.0,    "otype": "**"}
        ]"#;

        let (entries, stats) = from_json(feed.as_bytes()).unwrap();
        assert_eq!(stats.records, 3);
        assert_eq!(stats.kept, 2);
        assert_eq!(stats.unmapped_type, 1);

        let m31 = &entries[0];
        assert_eq!(m31.kind, DeepSkyKind::Galaxy);
        assert!((m31.ra_hours - 10.685 / 15.0).abs() < 1e-12, "RA must be deg/15");
        assert_eq!(m31.magnitude, 8.0, "default magnitude when feed omits it");
    }

    #[test]
    fn test_feed_all_unmapped_is_empty() {
        let feed = r#"[{"main_id": "X", "ra_deg": 0.0, "dec_deg": 0.0, "otype": "zzz"}]"#;
        assert!(matches!(from_json(feed.as_bytes()), Err(DeepSkyError::Empty)));
    }

    #[test]
    fn test_feed_bad_json() {
        assert!(matches!(from_json(&b"not json"[..]), Err(DeepSkyError::Json(_))));
    }

    #[test]
    fn test_bundled_ids_unique() {
        let objects = bundled();
        assert!(objects.len() >= 12);
        let mut ids: Vec<u32> = objects.iter().map(|o| o.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), objects.len());
    }
}
