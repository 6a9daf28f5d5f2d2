//! Star catalog ingest.
//!
//! Parses the HYG-style delimited catalog (header row naming at least
//! `id, proper, ra, dec, mag, spect, bf`), filters to naked-eye stars,
//! resolves display names, and sorts brightest-first. A version-keyed
//! binary encoding of the result serves as the startup cache.

use std::io;

use log::debug;
use thiserror::Error;

/// Naked-eye magnitude cutoff applied at ingest.
pub const NAKED_EYE_LIMIT: f64 = 6.0;

const CACHE_MAGIC: &[u8; 4] = b"SKYC";
const CACHE_FORMAT: u16 = 1;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog header missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("catalog read failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("catalog contains no usable rows")]
    Empty,
    #[error("star cache is not in the expected format")]
    BadCache,
    #[error("star cache truncated")]
    TruncatedCache,
    #[error("star cache keyed by catalog version `{found}`, expected `{expected}`")]
    CacheVersionMismatch { expected: String, found: String },
}

/// A star from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct StarRecord {
    /// Catalog ID (HYG id; doubles as the HIP fallback display number)
    pub id: u32,
    /// Display name: proper name, else Bayer-Flamsteed code, else "HIP <id>"
    pub name: String,
    /// Right Ascension in hours [0, 24), J2000
    pub ra_hours: f64,
    /// Declination in degrees [-90, +90], J2000
    pub dec_deg: f64,
    /// Apparent visual magnitude
    pub apparent_mag: f64,
    /// Spectral class, first two characters ("G" when the catalog is silent)
    pub spectral_class: String,
}

/// Per-ingest counters, reported to the caller and surfaced in scene health.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub rows: usize,
    pub kept: usize,
    pub skipped_parse: usize,
    pub rejected_mag: usize,
}

/// Star catalog holding all loaded stars, brightest first.
#[derive(Debug, Clone)]
pub struct StarCatalog {
    stars: Vec<StarRecord>,
}

impl StarCatalog {
    /// Parse a delimited star catalog.
    ///
    /// Rows whose numeric fields fail to parse are skipped and counted;
    /// only a missing header column or an unreadable stream is fatal.
    pub fn from_hyg_csv<R: io::Read>(reader: R) -> Result<(Self, IngestStats), CatalogError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let column = |name: &'static str| -> Result<usize, CatalogError> {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(CatalogError::MissingColumn(name))
        };

        let col_id = column("id")?;
        let col_proper = column("proper")?;
        let col_ra = column("ra")?;
        let col_dec = column("dec")?;
        let col_mag = column("mag")?;
        let col_spect = column("spect")?;
        let col_bf = column("bf")?;

        let mut stars = Vec::new();
        let mut stats = IngestStats::default();

        for row in rdr.records() {
            let row = row?;
            stats.rows += 1;

            let field = |idx: usize| row.get(idx).unwrap_or("").trim();

            let parsed = (|| {
                let id: u32 = field(col_id).parse().ok()?;
                let ra: f64 = field(col_ra).parse().ok()?;
                let dec: f64 = field(col_dec).parse().ok()?;
                let mag: f64 = field(col_mag).parse().ok()?;
                Some((id, ra, dec, mag))
            })();

            let Some((id, ra_hours, dec_deg, apparent_mag)) = parsed else {
                stats.skipped_parse += 1;
                debug!("skipping unparseable catalog row {}", stats.rows);
                continue;
            };

            if apparent_mag > NAKED_EYE_LIMIT {
                stats.rejected_mag += 1;
                continue;
            }

            stars.push(StarRecord {
                id,
                name: resolve_name(field(col_proper), field(col_bf), id),
                ra_hours,
                dec_deg,
                apparent_mag,
                spectral_class: normalize_spectral(field(col_spect)),
            });
        }

        if stars.is_empty() {
            return Err(CatalogError::Empty);
        }

        stars.sort_by(|a, b| a.apparent_mag.total_cmp(&b.apparent_mag));
        stats.kept = stars.len();

        Ok((Self { stars }, stats))
    }

    /// Encode the catalog to the binary cache representation, keyed by the
    /// source catalog's version string.
    pub fn to_cache_bytes(&self, catalog_version: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(32 + self.stars.len() * 48);
        out.extend_from_slice(CACHE_MAGIC);
        out.extend_from_slice(&CACHE_FORMAT.to_le_bytes());

        let version = catalog_version.as_bytes();
        out.extend_from_slice(&(version.len() as u16).to_le_bytes());
        out.extend_from_slice(version);

        out.extend_from_slice(&(self.stars.len() as u32).to_le_bytes());
        for star in &self.stars {
            out.extend_from_slice(&star.id.to_le_bytes());
            out.extend_from_slice(&star.ra_hours.to_le_bytes());
            out.extend_from_slice(&star.dec_deg.to_le_bytes());
            out.extend_from_slice(&(star.apparent_mag as f32).to_le_bytes());

            let spect = star.spectral_class.as_bytes();
            out.push(spect.len() as u8);
            out.extend_from_slice(spect);

            let name = star.name.as_bytes();
            out.extend_from_slice(&(name.len() as u16).to_le_bytes());
            out.extend_from_slice(name);
        }
        out
    }

    /// Decode a binary cache, verifying the embedded catalog version key.
    pub fn from_cache_bytes(data: &[u8], expected_version: &str) -> Result<Self, CatalogError> {
        let mut r = ByteReader::new(data);

        if r.take(4)? != &CACHE_MAGIC[..] {
            return Err(CatalogError::BadCache);
        }
        if r.u16_le()? != CACHE_FORMAT {
            return Err(CatalogError::BadCache);
        }

        let version_len = r.u16_le()? as usize;
        let found = String::from_utf8(r.take(version_len)?.to_vec())
            .map_err(|_| CatalogError::BadCache)?;
        if found != expected_version {
            return Err(CatalogError::CacheVersionMismatch {
                expected: expected_version.to_string(),
                found,
            });
        }

        let count = r.u32_le()? as usize;
        let mut stars = Vec::with_capacity(count);
        for _ in 0..count {
            let id = r.u32_le()?;
            let ra_hours = r.f64_le()?;
            let dec_deg = r.f64_le()?;
            let apparent_mag = r.f32_le()? as f64;

            let spect_len = r.take(1)?[0] as usize;
            let spectral_class = String::from_utf8(r.take(spect_len)?.to_vec())
                .map_err(|_| CatalogError::BadCache)?;

            let name_len = r.u16_le()? as usize;
            let name = String::from_utf8(r.take(name_len)?.to_vec())
                .map_err(|_| CatalogError::BadCache)?;

            stars.push(StarRecord {
                id,
                name,
                ra_hours,
                dec_deg,
                apparent_mag,
                spectral_class,
            });
        }

        if stars.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { stars })
    }

    /// Bundled fallback: the brightest stars plus every star referenced by
    /// the built-in constellation figures. Used when neither cache nor
    /// network can supply the full catalog.
    pub fn bundled() -> Self {
        // Format: (name, HIP, RA hours, Dec degrees, Vmag, spectral class)
        #[rustfmt::skip]
        let bright_stars: &[(&str, u32, f64, f64, f64, &str)] = &[
            ("Sirius",           32349,  6.752, -16.716, -1.46, "A1"),
            ("Canopus",          30438,  6.399, -52.696, -0.72, "F0"),
            ("Rigil Kentaurus",  71683, 14.661, -60.834, -0.27, "G2"),
            ("Arcturus",         69673, 14.261,  19.182, -0.05, "K1"),
            ("Vega",             91262, 18.616,  38.784,  0.03, "A0"),
            ("Capella",          24608,  5.278,  45.998,  0.08, "G8"),
            ("Rigel",            24436,  5.242,  -8.202,  0.13, "B8"),
            ("Procyon",          37279,  7.655,   5.225,  0.34, "F5"),
            ("Betelgeuse",       27989,  5.919,   7.407,  0.42, "M1"),
            ("Achernar",          7588,  1.629, -57.237,  0.46, "B6"),
            ("Hadar",            68702, 14.064, -60.373,  0.61, "B1"),
            ("Altair",           97649, 19.846,   8.868,  0.77, "A7"),
            ("Acrux",            60718, 12.443, -63.099,  0.77, "B0"),
            ("Aldebaran",        21421,  4.599,  16.509,  0.85, "K5"),
            ("Antares",          80763, 16.490, -26.432,  0.96, "M1"),
            ("Spica",            65474, 13.420, -11.161,  0.97, "B1"),
            ("Pollux",           37826,  7.755,  28.026,  1.14, "K0"),
            ("Fomalhaut",       113368, 22.961, -29.622,  1.16, "A4"),
            ("Deneb",           102098, 20.690,  45.280,  1.25, "A2"),
            ("Mimosa",           62434, 12.795, -59.689,  1.25, "B0"),
            ("Regulus",          49669, 10.140,  11.967,  1.35, "B8"),
            ("Adhara",           33579,  6.977, -28.972,  1.50, "B2"),
            ("Castor",           36850,  7.577,  31.888,  1.58, "A1"),
            ("Gacrux",           61084, 12.519, -57.113,  1.63, "M3"),
            ("Shaula",           85927, 17.560, -37.104,  1.62, "B2"),
            ("Bellatrix",        25336,  5.419,   6.350,  1.64, "B2"),
            ("Elnath",           25428,  5.438,  28.608,  1.65, "B7"),
            ("Miaplacidus",      45238,  9.220, -69.717,  1.68, "A1"),
            ("Alnilam",          26311,  5.603,  -1.202,  1.69, "B0"),
            ("Alnair",          109268, 22.137, -46.961,  1.74, "B6"),
            ("Alnitak",          26727,  5.679,  -1.943,  1.77, "O9"),
            ("Alioth",           62956, 12.900,  55.960,  1.77, "A1"),
            ("Dubhe",            54061, 11.062,  61.751,  1.79, "K0"),
            ("Mirfak",           15863,  3.405,  49.861,  1.80, "F5"),
            ("Wezen",            34444,  7.140, -26.393,  1.84, "F8"),
            ("Sargas",           86228, 17.622, -42.998,  1.87, "F1"),
            ("Kaus Australis",   90185, 18.403, -34.385,  1.85, "B9"),
            ("Avior",            41037,  8.375, -59.510,  1.86, "K3"),
            ("Alkaid",           67301, 13.792,  49.313,  1.86, "B3"),
            ("Menkalinan",       28360,  5.992,  44.948,  1.90, "A1"),
            ("Atria",            82273, 16.811, -69.028,  1.92, "K2"),
            ("Alhena",           31681,  6.629,  16.399,  1.93, "A1"),
            ("Peacock",         100751, 20.427, -56.735,  1.94, "B2"),
            ("Alsephina",        42913,  8.745, -54.709,  1.96, "A1"),
            ("Mirzam",           30324,  6.378, -17.956,  1.98, "B1"),
            ("Polaris",          11767,  2.530,  89.264,  2.02, "F7"),
            ("Alphard",          46390,  9.460,  -8.659,  2.00, "K3"),
            ("Hamal",             9884,  2.120,  23.463,  2.00, "K1"),
            ("Diphda",            3419,  0.727, -17.987,  2.02, "K0"),
            ("Nunki",            92855, 18.921, -26.297,  2.02, "B2"),
            ("Menkent",          68933, 14.111, -36.370,  2.06, "K0"),
            // Constellation-figure stars beyond the top 50
            ("Saiph",            27366,  5.796,  -9.670,  2.07, "B0"),
            ("Kochab",           72607, 14.845,  74.156,  2.07, "K4"),
            ("Mintaka",          25930,  5.533,  -0.299,  2.25, "O9"),
            ("Denebola",         57632, 11.818,  14.572,  2.14, "A3"),
            ("Mizar",            65378, 13.399,  54.925,  2.23, "A1"),
            ("Sadr",            100453, 20.371,  40.257,  2.23, "F8"),
            ("Schedar",           3179,  0.675,  56.537,  2.24, "K0"),
            ("Caph",               746,  0.153,  59.150,  2.28, "F2"),
            ("Dschubba",         78401, 16.006, -22.622,  2.29, "B0"),
            ("Merak",            53910, 11.031,  56.382,  2.34, "A1"),
            ("Izar",             72105, 14.750,  27.074,  2.37, "K0"),
            ("Phecda",           58001, 11.897,  53.695,  2.41, "A0"),
            ("Aludra",           35904,  7.401, -29.303,  2.45, "B5"),
            ("Navi",              4427,  0.945,  60.717,  2.47, "B0"),
            ("Aljanah",         102488, 20.770,  33.970,  2.48, "K0"),
            ("Zosma",            54872, 11.235,  20.524,  2.56, "A4"),
            ("Algieba",          50583, 10.333,  19.842,  2.61, "K1"),
            ("Ruchbah",           6686,  1.430,  60.235,  2.68, "A5"),
            ("Tarazed",          97278, 19.771,  10.613,  2.72, "K3"),
            ("Imai",             59747, 12.252, -58.749,  2.79, "B2"),
            ("Pherkad",          75097, 15.345,  71.834,  3.00, "A3"),
            ("Albireo",          95947, 19.512,  27.960,  3.08, "K3"),
            ("Sulafat",          93194, 18.982,  32.690,  3.25, "B9"),
            ("Megrez",           59774, 12.257,  57.033,  3.32, "A3"),
            ("Segin",             8886,  1.907,  63.670,  3.35, "B3"),
            ("Sheliak",          92420, 18.835,  33.363,  3.52, "B7"),
        ];

        let mut stars: Vec<StarRecord> = bright_stars
            .iter()
            .map(|&(name, id, ra_hours, dec_deg, mag, spect)| StarRecord {
                id,
                name: name.to_string(),
                ra_hours,
                dec_deg,
                apparent_mag: mag,
                spectral_class: spect.to_string(),
            })
            .collect();

        stars.sort_by(|a, b| a.apparent_mag.total_cmp(&b.apparent_mag));
        Self { stars }
    }

    /// All stars, brightest first.
    pub fn stars(&self) -> &[StarRecord] {
        &self.stars
    }

    /// Stars at or brighter than the given magnitude limit.
    pub fn brighter_than(&self, mag_limit: f64) -> impl Iterator<Item = &StarRecord> {
        self.stars.iter().filter(move |s| s.apparent_mag <= mag_limit)
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }
}

/// Display-name precedence: proper name, else Bayer-Flamsteed, else HIP id.
fn resolve_name(proper: &str, bf: &str, id: u32) -> String {
    if !proper.is_empty() {
        proper.to_string()
    } else if !bf.is_empty() {
        bf.to_string()
    } else {
        format!("HIP {id}")
    }
}

/// First two characters of the spectral type, "G" when absent.
fn normalize_spectral(spect: &str) -> String {
    if spect.is_empty() {
        "G".to_string()
    } else {
        spect.chars().take(2).collect()
    }
}

/// Bounds-checked little-endian byte cursor for cache decoding.
struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], CatalogError> {
        let end = self.offset.checked_add(n).ok_or(CatalogError::TruncatedCache)?;
        if end > self.data.len() {
            return Err(CatalogError::TruncatedCache);
        }
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn u16_le(&mut self) -> Result<u16, CatalogError> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32_le(&mut self) -> Result<u32, CatalogError> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn f32_le(&mut self) -> Result<f32, CatalogError> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn f64_le(&mut self) -> Result<f64, CatalogError> {
        let b = self.take(8)?;
        Ok(f64::from_le_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }
}
