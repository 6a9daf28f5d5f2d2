//! Catalog loading.
//!
//! Loading is a separate phase from scene evaluation: it may hit the
//! network, may fail, and produces an immutable `Catalogs` value that is
//! moved into the `Engine`. Every source has a timeout and a bundled
//! fallback, so `load` itself never fails; a fresh install with no network
//! still yields a working engine.
//!
//! The star catalog additionally keeps a version-keyed binary cache on
//! disk: consulted before the network, rewritten after a successful fetch.
//! Writes go through a temp file and an atomic rename; the cache is
//! advisory and any corruption falls through to the other sources.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use thiserror::Error;

use skydome_core::catalog::{CatalogError, StarCatalog};
use skydome_core::deep_sky::{self, DeepSkyEntry, DeepSkyError};
use skydome_core::kepler::{self, MinorBody, MinorBodyError};
use skydome_core::satellites::{parse_tle_text, Tle, SAMPLE_TLES};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no URL configured for this source")]
    NoUrl,
    #[error("request failed: {0}")]
    Http(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    DeepSky(#[from] DeepSkyError),
    #[error(transparent)]
    MinorBody(#[from] MinorBodyError),
    #[error("TLE text contained no element sets")]
    EmptyTleSet,
}

/// One remote source: where to fetch and how long to wait.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub url: Option<String>,
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Full loader configuration. The default is fully offline: every source
/// resolves to its bundled fallback.
#[derive(Debug, Clone, Default)]
pub struct LoadConfig {
    pub stars: SourceConfig,
    /// Version key for the star cache; a cache written under a different
    /// key is ignored.
    pub catalog_version: String,
    /// Path of the binary star cache; None disables caching.
    pub cache_path: Option<PathBuf>,
    pub deep_sky: SourceConfig,
    pub minor_bodies: SourceConfig,
    pub tles: SourceConfig,
}

/// Immutable catalog state for an engine.
#[derive(Debug)]
pub struct Catalogs {
    pub stars: StarCatalog,
    pub deep_sky: Vec<DeepSkyEntry>,
    pub minor_bodies: Vec<MinorBody>,
    pub tles: Vec<Tle>,
}

impl Catalogs {
    /// Offline catalogs: bundled stars, Messier subset, the minor-body
    /// table, and the sample TLE set.
    pub fn bundled() -> Self {
        let (tles, _) = parse_tle_text(SAMPLE_TLES);
        Self {
            stars: StarCatalog::bundled(),
            deep_sky: deep_sky::bundled(),
            minor_bodies: kepler::bundled(),
            tles,
        }
    }

    /// Load every source per the config, falling back per source.
    pub fn load(config: &LoadConfig) -> Self {
        let stars = match load_stars(config) {
            Ok(stars) => stars,
            Err(e) => {
                warn!("star catalog unavailable ({e}); using bundled fallback");
                StarCatalog::bundled()
            }
        };

        let deep_sky = match load_deep_sky(&config.deep_sky) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("deep-sky feed unavailable ({e}); using bundled fallback");
                deep_sky::bundled()
            }
        };

        let minor_bodies = match load_minor_bodies(&config.minor_bodies) {
            Ok(bodies) => bodies,
            Err(e) => {
                warn!("minor-body feed unavailable ({e}); using bundled table");
                kepler::bundled()
            }
        };

        let tles = match load_tles(&config.tles) {
            Ok(tles) => tles,
            Err(e) => {
                warn!("TLE feed unavailable ({e}); using sample set");
                parse_tle_text(SAMPLE_TLES).0
            }
        };

        Self {
            stars,
            deep_sky,
            minor_bodies,
            tles,
        }
    }
}

fn http_get(source: &SourceConfig) -> Result<Vec<u8>, FetchError> {
    let url = source.url.as_deref().ok_or(FetchError::NoUrl)?;
    let agent = ureq::AgentBuilder::new().timeout(source.timeout).build();

    let response = agent
        .get(url)
        .call()
        .map_err(|e| FetchError::Http(e.to_string()))?;

    let mut body = Vec::new();
    response.into_reader().read_to_end(&mut body)?;
    Ok(body)
}

/// Cache, then network, then error (the caller falls back to bundled).
fn load_stars(config: &LoadConfig) -> Result<StarCatalog, FetchError> {
    if let Some(path) = &config.cache_path {
        match read_star_cache(path, &config.catalog_version) {
            Ok(catalog) => {
                info!("loaded {} stars from cache {}", catalog.len(), path.display());
                return Ok(catalog);
            }
            Err(e) => info!("star cache not usable ({e}); fetching"),
        }
    }

    let body = http_get(&config.stars)?;
    let (catalog, stats) = StarCatalog::from_hyg_csv(body.as_slice())?;
    info!(
        "star catalog: {} rows, {} kept, {} unparseable, {} too faint",
        stats.rows, stats.kept, stats.skipped_parse, stats.rejected_mag
    );

    if let Some(path) = &config.cache_path {
        if let Err(e) = write_star_cache(path, &catalog, &config.catalog_version) {
            warn!("could not write star cache {} ({e})", path.display());
        }
    }

    Ok(catalog)
}

fn read_star_cache(path: &Path, version: &str) -> Result<StarCatalog, FetchError> {
    let bytes = fs::read(path)?;
    Ok(StarCatalog::from_cache_bytes(&bytes, version)?)
}

/// Atomic cache write: temp file in the target directory, then rename.
/// Concurrent writers serialize on the rename; readers never observe a
/// partial file.
pub fn write_star_cache(
    path: &Path,
    catalog: &StarCatalog,
    version: &str,
) -> Result<(), FetchError> {
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&catalog.to_cache_bytes(version))?;
    tmp.persist(path).map_err(|e| FetchError::Io(e.error))?;
    Ok(())
}

fn load_deep_sky(source: &SourceConfig) -> Result<Vec<DeepSkyEntry>, FetchError> {
    let body = http_get(source)?;
    let (entries, stats) = deep_sky::from_json(body.as_slice())?;
    info!(
        "deep-sky feed: {} records, {} kept, {} unmapped types",
        stats.records, stats.kept, stats.unmapped_type
    );
    Ok(entries)
}

fn load_minor_bodies(source: &SourceConfig) -> Result<Vec<MinorBody>, FetchError> {
    let body = http_get(source)?;
    let (bodies, skipped) = kepler::from_json(body.as_slice())?;
    info!("minor-body feed: {} kept, {} skipped", bodies.len(), skipped);
    Ok(bodies)
}

fn load_tles(source: &SourceConfig) -> Result<Vec<Tle>, FetchError> {
    let body = http_get(source)?;
    let text = String::from_utf8_lossy(&body);
    let (tles, skipped) = parse_tle_text(&text);
    if tles.is_empty() {
        return Err(FetchError::EmptyTleSet);
    }
    info!("TLE feed: {} sets, {} malformed", tles.len(), skipped);
    Ok(tles)
}
