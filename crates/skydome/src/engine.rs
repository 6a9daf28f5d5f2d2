//! The engine facade.
//!
//! An `Engine` owns the immutable catalogs produced by the loading phase
//! and exposes the single synchronous entry point `build_scene`. Scene
//! construction is a pure function of the catalogs and its arguments; the
//! only cross-call state is the per-satellite Dead flag, which is guarded
//! by a mutex so `build_scene` stays `&self`.

use log::{info, warn};
use parking_lot::Mutex;

use skydome_core::events::{self, AstroEvent};
use skydome_core::satellites::Satellite;
use skydome_core::{GeoLocation, SkyTime};

use crate::fetch::{Catalogs, LoadConfig};
use crate::processor;
use crate::scene::{Scene, SceneOptions};

pub struct Engine {
    catalogs: Catalogs,
    satellites: Mutex<Vec<Satellite>>,
}

impl Engine {
    /// Build an engine from loaded catalogs. TLE sets SGP4 rejects are
    /// dropped here, fail-soft.
    pub fn new(catalogs: Catalogs) -> Self {
        let mut satellites = Vec::with_capacity(catalogs.tles.len());
        for tle in &catalogs.tles {
            match Satellite::from_tle(tle) {
                Ok(sat) => satellites.push(sat),
                Err(e) => warn!("dropping satellite {}: {e}", tle.name),
            }
        }

        info!(
            "engine ready: {} stars, {} deep-sky, {} minor bodies, {} satellites",
            catalogs.stars.len(),
            catalogs.deep_sky.len(),
            catalogs.minor_bodies.len(),
            satellites.len()
        );

        Self {
            catalogs,
            satellites: Mutex::new(satellites),
        }
    }

    /// Fully offline engine from the bundled catalogs.
    pub fn bundled() -> Self {
        Self::new(Catalogs::bundled())
    }

    /// Load catalogs per config (cache/network/bundled) and build.
    pub fn load(config: &LoadConfig) -> Self {
        Self::new(Catalogs::load(config))
    }

    pub fn catalogs(&self) -> &Catalogs {
        &self.catalogs
    }

    /// Build the scene for one observer and instant. Synchronous and
    /// non-suspending; equal inputs produce equal scenes.
    pub fn build_scene(
        &self,
        observer: GeoLocation,
        instant: SkyTime,
        options: SceneOptions,
    ) -> Scene {
        let mut satellites = self.satellites.lock();
        processor::build(&self.catalogs, &mut satellites, observer, instant, &options)
    }

    /// Upcoming astronomical events in `[from, from + days_ahead]`.
    pub fn upcoming_events(&self, from: &SkyTime, days_ahead: f64) -> Vec<AstroEvent> {
        events::upcoming_events(from, days_ahead)
    }
}
