//! Observer-centric planetarium engine.
//!
//! Catalog loading (possibly network-backed, always with bundled
//! fallbacks) happens once up front and produces an [`Engine`]; scene
//! evaluation is then a synchronous pure function:
//!
//! ```
//! use skydome::{Engine, SceneOptions};
//! use skydome_core::{GeoLocation, SkyTime};
//!
//! let engine = Engine::bundled();
//! let scene = engine.build_scene(
//!     GeoLocation::new(37.77, -122.42),
//!     SkyTime::from_utc(2024, 8, 12, 6, 0, 0.0),
//!     SceneOptions::default(),
//! );
//! assert!(scene.stars.iter().all(|s| s.position.is_finite()));
//! ```

pub mod engine;
pub mod fetch;
pub mod processor;
pub mod queries;
pub mod scene;

pub use engine::Engine;
pub use fetch::{Catalogs, FetchError, LoadConfig, SourceConfig};
pub use processor::spectral_to_color;
pub use queries::{best_initial_view, visible_counts, VisibleCounts};
pub use scene::{
    BodyDisplay, ConstellationDisplay, DeepSkyDisplay, MinorBodyDisplay, MoonDisplay, Positioned,
    ProcessedStar, SatelliteDisplay, Scene, SceneHealth, SceneOptions, ShowerDisplay, SkyObject,
};
