//! Brand location statistics over administrative regions.
//!
//! Loads region polygons and per-brand point datasets, counts which points
//! fall in each region under the active brand/category filter, and derives
//! concentration, density, top-3 share and hash-based dynamics figures.

pub mod catalog;
pub mod classify;
pub mod config;
pub mod data;
pub mod engine;
pub mod filter;
pub mod metrics;
pub mod processing;
pub mod server;
pub mod store;
pub mod types;

pub use catalog::{Brand, BrandCatalog, Category};
pub use classify::classify;
pub use engine::{Engine, RegionReport};
pub use filter::{FilterAction, FilterState};
pub use metrics::{derive_metrics, string_hash, FactsTable};
pub use processing::{compare_brands, compute_region_stats};
pub use store::GeometryStore;
pub use types::*;

use anyhow::Result;

/// Loads every configured dataset and builds an [`Engine`] over them.
pub fn build_engine(config: &config::AppConfig) -> Result<Engine> {
    let datasets = data::load_data(config)?;
    let store = GeometryStore::new(datasets.regions, datasets.points);
    Ok(Engine::new(BrandCatalog::default(), store, datasets.facts))
}
