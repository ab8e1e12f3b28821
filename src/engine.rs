use crate::catalog::{Brand, BrandCatalog};
use crate::filter::FilterState;
use crate::metrics::{derive_metrics, FactsTable};
use crate::processing::{compare, compute_region_stats};
use crate::store::GeometryStore;
use crate::types::{
    ComparisonSummary, DerivedMetrics, LocationPoint, Period, PopulationFact, RegionStats,
};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::{debug, info};

// (region name, active brands in enumeration order)
type StatsKey = (String, Vec<Brand>);

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionReport {
    pub stats: RegionStats,
    pub metrics: DerivedMetrics,
    pub population: PopulationFact,
    pub area_km2: Option<f64>,
}

/// Read-only datasets plus a memo of region statistics.
///
/// The memo is keyed by region and active brand set and is only cleared
/// when the point dataset is replaced.
pub struct Engine {
    catalog: BrandCatalog,
    store: GeometryStore,
    facts: FactsTable,
    stats_cache: RwLock<HashMap<StatsKey, RegionStats>>,
}

impl Engine {
    pub fn new(catalog: BrandCatalog, store: GeometryStore, facts: FactsTable) -> Self {
        Self {
            catalog,
            store,
            facts,
            stats_cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &BrandCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &GeometryStore {
        &self.store
    }

    pub fn default_filter(&self) -> FilterState {
        FilterState::all(&self.catalog)
    }

    pub fn replace_points(&mut self, points: Vec<LocationPoint>) {
        info!("Replacing point dataset ({} points)", points.len());
        self.store = self.store.with_points(points);
        self.stats_cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    pub fn cached_entries(&self) -> usize {
        self.stats_cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    /// `None` when no region has this name.
    pub fn region_stats(&self, region_name: &str, filter: &FilterState) -> Option<RegionStats> {
        let region = self.store.region(region_name)?;
        let key: StatsKey = (
            region_name.to_string(),
            filter.active_brands.iter().copied().collect(),
        );

        if let Some(hit) = self
            .stats_cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            return Some(hit.clone());
        }

        let stats = compute_region_stats(
            &self.catalog,
            region,
            self.store.candidate_points(region),
            &filter.active_brands,
        );
        debug!("Computed stats for {}: {} points", region_name, stats.total_points);

        self.stats_cache
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, stats.clone());
        Some(stats)
    }

    pub fn region_report(
        &self,
        region_name: &str,
        filter: &FilterState,
        period: Period,
    ) -> Option<RegionReport> {
        let stats = self.region_stats(region_name, filter)?;
        let population = self.facts.population(region_name);
        let area_km2 = self.facts.area(region_name);
        let metrics = derive_metrics(
            &self.catalog,
            &stats,
            filter,
            Some(population.millions),
            area_km2,
            period,
        );
        Some(RegionReport {
            stats,
            metrics,
            population,
            area_km2,
        })
    }

    pub fn compare(&self, brand_a: Brand, brand_b: Brand) -> ComparisonSummary {
        compare(&self.store, brand_a, brand_b)
    }
}
