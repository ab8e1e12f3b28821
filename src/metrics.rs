//! Derived regional metrics.
//!
//! All trend figures come from [`string_hash`], never from a random number
//! generator: the same region, brand and period always give the same number.

use crate::catalog::BrandCatalog;
use crate::filter::FilterState;
use crate::types::{
    BrandDynamics, CategoryDynamics, DerivedMetrics, Metric, Period, PopulationFact,
    PopulationSource, RegionStats,
};
use serde::Deserialize;

/// 32-bit string hash: `h = code(c) + ((h << 5) - h)` over code points,
/// wrapping exactly like two's-complement `i32`.
pub fn string_hash(s: &str) -> i32 {
    s.chars().fold(0i32, |h, c| {
        (c as u32 as i32).wrapping_add(h.wrapping_shl(5).wrapping_sub(h))
    })
}

fn abs_hash(s: &str) -> i64 {
    i64::from(string_hash(s)).abs()
}

/// `round(n / d)` with halves rounded up, for `d > 0`.
pub fn round_half_up_div(n: i64, d: i64) -> i64 {
    (2 * n + d).div_euclid(2 * d)
}

/// Integer percentage of `part` in `whole`, 0 when `whole` is 0.
pub fn percent_of(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    round_half_up_div(i64::from(part) * 100, i64::from(whole)) as u32
}

/// Points per 100k inhabitants, one decimal.
pub fn concentration_index(total_points: u32, population_millions: Option<f64>) -> Metric<f64> {
    match population_millions {
        Some(pop) if pop > 0.0 && pop.is_finite() => {
            let per_capita = f64::from(total_points) / (pop * 1_000_000.0);
            Metric::Available((per_capita * 100_000.0 * 10.0).round() / 10.0)
        }
        _ => Metric::Unavailable,
    }
}

/// Inhabitants per km².
pub fn population_density(population_millions: Option<f64>, area_km2: Option<f64>) -> Metric<i64> {
    match (population_millions, area_km2) {
        (Some(pop), Some(area)) if area > 0.0 && pop.is_finite() && area.is_finite() => {
            Metric::Available(((pop * 1_000_000.0) / area).round() as i64)
        }
        _ => Metric::Unavailable,
    }
}

/// Share of the three highest-count brands. Relies on `stats.brands` being
/// sorted by count.
pub fn top3_share(stats: &RegionStats) -> u32 {
    let top: u32 = stats.brands.iter().take(3).map(|b| b.count).sum();
    percent_of(top, stats.total_points)
}

/// Per-brand change in `[-6, 14]` before the period multiplier is applied.
pub fn brand_base_change(region: &str, brand: &str) -> i64 {
    abs_hash(&format!("{}:{}", region, brand)) % 21 - 6
}

pub fn brand_change(region: &str, brand: &str, period: Period) -> i64 {
    round_half_up_div(brand_base_change(region, brand) * period.multiplier(), 3)
}

/// Per-category change in `[-10, 14]`. The period multiplier is
/// deliberately not applied at this level.
pub fn category_change(region: &str, category: &str) -> i64 {
    abs_hash(&format!("{}:cat:{}", region, category)) % 25 - 10
}

/// Placeholder population in `[1.5, 6.0]` millions for unknown regions.
pub fn synthetic_population(region: &str) -> f64 {
    let tenths = (abs_hash(region) % 45) as f64;
    ((1.5 + tenths / 10.0) * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RegionFacts {
    pub region: String,
    pub population_millions: Option<f64>,
    pub area_km2: Option<f64>,
}

/// Region name → population/area lookup, in table order.
#[derive(Debug, Clone, Default)]
pub struct FactsTable {
    rows: Vec<RegionFacts>,
}

impl FactsTable {
    pub fn new(rows: Vec<RegionFacts>) -> Self {
        Self { rows }
    }

    /// Approximate figures for the UK ITL1 regions.
    pub fn uk_itl1() -> Self {
        let row = |region: &str, pop: f64, area: f64| RegionFacts {
            region: region.to_string(),
            population_millions: Some(pop),
            area_km2: Some(area),
        };
        Self::new(vec![
            row("North East", 2.65, 8_592.0),
            row("North West", 7.37, 14_108.0),
            row("Yorkshire and The Humber", 5.5, 15_408.0),
            row("East Midlands", 4.88, 15_627.0),
            row("West Midlands", 5.95, 12_998.0),
            row("East of England", 6.35, 19_116.0),
            row("London", 8.98, 1_572.0),
            row("South East", 9.22, 19_072.0),
            row("South West", 5.72, 23_836.0),
            row("Wales", 3.14, 20_779.0),
            row("Scotland", 5.45, 77_910.0),
            row("Northern Ireland", 1.9, 14_130.0),
        ])
    }

    pub fn rows(&self) -> &[RegionFacts] {
        &self.rows
    }

    fn find<T>(
        &self,
        region: &str,
        field: impl Fn(&RegionFacts) -> Option<T>,
    ) -> Option<(T, PopulationSource, &str)> {
        if let Some(row) = self.rows.iter().find(|r| r.region == region) {
            if let Some(v) = field(row) {
                return Some((v, PopulationSource::Table, row.region.as_str()));
            }
        }
        let wanted = region.to_lowercase();
        self.rows
            .iter()
            .filter_map(|r| field(r).map(|v| (v, r)))
            .find(|(_, r)| {
                let key = r.region.to_lowercase();
                wanted.contains(&key) || key.contains(&wanted)
            })
            .map(|(v, r)| (v, PopulationSource::Matched, r.region.as_str()))
    }

    /// Exact name, then case-insensitive substring either way, then a
    /// synthetic placeholder. Never fails.
    pub fn population(&self, region: &str) -> PopulationFact {
        match self.find(region, |r| r.population_millions.filter(|p| *p > 0.0)) {
            Some((millions, source, name)) => PopulationFact {
                millions,
                source,
                matched_name: Some(name.to_string()),
            },
            None => PopulationFact {
                millions: synthetic_population(region),
                source: PopulationSource::Synthetic,
                matched_name: None,
            },
        }
    }

    /// Same chain as [`FactsTable::population`] without the synthetic step.
    pub fn area(&self, region: &str) -> Option<f64> {
        self.find(region, |r| r.area_km2.filter(|a| *a > 0.0))
            .map(|(area, _, _)| area)
    }
}

/// Combines aggregated stats with population/area facts.
pub fn derive_metrics(
    catalog: &BrandCatalog,
    stats: &RegionStats,
    filter: &FilterState,
    population_millions: Option<f64>,
    area_km2: Option<f64>,
    period: Period,
) -> DerivedMetrics {
    let region = stats.region_name.as_str();

    let brand_dynamics: Vec<BrandDynamics> = stats
        .brands
        .iter()
        .filter(|b| filter.is_brand_active(b.brand))
        .map(|b| BrandDynamics {
            brand: b.brand,
            change: brand_change(region, b.brand.name(), period),
        })
        .collect();

    let category_dynamics = filter
        .active_categories
        .iter()
        .filter(|&&c| !filter.active_brands_in(catalog, c).is_empty())
        .map(|&category| CategoryDynamics {
            category,
            change: category_change(region, category.hash_id()),
        })
        .collect();

    let total_dynamics = brand_dynamics.iter().map(|d| d.change).sum();

    DerivedMetrics {
        concentration_index: concentration_index(stats.total_points, population_millions),
        population_density: population_density(population_millions, area_km2),
        top3_share: top3_share(stats),
        period,
        brand_dynamics,
        category_dynamics,
        total_dynamics,
    }
}
