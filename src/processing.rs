use crate::catalog::{Brand, BrandCatalog};
use crate::classify::classify;
use crate::metrics::percent_of;
use crate::store::GeometryStore;
use crate::types::{
    BrandStat, ComparisonSummary, Leader, LocationPoint, MaxGap, Region, RegionComparison,
    RegionStats,
};
use rayon::prelude::*;
use std::collections::BTreeSet;
use tracing::info;

/// Counts active-brand points inside `region`.
///
/// Brands with no points are omitted. The list is sorted by count
/// descending, ties in catalog enumeration order. An empty filter or point
/// set yields a zero-valued result, never an error.
pub fn compute_region_stats<'a, I>(
    catalog: &BrandCatalog,
    region: &Region,
    points: I,
    active_brands: &BTreeSet<Brand>,
) -> RegionStats
where
    I: IntoIterator<Item = &'a LocationPoint>,
{
    let mut counts = [0u32; Brand::ALL.len()];

    if !active_brands.is_empty() {
        for point in points {
            if active_brands.contains(&point.brand) && classify(&point.point(), region) {
                counts[point.brand.index()] += 1;
            }
        }
    }

    let total_points: u32 = counts.iter().sum();

    let mut brands: Vec<BrandStat> = Brand::ALL
        .into_iter()
        .filter(|b| counts[b.index()] > 0)
        .map(|brand| {
            let count = counts[brand.index()];
            BrandStat {
                brand,
                count,
                percent: percent_of(count, total_points),
                color: catalog.color(brand).to_string(),
            }
        })
        .collect();

    // Stable sort keeps enumeration order among equal counts.
    brands.sort_by(|a, b| b.count.cmp(&a.count));

    RegionStats {
        region_name: region.name.clone(),
        total_points,
        brands,
    }
}

fn count_pair(store: &GeometryStore, region: &Region, brand_a: Brand, brand_b: Brand) -> (u32, u32) {
    let mut count_a = 0;
    let mut count_b = 0;
    for point in store.candidate_points(region) {
        if point.brand != brand_a && point.brand != brand_b {
            continue;
        }
        if classify(&point.point(), region) {
            if point.brand == brand_a {
                count_a += 1;
            } else {
                count_b += 1;
            }
        }
    }
    (count_a, count_b)
}

/// Head-to-head table for two brands over every region, sorted by combined
/// count descending (dataset order among equal totals).
pub fn compare_brands(store: &GeometryStore, brand_a: Brand, brand_b: Brand) -> Vec<RegionComparison> {
    let mut rows: Vec<RegionComparison> = store
        .regions()
        .par_iter()
        .map(|region| {
            let (count_a, count_b) = count_pair(store, region, brand_a, brand_b);
            RegionComparison {
                region: region.name.clone(),
                count_a,
                count_b,
                leader: Leader::from_counts(count_a, count_b),
            }
        })
        .collect();

    rows.sort_by(|x, y| (y.count_a + y.count_b).cmp(&(x.count_a + x.count_b)));
    rows
}

pub fn summarize_comparison(brand_a: Brand, brand_b: Brand, rows: Vec<RegionComparison>) -> ComparisonSummary {
    let total_a = rows.iter().map(|r| r.count_a).sum();
    let total_b = rows.iter().map(|r| r.count_b).sum();

    let regions_led_by_a = rows.iter().filter(|r| r.leader == Leader::A).count();
    let regions_led_by_b = rows
        .iter()
        .filter(|r| r.leader == Leader::B)
        .map(|r| r.region.clone())
        .collect();

    let mut max_gap: Option<MaxGap> = None;
    for row in &rows {
        let gap = row.count_a.abs_diff(row.count_b);
        if gap > max_gap.as_ref().map_or(0, |m| m.gap) {
            max_gap = Some(MaxGap {
                region: row.region.clone(),
                gap,
                winner: if row.count_a > row.count_b { brand_a } else { brand_b },
            });
        }
    }

    ComparisonSummary {
        brand_a,
        brand_b,
        total_a,
        total_b,
        overall_leader: Leader::from_counts(total_a, total_b),
        regions_led_by_a,
        regions_led_by_b,
        max_gap,
        rows,
    }
}

pub fn compare(store: &GeometryStore, brand_a: Brand, brand_b: Brand) -> ComparisonSummary {
    info!("Comparing {} and {} across {} regions", brand_a, brand_b, store.regions().len());
    let rows = compare_brands(store, brand_a, brand_b);
    summarize_comparison(brand_a, brand_b, rows)
}
