//! Tests for region statistics, comparisons and the engine memo

mod common;

use brand_atlas::processing::{compare, summarize_comparison};
use brand_atlas::{
    compare_brands, compute_region_stats, Brand, BrandCatalog, Engine, FactsTable, FilterState,
    GeometryStore, Leader, LocationPoint, RegionComparison,
};
use common::*;
use std::collections::BTreeSet;

fn all_brands() -> BTreeSet<Brand> {
    Brand::ALL.into_iter().collect()
}

fn sample_points() -> Vec<LocationPoint> {
    let mut points = Vec::new();
    points.extend(points_in(Brand::Kfc, 0.0, 0.0, 3));
    points.extend(points_in(Brand::McDonalds, 0.0, 0.0, 3));
    points.extend(points_in(Brand::Subway, 0.0, 0.0, 5));
    points.extend(points_in(Brand::Nandos, 0.0, 0.0, 1));
    // Outside the region.
    points.extend(points_in(Brand::Dominos, 5.0, 5.0, 4));
    points
}

#[test]
fn test_counts_and_ordering() {
    let catalog = BrandCatalog::default();
    let region = square_region("Unit", 0.0, 0.0, 1.0);
    let stats = compute_region_stats(&catalog, &region, &sample_points(), &all_brands());

    assert_eq!(stats.region_name, "Unit");
    assert_eq!(stats.total_points, 12);
    let order: Vec<(Brand, u32)> = stats.brands.iter().map(|b| (b.brand, b.count)).collect();
    // McDonald's precedes KFC on equal counts: catalog order, not input order.
    assert_eq!(
        order,
        vec![
            (Brand::Subway, 5),
            (Brand::McDonalds, 3),
            (Brand::Kfc, 3),
            (Brand::Nandos, 1)
        ]
    );
    assert_eq!(stats.brands[0].percent, 42);
    assert_eq!(stats.brands[1].percent, 25);
    assert_eq!(stats.brands[3].percent, 8);
    assert_eq!(stats.brands[0].color, "#008C15");
}

#[test]
fn test_percent_rounds_half_up() {
    let catalog = BrandCatalog::default();
    let region = square_region("Unit", 0.0, 0.0, 1.0);
    let mut points = points_in(Brand::Kfc, 0.0, 0.0, 1);
    points.extend(points_in(Brand::Subway, 0.0, 0.0, 7));
    let stats = compute_region_stats(&catalog, &region, &points, &all_brands());
    // 1/8 = 12.5% and 7/8 = 87.5%
    assert_eq!(stats.brands[0].percent, 88);
    assert_eq!(stats.brands[1].percent, 13);
}

#[test]
fn test_percent_sum_within_rounding_tolerance() {
    let catalog = BrandCatalog::default();
    let region = square_region("Unit", 0.0, 0.0, 1.0);
    let mut points = Vec::new();
    for (i, brand) in Brand::ALL.into_iter().enumerate() {
        points.extend(points_in(brand, 0.0, 0.0, i * 2 + 1));
    }
    let stats = compute_region_stats(&catalog, &region, &points, &all_brands());
    let sum: i64 = stats.brands.iter().map(|b| i64::from(b.percent)).sum();
    assert!((sum - 100).abs() <= stats.brands.len() as i64);
}

#[test]
fn test_filter_excludes_inactive_brands() {
    let catalog = BrandCatalog::default();
    let region = square_region("Unit", 0.0, 0.0, 1.0);
    let active: BTreeSet<Brand> = [Brand::Kfc, Brand::Nandos].into_iter().collect();
    let stats = compute_region_stats(&catalog, &region, &sample_points(), &active);
    assert_eq!(stats.total_points, 4);
    assert_eq!(stats.brands.len(), 2);
    assert_eq!(stats.brands[0].percent, 75);
}

#[test]
fn test_empty_inputs_yield_zero_stats() {
    let catalog = BrandCatalog::default();
    let region = square_region("Unit", 0.0, 0.0, 1.0);

    let stats = compute_region_stats(&catalog, &region, &sample_points(), &BTreeSet::new());
    assert_eq!(stats.total_points, 0);
    assert!(stats.brands.is_empty());

    let stats = compute_region_stats(&catalog, &region, &Vec::<LocationPoint>::new(), &all_brands());
    assert_eq!(stats.total_points, 0);
    assert!(stats.brands.is_empty());
}

#[test]
fn test_boundary_and_malformed_points_skipped() {
    let catalog = BrandCatalog::default();
    let region = square_region("Unit", 0.0, 0.0, 1.0);
    let points = vec![
        LocationPoint::new(Brand::Kfc, 0.5, 0.0, "on west edge"),
        LocationPoint::new(Brand::Kfc, 1.0, 1.0, "on corner"),
        LocationPoint::new(Brand::Kfc, f64::NAN, 0.5, "broken"),
        LocationPoint::new(Brand::Kfc, 0.5, 0.5, "inside"),
    ];
    let stats = compute_region_stats(&catalog, &region, &points, &all_brands());
    assert_eq!(stats.total_points, 1);
}

#[test]
fn test_stats_are_idempotent() {
    let catalog = BrandCatalog::default();
    let region = square_region("Unit", 0.0, 0.0, 1.0);
    let points = sample_points();
    let first = compute_region_stats(&catalog, &region, &points, &all_brands());
    let second = compute_region_stats(&catalog, &region, &points, &all_brands());
    assert_eq!(first, second);
}

#[test]
fn test_index_candidates_match_full_scan() {
    let catalog = BrandCatalog::default();
    let regions = vec![
        square_region("A", 0.0, 0.0, 1.0),
        square_region("B", 5.0, 5.0, 1.0),
        square_region("C", 0.5, 0.0, 1.0),
    ];
    let points = sample_points();
    let store = GeometryStore::new(regions.clone(), points.clone());
    for region in &regions {
        let scanned = compute_region_stats(&catalog, region, &points, &all_brands());
        let indexed =
            compute_region_stats(&catalog, region, store.candidate_points(region), &all_brands());
        assert_eq!(scanned, indexed);
    }
}

#[test]
fn test_locate_region() {
    let store = GeometryStore::new(
        vec![square_region("West", 0.0, 0.0, 2.0), square_region("East", 2.0, 0.0, 2.0)],
        vec![],
    );
    assert_eq!(store.locate(1.0, 1.0).map(|r| r.name.as_str()), Some("West"));
    assert_eq!(store.locate(3.0, 1.0).map(|r| r.name.as_str()), Some("East"));
    assert!(store.locate(2.0, 1.0).is_none());
    assert!(store.locate(10.0, 10.0).is_none());
}

fn comparison_store() -> GeometryStore {
    let regions = vec![
        square_region("Quiet", 0.0, 0.0, 1.0),
        square_region("Busy", 2.0, 0.0, 1.0),
        square_region("Even", 4.0, 0.0, 1.0),
    ];
    let mut points = Vec::new();
    points.extend(points_in(Brand::McDonalds, 0.0, 0.0, 1));
    points.extend(points_in(Brand::McDonalds, 2.0, 0.0, 2));
    points.extend(points_in(Brand::Kfc, 2.0, 0.0, 6));
    points.extend(points_in(Brand::McDonalds, 4.0, 0.0, 2));
    points.extend(points_in(Brand::Kfc, 4.0, 0.0, 2));
    points.extend(points_in(Brand::Subway, 0.0, 0.0, 9));
    GeometryStore::new(regions, points)
}

#[test]
fn test_compare_table() {
    let store = comparison_store();
    let rows = compare_brands(&store, Brand::McDonalds, Brand::Kfc);
    assert_eq!(
        rows,
        vec![
            RegionComparison {
                region: "Busy".to_string(),
                count_a: 2,
                count_b: 6,
                leader: Leader::B
            },
            RegionComparison {
                region: "Even".to_string(),
                count_a: 2,
                count_b: 2,
                leader: Leader::Tie
            },
            RegionComparison {
                region: "Quiet".to_string(),
                count_a: 1,
                count_b: 0,
                leader: Leader::A
            },
        ]
    );
}

#[test]
fn test_leader_from_counts() {
    assert_eq!(Leader::from_counts(120, 80), Leader::A);
    assert_eq!(Leader::from_counts(80, 120), Leader::B);
    assert_eq!(Leader::from_counts(80, 80), Leader::Tie);
    assert_eq!(serde_json::to_value(Leader::Tie).unwrap(), "tie");
}

#[test]
fn test_compare_summary() {
    let summary = compare(&comparison_store(), Brand::McDonalds, Brand::Kfc);
    assert_eq!(summary.total_a, 5);
    assert_eq!(summary.total_b, 8);
    assert_eq!(summary.overall_leader, Leader::B);
    assert_eq!(summary.regions_led_by_a, 1);
    assert_eq!(summary.regions_led_by_b, vec!["Busy".to_string()]);
    let gap = summary.max_gap.expect("gap");
    assert_eq!(gap.region, "Busy");
    assert_eq!(gap.gap, 4);
    assert_eq!(gap.winner, Brand::Kfc);
}

#[test]
fn test_summary_without_gap() {
    let rows = vec![RegionComparison {
        region: "Even".to_string(),
        count_a: 3,
        count_b: 3,
        leader: Leader::Tie,
    }];
    let summary = summarize_comparison(Brand::Subway, Brand::Nandos, rows);
    assert!(summary.max_gap.is_none());
    assert_eq!(summary.overall_leader, Leader::Tie);
    assert!(summary.regions_led_by_b.is_empty());
}

fn engine() -> Engine {
    Engine::new(BrandCatalog::default(), comparison_store(), FactsTable::uk_itl1())
}

#[test]
fn test_engine_unknown_region_is_none() {
    let engine = engine();
    assert!(engine.region_stats("Atlantis", &engine.default_filter()).is_none());
}

#[test]
fn test_engine_memoizes_by_brand_set() {
    let engine = engine();
    let catalog = BrandCatalog::default();
    let all = engine.default_filter();

    let first = engine.region_stats("Busy", &all).unwrap();
    assert_eq!(engine.cached_entries(), 1);
    let again = engine.region_stats("Busy", &all).unwrap();
    assert_eq!(first, again);
    assert_eq!(engine.cached_entries(), 1);

    // Same brand set reached through a different path shares the entry.
    let toggled = FilterState::all(&catalog)
        .toggle_brand(Brand::Kfc)
        .toggle_brand(Brand::Kfc);
    engine.region_stats("Busy", &toggled).unwrap();
    assert_eq!(engine.cached_entries(), 1);

    let only_kfc = FilterState::all(&catalog).deselect_all_brands().toggle_brand(Brand::Kfc);
    let stats = engine.region_stats("Busy", &only_kfc).unwrap();
    assert_eq!(stats.total_points, 6);
    assert_eq!(engine.cached_entries(), 2);
}

#[test]
fn test_replacing_points_invalidates_memo() {
    let mut engine = engine();
    let all = engine.default_filter();
    assert_eq!(engine.region_stats("Quiet", &all).unwrap().total_points, 10);

    engine.replace_points(points_in(Brand::Nandos, 0.0, 0.0, 2));
    assert_eq!(engine.cached_entries(), 0);
    let stats = engine.region_stats("Quiet", &all).unwrap();
    assert_eq!(stats.total_points, 2);
    assert_eq!(stats.brands[0].brand, Brand::Nandos);
}
