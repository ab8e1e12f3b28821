use crate::catalog::{Brand, Category};
use geo::{MultiPolygon, Point};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An administrative area: outer rings plus holes for every component polygon.
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationPoint {
    pub brand: Brand,
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

impl LocationPoint {
    pub fn new(brand: Brand, latitude: f64, longitude: f64, display_name: impl Into<String>) -> Self {
        Self {
            brand,
            latitude,
            longitude,
            display_name: display_name.into(),
        }
    }

    /// (lon, lat) as x/y, matching the region vertex order.
    pub fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandStat {
    pub brand: Brand,
    pub count: u32,
    pub percent: u32,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionStats {
    pub region_name: String,
    pub total_points: u32,
    pub brands: Vec<BrandStat>,
}

/// A figure that may be missing because a population or area fact is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "lowercase")]
pub enum Metric<T> {
    Available(T),
    Unavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Month,
    #[default]
    Quarter,
    Year,
}

impl Period {
    pub fn multiplier(self) -> i64 {
        match self {
            Period::Month => 1,
            Period::Quarter => 3,
            Period::Year => 12,
        }
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "month" => Ok(Period::Month),
            "quarter" => Ok(Period::Quarter),
            "year" => Ok(Period::Year),
            other => Err(anyhow::anyhow!("Unknown period: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrandDynamics {
    pub brand: Brand,
    pub change: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryDynamics {
    pub category: Category,
    pub change: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PopulationSource {
    /// Exact name hit in the facts table.
    Table,
    /// Case-insensitive substring hit against a table name.
    Matched,
    /// Hash-derived placeholder, not measured data.
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationFact {
    pub millions: f64,
    pub source: PopulationSource,
    pub matched_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub concentration_index: Metric<f64>,
    pub population_density: Metric<i64>,
    pub top3_share: u32,
    pub period: Period,
    pub brand_dynamics: Vec<BrandDynamics>,
    /// Not scaled by the period multiplier.
    pub category_dynamics: Vec<CategoryDynamics>,
    pub total_dynamics: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Leader {
    A,
    B,
    #[serde(rename = "tie")]
    Tie,
}

impl Leader {
    pub fn from_counts(a: u32, b: u32) -> Self {
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Leader::A,
            std::cmp::Ordering::Less => Leader::B,
            std::cmp::Ordering::Equal => Leader::Tie,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionComparison {
    pub region: String,
    pub count_a: u32,
    pub count_b: u32,
    pub leader: Leader,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxGap {
    pub region: String,
    pub gap: u32,
    pub winner: Brand,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub brand_a: Brand,
    pub brand_b: Brand,
    pub rows: Vec<RegionComparison>,
    pub total_a: u32,
    pub total_b: u32,
    pub overall_leader: Leader,
    pub regions_led_by_a: usize,
    pub regions_led_by_b: Vec<String>,
    pub max_gap: Option<MaxGap>,
}
