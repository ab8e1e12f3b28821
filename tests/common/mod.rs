#![allow(dead_code)]

use brand_atlas::{Brand, LocationPoint, Region};
use geo::{LineString, MultiPolygon, Polygon};

pub fn ring(coords: &[(f64, f64)]) -> LineString<f64> {
    LineString::from(coords.to_vec())
}

/// Axis-aligned square with its lower-left corner at `(x, y)`.
pub fn square_ring(x: f64, y: f64, size: f64) -> LineString<f64> {
    ring(&[
        (x, y),
        (x + size, y),
        (x + size, y + size),
        (x, y + size),
        (x, y),
    ])
}

pub fn square_region(name: &str, x: f64, y: f64, size: f64) -> Region {
    Region {
        name: name.to_string(),
        geometry: MultiPolygon::new(vec![Polygon::new(square_ring(x, y, size), vec![])]),
    }
}

pub fn region_with_rings(name: &str, exterior: LineString<f64>, holes: Vec<LineString<f64>>) -> Region {
    Region {
        name: name.to_string(),
        geometry: MultiPolygon::new(vec![Polygon::new(exterior, holes)]),
    }
}

/// `n` points of one brand spread inside the unit-offset square
/// `(x+0.1 .. x+0.9, y+0.5)`.
pub fn points_in(brand: Brand, x: f64, y: f64, n: usize) -> Vec<LocationPoint> {
    (0..n)
        .map(|i| {
            let lon = x + 0.1 + 0.8 * (i as f64 + 0.5) / n as f64;
            LocationPoint::new(brand, y + 0.5, lon, format!("{} #{}", brand, i))
        })
        .collect()
}
