//! Point-in-region classification.
//!
//! Each polygon is tested with the even-odd rule over all of its rings
//! (exterior and holes alike): a point is inside when an odd number of rings
//! strictly contain it. A point lying exactly on any edge or vertex is
//! outside, so a point on a border shared by two regions is counted in
//! neither.
//!
//! Malformed rings (fewer than three distinct vertices, non-finite
//! coordinates) make their polygon contain nothing. This never errors.

use crate::types::Region;
use geo::{BoundingRect, Coord, LineString, Point, Polygon};

pub fn classify(point: &Point<f64>, region: &Region) -> bool {
    let (x, y) = point.x_y();
    if !x.is_finite() || !y.is_finite() {
        return false;
    }

    match region.geometry.bounding_rect() {
        Some(bbox) if bbox.min().x <= x && x <= bbox.max().x && bbox.min().y <= y && y <= bbox.max().y => {}
        _ => return false,
    }

    region
        .geometry
        .iter()
        .any(|polygon| polygon_contains(polygon, point.0))
}

pub fn polygon_contains(polygon: &Polygon<f64>, p: Coord<f64>) -> bool {
    let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());

    let mut inside_count = 0usize;
    for ring in rings {
        if !ring_is_valid(ring) {
            return false;
        }
        match ring_position(ring, p) {
            RingPosition::Boundary => return false,
            RingPosition::Inside => inside_count += 1,
            RingPosition::Outside => {}
        }
    }
    inside_count % 2 == 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RingPosition {
    Inside,
    Outside,
    Boundary,
}

fn ring_is_valid(ring: &LineString<f64>) -> bool {
    if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        return false;
    }
    let mut distinct: Vec<Coord<f64>> = Vec::with_capacity(ring.0.len());
    for c in &ring.0 {
        if !distinct.contains(c) {
            distinct.push(*c);
            if distinct.len() >= 3 {
                return true;
            }
        }
    }
    false
}

// Ray cast towards +x. The ring is treated as closed whether or not the
// last vertex repeats the first.
fn ring_position(ring: &LineString<f64>, p: Coord<f64>) -> RingPosition {
    let coords = &ring.0;
    let mut inside = false;
    let mut j = coords.len() - 1;
    for i in 0..coords.len() {
        let a = coords[i];
        let b = coords[j];
        if on_segment(a, b, p) {
            return RingPosition::Boundary;
        }
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    if inside {
        RingPosition::Inside
    } else {
        RingPosition::Outside
    }
}

fn on_segment(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> bool {
    let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
    cross == 0.0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}
