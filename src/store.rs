use crate::classify::classify;
use crate::types::{LocationPoint, Region};
use geo::{BoundingRect, Point};
use rstar::{RTree, RTreeObject, AABB};
use tracing::debug;

// Region bounding box keyed by position in the region list.
struct RegionEnvelope {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for RegionEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

struct IndexedPoint {
    index: usize,
    position: [f64; 2],
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

/// Region polygons and brand points, immutable once built.
///
/// Both collections are indexed with R-trees; the indexes only prune
/// candidates and every answer is confirmed with [`classify`].
pub struct GeometryStore {
    regions: Vec<Region>,
    points: Vec<LocationPoint>,
    region_tree: RTree<RegionEnvelope>,
    point_tree: RTree<IndexedPoint>,
}

impl GeometryStore {
    pub fn new(regions: Vec<Region>, points: Vec<LocationPoint>) -> Self {
        let region_items: Vec<RegionEnvelope> = regions
            .iter()
            .enumerate()
            .filter_map(|(index, region)| {
                // Empty or non-finite geometry cannot contain anything.
                let rect = region.geometry.bounding_rect()?;
                let (min, max) = (rect.min(), rect.max());
                if ![min.x, min.y, max.x, max.y].iter().all(|v| v.is_finite()) {
                    return None;
                }
                Some(RegionEnvelope {
                    index,
                    aabb: AABB::from_corners([min.x, min.y], [max.x, max.y]),
                })
            })
            .collect();

        let point_items: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.longitude.is_finite() && p.latitude.is_finite())
            .map(|(index, p)| IndexedPoint {
                index,
                position: [p.longitude, p.latitude],
            })
            .collect();

        debug!(
            "Indexed {} of {} regions and {} of {} points",
            region_items.len(),
            regions.len(),
            point_items.len(),
            points.len()
        );

        Self {
            region_tree: RTree::bulk_load(region_items),
            point_tree: RTree::bulk_load(point_items),
            regions,
            points,
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn points(&self) -> &[LocationPoint] {
        &self.points
    }

    pub fn region(&self, name: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.name == name)
    }

    /// Points whose position falls in the region's bounding box, in
    /// dataset order.
    pub fn candidate_points<'a>(&'a self, region: &Region) -> Vec<&'a LocationPoint> {
        let Some(rect) = region.geometry.bounding_rect() else {
            return Vec::new();
        };
        let envelope = AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]);
        let mut indices: Vec<usize> = self
            .point_tree
            .locate_in_envelope(&envelope)
            .map(|p| p.index)
            .collect();
        indices.sort_unstable();
        indices.into_iter().map(|i| &self.points[i]).collect()
    }

    /// The first region, in dataset order, that contains `(lon, lat)`.
    pub fn locate(&self, lon: f64, lat: f64) -> Option<&Region> {
        let point = Point::new(lon, lat);
        let envelope = AABB::from_point([lon, lat]);
        let mut hits: Vec<usize> = self
            .region_tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|r| r.index)
            .collect();
        hits.sort_unstable();
        hits.into_iter()
            .map(|i| &self.regions[i])
            .find(|region| classify(&point, region))
    }

    /// New store over the same regions with a different point set.
    pub fn with_points(&self, points: Vec<LocationPoint>) -> Self {
        Self::new(self.regions.clone(), points)
    }
}
