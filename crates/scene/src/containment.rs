//! Point-in-country queries in planar lat/lng space.

use foundation::bounds::Aabb2;
use foundation::math::{GeoPoint, align_longitudes, planar_ring};
use formats::{CountryCollection, CountryFeature, Polygon};
use tracing::info;

/// One polygon with its rings moved into a single planar frame.
#[derive(Debug, Clone, PartialEq)]
struct PreparedPolygon {
    outer: Vec<GeoPoint>,
    holes: Vec<Vec<GeoPoint>>,
    bounds: Aabb2,
}

impl PreparedPolygon {
    fn new(polygon: &Polygon) -> Option<Self> {
        let outer = planar_ring(polygon.outer()?);
        if outer.len() < 3 {
            return None;
        }
        let bounds = Aabb2::from_points(outer.iter().map(|p| [p.lng, p.lat]))?;
        let center_lng = (bounds.min[0] + bounds.max[0]) * 0.5;
        let holes = polygon
            .holes()
            .iter()
            .map(|h| {
                let mut hole = planar_ring(h);
                align_longitudes(&mut hole, center_lng);
                hole
            })
            .filter(|h| h.len() >= 3)
            .collect();
        Some(Self {
            outer,
            holes,
            bounds,
        })
    }

    fn contains(&self, lat: f64, lng: f64) -> bool {
        // An unwrapped ring may extend past +-180; try the point in every
        // frame the ring's box reaches.
        [lng, lng + 360.0, lng - 360.0].into_iter().any(|x| {
            self.bounds.contains([x, lat])
                && point_in_ring(x, lat, &self.outer)
                && !self.holes.iter().any(|h| point_in_ring(x, lat, h))
        })
    }
}

/// Even-odd ray casting.
fn point_in_ring(lng: f64, lat: f64, ring: &[GeoPoint]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (ring[i].lng, ring[i].lat);
        let (xj, yj) = (ring[j].lng, ring[j].lat);
        if ((yi > lat) != (yj > lat)) && (lng < (xj - xi) * (lat - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Does `feature` contain the point? Holes are excluded.
pub fn feature_contains(feature: &CountryFeature, lat: f64, lng: f64) -> bool {
    feature
        .polygons()
        .iter()
        .filter_map(PreparedPolygon::new)
        .any(|p| p.contains(lat, lng))
}

/// First feature (in slice order) containing the point.
///
/// Unindexed: rings are prepared on every call. Use [`SpatialIndex`] for
/// repeated queries against the same dataset.
pub fn country_at(lat: f64, lng: f64, features: &[CountryFeature]) -> Option<&CountryFeature> {
    features.iter().find(|f| feature_contains(f, lat, lng))
}

#[derive(Debug, Clone, PartialEq)]
struct IndexedCountry {
    feature: usize,
    bounds: Aabb2,
    polygons: Vec<PreparedPolygon>,
}

/// Precomputed rings and bounding boxes for a dataset.
///
/// Answers match [`country_at`]: first containing country in dataset order.
#[derive(Debug, Clone)]
pub struct SpatialIndex<'a> {
    dataset: &'a CountryCollection,
    entries: Vec<IndexedCountry>,
}

impl<'a> SpatialIndex<'a> {
    pub fn new(dataset: &'a CountryCollection) -> Self {
        let entries: Vec<IndexedCountry> = dataset
            .features
            .iter()
            .enumerate()
            .filter_map(|(feature, f)| {
                let polygons: Vec<PreparedPolygon> =
                    f.polygons().iter().filter_map(PreparedPolygon::new).collect();
                let bounds = polygons
                    .iter()
                    .map(|p| p.bounds)
                    .reduce(Aabb2::union)?;
                Some(IndexedCountry {
                    feature,
                    bounds,
                    polygons,
                })
            })
            .collect();
        info!(
            countries = dataset.len(),
            indexed = entries.len(),
            "built country spatial index"
        );
        Self { dataset, entries }
    }

    pub fn dataset(&self) -> &'a CountryCollection {
        self.dataset
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index into `dataset.features` of the first country containing the point.
    pub fn country_index_at(&self, lat: f64, lng: f64) -> Option<usize> {
        self.entries
            .iter()
            .filter(|e| {
                [lng, lng + 360.0, lng - 360.0]
                    .into_iter()
                    .any(|x| e.bounds.contains([x, lat]))
            })
            .find(|e| e.polygons.iter().any(|p| p.contains(lat, lng)))
            .map(|e| e.feature)
    }

    pub fn country_at(&self, lat: f64, lng: f64) -> Option<&'a CountryFeature> {
        let index = self.country_index_at(lat, lng)?;
        self.dataset.features.get(index)
    }
}
