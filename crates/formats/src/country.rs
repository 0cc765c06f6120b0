use foundation::bounds::Aabb2;
use foundation::math::{GeoPoint, Ring, planar_ring, ring_signed_area};
use serde_json::{Map, Value};

/// One polygon: `rings[0]` is the outer boundary, the rest are holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Ring>,
}

impl Polygon {
    pub fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    pub fn outer(&self) -> Option<&[GeoPoint]> {
        self.rings.first().map(Vec::as_slice)
    }

    pub fn holes(&self) -> &[Ring] {
        self.rings.get(1..).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CountryGeometry {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountryFeature {
    pub name: String,
    pub properties: Map<String, Value>,
    pub geometry: CountryGeometry,
}

impl CountryFeature {
    pub fn new(name: impl Into<String>, geometry: CountryGeometry) -> Self {
        Self {
            name: name.into(),
            properties: Map::new(),
            geometry,
        }
    }

    /// Uniform view over `Polygon` and `MultiPolygon` geometries.
    pub fn polygons(&self) -> &[Polygon] {
        match &self.geometry {
            CountryGeometry::Polygon(p) => std::slice::from_ref(p),
            CountryGeometry::MultiPolygon(ps) => ps,
        }
    }

    pub fn rings(&self) -> impl Iterator<Item = &Ring> + '_ {
        self.polygons().iter().flat_map(|p| p.rings.iter())
    }

    /// Vertex average of the outer ring of the largest polygon.
    ///
    /// "Largest" is by planar area of the outer ring in its planar frame, so an
    /// archipelago is centred on its main island instead of somewhere in the
    /// sea between islands. Returns `None` when no polygon has an outer ring.
    pub fn centroid(&self) -> Option<GeoPoint> {
        let outer = self
            .polygons()
            .iter()
            .filter_map(|p| p.outer())
            .map(planar_ring)
            .filter(|ring| !ring.is_empty())
            .max_by(|a, b| {
                ring_signed_area(a)
                    .abs()
                    .total_cmp(&ring_signed_area(b).abs())
            })?;

        let n = outer.len() as f64;
        let (sum_lat, sum_lng) = outer
            .iter()
            .fold((0.0, 0.0), |(la, ln), p| (la + p.lat, ln + p.lng));
        Some(GeoPoint::new(sum_lat / n, sum_lng / n).normalized())
    }

    /// Lng/lat bounding box of the raw coordinates (`min = [lng, lat]`).
    pub fn bounds(&self) -> Option<Aabb2> {
        Aabb2::from_points(self.rings().flatten().map(|p| [p.lng, p.lat]))
    }
}

/// A decoded country dataset, in the dataset's native feature order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountryCollection {
    pub features: Vec<CountryFeature>,
}

impl CountryCollection {
    pub fn new(features: Vec<CountryFeature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&CountryFeature> {
        self.features.iter().find(|f| f.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.features.iter().map(|f| f.name.as_str())
    }
}
