use formats::{CountryCollection, GlobeConfig};
use tracing::{debug, info};

use crate::borders::append_ring_borders;
use crate::fill::{FillOptions, triangulate_polygon};
use crate::layer::{Layer, LayerId};
use crate::mesh::{BorderBuffer, Mesh};

/// Fill meshes for one country, one per successfully triangulated polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryMesh {
    pub name: String,
    pub polygons: Vec<Mesh>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CountryLayerSnapshot {
    pub countries: Vec<CountryMesh>,
    pub borders: BorderBuffer,
    /// Polygons of marker countries whose fill could not be built.
    pub skipped_polygons: usize,
}

impl CountryLayerSnapshot {
    pub fn country(&self, name: &str) -> Option<&CountryMesh> {
        self.countries.iter().find(|c| c.name == name)
    }

    pub fn triangle_count(&self) -> usize {
        self.countries
            .iter()
            .flat_map(|c| &c.polygons)
            .map(Mesh::triangle_count)
            .sum()
    }
}

/// Country fills and the aggregate border buffer for a whole dataset.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CountryLayer {
    id: LayerId,
    fill: FillOptions,
    border_radius: f64,
}

impl CountryLayer {
    pub fn new(id: u64, fill: FillOptions, border_radius: f64) -> Self {
        Self {
            id: LayerId(id),
            fill,
            border_radius,
        }
    }

    pub fn from_config(id: u64, config: &GlobeConfig) -> Self {
        Self::new(
            id,
            FillOptions::new(config.radii.fill, &config.mesh),
            config.radii.border,
        )
    }

    /// Builds fills for countries where `has_markers(name)` holds and borders
    /// for every country. Countries whose polygons all fail to triangulate are
    /// left out of `countries`.
    pub fn extract(
        &self,
        dataset: &CountryCollection,
        has_markers: impl Fn(&str) -> bool,
    ) -> CountryLayerSnapshot {
        let mut out = CountryLayerSnapshot::default();

        for feature in &dataset.features {
            for ring in feature.rings() {
                append_ring_borders(ring, self.border_radius, &mut out.borders);
            }

            if !has_markers(&feature.name) {
                continue;
            }
            let mut polygons = Vec::with_capacity(feature.polygons().len());
            for (index, polygon) in feature.polygons().iter().enumerate() {
                match triangulate_polygon(polygon, &self.fill) {
                    Some(mesh) => polygons.push(mesh),
                    None => {
                        debug!(country = %feature.name, polygon = index, "skipping fill");
                        out.skipped_polygons += 1;
                    }
                }
            }
            if !polygons.is_empty() {
                out.countries.push(CountryMesh {
                    name: feature.name.clone(),
                    polygons,
                });
            }
        }

        info!(
            layer = self.label(),
            layer_id = self.id().0,
            countries = dataset.len(),
            filled = out.countries.len(),
            triangles = out.triangle_count(),
            border_segments = out.borders.segment_count(),
            skipped = out.skipped_polygons,
            "built globe geometry"
        );
        out
    }
}

impl Layer for CountryLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn label(&self) -> &'static str {
        "countries"
    }
}
