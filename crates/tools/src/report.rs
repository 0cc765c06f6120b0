//! JSON reports printed by the `globe` CLI.

use std::collections::HashSet;

use foundation::math::GeoPoint;
use formats::{ConfigError, CountryCollection, GlobeConfig};
use layers::{CountryLayer, PinLayer, PinLayerSnapshot, ZoomRingTable};
use scene::{DeviceClass, PerspectiveCamera, PointerResolver, Sphere, SpatialIndex, Viewport};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilledCountry {
    pub name: String,
    pub polygons: usize,
    pub triangles: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub countries: usize,
    pub filled: Vec<FilledCountry>,
    pub skipped_polygons: usize,
    pub border_segments: usize,
}

/// Builds the globe geometry and summarizes it. An empty `marker_countries`
/// fills every country.
pub fn inspect(
    dataset: &CountryCollection,
    config: &GlobeConfig,
    marker_countries: &[String],
) -> InspectReport {
    let markers: HashSet<&str> = marker_countries.iter().map(String::as_str).collect();
    let snap = CountryLayer::from_config(1, config)
        .extract(dataset, |name| markers.is_empty() || markers.contains(name));
    InspectReport {
        countries: dataset.len(),
        filled: snap
            .countries
            .iter()
            .map(|c| FilledCountry {
                name: c.name.clone(),
                polygons: c.polygons.len(),
                triangles: c.polygons.iter().map(|m| m.triangle_count()).sum(),
            })
            .collect(),
        skipped_polygons: snap.skipped_polygons,
        border_segments: snap.borders.segment_count(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocateReport {
    pub lat: f64,
    pub lng: f64,
    pub country: Option<String>,
    /// `[lat, lng]` of the containing country's centroid.
    pub centroid: Option<[f64; 2]>,
}

pub fn locate(dataset: &CountryCollection, lat: f64, lng: f64) -> LocateReport {
    let index = SpatialIndex::new(dataset);
    let country = index.country_at(lat, lng);
    LocateReport {
        lat,
        lng,
        country: country.map(|c| c.name.clone()),
        centroid: country.and_then(|c| c.centroid()).map(|c| [c.lat, c.lng]),
    }
}

pub fn pins(
    config: &GlobeConfig,
    centroid: GeoPoint,
    count: u32,
    camera_distance: f64,
) -> Result<PinLayerSnapshot, ConfigError> {
    let zoom = ZoomRingTable::new(config.zoom_rings.clone())?;
    Ok(PinLayer::new(2, config.pins, zoom).extract(centroid, count, camera_distance))
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickRequest {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub focus: GeoPoint,
    pub distance: f64,
    pub device: DeviceClass,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickReport {
    pub x: f64,
    pub y: f64,
    pub camera_distance: f64,
    pub country: Option<String>,
    /// `[lat, lng]` under the pointer when the ray hits land.
    pub location: Option<[f64; 2]>,
}

/// Resolves a screen position against the base sphere, with the camera
/// orbiting `focus`.
pub fn pick(dataset: &CountryCollection, config: &GlobeConfig, req: &PickRequest) -> PickReport {
    let viewport = Viewport::sized(req.width, req.height);
    let camera =
        PerspectiveCamera::for_device(req.focus, req.distance, req.device, &config.camera, &viewport);
    let resolver = PointerResolver::new(SpatialIndex::new(dataset));
    let hit = resolver.resolve(
        req.x,
        req.y,
        &viewport,
        &camera,
        &Sphere::new(config.radii.sphere),
    );
    PickReport {
        x: req.x,
        y: req.y,
        camera_distance: camera.distance(),
        country: hit.map(|p| p.country.name.clone()),
        location: hit.map(|p| [p.location.lat, p.location.lng]),
    }
}
