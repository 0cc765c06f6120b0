use std::collections::HashSet;
use std::path::PathBuf;

use foundation::math::GeoPoint;
use serde_json::{Map, Value};
use tracing::warn;

use crate::config::DatasetConfig;
use crate::country::{CountryCollection, CountryFeature, CountryGeometry, Polygon};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected GeoJSON FeatureCollection")]
    NotAFeatureCollection,
    #[error("invalid feature at index {index}: {reason}")]
    InvalidFeature { index: usize, reason: String },
    #[error("duplicate country name: {0}")]
    DuplicateName(String),
}

impl CountryCollection {
    pub fn from_geojson_str(payload: &str, opts: &DatasetConfig) -> Result<Self, DatasetError> {
        let value: Value = serde_json::from_str(payload)?;
        Self::from_geojson_value(value, opts)
    }

    pub fn from_reader(reader: impl std::io::Read, opts: &DatasetConfig) -> Result<Self, DatasetError> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_geojson_value(value, opts)
    }

    /// Decodes a FeatureCollection of Polygon / MultiPolygon country features.
    ///
    /// Features with a `null` geometry are skipped; every other shape problem
    /// fails the whole load.
    pub fn from_geojson_value(value: Value, opts: &DatasetConfig) -> Result<Self, DatasetError> {
        let obj = value
            .as_object()
            .ok_or(DatasetError::NotAFeatureCollection)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(DatasetError::NotAFeatureCollection)?;
        if ty != "FeatureCollection" {
            return Err(DatasetError::NotAFeatureCollection);
        }

        let features_val = obj
            .get("features")
            .and_then(|v| v.as_array())
            .ok_or(DatasetError::NotAFeatureCollection)?;

        let mut seen: HashSet<String> = HashSet::with_capacity(features_val.len());
        let mut features = Vec::with_capacity(features_val.len());
        for (index, feat_val) in features_val.iter().enumerate() {
            let invalid = |reason: String| DatasetError::InvalidFeature { index, reason };

            let feat_obj = feat_val
                .as_object()
                .ok_or_else(|| invalid("feature must be an object".to_string()))?;

            let feat_type = feat_obj
                .get("type")
                .and_then(|v| v.as_str())
                .ok_or_else(|| invalid("feature missing type".to_string()))?;
            if feat_type != "Feature" {
                return Err(invalid(format!("unexpected feature type: {feat_type}")));
            }

            let properties = feat_obj
                .get("properties")
                .and_then(|v| v.as_object())
                .cloned()
                .unwrap_or_default();

            let name = feature_name(&properties, &opts.name_properties).ok_or_else(|| {
                invalid(format!(
                    "feature has none of the name properties {:?}",
                    opts.name_properties
                ))
            })?;

            let geometry_val = feat_obj
                .get("geometry")
                .ok_or_else(|| invalid("feature missing geometry".to_string()))?;
            if geometry_val.is_null() {
                warn!(index, %name, "skipping country feature without geometry");
                continue;
            }
            let geometry = parse_geometry(geometry_val).map_err(invalid)?;

            if !seen.insert(name.clone()) {
                return Err(DatasetError::DuplicateName(name));
            }

            features.push(CountryFeature {
                name,
                properties,
                geometry,
            });
        }

        Ok(Self::new(features))
    }
}

fn feature_name(properties: &Map<String, Value>, keys: &[String]) -> Option<String> {
    keys.iter()
        .filter_map(|k| properties.get(k).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_geometry(value: &Value) -> Result<CountryGeometry, String> {
    let obj = value
        .as_object()
        .ok_or("geometry must be an object".to_string())?;
    let ty = obj
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;

    let coords = obj
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;

    match ty {
        "Polygon" => Ok(CountryGeometry::Polygon(parse_polygon(coords)?)),
        "MultiPolygon" => Ok(CountryGeometry::MultiPolygon(parse_multi_polygon(coords)?)),
        other => Err(format!("unsupported geometry type for a country: {other}")),
    }
}

/// GeoJSON positions are `[lng, lat, ...]`.
fn parse_position(coords: &Value) -> Result<GeoPoint, String> {
    let arr = coords
        .as_array()
        .ok_or("position must be an array".to_string())?;
    if arr.len() < 2 {
        return Err("position must have [lng, lat]".to_string());
    }
    let lng = arr[0]
        .as_f64()
        .ok_or("position lng must be a number".to_string())?;
    let lat = arr[1]
        .as_f64()
        .ok_or("position lat must be a number".to_string())?;
    let point = GeoPoint::new(lat, lng);
    if !point.is_valid() {
        return Err(format!("position out of range: [{lng}, {lat}]"));
    }
    Ok(point)
}

fn parse_ring(coords: &Value) -> Result<Vec<GeoPoint>, String> {
    let arr = coords
        .as_array()
        .ok_or("ring must be an array of positions".to_string())?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        out.push(parse_position(item)?);
    }
    Ok(out)
}

fn parse_polygon(coords: &Value) -> Result<Polygon, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    let mut out = Vec::with_capacity(rings.len());
    for ring in rings {
        out.push(parse_ring(ring)?);
    }
    Ok(Polygon::new(out))
}

fn parse_multi_polygon(coords: &Value) -> Result<Vec<Polygon>, String> {
    let polys = coords
        .as_array()
        .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?;
    let mut out = Vec::with_capacity(polys.len());
    for poly in polys {
        out.push(parse_polygon(poly)?);
    }
    Ok(out)
}
