//! Tunable constants for the globe.
//!
//! Every field has a default, so a JSON file only needs the values it
//! overrides:
//!
//! ```json
//! { "radii": { "fill": 1.02 }, "interaction": { "hover_throttle_ms": 16 } }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobeConfig {
    pub radii: RadiiConfig,
    pub camera: CameraConfig,
    pub pins: PinConfig,
    pub zoom_rings: Vec<ZoomRingLevel>,
    pub interaction: InteractionConfig,
    pub mesh: MeshConfig,
    pub dataset: DatasetConfig,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            radii: RadiiConfig::default(),
            camera: CameraConfig::default(),
            pins: PinConfig::default(),
            zoom_rings: default_zoom_rings(),
            interaction: InteractionConfig::default(),
            mesh: MeshConfig::default(),
            dataset: DatasetConfig::default(),
        }
    }
}

/// Sphere radii. Fill sits above the base sphere and borders above the fill
/// so the three surfaces never z-fight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadiiConfig {
    pub sphere: f64,
    pub fill: f64,
    pub border: f64,
}

impl Default for RadiiConfig {
    fn default() -> Self {
        Self {
            sphere: 1.0,
            fill: 1.01,
            border: 1.011,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub fov_deg: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Resting camera distance from the globe centre.
    pub distance: f64,
    /// Distance used when focusing a country.
    pub zoom_distance: f64,
    pub anim_duration_s: f64,
    pub desktop: DeviceProfile,
    pub mobile: DeviceProfile,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 2.5,
            zoom_distance: 1.8,
            anim_duration_s: 0.5,
            desktop: DeviceProfile {
                fov_deg: 55.0,
                min_zoom: 1.4,
                max_zoom: 4.0,
            },
            mobile: DeviceProfile {
                fov_deg: 80.0,
                min_zoom: 1.5,
                max_zoom: 8.0,
            },
        }
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        CameraConfig::default().desktop
    }
}

/// Marker ring packing around a country centroid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    /// Spacing unit in degrees.
    pub base_spread: f64,
    pub first_ring_capacity: u32,
    pub ring_radius_factor: f64,
    /// Per-ring angular offset in radians.
    pub stagger: f64,
    /// Fraction of a ring's circumference (in spread units) that gets a marker.
    pub capacity_density: f64,
    /// Floor on `cos(lat)` for the longitude correction.
    pub min_lng_correction_cos: f64,
    /// Radius markers are projected at.
    pub marker_radius: f64,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            base_spread: 1.5,
            first_ring_capacity: 5,
            ring_radius_factor: 0.8,
            stagger: 0.4,
            capacity_density: 0.7,
            min_lng_correction_cos: 0.3,
            marker_radius: 1.012,
        }
    }
}

/// One row of the zoom level-of-detail table. `max_distance: None` is the
/// unbounded catch-all row and must come last.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomRingLevel {
    pub max_distance: Option<f64>,
    pub visible_rings: u32,
}

impl ZoomRingLevel {
    pub fn new(max_distance: Option<f64>, visible_rings: u32) -> Self {
        Self {
            max_distance,
            visible_rings,
        }
    }
}

pub fn default_zoom_rings() -> Vec<ZoomRingLevel> {
    vec![
        ZoomRingLevel::new(Some(1.6), 6),
        ZoomRingLevel::new(Some(1.9), 4),
        ZoomRingLevel::new(Some(2.2), 3),
        ZoomRingLevel::new(Some(2.6), 2),
        ZoomRingLevel::new(None, 1),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub click_distance_px: f64,
    pub click_duration_ms: f64,
    pub hover_throttle_ms: f64,
    pub tap_threshold_px: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            click_distance_px: 5.0,
            click_duration_ms: 300.0,
            hover_throttle_ms: 50.0,
            tap_threshold_px: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Triangles whose longest planar edge exceeds this are bisected.
    pub max_edge_deg: f64,
    pub max_subdivision_depth: u32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            max_edge_deg: 3.0,
            max_subdivision_depth: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Feature properties tried in order for the country name.
    pub name_properties: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            name_properties: vec!["NAME".to_string(), "ADMIN".to_string(), "name".to_string()],
        }
    }
}

impl GlobeConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        let config: GlobeConfig = serde_json::from_str(payload)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let payload = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&payload)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        let r = &self.radii;
        if !(r.sphere > 0.0) {
            return invalid(format!("radii.sphere must be positive, got {}", r.sphere));
        }
        if r.fill < r.sphere || r.border < r.fill {
            return invalid(format!(
                "radii must satisfy sphere <= fill <= border, got {} / {} / {}",
                r.sphere, r.fill, r.border
            ));
        }

        validate_zoom_rings(&self.zoom_rings)?;

        let p = &self.pins;
        if !(p.base_spread > 0.0) || !(p.ring_radius_factor > 0.0) {
            return invalid("pins.base_spread and pins.ring_radius_factor must be positive".into());
        }
        if p.first_ring_capacity == 0 {
            return invalid("pins.first_ring_capacity must be at least 1".into());
        }
        if !(p.min_lng_correction_cos > 0.0 && p.min_lng_correction_cos <= 1.0) {
            return invalid("pins.min_lng_correction_cos must be in (0, 1]".into());
        }

        if !(self.mesh.max_edge_deg > 0.0) {
            return invalid("mesh.max_edge_deg must be positive".into());
        }
        if self.dataset.name_properties.is_empty() {
            return invalid("dataset.name_properties must not be empty".into());
        }
        Ok(())
    }
}

/// Thresholds strictly increase and only the last row is unbounded.
pub fn validate_zoom_rings(levels: &[ZoomRingLevel]) -> Result<(), ConfigError> {
    let Some((last, bounded)) = levels.split_last() else {
        return Err(ConfigError::Invalid("zoom_rings must not be empty".into()));
    };
    if last.max_distance.is_some() {
        return Err(ConfigError::Invalid(
            "the last zoom_rings entry must have max_distance: null".into(),
        ));
    }
    let mut prev = f64::NEG_INFINITY;
    for level in bounded {
        let Some(d) = level.max_distance else {
            return Err(ConfigError::Invalid(
                "only the last zoom_rings entry may be unbounded".into(),
            ));
        };
        if !(d > prev) {
            return Err(ConfigError::Invalid(format!(
                "zoom_rings thresholds must strictly increase ({d} after {prev})"
            )));
        }
        prev = d;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, GlobeConfig, ZoomRingLevel, default_zoom_rings, validate_zoom_rings};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_yields_defaults() {
        let cfg = GlobeConfig::from_json_str("{}").expect("defaults");
        assert_eq!(cfg, GlobeConfig::default());
        assert_eq!(cfg.zoom_rings, default_zoom_rings());
        assert_eq!(cfg.interaction.click_distance_px, 5.0);
        assert_eq!(cfg.radii.border, 1.011);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = GlobeConfig::from_json_str(
            r#"{"radii":{"fill":1.02,"border":1.03},"interaction":{"hover_throttle_ms":16}}"#,
        )
        .expect("parse");
        assert_eq!(cfg.radii.sphere, 1.0);
        assert_eq!(cfg.radii.fill, 1.02);
        assert_eq!(cfg.interaction.hover_throttle_ms, 16.0);
        assert_eq!(cfg.interaction.click_duration_ms, 300.0);
    }

    #[test]
    fn zoom_rings_parse_null_as_unbounded() {
        let cfg = GlobeConfig::from_json_str(
            r#"{"zoom_rings":[{"max_distance":2.0,"visible_rings":3},{"max_distance":null,"visible_rings":1}]}"#,
        )
        .expect("parse");
        assert_eq!(
            cfg.zoom_rings,
            vec![ZoomRingLevel::new(Some(2.0), 3), ZoomRingLevel::new(None, 1)]
        );
    }

    #[test]
    fn rejects_inverted_radii() {
        let err = GlobeConfig::from_json_str(r#"{"radii":{"border":1.0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn explicit_empty_zoom_table_is_rejected() {
        let err = GlobeConfig::from_json_str(r#"{"zoom_rings":[]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_bad_zoom_tables() {
        assert!(validate_zoom_rings(&[]).is_err());
        assert!(validate_zoom_rings(&[ZoomRingLevel::new(Some(2.0), 1)]).is_err());
        assert!(
            validate_zoom_rings(&[
                ZoomRingLevel::new(Some(2.0), 3),
                ZoomRingLevel::new(Some(2.0), 2),
                ZoomRingLevel::new(None, 1),
            ])
            .is_err()
        );
        assert!(validate_zoom_rings(&default_zoom_rings()).is_ok());
    }

    #[test]
    fn rejects_zero_first_ring_capacity() {
        let err = GlobeConfig::from_json_str(r#"{"pins":{"first_ring_capacity":0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("first_ring_capacity")));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = GlobeConfig::from_json_str("{").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
