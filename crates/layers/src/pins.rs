//! Concentric marker rings around a country centroid, revealed by zoom.

use std::f64::consts::{FRAC_PI_2, TAU};

use foundation::math::{GeoPoint, Vec3, project};
use formats::{ConfigError, PinConfig, ZoomRingLevel, validate_zoom_rings};
use serde::Serialize;
use tracing::debug;

use crate::layer::{Layer, LayerId};

/// Placement of one marker: ring 0 is innermost.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct RingAssignment {
    pub lat: f64,
    pub lng: f64,
    pub ring_index: u32,
    pub marker_index: u32,
}

/// Lays `count` markers out on rings around `centroid`.
///
/// Ring `k` has radius `base_spread * (k + 1) * ring_radius_factor` degrees.
/// The first ring holds up to `first_ring_capacity` markers; later rings hold
/// as many as their circumference allows at `capacity_density`. Every ring
/// takes at least one marker so the loop always terminates.
pub fn layout_rings(centroid: GeoPoint, count: u32, cfg: &PinConfig) -> Vec<RingAssignment> {
    let mut out = Vec::with_capacity(count as usize);
    if count == 0 {
        return out;
    }

    let lng_correction = 1.0
        / centroid
            .lat
            .to_radians()
            .cos()
            .max(cfg.min_lng_correction_cos);

    let mut placed: u32 = 0;
    let mut ring: u32 = 0;
    while placed < count {
        let ring_radius = cfg.base_spread * f64::from(ring + 1) * cfg.ring_radius_factor;
        let capacity = if ring == 0 {
            cfg.first_ring_capacity.min(count)
        } else {
            ((TAU * ring_radius / cfg.base_spread) * cfg.capacity_density).floor() as u32
        }
        .max(1);
        let in_ring = capacity.min(count - placed);
        let offset = f64::from(ring) * cfg.stagger;

        for i in 0..in_ring {
            let angle = f64::from(i) / f64::from(in_ring) * TAU - FRAC_PI_2 + offset;
            let point = GeoPoint::new(
                (centroid.lat + angle.sin() * ring_radius).clamp(-90.0, 90.0),
                centroid.lng + angle.cos() * ring_radius * lng_correction,
            )
            .normalized();
            out.push(RingAssignment {
                lat: point.lat,
                lng: point.lng,
                ring_index: ring,
                marker_index: placed + i,
            });
        }

        placed += in_ring;
        ring += 1;
    }
    out
}

/// Zoom level-of-detail table: how many rings are shown at a camera distance.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomRingTable {
    levels: Vec<ZoomRingLevel>,
}

impl ZoomRingTable {
    /// Levels must have strictly increasing thresholds and end unbounded.
    pub fn new(levels: Vec<ZoomRingLevel>) -> Result<Self, ConfigError> {
        validate_zoom_rings(&levels)?;
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[ZoomRingLevel] {
        &self.levels
    }

    /// Ring count of the first level whose threshold is `>= camera_distance`.
    pub fn visible_rings(&self, camera_distance: f64) -> u32 {
        self.levels
            .iter()
            .find(|level| level.max_distance.is_none_or(|max| camera_distance <= max))
            .map_or(1, |level| level.visible_rings)
    }
}

impl Default for ZoomRingTable {
    fn default() -> Self {
        Self {
            levels: formats::default_zoom_rings(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct PinLayerSnapshot {
    /// Every marker, visible or not.
    pub assignments: Vec<RingAssignment>,
    pub visible_rings: u32,
    pub visible_count: usize,
    /// Markers on rings beyond `visible_rings`, for an "N more" affordance.
    pub hidden_count: usize,
    /// Sphere positions of the visible markers, in assignment order.
    #[serde(skip)]
    pub positions: Vec<Vec3>,
}

impl PinLayerSnapshot {
    pub fn visible(&self) -> impl Iterator<Item = &RingAssignment> + '_ {
        self.assignments
            .iter()
            .filter(|a| a.ring_index < self.visible_rings)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PinLayer {
    id: LayerId,
    config: PinConfig,
    zoom: ZoomRingTable,
}

impl PinLayer {
    pub fn new(id: u64, config: PinConfig, zoom: ZoomRingTable) -> Self {
        Self {
            id: LayerId(id),
            config,
            zoom,
        }
    }

    pub fn extract(&self, centroid: GeoPoint, count: u32, camera_distance: f64) -> PinLayerSnapshot {
        let assignments = layout_rings(centroid, count, &self.config);
        let visible_rings = self.zoom.visible_rings(camera_distance);
        let positions: Vec<Vec3> = assignments
            .iter()
            .filter(|a| a.ring_index < visible_rings)
            .map(|a| project(a.lat, a.lng, self.config.marker_radius))
            .collect();
        let visible_count = positions.len();
        debug!(
            layer = self.label(),
            layer_id = self.id().0,
            markers = count,
            visible_rings,
            visible = visible_count,
            "laid out marker rings"
        );
        PinLayerSnapshot {
            hidden_count: assignments.len() - visible_count,
            assignments,
            visible_rings,
            visible_count,
            positions,
        }
    }
}

impl Layer for PinLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn label(&self) -> &'static str {
        "pins"
    }
}

#[cfg(test)]
mod tests {
    use super::{PinLayer, ZoomRingTable, layout_rings};
    use crate::layer::{Layer, LayerId};
    use foundation::math::GeoPoint;
    use formats::{PinConfig, ZoomRingLevel};
    use std::collections::HashSet;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn layout_places_every_marker_exactly_once() {
        let cfg = PinConfig::default();
        for count in [0u32, 1, 4, 5, 6, 17, 60, 250] {
            let out = layout_rings(GeoPoint::new(48.0, 2.0), count, &cfg);
            assert_eq!(out.len(), count as usize);
            let unique: HashSet<u32> = out.iter().map(|a| a.marker_index).collect();
            assert_eq!(unique.len(), count as usize);
            assert!(out.iter().all(|a| a.marker_index < count.max(1)));
            for pair in out.windows(2) {
                assert!(pair[0].ring_index <= pair[1].ring_index);
            }
        }
    }

    #[test]
    fn ring_capacities_follow_circumference() {
        let cfg = PinConfig::default();
        let out = layout_rings(GeoPoint::new(0.0, 0.0), 30, &cfg);
        let per_ring = |r: u32| out.iter().filter(|a| a.ring_index == r).count();
        // Ring 1: floor(2*pi*2.4/1.5*0.7) = 7; ring 2: floor(2*pi*3.6/1.5*0.7) = 10.
        assert_eq!(per_ring(0), 5);
        assert_eq!(per_ring(1), 7);
        assert_eq!(per_ring(2), 10);
        assert_eq!(per_ring(3), 8);
    }

    #[test]
    fn first_marker_sits_below_the_centroid_on_ring_zero() {
        let cfg = PinConfig::default();
        let out = layout_rings(GeoPoint::new(10.0, 20.0), 3, &cfg);
        // angle = -pi/2: straight south by the ring radius.
        assert_close(out[0].lat, 10.0 - 1.5 * 0.8, 1e-9);
        assert_close(out[0].lng, 20.0, 1e-9);
    }

    #[test]
    fn longitude_spread_is_widened_towards_the_poles() {
        let cfg = PinConfig::default();
        let equator = layout_rings(GeoPoint::new(0.0, 0.0), 4, &cfg);
        let north = layout_rings(GeoPoint::new(60.0, 0.0), 4, &cfg);
        // Marker 1 sits at angle 0 (due east).
        assert_close(equator[1].lng, 1.2, 1e-9);
        assert_close(north[1].lng, 2.4, 1e-9);

        // The 0.3 floor caps the correction near the pole.
        let polar = layout_rings(GeoPoint::new(89.0, 0.0), 4, &cfg);
        assert_close(polar[1].lng, 1.2 / 0.3, 1e-9);
    }

    #[test]
    fn layout_keeps_coordinates_in_range() {
        let cfg = PinConfig::default();
        for a in layout_rings(GeoPoint::new(89.5, 179.8), 40, &cfg) {
            assert!(GeoPoint::new(a.lat, a.lng).is_valid(), "{a:?}");
        }
    }

    #[test]
    fn zero_capacity_rings_still_terminate() {
        let cfg = PinConfig {
            capacity_density: 0.0,
            ..PinConfig::default()
        };
        let out = layout_rings(GeoPoint::new(0.0, 0.0), 8, &cfg);
        assert_eq!(out.len(), 8);
        assert_eq!(out.last().map(|a| a.ring_index), Some(3));
    }

    #[test]
    fn default_zoom_table_matches_thresholds() {
        let table = ZoomRingTable::default();
        assert_eq!(table.visible_rings(1.5), 6);
        assert_eq!(table.visible_rings(1.6), 6);
        assert_eq!(table.visible_rings(2.0), 3);
        assert_eq!(table.visible_rings(3.0), 1);
        assert_eq!(table.visible_rings(1e9), 1);

        let mut prev = u32::MAX;
        let mut d = 1.0;
        while d < 5.0 {
            let rings = table.visible_rings(d);
            assert!(rings <= prev);
            prev = rings;
            d += 0.05;
        }
    }

    #[test]
    fn custom_zoom_tables_are_validated() {
        assert!(ZoomRingTable::new(vec![ZoomRingLevel::new(Some(2.0), 3)]).is_err());
        let table = ZoomRingTable::new(vec![
            ZoomRingLevel::new(Some(2.0), 3),
            ZoomRingLevel::new(None, 2),
        ])
        .expect("valid");
        assert_eq!(table.visible_rings(2.5), 2);
        assert_eq!(table.levels().len(), 2);
    }

    #[test]
    fn pin_layer_reports_hidden_markers() {
        let layer = PinLayer::new(2, PinConfig::default(), ZoomRingTable::default());
        assert_eq!(layer.id(), LayerId(2));
        let far = layer.extract(GeoPoint::new(0.0, 0.0), 12, 3.0);
        assert_eq!(far.visible_rings, 1);
        assert_eq!(far.assignments.len(), 12);
        assert_eq!(far.visible_count, 5);
        assert_eq!(far.hidden_count, 7);
        assert_eq!(far.positions.len(), 5);
        assert_eq!(far.visible().count(), 5);
        for p in &far.positions {
            assert_close(p.length(), 1.012, 1e-9);
        }

        let near = layer.extract(GeoPoint::new(0.0, 0.0), 12, 1.5);
        assert_eq!(near.hidden_count, 0);
        assert_eq!(near.visible_count, 12);
    }
}
