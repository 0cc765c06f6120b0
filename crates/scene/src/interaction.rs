//! Pointer input -> country resolution, hover throttling, click detection.

use foundation::Timestamp;
use foundation::math::{GeoPoint, Vec3, unproject};
use formats::{CountryFeature, InteractionConfig};
use tracing::trace;

use crate::camera::{PerspectiveCamera, Viewport};
use crate::containment::SpatialIndex;
use crate::picking::SphereSurface;

/// A country under the pointer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pick<'a> {
    pub country: &'a CountryFeature,
    /// Index into the dataset's features.
    pub index: usize,
    pub location: GeoPoint,
    pub hit: Vec3,
}

/// screen -> NDC -> ray -> surface hit -> lat/lng -> country.
#[derive(Debug, Clone)]
pub struct PointerResolver<'a> {
    index: SpatialIndex<'a>,
}

impl<'a> PointerResolver<'a> {
    pub fn new(index: SpatialIndex<'a>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &SpatialIndex<'a> {
        &self.index
    }

    /// `None` on a degenerate viewport, a ray that misses the globe, or a
    /// point over open water.
    pub fn resolve<S: SphereSurface + ?Sized>(
        &self,
        screen_x: f64,
        screen_y: f64,
        viewport: &Viewport,
        camera: &PerspectiveCamera,
        surface: &S,
    ) -> Option<Pick<'a>> {
        if self.index.is_empty() {
            return None;
        }
        let ndc = viewport.to_ndc(screen_x, screen_y)?;
        let ray = camera.ray_through_ndc(ndc)?;
        let hit = surface.intersect_ray(&ray)?;
        if hit.length_squared() <= 0.0 {
            return None;
        }
        let location = unproject(hit);
        let index = self.index.country_index_at(location.lat, location.lng);
        trace!(
            screen_x,
            screen_y,
            lat = location.lat,
            lng = location.lng,
            ?index,
            "resolved pointer"
        );
        let index = index?;
        Some(Pick {
            country: self.index.dataset().features.get(index)?,
            index,
            location,
            hit,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Gesture {
    /// Short, nearly stationary press: select what is under the pointer.
    Click,
    /// Camera pan or long press.
    Drag,
    /// Pointer-up without a matching pointer-down on the canvas.
    Ignored,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct PressStart {
    x: f64,
    y: f64,
    at: Timestamp,
}

/// Per-canvas pointer state. Not persisted; dropped with the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionState {
    config: InteractionConfig,
    last_hover: Option<Timestamp>,
    press: Option<PressStart>,
}

impl InteractionState {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            last_hover: None,
            press: None,
        }
    }

    /// Whether a hover resolution may run at `now`; records the run if so.
    /// The first move is always allowed.
    pub fn try_hover(&mut self, now: Timestamp) -> bool {
        let throttle = self.config.hover_throttle_ms;
        if self
            .last_hover
            .is_some_and(|last| now.elapsed_since(last) < throttle)
        {
            return false;
        }
        self.last_hover = Some(now);
        true
    }

    /// Presses that start outside the canvas cancel any pending press.
    pub fn pointer_down(&mut self, x: f64, y: f64, now: Timestamp, on_canvas: bool) {
        self.press = on_canvas.then_some(PressStart { x, y, at: now });
    }

    pub fn pointer_up(&mut self, x: f64, y: f64, now: Timestamp) -> Gesture {
        let Some(start) = self.press.take() else {
            return Gesture::Ignored;
        };
        let moved = (x - start.x).hypot(y - start.y);
        let held = now.elapsed_since(start.at);
        if moved < self.config.click_distance_px && held < self.config.click_duration_ms {
            Gesture::Click
        } else {
            Gesture::Drag
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }
}

/// Result of a hover resolution; `pick` is `None` over water or off-globe.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HoverUpdate<'a> {
    pub pick: Option<Pick<'a>>,
}

impl<'a> HoverUpdate<'a> {
    pub fn country(&self) -> Option<&'a CountryFeature> {
        self.pick.map(|p| p.country)
    }
}

/// Wires the resolver to the pointer state for one canvas.
#[derive(Debug, Clone)]
pub struct GlobeInteractions<'a> {
    resolver: PointerResolver<'a>,
    state: InteractionState,
}

impl<'a> GlobeInteractions<'a> {
    pub fn new(resolver: PointerResolver<'a>, config: InteractionConfig) -> Self {
        Self {
            resolver,
            state: InteractionState::new(config),
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// `None` when throttled; otherwise the (possibly empty) hover result.
    pub fn on_pointer_move<S: SphereSurface + ?Sized>(
        &mut self,
        x: f64,
        y: f64,
        now: Timestamp,
        viewport: &Viewport,
        camera: &PerspectiveCamera,
        surface: &S,
    ) -> Option<HoverUpdate<'a>> {
        if !self.state.try_hover(now) {
            return None;
        }
        Some(HoverUpdate {
            pick: self.resolver.resolve(x, y, viewport, camera, surface),
        })
    }

    pub fn on_pointer_down(&mut self, x: f64, y: f64, now: Timestamp, on_canvas: bool) {
        self.state.pointer_down(x, y, now, on_canvas);
    }

    /// The clicked country, if the release completes a click over land.
    pub fn on_pointer_up<S: SphereSurface + ?Sized>(
        &mut self,
        x: f64,
        y: f64,
        now: Timestamp,
        viewport: &Viewport,
        camera: &PerspectiveCamera,
        surface: &S,
    ) -> Option<Pick<'a>> {
        match self.state.pointer_up(x, y, now) {
            Gesture::Click => self.resolver.resolve(x, y, viewport, camera, surface),
            Gesture::Drag | Gesture::Ignored => None,
        }
    }
}

/// Single-finger tap recognizer for touch screens.
#[derive(Debug, Clone, PartialEq)]
pub struct TapDetector {
    threshold_px: f64,
    start: Option<(f64, f64, usize)>,
}

impl TapDetector {
    pub fn new(threshold_px: f64) -> Self {
        Self {
            threshold_px,
            start: None,
        }
    }

    pub fn touch_start(&mut self, x: f64, y: f64, touches: usize) {
        self.start = Some((x, y, touches));
    }

    /// `true` when the finished touch was a tap. Multi-touch gestures and
    /// moves of `threshold_px` or more on either axis are not taps.
    pub fn touch_end(&mut self, x: f64, y: f64) -> bool {
        let Some((sx, sy, touches)) = self.start.take() else {
            return false;
        };
        if touches > 1 {
            return false;
        }
        (x - sx).abs() < self.threshold_px && (y - sy).abs() < self.threshold_px
    }
}
