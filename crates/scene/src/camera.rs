use foundation::math::{GeoPoint, Vec2, Vec3, project_point};
use formats::{CameraConfig, DeviceProfile};

use crate::picking::Ray;

/// Canvas bounding box in client (CSS pixel) coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Viewport anchored at the client origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite())
    }

    pub fn aspect(&self) -> f64 {
        if self.is_degenerate() {
            1.0
        } else {
            self.width / self.height
        }
    }

    /// Client pixel -> normalized device coordinates (`x` right, `y` up,
    /// both in `[-1, 1]` across the box).
    pub fn to_ndc(&self, client_x: f64, client_y: f64) -> Option<Vec2> {
        if self.is_degenerate() || !client_x.is_finite() || !client_y.is_finite() {
            return None;
        }
        Some(Vec2::new(
            ((client_x - self.left) / self.width) * 2.0 - 1.0,
            -((client_y - self.top) / self.height) * 2.0 + 1.0,
        ))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum DeviceClass {
    #[default]
    Desktop,
    Mobile,
}

impl DeviceClass {
    pub fn profile(self, config: &CameraConfig) -> DeviceProfile {
        match self {
            DeviceClass::Desktop => config.desktop,
            DeviceClass::Mobile => config.mobile,
        }
    }

    /// Clamps a camera distance to the zoom limits of this device class.
    pub fn clamp_distance(self, distance: f64, config: &CameraConfig) -> f64 {
        let p = self.profile(config);
        distance.clamp(p.min_zoom, p.max_zoom)
    }
}

/// Right-handed perspective camera, y-up.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_deg: f64,
    pub aspect: f64,
}

impl PerspectiveCamera {
    /// Camera at `distance` from the globe centre, directly above `focus`,
    /// looking at the origin.
    pub fn orbiting(focus: GeoPoint, distance: f64, fov_y_deg: f64, aspect: f64) -> Self {
        let eye = project_point(focus, distance);
        // Looking straight down a pole: world up is parallel to the view.
        let up = if focus.lat.abs() > 89.9 { Vec3::Z } else { Vec3::Y };
        Self {
            eye,
            target: Vec3::ZERO,
            up,
            fov_y_deg,
            aspect,
        }
    }

    pub fn for_device(
        focus: GeoPoint,
        distance: f64,
        device: DeviceClass,
        config: &CameraConfig,
        viewport: &Viewport,
    ) -> Self {
        let profile = device.profile(config);
        Self::orbiting(
            focus,
            device.clamp_distance(distance, config),
            profile.fov_deg,
            viewport.aspect(),
        )
    }

    pub fn distance(&self) -> f64 {
        (self.eye - self.target).length()
    }

    /// World-space ray from the eye through an NDC position.
    ///
    /// Returns `None` when the view basis is degenerate (eye on target or
    /// `up` parallel to the view direction).
    pub fn ray_through_ndc(&self, ndc: Vec2) -> Option<Ray> {
        let forward = (self.target - self.eye).normalize()?;
        let right = forward.cross(self.up).normalize()?;
        let up = right.cross(forward);

        let tan = (0.5 * self.fov_y_deg.to_radians()).tan();
        let px = ndc.x * tan * self.aspect;
        let py = ndc.y * tan;

        let dir = (forward + right * px + up * py).normalize()?;
        Some(Ray::new(self.eye, dir))
    }
}
