//! Sphere projection used by every mesh, border and marker position.
//!
//! Right-handed, y-up: the north pole is `+Y`, `(lat 0, lng 0)` lies on `+X`
//! and `(lat 0, lng 90)` on `-Z`. The forward formula is fixed so geometry
//! produced here lines up with any precomputed buffers.

use super::{GeoPoint, Vec3};

/// Maps `(lat, lng)` in degrees to a point on a sphere of `radius`.
///
/// Preconditions: finite inputs, `lat` in `[-90, 90]`. At `lat = ±90` every
/// longitude maps to the same pole.
pub fn project(lat: f64, lng: f64, radius: f64) -> Vec3 {
    debug_assert!(
        lat.is_finite() && lng.is_finite() && radius.is_finite(),
        "project: non-finite input ({lat}, {lng}, {radius})"
    );
    debug_assert!((-90.0..=90.0).contains(&lat), "project: lat {lat} out of range");

    let phi = (90.0 - lat).to_radians();
    let theta = (lng + 180.0).to_radians();
    Vec3::new(
        -radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

pub fn project_point(point: GeoPoint, radius: f64) -> Vec3 {
    project(point.lat, point.lng, radius)
}

/// Inverse of [`project`]; the radius is taken from the point itself.
///
/// Longitudes come back in `(-180, 180]`. At the poles the longitude is
/// undefined and whatever `atan2` yields is returned.
pub fn unproject(point: Vec3) -> GeoPoint {
    let radius = point.length();
    debug_assert!(
        radius > 0.0 && radius.is_finite(),
        "unproject: degenerate point {point:?}"
    );

    let lat = 90.0 - (point.y / radius).clamp(-1.0, 1.0).acos().to_degrees();
    // atan2(x, z) recovers theta - 90deg, i.e. lng + 90deg.
    let mut lng = point.x.atan2(point.z).to_degrees() - 90.0;
    if lng <= -180.0 {
        lng += 360.0;
    }
    GeoPoint::new(lat, lng)
}

/// Outward unit normal of a point on an origin-centred sphere.
pub fn surface_normal(point: Vec3) -> Vec3 {
    point.normalize().unwrap_or(Vec3::Y)
}

#[cfg(test)]
mod tests {
    use super::{project, unproject};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn equator_prime_meridian_is_plus_x() {
        let p = project(0.0, 0.0, 2.0);
        assert_close(p.x, 2.0, 1e-12);
        assert_close(p.y, 0.0, 1e-12);
        assert_close(p.z, 0.0, 1e-12);
    }

    #[test]
    fn east_is_minus_z_and_north_is_plus_y() {
        let east = project(0.0, 90.0, 1.0);
        assert_close(east.z, -1.0, 1e-12);
        let north = project(90.0, 37.0, 1.0);
        assert_close(north.y, 1.0, 1e-12);
        assert_close(north.x, 0.0, 1e-12);
    }

    #[test]
    fn projected_points_lie_on_sphere() {
        for lat in [-89.0, -45.0, 0.0, 12.5, 60.0, 89.9] {
            for lng in [-179.5, -90.0, 0.0, 45.0, 180.0] {
                let p = project(lat, lng, 1.01);
                assert_close(p.length(), 1.01, 1e-12);
            }
        }
    }

    #[test]
    fn round_trips_within_tolerance() {
        let mut lat = -89.0;
        while lat <= 89.0 {
            let mut lng = -179.0;
            while lng <= 180.0 {
                let g = unproject(project(lat, lng, 1.0));
                assert_close(g.lat, lat, 1e-6);
                assert_close(g.lng, lng, 1e-6);
                lng += 7.0;
            }
            lat += 3.5;
        }
    }

    #[test]
    fn antimeridian_comes_back_as_positive_180() {
        let g = unproject(project(10.0, 180.0, 1.0));
        assert_close(g.lng, 180.0, 1e-9);
        let g = unproject(project(10.0, -180.0, 1.0));
        assert_close(g.lng, 180.0, 1e-9);
    }

    #[test]
    fn unproject_ignores_radius() {
        let g = unproject(project(-33.0, 151.0, 100.0));
        assert_close(g.lat, -33.0, 1e-9);
        assert_close(g.lng, 151.0, 1e-9);
    }
}
