use earcutr::earcut;
use foundation::math::{GeoPoint, Vec3, align_longitudes, lng_center, planar_ring, project};
use formats::{MeshConfig, Polygon};
use tracing::debug;

use crate::mesh::Mesh;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FillOptions {
    /// Sphere radius the triangles are projected onto.
    pub radius: f64,
    /// Longest planar edge (degrees) tolerated before a triangle is split.
    pub max_edge_deg: f64,
    pub max_depth: u32,
}

impl FillOptions {
    pub fn new(radius: f64, mesh: &MeshConfig) -> Self {
        Self {
            radius,
            max_edge_deg: mesh.max_edge_deg,
            max_depth: mesh.max_subdivision_depth,
        }
    }
}

impl Default for FillOptions {
    fn default() -> Self {
        Self::new(1.01, &MeshConfig::default())
    }
}

/// Triangulates one polygon (outer ring plus holes) onto the sphere.
///
/// Rings are unwrapped across the antimeridian first so earcut sees a
/// continuous planar shape; rings around a pole stay in their raw frame.
/// Returns `None` when the polygon cannot produce a fill; callers skip the
/// fill and keep the border.
pub fn triangulate_polygon(polygon: &Polygon, opts: &FillOptions) -> Option<Mesh> {
    let Some(outer) = polygon.outer() else {
        debug!("polygon without rings");
        return None;
    };
    let outer = planar_ring(outer);
    if distinct_points(&outer) < 3 {
        debug!(points = outer.len(), "outer ring has fewer than 3 distinct points");
        return None;
    }
    let center_lng = lng_center(&outer)?;

    let mut vertices: Vec<GeoPoint> = outer;
    let mut hole_indices: Vec<usize> = Vec::new();
    for hole in polygon.holes() {
        let mut hole = planar_ring(hole);
        if distinct_points(&hole) < 3 {
            debug!(points = hole.len(), "dropping degenerate hole ring");
            continue;
        }
        align_longitudes(&mut hole, center_lng);
        hole_indices.push(vertices.len());
        vertices.extend(hole);
    }

    // earcut works on flat [x, y] pairs; x = lng, y = lat.
    let coords: Vec<f64> = vertices.iter().flat_map(|p| [p.lng, p.lat]).collect();
    let indices = match earcut(&coords, &hole_indices, 2) {
        Ok(ix) => ix,
        Err(err) => {
            debug!(?err, "earcut failed");
            return None;
        }
    };
    if indices.is_empty() {
        debug!(vertices = vertices.len(), "earcut produced no triangles");
        return None;
    }

    let mut mesh = Mesh::new();
    for tri in indices.chunks_exact(3) {
        let (Some(a), Some(b), Some(c)) = (
            vertices.get(tri[0]),
            vertices.get(tri[1]),
            vertices.get(tri[2]),
        ) else {
            debug!(?tri, "earcut returned an out-of-range index");
            return None;
        };
        subdivide([*a, *b, *c], opts, 0, &mut mesh);
    }

    if mesh.is_empty() {
        return None;
    }
    Some(mesh)
}

/// Number of distinct points, saturating at 3.
fn distinct_points(ring: &[GeoPoint]) -> usize {
    let mut seen: Vec<GeoPoint> = Vec::with_capacity(3);
    for p in ring {
        if !seen.contains(p) {
            seen.push(*p);
            if seen.len() == 3 {
                break;
            }
        }
    }
    seen.len()
}

/// Longest-edge bisection until every edge is short enough (or depth runs
/// out), so large triangles follow the sphere instead of cutting through it.
fn subdivide(tri: [GeoPoint; 3], opts: &FillOptions, depth: u32, out: &mut Mesh) {
    let lengths = [
        edge_len(tri[0], tri[1]),
        edge_len(tri[1], tri[2]),
        edge_len(tri[2], tri[0]),
    ];
    let (longest, len) = lengths
        .iter()
        .copied()
        .enumerate()
        .fold((0, f64::MIN), |best, (i, l)| if l > best.1 { (i, l) } else { best });

    if len > opts.max_edge_deg && depth < opts.max_depth {
        let a = tri[longest];
        let b = tri[(longest + 1) % 3];
        let c = tri[(longest + 2) % 3];
        let mid = GeoPoint::new((a.lat + b.lat) * 0.5, (a.lng + b.lng) * 0.5);
        subdivide([a, mid, c], opts, depth + 1, out);
        subdivide([mid, b, c], opts, depth + 1, out);
        return;
    }

    let mut corners = tri.map(|p| project(p.lat.clamp(-90.0, 90.0), p.lng, opts.radius));
    if !faces_outward(corners) {
        corners.swap(1, 2);
    }
    out.push_triangle(corners);
}

fn edge_len(a: GeoPoint, b: GeoPoint) -> f64 {
    (a.lat - b.lat).abs().max((a.lng - b.lng).abs())
}

/// Counter-clockwise when seen from outside the sphere.
fn faces_outward(t: [Vec3; 3]) -> bool {
    let n = (t[1] - t[0]).cross(t[2] - t[0]);
    n.dot(t[0] + t[1] + t[2]) >= 0.0
}

#[cfg(test)]
mod tests {
    use super::{FillOptions, faces_outward, triangulate_polygon};
    use crate::mesh::Mesh;
    use foundation::math::{GeoPoint, project};
    use formats::Polygon;

    fn ring(points: &[(f64, f64)]) -> Vec<GeoPoint> {
        points.iter().map(|&(lng, lat)| GeoPoint::new(lat, lng)).collect()
    }

    fn fine() -> FillOptions {
        FillOptions {
            radius: 1.0,
            max_edge_deg: 15.0,
            max_depth: 16,
        }
    }

    /// Does any outward-facing triangle cover the direction of `(lat, lng)`?
    fn covers(mesh: &Mesh, lat: f64, lng: f64) -> bool {
        let d = project(lat, lng, 1.0);
        mesh.triangles().any(|[a, b, c]| {
            let n = (b - a).cross(c - a);
            n.length() > 1e-12
                && d.dot(a + b + c) > 0.0
                && d.dot(a.cross(b)) >= 0.0
                && d.dot(b.cross(c)) >= 0.0
                && d.dot(c.cross(a)) >= 0.0
        })
    }

    fn coarse(radius: f64) -> FillOptions {
        FillOptions {
            radius,
            max_edge_deg: 1000.0,
            max_depth: 3,
        }
    }

    #[test]
    fn square_becomes_two_triangles_on_the_sphere() {
        let square = Polygon::new(vec![ring(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ])]);
        let mesh = triangulate_polygon(&square, &coarse(1.01)).expect("mesh");
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.indices.len() % 3, 0);
        assert_eq!(mesh.normals.len(), mesh.vertices.len());
        for v in &mesh.vertices {
            assert!((v.length() - 1.01).abs() < 1e-6);
        }
        for n in &mesh.normals {
            assert!((n.length() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn long_edges_are_subdivided_within_depth() {
        let square = Polygon::new(vec![ring(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (0.0, 10.0),
        ])]);
        let opts = FillOptions {
            radius: 1.0,
            max_edge_deg: 3.0,
            max_depth: 3,
        };
        let mesh = triangulate_polygon(&square, &opts).expect("mesh");
        // Each of the 2 earcut triangles splits into at most 2^3 pieces.
        assert!(mesh.triangle_count() > 2);
        assert!(mesh.triangle_count() <= 16);
    }

    #[test]
    fn dateline_square_is_triangulated_as_a_small_patch() {
        let patch = Polygon::new(vec![ring(&[
            (179.0, -1.0),
            (-179.0, -1.0),
            (-179.0, 1.0),
            (179.0, 1.0),
        ])]);
        let mesh = triangulate_polygon(&patch, &coarse(1.0)).expect("mesh");
        assert_eq!(mesh.triangle_count(), 2);
        // Every vertex stays near the antimeridian (x close to -1).
        for v in &mesh.vertices {
            assert!(v.x < -0.99, "vertex wandered away: {v:?}");
        }
    }

    #[test]
    fn hole_reduces_the_fill() {
        let outer = ring(&[(20.0, 0.0), (40.0, 0.0), (40.0, 20.0), (20.0, 20.0)]);
        let hole = ring(&[(25.0, 5.0), (35.0, 5.0), (35.0, 15.0), (25.0, 15.0)]);
        let solid = triangulate_polygon(&Polygon::new(vec![outer.clone()]), &coarse(1.0))
            .expect("solid");
        let holed = triangulate_polygon(&Polygon::new(vec![outer, hole]), &coarse(1.0))
            .expect("holed");
        assert_eq!(solid.triangle_count(), 2);
        assert_eq!(holed.triangle_count(), 8);
    }

    #[test]
    fn degenerate_rings_are_skipped() {
        let sliver = Polygon::new(vec![ring(&[(100.0, 50.0), (101.0, 50.0), (100.0, 50.0)])]);
        assert!(triangulate_polygon(&sliver, &FillOptions::default()).is_none());
        assert!(triangulate_polygon(&Polygon::new(Vec::new()), &FillOptions::default()).is_none());
        let line = Polygon::new(vec![ring(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)])]);
        assert!(triangulate_polygon(&line, &FillOptions::default()).is_none());
    }

    #[test]
    fn triangles_face_away_from_the_centre() {
        let square = Polygon::new(vec![ring(&[
            (0.0, 0.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (10.0, 0.0),
        ])]);
        let mesh = triangulate_polygon(&square, &FillOptions::default()).expect("mesh");
        assert!(mesh.triangles().all(faces_outward));
    }

    #[test]
    fn hole_past_the_dateline_is_cut_from_a_wide_fill() {
        let outer = ring(&[
            (-10.0, 40.0),
            (100.0, 40.0),
            (-150.0, 40.0),
            (-150.0, 60.0),
            (100.0, 60.0),
            (-10.0, 60.0),
        ]);
        let hole = ring(&[(-170.0, 48.0), (-160.0, 48.0), (-160.0, 52.0), (-170.0, 52.0)]);
        let mesh = triangulate_polygon(&Polygon::new(vec![outer, hole]), &fine()).expect("mesh");
        assert!(mesh.triangles().all(faces_outward));
        assert!(!covers(&mesh, 50.0, -165.0));
        assert!(covers(&mesh, 46.3, -176.3));
        assert!(covers(&mesh, 53.7, 151.3));
        assert!(covers(&mesh, 44.1, 3.7));
    }

    #[test]
    fn pole_cap_fills_down_to_the_pole() {
        let cap = ring(&[
            (-180.0, -60.0),
            (-90.0, -65.0),
            (0.0, -62.0),
            (90.0, -66.0),
            (180.0, -60.0),
            (180.0, -90.0),
            (-180.0, -90.0),
            (-180.0, -60.0),
        ]);
        let mesh = triangulate_polygon(&Polygon::new(vec![cap]), &fine()).expect("mesh");
        assert!(covers(&mesh, -80.3, 7.3));
        assert!(covers(&mesh, -74.1, 131.7));
        assert!(!covers(&mesh, -50.0, 0.0));
        assert!(!covers(&mesh, 80.0, 0.0));
    }
}
