use foundation::math::{GeoPoint, open_ring, project_point};

use crate::mesh::BorderBuffer;

/// Appends one line segment per consecutive pair of `ring` at `radius`.
///
/// Rings that do not repeat their first point get the closing segment added.
/// Borders never depend on triangulation: a polygon whose fill was skipped
/// still gets its outline.
pub fn append_ring_borders(ring: &[GeoPoint], radius: f64, out: &mut BorderBuffer) {
    if ring.len() < 2 {
        return;
    }
    let explicitly_closed = open_ring(ring).len() < ring.len();
    let projected: Vec<_> = ring
        .iter()
        .map(|p| project_point(p.normalized(), radius))
        .collect();
    for pair in projected.windows(2) {
        out.push_segment(pair[0], pair[1]);
    }
    if !explicitly_closed && ring.len() >= 3 {
        out.push_segment(projected[projected.len() - 1], projected[0]);
    }
}
