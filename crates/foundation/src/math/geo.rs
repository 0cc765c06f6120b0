/// Geographic position in degrees.
///
/// Latitude is expected in `[-90, 90]` and longitude in `[-180, 180]`; planar
/// helpers below may temporarily produce longitudes outside that range while a
/// ring is unwrapped across the antimeridian.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Same point with its longitude folded into `(-180, 180]`.
    pub fn normalized(self) -> Self {
        Self::new(self.lat, normalize_lng(self.lng))
    }
}

/// Closed sequence of points bounding a polygon or a hole.
///
/// The closing point may or may not be repeated; see [`open_ring`].
pub type Ring = Vec<GeoPoint>;

const CLOSING_EPS_DEG: f64 = 1e-9;

/// View of `ring` without its closing duplicate, if it has one.
pub fn open_ring(ring: &[GeoPoint]) -> &[GeoPoint] {
    match ring {
        [first, .., last]
            if (first.lat - last.lat).abs() < CLOSING_EPS_DEG
                && (first.lng - last.lng).abs() < CLOSING_EPS_DEG =>
        {
            &ring[..ring.len() - 1]
        }
        _ => ring,
    }
}

/// Makes a ring continuous in planar lat/lng space.
///
/// Whenever the longitude jumps by more than 180 degrees between consecutive
/// points, the later point (and every point after it) is shifted by 360 so the
/// ring no longer wraps around the globe through its interior.
pub fn unwrap_longitudes(ring: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut out = Vec::with_capacity(ring.len());
    let Some(first) = ring.first() else {
        return out;
    };
    out.push(*first);

    let mut prev_lng = first.lng;
    for p in &ring[1..] {
        let mut lng = p.lng;
        // Compare against the unwrapped predecessor so the shift accumulates.
        let diff = lng - prev_lng;
        if diff.abs() > 180.0 {
            lng -= (diff / 360.0).round() * 360.0;
        }
        out.push(GeoPoint::new(p.lat, lng));
        prev_lng = lng;
    }
    out
}

/// Midpoint of the ring's longitude extent.
pub fn lng_center(ring: &[GeoPoint]) -> Option<f64> {
    let first = ring.first()?;
    let (min, max) = ring
        .iter()
        .fold((first.lng, first.lng), |(lo, hi), p| (lo.min(p.lng), hi.max(p.lng)));
    Some((min + max) * 0.5)
}

/// Shifts a whole ring by a multiple of 360 degrees so the middle of its
/// longitude extent lies within 180 degrees of `reference_lng`.
///
/// Holes are aligned against the centre of their outer ring's extent.
pub fn align_longitudes(ring: &mut [GeoPoint], reference_lng: f64) {
    let Some(center) = lng_center(ring) else {
        return;
    };
    let turns = ((reference_lng - center) / 360.0).round();
    if turns == 0.0 {
        return;
    }
    let shift = turns * 360.0;
    for p in ring.iter_mut() {
        p.lng += shift;
    }
}

/// Open ring in the planar frame used for triangulation and containment.
///
/// Normally this is the unwrapped ring. A ring around a pole cannot be
/// unwrapped into a closed loop (its end lands a full turn away from its
/// start); it is kept in its raw `[-180, 180]` frame, where it bounds the
/// band between its coast and the pole.
pub fn planar_ring(ring: &[GeoPoint]) -> Vec<GeoPoint> {
    let ring = open_ring(ring);
    let unwrapped = unwrap_longitudes(ring);
    match (unwrapped.first(), unwrapped.last()) {
        (Some(first), Some(last)) if (last.lng - first.lng).abs() > 180.0 => ring.to_vec(),
        _ => unwrapped,
    }
}

/// Folds a longitude into `(-180, 180]`.
pub fn normalize_lng(lng: f64) -> f64 {
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

/// Planar signed area in square degrees (positive = counter-clockwise in
/// lng/lat axes). The ring is treated as implicitly closed.
pub fn ring_signed_area(ring: &[GeoPoint]) -> f64 {
    let ring = open_ring(ring);
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area = 0.0;
    let mut j = n - 1;
    for i in 0..n {
        twice_area += (ring[j].lng - ring[i].lng) * (ring[j].lat + ring[i].lat);
        j = i;
    }
    twice_area / 2.0
}
