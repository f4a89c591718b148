/// Geographic coordinate in degrees, longitude first.
///
/// Ordering matches GeoJSON and the rendering surface's camera API: when a
/// coordinate crosses an API boundary it is always `(lng, lat)`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    /// Off-map sentinel used for markers that have no position yet.
    pub const SENTINEL: LngLat = LngLat::new(0.0, 0.0);

    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

/// Shifts `lng` by whole world widths until it is within 180 degrees of
/// `reference`.
///
/// An overlay anchored near the antimeridian must appear on the copy of the
/// world the cursor is over, so its anchor longitude is normalized toward the
/// cursor longitude before display.
pub fn normalize_lng_toward(lng: f64, reference: f64) -> f64 {
    let mut out = lng;
    while (reference - out).abs() > 180.0 {
        out += if reference > out { 360.0 } else { -360.0 };
    }
    out
}

/// Clamps `zoom` into the inclusive `[min, max]` range.
pub fn clamp_zoom(zoom: f64, min: f64, max: f64) -> f64 {
    zoom.clamp(min, max)
}
