use crate::geo::LngLat;

/// Initial camera center: the Majestic bus station.
pub const DEFAULT_CENTER: LngLat = LngLat::new(77.5713, 12.9766);
/// Initial camera zoom.
pub const DEFAULT_ZOOM: f64 = 11.0;
/// Lower camera zoom bound.
pub const MIN_ZOOM: f64 = 10.0;
/// Upper camera zoom bound.
pub const MAX_ZOOM: f64 = 18.0;

/// Zoom applied when flying the camera to a target location.
pub const FLY_ZOOM: f64 = 12.0;
/// Animation length for a camera fly, in milliseconds.
pub const FLY_DURATION_MS: u32 = 500;

/// One camera fly instruction.
///
/// A fly issued while another is in flight supersedes it; that is the
/// rendering surface's standard behavior and is not coordinated here.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraFly {
    pub center: LngLat,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
    pub duration_ms: u32,
    /// Essential animations run even under a reduced-motion preference.
    pub essential: bool,
}

impl CameraFly {
    /// The fixed fly contract: zoom 12, level camera, 500 ms, essential.
    pub fn to(center: LngLat) -> Self {
        Self {
            center,
            zoom: FLY_ZOOM,
            pitch: 0.0,
            bearing: 0.0,
            duration_ms: FLY_DURATION_MS,
            essential: true,
        }
    }
}
