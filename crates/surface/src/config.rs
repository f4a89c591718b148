use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Process-wide surface configuration (access-token-style setup).
///
/// The external library expects this before any surface is constructed, so it
/// has an explicit init-once lifecycle supplied by the host application at
/// startup rather than being embedded in the view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub access_token: String,
    pub style_url: String,
}

impl SurfaceConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            style_url: "mapbox://styles/mapbox/streets-v11".to_string(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigError {
    AlreadyInitialized,
    NotInitialized,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::AlreadyInitialized => write!(f, "surface config already initialized"),
            ConfigError::NotInitialized => write!(f, "surface config not initialized"),
        }
    }
}

impl std::error::Error for ConfigError {}

static CONFIG: OnceCell<SurfaceConfig> = OnceCell::new();

/// Installs the process-wide configuration. Fails on the second call.
pub fn init(config: SurfaceConfig) -> Result<(), ConfigError> {
    CONFIG.set(config).map_err(|_| ConfigError::AlreadyInitialized)
}

pub fn get() -> Result<&'static SurfaceConfig, ConfigError> {
    CONFIG.get().ok_or(ConfigError::NotInitialized)
}

pub fn is_initialized() -> bool {
    CONFIG.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SurfaceConfig, get, init, is_initialized};
    use crate::memory::MemoryHost;
    use crate::types::{SurfaceHost, SurfaceInit};
    use foundation::LngLat;

    // Single test for the whole lifecycle: the cell is process-global, so
    // splitting these assertions across tests would make them order-dependent.
    #[test]
    fn init_once_lifecycle() {
        assert!(!is_initialized());
        assert_eq!(get().unwrap_err(), ConfigError::NotInitialized);

        init(SurfaceConfig::new("pk.test")).unwrap();
        assert!(is_initialized());
        assert_eq!(get().unwrap().access_token, "pk.test");

        let err = init(SurfaceConfig::new("pk.other")).unwrap_err();
        assert_eq!(err, ConfigError::AlreadyInitialized);
        // The original value wins.
        assert_eq!(get().unwrap().access_token, "pk.test");

        // Surfaces created after init carry the configuration.
        let mut host = MemoryHost::new();
        let surface = host.create(SurfaceInit {
            center: LngLat::new(77.5713, 12.9766),
            zoom: 11.0,
            min_zoom: 10.0,
            max_zoom: 18.0,
        });
        assert_eq!(surface.access_token(), Some("pk.test"));
        assert_eq!(
            surface.style_url(),
            Some("mapbox://styles/mapbox/streets-v11")
        );
    }
}
