use serde::{Deserialize, Serialize};

use foundation::{CameraFly, LngLat};

use crate::geojson::{Feature, FeatureCollection};

/// Handle to a point marker owned by the surface.
///
/// Small and copyable so callers can hold it as a plain field across the
/// surface's lifetime.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

/// Predicate over feature properties controlling which features a layer draws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Filter {
    /// Draw every feature.
    All,
    /// Draw nothing.
    None,
    /// Draw features whose property `key` equals `value`.
    PropertyEquals { key: String, value: String },
}

impl Filter {
    /// The selection filter: `name == value`, or match-none when there is no
    /// selection. An empty name never matches a feature, so it maps to the
    /// explicit match-none variant.
    pub fn name_equals(name: Option<&str>) -> Self {
        match name {
            Some(n) if !n.is_empty() => Filter::PropertyEquals {
                key: "name".to_string(),
                value: n.to_string(),
            },
            _ => Filter::None,
        }
    }

    pub fn matches(&self, feature: &Feature) -> bool {
        match self {
            Filter::All => true,
            Filter::None => false,
            Filter::PropertyEquals { key, value } => key == "name" && feature.name == *value,
        }
    }
}

/// Visual styling for a layer. Colors are cosmetic defaults; the contract
/// only cares that base and highlighted route layers are distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerStyle {
    Line { color: String, width: f64 },
    Circle { color: String, radius: f64 },
}

impl LayerStyle {
    pub fn route_line() -> Self {
        LayerStyle::Line {
            color: "#888888".to_string(),
            width: 2.0,
        }
    }

    pub fn route_line_highlighted() -> Self {
        LayerStyle::Line {
            color: "#1a73e8".to_string(),
            width: 4.0,
        }
    }

    pub fn stop_circle() -> Self {
        LayerStyle::Circle {
            color: "#d93025".to_string(),
            radius: 5.0,
        }
    }
}

/// A named visual rendering rule bound to a source.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub source: String,
    pub style: LayerStyle,
    pub filter: Filter,
}

impl LayerSpec {
    pub fn new(id: impl Into<String>, source: impl Into<String>, style: LayerStyle) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            style,
            filter: Filter::All,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }
}

/// Mouse cursor shown over the surface.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

/// Event interest registered on the surface. Registration is bookkeeping the
/// surface clears atomically on teardown; delivery happens by the host
/// feeding `SurfaceEvent`s to whoever owns the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listener {
    Move,
    HoverEnter(String),
    HoverLeave(String),
    Click(String),
}

/// The slice of a rendered feature that interaction events carry.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRef {
    pub name: Option<String>,
    pub at: LngLat,
}

/// Events emitted by the rendering surface, delivered synchronously on the
/// UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// One-shot: the surface finished its asynchronous initial load.
    Load,
    /// Camera moved (user interaction or animation).
    Move { center: LngLat, zoom: f64 },
    /// Cursor entered a feature of the named layer.
    HoverEnter {
        layer: String,
        feature: FeatureRef,
        cursor: LngLat,
    },
    /// Cursor left the named layer.
    HoverLeave { layer: String },
    /// A feature of the named layer was clicked.
    Click { layer: String, feature: FeatureRef },
}

/// Construction parameters for a surface.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceInit {
    pub center: LngLat,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

/// Imperative mutation API of the external map canvas.
///
/// Mutations that target a named source/layer/marker return `false` when the
/// target is unknown (or the surface was already removed) instead of erroring;
/// the one modeled failure in this system is the capability check on the
/// host, not individual mutations.
pub trait MapSurface {
    fn add_source(&mut self, name: &str, data: FeatureCollection);
    fn set_source_data(&mut self, name: &str, data: FeatureCollection) -> bool;

    fn add_layer(&mut self, spec: LayerSpec);
    fn set_filter(&mut self, layer: &str, filter: Filter) -> bool;
    fn has_layer(&self, layer: &str) -> bool;

    fn add_marker(&mut self, at: LngLat) -> MarkerId;
    fn move_marker(&mut self, marker: MarkerId, to: LngLat) -> bool;

    fn show_popup(&mut self, at: LngLat, text: &str);
    fn hide_popup(&mut self);

    fn fly_to(&mut self, fly: CameraFly);
    fn center(&self) -> LngLat;
    fn zoom(&self) -> f64;
    fn disable_rotation(&mut self);

    fn set_cursor(&mut self, cursor: Cursor);

    fn add_listener(&mut self, listener: Listener);
    fn listener_count(&self) -> usize;

    /// Whether the asynchronous initial load has completed.
    fn is_loaded(&self) -> bool;

    /// Atomic teardown: releases sources, layers, markers, popups and
    /// listeners in one step. Idempotent.
    fn remove(&mut self);
    fn is_removed(&self) -> bool;
}

/// The host environment that may (or may not) be able to provide a surface.
///
/// `supported` is queried exactly once per view, before any surface is
/// created.
pub trait SurfaceHost {
    type Surface: MapSurface;

    fn supported(&self) -> bool;
    fn create(&mut self, init: SurfaceInit) -> Self::Surface;
}
