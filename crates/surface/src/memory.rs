use std::collections::BTreeMap;

use foundation::{CameraFly, LngLat};

use crate::config;
use crate::geojson::{Feature, FeatureCollection};
use crate::types::{
    Cursor, FeatureRef, Filter, LayerSpec, Listener, MapSurface, MarkerId, SurfaceEvent,
    SurfaceHost, SurfaceInit,
};

/// In-memory reference surface.
///
/// Records every mutation so the view's state-synchronization contract can be
/// asserted without a rendering backend, and models the external library's
/// observable behavior:
/// - the initial load completes asynchronously (`complete_load`),
/// - filters are layer-level state and survive source-level `set_source_data`,
/// - teardown releases everything in one step.
#[derive(Debug)]
pub struct MemorySurface {
    loaded: bool,
    removed: bool,
    center: LngLat,
    zoom: f64,
    pitch: f64,
    bearing: f64,
    min_zoom: f64,
    max_zoom: f64,
    rotation_enabled: bool,
    cursor: Cursor,
    sources: BTreeMap<String, FeatureCollection>,
    // Insertion order preserved; layer identity is stable across data swaps.
    layers: Vec<LayerSpec>,
    next_marker: u64,
    markers: BTreeMap<MarkerId, LngLat>,
    popup: Option<(LngLat, String)>,
    listeners: Vec<Listener>,
    last_fly: Option<CameraFly>,
    access_token: Option<String>,
    style_url: Option<String>,
}

impl MemorySurface {
    pub fn new(init: SurfaceInit) -> Self {
        Self {
            loaded: false,
            removed: false,
            center: init.center,
            zoom: foundation::clamp_zoom(init.zoom, init.min_zoom, init.max_zoom),
            pitch: 0.0,
            bearing: 0.0,
            min_zoom: init.min_zoom,
            max_zoom: init.max_zoom,
            rotation_enabled: true,
            cursor: Cursor::Default,
            sources: BTreeMap::new(),
            layers: Vec::new(),
            next_marker: 0,
            markers: BTreeMap::new(),
            popup: None,
            listeners: Vec::new(),
            last_fly: None,
            access_token: None,
            style_url: None,
        }
    }

    /// Completes the asynchronous initial load and returns the one-shot load
    /// event for the host to deliver.
    pub fn complete_load(&mut self) -> SurfaceEvent {
        self.loaded = true;
        SurfaceEvent::Load
    }

    /// Simulates a user camera move and returns the move event.
    pub fn pan_to(&mut self, center: LngLat, zoom: f64) -> SurfaceEvent {
        self.center = center;
        self.zoom = foundation::clamp_zoom(zoom, self.min_zoom, self.max_zoom);
        SurfaceEvent::Move {
            center: self.center,
            zoom: self.zoom,
        }
    }

    /// Synthesizes a hover-enter event for a named feature of `layer`, pulling
    /// the feature from the layer's source data.
    pub fn hover_enter(&self, layer: &str, name: &str, cursor: LngLat) -> Option<SurfaceEvent> {
        let feature = self.feature_of(layer, name)?;
        Some(SurfaceEvent::HoverEnter {
            layer: layer.to_string(),
            feature,
            cursor,
        })
    }

    pub fn hover_leave(&self, layer: &str) -> SurfaceEvent {
        SurfaceEvent::HoverLeave {
            layer: layer.to_string(),
        }
    }

    /// Synthesizes a click event for a named feature of `layer`.
    pub fn click(&self, layer: &str, name: &str) -> Option<SurfaceEvent> {
        let feature = self.feature_of(layer, name)?;
        Some(SurfaceEvent::Click {
            layer: layer.to_string(),
            feature,
        })
    }

    fn feature_of(&self, layer: &str, name: &str) -> Option<FeatureRef> {
        let spec = self.layer(layer)?;
        let source = self.sources.get(&spec.source)?;
        let feature = source.find(name)?;
        Some(FeatureRef {
            name: Some(feature.name.clone()),
            at: feature.anchor()?,
        })
    }

    // Introspection for tests and the headless viewer.

    pub fn source(&self, name: &str) -> Option<&FeatureCollection> {
        self.sources.get(name)
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Layer ids in insertion order.
    pub fn layer_ids(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.id.clone()).collect()
    }

    pub fn filter(&self, layer: &str) -> Option<&Filter> {
        self.layer(layer).map(|l| &l.filter)
    }

    /// Features of `layer`'s source that its current filter draws.
    pub fn visible_features(&self, layer: &str) -> Vec<&Feature> {
        let Some(spec) = self.layer(layer) else {
            return Vec::new();
        };
        let Some(source) = self.sources.get(&spec.source) else {
            return Vec::new();
        };
        source
            .features
            .iter()
            .filter(|f| spec.filter.matches(f))
            .collect()
    }

    pub fn marker(&self, id: MarkerId) -> Option<LngLat> {
        self.markers.get(&id).copied()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn popup(&self) -> Option<(LngLat, &str)> {
        self.popup.as_ref().map(|(at, text)| (*at, text.as_str()))
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn rotation_enabled(&self) -> bool {
        self.rotation_enabled
    }

    pub fn zoom_bounds(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn bearing(&self) -> f64 {
        self.bearing
    }

    pub fn last_fly(&self) -> Option<CameraFly> {
        self.last_fly
    }

    pub fn listeners(&self) -> &[Listener] {
        &self.listeners
    }

    /// Access token picked up from the process-wide config at creation.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Style URL picked up from the process-wide config at creation.
    pub fn style_url(&self) -> Option<&str> {
        self.style_url.as_deref()
    }
}

impl MapSurface for MemorySurface {
    fn add_source(&mut self, name: &str, data: FeatureCollection) {
        if self.removed {
            return;
        }
        self.sources.insert(name.to_string(), data);
    }

    fn set_source_data(&mut self, name: &str, data: FeatureCollection) -> bool {
        if self.removed {
            return false;
        }
        match self.sources.get_mut(name) {
            Some(existing) => {
                *existing = data;
                true
            }
            None => false,
        }
    }

    fn add_layer(&mut self, spec: LayerSpec) {
        if self.removed {
            return;
        }
        self.layers.push(spec);
    }

    fn set_filter(&mut self, layer: &str, filter: Filter) -> bool {
        if self.removed {
            return false;
        }
        match self.layers.iter_mut().find(|l| l.id == layer) {
            Some(spec) => {
                spec.filter = filter;
                true
            }
            None => false,
        }
    }

    fn has_layer(&self, layer: &str) -> bool {
        !self.removed && self.layers.iter().any(|l| l.id == layer)
    }

    fn add_marker(&mut self, at: LngLat) -> MarkerId {
        let id = MarkerId(self.next_marker);
        self.next_marker = self.next_marker.wrapping_add(1);
        if !self.removed {
            self.markers.insert(id, at);
        }
        id
    }

    fn move_marker(&mut self, marker: MarkerId, to: LngLat) -> bool {
        if self.removed {
            return false;
        }
        match self.markers.get_mut(&marker) {
            Some(at) => {
                *at = to;
                true
            }
            None => false,
        }
    }

    fn show_popup(&mut self, at: LngLat, text: &str) {
        if self.removed {
            return;
        }
        self.popup = Some((at, text.to_string()));
    }

    fn hide_popup(&mut self) {
        self.popup = None;
    }

    fn fly_to(&mut self, fly: CameraFly) {
        if self.removed {
            return;
        }
        // Animation is modeled as instantaneous; a newer fly supersedes any
        // in-flight one by overwriting the camera and the record.
        self.center = fly.center;
        self.zoom = foundation::clamp_zoom(fly.zoom, self.min_zoom, self.max_zoom);
        self.pitch = fly.pitch;
        self.bearing = fly.bearing;
        self.last_fly = Some(fly);
    }

    fn center(&self) -> LngLat {
        self.center
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn disable_rotation(&mut self) {
        self.rotation_enabled = false;
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        if self.removed {
            return;
        }
        self.cursor = cursor;
    }

    fn add_listener(&mut self, listener: Listener) {
        if self.removed {
            return;
        }
        self.listeners.push(listener);
    }

    fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn is_loaded(&self) -> bool {
        self.loaded && !self.removed
    }

    fn remove(&mut self) {
        self.removed = true;
        self.loaded = false;
        self.sources.clear();
        self.layers.clear();
        self.markers.clear();
        self.popup = None;
        self.listeners.clear();
        self.cursor = Cursor::Default;
    }

    fn is_removed(&self) -> bool {
        self.removed
    }
}

/// Host for the in-memory surface. `supported` is configurable so the
/// capability-denied path is exercisable. Surfaces it creates pick up the
/// process-wide [`config`] the way the external library reads its global
/// access token at construction.
#[derive(Debug)]
pub struct MemoryHost {
    supported: bool,
    created: usize,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            supported: true,
            created: 0,
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            created: 0,
        }
    }

    /// Number of surfaces this host has created.
    pub fn created(&self) -> usize {
        self.created
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceHost for MemoryHost {
    type Surface = MemorySurface;

    fn supported(&self) -> bool {
        self.supported
    }

    fn create(&mut self, init: SurfaceInit) -> MemorySurface {
        self.created += 1;
        let mut surface = MemorySurface::new(init);
        if let Ok(cfg) = config::get() {
            surface.access_token = Some(cfg.access_token.clone());
            surface.style_url = Some(cfg.style_url.clone());
        }
        surface
    }
}

#[cfg(test)]
mod tests {
    use super::{MemoryHost, MemorySurface};
    use crate::geojson::{Feature, FeatureCollection};
    use crate::types::{
        Filter, LayerSpec, LayerStyle, Listener, MapSurface, SurfaceEvent, SurfaceHost, SurfaceInit,
    };
    use foundation::{CameraFly, LngLat};

    fn init() -> SurfaceInit {
        SurfaceInit {
            center: LngLat::new(77.5713, 12.9766),
            zoom: 11.0,
            min_zoom: 10.0,
            max_zoom: 18.0,
        }
    }

    fn stops() -> FeatureCollection {
        FeatureCollection::new(vec![
            Feature::point("Majestic", LngLat::new(77.5713, 12.9766)),
            Feature::point("Shivajinagar", LngLat::new(77.6051, 12.9857)),
        ])
    }

    #[test]
    fn filter_survives_source_data_replacement() {
        let mut s = MemorySurface::new(init());
        s.add_source("stops", stops());
        s.add_layer(LayerSpec::new("stops", "stops", LayerStyle::stop_circle()));
        assert!(s.set_filter("stops", Filter::name_equals(Some("Majestic"))));

        let replacement = FeatureCollection::new(vec![Feature::point(
            "Majestic",
            LngLat::new(77.5713, 12.9766),
        )]);
        assert!(s.set_source_data("stops", replacement));

        assert_eq!(
            s.filter("stops"),
            Some(&Filter::name_equals(Some("Majestic")))
        );
    }

    #[test]
    fn set_data_on_unknown_source_is_rejected() {
        let mut s = MemorySurface::new(init());
        assert!(!s.set_source_data("stops", stops()));
    }

    #[test]
    fn visible_features_respect_filter() {
        let mut s = MemorySurface::new(init());
        s.add_source("stops", stops());
        s.add_layer(LayerSpec::new("stops", "stops", LayerStyle::stop_circle()));
        assert_eq!(s.visible_features("stops").len(), 2);

        s.set_filter("stops", Filter::name_equals(Some("Majestic")));
        let visible = s.visible_features("stops");
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Majestic");

        s.set_filter("stops", Filter::None);
        assert!(s.visible_features("stops").is_empty());
    }

    #[test]
    fn fly_applies_camera_and_records_instruction() {
        let mut s = MemorySurface::new(init());
        let fly = CameraFly::to(LngLat::new(77.59, 12.97));
        s.fly_to(fly);
        assert_eq!(s.center(), LngLat::new(77.59, 12.97));
        assert_eq!(s.zoom(), 12.0);
        assert_eq!(s.pitch(), 0.0);
        assert_eq!(s.bearing(), 0.0);
        assert_eq!(s.last_fly(), Some(fly));
    }

    #[test]
    fn newer_fly_supersedes_previous() {
        let mut s = MemorySurface::new(init());
        s.fly_to(CameraFly::to(LngLat::new(1.0, 1.0)));
        s.fly_to(CameraFly::to(LngLat::new(2.0, 2.0)));
        assert_eq!(s.last_fly().unwrap().center, LngLat::new(2.0, 2.0));
        assert_eq!(s.center(), LngLat::new(2.0, 2.0));
    }

    #[test]
    fn pan_clamps_zoom_to_bounds() {
        let mut s = MemorySurface::new(init());
        let event = s.pan_to(LngLat::new(77.6, 12.9), 25.0);
        assert_eq!(
            event,
            SurfaceEvent::Move {
                center: LngLat::new(77.6, 12.9),
                zoom: 18.0,
            }
        );
    }

    #[test]
    fn remove_clears_everything_atomically() {
        let mut s = MemorySurface::new(init());
        s.add_source("stops", stops());
        s.add_layer(LayerSpec::new("stops", "stops", LayerStyle::stop_circle()));
        s.add_marker(LngLat::SENTINEL);
        s.show_popup(LngLat::new(1.0, 1.0), "Majestic");
        s.add_listener(Listener::Click("routes".to_string()));
        let _ = s.complete_load();

        s.remove();

        assert!(s.is_removed());
        assert!(!s.is_loaded());
        assert!(!s.has_layer("stops"));
        assert_eq!(s.marker_count(), 0);
        assert!(s.popup().is_none());
        assert_eq!(s.listener_count(), 0);

        // Mutations after teardown are inert.
        assert!(!s.set_filter("stops", Filter::All));
        s.add_layer(LayerSpec::new("late", "stops", LayerStyle::stop_circle()));
        assert!(!s.has_layer("late"));
    }

    #[test]
    fn hover_event_carries_feature_anchor() {
        let mut s = MemorySurface::new(init());
        s.add_source("stops", stops());
        s.add_layer(LayerSpec::new("stops", "stops", LayerStyle::stop_circle()));

        let event = s
            .hover_enter("stops", "Shivajinagar", LngLat::new(77.6, 12.98))
            .unwrap();
        match event {
            SurfaceEvent::HoverEnter { layer, feature, .. } => {
                assert_eq!(layer, "stops");
                assert_eq!(feature.name.as_deref(), Some("Shivajinagar"));
                assert_eq!(feature.at, LngLat::new(77.6051, 12.9857));
            }
            other => panic!("unexpected event: {other:?}"),
        }

        assert!(s.hover_enter("stops", "Nonexistent", LngLat::SENTINEL).is_none());
    }

    #[test]
    fn host_counts_created_surfaces() {
        let mut host = MemoryHost::new();
        assert!(host.supported());
        let _ = host.create(init());
        assert_eq!(host.created(), 1);

        let host = MemoryHost::unsupported();
        assert!(!host.supported());
    }
}
