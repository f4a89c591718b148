use foundation::{CameraFly, DEFAULT_CENTER, DEFAULT_ZOOM, LngLat, MAX_ZOOM, MIN_ZOOM};
use surface::types::{
    Cursor, Filter, LayerSpec, LayerStyle, Listener, MapSurface, MarkerId, SurfaceEvent,
    SurfaceHost, SurfaceInit,
};
use transit::{Direction, TransitNetwork, sources};

use crate::deferred::DeferredQueue;
use crate::messages::{MessageKey, Messages};

pub const ROUTES_SOURCE: &str = "routes";
pub const ROUTES_LAYER: &str = "routes";
pub const ROUTES_HIGHLIGHT_LAYER: &str = "routes-highlighted";
pub const STOPS_SOURCE: &str = "stops";
pub const STOPS_LAYER: &str = "stops";

/// View lifecycle.
///
/// `Uninitialized -> Initializing -> Loaded -> Destroyed`, or
/// `Uninitialized -> Unsupported` (terminal) when the capability check fails.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    Unsupported,
    Initializing,
    Loaded,
    Destroyed,
}

/// Camera feedback cache: written only by the surface's move event, read only
/// for display. Never drives business logic.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewState {
    pub center: LngLat,
    pub zoom: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// Caller-owned state the view reacts to. The view never originates changes
/// to any of these; selection flows back in through `update` after the
/// route-click callback fires.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapViewProps {
    pub selected_route: Option<String>,
    pub active_tab: Direction,
    pub user_location: Option<LngLat>,
    pub input_location: Option<LngLat>,
}

pub type RouteSelected = Box<dyn FnMut(&str)>;

/// Bridges caller-owned declarative state to one imperative, asynchronously
/// initializing rendering surface.
///
/// Every mutation that requires a loaded surface goes through
/// `run_when_loaded`: run immediately when the load signal already arrived,
/// otherwise queued FIFO and drained exactly once on load.
pub struct MapView<S: MapSurface> {
    network: TransitNetwork,
    props: MapViewProps,
    on_route_selected: RouteSelected,
    lifecycle: Lifecycle,
    surface: Option<S>,
    view_state: ViewState,
    user_marker: Option<MarkerId>,
    input_marker: Option<MarkerId>,
    deferred: DeferredQueue<Self>,
    fallback: Option<[String; 2]>,
}

impl<S: MapSurface> MapView<S> {
    /// Runs the one-shot capability check and, when supported, constructs the
    /// surface centered on the default stop with rotation disabled and zoom
    /// bounded. The check is never re-evaluated.
    pub fn mount<H>(
        network: TransitNetwork,
        props: MapViewProps,
        messages: &dyn Messages,
        host: &mut H,
        on_route_selected: RouteSelected,
    ) -> Self
    where
        H: SurfaceHost<Surface = S>,
    {
        let mut view = Self {
            network,
            props,
            on_route_selected,
            lifecycle: Lifecycle::Uninitialized,
            surface: None,
            view_state: ViewState::default(),
            user_marker: None,
            input_marker: None,
            deferred: DeferredQueue::new(),
            fallback: None,
        };

        if !host.supported() {
            view.lifecycle = Lifecycle::Unsupported;
            view.fallback = Some([
                messages.get(MessageKey::DeviceMapSupport),
                messages.get(MessageKey::EnsureUpToDate),
            ]);
            return view;
        }

        let mut surface = host.create(SurfaceInit {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
        });
        surface.disable_rotation();
        surface.add_listener(Listener::Move);
        view.surface = Some(surface);
        view.lifecycle = Lifecycle::Initializing;
        view
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn view_state(&self) -> ViewState {
        self.view_state
    }

    pub fn props(&self) -> &MapViewProps {
        &self.props
    }

    /// The two localized fallback lines, present only in `Unsupported`.
    pub fn fallback_lines(&self) -> Option<&[String; 2]> {
        self.fallback.as_ref()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn user_marker(&self) -> Option<MarkerId> {
        self.user_marker
    }

    pub fn input_marker(&self) -> Option<MarkerId> {
        self.input_marker
    }

    /// Operations waiting for the load signal.
    pub fn pending_ops(&self) -> usize {
        self.deferred.len()
    }

    /// Delivers a surface event. Events are ignored outside the lifecycle
    /// states that can produce them.
    pub fn handle_event(&mut self, event: SurfaceEvent) {
        match self.lifecycle {
            Lifecycle::Uninitialized | Lifecycle::Unsupported | Lifecycle::Destroyed => return,
            Lifecycle::Initializing | Lifecycle::Loaded => {}
        }

        match event {
            SurfaceEvent::Load => {
                if self.lifecycle == Lifecycle::Initializing {
                    self.on_load();
                }
            }
            SurfaceEvent::Move { center, zoom } => {
                self.view_state = ViewState { center, zoom };
            }
            SurfaceEvent::HoverEnter {
                layer,
                feature,
                cursor,
            } if self.lifecycle == Lifecycle::Loaded => match layer.as_str() {
                STOPS_LAYER => self.on_stop_hover(feature.name.as_deref(), feature.at, cursor),
                ROUTES_LAYER => self.on_route_hover(feature.name.as_deref()),
                _ => {}
            },
            SurfaceEvent::HoverLeave { layer } if self.lifecycle == Lifecycle::Loaded => {
                match layer.as_str() {
                    STOPS_LAYER => self.on_stop_hover_leave(),
                    ROUTES_LAYER => self.on_route_hover_leave(),
                    _ => {}
                }
            }
            SurfaceEvent::Click { layer, feature } if self.lifecycle == Lifecycle::Loaded => {
                if layer == ROUTES_LAYER
                    && let Some(name) = feature.name.as_deref()
                {
                    (self.on_route_selected)(name);
                }
            }
            _ => {}
        }
    }

    /// Applies a property change, diffing against the previous props the way
    /// the reactive table specifies. Must be called after `mount`; a no-op in
    /// `Unsupported` and after `destroy`.
    pub fn update(&mut self, next: MapViewProps) {
        match self.lifecycle {
            Lifecycle::Uninitialized | Lifecycle::Unsupported | Lifecycle::Destroyed => return,
            Lifecycle::Initializing | Lifecycle::Loaded => {}
        }

        let prev = std::mem::replace(&mut self.props, next);
        self.ensure_markers();

        if prev.active_tab != self.props.active_tab {
            self.run_when_loaded(|view| view.refresh_sources());
        }

        if let (Some(at), None) = (self.props.user_location, prev.user_location) {
            self.move_marker(self.user_marker, at);
        }

        if let (Some(at), None) = (self.props.input_location, prev.input_location) {
            self.move_marker(self.input_marker, at);
            self.run_when_loaded(|view| view.center_on_input());
        }

        if prev.selected_route != self.props.selected_route {
            self.run_when_loaded(|view| view.apply_selection_filters());
        }
    }

    /// Atomic teardown: releases the surface with all listeners, markers and
    /// popups, and discards any queued operations. Safe to call before the
    /// load signal arrives.
    pub fn destroy(&mut self) {
        match self.lifecycle {
            Lifecycle::Unsupported | Lifecycle::Destroyed => return,
            _ => {}
        }
        self.deferred.clear();
        if let Some(surface) = self.surface.as_mut() {
            surface.remove();
        }
        self.user_marker = None;
        self.input_marker = None;
        self.lifecycle = Lifecycle::Destroyed;
    }

    /// Runs `op` now if the surface load completed, else queues it FIFO for
    /// the load signal.
    fn run_when_loaded(&mut self, op: impl FnOnce(&mut Self) + 'static) {
        if self.lifecycle == Lifecycle::Loaded {
            op(self);
        } else {
            self.deferred.defer(op);
        }
    }

    fn on_load(&mut self) {
        self.lifecycle = Lifecycle::Loaded;
        self.render_data();
        self.attach_listeners();
        let queued = std::mem::take(&mut self.deferred);
        queued.run_all(self);
    }

    fn render_data(&mut self) {
        let tab = self.props.active_tab;
        let routes = sources::routes_features(&self.network, tab);
        let stops = sources::stops_features(&self.network, tab);
        let highlight = Filter::name_equals(self.props.selected_route.as_deref());

        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.add_source(ROUTES_SOURCE, routes);
        surface.add_layer(LayerSpec::new(
            ROUTES_LAYER,
            ROUTES_SOURCE,
            LayerStyle::route_line(),
        ));
        surface.add_layer(
            LayerSpec::new(
                ROUTES_HIGHLIGHT_LAYER,
                ROUTES_SOURCE,
                LayerStyle::route_line_highlighted(),
            )
            .with_filter(highlight),
        );
        surface.add_source(STOPS_SOURCE, stops);
        surface.add_layer(LayerSpec::new(
            STOPS_LAYER,
            STOPS_SOURCE,
            LayerStyle::stop_circle(),
        ));

        self.ensure_markers();
        if let Some(at) = self.props.user_location {
            self.move_marker(self.user_marker, at);
        }
        if let Some(at) = self.props.input_location {
            self.move_marker(self.input_marker, at);
            self.center_on_input();
        }
    }

    fn attach_listeners(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.add_listener(Listener::HoverEnter(STOPS_LAYER.to_string()));
        surface.add_listener(Listener::HoverLeave(STOPS_LAYER.to_string()));
        surface.add_listener(Listener::HoverEnter(ROUTES_LAYER.to_string()));
        surface.add_listener(Listener::HoverLeave(ROUTES_LAYER.to_string()));
        surface.add_listener(Listener::Click(ROUTES_LAYER.to_string()));
    }

    /// Creates the two singleton markers at the off-map sentinel. Created at
    /// most once per surface lifetime; every later state change repositions
    /// them instead.
    fn ensure_markers(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        if self.user_marker.is_none() {
            self.user_marker = Some(surface.add_marker(LngLat::SENTINEL));
            self.input_marker = Some(surface.add_marker(LngLat::SENTINEL));
        }
    }

    fn move_marker(&mut self, marker: Option<MarkerId>, to: LngLat) {
        if let (Some(id), Some(surface)) = (marker, self.surface.as_mut()) {
            surface.move_marker(id, to);
        }
    }

    /// The camera-fly contract: center on the input location at zoom 12,
    /// level camera, 500 ms, essential.
    fn center_on_input(&mut self) {
        let Some(at) = self.props.input_location else {
            return;
        };
        if let Some(surface) = self.surface.as_mut() {
            surface.fly_to(CameraFly::to(at));
        }
    }

    /// Replaces both source datasets in place for the active tab. Layer
    /// identities and their filters are untouched; the surface retains
    /// layer-level filters across source-level data swaps.
    fn refresh_sources(&mut self) {
        let tab = self.props.active_tab;
        let routes = sources::routes_features(&self.network, tab);
        let stops = sources::stops_features(&self.network, tab);
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.set_source_data(ROUTES_SOURCE, routes);
        surface.set_source_data(STOPS_SOURCE, stops);
    }

    /// Syncs both selection-driven filters: the highlight overlay matches the
    /// selected route (or nothing), and the stop layer narrows to the
    /// selected route's endpoint for the active tab (or shows all stops).
    fn apply_selection_filters(&mut self) {
        let selected = self.props.selected_route.clone();
        let endpoint = selected.as_deref().and_then(|name| {
            self.network
                .endpoint_stop(self.props.active_tab, name)
                .map(str::to_string)
        });

        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.set_filter(
            ROUTES_HIGHLIGHT_LAYER,
            Filter::name_equals(selected.as_deref()),
        );

        if selected.is_some() && surface.has_layer(STOPS_LAYER) {
            surface.set_filter(STOPS_LAYER, Filter::name_equals(endpoint.as_deref()));
        } else {
            surface.set_filter(STOPS_LAYER, Filter::All);
        }
    }

    fn on_stop_hover(&mut self, name: Option<&str>, at: LngLat, cursor: LngLat) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.set_cursor(Cursor::Pointer);
        if let Some(name) = name {
            // Anchor on the copy of the world the cursor is over.
            let lng = foundation::normalize_lng_toward(at.lng, cursor.lng);
            surface.show_popup(LngLat::new(lng, at.lat), name);
        }
    }

    fn on_stop_hover_leave(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.set_cursor(Cursor::Default);
        surface.hide_popup();
    }

    /// Transient preview: highlight the hovered route, falling back to the
    /// current selection when the hovered feature carries no usable name.
    /// An empty name counts as absent.
    fn on_route_hover(&mut self, name: Option<&str>) {
        let highlight = name
            .filter(|n| !n.is_empty())
            .or(self.props.selected_route.as_deref());
        let filter = Filter::name_equals(highlight);
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.set_cursor(Cursor::Pointer);
        surface.set_filter(ROUTES_HIGHLIGHT_LAYER, filter);
    }

    fn on_route_hover_leave(&mut self) {
        let filter = Filter::name_equals(self.props.selected_route.as_deref());
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        surface.set_cursor(Cursor::Default);
        surface.set_filter(ROUTES_HIGHLIGHT_LAYER, filter);
    }
}
