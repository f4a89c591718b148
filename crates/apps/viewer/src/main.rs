use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use foundation::LngLat;
use surface::config::{self, SurfaceConfig};
use surface::memory::{MemoryHost, MemorySurface};
use surface::types::MapSurface;
use transit::{Direction, TransitNetwork};
use view::messages::EnglishMessages;
use view::{MapView, MapViewProps, ROUTES_HIGHLIGHT_LAYER, ROUTES_LAYER, STOPS_LAYER};

/// Headless transit map viewer: drives the map view contract against the
/// in-memory surface and logs every observable effect.
#[derive(Debug, Parser)]
#[command(name = "viewer")]
struct Args {
    /// Transit dataset (JSON); the builtin sample network is used when omitted.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Surface access token.
    #[arg(long, default_value = "pk.demo")]
    token: String,

    /// Simulate a host without interactive map support.
    #[arg(long)]
    unsupported: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Process-wide surface setup, once, before any view exists.
    config::init(SurfaceConfig::new(args.token))?;

    let network = match &args.data {
        Some(path) => {
            let payload = std::fs::read_to_string(path)?;
            TransitNetwork::from_json_str(&payload)?
        }
        None => TransitNetwork::sample(),
    };
    info!(stops = network.stop_count(), "transit network ready");

    let mut host = if args.unsupported {
        MemoryHost::unsupported()
    } else {
        MemoryHost::new()
    };

    // Selection is caller-owned: clicks land here and flow back in as props.
    let clicked: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&clicked);

    let mut map: MapView<MemorySurface> = MapView::mount(
        network,
        MapViewProps::default(),
        &EnglishMessages,
        &mut host,
        Box::new(move |name| *sink.borrow_mut() = Some(name.to_string())),
    );

    if let Some(lines) = map.fallback_lines() {
        for line in lines {
            println!("{line}");
        }
        return Ok(());
    }

    info!(
        lifecycle = ?map.lifecycle(),
        style = map.surface().and_then(|s| s.style_url()).unwrap_or("<unset>"),
        "surface constructed"
    );

    // State changes arriving before the load signal are queued.
    map.update(MapViewProps {
        input_location: Some(LngLat::new(77.59, 12.97)),
        ..map.props().clone()
    });
    info!(pending = map.pending_ops(), "input location set before load");

    // The surface finishes its asynchronous load; queued work drains.
    let event = map.surface_mut().expect("surface").complete_load();
    map.handle_event(event);
    info!(lifecycle = ?map.lifecycle(), "load complete");
    log_surface(&map);

    // Click a route; the callback hands the selection back to us, and we
    // feed it in as a prop change.
    if let Some(event) = map.surface().expect("surface").click(ROUTES_LAYER, "335E") {
        map.handle_event(event);
    }
    if let Some(name) = clicked.borrow_mut().take() {
        info!(route = %name, "route clicked");
        map.update(MapViewProps {
            selected_route: Some(name),
            ..map.props().clone()
        });
    }
    log_surface(&map);

    // Switch the direction tab: data swaps in place, layers persist.
    map.update(MapViewProps {
        active_tab: Direction::From,
        ..map.props().clone()
    });
    info!("switched to the 'from' tab");
    log_surface(&map);

    map.destroy();
    info!(lifecycle = ?map.lifecycle(), "view destroyed");
    Ok(())
}

fn log_surface(map: &MapView<MemorySurface>) {
    let Some(surface) = map.surface() else {
        return;
    };
    let state = map.view_state();
    info!(
        center = %format!("{:.4}, {:.4}", state.center.lng, state.center.lat),
        zoom = %format!("{:.2}", state.zoom),
        layers = ?surface.layer_ids(),
        "camera"
    );
    for layer in [ROUTES_LAYER, ROUTES_HIGHLIGHT_LAYER, STOPS_LAYER] {
        if surface.has_layer(layer) {
            let filter = surface
                .filter(layer)
                .and_then(|f| serde_json::to_string(f).ok())
                .unwrap_or_default();
            let visible: Vec<&str> = surface
                .visible_features(layer)
                .iter()
                .map(|f| f.name.as_str())
                .collect();
            info!(layer, filter = %filter, ?visible, "layer");
        }
    }
    if let Some(fly) = surface.last_fly() {
        info!(
            center = %format!("{:.4}, {:.4}", fly.center.lng, fly.center.lat),
            zoom = fly.zoom,
            duration_ms = fly.duration_ms,
            essential = fly.essential,
            "last camera fly"
        );
    }
}
