use std::collections::BTreeSet;

use surface::geojson::{Feature, FeatureCollection};

use crate::{Direction, TransitNetwork};

/// Builds the route source payload for one direction: one LineString feature
/// per route, keyed by route name.
pub fn routes_features(network: &TransitNetwork, direction: Direction) -> FeatureCollection {
    let features = network
        .routes(direction)
        .map(|route| Feature::line(route.name.clone(), route.path.clone()))
        .collect();
    FeatureCollection::new(features)
}

/// Builds the stop source payload for one direction: the endpoint stops of
/// that direction's routes, each appearing once, keyed by stop name.
///
/// Stops referenced by a route but missing from the stop set are skipped;
/// the caller owns data well-formedness.
pub fn stops_features(network: &TransitNetwork, direction: Direction) -> FeatureCollection {
    let mut seen = BTreeSet::new();
    let mut features = Vec::new();
    for route in network.routes(direction) {
        for stop_name in [route.start.as_str(), route.end.as_str()] {
            if !seen.insert(stop_name.to_string()) {
                continue;
            }
            if let Some(stop) = network.stop(stop_name) {
                features.push(Feature::point(stop.name.clone(), stop.location));
            }
        }
    }
    FeatureCollection::new(features)
}

#[cfg(test)]
mod tests {
    use super::{routes_features, stops_features};
    use crate::{Direction, Route, Stop, TransitNetwork};
    use foundation::LngLat;
    use surface::geojson::Geometry;

    #[test]
    fn route_features_are_keyed_by_name() {
        let network = TransitNetwork::sample();
        let fc = routes_features(&network, Direction::To);
        assert_eq!(fc.len(), 2);
        let feature = fc.find("335E").unwrap();
        match &feature.geometry {
            Geometry::LineString(path) => assert_eq!(path.len(), 2),
            other => panic!("unexpected geometry: {other:?}"),
        }
    }

    #[test]
    fn stop_features_follow_direction() {
        let network = TransitNetwork::sample();

        let to = stops_features(&network, Direction::To);
        assert!(to.find("Majestic").is_some());
        assert!(to.find("Kadugodi").is_some());

        let from = stops_features(&network, Direction::From);
        assert!(from.find("Kadugodi").is_some());
        assert!(from.find("Majestic").is_some());

        // Every endpoint appears exactly once even when shared across routes.
        let names: Vec<_> = to.features.iter().map(|f| f.name.as_str()).collect();
        let mut dedup = names.clone();
        dedup.dedup();
        assert_eq!(names, dedup);
    }

    #[test]
    fn unknown_endpoint_stops_are_skipped() {
        let network = TransitNetwork::new(
            vec![Stop {
                name: "Majestic".to_string(),
                location: LngLat::new(77.5713, 12.9766),
            }],
            vec![Route {
                name: "1A".to_string(),
                start: "Majestic".to_string(),
                end: "Ghost".to_string(),
                path: vec![LngLat::new(77.57, 12.97)],
            }],
            vec![],
        );
        let fc = stops_features(&network, Direction::To);
        assert_eq!(fc.len(), 1);
        assert!(fc.find("Ghost").is_none());
    }
}
