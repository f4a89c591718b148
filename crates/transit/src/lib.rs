pub mod sources;

use std::collections::BTreeMap;

use serde_json::Value;

use foundation::LngLat;

/// Direction tab: rides into town ("to") or out of town ("from").
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Direction {
    To,
    From,
}

impl Default for Direction {
    fn default() -> Self {
        Direction::To
    }
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::To => "to",
            Direction::From => "from",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "to" => Some(Direction::To),
            "from" => Some(Direction::From),
            _ => None,
        }
    }
}

/// A named stop at a single coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub name: String,
    pub location: LngLat,
}

/// A named route: an ordered path plus its endpoint stops for one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub name: String,
    pub path: Vec<LngLat>,
    /// Name of the stop the route boards at in this direction.
    pub start: String,
    /// Name of the stop the route terminates at in this direction.
    pub end: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransitDataError {
    NotAnObject,
    MissingField(&'static str),
    InvalidStop { index: usize, reason: String },
    InvalidRoute { direction: &'static str, index: usize, reason: String },
}

impl std::fmt::Display for TransitDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitDataError::NotAnObject => write!(f, "transit data must be a JSON object"),
            TransitDataError::MissingField(name) => write!(f, "missing field: {name}"),
            TransitDataError::InvalidStop { index, reason } => {
                write!(f, "invalid stop at index {index}: {reason}")
            }
            TransitDataError::InvalidRoute {
                direction,
                index,
                reason,
            } => write!(f, "invalid {direction} route at index {index}: {reason}"),
        }
    }
}

impl std::error::Error for TransitDataError {}

/// The full route/stop dataset, one route set per direction.
///
/// Immutable from the view's perspective; ordering is deterministic
/// (BTreeMap by name) so source payload construction is stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitNetwork {
    stops: BTreeMap<String, Stop>,
    routes_to: BTreeMap<String, Route>,
    routes_from: BTreeMap<String, Route>,
}

impl TransitNetwork {
    pub fn new(stops: Vec<Stop>, routes_to: Vec<Route>, routes_from: Vec<Route>) -> Self {
        Self {
            stops: stops.into_iter().map(|s| (s.name.clone(), s)).collect(),
            routes_to: routes_to.into_iter().map(|r| (r.name.clone(), r)).collect(),
            routes_from: routes_from.into_iter().map(|r| (r.name.clone(), r)).collect(),
        }
    }

    pub fn routes(&self, direction: Direction) -> impl Iterator<Item = &Route> {
        match direction {
            Direction::To => self.routes_to.values(),
            Direction::From => self.routes_from.values(),
        }
    }

    pub fn route(&self, direction: Direction, name: &str) -> Option<&Route> {
        match direction {
            Direction::To => self.routes_to.get(name),
            Direction::From => self.routes_from.get(name),
        }
    }

    pub fn stop(&self, name: &str) -> Option<&Stop> {
        self.stops.get(name)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    /// The stop a selected route should be narrowed to for the given tab:
    /// its boarding stop when riding in, its terminal stop when riding out.
    pub fn endpoint_stop(&self, direction: Direction, route_name: &str) -> Option<&str> {
        let route = self.route(direction, route_name)?;
        Some(match direction {
            Direction::To => route.start.as_str(),
            Direction::From => route.end.as_str(),
        })
    }

    /// Parses the JSON dataset:
    /// `{ "stops": [{name, location: [lng, lat]}],
    ///    "routes": { "to": [{name, start, end, path: [[lng, lat]..]}], "from": [..] } }`
    pub fn from_json_str(payload: &str) -> Result<Self, TransitDataError> {
        let value: Value = serde_json::from_str(payload).map_err(|e| {
            TransitDataError::InvalidStop {
                index: 0,
                reason: format!("JSON parse error: {e}"),
            }
        })?;
        Self::from_json_value(&value)
    }

    pub fn from_json_value(value: &Value) -> Result<Self, TransitDataError> {
        let obj = value.as_object().ok_or(TransitDataError::NotAnObject)?;

        let stops_val = obj
            .get("stops")
            .and_then(|v| v.as_array())
            .ok_or(TransitDataError::MissingField("stops"))?;
        let mut stops = Vec::with_capacity(stops_val.len());
        for (index, stop_val) in stops_val.iter().enumerate() {
            stops.push(parse_stop(stop_val).map_err(|reason| TransitDataError::InvalidStop {
                index,
                reason,
            })?);
        }

        let routes_obj = obj
            .get("routes")
            .and_then(|v| v.as_object())
            .ok_or(TransitDataError::MissingField("routes"))?;

        let mut parsed = BTreeMap::new();
        for direction in ["to", "from"] {
            let list = routes_obj
                .get(direction)
                .and_then(|v| v.as_array())
                .ok_or(TransitDataError::MissingField("routes.to/routes.from"))?;
            let mut routes = Vec::with_capacity(list.len());
            for (index, route_val) in list.iter().enumerate() {
                routes.push(parse_route(route_val).map_err(|reason| {
                    TransitDataError::InvalidRoute {
                        direction,
                        index,
                        reason,
                    }
                })?);
            }
            parsed.insert(direction, routes);
        }

        Ok(Self::new(
            stops,
            parsed.remove("to").unwrap_or_default(),
            parsed.remove("from").unwrap_or_default(),
        ))
    }

    /// A small builtin dataset for demos and tests: two routes out of
    /// Majestic, in both directions.
    pub fn sample() -> Self {
        let stops = vec![
            Stop {
                name: "Majestic".to_string(),
                location: LngLat::new(77.5713, 12.9766),
            },
            Stop {
                name: "Shivajinagar".to_string(),
                location: LngLat::new(77.6051, 12.9857),
            },
            Stop {
                name: "Kadugodi".to_string(),
                location: LngLat::new(77.7625, 12.9886),
            },
            Stop {
                name: "Banashankari".to_string(),
                location: LngLat::new(77.5565, 12.9255),
            },
        ];
        let route = |name: &str, start: &str, end: &str, path: Vec<LngLat>| Route {
            name: name.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            path,
        };
        let routes_to = vec![
            route(
                "335E",
                "Majestic",
                "Kadugodi",
                vec![LngLat::new(77.5713, 12.9766), LngLat::new(77.7625, 12.9886)],
            ),
            route(
                "210G",
                "Shivajinagar",
                "Banashankari",
                vec![LngLat::new(77.6051, 12.9857), LngLat::new(77.5565, 12.9255)],
            ),
        ];
        let routes_from = vec![
            route(
                "335E",
                "Kadugodi",
                "Majestic",
                vec![LngLat::new(77.7625, 12.9886), LngLat::new(77.5713, 12.9766)],
            ),
            route(
                "210G",
                "Banashankari",
                "Shivajinagar",
                vec![LngLat::new(77.5565, 12.9255), LngLat::new(77.6051, 12.9857)],
            ),
        ];
        Self::new(stops, routes_to, routes_from)
    }
}

fn parse_stop(value: &Value) -> Result<Stop, String> {
    let obj = value.as_object().ok_or("stop must be an object")?;
    let name = obj
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or("stop missing name")?;
    let location = parse_lng_lat(obj.get("location").ok_or("stop missing location")?)?;
    Ok(Stop {
        name: name.to_string(),
        location,
    })
}

fn parse_route(value: &Value) -> Result<Route, String> {
    let obj = value.as_object().ok_or("route must be an object")?;
    let name = obj
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or("route missing name")?;
    let start = obj
        .get("start")
        .and_then(|v| v.as_str())
        .ok_or("route missing start")?;
    let end = obj
        .get("end")
        .and_then(|v| v.as_str())
        .ok_or("route missing end")?;
    let path_val = obj
        .get("path")
        .and_then(|v| v.as_array())
        .ok_or("route missing path")?;
    let mut path = Vec::with_capacity(path_val.len());
    for point in path_val {
        path.push(parse_lng_lat(point)?);
    }
    Ok(Route {
        name: name.to_string(),
        start: start.to_string(),
        end: end.to_string(),
        path,
    })
}

fn parse_lng_lat(value: &Value) -> Result<LngLat, String> {
    let pair = value.as_array().ok_or("coordinate must be [lng, lat]")?;
    if pair.len() != 2 {
        return Err("coordinate must be [lng, lat]".to_string());
    }
    let lng = pair[0].as_f64().ok_or("longitude must be a number")?;
    let lat = pair[1].as_f64().ok_or("latitude must be a number")?;
    Ok(LngLat::new(lng, lat))
}
