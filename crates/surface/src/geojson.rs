use serde_json::{Map, Value, json};

use foundation::LngLat;

/// Geometry subset the transit sources need.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LngLat),
    LineString(Vec<LngLat>),
}

/// One named feature. `name` doubles as the join key for layer filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub name: String,
    pub geometry: Geometry,
}

impl Feature {
    pub fn point(name: impl Into<String>, at: LngLat) -> Self {
        Self {
            name: name.into(),
            geometry: Geometry::Point(at),
        }
    }

    pub fn line(name: impl Into<String>, path: Vec<LngLat>) -> Self {
        Self {
            name: name.into(),
            geometry: Geometry::LineString(path),
        }
    }

    /// The feature's anchor coordinate: the point itself, or the first vertex
    /// of a line.
    pub fn anchor(&self) -> Option<LngLat> {
        match &self.geometry {
            Geometry::Point(at) => Some(*at),
            Geometry::LineString(path) => path.first().copied(),
        }
    }
}

/// Source payload handed to the rendering surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.name == name)
    }

    /// Serializes to a GeoJSON `FeatureCollection` value, coordinates in
    /// `(lng, lat)` order.
    pub fn to_geojson_value(&self) -> Value {
        let features: Vec<Value> = self
            .features
            .iter()
            .map(|f| {
                let mut properties = Map::new();
                properties.insert("name".to_string(), Value::String(f.name.clone()));
                let geometry = match &f.geometry {
                    Geometry::Point(at) => json!({
                        "type": "Point",
                        "coordinates": [at.lng, at.lat],
                    }),
                    Geometry::LineString(path) => json!({
                        "type": "LineString",
                        "coordinates": path
                            .iter()
                            .map(|p| json!([p.lng, p.lat]))
                            .collect::<Vec<_>>(),
                    }),
                };
                json!({
                    "type": "Feature",
                    "properties": properties,
                    "geometry": geometry,
                })
            })
            .collect();

        json!({
            "type": "FeatureCollection",
            "features": features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Feature, FeatureCollection};
    use foundation::LngLat;

    #[test]
    fn point_feature_serializes_lng_first() {
        let fc = FeatureCollection::new(vec![Feature::point("Majestic", LngLat::new(77.57, 12.97))]);
        let value = fc.to_geojson_value();
        assert_eq!(value["type"], "FeatureCollection");
        let feat = &value["features"][0];
        assert_eq!(feat["properties"]["name"], "Majestic");
        assert_eq!(feat["geometry"]["type"], "Point");
        assert_eq!(feat["geometry"]["coordinates"][0], 77.57);
        assert_eq!(feat["geometry"]["coordinates"][1], 12.97);
    }

    #[test]
    fn line_feature_serializes_path() {
        let path = vec![LngLat::new(77.5, 12.9), LngLat::new(77.6, 13.0)];
        let fc = FeatureCollection::new(vec![Feature::line("335E", path)]);
        let value = fc.to_geojson_value();
        let geom = &value["features"][0]["geometry"];
        assert_eq!(geom["type"], "LineString");
        assert_eq!(geom["coordinates"].as_array().unwrap().len(), 2);
        assert_eq!(geom["coordinates"][1][0], 77.6);
    }

    #[test]
    fn anchor_of_line_is_first_vertex() {
        let f = Feature::line("r", vec![LngLat::new(1.0, 2.0), LngLat::new(3.0, 4.0)]);
        assert_eq!(f.anchor(), Some(LngLat::new(1.0, 2.0)));
    }
}
