use std::collections::BTreeMap;

use realtime::{Coordinate, RenderSurface};
use serde::Serialize;
use tracing::trace;

/// In-memory map layer: one marker per vehicle plus its trail.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerLayer {
    markers: BTreeMap<String, Coordinate>,
    paths: BTreeMap<String, Vec<Coordinate>>,
}

impl MarkerLayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for MarkerLayer {
    fn add_marker(&mut self, id: &str, at: Coordinate) {
        trace!(vehicle_id = %id, "marker added");
        self.markers.insert(id.to_string(), at);
    }

    fn remove_marker(&mut self, id: &str) -> bool {
        trace!(vehicle_id = %id, "marker removed");
        self.markers.remove(id).is_some()
    }

    fn move_marker(&mut self, id: &str, to: Coordinate) -> bool {
        self.markers.get_mut(id).map(|marker| *marker = to).is_some()
    }

    fn marker_position(&self, id: &str) -> Option<Coordinate> {
        self.markers.get(id).copied()
    }

    fn marker_ids(&self) -> Vec<String> {
        self.markers.keys().cloned().collect()
    }

    fn set_path(&mut self, id: &str, path: &[Coordinate]) {
        self.paths.insert(id.to_string(), path.to_vec());
    }

    fn clear_path(&mut self, id: &str) -> bool {
        self.paths.remove(id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn unknown_ids_are_ignored() {
        let mut layer = MarkerLayer::new();

        assert!(!layer.move_marker("ghost", Coordinate::new(1.0, 1.0)));
        assert!(!layer.remove_marker("ghost"));
        assert!(!layer.clear_path("ghost"));
        assert_eq!(layer, MarkerLayer::new());
    }

    #[test]
    fn serializes_markers_and_paths() {
        let mut layer = MarkerLayer::new();
        layer.add_marker("v1", Coordinate::new(-36.85, 174.76));
        layer.move_marker("v1", Coordinate::new(-36.86, 174.77));
        layer.set_path("v1", &[Coordinate::new(-36.85, 174.76), Coordinate::new(-36.86, 174.77)]);

        assert_eq!(
            serde_json::to_value(&layer).expect("should serialize"),
            json!({
                "markers": {"v1": {"latitude": -36.86, "longitude": 174.77}},
                "paths": {"v1": [
                    {"latitude": -36.85, "longitude": 174.76},
                    {"latitude": -36.86, "longitude": 174.77}
                ]}
            })
        );
    }
}
