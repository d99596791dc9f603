//! The map shown for an accepted request: a region around the pickup point
//! and labelled markers.

use serde::Deserialize;
use serde::Serialize;

use crate::car_selection::CarSelectionRequest;
use crate::car_selection::Coordinate;
use crate::prefs::map_preference::MissingCoordinatePolicy;

/// Latitude span of the initial region, in degrees.
pub const LATITUDE_DELTA: f64 = 0.0922;
/// Longitude span of the initial region, in degrees.
pub const LONGITUDE_DELTA: f64 = 0.0421;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub title: String,
    pub coordinate: Coordinate,
}

/// A west/south/east/north bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_longitude: f64,
    pub min_latitude: f64,
    pub max_longitude: f64,
    pub max_latitude: f64,
}

impl BoundingBox {
    pub fn contains(&self, point: Coordinate) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&point.latitude)
            && (self.min_longitude..=self.max_longitude).contains(&point.longitude)
    }
}

/// Everything a map component needs to draw an accepted request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: Coordinate,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
    pub markers: Vec<MapMarker>,
}

impl MapView {
    /// Builds the view for `request`, applying `policy` to missing coordinates.
    pub fn for_request(request: &CarSelectionRequest, policy: MissingCoordinatePolicy) -> Self {
        let (center, markers) = match policy {
            MissingCoordinatePolicy::Origin => {
                let pickup = Coordinate::new(
                    request.pickup_latitude.unwrap_or_default(),
                    request.pickup_longitude.unwrap_or_default(),
                );
                let dropoff = Coordinate::new(
                    request.dropoff_latitude.unwrap_or_default(),
                    request.dropoff_longitude.unwrap_or_default(),
                );
                (
                    pickup,
                    vec![marker("Pickup", pickup), marker("Dropoff", dropoff)],
                )
            }
            MissingCoordinatePolicy::Omit => {
                let pickup = request.pickup();
                let dropoff = request.dropoff();
                let center = pickup.or(dropoff).unwrap_or(Coordinate::ORIGIN);
                let markers = [("Pickup", pickup), ("Dropoff", dropoff)]
                    .into_iter()
                    .filter_map(|(title, point)| Some(marker(title, point?)))
                    .collect();
                (center, markers)
            }
        };

        Self {
            center,
            latitude_delta: LATITUDE_DELTA,
            longitude_delta: LONGITUDE_DELTA,
            markers,
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            min_longitude: self.center.longitude - self.longitude_delta / 2.0,
            min_latitude: self.center.latitude - self.latitude_delta / 2.0,
            max_longitude: self.center.longitude + self.longitude_delta / 2.0,
            max_latitude: self.center.latitude + self.latitude_delta / 2.0,
        }
    }

    /// Projects `point` into the region as (left, top) percentages of the
    /// map's width and height. Returns `None` for points outside the region.
    ///
    /// The region is small enough that a linear projection is used.
    pub fn project(&self, point: Coordinate) -> Option<(f64, f64)> {
        let bbox = self.bounding_box();
        if !bbox.contains(point) {
            return None;
        }
        let left = (point.longitude - bbox.min_longitude) / self.longitude_delta * 100.0;
        let top = (bbox.max_latitude - point.latitude) / self.latitude_delta * 100.0;
        Some((left, top))
    }

    /// An OpenStreetMap embed URL showing exactly this region.
    pub fn embed_url(&self) -> String {
        let b = self.bounding_box();
        format!(
            "https://www.openstreetmap.org/export/embed.html?bbox={:.6},{:.6},{:.6},{:.6}&layer=mapnik",
            b.min_longitude, b.min_latitude, b.max_longitude, b.max_latitude
        )
    }
}

fn marker(title: &str, coordinate: Coordinate) -> MapMarker {
    MapMarker {
        title: title.to_string(),
        coordinate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CarSelectionRequest {
        CarSelectionRequest {
            id: "a1".to_string(),
            pickup_latitude: Some(24.86),
            pickup_longitude: Some(67.01),
            dropoff_latitude: Some(24.90),
            dropoff_longitude: Some(67.16),
            ..Default::default()
        }
    }

    #[test]
    fn centers_on_pickup_with_two_markers() {
        let view = MapView::for_request(&request(), MissingCoordinatePolicy::Origin);
        assert_eq!(view.center, Coordinate::new(24.86, 67.01));
        assert_eq!(view.latitude_delta, LATITUDE_DELTA);
        assert_eq!(view.markers.len(), 2);
        assert_eq!(view.markers[0].title, "Pickup");
        assert_eq!(view.markers[1].title, "Dropoff");
        assert_eq!(view.markers[1].coordinate, Coordinate::new(24.90, 67.16));
    }

    #[test]
    fn origin_policy_zeroes_missing_components() {
        let mut req = request();
        req.pickup_latitude = None;
        req.dropoff_latitude = None;
        req.dropoff_longitude = None;

        let view = MapView::for_request(&req, MissingCoordinatePolicy::Origin);
        assert_eq!(view.center, Coordinate::new(0.0, 67.01));
        assert_eq!(view.markers[1].coordinate, Coordinate::ORIGIN);
    }

    #[test]
    fn omit_policy_drops_incomplete_markers() {
        let mut req = request();
        req.pickup_longitude = None;

        let view = MapView::for_request(&req, MissingCoordinatePolicy::Omit);
        assert_eq!(view.center, Coordinate::new(24.90, 67.16));
        assert_eq!(view.markers.len(), 1);
        assert_eq!(view.markers[0].title, "Dropoff");

        let empty = CarSelectionRequest::default();
        let view = MapView::for_request(&empty, MissingCoordinatePolicy::Omit);
        assert_eq!(view.center, Coordinate::ORIGIN);
        assert!(view.markers.is_empty());
    }

    #[test]
    fn projects_center_to_middle_and_rejects_outside_points() {
        let view = MapView::for_request(&request(), MissingCoordinatePolicy::Origin);

        let (left, top) = view.project(view.center).unwrap();
        assert!((left - 50.0).abs() < 1e-9);
        assert!((top - 50.0).abs() < 1e-9);

        // the dropoff is ~0.15 degrees east, well outside the initial region
        assert_eq!(view.project(view.markers[1].coordinate), None);

        let north_west = Coordinate::new(
            view.center.latitude + LATITUDE_DELTA / 4.0,
            view.center.longitude - LONGITUDE_DELTA / 4.0,
        );
        let (left, top) = view.project(north_west).unwrap();
        assert!((left - 25.0).abs() < 1e-6);
        assert!((top - 25.0).abs() < 1e-6);
    }

    #[test]
    fn embed_url_uses_region_bbox() {
        let view = MapView::for_request(&CarSelectionRequest::default(), MissingCoordinatePolicy::Origin);
        assert_eq!(
            view.embed_url(),
            "https://www.openstreetmap.org/export/embed.html?bbox=-0.021050,-0.046100,0.021050,0.046100&layer=mapnik"
        );
    }
}
