use serde::{Deserialize, Serialize};

pub mod drawer;
pub mod export;
pub mod geometry;
pub mod projection;
pub mod stamp;

pub use drawer::{BoundingBoxDrawer, BoxDisplay, Cursor, DrawerConfig, MapHost, MinimumSize, Mode};
pub use export::{parse_export, validate, BoxExport, CoordinateSummary, ExportError};
pub use projection::Viewport;
pub use stamp::{Brush, Stamp, StampPad, StampShape};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Rejects non-finite input and clamps into [-90,90] x [-180,180].
    pub fn normalize(self) -> Option<Self> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return None;
        }
        Some(Self {
            lat: self.lat.clamp(-90.0, 90.0),
            lng: self.lng.clamp(-180.0, 180.0),
        })
    }
}

/// Axis-aligned box in degrees. Always holds `north >= south` and `east >= west`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl BoundingBox {
    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            north: a.lat.max(b.lat),
            south: a.lat.min(b.lat),
            east: a.lng.max(b.lng),
            west: a.lng.min(b.lng),
        }
    }

    pub fn lat_span(&self) -> f64 {
        (self.north - self.south).abs()
    }

    pub fn lng_span(&self) -> f64 {
        (self.east - self.west).abs()
    }

    pub fn is_degenerate(&self) -> bool {
        self.lat_span() == 0.0 || self.lng_span() == 0.0
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }

    pub fn north_west(&self) -> GeoPoint {
        GeoPoint::new(self.north, self.west)
    }

    pub fn south_east(&self) -> GeoPoint {
        GeoPoint::new(self.south, self.east)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CommittedBox {
    pub bounds: BoundingBox,
    pub center: GeoPoint,
    pub area_km2: f64,
}

impl CommittedBox {
    pub fn from_bounds(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            center: geometry::center(&bounds),
            area_km2: geometry::planar_area_km2(&bounds),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Index of the most recently committed box containing `point`.
pub fn topmost_box_at(boxes: &[CommittedBox], point: GeoPoint) -> Option<usize> {
    boxes
        .iter()
        .rposition(|committed| committed.bounds.contains(point))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_ordered_regardless_of_drag_direction() {
        let pairs = [
            (GeoPoint::new(10.0, 20.0), GeoPoint::new(-5.0, -30.0)),
            (GeoPoint::new(-5.0, 20.0), GeoPoint::new(10.0, -30.0)),
            (GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.0)),
            (GeoPoint::new(89.9, 179.9), GeoPoint::new(-89.9, -179.9)),
        ];
        for (a, b) in pairs {
            let forward = BoundingBox::from_corners(a, b);
            let backward = BoundingBox::from_corners(b, a);
            assert!(forward.north >= forward.south);
            assert!(forward.east >= forward.west);
            assert_eq!(forward, backward);
        }
    }

    #[test]
    fn london_drag_produces_expected_box() {
        let bounds = BoundingBox::from_corners(
            GeoPoint::new(51.500, -0.100),
            GeoPoint::new(51.510, -0.080),
        );
        assert_eq!(bounds.north, 51.510);
        assert_eq!(bounds.south, 51.500);
        assert_eq!(bounds.east, -0.080);
        assert_eq!(bounds.west, -0.100);
        assert!(bounds.contains(GeoPoint::new(51.505, -0.090)));
        assert!(!bounds.contains(GeoPoint::new(51.52, -0.090)));
    }

    #[test]
    fn degenerate_when_either_span_is_zero() {
        let point = GeoPoint::new(1.0, 1.0);
        assert!(BoundingBox::from_corners(point, point).is_degenerate());
        assert!(BoundingBox::from_corners(point, GeoPoint::new(1.0, 2.0)).is_degenerate());
        assert!(!BoundingBox::from_corners(point, GeoPoint::new(2.0, 2.0)).is_degenerate());
    }

    #[test]
    fn normalize_rejects_nan_and_clamps() {
        assert!(GeoPoint::new(f64::NAN, 0.0).normalize().is_none());
        assert!(GeoPoint::new(0.0, f64::INFINITY).normalize().is_none());
        let clamped = GeoPoint::new(95.0, -200.0).normalize().unwrap();
        assert_eq!(clamped, GeoPoint::new(90.0, -180.0));
    }

    #[test]
    fn committed_box_json_shape() {
        let committed = CommittedBox::from_bounds(BoundingBox {
            north: 2.0,
            south: 1.0,
            east: 4.0,
            west: 3.0,
        });
        let value: serde_json::Value =
            serde_json::from_str(&committed.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["bounds"]["north"], 2.0);
        assert_eq!(value["bounds"]["west"], 3.0);
        assert_eq!(value["center"]["lat"], 1.5);
        assert_eq!(value["center"]["lng"], 3.5);
        assert!(value["area_km2"].as_f64().unwrap() > 0.0);
        assert_eq!(value.as_object().unwrap().len(), 3);
    }

    #[test]
    fn hit_test_prefers_the_latest_box() {
        let outer = CommittedBox::from_bounds(BoundingBox {
            north: 10.0,
            south: 0.0,
            east: 10.0,
            west: 0.0,
        });
        let inner = CommittedBox::from_bounds(BoundingBox {
            north: 6.0,
            south: 4.0,
            east: 6.0,
            west: 4.0,
        });
        let boxes = [outer, inner];
        assert_eq!(topmost_box_at(&boxes, GeoPoint::new(5.0, 5.0)), Some(1));
        assert_eq!(topmost_box_at(&boxes, GeoPoint::new(1.0, 1.0)), Some(0));
        assert_eq!(topmost_box_at(&boxes, GeoPoint::new(20.0, 1.0)), None);
        assert_eq!(topmost_box_at(&[], GeoPoint::new(5.0, 5.0)), None);
    }
}
