//! Web Mercator viewport used by the canvas host to turn pointer positions
//! into coordinates and back.

use std::f64::consts::PI;

use crate::{BoundingBox, GeoPoint};

pub const TILE_SIZE: f64 = 256.0;
pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 19.0;
pub const MAX_LATITUDE: f64 = 85.051_128_78;

const GRID_STEPS: [f64; 16] = [
    0.0005, 0.001, 0.002, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0,
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub center: GeoPoint,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

fn to_world(point: GeoPoint, zoom: f64) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = point.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (point.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

fn from_world(x: f64, y: f64, zoom: f64) -> GeoPoint {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * y / size)).sinh().atan().to_degrees();
    GeoPoint { lat, lng }
}

impl Viewport {
    pub fn new(center: GeoPoint, zoom: f64, width: f64, height: f64) -> Self {
        Self {
            center: GeoPoint {
                lat: center.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
                lng: center.lng.clamp(-180.0, 180.0),
            },
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }

    pub fn screen_to_geo(&self, x: f64, y: f64) -> Option<GeoPoint> {
        let (cx, cy) = to_world(self.center, self.zoom);
        let point = from_world(
            cx + x - self.width / 2.0,
            cy + y - self.height / 2.0,
            self.zoom,
        );
        point.normalize()
    }

    pub fn geo_to_screen(&self, point: GeoPoint) -> (f64, f64) {
        let (cx, cy) = to_world(self.center, self.zoom);
        let (px, py) = to_world(point, self.zoom);
        (
            px - cx + self.width / 2.0,
            py - cy + self.height / 2.0,
        )
    }

    /// Moves the map with a drag of `(dx, dy)` screen pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let size = world_size(self.zoom);
        let (cx, cy) = to_world(self.center, self.zoom);
        let x = (cx - dx).rem_euclid(size);
        let y = (cy - dy).clamp(0.0, size);
        let center = from_world(x, y, self.zoom);
        self.center = GeoPoint {
            lat: center.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            lng: center.lng,
        };
    }

    /// Scales by `factor`, keeping the point under `(x, y)` fixed.
    pub fn zoom_at(&mut self, factor: f64, x: f64, y: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let Some(anchor) = self.screen_to_geo(x, y) else {
            return;
        };
        let zoom = (self.zoom + factor.log2()).clamp(MIN_ZOOM, MAX_ZOOM);
        let (ax, ay) = to_world(anchor, zoom);
        let center = from_world(
            ax - (x - self.width / 2.0),
            ay - (y - self.height / 2.0),
            zoom,
        );
        self.zoom = zoom;
        if let Some(center) = center.normalize() {
            self.center = GeoPoint {
                lat: center.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE),
                lng: center.lng,
            };
        }
    }

    pub fn visible_bounds(&self) -> Option<BoundingBox> {
        let top_left = self.screen_to_geo(0.0, 0.0)?;
        let bottom_right = self.screen_to_geo(self.width, self.height)?;
        Some(BoundingBox::from_corners(top_left, bottom_right))
    }

    /// Spacing in degrees for grid lines roughly `target_px` apart.
    pub fn graticule_step(&self, target_px: f64) -> f64 {
        let degrees_per_px = 360.0 / world_size(self.zoom);
        let wanted = degrees_per_px * target_px;
        GRID_STEPS
            .iter()
            .copied()
            .find(|step| *step >= wanted)
            .unwrap_or(GRID_STEPS[GRID_STEPS.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london_view() -> Viewport {
        Viewport::new(GeoPoint::new(51.505, -0.09), 10.0, 800.0, 600.0)
    }

    #[test]
    fn center_of_screen_is_viewport_center() {
        let view = london_view();
        let center = view.screen_to_geo(400.0, 300.0).unwrap();
        assert!((center.lat - 51.505).abs() < 1e-9);
        assert!((center.lng + 0.09).abs() < 1e-9);
    }

    #[test]
    fn screen_round_trip() {
        let view = london_view();
        for (x, y) in [(0.0, 0.0), (123.5, 456.25), (800.0, 600.0)] {
            let geo = view.screen_to_geo(x, y).unwrap();
            let (sx, sy) = view.geo_to_screen(geo);
            assert!((sx - x).abs() < 1e-6, "x {sx} != {x}");
            assert!((sy - y).abs() < 1e-6, "y {sy} != {y}");
        }
    }

    #[test]
    fn screen_y_grows_southward() {
        let view = london_view();
        let top = view.screen_to_geo(400.0, 0.0).unwrap();
        let bottom = view.screen_to_geo(400.0, 600.0).unwrap();
        assert!(top.lat > bottom.lat);
        let left = view.screen_to_geo(0.0, 300.0).unwrap();
        let right = view.screen_to_geo(800.0, 300.0).unwrap();
        assert!(right.lng > left.lng);
    }

    #[test]
    fn drag_right_moves_center_west() {
        let mut view = london_view();
        let before = view.center;
        view.pan_by(100.0, 0.0);
        assert!(view.center.lng < before.lng);
        assert!((view.center.lat - before.lat).abs() < 1e-9);

        view.pan_by(0.0, 100.0);
        assert!(view.center.lat > before.lat);
    }

    #[test]
    fn zoom_keeps_point_under_cursor() {
        let mut view = london_view();
        let cursor = (150.0, 420.0);
        let before = view.screen_to_geo(cursor.0, cursor.1).unwrap();
        view.zoom_at(2.0, cursor.0, cursor.1);
        assert!((view.zoom - 11.0).abs() < 1e-9);
        let after = view.screen_to_geo(cursor.0, cursor.1).unwrap();
        assert!((after.lat - before.lat).abs() < 1e-9);
        assert!((after.lng - before.lng).abs() < 1e-9);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = london_view();
        view.zoom_at(1e9, 400.0, 300.0);
        assert_eq!(view.zoom, MAX_ZOOM);
        view.zoom_at(1e-9, 400.0, 300.0);
        assert_eq!(view.zoom, MIN_ZOOM);
        view.zoom_at(0.0, 400.0, 300.0);
        assert_eq!(view.zoom, MIN_ZOOM);
    }

    #[test]
    fn visible_bounds_contain_center() {
        let view = london_view();
        let bounds = view.visible_bounds().unwrap();
        assert!(bounds.contains(view.center));
        assert!(bounds.lng_span() > bounds.lat_span());
    }

    #[test]
    fn graticule_step_shrinks_when_zooming_in() {
        let mut view = london_view();
        let coarse = view.graticule_step(100.0);
        view.zoom_at(8.0, 400.0, 300.0);
        let fine = view.graticule_step(100.0);
        assert!(fine < coarse);
        assert!(GRID_STEPS.contains(&fine));
    }
}
