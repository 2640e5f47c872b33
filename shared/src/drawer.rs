use serde::{Deserialize, Serialize};

use crate::{BoundingBox, CommittedBox, GeoPoint};

/// Slack for spans that land a hair under the threshold after
/// decimal-to-binary rounding (51.501 - 51.500 < 0.001 in f64).
const SPAN_TOLERANCE_DEG: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cursor {
    Default,
    Crosshair,
}

impl Cursor {
    pub fn css(self) -> &'static str {
        match self {
            Cursor::Default => "",
            Cursor::Crosshair => "crosshair",
        }
    }
}

/// The map or canvas the drawer is attached to.
pub trait MapHost {
    type Pointer;

    fn project_pointer(&self, pointer: &Self::Pointer) -> Option<GeoPoint>;
    fn draw_preview(&mut self, bounds: &BoundingBox);
    fn remove_preview(&mut self);
    /// Pan, zoom and double-click zoom.
    fn set_interactions_enabled(&mut self, enabled: bool);
    fn set_cursor(&mut self, cursor: Cursor);
}

/// Receives finished boxes.
pub trait BoxDisplay {
    fn on_box_committed(&mut self, committed: CommittedBox);
    fn on_cleared(&mut self);
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MinimumSize {
    /// Both the latitude and the longitude span must reach this many degrees.
    Degrees(f64),
}

impl MinimumSize {
    pub fn admits(&self, bounds: &BoundingBox) -> bool {
        if bounds.is_degenerate() {
            return false;
        }
        match *self {
            MinimumSize::Degrees(min) => {
                bounds.lat_span() + SPAN_TOLERANCE_DEG >= min
                    && bounds.lng_span() + SPAN_TOLERANCE_DEG >= min
            }
        }
    }
}

impl Default for MinimumSize {
    fn default() -> Self {
        MinimumSize::Degrees(0.001)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
#[serde(default)]
pub struct DrawerConfig {
    pub minimum_size: MinimumSize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    Idle,
    Drawing {
        anchor: Option<GeoPoint>,
        preview: Option<BoundingBox>,
    },
}

/// Bounding-box gesture state machine.
///
/// `Idle` leaves the host's pan/zoom alone. `toggle` enters `Drawing`, where
/// pan/zoom are disabled, the first pointer-down sets the anchor and every
/// move redraws the preview. Pointer-up either commits a [`CommittedBox`] to
/// the display or silently drops an undersized box; both paths return to
/// `Idle`.
pub struct BoundingBoxDrawer<H, D> {
    host: H,
    display: D,
    config: DrawerConfig,
    mode: Mode,
}

impl<H: MapHost, D: BoxDisplay> BoundingBoxDrawer<H, D> {
    pub fn new(host: H, display: D, config: DrawerConfig) -> Self {
        Self {
            host,
            display,
            config,
            mode: Mode::Idle,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.mode, Mode::Drawing { .. })
    }

    pub fn preview(&self) -> Option<BoundingBox> {
        match self.mode {
            Mode::Drawing { preview, .. } => preview,
            Mode::Idle => None,
        }
    }

    pub fn config(&self) -> &DrawerConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn toggle(&mut self) {
        match self.mode {
            Mode::Idle => {
                log::debug!("drawer: idle -> drawing");
                self.host.remove_preview();
                self.host.set_interactions_enabled(false);
                self.host.set_cursor(Cursor::Crosshair);
                self.mode = Mode::Drawing {
                    anchor: None,
                    preview: None,
                };
            }
            Mode::Drawing { .. } => self.cancel(),
        }
    }

    /// Abandons the current gesture. No-op when idle.
    pub fn cancel(&mut self) {
        let Mode::Drawing { preview, .. } = self.mode else {
            return;
        };
        log::debug!("drawer: drawing -> idle (cancelled)");
        if preview.is_some() {
            self.host.remove_preview();
        }
        self.finish();
    }

    pub fn clear(&mut self) {
        self.cancel();
        log::debug!("drawer: cleared");
        self.display.on_cleared();
    }

    pub fn pointer_down(&mut self, pointer: &H::Pointer) {
        let Mode::Drawing { anchor: None, .. } = self.mode else {
            return;
        };
        let Some(point) = self.project(pointer) else {
            return;
        };
        let preview = BoundingBox::from_corners(point, point);
        self.host.draw_preview(&preview);
        self.mode = Mode::Drawing {
            anchor: Some(point),
            preview: Some(preview),
        };
        log::debug!("drawer: anchor at {:.6}, {:.6}", point.lat, point.lng);
    }

    pub fn pointer_move(&mut self, pointer: &H::Pointer) {
        let Mode::Drawing {
            anchor: Some(anchor),
            ..
        } = self.mode
        else {
            return;
        };
        let Some(point) = self.project(pointer) else {
            return;
        };
        let preview = BoundingBox::from_corners(anchor, point);
        self.host.draw_preview(&preview);
        self.mode = Mode::Drawing {
            anchor: Some(anchor),
            preview: Some(preview),
        };
    }

    /// Returns the committed box, if the gesture produced one.
    pub fn pointer_up(&mut self, pointer: &H::Pointer) -> Option<CommittedBox> {
        let Mode::Drawing {
            anchor: Some(anchor),
            preview,
        } = self.mode
        else {
            return None;
        };
        // An unprojectable release point falls back to the last preview.
        let bounds = match self.project(pointer) {
            Some(point) => BoundingBox::from_corners(anchor, point),
            None => preview.unwrap_or_else(|| BoundingBox::from_corners(anchor, anchor)),
        };
        self.host.remove_preview();

        if !self.config.minimum_size.admits(&bounds) {
            log::debug!(
                "drawer: box too small ({:.6} x {:.6} deg), discarded",
                bounds.lat_span(),
                bounds.lng_span()
            );
            self.finish();
            return None;
        }

        let committed = CommittedBox::from_bounds(bounds);
        log::info!(
            "drawer: committed box n={:.6} s={:.6} e={:.6} w={:.6} area={:.2}km2",
            bounds.north,
            bounds.south,
            bounds.east,
            bounds.west,
            committed.area_km2
        );
        self.display.on_box_committed(committed);
        self.finish();
        Some(committed)
    }

    fn project(&self, pointer: &H::Pointer) -> Option<GeoPoint> {
        self.host
            .project_pointer(pointer)
            .and_then(GeoPoint::normalize)
    }

    fn finish(&mut self) {
        self.host.set_interactions_enabled(true);
        self.host.set_cursor(Cursor::Default);
        self.mode = Mode::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum HostCall {
        DrawPreview(BoundingBox),
        RemovePreview,
        Interactions(bool),
        Cursor(Cursor),
    }

    #[derive(Default)]
    struct RecordingHost {
        calls: Vec<HostCall>,
        interactions: Option<bool>,
        /// Pointer is off the map, e.g. over a control or outside the canvas.
        off_map: bool,
    }

    impl MapHost for RecordingHost {
        type Pointer = GeoPoint;

        fn project_pointer(&self, pointer: &GeoPoint) -> Option<GeoPoint> {
            if self.off_map {
                None
            } else {
                Some(*pointer)
            }
        }

        fn draw_preview(&mut self, bounds: &BoundingBox) {
            self.calls.push(HostCall::DrawPreview(*bounds));
        }

        fn remove_preview(&mut self) {
            self.calls.push(HostCall::RemovePreview);
        }

        fn set_interactions_enabled(&mut self, enabled: bool) {
            self.interactions = Some(enabled);
            self.calls.push(HostCall::Interactions(enabled));
        }

        fn set_cursor(&mut self, cursor: Cursor) {
            self.calls.push(HostCall::Cursor(cursor));
        }
    }

    #[derive(Default)]
    struct RecordingDisplay {
        committed: Vec<CommittedBox>,
        cleared: usize,
    }

    impl BoxDisplay for RecordingDisplay {
        fn on_box_committed(&mut self, committed: CommittedBox) {
            self.committed.push(committed);
        }

        fn on_cleared(&mut self) {
            self.cleared += 1;
        }
    }

    type TestDrawer = BoundingBoxDrawer<RecordingHost, RecordingDisplay>;

    fn drawer() -> TestDrawer {
        BoundingBoxDrawer::new(
            RecordingHost::default(),
            RecordingDisplay::default(),
            DrawerConfig::default(),
        )
    }

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng)
    }

    #[test]
    fn toggle_enters_drawing_and_locks_the_map() {
        let mut drawer = drawer();
        drawer.toggle();
        assert!(drawer.is_drawing());
        assert_eq!(
            drawer.host().calls,
            vec![
                HostCall::RemovePreview,
                HostCall::Interactions(false),
                HostCall::Cursor(Cursor::Crosshair),
            ]
        );
    }

    #[test]
    fn full_gesture_commits_once_and_returns_to_idle() {
        let mut drawer = drawer();
        drawer.toggle();
        drawer.pointer_down(&p(51.500, -0.100));
        drawer.pointer_move(&p(51.505, -0.090));
        let committed = drawer.pointer_up(&p(51.510, -0.080)).expect("box should commit");

        assert_eq!(
            committed.bounds,
            BoundingBox {
                north: 51.510,
                south: 51.500,
                east: -0.080,
                west: -0.100,
            }
        );
        assert!((committed.center.lat - 51.505).abs() < 1e-9);
        assert!((committed.center.lng + 0.090).abs() < 1e-9);
        assert_eq!(drawer.display().committed, vec![committed]);
        assert_eq!(drawer.mode(), Mode::Idle);
        assert_eq!(drawer.host().interactions, Some(true));
        assert_eq!(
            drawer.host().calls.last(),
            Some(&HostCall::Cursor(Cursor::Default))
        );
    }

    #[test]
    fn preview_follows_the_pointer() {
        let mut drawer = drawer();
        drawer.toggle();
        drawer.pointer_down(&p(10.0, 10.0));
        assert_eq!(
            drawer.preview(),
            Some(BoundingBox { north: 10.0, south: 10.0, east: 10.0, west: 10.0 })
        );
        drawer.pointer_move(&p(9.0, 12.0));
        let expected = BoundingBox { north: 10.0, south: 9.0, east: 12.0, west: 10.0 };
        assert_eq!(drawer.preview(), Some(expected));
        assert_eq!(
            drawer.host().calls.last(),
            Some(&HostCall::DrawPreview(expected))
        );
    }

    #[test]
    fn tiny_drag_is_discarded() {
        let mut drawer = drawer();
        drawer.toggle();
        drawer.pointer_down(&p(51.500, -0.100));
        assert!(drawer.pointer_up(&p(51.5001, -0.0999)).is_none());
        assert!(drawer.display().committed.is_empty());
        assert_eq!(drawer.mode(), Mode::Idle);
        assert_eq!(drawer.host().interactions, Some(true));
        assert!(drawer.host().calls.contains(&HostCall::RemovePreview));
    }

    #[test]
    fn drag_of_exactly_the_threshold_commits() {
        let mut drawer = drawer();
        drawer.toggle();
        drawer.pointer_down(&p(51.500, -0.100));
        assert!(drawer.pointer_up(&p(51.501, -0.099)).is_some());
    }

    #[test]
    fn drag_below_threshold_on_one_axis_is_discarded() {
        let mut drawer = drawer();
        drawer.toggle();
        drawer.pointer_down(&p(51.500, -0.100));
        assert!(drawer.pointer_up(&p(51.600, -0.0995)).is_none());
        assert_eq!(drawer.mode(), Mode::Idle);

        drawer.toggle();
        drawer.pointer_down(&p(51.500, -0.100));
        assert!(drawer.pointer_up(&p(51.5005, 0.5)).is_none());
        assert!(drawer.display().committed.is_empty());
    }

    #[test]
    fn click_without_drag_is_discarded() {
        let mut drawer = drawer();
        drawer.toggle();
        drawer.pointer_down(&p(1.0, 1.0));
        assert!(drawer.pointer_up(&p(1.0, 1.0)).is_none());
        assert!(drawer.display().committed.is_empty());
    }

    #[test]
    fn cancel_mid_gesture_removes_preview_and_unlocks() {
        let mut drawer = drawer();
        drawer.toggle();
        drawer.pointer_down(&p(51.500, -0.100));
        drawer.pointer_move(&p(51.600, 0.100));
        drawer.toggle();

        assert_eq!(drawer.mode(), Mode::Idle);
        assert!(drawer.display().committed.is_empty());
        let calls = &drawer.host().calls;
        let tail = &calls[calls.len() - 3..];
        assert_eq!(
            tail,
            &[
                HostCall::RemovePreview,
                HostCall::Interactions(true),
                HostCall::Cursor(Cursor::Default),
            ]
        );

        // The late pointer-up belongs to no gesture.
        assert!(drawer.pointer_up(&p(51.700, 0.200)).is_none());
        assert!(drawer.display().committed.is_empty());
    }

    #[test]
    fn cancel_while_idle_is_a_no_op() {
        let mut drawer = drawer();
        drawer.cancel();
        drawer.cancel();
        assert_eq!(drawer.mode(), Mode::Idle);
        assert!(drawer.host().calls.is_empty());
    }

    #[test]
    fn pointer_up_without_anchor_is_ignored() {
        let mut drawer = drawer();
        drawer.toggle();
        let calls_before = drawer.host().calls.len();
        assert!(drawer.pointer_up(&p(5.0, 5.0)).is_none());
        assert!(drawer.is_drawing());
        assert_eq!(drawer.host().calls.len(), calls_before);
    }

    #[test]
    fn pointer_events_while_idle_are_ignored() {
        let mut drawer = drawer();
        drawer.pointer_down(&p(1.0, 1.0));
        drawer.pointer_move(&p(2.0, 2.0));
        assert!(drawer.pointer_up(&p(2.0, 2.0)).is_none());
        assert!(drawer.host().calls.is_empty());
        assert!(drawer.display().committed.is_empty());
    }

    #[test]
    fn second_pointer_down_keeps_the_first_anchor() {
        let mut drawer = drawer();
        drawer.toggle();
        drawer.pointer_down(&p(1.0, 1.0));
        drawer.pointer_down(&p(5.0, 5.0));
        let committed = drawer.pointer_up(&p(2.0, 2.0)).unwrap();
        assert_eq!(committed.bounds.south, 1.0);
        assert_eq!(committed.bounds.north, 2.0);
    }

    #[test]
    fn off_map_release_commits_the_last_preview() {
        let mut drawer = drawer();
        drawer.toggle();
        drawer.pointer_down(&p(51.500, -0.100));
        drawer.pointer_move(&p(51.510, -0.080));
        let preview = drawer.preview();

        drawer.host_mut().off_map = true;
        let committed = drawer.pointer_up(&p(0.0, 0.0)).expect("preview should commit");
        assert_eq!(Some(committed.bounds), preview);
        assert_eq!(drawer.mode(), Mode::Idle);
        assert_eq!(drawer.display().committed.len(), 1);
    }

    #[test]
    fn off_map_release_without_movement_is_discarded() {
        let mut drawer = drawer();
        drawer.toggle();
        drawer.pointer_down(&p(1.0, 1.0));
        drawer.host_mut().off_map = true;
        assert!(drawer.pointer_up(&p(2.0, 2.0)).is_none());
        assert!(drawer.display().committed.is_empty());
        assert_eq!(drawer.mode(), Mode::Idle);
        assert_eq!(drawer.host().interactions, Some(true));
    }

    #[test]
    fn move_before_anchor_does_nothing() {
        let mut drawer = drawer();
        drawer.toggle();
        let calls_before = drawer.host().calls.len();
        drawer.pointer_move(&p(3.0, 3.0));
        assert_eq!(drawer.preview(), None);
        assert_eq!(drawer.host().calls.len(), calls_before);
        assert_eq!(
            drawer.mode(),
            Mode::Drawing {
                anchor: None,
                preview: None
            }
        );
    }

    #[test]
    fn off_map_pointer_down_sets_no_anchor() {
        let mut drawer = drawer();
        drawer.toggle();
        drawer.host_mut().off_map = true;
        let calls_before = drawer.host().calls.len();
        drawer.pointer_down(&p(1.0, 1.0));
        assert_eq!(drawer.host().calls.len(), calls_before);
        assert_eq!(
            drawer.mode(),
            Mode::Drawing {
                anchor: None,
                preview: None
            }
        );

        drawer.host_mut().off_map = false;
        assert!(drawer.pointer_up(&p(2.0, 2.0)).is_none());
        assert!(drawer.is_drawing());
    }

    #[test]
    fn clear_cancels_and_notifies_display() {
        let mut drawer = drawer();
        drawer.toggle();
        drawer.pointer_down(&p(1.0, 1.0));
        drawer.clear();
        assert_eq!(drawer.mode(), Mode::Idle);
        assert_eq!(drawer.display().cleared, 1);

        drawer.clear();
        assert_eq!(drawer.display().cleared, 2);
    }

    #[test]
    fn commits_are_independent_snapshots() {
        let mut drawer = drawer();
        for offset in [0.0, 1.0] {
            drawer.toggle();
            drawer.pointer_down(&p(offset, offset));
            drawer.pointer_up(&p(offset + 0.5, offset + 0.5));
        }
        let committed = &drawer.display().committed;
        assert_eq!(committed.len(), 2);
        assert_eq!(committed[0].bounds.south, 0.0);
        assert_eq!(committed[1].bounds.south, 1.0);
    }

    #[test]
    fn custom_threshold_is_honoured() {
        let config = DrawerConfig {
            minimum_size: MinimumSize::Degrees(0.5),
        };
        let mut drawer =
            BoundingBoxDrawer::new(RecordingHost::default(), RecordingDisplay::default(), config);
        assert_eq!(drawer.config(), &config);
        drawer.toggle();
        drawer.pointer_down(&p(0.0, 0.0));
        assert!(drawer.pointer_up(&p(0.4, 0.4)).is_none());
        drawer.toggle();
        drawer.pointer_down(&p(0.0, 0.0));
        assert!(drawer.pointer_up(&p(0.5, 0.5)).is_some());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: DrawerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DrawerConfig::default());
        let config: DrawerConfig =
            serde_json::from_str(r#"{"minimum_size":{"kind":"degrees","value":0.01}}"#).unwrap();
        assert_eq!(config.minimum_size, MinimumSize::Degrees(0.01));
    }
}
