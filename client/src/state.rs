use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use geobox_shared::{BoundingBoxDrawer, StampPad};

use crate::host::CanvasHost;
use crate::panel::BoxPanel;

pub const UNIT_SCROLL: f64 = 200.0;
pub const GRID_SPACING_PX: f64 = 120.0;
/// A pan that moves less than this is treated as a click on the map.
pub const CLICK_SLOP_PX: f64 = 4.0;

pub type Drawer = BoundingBoxDrawer<CanvasHost, BoxPanel>;

pub enum PanMode {
    Idle,
    Active {
        pointer_id: i32,
        start_x: f64,
        start_y: f64,
        last_x: f64,
        last_y: f64,
    },
}

impl PanMode {
    /// Ends the pan if `pointer_id` started it, returning where it began.
    pub fn end(&mut self, pointer_id: i32) -> Option<(f64, f64)> {
        match *self {
            PanMode::Active {
                pointer_id: owner,
                start_x,
                start_y,
                ..
            } if owner == pointer_id => {
                *self = PanMode::Idle;
                Some((start_x, start_y))
            }
            _ => None,
        }
    }
}

/// The pointer that owns the current gesture. Other pointers are ignored
/// until it lifts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerLock(Option<i32>);

impl PointerLock {
    pub fn claim(&mut self, pointer_id: i32) -> bool {
        if self.0.is_some() {
            return false;
        }
        self.0 = Some(pointer_id);
        true
    }

    pub fn owns(&self, pointer_id: i32) -> bool {
        self.0 == Some(pointer_id)
    }

    pub fn release(&mut self, pointer_id: i32) -> bool {
        if !self.owns(pointer_id) {
            return false;
        }
        self.0 = None;
        true
    }

    pub fn reset(&mut self) {
        self.0 = None;
    }
}

pub struct MapState {
    pub drawer: Drawer,
    pub ctx: CanvasRenderingContext2d,
    pub pan: PanMode,
    pub draw_pointer: PointerLock,
}

impl MapState {
    pub fn host(&self) -> &CanvasHost {
        self.drawer.host()
    }

    pub fn host_mut(&mut self) -> &mut CanvasHost {
        self.drawer.host_mut()
    }

    /// True when the preview, the committed boxes or the view changed.
    pub fn take_dirty(&mut self) -> bool {
        let host_dirty = self.drawer.host_mut().take_dirty();
        let panel_changed = self.drawer.display_mut().take_changed();
        host_dirty || panel_changed
    }
}

pub struct StampState {
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    pub pad: StampPad,
    pub pointer: PointerLock,
}
