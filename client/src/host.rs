use web_sys::HtmlCanvasElement;

use geobox_shared::{BoundingBox, Cursor, GeoPoint, MapHost, Viewport};

use crate::dom::set_cursor;

/// Canvas-backed map: owns the viewport, the in-progress preview and the
/// pan/zoom lock. Drawing happens in `render::redraw_map` whenever
/// `take_dirty` reports a change.
pub struct CanvasHost {
    pub canvas: HtmlCanvasElement,
    pub viewport: Viewport,
    preview: Option<BoundingBox>,
    interactions_enabled: bool,
    cursor: Cursor,
    dirty: bool,
}

impl CanvasHost {
    pub fn new(canvas: HtmlCanvasElement, viewport: Viewport) -> Self {
        Self {
            canvas,
            viewport,
            preview: None,
            interactions_enabled: true,
            cursor: Cursor::Default,
            dirty: true,
        }
    }

    pub fn preview(&self) -> Option<&BoundingBox> {
        self.preview.as_ref()
    }

    pub fn interactions_enabled(&self) -> bool {
        self.interactions_enabled
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Shows the pan cursor while idle.
    pub fn set_grabbing(&self, grabbing: bool) {
        if self.cursor != Cursor::Default {
            return;
        }
        set_cursor(&self.canvas, if grabbing { "grabbing" } else { "grab" });
    }
}

impl MapHost for CanvasHost {
    type Pointer = (f64, f64);

    fn project_pointer(&self, pointer: &(f64, f64)) -> Option<GeoPoint> {
        self.viewport.screen_to_geo(pointer.0, pointer.1)
    }

    fn draw_preview(&mut self, bounds: &BoundingBox) {
        self.preview = Some(*bounds);
        self.dirty = true;
    }

    fn remove_preview(&mut self) {
        if self.preview.take().is_some() {
            self.dirty = true;
        }
    }

    fn set_interactions_enabled(&mut self, enabled: bool) {
        self.interactions_enabled = enabled;
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
        match cursor {
            Cursor::Default => set_cursor(&self.canvas, "grab"),
            Cursor::Crosshair => set_cursor(&self.canvas, cursor.css()),
        }
    }
}
