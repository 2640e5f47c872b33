use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use geobox_shared::{topmost_box_at, BoxDisplay, CommittedBox, CoordinateSummary, GeoPoint};

use crate::dom::{get_element, set_hidden, set_text};

pub struct PanelElements {
    pub panel: Element,
    pub north: Element,
    pub south: Element,
    pub east: Element,
    pub west: Element,
    pub center: Element,
    pub area: Element,
    pub dimensions: Element,
    pub distance: Element,
}

impl PanelElements {
    pub fn lookup(document: &Document) -> Result<Self, JsValue> {
        Ok(Self {
            panel: get_element(document, "coordinate-panel")?,
            north: get_element(document, "north-coord")?,
            south: get_element(document, "south-coord")?,
            east: get_element(document, "east-coord")?,
            west: get_element(document, "west-coord")?,
            center: get_element(document, "center-coord")?,
            area: get_element(document, "area-info")?,
            dimensions: get_element(document, "dimensions-info")?,
            distance: get_element(document, "distance-info")?,
        })
    }

    fn fill(&self, summary: &CoordinateSummary) {
        set_text(&self.north, &summary.north);
        set_text(&self.south, &summary.south);
        set_text(&self.east, &summary.east);
        set_text(&self.west, &summary.west);
        set_text(&self.center, &summary.center);
        set_text(&self.area, &summary.area);
        set_text(&self.dimensions, &summary.dimensions);
        set_text(&self.distance, &summary.diagonal);
    }

    fn reset(&self) {
        for element in [
            &self.north,
            &self.south,
            &self.east,
            &self.west,
            &self.center,
            &self.area,
            &self.dimensions,
            &self.distance,
        ] {
            set_text(element, "—");
        }
    }
}

/// Keeps every committed box on the map and the selected one in the
/// coordinate panel. A new commit becomes the selection.
pub struct BoxPanel {
    elements: PanelElements,
    boxes: Vec<CommittedBox>,
    selected: Option<usize>,
    changed: bool,
}

impl BoxPanel {
    pub fn new(elements: PanelElements) -> Self {
        elements.reset();
        set_hidden(&elements.panel, true);
        Self {
            elements,
            boxes: Vec::new(),
            selected: None,
            changed: false,
        }
    }

    pub fn boxes(&self) -> &[CommittedBox] {
        &self.boxes
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&CommittedBox> {
        self.selected.and_then(|index| self.boxes.get(index))
    }

    /// Shows the topmost box under `point`. Returns false on a miss.
    pub fn select_at(&mut self, point: GeoPoint) -> bool {
        let Some(index) = topmost_box_at(&self.boxes, point) else {
            return false;
        };
        self.show(index);
        log::debug!("selected box {index}");
        true
    }

    fn show(&mut self, index: usize) {
        let Some(committed) = self.boxes.get(index) else {
            return;
        };
        self.elements.fill(&CoordinateSummary::from(committed));
        set_hidden(&self.elements.panel, false);
        self.selected = Some(index);
        self.changed = true;
    }

    pub fn hide(&self) {
        set_hidden(&self.elements.panel, true);
    }

    pub fn take_changed(&mut self) -> bool {
        std::mem::replace(&mut self.changed, false)
    }
}

impl BoxDisplay for BoxPanel {
    fn on_box_committed(&mut self, committed: CommittedBox) {
        self.boxes.push(committed);
        self.show(self.boxes.len() - 1);
    }

    fn on_cleared(&mut self) {
        self.boxes.clear();
        self.selected = None;
        self.elements.reset();
        set_hidden(&self.elements.panel, true);
        self.changed = true;
    }
}
