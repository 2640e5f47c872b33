use serde::{Deserialize, Serialize};

pub const DEFAULT_COLOR: &str = "#3498db";
pub const DEFAULT_SIZE: f64 = 30.0;
pub const MIN_SIZE: f64 = 5.0;
pub const MAX_SIZE: f64 = 100.0;
const MAX_COLOR_CHARS: usize = 32;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StampShape {
    #[default]
    Circle,
    Square,
}

impl StampShape {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "circle" => Some(StampShape::Circle),
            "square" => Some(StampShape::Square),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StampShape::Circle => "circle",
            StampShape::Square => "square",
        }
    }
}

pub fn sanitize_color(mut color: String) -> String {
    if color.is_empty() {
        return DEFAULT_COLOR.to_string();
    }
    if let Some((cut, _)) = color.char_indices().nth(MAX_COLOR_CHARS) {
        color.truncate(cut);
    }
    color
}

pub fn sanitize_size(size: f64) -> f64 {
    let size = if size.is_finite() { size } else { DEFAULT_SIZE };
    size.clamp(MIN_SIZE, MAX_SIZE)
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Brush {
    pub shape: StampShape,
    pub color: String,
    pub size: f64,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            shape: StampShape::Circle,
            color: DEFAULT_COLOR.to_string(),
            size: DEFAULT_SIZE,
        }
    }
}

impl Brush {
    pub fn set_color(&mut self, color: String) {
        self.color = sanitize_color(color);
    }

    pub fn set_size(&mut self, size: f64) {
        self.size = sanitize_size(size);
    }
}

/// One shape centered on `(x, y)` in canvas pixels.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Stamp {
    pub x: f64,
    pub y: f64,
    pub shape: StampShape,
    pub color: String,
    pub size: f64,
}

#[derive(Default)]
pub struct StampPad {
    pub brush: Brush,
    pressed: bool,
    stamps: Vec<Stamp>,
}

impl StampPad {
    pub fn new(brush: Brush) -> Self {
        Self {
            brush,
            pressed: false,
            stamps: Vec::new(),
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn stamps(&self) -> &[Stamp] {
        &self.stamps
    }

    pub fn press(&mut self, x: f64, y: f64) -> Option<Stamp> {
        self.pressed = true;
        self.stamp(x, y)
    }

    pub fn drag(&mut self, x: f64, y: f64) -> Option<Stamp> {
        if !self.pressed {
            return None;
        }
        self.stamp(x, y)
    }

    pub fn release(&mut self) {
        self.pressed = false;
    }

    pub fn clear(&mut self) {
        self.stamps.clear();
    }

    fn stamp(&mut self, x: f64, y: f64) -> Option<Stamp> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let stamp = Stamp {
            x,
            y,
            shape: self.brush.shape,
            color: self.brush.color.clone(),
            size: self.brush.size,
        };
        self.stamps.push(stamp.clone());
        Some(stamp)
    }
}
