#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapShortcut {
    ToggleDrawing,
    Clear,
    Copy,
    CancelDrawing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StampShortcut {
    Circle,
    Square,
    Clear,
}

/// `modifier` is Ctrl on most platforms and Cmd on macOS.
pub fn map_shortcut(key: &str, modifier: bool, shift: bool) -> Option<MapShortcut> {
    if key == "Escape" {
        return Some(MapShortcut::CancelDrawing);
    }
    if !modifier {
        return None;
    }
    match key.to_ascii_lowercase().as_str() {
        "d" => Some(MapShortcut::ToggleDrawing),
        "x" => Some(MapShortcut::Clear),
        "c" if shift => Some(MapShortcut::Copy),
        _ => None,
    }
}

pub fn stamp_shortcut(key: &str, modifier: bool, shift: bool) -> Option<StampShortcut> {
    if !modifier {
        return None;
    }
    match key.to_ascii_lowercase().as_str() {
        "1" => Some(StampShortcut::Circle),
        "2" => Some(StampShortcut::Square),
        "c" if !shift => Some(StampShortcut::Clear),
        _ => None,
    }
}
