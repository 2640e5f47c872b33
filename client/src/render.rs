use web_sys::CanvasRenderingContext2d;

use geobox_shared::{BoundingBox, GeoPoint, Stamp, StampShape, Viewport};

use crate::state::{MapState, StampState, GRID_SPACING_PX};

const BOX_COLOR: &str = "#e74c3c";
const BOX_FILL: &str = "rgba(231, 76, 60, 0.1)";
const MAP_BACKGROUND: &str = "#eef2f5";
const GRID_COLOR: &str = "rgba(26, 31, 42, 0.12)";
const LABEL_COLOR: &str = "rgba(26, 31, 42, 0.55)";
const MAX_GRID_LINES: usize = 400;

fn label_decimals(step: f64) -> usize {
    match step {
        s if s >= 1.0 => 0,
        s if s >= 0.1 => 1,
        s if s >= 0.01 => 2,
        s if s >= 0.001 => 3,
        _ => 4,
    }
}

fn draw_graticule(ctx: &CanvasRenderingContext2d, viewport: &Viewport) {
    let Some(visible) = viewport.visible_bounds() else {
        return;
    };
    let step = viewport.graticule_step(GRID_SPACING_PX);
    let decimals = label_decimals(step);

    ctx.save();
    ctx.set_stroke_style_str(GRID_COLOR);
    ctx.set_fill_style_str(LABEL_COLOR);
    ctx.set_line_width(1.0);
    ctx.set_font("11px sans-serif");

    let mut lat = (visible.south / step).floor() * step;
    for _ in 0..MAX_GRID_LINES {
        if lat > visible.north {
            break;
        }
        let (_, y) = viewport.geo_to_screen(GeoPoint::new(lat, viewport.center.lng));
        ctx.begin_path();
        ctx.move_to(0.0, y);
        ctx.line_to(viewport.width, y);
        ctx.stroke();
        let _ = ctx.fill_text(&format!("{lat:.decimals$}°"), 4.0, y - 3.0);
        lat += step;
    }

    let mut lng = (visible.west / step).floor() * step;
    for _ in 0..MAX_GRID_LINES {
        if lng > visible.east {
            break;
        }
        let (x, _) = viewport.geo_to_screen(GeoPoint::new(viewport.center.lat, lng));
        ctx.begin_path();
        ctx.move_to(x, 0.0);
        ctx.line_to(x, viewport.height);
        ctx.stroke();
        let _ = ctx.fill_text(&format!("{lng:.decimals$}°"), x + 3.0, viewport.height - 4.0);
        lng += step;
    }
    ctx.restore();
}

fn box_rect(viewport: &Viewport, bounds: &BoundingBox) -> (f64, f64, f64, f64) {
    let (left, top) = viewport.geo_to_screen(bounds.north_west());
    let (right, bottom) = viewport.geo_to_screen(bounds.south_east());
    (left, top, right - left, bottom - top)
}

fn draw_box(
    ctx: &CanvasRenderingContext2d,
    viewport: &Viewport,
    bounds: &BoundingBox,
    line_width: f64,
) {
    let (x, y, width, height) = box_rect(viewport, bounds);
    ctx.set_fill_style_str(BOX_FILL);
    ctx.fill_rect(x, y, width, height);
    ctx.set_stroke_style_str(BOX_COLOR);
    ctx.set_line_width(line_width);
    ctx.stroke_rect(x, y, width, height);
}

fn draw_preview(ctx: &CanvasRenderingContext2d, viewport: &Viewport, bounds: &BoundingBox) {
    ctx.save();
    ctx.set_global_alpha(0.8);
    let _ = ctx.set_line_dash(&js_sys::Array::of2(&5.into(), &5.into()));
    draw_box(ctx, viewport, bounds, 2.0);
    let _ = ctx.set_line_dash(&js_sys::Array::new());
    ctx.restore();
}

pub fn redraw_map(state: &MapState) {
    let ctx = &state.ctx;
    let host = state.host();
    let viewport = &host.viewport;

    ctx.set_fill_style_str(MAP_BACKGROUND);
    ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);
    draw_graticule(ctx, viewport);

    let display = state.drawer.display();
    for (index, committed) in display.boxes().iter().enumerate() {
        let line_width = if display.selected_index() == Some(index) {
            3.5
        } else {
            2.0
        };
        draw_box(ctx, viewport, &committed.bounds, line_width);
    }
    if let Some(preview) = host.preview() {
        draw_preview(ctx, viewport, preview);
    }
}

pub fn draw_stamp(ctx: &CanvasRenderingContext2d, stamp: &Stamp) {
    ctx.set_fill_style_str(&stamp.color);
    ctx.set_stroke_style_str(&stamp.color);
    ctx.set_line_width(2.0);
    match stamp.shape {
        StampShape::Circle => {
            ctx.begin_path();
            let _ = ctx.arc(
                stamp.x,
                stamp.y,
                stamp.size / 2.0,
                0.0,
                std::f64::consts::PI * 2.0,
            );
            ctx.fill();
            ctx.stroke();
        }
        StampShape::Square => {
            let half = stamp.size / 2.0;
            ctx.fill_rect(stamp.x - half, stamp.y - half, stamp.size, stamp.size);
            ctx.stroke_rect(stamp.x - half, stamp.y - half, stamp.size, stamp.size);
        }
    }
}

pub fn clear_stamp_canvas(state: &StampState) {
    let width = state.canvas.width() as f64;
    let height = state.canvas.height() as f64;
    state.ctx.clear_rect(0.0, 0.0, width, height);
    state.ctx.set_fill_style_str("white");
    state.ctx.fill_rect(0.0, 0.0, width, height);
}

pub fn redraw_stamps(state: &StampState) {
    clear_stamp_canvas(state);
    for stamp in state.pad.stamps() {
        draw_stamp(&state.ctx, stamp);
    }
}
