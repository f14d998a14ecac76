/// Grid overlay rendering.
///
/// Draws the cell grid of a [`GridOverlay`] onto a screenshot so a vision
/// model can read cell labels off the image. Every boundary gets a line;
/// every `major_every`-th boundary is drawn heavier. Only every
/// `label_every`-th column and row is labelled.
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::errors::{GridTapError, GridTapResult};
use crate::perception::font;
use crate::perception::grid::{cell_label, GridOverlay};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub label_every: u32,
    pub major_every: u32,
    pub line_colour: [u8; 3],
    pub minor_alpha: u8,
    pub major_alpha: u8,
    pub label_colour: [u8; 3],
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            label_every: 2,
            major_every: 5,
            line_colour: [255, 0, 0],
            minor_alpha: 100,
            major_alpha: 200,
            label_colour: [255, 255, 0],
        }
    }
}

/// Decode `src_bytes` (PNG/JPEG), draw the grid and return PNG bytes.
pub fn render_overlay(
    grid: &GridOverlay,
    src_bytes: &[u8],
    style: &OverlayStyle,
) -> GridTapResult<Vec<u8>> {
    let img = image::load_from_memory(src_bytes)
        .map_err(|e| GridTapError::ImageDecode(format!("load screenshot: {e}")))?;
    let canvas = render_overlay_image(grid, &img, style);

    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(canvas)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| GridTapError::ImageEncode(format!("PNG encode: {e}")))?;
    Ok(out)
}

/// Draw the grid onto a copy of `img`; the input is left untouched.
///
/// Cell geometry follows the image's own size, so a screenshot captured at a
/// different resolution than the grid's screen still lines up cell-for-cell.
pub fn render_overlay_image(
    grid: &GridOverlay,
    img: &image::DynamicImage,
    style: &OverlayStyle,
) -> image::RgbaImage {
    let mut canvas = img.to_rgba8();
    let (w, h) = canvas.dimensions();
    if w == 0 || h == 0 {
        return canvas;
    }
    if (w, h) != (grid.screen_width(), grid.screen_height()) {
        tracing::debug!(
            image_w = w,
            image_h = h,
            screen_w = grid.screen_width(),
            screen_h = grid.screen_height(),
            "screenshot size differs from grid screen; scaling cells to image"
        );
    }

    let cell_w = f64::from(w) / f64::from(grid.cols());
    let cell_h = f64::from(h) / f64::from(grid.rows());
    let major_every = style.major_every.max(1);
    let label_every = style.label_every.max(1) as usize;
    let [lr, lg, lb] = style.line_colour;

    // ── Grid lines ────────────────────────────────────────────────────────
    for col in 0..=grid.cols() {
        let major = col % major_every == 0;
        let (thickness, alpha) = line_weight(major, style);
        let x0 = ((f64::from(col) * cell_w).floor() as u32).min(w.saturating_sub(thickness));
        for x in x0..(x0 + thickness).min(w) {
            for y in 0..h {
                blend_pixel(canvas.get_pixel_mut(x, y), lr, lg, lb, alpha);
            }
        }
    }
    for row in 0..=grid.rows() {
        let major = row % major_every == 0;
        let (thickness, alpha) = line_weight(major, style);
        let y0 = ((f64::from(row) * cell_h).floor() as u32).min(h.saturating_sub(thickness));
        for y in y0..(y0 + thickness).min(h) {
            for x in 0..w {
                blend_pixel(canvas.get_pixel_mut(x, y), lr, lg, lb, alpha);
            }
        }
    }

    // ── Labels at every Nth cell origin ───────────────────────────────────
    // scale=2 once cells are wide enough to fit 10px glyphs comfortably.
    let scale: u32 = if cell_w >= 80.0 { 2 } else { 1 };
    let pad = 2u32;
    let mut drawn = 0usize;
    for col in (0..grid.cols()).step_by(label_every) {
        for row in (0..grid.rows()).step_by(label_every) {
            let label = cell_label(col, row);
            let lx = (f64::from(col) * cell_w).floor() as u32 + pad;
            let ly = (f64::from(row) * cell_h).floor() as u32 + pad;
            if lx >= w || ly >= h {
                continue;
            }
            darken_box(&mut canvas, lx, ly, font::text_extent(&label, scale));
            font::draw_text(&mut canvas, &label, lx, ly, scale, style.label_colour);
            drawn += 1;
        }
    }

    tracing::debug!(cols = grid.cols(), rows = grid.rows(), labels = drawn, "grid overlay rendered");
    canvas
}

/// `data:image/png;base64,...` URL for a PNG payload.
pub fn to_data_url(png_bytes: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(png_bytes)
    )
}

fn line_weight(major: bool, style: &OverlayStyle) -> (u32, u8) {
    if major {
        (2, style.major_alpha)
    } else {
        (1, style.minor_alpha)
    }
}

/// Dark backing box with a 1px margin around the label text.
fn darken_box(canvas: &mut image::RgbaImage, lx: u32, ly: u32, extent: (u32, u32)) {
    let (w, h) = canvas.dimensions();
    let bx = lx.saturating_sub(1);
    let by = ly.saturating_sub(1);
    let bw = (extent.0 + 2).min(w.saturating_sub(bx));
    let bh = (extent.1 + 2).min(h.saturating_sub(by));
    for dy in 0..bh {
        for dx in 0..bw {
            let p = canvas.get_pixel_mut(bx + dx, by + dy);
            p[0] = (p[0] as f32 * 0.25) as u8;
            p[1] = (p[1] as f32 * 0.25) as u8;
            p[2] = (p[2] as f32 * 0.25) as u8;
            p[3] = 255;
        }
    }
}

fn blend_pixel(pixel: &mut image::Rgba<u8>, r: u8, g: u8, b: u8, a: u8) {
    let alpha = a as f32 / 255.0;
    pixel[0] = (pixel[0] as f32 * (1.0 - alpha) + r as f32 * alpha).round() as u8;
    pixel[1] = (pixel[1] as f32 * (1.0 - alpha) + g as f32 * alpha).round() as u8;
    pixel[2] = (pixel[2] as f32 * (1.0 - alpha) + b as f32 * alpha).round() as u8;
}
