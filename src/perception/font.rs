// ── 5×5 bitmap font ──────────────────────────────────────────────────────────
// Each glyph: 5 rows, each row is a u8 where bit4=leftmost pixel, bit0=rightmost.
// Index 0–9 = digits '0'–'9', index 10–35 = letters 'A'–'Z'.
const FONT_5X5: [[u8; 5]; 36] = [
    [0b01110, 0b10001, 0b10001, 0b10001, 0b01110], // 0
    [0b00100, 0b01100, 0b00100, 0b00100, 0b01110], // 1
    [0b01110, 0b10001, 0b00110, 0b01000, 0b11111], // 2
    [0b11110, 0b00001, 0b00110, 0b00001, 0b11110], // 3
    [0b00110, 0b01010, 0b10010, 0b11111, 0b00010], // 4
    [0b11111, 0b10000, 0b11110, 0b00001, 0b11110], // 5
    [0b01110, 0b10000, 0b11110, 0b10001, 0b01110], // 6
    [0b11111, 0b00001, 0b00010, 0b00100, 0b00100], // 7
    [0b01110, 0b10001, 0b01110, 0b10001, 0b01110], // 8
    [0b01110, 0b10001, 0b01111, 0b00001, 0b01110], // 9
    [0b01110, 0b10001, 0b11111, 0b10001, 0b10001], // A
    [0b11110, 0b10001, 0b11110, 0b10001, 0b11110], // B
    [0b01110, 0b10000, 0b10000, 0b10000, 0b01110], // C
    [0b11100, 0b10010, 0b10001, 0b10010, 0b11100], // D
    [0b11111, 0b10000, 0b11110, 0b10000, 0b11111], // E
    [0b11111, 0b10000, 0b11110, 0b10000, 0b10000], // F
    [0b01110, 0b10000, 0b10011, 0b10001, 0b01110], // G
    [0b10001, 0b10001, 0b11111, 0b10001, 0b10001], // H
    [0b01110, 0b00100, 0b00100, 0b00100, 0b01110], // I
    [0b00111, 0b00010, 0b00010, 0b10010, 0b01100], // J
    [0b10001, 0b10010, 0b11100, 0b10010, 0b10001], // K
    [0b10000, 0b10000, 0b10000, 0b10000, 0b11111], // L
    [0b10001, 0b11011, 0b10101, 0b10001, 0b10001], // M
    [0b10001, 0b11001, 0b10101, 0b10011, 0b10001], // N
    [0b01110, 0b10001, 0b10001, 0b10001, 0b01110], // O
    [0b11110, 0b10001, 0b11110, 0b10000, 0b10000], // P
    [0b01110, 0b10001, 0b10101, 0b10010, 0b01101], // Q
    [0b11110, 0b10001, 0b11110, 0b10010, 0b10001], // R
    [0b01111, 0b10000, 0b01110, 0b00001, 0b11110], // S
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100], // T
    [0b10001, 0b10001, 0b10001, 0b10001, 0b01110], // U
    [0b10001, 0b10001, 0b10001, 0b01010, 0b00100], // V
    [0b10001, 0b10001, 0b10101, 0b11011, 0b10001], // W
    [0b10001, 0b01010, 0b00100, 0b01010, 0b10001], // X
    [0b10001, 0b01010, 0b00100, 0b00100, 0b00100], // Y
    [0b11111, 0b00010, 0b00100, 0b01000, 0b11111], // Z
];

pub const GLYPH_SIZE: u32 = 5;

fn glyph_for(c: char) -> Option<&'static [u8; 5]> {
    let idx = match c.to_ascii_uppercase() {
        d @ '0'..='9' => (d as u8 - b'0') as usize,
        l @ 'A'..='Z' => 10 + (l as u8 - b'A') as usize,
        _ => return None,
    };
    FONT_5X5.get(idx)
}

/// Pixel size of `text` drawn at `scale`, with a 1px gap between glyphs.
pub fn text_extent(text: &str, scale: u32) -> (u32, u32) {
    let n = text.chars().count() as u32;
    if n == 0 {
        return (0, 0);
    }
    let w = n * GLYPH_SIZE * scale + (n - 1);
    (w, GLYPH_SIZE * scale)
}

/// Draw `text` with its top-left corner at (px, py). Unknown characters
/// advance the cursor without drawing. Pixels outside the canvas are clipped.
pub fn draw_text(
    canvas: &mut image::RgbaImage,
    text: &str,
    px: u32,
    py: u32,
    scale: u32,
    colour: [u8; 3],
) {
    let (w, h) = canvas.dimensions();
    let step = GLYPH_SIZE * scale + 1;
    for (i, c) in text.chars().enumerate() {
        let Some(glyph) = glyph_for(c) else { continue };
        let gx = px + i as u32 * step;
        for (row, &bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if (bits >> (GLYPH_SIZE - 1 - col)) & 1 == 0 {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let x = gx + col * scale + sx;
                        let y = py + row as u32 * scale + sy;
                        if x < w && y < h {
                            let p = canvas.get_pixel_mut(x, y);
                            p[0] = colour[0];
                            p[1] = colour[1];
                            p[2] = colour[2];
                            p[3] = 255;
                        }
                    }
                }
            }
        }
    }
}
