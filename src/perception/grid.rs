/// Grid cell addressing.
///
/// Partitions a screen into `cols × rows` cells labelled spreadsheet-style so
/// that a vision model can name a location (e.g. "C4") instead of guessing
/// raw pixel coordinates.
///
/// Labeling convention:
///   - Columns: A, B, C … (left → right), at most 26
///   - Rows:    1, 2, 3 … (top  → bottom)
///
/// `cell_to_pixel` is partial: a bad label is an error, never a guessed tap.
/// `pixel_to_cell` is total: out-of-range points clamp to the nearest edge cell.
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::{GridTapError, GridTapResult};

pub const DEFAULT_COLS: u32 = 20;
pub const DEFAULT_ROWS: u32 = 40;
/// Single-letter column labels only.
pub const MAX_COLS: u32 = 26;
/// Row numbers are one or two digits.
pub const MAX_ROWS: u32 = 99;

/// Row numbers carry no leading zero, so every cell has exactly one label.
static LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z])([1-9][0-9]?)$").expect("Invalid cell label regex"));

static CELL_MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Za-z])([0-9]{1,2})\b").expect("Invalid cell mention regex")
});

/// Grid geometry for one screen size. Rebuild it when the resolution or
/// orientation changes.
#[derive(Debug, Clone, PartialEq)]
pub struct GridOverlay {
    screen_width: u32,
    screen_height: u32,
    cols: u32,
    rows: u32,
    cell_width: f64,
    cell_height: f64,
}

impl GridOverlay {
    pub fn new(screen_width: u32, screen_height: u32, cols: u32, rows: u32) -> GridTapResult<Self> {
        if screen_width == 0 || screen_height == 0 {
            return Err(GridTapError::GridConfig(format!(
                "screen size must be positive, got {screen_width}x{screen_height}"
            )));
        }
        if cols == 0 || cols > MAX_COLS {
            return Err(GridTapError::GridConfig(format!(
                "cols must be in 1..={MAX_COLS}, got {cols}"
            )));
        }
        if rows == 0 || rows > MAX_ROWS {
            return Err(GridTapError::GridConfig(format!(
                "rows must be in 1..={MAX_ROWS}, got {rows}"
            )));
        }
        Ok(Self {
            screen_width,
            screen_height,
            cols,
            rows,
            cell_width: f64::from(screen_width) / f64::from(cols),
            cell_height: f64::from(screen_height) / f64::from(rows),
        })
    }

    /// 20×40 grid.
    pub fn with_defaults(screen_width: u32, screen_height: u32) -> GridTapResult<Self> {
        Self::new(screen_width, screen_height, DEFAULT_COLS, DEFAULT_ROWS)
    }

    pub fn screen_width(&self) -> u32 {
        self.screen_width
    }

    pub fn screen_height(&self) -> u32 {
        self.screen_height
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    /// Last column letter, e.g. 'T' for 20 columns.
    pub fn last_col_letter(&self) -> char {
        col_letter(self.cols - 1)
    }

    /// Parse and bounds-check a label into zero-based `(col, row)`.
    pub fn parse_label(&self, label: &str) -> GridTapResult<(u32, u32)> {
        let normalized = label.trim().to_ascii_uppercase();
        let caps = LABEL_RE
            .captures(&normalized)
            .ok_or_else(|| self.invalid_label(label, "expected one letter followed by a row number 1-99"))?;

        let col = caps[1].as_bytes()[0] - b'A';
        let row_number: u32 = caps[2]
            .parse()
            .map_err(|_| self.invalid_label(label, "row is not a number"))?;
        let col = u32::from(col);

        if col >= self.cols {
            return Err(self.invalid_label(label, "column out of range"));
        }
        if row_number == 0 || row_number > self.rows {
            return Err(self.invalid_label(label, "row out of range"));
        }
        Ok((col, row_number - 1))
    }

    /// Pixel centre of cell `(col, row)`, floored.
    pub fn cell_center(&self, col: u32, row: u32) -> (i32, i32) {
        let x = ((f64::from(col) + 0.5) * self.cell_width).floor() as i32;
        let y = ((f64::from(row) + 0.5) * self.cell_height).floor() as i32;
        (x, y)
    }

    /// Pixel centre of the cell named by `label`.
    pub fn cell_to_pixel(&self, label: &str) -> GridTapResult<(i32, i32)> {
        let (col, row) = self.parse_label(label)?;
        Ok(self.cell_center(col, row))
    }

    /// Label of the cell containing `(x, y)`, clamped into the grid.
    pub fn pixel_to_cell(&self, x: i32, y: i32) -> String {
        let col = clamp_index(f64::from(x) / self.cell_width, self.cols);
        let row = clamp_index(f64::from(y) / self.cell_height, self.rows);
        cell_label(col, row)
    }

    /// In-grid cell labels mentioned in free text, in first-seen order without duplicates.
    pub fn scan_cells(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for caps in CELL_MENTION_RE.captures_iter(text) {
            let candidate = format!("{}{}", &caps[1], &caps[2]);
            let Ok((col, row)) = self.parse_label(&candidate) else {
                continue;
            };
            let label = cell_label(col, row);
            if !found.contains(&label) {
                found.push(label);
            }
        }
        found
    }

    /// Prompt text explaining the grid to a vision model.
    pub fn describe(&self) -> String {
        let last = self.last_col_letter();
        let centre = cell_label((self.cols - 1) / 2, (self.rows - 1) / 2);
        format!(
            "## Grid System\n\
             The screen has a {cols}x{rows} grid overlay for precise targeting:\n\
             - Columns: A-{last} (left to right, {cols} columns)\n\
             - Rows: 1-{rows} (top to bottom, {rows} rows)\n\
             - Cell size: ~{cw}x{ch} pixels\n\n\
             Major gridlines are drawn every 5 cells for easy reference.\n\
             Labels are printed at regular intervals (A1, A3 ... C1, C3 ...).\n\n\
             Examples:\n\
             - A1 = top-left corner\n\
             - {last}{rows} = bottom-right corner\n\
             - {centre} = center of screen\n\n\
             Always reply with a single cell label such as \"C5\" when locating an element.",
            cols = self.cols,
            rows = self.rows,
            last = last,
            cw = self.cell_width as u32,
            ch = self.cell_height as u32,
            centre = centre,
        )
    }

    fn invalid_label(&self, label: &str, reason: &str) -> GridTapError {
        GridTapError::InvalidCellLabel(format!(
            "{label:?}: {reason}; use columns A-{} and rows 1-{}",
            self.last_col_letter(),
            self.rows
        ))
    }
}

/// Convert a zero-based column number to its letter. Callers keep `col < 26`.
pub fn col_letter(col: u32) -> char {
    char::from(b'A' + col.min(MAX_COLS - 1) as u8)
}

/// Full label for a grid cell: col=2, row=3 → "C4".
pub fn cell_label(col: u32, row: u32) -> String {
    format!("{}{}", col_letter(col), row + 1)
}

fn clamp_index(position: f64, count: u32) -> u32 {
    let idx = position.floor();
    if idx.is_nan() || idx < 0.0 {
        0
    } else {
        (idx as u64).min(u64::from(count - 1)) as u32
    }
}
