//! Caret placement for right-to-left text that wraps inside a fixed-width
//! container.
//!
//! Geometry describes the typed text as laid out on screen. The resolver keeps
//! the line count of its previous measurement so it can tell when the text has
//! just wrapped onto a new line, in which case the caret snaps to the start
//! (right edge) of that line.

use unicode_width::UnicodeWidthChar;

/// Horizontal space kept between the caret and the last typed glyph.
pub const CARET_GAP: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextGeometry {
    pub lines: Vec<LineBox>,
    pub container_width: f64,
}

impl TextGeometry {
    pub fn new(lines: Vec<LineBox>, container_width: f64) -> Self {
        Self {
            lines,
            container_width,
        }
    }

    /// Geometry with nothing laid out.
    pub fn empty(container_width: f64) -> Self {
        Self::new(Vec::new(), container_width)
    }

    fn total_width(&self) -> f64 {
        self.lines.iter().map(|line| line.width).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaretPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone)]
pub struct CaretResolver {
    gap: f64,
    prev_line_count: usize,
    dirty: bool,
    position: Option<CaretPosition>,
}

impl Default for CaretResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CaretResolver {
    pub fn new() -> Self {
        Self::with_gap(CARET_GAP)
    }

    pub fn with_gap(gap: f64) -> Self {
        Self {
            gap,
            prev_line_count: 0,
            dirty: true,
            position: None,
        }
    }

    pub fn resolve(&mut self, geometry: &TextGeometry, typed_len: usize) -> CaretPosition {
        let (first, last) = match (geometry.lines.first(), geometry.lines.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                self.prev_line_count = 0;
                return CaretPosition {
                    x: geometry.container_width,
                    y: 0.0,
                };
            }
        };

        let line_count = geometry.lines.len();
        let wrapped = self.prev_line_count > 0 && line_count > self.prev_line_count;
        self.prev_line_count = line_count;

        let y = last.top - first.top;
        if wrapped {
            return CaretPosition {
                x: geometry.container_width,
                y,
            };
        }

        let avg_char_width = geometry.total_width() / typed_len.max(1) as f64;
        let x = geometry.container_width - last.width - avg_char_width - self.gap;
        CaretPosition { x: x.max(0.0), y }
    }

    /// Typed text changed; recompute on the next frame.
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Last resolved position.
    pub fn position(&self) -> Option<CaretPosition> {
        self.position
    }

    /// Recompute at most once per frame, and only after an invalidation.
    pub fn on_frame(&mut self, geometry: &TextGeometry, typed_len: usize) -> Option<CaretPosition> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        let position = self.resolve(geometry, typed_len);
        self.position = Some(position);
        Some(position)
    }
}

/// Lay `text` out right to left in terminal cells, wrapping at
/// `container_width`. Each line is right-aligned.
pub fn measure_lines(text: &str, container_width: u16) -> TextGeometry {
    let container = f64::from(container_width);
    let mut widths: Vec<usize> = Vec::new();
    let mut current = 0usize;
    let mut started = false;

    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if current > 0 && current + w > container_width as usize {
            widths.push(current);
            current = 0;
        }
        current += w;
        started = true;
    }
    if started {
        widths.push(current);
    }

    let lines = widths
        .into_iter()
        .enumerate()
        .map(|(row, width)| {
            let width = width as f64;
            LineBox {
                left: (container - width).max(0.0),
                top: row as f64,
                width,
                height: 1.0,
            }
        })
        .collect();

    TextGeometry::new(lines, container)
}
