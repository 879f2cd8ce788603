//! Image preview rendered with half-block cells.
//!
//! Each terminal cell shows two vertically stacked pixels: the upper one as
//! the foreground of `▀`, the lower one as the background.

use crate::error::{PaxError, Result};
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use ratatui::prelude::*;
use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::Path;

const UPPER_HALF_BLOCK: &str = "▀";

/// Cells rendered for one terminal size
struct RenderedCells {
    size: (u16, u16),
    lines: Vec<Line<'static>>,
}

/// Decoded image owned by the prompt while it is on screen.
///
/// The scaled cells are kept between redraws and only rebuilt when the
/// requested size changes.
pub struct PreviewImage {
    pixels: RgbaImage,
    rendered: RefCell<Option<RenderedCells>>,
    scale_passes: Cell<u32>,
}

impl PreviewImage {
    /// Read and decode `path`.
    ///
    /// A missing file is reported as a transient error so the caller can skip
    /// it; undecodable content is an image error.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PaxError::transient_file(path),
            _ => PaxError::Io(e),
        })?;

        let decoded = image::load_from_memory(&bytes)?;
        Ok(Self::from_rgba(decoded.to_rgba8()))
    }

    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels,
            rendered: RefCell::new(None),
            scale_passes: Cell::new(0),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Cell size (columns, rows) of the preview within the given bounds.
    pub fn fit(&self, max_cols: u16, max_rows: u16) -> (u16, u16) {
        let (width, height) = self.dimensions();
        fit_cells(width, height, max_cols, max_rows)
    }

    #[cfg(test)]
    fn scale_passes(&self) -> u32 {
        self.scale_passes.get()
    }

    /// Render into exactly `cols` x `rows` cells.
    pub fn render_lines(&self, cols: u16, rows: u16) -> Vec<Line<'static>> {
        if cols == 0 || rows == 0 {
            return Vec::new();
        }

        let mut rendered = self.rendered.borrow_mut();
        if let Some(cells) = rendered.as_ref().filter(|c| c.size == (cols, rows)) {
            return cells.lines.clone();
        }

        let lines = self.scale_into_cells(cols, rows);
        *rendered = Some(RenderedCells {
            size: (cols, rows),
            lines: lines.clone(),
        });
        lines
    }

    fn scale_into_cells(&self, cols: u16, rows: u16) -> Vec<Line<'static>> {
        let pass = self.scale_passes.get() + 1;
        self.scale_passes.set(pass);
        log::debug!("Scaling preview to {}x{} cells (pass {})", cols, rows, pass);

        let target = (u32::from(cols), u32::from(rows) * 2);
        let scaled = if self.pixels.dimensions() == target {
            self.pixels.clone()
        } else {
            image::imageops::resize(&self.pixels, target.0, target.1, FilterType::Triangle)
        };

        (0..u32::from(rows))
            .map(|row| {
                let spans: Vec<Span<'static>> = (0..u32::from(cols))
                    .map(|col| {
                        let top = scaled.get_pixel(col, row * 2);
                        let bottom = scaled.get_pixel(col, row * 2 + 1);
                        Span::styled(
                            UPPER_HALF_BLOCK,
                            Style::default().fg(to_color(top)).bg(to_color(bottom)),
                        )
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

/// Largest cell box that keeps the aspect ratio and never upscales.
pub fn fit_cells(width: u32, height: u32, max_cols: u16, max_rows: u16) -> (u16, u16) {
    if width == 0 || height == 0 || max_cols == 0 || max_rows == 0 {
        return (0, 0);
    }

    let max_w = f64::from(max_cols);
    let max_h = f64::from(max_rows) * 2.0;
    let scale = (max_w / f64::from(width))
        .min(max_h / f64::from(height))
        .min(1.0);

    let cols = ((f64::from(width) * scale).round() as u16).clamp(1, max_cols);
    let pixel_rows = (f64::from(height) * scale).round().max(1.0);
    let rows = ((pixel_rows / 2.0).ceil() as u16).clamp(1, max_rows);

    (cols, rows)
}

// Alpha is composited over black, the usual terminal background
fn to_color(pixel: &Rgba<u8>) -> Color {
    let [r, g, b, a] = pixel.0;
    let blend = |c: u8| ((u16::from(c) * u16::from(a)) / 255) as u8;
    Color::Rgb(blend(r), blend(g), blend(b))
}
