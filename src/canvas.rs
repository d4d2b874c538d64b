// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;
use unicode_width::UnicodeWidthChar;

use crate::{
    cell::{Cell, CONTINUATION},
    frame::Frame,
    palette::{terminal_color, ColorMode},
    surface::{Rgba, Surface},
};

/// Channel level under which a texel is shown as empty.
const VISIBLE_LEVEL: f32 = 12.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Texel {
    glyph: char,
    rgb: [f32; 3],
}

impl Texel {
    const EMPTY: Texel = Texel {
        glyph: ' ',
        rgb: [0.0; 3],
    };

    fn blend(&mut self, color: Rgba) {
        let a = color.a.clamp(0.0, 1.0);
        let src = [color.r as f32, color.g as f32, color.b as f32];
        for (dst, s) in self.rgb.iter_mut().zip(src) {
            *dst += (s - *dst) * a;
        }
    }

    fn level(&self) -> f32 {
        self.rgb.iter().copied().fold(0.0, f32::max)
    }

    fn rgb_u8(&self) -> (u8, u8, u8) {
        let c = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        (c(self.rgb[0]), c(self.rgb[1]), c(self.rgb[2]))
    }
}

/// Pixel-addressed surface backed by a grid of glyph-sized texels, one per
/// glyph column and row.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    pitch: u32,
    cols: usize,
    rows: usize,
    fill: Rgba,
    texels: Vec<Texel>,
}

impl Canvas {
    pub fn new(pitch: u32) -> Self {
        let mut c = Self {
            width: 0,
            height: 0,
            pitch: pitch.max(1),
            cols: 0,
            rows: 0,
            fill: Rgba::new(0, 0, 0, 1.0),
            texels: Vec::new(),
        };
        c.regrid();
        c
    }

    fn regrid(&mut self) {
        self.cols = (self.width / self.pitch) as usize;
        self.rows = (self.height / self.pitch) as usize;
        self.texels.clear();
        self.texels.resize(self.cols * self.rows, Texel::EMPTY);
    }

    /// Grid row whose cell holds a glyph with baseline `y`.
    fn baseline_row(&self, y: f64) -> Option<usize> {
        let row = (y / self.pitch as f64).ceil() - 1.0;
        if !row.is_finite() || row < 0.0 || row >= self.rows as f64 {
            return None;
        }
        Some(row as usize)
    }

    fn column(&self, x: f64) -> Option<usize> {
        let col = (x / self.pitch as f64).floor();
        if !col.is_finite() || col < 0.0 || col >= self.cols as f64 {
            return None;
        }
        Some(col as usize)
    }

    pub fn grid_size(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    #[allow(dead_code)]
    pub fn glyph_at(&self, col: usize, row: usize) -> Option<char> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        let t = self.texels[row * self.cols + col];
        (t.level() >= VISIBLE_LEVEL).then_some(t.glyph)
    }

    /// Writes the texels into `frame`, two terminal cells per glyph column.
    pub fn present(&self, frame: &mut Frame, mode: ColorMode, bg: Option<Color>) {
        let blank = Cell::blank_with_bg(bg);
        let rows = self.rows.min(frame.height as usize);
        let cols = self.cols.min(frame.width as usize / 2);

        for row in 0..rows {
            for col in 0..cols {
                let t = self.texels[row * self.cols + col];
                let (x, y) = ((col * 2) as u16, row as u16);
                if t.level() < VISIBLE_LEVEL {
                    frame.set(x, y, blank);
                    frame.set(x + 1, y, blank);
                    continue;
                }

                let fg = match mode {
                    // mono has no shades; drop the dimmest half of the trail instead
                    ColorMode::Mono if t.level() < 128.0 => {
                        frame.set(x, y, blank);
                        frame.set(x + 1, y, blank);
                        continue;
                    }
                    _ => terminal_color(mode, t.rgb_u8()),
                };
                frame.set(x, y, Cell { ch: t.glyph, fg, bg });

                let right = if t.glyph.width() == Some(2) {
                    Cell {
                        ch: CONTINUATION,
                        fg,
                        bg,
                    }
                } else {
                    blank
                };
                frame.set(x + 1, y, right);
            }
        }
    }
}

impl Surface for Canvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.regrid();
    }

    fn set_font_size(&mut self, px: u32) {
        let px = px.max(1);
        if px != self.pitch {
            self.pitch = px;
            self.regrid();
        }
    }

    fn set_fill(&mut self, color: Rgba) {
        self.fill = color;
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        if self.texels.is_empty() || w <= 0.0 || h <= 0.0 {
            return;
        }
        let p = self.pitch as f64;
        let c0 = (x / p).floor().max(0.0) as usize;
        let r0 = (y / p).floor().max(0.0) as usize;
        let c1 = (((x + w) / p).ceil().max(0.0) as usize).min(self.cols);
        let r1 = (((y + h) / p).ceil().max(0.0) as usize).min(self.rows);
        let fill = self.fill;
        for row in r0..r1 {
            for col in c0..c1 {
                self.texels[row * self.cols + col].blend(fill);
            }
        }
    }

    fn fill_text(&mut self, glyph: char, x: f64, y: f64) {
        let (Some(col), Some(row)) = (self.column(x), self.baseline_row(y)) else {
            return;
        };
        let fill = self.fill;
        let t = &mut self.texels[row * self.cols + col];
        t.glyph = glyph;
        t.blend(fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn green(a: f32) -> Rgba {
        Rgba::new(0, 255, 0, a)
    }

    fn canvas(w: u32, h: u32) -> Canvas {
        let mut c = Canvas::new(12);
        c.set_size(w, h);
        c
    }

    #[test]
    fn grid_follows_size_and_font() {
        let mut c = canvas(120, 60);
        assert_eq!(c.grid_size(), (10, 5));
        c.set_font_size(6);
        assert_eq!(c.grid_size(), (20, 10));
    }

    #[test]
    fn baseline_places_glyph_in_the_row_above() {
        let mut c = canvas(120, 60);
        c.set_fill(green(1.0));
        c.fill_text('ア', 24.0, 12.0);
        c.fill_text('イ', 36.0, 13.0);
        assert_eq!(c.glyph_at(2, 0), Some('ア'));
        assert_eq!(c.glyph_at(3, 1), Some('イ'));
    }

    #[test]
    fn off_surface_text_is_ignored() {
        let mut c = canvas(120, 60);
        c.set_fill(green(1.0));
        c.fill_text('ア', 0.0, 0.0);
        c.fill_text('ア', 0.0, 72.0);
        c.fill_text('ア', 120.0, 12.0);
        for row in 0..5 {
            for col in 0..10 {
                assert_eq!(c.glyph_at(col, row), None);
            }
        }
    }

    #[test]
    fn repeated_fades_erase_the_trail() {
        let mut c = canvas(24, 24);
        c.set_fill(green(1.0));
        c.fill_text('A', 0.0, 12.0);
        c.set_fill(Rgba::new(0, 0, 0, 0.15));
        c.fill_rect(0.0, 0.0, 24.0, 24.0);
        assert_eq!(c.glyph_at(0, 0), Some('A'));
        for _ in 0..40 {
            c.fill_rect(0.0, 0.0, 24.0, 24.0);
        }
        assert_eq!(c.glyph_at(0, 0), None);
    }

    #[test]
    fn dim_text_blends_with_what_is_there() {
        let mut c = canvas(12, 12);
        c.set_fill(green(0.5));
        c.fill_text('A', 0.0, 12.0);
        c.fill_text('B', 0.0, 12.0);
        let t = c.texels[0];
        assert_eq!(t.glyph, 'B');
        assert!((t.rgb[1] - 191.25).abs() < 1e-3);
    }

    #[test]
    fn present_writes_wide_glyphs_with_continuation() {
        let mut c = canvas(24, 12);
        c.set_fill(green(1.0));
        c.fill_text('ア', 0.0, 12.0);
        c.fill_text('é', 12.0, 12.0);

        let mut f = Frame::new(4, 1, None);
        c.present(&mut f, ColorMode::TrueColor, None);
        assert_eq!(f.cell_at_index(0).ch, 'ア');
        assert!(f.cell_at_index(1).is_continuation());
        assert_eq!(f.cell_at_index(2).ch, 'é');
        assert_eq!(f.cell_at_index(3).ch, ' ');
        assert_eq!(
            f.cell_at_index(0).fg,
            Some(Color::Rgb { r: 0, g: 255, b: 0 })
        );
    }

    #[test]
    fn present_clips_to_a_smaller_frame() {
        let mut c = canvas(48, 24);
        c.set_fill(green(1.0));
        c.fill_text('A', 36.0, 24.0);
        let mut f = Frame::new(3, 1, None);
        c.present(&mut f, ColorMode::Color256, None);
        assert_eq!(f.cell_at_index(0).ch, ' ');
    }
}
