// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

impl ColorMode {
    pub fn label(self) -> &'static str {
        match self {
            ColorMode::TrueColor => "24-bit truecolor",
            ColorMode::Color256 => "8-bit (256-color)",
            ColorMode::Color16 => "16-color",
            ColorMode::Mono => "mono",
        }
    }

    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            0 => Some(ColorMode::Mono),
            16 => Some(ColorMode::Color16),
            8 | 256 => Some(ColorMode::Color256),
            24 | 32 => Some(ColorMode::TrueColor),
            _ => None,
        }
    }

    pub fn detect(colorterm: &str, term: &str) -> Self {
        let colorterm = colorterm.to_ascii_lowercase();
        if colorterm.contains("truecolor") || colorterm.contains("24bit") {
            return ColorMode::TrueColor;
        }
        let term = term.to_ascii_lowercase();
        if term == "dumb" {
            return ColorMode::Mono;
        }
        ColorMode::Color256
    }
}

fn dist2(r0: u8, g0: u8, b0: u8, r1: u8, g1: u8, b1: u8) -> i32 {
    let dr = (r0 as i32) - (r1 as i32);
    let dg = (g0 as i32) - (g1 as i32);
    let db = (b0 as i32) - (b1 as i32);
    (dr * dr) + (dg * dg) + (db * db)
}

fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

    let level = |v: u8| ((v as u16 * 5) + 127) / 255;
    let (r6, g6, b6) = (level(r), level(g), level(b));
    let cube_idx = 16 + (36 * r6 as u8) + (6 * g6 as u8) + (b6 as u8);
    let cube_dist = dist2(
        r,
        g,
        b,
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );

    let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;
    if avg < 8 || avg > 238 {
        return cube_idx;
    }
    let gray_idx = 232 + (avg - 8) / 10;
    let v = 8 + 10 * (gray_idx - 232);
    if dist2(r, g, b, v, v, v) < cube_dist {
        gray_idx
    } else {
        cube_idx
    }
}

fn rgb_to_color16(r: u8, g: u8, b: u8) -> Color {
    // Green-heavy subset; the rain never produces other hues.
    const TABLE: [(Color, (u8, u8, u8)); 6] = [
        (Color::Black, (0, 0, 0)),
        (Color::DarkGrey, (128, 128, 128)),
        (Color::DarkGreen, (0, 128, 0)),
        (Color::Green, (0, 255, 0)),
        (Color::Grey, (192, 192, 192)),
        (Color::White, (255, 255, 255)),
    ];

    let mut best = Color::White;
    let mut best_d = i32::MAX;
    for (c, (cr, cg, cb)) in TABLE {
        let d = dist2(r, g, b, cr, cg, cb);
        if d < best_d {
            best_d = d;
            best = c;
        }
    }
    best
}

/// Terminal colour for an RGB texel, or `None` to use the default foreground.
pub fn terminal_color(mode: ColorMode, (r, g, b): (u8, u8, u8)) -> Option<Color> {
    match mode {
        ColorMode::Mono => None,
        ColorMode::TrueColor => Some(Color::Rgb { r, g, b }),
        ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(r, g, b))),
        ColorMode::Color16 => Some(rgb_to_color16(r, g, b)),
    }
}

pub fn background(mode: ColorMode, default_background: bool) -> Option<Color> {
    if default_background {
        return None;
    }
    Some(match mode {
        ColorMode::TrueColor => Color::Rgb { r: 0, g: 0, b: 0 },
        ColorMode::Color16 | ColorMode::Mono => Color::Black,
        ColorMode::Color256 => Color::AnsiValue(16),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pure_green_maps_to_cube_green() {
        assert_eq!(
            terminal_color(ColorMode::Color256, (0, 255, 0)),
            Some(Color::AnsiValue(46))
        );
        assert_eq!(
            terminal_color(ColorMode::Color16, (0, 200, 0)),
            Some(Color::Green)
        );
        assert_eq!(terminal_color(ColorMode::Mono, (0, 255, 0)), None);
    }

    #[test]
    fn detect_prefers_truecolor_hint() {
        assert_eq!(ColorMode::detect("truecolor", "xterm"), ColorMode::TrueColor);
        assert_eq!(ColorMode::detect("", "dumb"), ColorMode::Mono);
        assert_eq!(ColorMode::detect("", "xterm-256color"), ColorMode::Color256);
    }

    #[test]
    fn colormode_bits() {
        assert_eq!(ColorMode::from_bits(8), Some(ColorMode::Color256));
        assert_eq!(ColorMode::from_bits(32), Some(ColorMode::TrueColor));
        assert_eq!(ColorMode::from_bits(7), None);
    }

    #[test]
    fn default_background_leaves_terminal_bg_alone() {
        assert_eq!(background(ColorMode::TrueColor, true), None);
        assert_eq!(background(ColorMode::Color16, false), Some(Color::Black));
    }
}
