// Copyright (c) 2026 rezky_nightky

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// A 2D drawing context in pixel coordinates. Text is placed by its
/// baseline, as a canvas `fillText` would.
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn set_size(&mut self, width: u32, height: u32);
    fn set_font_size(&mut self, px: u32);
    fn set_fill(&mut self, color: Rgba);
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn fill_text(&mut self, glyph: char, x: f64, y: f64);
}

pub type SurfaceHandle<S> = Rc<RefCell<S>>;

/// Host document: owns surfaces and hands out shared handles by id.
pub struct SurfaceRegistry<S> {
    surfaces: HashMap<String, SurfaceHandle<S>>,
}

impl<S: Surface> SurfaceRegistry<S> {
    pub fn new() -> Self {
        Self {
            surfaces: HashMap::new(),
        }
    }

    pub fn insert(&mut self, id: impl Into<String>, surface: S) -> SurfaceHandle<S> {
        let handle = Rc::new(RefCell::new(surface));
        self.surfaces.insert(id.into(), handle.clone());
        handle
    }

    pub fn get(&self, id: &str) -> Option<SurfaceHandle<S>> {
        self.surfaces.get(id).cloned()
    }
}

impl<S: Surface> Default for SurfaceRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    pub enum DrawOp {
        Rect {
            x: f64,
            y: f64,
            w: f64,
            h: f64,
            color: Rgba,
        },
        Text {
            glyph: char,
            x: f64,
            y: f64,
            color: Rgba,
        },
    }

    /// Surface double that records every draw call.
    #[derive(Debug)]
    pub struct RecordingSurface {
        pub width: u32,
        pub height: u32,
        pub font_px: u32,
        pub fill: Rgba,
        pub ops: Vec<DrawOp>,
    }

    impl RecordingSurface {
        pub fn new() -> Self {
            Self {
                width: 300,
                height: 150,
                font_px: 10,
                fill: Rgba::new(0, 0, 0, 1.0),
                ops: Vec::new(),
            }
        }

        pub fn texts(&self) -> Vec<(char, f64, f64, Rgba)> {
            self.ops
                .iter()
                .filter_map(|op| match *op {
                    DrawOp::Text { glyph, x, y, color } => Some((glyph, x, y, color)),
                    DrawOp::Rect { .. } => None,
                })
                .collect()
        }
    }

    impl Surface for RecordingSurface {
        fn width(&self) -> u32 {
            self.width
        }

        fn height(&self) -> u32 {
            self.height
        }

        fn set_size(&mut self, width: u32, height: u32) {
            self.width = width;
            self.height = height;
        }

        fn set_font_size(&mut self, px: u32) {
            self.font_px = px;
        }

        fn set_fill(&mut self, color: Rgba) {
            self.fill = color;
        }

        fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
            self.ops.push(DrawOp::Rect {
                x,
                y,
                w,
                h,
                color: self.fill,
            });
        }

        fn fill_text(&mut self, glyph: char, x: f64, y: f64) {
            self.ops.push(DrawOp::Text {
                glyph,
                x,
                y,
                color: self.fill,
            });
        }
    }
}
