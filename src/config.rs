// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::ops::Range;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::error::RainError;
use crate::glyph::GLYPH_RANGES;

pub const DEFAULT_GLYPH_SIZE: u32 = 12;
pub const DEFAULT_FPS: f64 = 15.0;

pub const GLYPH_SIZE_MIN: u32 = 4;
pub const GLYPH_SIZE_MAX: u32 = 96;
pub const FPS_MIN: f64 = 1.0;
pub const FPS_MAX: f64 = 240.0;

pub const SPEED_RANGE: Range<f64> = 0.5..1.5;
pub const SPAWN_BRIGHTNESS: Range<f64> = 0.3..1.0;
pub const RESET_BRIGHTNESS: Range<f64> = 0.3..0.9;
/// A drop past the bottom edge restarts when a uniform draw exceeds this.
pub const RESET_THRESHOLD: f64 = 0.975;
/// Row a freshly built drop starts on.
pub const SPAWN_POSITION: f64 = 1.0;

pub const FADE_ALPHA: f32 = 0.15;
pub const GLYPH_RGB: (u8, u8, u8) = (0, 255, 0);

pub const SURFACE_ID: &str = "matrix-rain";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RainConfig {
    pub glyph_size: u32,
    pub fps: f64,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            glyph_size: DEFAULT_GLYPH_SIZE,
            fps: DEFAULT_FPS,
        }
    }
}

impl RainConfig {
    pub fn validate(self) -> Result<Self, RainError> {
        RainError::require_range(
            "--glyph-size",
            self.glyph_size as f64,
            GLYPH_SIZE_MIN as f64,
            GLYPH_SIZE_MAX as f64,
        )?;
        RainError::require_range("--fps", self.fps, FPS_MIN, FPS_MAX)?;
        Ok(self)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps)
    }

    pub fn columns_for(&self, surface_width: u32) -> usize {
        if self.glyph_size == 0 {
            return 0;
        }
        (surface_width / self.glyph_size) as usize
    }
}

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "digirain", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = DEFAULT_FPS,
        help_heading = "RAIN",
        help = "Target frame rate (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        short = 'g',
        long = "glyph-size",
        default_value_t = DEFAULT_GLYPH_SIZE,
        help_heading = "RAIN",
        help = "Glyph size in surface pixels (min 4 max 96)"
    )]
    pub glyph_size: u32,

    #[arg(
        long = "seed",
        help_heading = "RAIN",
        help = "Seed the random source for a repeatable rain"
    )]
    pub seed: Option<u64>,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "perf-stats",
        help_heading = "GENERAL",
        help = "Print frame statistics on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write logs to this file (filter with DIGIRAIN_LOG)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "list-glyphs",
        help_heading = "HELP",
        help = "List the glyph ranges the rain draws from and exit"
    )]
    pub list_glyphs: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

impl Args {
    pub fn rain_config(&self) -> Result<RainConfig, RainError> {
        RainConfig {
            glyph_size: self.glyph_size,
            fps: self.fps,
        }
        .validate()
    }

    pub fn run_for(&self) -> Result<Option<Duration>, RainError> {
        match self.duration {
            Some(s) if s.is_finite() && s <= 0.0 => Ok(None),
            Some(s) => {
                let s = RainError::require_range("--duration", s, 0.1, 86400.0)?;
                Ok(Some(Duration::from_secs_f64(s)))
            }
            None => Ok(None),
        }
    }
}

pub fn print_list_glyphs() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mGLYPH RANGES:\x1b[0m");
    } else {
        println!("GLYPH RANGES:");
    }
    println!();
    println!("NAME                        RANGE");
    for r in &GLYPH_RANGES {
        println!("{:<27} U+{:04X}..U+{:04X}", r.name, r.low, r.high);
    }
}
