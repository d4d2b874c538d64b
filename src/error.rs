// Copyright (c) 2026 rezky_nightky

use std::io;

#[derive(thiserror::Error, Debug)]
pub enum RainError {
    #[error("no drawing surface with id '{0}'")]
    SurfaceNotFound(String),

    #[error("failed to apply {name} {value} (min {min} max {max})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("invalid --colormode: {0} (allowed: 0,16,8/256,24/32)")]
    ColorMode(u16),

    #[error("failed to set up logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl RainError {
    pub fn require_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<f64, Self> {
        if !value.is_finite() || value < min || value > max {
            return Err(Self::OutOfRange {
                name,
                value,
                min,
                max,
            });
        }
        Ok(value)
    }
}
