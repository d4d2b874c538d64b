// Copyright (c) 2026 rezky_nightky

use rand::Rng;

use crate::config::{
    RESET_BRIGHTNESS, RESET_THRESHOLD, SPAWN_BRIGHTNESS, SPAWN_POSITION, SPEED_RANGE,
};

/// Per-column rain state. `position` counts glyph rows from the top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Droplet {
    pub position: f64,
    pub speed: f64,
    pub brightness: f64,
}

impl Droplet {
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            position: SPAWN_POSITION,
            speed: rng.random_range(SPEED_RANGE),
            brightness: rng.random_range(SPAWN_BRIGHTNESS),
        }
    }

    pub fn pixel_y(&self, glyph_size: u32) -> f64 {
        self.position * glyph_size as f64
    }

    pub fn is_past(&self, surface_height: u32, glyph_size: u32) -> bool {
        self.pixel_y(glyph_size) > surface_height as f64
    }

    /// Once past the bottom edge, restarts at the top with a small chance
    /// per call. Returns whether it restarted.
    pub fn maybe_recycle<R: Rng + ?Sized>(
        &mut self,
        surface_height: u32,
        glyph_size: u32,
        rng: &mut R,
    ) -> bool {
        if !self.is_past(surface_height, glyph_size) || rng.random::<f64>() <= RESET_THRESHOLD {
            return false;
        }
        self.position = 0.0;
        self.brightness = rng.random_range(RESET_BRIGHTNESS);
        true
    }

    pub fn advance(&mut self) {
        self.position += self.speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn spawn_draws_speed_and_brightness_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10_000 {
            let d = Droplet::spawn(&mut rng);
            assert_eq!(d.position, SPAWN_POSITION);
            assert!((0.5..1.5).contains(&d.speed));
            assert!((0.3..1.0).contains(&d.brightness));
        }
    }

    #[test]
    fn never_recycles_while_on_the_surface() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut d = Droplet {
            position: 5.0,
            speed: 1.0,
            brightness: 0.5,
        };
        // 5 * 12 == 60 is on the edge, not past it
        for _ in 0..10_000 {
            assert!(!d.maybe_recycle(60, 12, &mut rng));
        }
        assert_eq!(d.position, 5.0);
    }

    #[test]
    fn recycle_rate_is_about_two_and_a_half_percent() {
        let mut rng = StdRng::seed_from_u64(3);
        let trials = 40_000;
        let mut resets = 0;
        for _ in 0..trials {
            let mut d = Droplet {
                position: 100.0,
                speed: 1.0,
                brightness: 0.95,
            };
            if d.maybe_recycle(60, 12, &mut rng) {
                resets += 1;
                assert_eq!(d.position, 0.0);
                assert!((0.3..0.9).contains(&d.brightness));
                assert_eq!(d.speed, 1.0);
            }
        }
        // expected 1000, sd ~31
        assert!((850..1150).contains(&resets), "{} resets", resets);
    }

    #[test]
    fn advance_adds_speed() {
        let mut d = Droplet {
            position: 1.0,
            speed: 0.75,
            brightness: 0.5,
        };
        d.advance();
        d.advance();
        assert_eq!(d.position, 2.5);
    }
}
