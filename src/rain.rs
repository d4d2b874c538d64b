// Copyright (c) 2026 rezky_nightky

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, info, trace};

use crate::{
    config::{RainConfig, FADE_ALPHA, GLYPH_RGB},
    droplet::Droplet,
    error::RainError,
    glyph::random_glyph,
    host::{FrameScheduler, ResizeEvents, ResizeSubscription, Viewport},
    surface::{Rgba, Surface, SurfaceHandle, SurfaceRegistry},
};

const FADE: Rgba = Rgba::new(0, 0, 0, FADE_ALPHA);
const GLYPH: Rgba = Rgba::new(GLYPH_RGB.0, GLYPH_RGB.1, GLYPH_RGB.2, 1.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Drawn,
    Throttled,
    Stopped,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: u64,
    pub throttled: u64,
    pub recycled: u64,
}

pub struct RainAnimator<S: Surface, R: Rng> {
    surface: SurfaceHandle<S>,
    config: RainConfig,
    interval: Duration,
    drops: Vec<Droplet>,
    rng: R,
    last_frame: Duration,
    running: bool,
    stats: FrameStats,
    resize_sub: Option<ResizeSubscription>,
}

impl<S: Surface + 'static, R: Rng + 'static> RainAnimator<S, R> {
    /// Initializes, listens for resizes and requests the first frame.
    #[allow(clippy::too_many_arguments)]
    pub fn launch(
        doc: &SurfaceRegistry<S>,
        surface_id: &str,
        viewport: Viewport,
        now: Duration,
        config: RainConfig,
        rng: R,
        events: &ResizeEvents,
        scheduler: &mut dyn FrameScheduler,
    ) -> Result<Rc<RefCell<Self>>, RainError> {
        let animator = Rc::new(RefCell::new(Self::initialize(
            doc, surface_id, viewport, now, config, rng,
        )?));
        let sub = Self::listen_for_resize(&animator, events);
        {
            let mut a = animator.borrow_mut();
            a.resize_sub = Some(sub);
            a.start(scheduler);
        }
        Ok(animator)
    }

    pub fn listen_for_resize(this: &Rc<RefCell<Self>>, events: &ResizeEvents) -> ResizeSubscription {
        let weak = Rc::downgrade(this);
        events.subscribe(move |viewport| {
            if let Some(animator) = weak.upgrade() {
                animator.borrow_mut().on_resize(viewport);
            }
        })
    }
}

impl<S: Surface, R: Rng> RainAnimator<S, R> {
    pub fn initialize(
        doc: &SurfaceRegistry<S>,
        surface_id: &str,
        viewport: Viewport,
        now: Duration,
        config: RainConfig,
        rng: R,
    ) -> Result<Self, RainError> {
        let config = config.validate()?;
        let surface = doc
            .get(surface_id)
            .ok_or_else(|| RainError::SurfaceNotFound(surface_id.to_string()))?;

        let mut animator = Self {
            surface,
            config,
            interval: config.frame_interval(),
            drops: Vec::new(),
            rng,
            last_frame: now,
            running: false,
            stats: FrameStats::default(),
            resize_sub: None,
        };
        animator.fit_to(viewport);
        Ok(animator)
    }

    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) {
        self.running = true;
        info!(
            columns = self.drops.len(),
            fps = self.config.fps,
            glyph_size = self.config.glyph_size,
            "rain started"
        );
        scheduler.request_frame();
    }

    pub fn stop(&mut self) {
        if !self.running && self.resize_sub.is_none() {
            return;
        }
        self.running = false;
        if let Some(sub) = self.resize_sub.take() {
            sub.dispose();
        }
        info!(
            drawn = self.stats.drawn,
            throttled = self.stats.throttled,
            "rain stopped"
        );
    }

    pub fn on_resize(&mut self, viewport: Viewport) {
        debug!(width = viewport.width, height = viewport.height, "resize");
        self.fit_to(viewport);
    }

    fn fit_to(&mut self, viewport: Viewport) {
        let columns = self.config.columns_for(viewport.width);
        {
            let mut surface = self.surface.borrow_mut();
            surface.set_size(viewport.width, viewport.height);
            surface.set_font_size(self.config.glyph_size);
        }
        let rng = &mut self.rng;
        self.drops = (0..columns).map(|_| Droplet::spawn(&mut *rng)).collect();
        debug!(columns, "drops rebuilt");
    }

    pub fn render_frame(&mut self, now: Duration, scheduler: &mut dyn FrameScheduler) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Stopped;
        }

        let elapsed = now.saturating_sub(self.last_frame);
        if elapsed < self.interval {
            self.stats.throttled = self.stats.throttled.saturating_add(1);
            scheduler.request_frame();
            return FrameOutcome::Throttled;
        }

        self.paint();

        let phase = elapsed.as_nanos() % self.interval.as_nanos().max(1);
        self.last_frame = now.saturating_sub(Duration::from_nanos(phase as u64));
        self.stats.drawn = self.stats.drawn.saturating_add(1);
        trace!(frame = self.stats.drawn, "frame drawn");

        scheduler.request_frame();
        FrameOutcome::Drawn
    }

    fn paint(&mut self) {
        let glyph_size = self.config.glyph_size;
        let mut surface = self.surface.borrow_mut();
        let (width, height) = (surface.width(), surface.height());

        surface.set_fill(FADE);
        surface.fill_rect(0.0, 0.0, width as f64, height as f64);

        for (i, d) in self.drops.iter_mut().enumerate() {
            let glyph = random_glyph(&mut self.rng);
            surface.set_fill(GLYPH.with_alpha(d.brightness as f32));
            surface.fill_text(glyph, (i as u32 * glyph_size) as f64, d.pixel_y(glyph_size));

            if d.maybe_recycle(height, glyph_size, &mut self.rng) {
                self.stats.recycled = self.stats.recycled.saturating_add(1);
            }
            d.advance();
        }
    }

    #[allow(dead_code)]
    pub fn drops(&self) -> &[Droplet] {
        &self.drops
    }

    pub fn columns(&self) -> usize {
        self.drops.len()
    }

    #[allow(dead_code)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    #[allow(dead_code)]
    pub fn last_frame(&self) -> Duration {
        self.last_frame
    }
}

impl<S: Surface, R: Rng> Drop for RainAnimator<S, R> {
    fn drop(&mut self) {
        self.stop();
    }
}
