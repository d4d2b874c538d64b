// Copyright (c) 2026 rezky_nightky

//! Services the hosting environment hands to the rain: viewport size,
//! monotonic time, frame scheduling and resize notifications.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel viewport of a terminal where a glyph column spans two cells
    /// and a glyph row spans one.
    pub fn for_terminal(cols: u16, rows: u16, glyph_size: u32) -> Self {
        Self::new((cols as u32 / 2) * glyph_size, rows as u32 * glyph_size)
    }
}

pub trait Clock {
    /// Time since an arbitrary fixed origin; never goes backwards.
    fn now(&self) -> Duration;
}

pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Registers interest in running a frame callback before the next repaint.
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Coalescing frame request slot: any number of requests between two
/// repaints collapse into one callback.
#[derive(Debug, Default)]
pub struct FrameQueue {
    pending: bool,
    requests: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    pub fn requests(&self) -> u64 {
        self.requests
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) {
        self.pending = true;
        self.requests = self.requests.saturating_add(1);
    }
}

type ResizeHandler = Box<dyn FnMut(Viewport)>;

struct Listener {
    id: u64,
    handler: ResizeHandler,
}

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    listeners: Vec<Listener>,
    disposed_while_emitting: Vec<u64>,
}

/// Resize notification source. Handlers run in registration order on the
/// thread that calls [`ResizeEvents::emit`].
#[derive(Clone, Default)]
pub struct ResizeEvents {
    table: Rc<RefCell<ListenerTable>>,
}

impl ResizeEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F) -> ResizeSubscription
    where
        F: FnMut(Viewport) + 'static,
    {
        let mut table = self.table.borrow_mut();
        let id = table.next_id;
        table.next_id = table.next_id.wrapping_add(1);
        table.listeners.push(Listener {
            id,
            handler: Box::new(handler),
        });
        ResizeSubscription {
            id,
            table: Rc::downgrade(&self.table),
        }
    }

    pub fn emit(&self, viewport: Viewport) {
        // Handlers are taken out while they run so one may subscribe or
        // dispose without hitting a live borrow.
        let mut running = std::mem::take(&mut self.table.borrow_mut().listeners);
        for l in &mut running {
            (l.handler)(viewport);
        }
        let removed: Vec<Listener> = {
            let mut table = self.table.borrow_mut();
            let added = std::mem::take(&mut table.listeners);
            let disposed = std::mem::take(&mut table.disposed_while_emitting);
            let (mut kept, removed): (Vec<_>, Vec<_>) =
                running.into_iter().partition(|l| !disposed.contains(&l.id));
            kept.extend(added);
            table.listeners = kept;
            removed
        };
        // handlers may own subscriptions of their own; release them unborrowed
        drop(removed);
    }

    pub fn listener_count(&self) -> usize {
        self.table.borrow().listeners.len()
    }
}

/// Disposer for a resize handler. Disposing (or dropping) unregisters it.
pub struct ResizeSubscription {
    id: u64,
    table: Weak<RefCell<ListenerTable>>,
}

impl ResizeSubscription {
    pub fn dispose(self) {}
}

impl Drop for ResizeSubscription {
    fn drop(&mut self) {
        let Some(table) = self.table.upgrade() else {
            return;
        };
        let removed = match table.try_borrow_mut() {
            Ok(mut t) => {
                let pos = t.listeners.iter().position(|l| l.id == self.id);
                match pos {
                    Some(i) => Some(t.listeners.remove(i)),
                    None => {
                        t.disposed_while_emitting.push(self.id);
                        None
                    }
                }
            }
            Err(_) => None,
        };
        drop(removed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::Cell;

    #[test]
    fn terminal_viewport_pairs_cells_per_column() {
        assert_eq!(Viewport::for_terminal(80, 24, 12), Viewport::new(480, 288));
        assert_eq!(Viewport::for_terminal(81, 1, 10), Viewport::new(400, 10));
    }

    #[test]
    fn frame_queue_coalesces_requests() {
        let mut q = FrameQueue::new();
        assert!(!q.take());
        q.request_frame();
        q.request_frame();
        assert_eq!(q.requests(), 2);
        assert!(q.take());
        assert!(!q.take());
    }

    #[test]
    fn emit_reaches_every_listener() {
        let events = ResizeEvents::new();
        let hits = Rc::new(Cell::new(0u32));
        let h1 = hits.clone();
        let h2 = hits.clone();
        let _a = events.subscribe(move |v| h1.set(h1.get() + v.width));
        let _b = events.subscribe(move |v| h2.set(h2.get() + v.height));
        events.emit(Viewport::new(3, 4));
        assert_eq!(hits.get(), 7);
    }

    #[test]
    fn disposed_listener_is_not_called() {
        let events = ResizeEvents::new();
        let hits = Rc::new(Cell::new(0u32));
        let h = hits.clone();
        let sub = events.subscribe(move |_| h.set(h.get() + 1));
        events.emit(Viewport::new(1, 1));
        sub.dispose();
        assert_eq!(events.listener_count(), 0);
        events.emit(Viewport::new(1, 1));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listener_can_dispose_itself_while_running() {
        let events = ResizeEvents::new();
        let slot: Rc<RefCell<Option<ResizeSubscription>>> = Rc::new(RefCell::new(None));
        let inner = slot.clone();
        let sub = events.subscribe(move |_| {
            inner.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(sub);
        events.emit(Viewport::new(1, 1));
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn dropping_a_subscription_unregisters_it() {
        let events = ResizeEvents::new();
        let keep = events.subscribe(|_| {});
        let gone = events.subscribe(|_| {});
        assert_eq!(events.listener_count(), 2);
        drop(gone);
        assert_eq!(events.listener_count(), 1);
        drop(keep);
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn dropping_a_handler_releases_subscriptions_it_owns() {
        let events = ResizeEvents::new();
        let inner = events.subscribe(|_| {});
        let outer = events.subscribe(move |_| {
            let _owned = &inner;
        });
        assert_eq!(events.listener_count(), 2);
        drop(outer);
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn handler_disposed_mid_emit_releases_subscriptions_it_owns() {
        let events = ResizeEvents::new();
        let inner_hits = Rc::new(Cell::new(0u32));
        let h = inner_hits.clone();
        let inner = events.subscribe(move |_| h.set(h.get() + 1));
        let slot: Rc<RefCell<Option<ResizeSubscription>>> = Rc::new(RefCell::new(None));
        let own = slot.clone();
        let outer = events.subscribe(move |_| {
            let _owned = &inner;
            own.borrow_mut().take();
        });
        *slot.borrow_mut() = Some(outer);

        events.emit(Viewport::new(1, 1));
        assert_eq!(events.listener_count(), 0);
        events.emit(Viewport::new(1, 1));
        assert_eq!(inner_hits.get(), 1);
    }

    #[test]
    fn subscription_outliving_the_source_is_harmless() {
        let sub = {
            let events = ResizeEvents::new();
            events.subscribe(|_| {})
        };
        drop(sub);
    }

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
