// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor events surfaced to the host, and the queue that holds them.

use wlshim_core::{
    BufferId, Capabilities, FrameToken, GlobalId, PointerId, SurfaceId, ToplevelId, WindowState,
};

use crate::queue::BoundedQueue;

/// An asynchronous compositor event, demultiplexed to the handle it concerns.
///
/// By the time an event is queued the session already reflects it: a
/// `Configure` has moved the toplevel to `ConfigurePending`, a `FrameDone`
/// has consumed its token, a `BufferReleased` has cleared the in-flight mark.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A bound global was removed from the registry.
    GlobalRemoved {
        /// The withdrawn global.
        global: GlobalId,
    },
    /// The compositor proposed a size and state; answer with
    /// `ack_configure(toplevel, serial)` before committing a buffer.
    Configure {
        /// Toplevel being configured.
        toplevel: ToplevelId,
        /// Serial to acknowledge.
        serial: u32,
        /// Proposed width; 0 lets the client choose.
        width: i32,
        /// Proposed height; 0 lets the client choose.
        height: i32,
        /// Window states in effect.
        states: Vec<WindowState>,
    },
    /// The user asked to close the window.
    CloseRequested {
        /// Toplevel to close.
        toplevel: ToplevelId,
    },
    /// The compositor is ready for the next frame on `surface`.
    FrameDone {
        /// Surface the token paced.
        surface: SurfaceId,
        /// The consumed token.
        token: FrameToken,
        /// Compositor timestamp in milliseconds.
        time_ms: u32,
    },
    /// The compositor stopped reading `buffer`; it may be reused.
    BufferReleased {
        /// The released buffer.
        buffer: BufferId,
    },
    /// Liveness check; answer with `pong(wm_base, serial)` unless
    /// auto-pong is enabled.
    Ping {
        /// The `xdg_wm_base` that pinged.
        wm_base: GlobalId,
        /// Serial to echo.
        serial: u32,
    },
    /// A seat's device set changed.
    SeatCapabilities {
        /// The seat.
        seat: GlobalId,
        /// Devices now present.
        capabilities: Capabilities,
    },
    /// The pointer entered a surface.
    PointerEnter {
        /// The pointer.
        pointer: PointerId,
        /// Surface entered, if it belongs to this client's session.
        surface: Option<SurfaceId>,
        /// Enter serial (needed for cursor requests).
        serial: u32,
        /// Surface-local x.
        x: f64,
        /// Surface-local y.
        y: f64,
    },
    /// The pointer left a surface.
    PointerLeave {
        /// The pointer.
        pointer: PointerId,
        /// Surface left, if it belongs to this client's session.
        surface: Option<SurfaceId>,
    },
    /// The pointer moved over the focused surface.
    PointerMotion {
        /// The pointer.
        pointer: PointerId,
        /// Timestamp in milliseconds.
        time_ms: u32,
        /// Surface-local x.
        x: f64,
        /// Surface-local y.
        y: f64,
    },
    /// A pointer button changed state.
    PointerButton {
        /// The pointer.
        pointer: PointerId,
        /// Button serial.
        serial: u32,
        /// Timestamp in milliseconds.
        time_ms: u32,
        /// Linux evdev button code.
        button: u32,
        /// `true` on press, `false` on release.
        pressed: bool,
    },
    /// Scroll on one axis.
    PointerAxis {
        /// The pointer.
        pointer: PointerId,
        /// Timestamp in milliseconds.
        time_ms: u32,
        /// Scrolled axis.
        axis: ScrollAxis,
        /// Distance in surface-local units; positive scrolls down or right.
        value: f64,
    },
}

impl Event {
    /// Whether this is pointer input.
    ///
    /// Pointer events are the only ones the queue drops on overflow; every
    /// other event either demands an answer (configure, ping, close) or
    /// reports state the caller tracks.
    #[must_use]
    pub fn is_pointer_input(&self) -> bool {
        matches!(
            self,
            Self::PointerEnter { .. }
                | Self::PointerLeave { .. }
                | Self::PointerMotion { .. }
                | Self::PointerButton { .. }
                | Self::PointerAxis { .. }
        )
    }
}

/// Scroll axis of a [`Event::PointerAxis`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScrollAxis {
    /// Vertical scroll.
    Vertical,
    /// Horizontal scroll.
    Horizontal,
}

/// Bounded FIFO queue for [`Event`] values.
///
/// Overflow policy drops pointer input only: when full, pushing removes the
/// oldest queued pointer event. Events the caller must answer are never
/// dropped; if the queue holds nothing but those, it grows past capacity and
/// new pointer input is discarded until the caller drains it.
#[derive(Debug, Clone)]
pub struct EventQueue {
    inner: BoundedQueue<Event>,
}

impl EventQueue {
    /// Default queue capacity used by [`Default`].
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Creates a queue with an explicit capacity.
    ///
    /// `capacity == 0` is promoted to `1`.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: BoundedQueue::with_capacity(capacity),
        }
    }

    /// Enqueues one event.
    pub fn push(&mut self, event: Event) {
        if let Some(evicted) = self.inner.push(event, Event::is_pointer_input) {
            tracing::warn!(?evicted, "event queue full, dropped pointer input");
        }
    }

    /// Pops the oldest queued event, if any.
    pub fn pop(&mut self) -> Option<Event> {
        self.inner.pop()
    }

    /// Removes and yields every queued event, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.inner.drain()
    }

    /// Returns the current queue length.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` when no events are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of events dropped due to queue overflow.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped_count()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::{Event, EventQueue};
    use wlshim_core::{Advertisement, GlobalId, GlobalKind, PointerId, Session, ToplevelId};

    struct Ids {
        wm_base: GlobalId,
        pointer: PointerId,
        toplevel: ToplevelId,
    }

    fn ids() -> Ids {
        let mut session = Session::new();
        for (name, interface) in [(1, "xdg_wm_base"), (2, "wl_seat"), (3, "wl_compositor")] {
            session.advertise(Advertisement {
                name,
                interface: interface.to_owned(),
                version: 1,
            });
        }
        let wm_base = session.bind_global(1, GlobalKind::WmBase, 1).unwrap();
        let seat = session.bind_global(2, GlobalKind::Seat, 1).unwrap();
        let compositor = session.bind_global(3, GlobalKind::Compositor, 1).unwrap();
        let surface = session.create_surface(compositor).unwrap();
        let toplevel = session.get_toplevel(wm_base, surface).unwrap();
        Ids {
            wm_base,
            pointer: session.get_pointer(seat).unwrap(),
            toplevel,
        }
    }

    fn motion(pointer: PointerId, time_ms: u32) -> Event {
        Event::PointerMotion {
            pointer,
            time_ms,
            x: 1.0,
            y: 2.0,
        }
    }

    #[test]
    fn queue_overflow_drops_oldest_pointer_event() {
        let Ids { pointer, .. } = ids();
        let mut queue = EventQueue::with_capacity(2);
        queue.push(motion(pointer, 1));
        queue.push(motion(pointer, 2));
        queue.push(motion(pointer, 3));

        assert_eq!(queue.pop(), Some(motion(pointer, 2)));
        assert_eq!(queue.pop(), Some(motion(pointer, 3)));
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.dropped_count(), 1);
    }

    #[test]
    fn configure_and_ping_survive_a_motion_burst() {
        let Ids {
            wm_base,
            pointer,
            toplevel,
        } = ids();
        let configure = Event::Configure {
            toplevel,
            serial: 7,
            width: 0,
            height: 0,
            states: Vec::new(),
        };
        let ping = Event::Ping { wm_base, serial: 9 };
        let mut queue = EventQueue::default();
        queue.push(configure.clone());
        queue.push(ping.clone());
        for time_ms in 0..200 {
            queue.push(motion(pointer, time_ms));
        }

        assert_eq!(queue.len(), EventQueue::DEFAULT_CAPACITY);
        assert_eq!(queue.dropped_count(), 200 + 2 - 64);
        assert_eq!(queue.pop(), Some(configure));
        assert_eq!(queue.pop(), Some(ping));
        assert_eq!(queue.pop(), Some(motion(pointer, 200 + 2 - 64)));
    }

    #[test]
    fn answerable_events_are_never_dropped() {
        let Ids {
            wm_base, pointer, ..
        } = ids();
        let mut queue = EventQueue::with_capacity(2);
        for serial in 0..3 {
            queue.push(Event::Ping { wm_base, serial });
        }
        queue.push(motion(pointer, 0));

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dropped_count(), 1);
        assert!(queue.drain().all(|event| !event.is_pointer_input()));
    }

    #[test]
    fn default_capacity_holds_a_burst() {
        let Ids { pointer, .. } = ids();
        let mut queue = EventQueue::default();
        for time_ms in 0..64 {
            queue.push(motion(pointer, time_ms));
        }
        assert_eq!(queue.len(), EventQueue::DEFAULT_CAPACITY);
        assert_eq!(queue.dropped_count(), 0);
        assert_eq!(queue.drain().count(), 64);
        assert!(queue.is_empty());
    }
}
