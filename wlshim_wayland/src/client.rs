// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Connection and event-queue ownership.
//!
//! # Queue ownership wiring diagram
//!
//! ```text
//! Client owns:
//!   Connection
//!   EventQueue<WaylandState> + WaylandState
//!     -> QueueHandle<WaylandState>
//! every proxy (registry, globals, surfaces, pools, buffers, callbacks,
//! xdg objects, pointers) is created with that handle and carries its
//! session handle as user data
//! host pumps via Client::blocking_dispatch(), or Client::flush() +
//! Client::prepare_read() + Client::dispatch_pending() in a poll loop,
//! then drains WaylandState events
//! ```
//!
//! Objects created with any other queue handle never reach the session.

use wayland_client::backend::{ReadEventsGuard, WaylandError};
use wayland_client::{Connection, DispatchError, EventQueue, QueueHandle};

use crate::config::Config;
use crate::error::Error;
use crate::state::WaylandState;

/// A connected client: the connection, its event queue, and the state
/// events are dispatched into.
#[derive(Debug)]
pub struct Client {
    connection: Connection,
    event_queue: EventQueue<WaylandState>,
    state: WaylandState,
}

impl Client {
    /// Connects to the compositor named by `WAYLAND_DISPLAY` /
    /// `WAYLAND_SOCKET` and collects the initial registry advertisements.
    pub fn connect(config: Config) -> Result<Self, Error> {
        let connection = Connection::connect_to_env()?;
        Self::from_connection(connection, config)
    }

    /// Wraps an existing connection.
    ///
    /// Performs one roundtrip, so every global advertised at connect time is
    /// known to the session on return.
    pub fn from_connection(connection: Connection, config: Config) -> Result<Self, Error> {
        let mut event_queue = connection.new_event_queue();
        let qh = event_queue.handle();
        let registry = connection.display().get_registry(&qh, ());
        let mut state = WaylandState::new(config, qh, registry);
        event_queue.roundtrip(&mut state)?;
        tracing::debug!(
            globals = state.session().advertisements().count(),
            "registry populated"
        );
        Ok(Self {
            connection,
            event_queue,
            state,
        })
    }

    /// Returns the queue handle every shim object is created with.
    #[must_use]
    pub fn queue_handle(&self) -> QueueHandle<WaylandState> {
        self.event_queue.handle()
    }

    /// The underlying connection.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Dispatches already-queued events without blocking.
    ///
    /// This method only runs handlers for events that have already been read
    /// from the socket into this queue. It does **not** perform socket I/O by
    /// itself; pair it with [`Self::flush`] and [`Self::prepare_read`] in a
    /// non-blocking loop.
    pub fn dispatch_pending(&mut self) -> Result<usize, DispatchError> {
        self.event_queue.dispatch_pending(&mut self.state)
    }

    /// Flushes requests, blocks for new events when needed, and dispatches.
    pub fn blocking_dispatch(&mut self) -> Result<usize, DispatchError> {
        self.event_queue.blocking_dispatch(&mut self.state)
    }

    /// Flushes requests and blocks until the compositor has processed them,
    /// dispatching everything it sent back.
    pub fn roundtrip(&mut self) -> Result<usize, DispatchError> {
        self.event_queue.roundtrip(&mut self.state)
    }

    /// Flushes pending outgoing requests to the socket.
    pub fn flush(&self) -> Result<(), WaylandError> {
        self.event_queue.flush()
    }

    /// Starts a synchronized socket read for poll-based loops.
    ///
    /// If this returns [`None`], dispatch queued events before trying again.
    #[must_use]
    pub fn prepare_read(&self) -> Option<ReadEventsGuard> {
        self.event_queue.prepare_read()
    }

    /// Shared access to the state.
    #[must_use]
    pub fn state(&self) -> &WaylandState {
        &self.state
    }

    /// Mutable access to the state; all requests go through it.
    pub fn state_mut(&mut self) -> &mut WaylandState {
        &mut self.state
    }
}
