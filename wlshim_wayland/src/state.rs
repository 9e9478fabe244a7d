// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend state: the validating session plus the live protocol proxies.

use std::collections::HashMap;

use wayland_client::QueueHandle;
use wayland_client::protocol::{
    wl_buffer::WlBuffer, wl_callback::WlCallback, wl_compositor::WlCompositor,
    wl_pointer::WlPointer, wl_registry::WlRegistry, wl_seat::WlSeat, wl_shm::WlShm,
    wl_shm_pool::WlShmPool, wl_surface::WlSurface,
};
use wayland_protocols::xdg::shell::client::{
    xdg_surface::XdgSurface, xdg_toplevel::XdgToplevel, xdg_wm_base::XdgWmBase,
};
use wlshim_core::{
    BufferId, Error, FrameToken, GlobalId, Kind, PointerId, PoolId, Session, SurfaceId,
    ToplevelId, WindowState,
};

use crate::config::Config;
use crate::event::{Event, EventQueue};

#[derive(Debug)]
pub(crate) enum GlobalProxy {
    Compositor(WlCompositor),
    Shm(WlShm),
    Seat(WlSeat),
    WmBase(XdgWmBase),
}

#[derive(Debug)]
pub(crate) struct ToplevelProxies {
    pub(crate) xdg_surface: XdgSurface,
    pub(crate) toplevel: XdgToplevel,
}

/// `xdg_toplevel.configure` payload held until the matching
/// `xdg_surface.configure` delivers the serial.
#[derive(Debug, Default)]
pub(crate) struct Proposal {
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) states: Vec<WindowState>,
}

/// Backend-owned state for Wayland protocol handling.
///
/// Every request method validates against the [`Session`] first and only
/// then sends the protocol request, so a rejected call never reaches the
/// compositor. Event handlers update the session and queue an [`Event`].
#[derive(Debug)]
pub struct WaylandState {
    pub(crate) session: Session,
    pub(crate) events: EventQueue,
    pub(crate) config: Config,
    pub(crate) qh: QueueHandle<Self>,
    pub(crate) registry: WlRegistry,
    pub(crate) globals: HashMap<GlobalId, GlobalProxy>,
    pub(crate) surfaces: HashMap<SurfaceId, WlSurface>,
    pub(crate) toplevels: HashMap<ToplevelId, ToplevelProxies>,
    pub(crate) proposals: HashMap<ToplevelId, Proposal>,
    pub(crate) pools: HashMap<PoolId, WlShmPool>,
    pub(crate) buffers: HashMap<BufferId, WlBuffer>,
    pub(crate) frames: HashMap<FrameToken, WlCallback>,
    pub(crate) pointers: HashMap<PointerId, WlPointer>,
}

impl WaylandState {
    pub(crate) fn new(config: Config, qh: QueueHandle<Self>, registry: WlRegistry) -> Self {
        Self {
            session: Session::new(),
            events: EventQueue::with_capacity(config.event_capacity),
            config,
            qh,
            registry,
            globals: HashMap::new(),
            surfaces: HashMap::new(),
            toplevels: HashMap::new(),
            proposals: HashMap::new(),
            pools: HashMap::new(),
            buffers: HashMap::new(),
            frames: HashMap::new(),
            pointers: HashMap::new(),
        }
    }

    /// The validating session: every live object and its state.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Queued events, for inspection.
    #[must_use]
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Pops the oldest queued event.
    pub fn next_event(&mut self) -> Option<Event> {
        self.events.pop()
    }

    /// Removes and yields every queued event, oldest first.
    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.events.drain()
    }

    /// The `wl_surface` proxy behind `id`, for hosts that hand it to a
    /// renderer or create subsurfaces themselves.
    #[must_use]
    pub fn wl_surface(&self, id: SurfaceId) -> Option<&WlSurface> {
        self.surfaces.get(&id)
    }

    pub(crate) fn global_proxy(&self, id: GlobalId) -> Result<&GlobalProxy, Error> {
        proxy(&self.globals, id)
    }
}

/// Looks up the proxy paired with a session handle.
///
/// Every session object gets its proxy in the same call that creates it, so
/// a miss means the handle is stale.
pub(crate) fn proxy<K: Kind, P>(
    proxies: &HashMap<wlshim_core::Handle<K>, P>,
    id: wlshim_core::Handle<K>,
) -> Result<&P, Error> {
    proxies.get(&id).ok_or(Error::StaleHandle { kind: K::NAME })
}

/// Logs an event the session refused, typically one addressed to an object
/// the client already destroyed.
pub(crate) fn log_rejected_event(what: &'static str, err: &Error) {
    tracing::debug!(event = what, %err, "ignoring event");
}
