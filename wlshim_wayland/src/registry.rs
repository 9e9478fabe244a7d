// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry advertisements and global binding.

use wayland_client::protocol::{wl_compositor::WlCompositor, wl_registry};
use wayland_client::{Connection, Dispatch, Proxy, QueueHandle};
use wlshim_core::{Advertisement, Error, GlobalId, GlobalKind, Globals, Mismatch};

use crate::event::Event;
use crate::seat::SEAT_RELEASE_SINCE;
use crate::state::{GlobalProxy, WaylandState};

/// `wl_shm.release` exists from this version.
const SHM_RELEASE_SINCE: u32 = 2;

/// Whether a global of `kind` bound at `version` has a destructor request.
/// Without one the proxy is simply dropped.
const fn has_destructor(kind: GlobalKind, version: u32) -> bool {
    match kind {
        GlobalKind::Compositor => false,
        GlobalKind::Shm => version >= SHM_RELEASE_SINCE,
        GlobalKind::Seat => version >= SEAT_RELEASE_SINCE,
        GlobalKind::WmBase => true,
    }
}

impl Dispatch<wl_registry::WlRegistry, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _data: &(),
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_registry::Event::Global {
                name,
                interface,
                version,
            } => state.session.advertise(Advertisement {
                name,
                interface,
                version,
            }),
            wl_registry::Event::GlobalRemove { name } => {
                if let Some(global) = state.session.withdraw(name) {
                    state.events.push(Event::GlobalRemoved { global });
                }
            }
            _ => {}
        }
    }
}

impl Dispatch<WlCompositor, GlobalId> for WaylandState {
    fn event(
        _state: &mut Self,
        _compositor: &WlCompositor,
        _event: <WlCompositor as Proxy>::Event,
        _data: &GlobalId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
    }
}

impl WaylandState {
    /// Binds registry `name` as `kind` at `version`.
    ///
    /// `name` and `version` must match what the server advertised; anything
    /// else is a [`Error::ProtocolMismatch`] and nothing is sent.
    pub fn bind_global(
        &mut self,
        name: u32,
        kind: GlobalKind,
        version: u32,
    ) -> Result<GlobalId, Error> {
        let id = self.session.bind_global(name, kind, version)?;
        let qh = &self.qh;
        let proxy = match kind {
            GlobalKind::Compositor => {
                GlobalProxy::Compositor(self.registry.bind(name, version, qh, id))
            }
            GlobalKind::Shm => GlobalProxy::Shm(self.registry.bind(name, version, qh, id)),
            GlobalKind::Seat => GlobalProxy::Seat(self.registry.bind(name, version, qh, id)),
            GlobalKind::WmBase => GlobalProxy::WmBase(self.registry.bind(name, version, qh, id)),
        };
        self.globals.insert(id, proxy);
        Ok(id)
    }

    /// Binds the first advertised global of `kind`, at the advertised version
    /// capped by [`Config::versions`](crate::Config::versions).
    pub fn bind_kind(&mut self, kind: GlobalKind) -> Result<GlobalId, Error> {
        let limit = self.config.versions.for_kind(kind);
        let (name, version) = self.session.resolve(kind, limit)?;
        self.bind_global(name, kind, version)
    }

    /// Binds every global the shim needs.
    ///
    /// The compositor, shm, and wm-base globals are required; a missing seat
    /// leaves [`Globals::seat`] empty.
    pub fn bind_globals(&mut self) -> Result<Globals, Error> {
        let compositor = self.bind_kind(GlobalKind::Compositor)?;
        let shm = self.bind_kind(GlobalKind::Shm)?;
        let wm_base = self.bind_kind(GlobalKind::WmBase)?;
        let seat = match self.bind_kind(GlobalKind::Seat) {
            Ok(seat) => Some(seat),
            Err(Error::ProtocolMismatch(Mismatch::NotAdvertised { .. })) => {
                tracing::info!("compositor advertises no seat; input disabled");
                None
            }
            Err(err) => return Err(err),
        };
        Ok(Globals {
            compositor,
            shm,
            seat,
            wm_base,
        })
    }

    /// Releases a global at shutdown, after every object derived from it.
    pub fn release_global(&mut self, id: GlobalId) -> Result<(), Error> {
        self.session.release_global(id)?;
        match self.globals.remove(&id) {
            Some(GlobalProxy::Shm(shm)) if has_destructor(GlobalKind::Shm, shm.version()) => {
                shm.release();
            }
            Some(GlobalProxy::Seat(seat)) if has_destructor(GlobalKind::Seat, seat.version()) => {
                seat.release();
            }
            Some(GlobalProxy::WmBase(wm_base)) => wm_base.destroy(),
            _ => {}
        }
        Ok(())
    }

    /// Releases all four globals in dependency-safe order.
    pub fn release_globals(&mut self, globals: Globals) -> Result<(), Error> {
        if let Some(seat) = globals.seat {
            self.release_global(seat)?;
        }
        self.release_global(globals.wm_base)?;
        self.release_global(globals.shm)?;
        self.release_global(globals.compositor)
    }
}

#[cfg(test)]
mod tests {
    use super::has_destructor;
    use wlshim_core::GlobalKind;

    #[test]
    fn destructors_follow_the_bound_version() {
        assert!(!has_destructor(GlobalKind::Compositor, 6));
        assert!(!has_destructor(GlobalKind::Shm, 1));
        assert!(has_destructor(GlobalKind::Shm, 2));
        assert!(!has_destructor(GlobalKind::Seat, 4));
        assert!(has_destructor(GlobalKind::Seat, 5));
        assert!(has_destructor(GlobalKind::WmBase, 1));
    }
}
