// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `xdg_wm_base`, `xdg_surface`, and `xdg_toplevel`.
//!
//! A configure arrives in two parts: `xdg_toplevel.configure` carries the
//! proposed size and states, and the following `xdg_surface.configure`
//! carries the serial. The backend holds the first until the second arrives
//! and then records a single configure in the session.

use wayland_client::{Connection, Dispatch, QueueHandle};
use wayland_protocols::xdg::shell::client::{xdg_surface, xdg_toplevel, xdg_wm_base};
use wlshim_core::{Configure, Error, GlobalId, SurfaceId, ToplevelId, WindowState};

use crate::event::Event;
use crate::state::{GlobalProxy, Proposal, ToplevelProxies, WaylandState, log_rejected_event, proxy};

/// Decodes the `xdg_toplevel.configure` state array (native-endian `u32`s).
pub(crate) fn decode_states(raw: &[u8]) -> Vec<WindowState> {
    raw.chunks_exact(4)
        .filter_map(|chunk| <[u8; 4]>::try_from(chunk).ok())
        .filter_map(|bytes| WindowState::from_raw(u32::from_ne_bytes(bytes)))
        .collect()
}

impl Dispatch<xdg_wm_base::XdgWmBase, GlobalId> for WaylandState {
    fn event(
        state: &mut Self,
        wm_base: &xdg_wm_base::XdgWmBase,
        event: xdg_wm_base::Event,
        id: &GlobalId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let xdg_wm_base::Event::Ping { serial } = event {
            if let Err(err) = state.session.ping(*id, serial) {
                log_rejected_event("xdg_wm_base.ping", &err);
                return;
            }
            if state.config.auto_pong {
                if let Err(err) = state.session.pong(*id, serial) {
                    log_rejected_event("xdg_wm_base.ping", &err);
                    return;
                }
                wm_base.pong(serial);
            } else {
                state.events.push(Event::Ping {
                    wm_base: *id,
                    serial,
                });
            }
        }
    }
}

impl Dispatch<xdg_surface::XdgSurface, ToplevelId> for WaylandState {
    fn event(
        state: &mut Self,
        _xdg_surface: &xdg_surface::XdgSurface,
        event: xdg_surface::Event,
        toplevel: &ToplevelId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let xdg_surface::Event::Configure { serial } = event {
            let Proposal {
                width,
                height,
                states,
            } = state.proposals.remove(toplevel).unwrap_or_default();
            let configure = Configure {
                serial,
                width,
                height,
                states: states.clone(),
            };
            match state.session.configure(*toplevel, configure) {
                Ok(()) => state.events.push(Event::Configure {
                    toplevel: *toplevel,
                    serial,
                    width,
                    height,
                    states,
                }),
                Err(err) => log_rejected_event("xdg_surface.configure", &err),
            }
        }
    }
}

impl Dispatch<xdg_toplevel::XdgToplevel, ToplevelId> for WaylandState {
    fn event(
        state: &mut Self,
        _toplevel: &xdg_toplevel::XdgToplevel,
        event: xdg_toplevel::Event,
        toplevel: &ToplevelId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        match event {
            xdg_toplevel::Event::Configure {
                width,
                height,
                states,
            } => {
                state.proposals.insert(
                    *toplevel,
                    Proposal {
                        width,
                        height,
                        states: decode_states(&states),
                    },
                );
            }
            xdg_toplevel::Event::Close => match state.session.close_requested(*toplevel) {
                Ok(()) => state.events.push(Event::CloseRequested {
                    toplevel: *toplevel,
                }),
                Err(err) => log_rejected_event("xdg_toplevel.close", &err),
            },
            _ => {}
        }
    }
}

impl WaylandState {
    /// Gives `surface` the toplevel role through `xdg_wm_base`.
    ///
    /// Commit the surface once without a buffer afterwards; the compositor
    /// answers with the first configure.
    pub fn get_toplevel(
        &mut self,
        wm_base: GlobalId,
        surface: SurfaceId,
    ) -> Result<ToplevelId, Error> {
        let id = self.session.get_toplevel(wm_base, surface)?;
        let GlobalProxy::WmBase(xdg_wm_base) = self.global_proxy(wm_base)? else {
            return Err(Error::StaleHandle { kind: "global" });
        };
        let wl_surface = proxy(&self.surfaces, surface)?;
        let xdg_surface = xdg_wm_base.get_xdg_surface(wl_surface, &self.qh, id);
        let toplevel = xdg_surface.get_toplevel(&self.qh, id);
        self.toplevels.insert(
            id,
            ToplevelProxies {
                xdg_surface,
                toplevel,
            },
        );
        Ok(id)
    }

    /// Acknowledges the configure carrying `serial`.
    pub fn ack_configure(&mut self, toplevel: ToplevelId, serial: u32) -> Result<(), Error> {
        self.session.ack_configure(toplevel, serial)?;
        proxy(&self.toplevels, toplevel)?
            .xdg_surface
            .ack_configure(serial);
        Ok(())
    }

    /// Sets the window title.
    pub fn set_title(&mut self, toplevel: ToplevelId, title: &str) -> Result<(), Error> {
        self.session.set_title(toplevel, title)?;
        proxy(&self.toplevels, toplevel)?
            .toplevel
            .set_title(title.to_owned());
        Ok(())
    }

    /// Sets the application identity.
    pub fn set_app_id(&mut self, toplevel: ToplevelId, app_id: &str) -> Result<(), Error> {
        self.session.set_app_id(toplevel, app_id)?;
        proxy(&self.toplevels, toplevel)?
            .toplevel
            .set_app_id(app_id.to_owned());
        Ok(())
    }

    /// Sets the minimum window size; `0` leaves an axis unconstrained.
    pub fn set_min_size(
        &mut self,
        toplevel: ToplevelId,
        width: i32,
        height: i32,
    ) -> Result<(), Error> {
        self.session.set_min_size(toplevel, width, height)?;
        proxy(&self.toplevels, toplevel)?
            .toplevel
            .set_min_size(width, height);
        Ok(())
    }

    /// Sets the maximum window size; `0` leaves an axis unconstrained.
    pub fn set_max_size(
        &mut self,
        toplevel: ToplevelId,
        width: i32,
        height: i32,
    ) -> Result<(), Error> {
        self.session.set_max_size(toplevel, width, height)?;
        proxy(&self.toplevels, toplevel)?
            .toplevel
            .set_max_size(width, height);
        Ok(())
    }

    /// Destroys the role; destroy the surface afterwards.
    pub fn destroy_toplevel(&mut self, toplevel: ToplevelId) -> Result<(), Error> {
        self.session.destroy_toplevel(toplevel)?;
        self.proposals.remove(&toplevel);
        if let Some(ToplevelProxies {
            xdg_surface,
            toplevel,
        }) = self.toplevels.remove(&toplevel)
        {
            toplevel.destroy();
            xdg_surface.destroy();
        }
        Ok(())
    }

    /// Answers a ping, echoing its serial.
    pub fn pong(&mut self, wm_base: GlobalId, serial: u32) -> Result<(), Error> {
        self.session.pong(wm_base, serial)?;
        if let GlobalProxy::WmBase(xdg_wm_base) = self.global_proxy(wm_base)? {
            xdg_wm_base.pong(serial);
        }
        Ok(())
    }
}
