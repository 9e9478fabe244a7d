// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The `xdg_toplevel` role and its configure/acknowledge state machine.
//!
//! ```text
//! get_toplevel ──► Unconfigured ──configure──► ConfigurePending
//!                                                  │      ▲
//!                                      ack_configure│      │configure
//!                                                  ▼      │
//!                                              Acknowledged
//!                                                  │
//!                         destroy_toplevel (any state) ──► Closed
//! ```
//!
//! The role keeps a surface dark until the first acknowledge: only after it
//! may a commit carry a buffer.

use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Error, Violation};
use crate::handle::{GlobalId, SurfaceId, ToplevelId};
use crate::registry::{GlobalDetail, GlobalKind};
use crate::session::Session;
use crate::surface::Attachment;

/// Where a toplevel is in the configure/acknowledge handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ToplevelState {
    /// Role assigned, no configure received yet.
    Unconfigured,
    /// A configure arrived and waits for `ack_configure`.
    ConfigurePending {
        /// Serial the acknowledge must echo.
        serial: u32,
    },
    /// The latest configure was acknowledged.
    Acknowledged {
        /// Serial that was acknowledged.
        serial: u32,
    },
    /// The role was destroyed.
    Closed,
}

/// Window states carried by `xdg_toplevel.configure`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WindowState {
    /// Maximized.
    Maximized,
    /// Fullscreen.
    Fullscreen,
    /// Being interactively resized.
    Resizing,
    /// Has keyboard focus decorations.
    Activated,
    /// Tiled against the left edge.
    TiledLeft,
    /// Tiled against the right edge.
    TiledRight,
    /// Tiled against the top edge.
    TiledTop,
    /// Tiled against the bottom edge.
    TiledBottom,
    /// Not visible; repaints may be throttled.
    Suspended,
}

impl WindowState {
    /// Decodes an `xdg_toplevel.state` value.
    #[must_use]
    pub const fn from_raw(value: u32) -> Option<Self> {
        Some(match value {
            1 => Self::Maximized,
            2 => Self::Fullscreen,
            3 => Self::Resizing,
            4 => Self::Activated,
            5 => Self::TiledLeft,
            6 => Self::TiledRight,
            7 => Self::TiledTop,
            8 => Self::TiledBottom,
            9 => Self::Suspended,
            _ => return None,
        })
    }
}

/// A size/state proposal from the compositor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Configure {
    /// Serial to acknowledge.
    pub serial: u32,
    /// Proposed width; 0 lets the client choose.
    pub width: i32,
    /// Proposed height; 0 lets the client choose.
    pub height: i32,
    /// Window states in effect.
    pub states: Vec<WindowState>,
}

/// An `xdg_toplevel` role bound to one surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toplevel {
    /// The surface hosting the role.
    pub surface: SurfaceId,
    /// The `xdg_wm_base` global it was created from.
    pub wm_base: GlobalId,
    /// Handshake state.
    pub state: ToplevelState,
    /// The latest configure proposal.
    pub last_configure: Option<Configure>,
    /// Window title.
    pub title: Option<String>,
    /// Application identity (usually the desktop file name).
    pub app_id: Option<String>,
    /// Minimum size hint; `(0, 0)` means unset.
    pub min_size: (i32, i32),
    /// Maximum size hint; `(0, 0)` means unset.
    pub max_size: (i32, i32),
    /// The compositor asked the window to close.
    pub close_requested: bool,
    pub(crate) acknowledged_once: bool,
}

impl Toplevel {
    /// Whether the role was destroyed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == ToplevelState::Closed
    }

    fn ensure_open(&self) -> Result<(), Error> {
        if self.is_closed() {
            return Err(Violation::ToplevelClosed.into());
        }
        Ok(())
    }
}

impl Session {
    /// Gives `surface` the toplevel role. A surface hosts at most one role in
    /// its lifetime, and must not have a buffer attached or committed yet.
    pub fn get_toplevel(
        &mut self,
        wm_base: GlobalId,
        surface: SurfaceId,
    ) -> Result<ToplevelId, Error> {
        self.expect_global(wm_base, GlobalKind::WmBase)?;
        let record = self.surfaces.lookup(surface)?;
        if record.role.is_some() {
            return Err(Violation::RoleAlreadyAssigned.into());
        }
        let pending_buffer = matches!(record.pending.attachment, Some(Attachment::Buffer { .. }));
        if pending_buffer || record.committed.buffer.is_some() {
            tracing::warn!(?surface, "toplevel role requested for a surface with a buffer");
            return Err(Violation::BufferBeforeRole.into());
        }
        let id = self.toplevels.insert(Toplevel {
            surface,
            wm_base,
            state: ToplevelState::Unconfigured,
            last_configure: None,
            title: None,
            app_id: None,
            min_size: (0, 0),
            max_size: (0, 0),
            close_requested: false,
            acknowledged_once: false,
        });
        self.surfaces.lookup_mut(surface)?.role = Some(id);
        tracing::debug!(?id, ?surface, "toplevel role assigned");
        Ok(id)
    }

    /// Returns the toplevel behind `id`.
    pub fn toplevel(&self, id: ToplevelId) -> Result<&Toplevel, Error> {
        self.toplevels.lookup(id)
    }

    /// Returns the handshake state of `id`.
    pub fn toplevel_state(&self, id: ToplevelId) -> Result<ToplevelState, Error> {
        Ok(self.toplevels.lookup(id)?.state)
    }

    /// Records a configure event; the caller must answer with
    /// [`Self::ack_configure`] using the same serial.
    pub fn configure(&mut self, toplevel: ToplevelId, configure: Configure) -> Result<(), Error> {
        let record = self.toplevels.lookup_mut(toplevel)?;
        record.ensure_open()?;
        record.state = ToplevelState::ConfigurePending {
            serial: configure.serial,
        };
        tracing::debug!(
            id = ?toplevel,
            serial = configure.serial,
            width = configure.width,
            height = configure.height,
            "configure received"
        );
        record.last_configure = Some(configure);
        Ok(())
    }

    /// Acknowledges the latest configure. `serial` must be the one it carried.
    pub fn ack_configure(&mut self, toplevel: ToplevelId, serial: u32) -> Result<(), Error> {
        let record = self.toplevels.lookup_mut(toplevel)?;
        match record.state {
            ToplevelState::ConfigurePending { serial: expected } if expected == serial => {
                record.state = ToplevelState::Acknowledged { serial };
                record.acknowledged_once = true;
                Ok(())
            }
            ToplevelState::ConfigurePending { serial: expected } => {
                Err(Violation::SerialMismatch {
                    expected,
                    received: serial,
                }
                .into())
            }
            ToplevelState::Unconfigured | ToplevelState::Acknowledged { .. } => {
                Err(Violation::NoPendingConfigure.into())
            }
            ToplevelState::Closed => Err(Violation::ToplevelClosed.into()),
        }
    }

    /// Sets the window title; applied by the compositor on the next commit.
    pub fn set_title(&mut self, toplevel: ToplevelId, title: &str) -> Result<(), Error> {
        let record = self.toplevels.lookup_mut(toplevel)?;
        record.ensure_open()?;
        record.title = Some(String::from(title));
        Ok(())
    }

    /// Sets the application identity.
    pub fn set_app_id(&mut self, toplevel: ToplevelId, app_id: &str) -> Result<(), Error> {
        let record = self.toplevels.lookup_mut(toplevel)?;
        record.ensure_open()?;
        record.app_id = Some(String::from(app_id));
        Ok(())
    }

    /// Sets the minimum size hint. Zero means no limit on that axis.
    pub fn set_min_size(
        &mut self,
        toplevel: ToplevelId,
        width: i32,
        height: i32,
    ) -> Result<(), Error> {
        check_size_hint(width, height)?;
        let record = self.toplevels.lookup_mut(toplevel)?;
        record.ensure_open()?;
        record.min_size = (width, height);
        Ok(())
    }

    /// Sets the maximum size hint. Zero means no limit on that axis.
    pub fn set_max_size(
        &mut self,
        toplevel: ToplevelId,
        width: i32,
        height: i32,
    ) -> Result<(), Error> {
        check_size_hint(width, height)?;
        let record = self.toplevels.lookup_mut(toplevel)?;
        record.ensure_open()?;
        record.max_size = (width, height);
        Ok(())
    }

    /// Records `xdg_toplevel.close`.
    pub fn close_requested(&mut self, toplevel: ToplevelId) -> Result<(), Error> {
        let record = self.toplevels.lookup_mut(toplevel)?;
        record.ensure_open()?;
        record.close_requested = true;
        Ok(())
    }

    /// Destroys the role. The surface stays alive and must be destroyed
    /// separately, after this call.
    pub fn destroy_toplevel(&mut self, toplevel: ToplevelId) -> Result<(), Error> {
        let record = self.toplevels.lookup_mut(toplevel)?;
        record.ensure_open()?;
        record.state = ToplevelState::Closed;
        tracing::debug!(id = ?toplevel, "toplevel closed");
        Ok(())
    }

    /// Records an `xdg_wm_base.ping`.
    pub fn ping(&mut self, wm_base: GlobalId, serial: u32) -> Result<(), Error> {
        self.expect_global(wm_base, GlobalKind::WmBase)?;
        if let Some(pings) = self.pings_mut(wm_base) {
            pings.push(serial);
        }
        Ok(())
    }

    /// Validates a pong: it must echo an outstanding ping serial.
    pub fn pong(&mut self, wm_base: GlobalId, serial: u32) -> Result<(), Error> {
        self.expect_global(wm_base, GlobalKind::WmBase)?;
        let pings = self
            .pings_mut(wm_base)
            .ok_or(Violation::UnknownPing { serial })?;
        let position = pings
            .iter()
            .position(|pending| *pending == serial)
            .ok_or(Violation::UnknownPing { serial })?;
        pings.remove(position);
        Ok(())
    }

    /// Ping serials that still need a pong.
    pub fn pending_pings(&self, wm_base: GlobalId) -> Result<&[u32], Error> {
        match &self.expect_global(wm_base, GlobalKind::WmBase)?.detail {
            GlobalDetail::WmBase { pings } => Ok(pings),
            _ => Ok(&[]),
        }
    }

    fn pings_mut(&mut self, wm_base: GlobalId) -> Option<&mut Vec<u32>> {
        match &mut self.globals.get_mut(wm_base)?.detail {
            GlobalDetail::WmBase { pings } => Some(pings),
            _ => None,
        }
    }
}

fn check_size_hint(width: i32, height: i32) -> Result<(), Error> {
    if width < 0 {
        return Err(Error::InvalidArgument {
            name: "width",
            value: width,
        });
    }
    if height < 0 {
        return Err(Error::InvalidArgument {
            name: "height",
            value: height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Configure, ToplevelState, WindowState};
    use crate::error::{Error, Violation};
    use crate::format::PixelFormat;
    use crate::handle::{GlobalId, SurfaceId, ToplevelId};
    use crate::registry::{Advertisement, GlobalKind};
    use crate::session::Session;
    use crate::shm::BufferSpec;
    use alloc::string::String;
    use alloc::vec;

    struct Window {
        session: Session,
        wm_base: GlobalId,
        shm: GlobalId,
        surface: SurfaceId,
        toplevel: ToplevelId,
    }

    fn window() -> Window {
        let mut session = Session::new();
        for (name, interface) in [(1, "wl_compositor"), (2, "xdg_wm_base"), (3, "wl_shm")] {
            session.advertise(Advertisement {
                name,
                interface: String::from(interface),
                version: 1,
            });
        }
        let compositor = session.bind_global(1, GlobalKind::Compositor, 1).unwrap();
        let wm_base = session.bind_global(2, GlobalKind::WmBase, 1).unwrap();
        let shm = session.bind_global(3, GlobalKind::Shm, 1).unwrap();
        let surface = session.create_surface(compositor).unwrap();
        let toplevel = session.get_toplevel(wm_base, surface).unwrap();
        Window {
            session,
            wm_base,
            shm,
            surface,
            toplevel,
        }
    }

    fn configure(serial: u32) -> Configure {
        Configure {
            serial,
            width: 640,
            height: 480,
            states: vec![WindowState::Activated],
        }
    }

    fn attach_fresh_buffer(session: &mut Session, shm: GlobalId, surface: SurfaceId) {
        let pool = session.create_pool(shm, 4096).unwrap();
        let buffer = session
            .create_buffer(pool, BufferSpec::packed(0, 32, 32, PixelFormat::Argb8888))
            .unwrap();
        session.attach(surface, buffer, 0, 0).unwrap();
    }

    #[test]
    fn handshake_walks_the_states() {
        let Window {
            mut session,
            toplevel,
            ..
        } = window();
        assert_eq!(session.toplevel_state(toplevel), Ok(ToplevelState::Unconfigured));

        session.configure(toplevel, configure(7)).unwrap();
        assert_eq!(
            session.toplevel_state(toplevel),
            Ok(ToplevelState::ConfigurePending { serial: 7 })
        );

        session.ack_configure(toplevel, 7).unwrap();
        assert_eq!(
            session.toplevel_state(toplevel),
            Ok(ToplevelState::Acknowledged { serial: 7 })
        );

        session.destroy_toplevel(toplevel).unwrap();
        assert_eq!(session.toplevel_state(toplevel), Ok(ToplevelState::Closed));
    }

    #[test]
    fn ack_requires_the_latest_serial() {
        let Window {
            mut session,
            toplevel,
            ..
        } = window();
        assert_eq!(
            session.ack_configure(toplevel, 1),
            Err(Error::OrderingViolation(Violation::NoPendingConfigure))
        );

        session.configure(toplevel, configure(3)).unwrap();
        session.configure(toplevel, configure(4)).unwrap();
        assert_eq!(
            session.ack_configure(toplevel, 3),
            Err(Error::OrderingViolation(Violation::SerialMismatch {
                expected: 4,
                received: 3,
            }))
        );
        session.ack_configure(toplevel, 4).unwrap();
        assert_eq!(
            session.ack_configure(toplevel, 4),
            Err(Error::OrderingViolation(Violation::NoPendingConfigure))
        );
    }

    #[test]
    fn buffer_commit_before_ack_is_rejected() {
        let Window {
            mut session,
            shm,
            surface,
            toplevel,
            ..
        } = window();

        // The initial bufferless commit is what triggers the first configure.
        session.commit(surface).unwrap();

        attach_fresh_buffer(&mut session, shm, surface);
        assert_eq!(
            session.commit(surface),
            Err(Error::OrderingViolation(Violation::CommitBeforeAck))
        );

        session.configure(toplevel, configure(9)).unwrap();
        assert_eq!(
            session.commit(surface),
            Err(Error::OrderingViolation(Violation::CommitBeforeAck))
        );

        session.ack_configure(toplevel, 9).unwrap();
        session.commit(surface).unwrap();
    }

    #[test]
    fn reconfigure_after_ack_still_allows_commits() {
        let Window {
            mut session,
            shm,
            surface,
            toplevel,
            ..
        } = window();
        session.configure(toplevel, configure(1)).unwrap();
        session.ack_configure(toplevel, 1).unwrap();
        session.configure(toplevel, configure(2)).unwrap();

        attach_fresh_buffer(&mut session, shm, surface);
        session.commit(surface).unwrap();
        assert_eq!(
            session.toplevel_state(toplevel),
            Ok(ToplevelState::ConfigurePending { serial: 2 })
        );
    }

    #[test]
    fn surface_hosts_one_role_in_its_lifetime() {
        let Window {
            mut session,
            wm_base,
            surface,
            toplevel,
            ..
        } = window();
        assert_eq!(
            session.get_toplevel(wm_base, surface),
            Err(Error::OrderingViolation(Violation::RoleAlreadyAssigned))
        );
        session.destroy_toplevel(toplevel).unwrap();
        assert_eq!(
            session.get_toplevel(wm_base, surface),
            Err(Error::OrderingViolation(Violation::RoleAlreadyAssigned))
        );
    }

    #[test]
    fn surface_destroy_before_toplevel_is_rejected() {
        let Window {
            mut session,
            shm,
            surface,
            toplevel,
            ..
        } = window();
        assert_eq!(
            session.destroy_surface(surface),
            Err(Error::OrderingViolation(Violation::LiveChildren {
                parent: "surface",
                child: "toplevel",
                count: 1,
            }))
        );
        // Nothing was torn down on the caller's behalf.
        assert_eq!(session.toplevel_state(toplevel), Ok(ToplevelState::Unconfigured));

        session.destroy_toplevel(toplevel).unwrap();
        session.destroy_surface(surface).unwrap();
        assert!(session.toplevel(toplevel).is_err());
    }

    #[test]
    fn metadata_setters_stop_at_closed() {
        let Window {
            mut session,
            toplevel,
            ..
        } = window();
        session.set_title(toplevel, "Demo").unwrap();
        session.set_app_id(toplevel, "org.example.demo").unwrap();
        session.set_min_size(toplevel, 200, 100).unwrap();
        session.set_max_size(toplevel, 0, 0).unwrap();
        assert!(session.set_min_size(toplevel, -1, 100).is_err());

        let record = session.toplevel(toplevel).unwrap();
        assert_eq!(record.title.as_deref(), Some("Demo"));
        assert_eq!(record.app_id.as_deref(), Some("org.example.demo"));
        assert_eq!(record.min_size, (200, 100));

        session.destroy_toplevel(toplevel).unwrap();
        assert_eq!(
            session.set_title(toplevel, "Late"),
            Err(Error::OrderingViolation(Violation::ToplevelClosed))
        );
        assert_eq!(
            session.destroy_toplevel(toplevel),
            Err(Error::OrderingViolation(Violation::ToplevelClosed))
        );
    }

    #[test]
    fn role_must_precede_the_first_buffer() {
        let Window {
            mut session,
            wm_base,
            shm,
            surface,
            ..
        } = window();
        let compositor = session.surface(surface).unwrap().compositor;
        let bare = session.create_surface(compositor).unwrap();
        attach_fresh_buffer(&mut session, shm, bare);
        assert_eq!(
            session.get_toplevel(wm_base, bare),
            Err(Error::OrderingViolation(Violation::BufferBeforeRole))
        );

        session.commit(bare).unwrap();
        assert_eq!(
            session.get_toplevel(wm_base, bare),
            Err(Error::OrderingViolation(Violation::BufferBeforeRole))
        );
        assert_eq!(session.surface(bare).unwrap().role, None);

        session.detach(bare).unwrap();
        session.commit(bare).unwrap();
        assert!(session.get_toplevel(wm_base, bare).is_ok());
    }

    #[test]
    fn close_request_is_recorded() {
        let Window {
            mut session,
            toplevel,
            ..
        } = window();
        session.close_requested(toplevel).unwrap();
        assert!(session.toplevel(toplevel).unwrap().close_requested);
    }

    #[test]
    fn pong_must_echo_a_ping() {
        let Window {
            mut session,
            wm_base,
            ..
        } = window();
        assert_eq!(
            session.pong(wm_base, 5),
            Err(Error::OrderingViolation(Violation::UnknownPing { serial: 5 }))
        );

        session.ping(wm_base, 5).unwrap();
        session.ping(wm_base, 6).unwrap();
        assert_eq!(session.pending_pings(wm_base), Ok(&[5_u32, 6][..]));

        session.pong(wm_base, 6).unwrap();
        session.pong(wm_base, 5).unwrap();
        assert_eq!(session.pending_pings(wm_base), Ok(&[][..]));
    }

    #[test]
    fn window_state_decodes_known_values() {
        assert_eq!(WindowState::from_raw(4), Some(WindowState::Activated));
        assert_eq!(WindowState::from_raw(9), Some(WindowState::Suspended));
        assert_eq!(WindowState::from_raw(0), None);
    }
}
