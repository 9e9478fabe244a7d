// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Registry advertisements and global binding.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Error, Mismatch, Violation};
use crate::handle::GlobalId;
use crate::seat::Capabilities;
use crate::session::Session;

/// The registry globals the shim knows how to bind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GlobalKind {
    /// `wl_compositor`
    Compositor,
    /// `wl_shm`
    Shm,
    /// `wl_seat`
    Seat,
    /// `xdg_wm_base`
    WmBase,
}

impl GlobalKind {
    /// Every kind, in binding order.
    pub const ALL: [Self; 4] = [Self::Compositor, Self::Shm, Self::Seat, Self::WmBase];

    /// Protocol interface name as advertised by `wl_registry.global`.
    #[must_use]
    pub const fn interface(self) -> &'static str {
        match self {
            Self::Compositor => "wl_compositor",
            Self::Shm => "wl_shm",
            Self::Seat => "wl_seat",
            Self::WmBase => "xdg_wm_base",
        }
    }

    /// Maps an advertised interface name back to a kind.
    #[must_use]
    pub fn from_interface(interface: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.interface() == interface)
    }
}

/// One `wl_registry.global` event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Advertisement {
    /// Numeric registry name.
    pub name: u32,
    /// Interface string, e.g. `wl_compositor`.
    pub interface: String,
    /// Highest version the server supports.
    pub version: u32,
}

/// A bound global and the state the shim tracks for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Global {
    /// Registry name it was bound from.
    pub name: u32,
    /// Which interface it is.
    pub kind: GlobalKind,
    /// Version negotiated at bind time.
    pub version: u32,
    /// Set once the server removed the global from the registry.
    pub withdrawn: bool,
    pub(crate) detail: GlobalDetail,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum GlobalDetail {
    Compositor,
    Shm { formats: Vec<u32> },
    Seat { capabilities: Option<Capabilities> },
    WmBase { pings: Vec<u32> },
}

impl GlobalDetail {
    fn for_kind(kind: GlobalKind) -> Self {
        match kind {
            GlobalKind::Compositor => Self::Compositor,
            GlobalKind::Shm => Self::Shm {
                formats: Vec::new(),
            },
            GlobalKind::Seat => Self::Seat { capabilities: None },
            GlobalKind::WmBase => Self::WmBase { pings: Vec::new() },
        }
    }
}

/// Process-wide global handles, bound once at startup and passed explicitly
/// to dependent requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Globals {
    /// `wl_compositor`
    pub compositor: GlobalId,
    /// `wl_shm`
    pub shm: GlobalId,
    /// `wl_seat`, absent on seatless compositors.
    pub seat: Option<GlobalId>,
    /// `xdg_wm_base`
    pub wm_base: GlobalId,
}

impl Session {
    /// Records a `wl_registry.global` advertisement.
    ///
    /// Interfaces the shim does not bind are recorded too, so that a bind
    /// attempt against them reports the advertised interface.
    pub fn advertise(&mut self, advertisement: Advertisement) {
        tracing::trace!(
            name = advertisement.name,
            interface = %advertisement.interface,
            version = advertisement.version,
            "global advertised"
        );
        self.advertised.insert(advertisement.name, advertisement);
    }

    /// Records a `wl_registry.global_remove`, returning the bound global that
    /// was withdrawn, if this client had bound it.
    pub fn withdraw(&mut self, name: u32) -> Option<GlobalId> {
        self.advertised.remove(&name);
        let (id, global) = self
            .globals
            .iter()
            .find(|(_, global)| global.name == name)?;
        tracing::warn!(?id, kind = ?global.kind, "bound global withdrawn by the server");
        let global = self.globals.get_mut(id)?;
        global.withdrawn = true;
        Some(id)
    }

    /// Returns the recorded advertisements, ordered by name.
    pub fn advertisements(&self) -> impl Iterator<Item = &Advertisement> {
        self.advertised.values()
    }

    /// Validates and records a bind of registry `name` as `kind` at `version`.
    pub fn bind_global(
        &mut self,
        name: u32,
        kind: GlobalKind,
        version: u32,
    ) -> Result<GlobalId, Error> {
        let advertisement = self
            .advertised
            .get(&name)
            .ok_or(Mismatch::UnknownName { name })?;
        if advertisement.interface != kind.interface() {
            return Err(Mismatch::WrongInterface {
                name,
                expected: kind,
                advertised: advertisement.interface.clone(),
            }
            .into());
        }
        if version == 0 || version > advertisement.version {
            return Err(Mismatch::UnsupportedVersion {
                kind,
                requested: version,
                advertised: advertisement.version,
            }
            .into());
        }
        if self.globals.iter().any(|(_, global)| global.name == name) {
            return Err(Mismatch::AlreadyBound { name }.into());
        }

        let id = self.globals.insert(Global {
            name,
            kind,
            version,
            withdrawn: false,
            detail: GlobalDetail::for_kind(kind),
        });
        tracing::debug!(?id, name, interface = kind.interface(), version, "global bound");
        Ok(id)
    }

    /// Picks the first advertisement of `kind` and the version to bind it at:
    /// the advertised version capped at `max_version`.
    pub fn resolve(&self, kind: GlobalKind, max_version: u32) -> Result<(u32, u32), Error> {
        self.advertised
            .values()
            .find(|advertisement| advertisement.interface == kind.interface())
            .map(|advertisement| (advertisement.name, advertisement.version.min(max_version)))
            .ok_or_else(|| Mismatch::NotAdvertised { kind }.into())
    }

    /// Returns the bound global behind `id`.
    pub fn global(&self, id: GlobalId) -> Result<&Global, Error> {
        self.globals.lookup(id)
    }

    /// Releases a bound global at shutdown.
    ///
    /// Fails while objects created from it (surfaces, pools, pointers, or
    /// open toplevels) are still live.
    pub fn release_global(&mut self, id: GlobalId) -> Result<Global, Error> {
        let kind = self.globals.lookup(id)?.kind;
        let (child, count) = match kind {
            GlobalKind::Compositor => (
                "surface",
                self.surfaces
                    .iter()
                    .filter(|(_, surface)| surface.compositor == id)
                    .count(),
            ),
            GlobalKind::Shm => (
                "pool",
                self.pools.iter().filter(|(_, pool)| pool.shm == id).count(),
            ),
            GlobalKind::Seat => (
                "pointer",
                self.pointers
                    .iter()
                    .filter(|(_, pointer)| pointer.seat == id)
                    .count(),
            ),
            GlobalKind::WmBase => (
                "toplevel",
                self.toplevels
                    .iter()
                    .filter(|(_, toplevel)| toplevel.wm_base == id && !toplevel.is_closed())
                    .count(),
            ),
        };
        if count > 0 {
            return Err(Violation::LiveChildren {
                parent: kind.interface(),
                child,
                count,
            }
            .into());
        }
        let global = self.globals.remove(id)?;
        tracing::debug!(?id, interface = kind.interface(), "global released");
        Ok(global)
    }

    /// Checks that `id` is a live global of `expected` kind.
    pub(crate) fn expect_global(
        &self,
        id: GlobalId,
        expected: GlobalKind,
    ) -> Result<&Global, Error> {
        let global = self.globals.lookup(id)?;
        if global.kind != expected {
            return Err(Mismatch::WrongGlobal {
                expected,
                found: global.kind,
            }
            .into());
        }
        Ok(global)
    }

    /// Records a `wl_shm.format` event.
    pub fn shm_format(&mut self, shm: GlobalId, format: u32) -> Result<(), Error> {
        self.expect_global(shm, GlobalKind::Shm)?;
        if let Some(Global {
            detail: GlobalDetail::Shm { formats },
            ..
        }) = self.globals.get_mut(shm)
        {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        Ok(())
    }

    /// Raw `wl_shm` format codes the compositor announced.
    pub fn shm_formats(&self, shm: GlobalId) -> Result<&[u32], Error> {
        match &self.expect_global(shm, GlobalKind::Shm)?.detail {
            GlobalDetail::Shm { formats } => Ok(formats),
            _ => Ok(&[]),
        }
    }
}

pub(crate) type Advertisements = BTreeMap<u32, Advertisement>;
