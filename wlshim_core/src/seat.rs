// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Seat capabilities and pointer objects.

use crate::error::{Error, Violation};
use crate::handle::{GlobalId, PointerId};
use crate::registry::{GlobalDetail, GlobalKind};
use crate::session::Session;

/// Input devices a seat currently offers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// A pointer device is present.
    pub pointer: bool,
    /// A keyboard is present.
    pub keyboard: bool,
    /// A touch device is present.
    pub touch: bool,
}

impl Capabilities {
    /// Decodes the `wl_seat.capabilities` bitfield.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self {
            pointer: bits & 1 != 0,
            keyboard: bits & 2 != 0,
            touch: bits & 4 != 0,
        }
    }
}

/// A `wl_pointer` derived from a seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pointer {
    /// Seat the pointer was obtained from.
    pub seat: GlobalId,
}

impl Session {
    /// Records `wl_seat.capabilities`.
    pub fn seat_capabilities(
        &mut self,
        seat: GlobalId,
        capabilities: Capabilities,
    ) -> Result<(), Error> {
        self.expect_global(seat, GlobalKind::Seat)?;
        if let Some(global) = self.globals.get_mut(seat) {
            global.detail = GlobalDetail::Seat {
                capabilities: Some(capabilities),
            };
        }
        tracing::debug!(?seat, ?capabilities, "seat capabilities");
        Ok(())
    }

    /// Last capabilities announced for `seat`, if any arrived yet.
    pub fn capabilities(&self, seat: GlobalId) -> Result<Option<Capabilities>, Error> {
        match self.expect_global(seat, GlobalKind::Seat)?.detail {
            GlobalDetail::Seat { capabilities } => Ok(capabilities),
            _ => Ok(None),
        }
    }

    /// Obtains a pointer from `seat`.
    ///
    /// Requesting a pointer from a seat that announced no pointer device is
    /// allowed; the compositor hands back an inert object.
    pub fn get_pointer(&mut self, seat: GlobalId) -> Result<PointerId, Error> {
        if let Some(capabilities) = self.capabilities(seat)? {
            if !capabilities.pointer {
                tracing::debug!(?seat, "pointer requested from a seat without one");
            }
        }
        let id = self.pointers.insert(Pointer { seat });
        tracing::debug!(?id, ?seat, "pointer bound");
        Ok(id)
    }

    /// Returns the pointer behind `id`.
    pub fn pointer(&self, id: PointerId) -> Result<&Pointer, Error> {
        self.pointers.lookup(id)
    }

    /// Releases a pointer.
    pub fn release_pointer(&mut self, pointer: PointerId) -> Result<(), Error> {
        self.pointers.remove(pointer)?;
        tracing::debug!(id = ?pointer, "pointer released");
        Ok(())
    }

    /// Releases a seat. Every pointer derived from it must be released first.
    pub fn release_seat(&mut self, seat: GlobalId) -> Result<(), Error> {
        self.expect_global(seat, GlobalKind::Seat)?;
        self.release_global(seat).map(drop).inspect_err(|err| {
            if matches!(err, Error::OrderingViolation(Violation::LiveChildren { .. })) {
                tracing::warn!(?seat, "seat released before its pointers");
            }
        })
    }
}
