// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The session: every live object a client created, keyed by handle.

use crate::frame::Frame;
use crate::handle::{
    Arena, BufferTag, FrameTag, GlobalTag, PointerTag, PoolTag, SurfaceTag, ToplevelTag,
};
use crate::registry::{Advertisements, Global};
use crate::seat::Pointer;
use crate::shell::Toplevel;
use crate::shm::{Buffer, Pool};
use crate::surface::Surface;

/// Live object counts, by kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiveCounts {
    /// Bound globals.
    pub globals: usize,
    /// Surfaces.
    pub surfaces: usize,
    /// Toplevel records, including closed ones whose surface is still alive.
    pub toplevels: usize,
    /// Pools.
    pub pools: usize,
    /// Buffers.
    pub buffers: usize,
    /// Outstanding frame tokens.
    pub frames: usize,
    /// Pointers.
    pub pointers: usize,
}

impl LiveCounts {
    /// Whether nothing is left alive.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.globals == 0
            && self.surfaces == 0
            && self.toplevels == 0
            && self.pools == 0
            && self.buffers == 0
            && self.frames == 0
            && self.pointers == 0
    }
}

/// Handle tables for every object kind, plus the parent links between them.
///
/// Every request validates its handles and the documented ordering rules
/// before it is forwarded to the compositor. A rejected request leaves the
/// session unchanged.
#[derive(Debug, Default)]
pub struct Session {
    pub(crate) advertised: Advertisements,
    pub(crate) globals: Arena<GlobalTag, Global>,
    pub(crate) surfaces: Arena<SurfaceTag, Surface>,
    pub(crate) toplevels: Arena<ToplevelTag, Toplevel>,
    pub(crate) pools: Arena<PoolTag, Pool>,
    pub(crate) buffers: Arena<BufferTag, Buffer>,
    pub(crate) frames: Arena<FrameTag, Frame>,
    pub(crate) pointers: Arena<PointerTag, Pointer>,
}

impl Session {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts live objects; all zero after an orderly shutdown.
    #[must_use]
    pub fn live_counts(&self) -> LiveCounts {
        LiveCounts {
            globals: self.globals.len(),
            surfaces: self.surfaces.len(),
            toplevels: self.toplevels.len(),
            pools: self.pools.len(),
            buffers: self.buffers.len(),
            frames: self.frames.len(),
            pointers: self.pointers.len(),
        }
    }
}
