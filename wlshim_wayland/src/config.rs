// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend configuration.

use wlshim_core::GlobalKind;

use crate::event::EventQueue;

/// Highest version the backend binds for each global.
///
/// Binds negotiate `min(advertised, limit)`. The defaults stay within what
/// the `wayland-client` and `wayland-protocols` bindings generate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VersionLimits {
    /// `wl_compositor`
    pub compositor: u32,
    /// `wl_shm`
    pub shm: u32,
    /// `wl_seat`
    pub seat: u32,
    /// `xdg_wm_base`
    pub wm_base: u32,
}

impl VersionLimits {
    /// Limit for `kind`.
    #[must_use]
    pub const fn for_kind(&self, kind: GlobalKind) -> u32 {
        match kind {
            GlobalKind::Compositor => self.compositor,
            GlobalKind::Shm => self.shm,
            GlobalKind::Seat => self.seat,
            GlobalKind::WmBase => self.wm_base,
        }
    }
}

impl Default for VersionLimits {
    fn default() -> Self {
        Self {
            compositor: 6,
            shm: 2,
            seat: 7,
            wm_base: 5,
        }
    }
}

/// Backend configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Capacity of the event queue; `0` is promoted to `1`.
    pub event_capacity: usize,
    /// Per-global bind version limits.
    pub versions: VersionLimits,
    /// Answer `xdg_wm_base.ping` inside dispatch instead of queueing a
    /// [`Event::Ping`](crate::Event::Ping).
    pub auto_pong: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event_capacity: EventQueue::DEFAULT_CAPACITY,
            versions: VersionLimits::default(),
            auto_pong: false,
        }
    }
}

impl Config {
    /// Sets the event queue capacity.
    #[must_use]
    pub const fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Sets the bind version limits.
    #[must_use]
    pub const fn with_versions(mut self, versions: VersionLimits) -> Self {
        self.versions = versions;
        self
    }

    /// Enables or disables automatic pong replies.
    #[must_use]
    pub const fn with_auto_pong(mut self, auto_pong: bool) -> Self {
        self.auto_pong = auto_pong;
        self
    }
}
