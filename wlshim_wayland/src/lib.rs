// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wayland backend for wlshim.
//!
//! Drives a compositor connection through the validating
//! [`Session`](wlshim_core::Session):
//!
//! - Registry binding with version negotiation
//! - `wl_shm` pools and buffers over anonymous shared memory
//! - `wl_surface` attach, damage, scale, and commit
//! - `xdg_toplevel` configure/acknowledge handshake and ping/pong
//! - `wl_surface.frame` callbacks
//! - `wl_seat` capabilities and pointers
//!
//! Requests are methods on [`WaylandState`], reached through
//! [`Client::state_mut`]. Compositor events land in an [`EventQueue`] once
//! the session has absorbed them.

mod client;
mod config;
mod error;
mod event;
mod frame;
mod queue;
mod registry;
mod seat;
mod shell;
mod shm;
mod state;
mod surface;

pub use client::Client;
pub use config::{Config, VersionLimits};
pub use error::Error;
pub use event::{Event, EventQueue, ScrollAxis};
pub use shm::create_shm_file;
pub use state::WaylandState;
pub use wlshim_core;
