// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Handle arenas and lifecycle validation for a Wayland client shim.
//!
//! `wlshim_core` models the objects a Wayland client creates (bound globals,
//! surfaces, `xdg_toplevel` roles, shared-memory pools and buffers, frame
//! callbacks, pointers) as generational handles in a single [`Session`]. It
//! performs no I/O: a backend such as `wlshim_wayland` validates every request
//! here first and only then forwards it to the protocol object, and feeds
//! incoming events (configure, frame done, buffer release, ping) back in.
//!
//! # Object graph
//!
//! ```text
//!   wl_compositor ──► Surface ──► Toplevel (one role per surface lifetime)
//!                        └──────► FrameToken (at most one outstanding)
//!   wl_shm ─────────► Pool ─────► Buffer (in flight until released)
//!   wl_seat ────────► Pointer
//!   xdg_wm_base ────► Toplevel, ping/pong
//! ```
//!
//! Children hold their parent's handle. Destroying a parent while children
//! are live fails with [`Violation::LiveChildren`]; nothing is torn down on
//! the caller's behalf.
//!
//! # Handshake
//!
//! A toplevel starts [`ToplevelState::Unconfigured`]. A configure event moves
//! it to `ConfigurePending`, and [`Session::ack_configure`] with the same
//! serial moves it to `Acknowledged`. Until the first acknowledge,
//! [`Session::commit`] refuses to show a buffer.
//!
//! This crate is `no_std` (with `alloc`).

#![no_std]

extern crate alloc;

mod error;
mod format;
mod frame;
mod handle;
mod registry;
mod seat;
mod session;
mod shell;
mod shm;
mod surface;

pub use error::{Error, Mismatch, OutOfBounds, Violation};
pub use format::PixelFormat;
pub use frame::Frame;
pub use handle::{
    BufferId, BufferTag, FrameTag, FrameToken, GlobalId, GlobalTag, Handle, Kind, PointerId,
    PointerTag, PoolId, PoolTag, SurfaceId, SurfaceTag, ToplevelId, ToplevelTag,
};
pub use registry::{Advertisement, Global, GlobalKind, Globals};
pub use seat::{Capabilities, Pointer};
pub use session::{LiveCounts, Session};
pub use shell::{Configure, Toplevel, ToplevelState, WindowState};
pub use shm::{Buffer, BufferSpec, Pool};
pub use surface::{Attachment, CommittedState, PendingState, Rect, Surface};
