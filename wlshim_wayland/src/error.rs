// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend error type.

use wayland_client::{ConnectError, DispatchError, backend::WaylandError};

/// Errors from connecting to, or talking with, the compositor.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No compositor could be reached through `WAYLAND_DISPLAY` /
    /// `WAYLAND_SOCKET`.
    #[error("failed to connect to the Wayland compositor: {0}")]
    Connect(#[from] ConnectError),
    /// Reading or dispatching events failed; the connection is dead.
    #[error("Wayland dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
    /// Flushing requests failed; the connection is dead.
    #[error("Wayland connection error: {0}")]
    Wayland(#[from] WaylandError),
    /// Allocating shared memory failed.
    #[error("shared memory allocation failed: {0}")]
    Io(#[from] std::io::Error),
    /// The request was rejected before reaching the compositor.
    #[error(transparent)]
    Shim(#[from] wlshim_core::Error),
}
