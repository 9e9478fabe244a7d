// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error taxonomy for shim requests.

use alloc::string::String;

use crate::registry::GlobalKind;

/// Errors returned by [`Session`](crate::Session) requests.
///
/// None of these are retried. `ProtocolMismatch` is fatal to the client;
/// the remaining variants are caller bugs that would otherwise surface as
/// undefined compositor behavior or a protocol error on the connection.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The registry cannot provide the requested global.
    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(Mismatch),
    /// A pool size was zero or negative, or a resize tried to shrink.
    #[error("invalid pool size {size}")]
    InvalidSize {
        /// The rejected size in bytes.
        size: i32,
    },
    /// An argument violates a documented precondition.
    #[error("invalid {name}: {value}")]
    InvalidArgument {
        /// Which argument was rejected.
        name: &'static str,
        /// The rejected value.
        value: i32,
    },
    /// Buffer geometry does not fit its pool.
    #[error("buffer out of bounds: {0}")]
    OutOfBounds(OutOfBounds),
    /// The request is issued in an order the protocol forbids.
    #[error("ordering violation: {0}")]
    OrderingViolation(Violation),
    /// The handle refers to an object that was already destroyed.
    #[error("stale {kind} handle")]
    StaleHandle {
        /// Kind of object the handle referred to.
        kind: &'static str,
    },
}

/// Why a registry bind could not be satisfied.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Mismatch {
    /// The numeric name was never advertised (or has been withdrawn).
    #[error("global name {name} is not advertised")]
    UnknownName {
        /// Registry name.
        name: u32,
    },
    /// The name was advertised for a different interface.
    #[error("global name {name} is `{advertised}`, not `{}`", .expected.interface())]
    WrongInterface {
        /// Registry name.
        name: u32,
        /// Interface the caller asked for.
        expected: GlobalKind,
        /// Interface the server advertised.
        advertised: String,
    },
    /// The requested version is zero or newer than the advertised one.
    #[error("`{}` version {requested} requested, server offers {advertised}", .kind.interface())]
    UnsupportedVersion {
        /// Interface being bound.
        kind: GlobalKind,
        /// Version the caller asked for.
        requested: u32,
        /// Version the server advertised.
        advertised: u32,
    },
    /// The registry name is already bound by this client.
    #[error("global name {name} is already bound")]
    AlreadyBound {
        /// Registry name.
        name: u32,
    },
    /// The server advertises no global of this kind.
    #[error("no `{}` global advertised", .kind.interface())]
    NotAdvertised {
        /// Missing interface.
        kind: GlobalKind,
    },
    /// A bound global of the wrong kind was passed to a request.
    #[error("expected a `{}` global, got `{}`", .expected.interface(), .found.interface())]
    WrongGlobal {
        /// Kind the request needs.
        expected: GlobalKind,
        /// Kind of the handle passed in.
        found: GlobalKind,
    },
}

/// Buffer geometry violations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OutOfBounds {
    /// `stride` cannot hold one row of `width` pixels.
    #[error("stride {stride} is smaller than the minimum row size {min_stride}")]
    StrideTooSmall {
        /// Requested stride in bytes.
        stride: i32,
        /// `width * bytes_per_pixel(format)`.
        min_stride: i64,
    },
    /// `offset + stride * height` runs past the end of the pool.
    #[error("buffer ends at byte {end}, pool holds {pool_size}")]
    ExceedsPool {
        /// One past the last byte of the buffer.
        end: i64,
        /// Pool size in bytes.
        pool_size: i32,
    },
}

/// Lifecycle and handshake ordering violations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// A buffer was committed to a toplevel before the first configure was
    /// acknowledged.
    #[error("buffer committed before the first configure was acknowledged")]
    CommitBeforeAck,
    /// `ack_configure` named a serial other than the latest configure.
    #[error("ack_configure serial {received} does not match configure serial {expected}")]
    SerialMismatch {
        /// Serial of the most recent configure event.
        expected: u32,
        /// Serial passed by the caller.
        received: u32,
    },
    /// `ack_configure` was called with no configure outstanding.
    #[error("no configure event is waiting to be acknowledged")]
    NoPendingConfigure,
    /// The surface already hosted a role.
    #[error("surface already has a role")]
    RoleAlreadyAssigned,
    /// The surface had a buffer attached or committed before its role.
    #[error("surface already has a buffer; assign the role first")]
    BufferBeforeRole,
    /// The toplevel was already destroyed.
    #[error("toplevel is closed")]
    ToplevelClosed,
    /// A frame callback is already outstanding for the surface.
    #[error("a frame callback is already pending for this surface")]
    FrameAlreadyPending,
    /// The buffer is still held by the compositor.
    #[error("buffer is in flight until the compositor releases it")]
    BufferInFlight,
    /// A parent object was destroyed while children are still live.
    #[error("cannot destroy {parent} with {count} live {child} object(s)")]
    LiveChildren {
        /// Kind of the parent being destroyed.
        parent: &'static str,
        /// Kind of the children still alive.
        child: &'static str,
        /// Number of live children.
        count: usize,
    },
    /// A pong echoed a serial that no ping carried.
    #[error("pong serial {serial} matches no outstanding ping")]
    UnknownPing {
        /// Serial passed by the caller.
        serial: u32,
    },
}

impl From<Mismatch> for Error {
    fn from(mismatch: Mismatch) -> Self {
        Self::ProtocolMismatch(mismatch)
    }
}

impl From<OutOfBounds> for Error {
    fn from(bounds: OutOfBounds) -> Self {
        Self::OutOfBounds(bounds)
    }
}

impl From<Violation> for Error {
    fn from(violation: Violation) -> Self {
        Self::OrderingViolation(violation)
    }
}

#[cfg(test)]
mod tests {
    use super::{Error, Mismatch, Violation};
    use crate::registry::GlobalKind;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_interface() {
        let err = Error::from(Mismatch::NotAdvertised {
            kind: GlobalKind::WmBase,
        });
        assert_eq!(
            err.to_string(),
            "protocol mismatch: no `xdg_wm_base` global advertised"
        );
    }

    #[test]
    fn live_children_message_counts_children() {
        let err = Error::from(Violation::LiveChildren {
            parent: "seat",
            child: "pointer",
            count: 2,
        });
        assert_eq!(
            err.to_string(),
            "ordering violation: cannot destroy seat with 2 live pointer object(s)"
        );
    }
}
