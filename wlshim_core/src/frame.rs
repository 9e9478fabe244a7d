// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot frame callbacks used to pace repaints.

use crate::error::{Error, Violation};
use crate::handle::{FrameToken, SurfaceId};
use crate::session::Session;

/// An outstanding `wl_surface.frame` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Surface the callback was requested on.
    pub surface: SurfaceId,
}

impl Session {
    /// Requests a "ready for the next frame" notification for `surface`.
    ///
    /// At most one token may be outstanding per surface.
    pub fn request_frame(&mut self, surface: SurfaceId) -> Result<FrameToken, Error> {
        if self.surfaces.lookup(surface)?.frame.is_some() {
            tracing::warn!(?surface, "duplicate frame request");
            return Err(Violation::FrameAlreadyPending.into());
        }
        let token = self.frames.insert(Frame { surface });
        self.surfaces.lookup_mut(surface)?.frame = Some(token);
        Ok(token)
    }

    /// Consumes a fired token, returning the surface it paced.
    ///
    /// A token fires exactly once; a second call reports a stale handle.
    pub fn frame_done(&mut self, token: FrameToken) -> Result<SurfaceId, Error> {
        let Frame { surface } = self.frames.remove(token)?;
        if let Some(record) = self.surfaces.get_mut(surface) {
            record.frame = None;
        }
        Ok(surface)
    }

    /// The token outstanding for `surface`, if any.
    pub fn pending_frame(&self, surface: SurfaceId) -> Result<Option<FrameToken>, Error> {
        Ok(self.surfaces.lookup(surface)?.frame)
    }
}
