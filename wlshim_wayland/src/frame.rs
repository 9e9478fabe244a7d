// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame callbacks (`wl_surface.frame`).
//!
//! Frame callbacks pace repaints to the compositor's readiness; they carry no
//! presentation timing beyond a millisecond timestamp.

use wayland_client::protocol::wl_callback;
use wayland_client::{Connection, Dispatch, QueueHandle};
use wlshim_core::{Error, FrameToken, SurfaceId};

use crate::event::Event;
use crate::state::{WaylandState, log_rejected_event, proxy};

impl Dispatch<wl_callback::WlCallback, FrameToken> for WaylandState {
    fn event(
        state: &mut Self,
        _callback: &wl_callback::WlCallback,
        event: wl_callback::Event,
        token: &FrameToken,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let wl_callback::Event::Done { callback_data } = event {
            state.frames.remove(token);
            match state.session.frame_done(*token) {
                Ok(surface) => state.events.push(Event::FrameDone {
                    surface,
                    token: *token,
                    time_ms: callback_data,
                }),
                Err(err) => log_rejected_event("wl_callback.done", &err),
            }
        }
    }
}

impl WaylandState {
    /// Requests a one-shot notification for when the compositor is ready for
    /// the next frame. Takes effect with the next commit.
    ///
    /// Fails while another token for the same surface is outstanding.
    pub fn request_frame(&mut self, surface: SurfaceId) -> Result<FrameToken, Error> {
        let token = self.session.request_frame(surface)?;
        let callback = proxy(&self.surfaces, surface)?.frame(&self.qh, token);
        self.frames.insert(token, callback);
        Ok(token)
    }
}
