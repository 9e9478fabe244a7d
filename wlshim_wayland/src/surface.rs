// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `wl_surface` requests.

use wayland_client::protocol::wl_surface;
use wayland_client::{Connection, Dispatch, Proxy, QueueHandle};
use wlshim_core::{BufferId, Error, GlobalId, Rect, SurfaceId};

use crate::state::{GlobalProxy, WaylandState, proxy};

/// `wl_surface.offset` replaced the attach offsets in this version.
const OFFSET_SINCE: u32 = 5;
/// `wl_surface.set_buffer_scale` exists from this version.
const BUFFER_SCALE_SINCE: u32 = 3;
/// `wl_surface.damage_buffer` exists from this version.
const DAMAGE_BUFFER_SINCE: u32 = 4;

/// Whether a surface of `version` takes damage in buffer coordinates.
const fn damages_buffer(version: u32) -> bool {
    version >= DAMAGE_BUFFER_SINCE
}

impl Dispatch<wl_surface::WlSurface, SurfaceId> for WaylandState {
    fn event(
        _state: &mut Self,
        _surface: &wl_surface::WlSurface,
        _event: wl_surface::Event,
        _data: &SurfaceId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        // Output enter/leave and preferred scale are left to the host.
    }
}

impl WaylandState {
    /// Creates a surface from the compositor global.
    pub fn create_surface(&mut self, compositor: GlobalId) -> Result<SurfaceId, Error> {
        let id = self.session.create_surface(compositor)?;
        let GlobalProxy::Compositor(wl_compositor) = self.global_proxy(compositor)? else {
            return Err(Error::StaleHandle { kind: "global" });
        };
        let surface = wl_compositor.create_surface(&self.qh, id);
        self.surfaces.insert(id, surface);
        Ok(id)
    }

    /// Attaches `buffer` at `(x, y)`; takes effect on the next commit.
    pub fn attach(
        &mut self,
        surface: SurfaceId,
        buffer: BufferId,
        x: i32,
        y: i32,
    ) -> Result<(), Error> {
        self.session.attach(surface, buffer, x, y)?;
        let wl_surface = proxy(&self.surfaces, surface)?;
        let wl_buffer = proxy(&self.buffers, buffer)?;
        if wl_surface.version() >= OFFSET_SINCE {
            wl_surface.attach(Some(wl_buffer), 0, 0);
            if (x, y) != (0, 0) {
                wl_surface.offset(x, y);
            }
        } else {
            wl_surface.attach(Some(wl_buffer), x, y);
        }
        Ok(())
    }

    /// Attaches null; the next commit unmaps the surface.
    pub fn detach(&mut self, surface: SurfaceId) -> Result<(), Error> {
        self.session.detach(surface)?;
        proxy(&self.surfaces, surface)?.attach(None, 0, 0);
        Ok(())
    }

    /// Marks a rectangle, in buffer pixels, as changed.
    ///
    /// Surfaces older than `damage_buffer` only take surface-coordinate
    /// damage; there the rectangle is scaled down by the pending or current
    /// buffer scale and rounded outwards.
    pub fn damage(&mut self, surface: SurfaceId, rect: Rect) -> Result<(), Error> {
        self.session.damage(surface, rect)?;
        let wl_surface = proxy(&self.surfaces, surface)?;
        if damages_buffer(wl_surface.version()) {
            wl_surface.damage_buffer(rect.x, rect.y, rect.width, rect.height);
        } else {
            let record = self.session.surface(surface)?;
            let scale = record.pending.scale.unwrap_or(record.committed.scale).max(1);
            let x = rect.x.div_euclid(scale);
            let y = rect.y.div_euclid(scale);
            let right = rect.x.saturating_add(rect.width).saturating_add(scale - 1);
            let bottom = rect.y.saturating_add(rect.height).saturating_add(scale - 1);
            let (right, bottom) = (right.div_euclid(scale), bottom.div_euclid(scale));
            wl_surface.damage(x, y, right - x, bottom - y);
        }
        Ok(())
    }

    /// Declares the buffer-to-logical pixel ratio.
    pub fn set_scale(&mut self, surface: SurfaceId, factor: i32) -> Result<(), Error> {
        self.session.set_scale(surface, factor)?;
        let wl_surface = proxy(&self.surfaces, surface)?;
        if wl_surface.version() >= BUFFER_SCALE_SINCE {
            wl_surface.set_buffer_scale(factor);
        } else {
            tracing::warn!(?surface, factor, "wl_surface too old for buffer scale");
        }
        Ok(())
    }

    /// Publishes pending attach, damage, and scale.
    pub fn commit(&mut self, surface: SurfaceId) -> Result<(), Error> {
        self.session.commit(surface)?;
        proxy(&self.surfaces, surface)?.commit();
        Ok(())
    }

    /// Destroys a surface whose toplevel role is already destroyed.
    pub fn destroy_surface(&mut self, surface: SurfaceId) -> Result<(), Error> {
        let frame = self.session.pending_frame(surface)?;
        self.session.destroy_surface(surface)?;
        if let Some(token) = frame {
            self.frames.remove(&token);
        }
        if let Some(wl_surface) = self.surfaces.remove(&surface) {
            wl_surface.destroy();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::damages_buffer;

    #[test]
    fn damage_goes_to_buffer_coordinates_from_version_four() {
        assert!(!damages_buffer(1));
        assert!(!damages_buffer(3));
        assert!(damages_buffer(4));
        assert!(damages_buffer(6));
    }
}
