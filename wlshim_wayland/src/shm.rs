// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `wl_shm` pools and buffers.

use std::fs::File;
use std::os::fd::BorrowedFd;

use rustix::fs::{MemfdFlags, ftruncate, memfd_create};
use wayland_client::protocol::{wl_buffer, wl_shm, wl_shm_pool};
use wayland_client::{Connection, Dispatch, QueueHandle, WEnum};
use wlshim_core::{BufferId, BufferSpec, Error, GlobalId, PixelFormat, PoolId};

use crate::event::Event;
use crate::state::{GlobalProxy, WaylandState, log_rejected_event, proxy};

/// Creates an anonymous, close-on-exec shared-memory file of `size` bytes,
/// ready to back a pool.
pub fn create_shm_file(size: u64) -> std::io::Result<File> {
    let fd = memfd_create(c"wlshim-pool", MemfdFlags::CLOEXEC | MemfdFlags::ALLOW_SEALING)?;
    ftruncate(&fd, size)?;
    Ok(File::from(fd))
}

pub(crate) const fn wl_shm_format(format: PixelFormat) -> wl_shm::Format {
    match format {
        PixelFormat::Argb8888 => wl_shm::Format::Argb8888,
        PixelFormat::Xrgb8888 => wl_shm::Format::Xrgb8888,
        PixelFormat::Abgr8888 => wl_shm::Format::Abgr8888,
        PixelFormat::Xbgr8888 => wl_shm::Format::Xbgr8888,
        PixelFormat::Rgb888 => wl_shm::Format::Rgb888,
        PixelFormat::Bgr888 => wl_shm::Format::Bgr888,
        PixelFormat::Rgb565 => wl_shm::Format::Rgb565,
    }
}

impl Dispatch<wl_shm::WlShm, GlobalId> for WaylandState {
    fn event(
        state: &mut Self,
        _shm: &wl_shm::WlShm,
        event: wl_shm::Event,
        shm: &GlobalId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let wl_shm::Event::Format { format } = event {
            let code = match format {
                WEnum::Value(format) => u32::from(format),
                WEnum::Unknown(code) => code,
            };
            if let Err(err) = state.session.shm_format(*shm, code) {
                log_rejected_event("wl_shm.format", &err);
            }
        }
    }
}

impl Dispatch<wl_shm_pool::WlShmPool, PoolId> for WaylandState {
    fn event(
        _state: &mut Self,
        _pool: &wl_shm_pool::WlShmPool,
        _event: wl_shm_pool::Event,
        _data: &PoolId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
    }
}

impl Dispatch<wl_buffer::WlBuffer, BufferId> for WaylandState {
    fn event(
        state: &mut Self,
        _buffer: &wl_buffer::WlBuffer,
        event: wl_buffer::Event,
        buffer: &BufferId,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
    ) {
        if let wl_buffer::Event::Release = event {
            match state.session.buffer_released(*buffer) {
                Ok(()) => state.events.push(Event::BufferReleased { buffer: *buffer }),
                Err(err) => log_rejected_event("wl_buffer.release", &err),
            }
        }
    }
}

impl WaylandState {
    /// Wraps an already-sized shared-memory file in a pool.
    ///
    /// The caller keeps ownership of `fd`; the compositor maps its own copy.
    pub fn create_pool(
        &mut self,
        shm: GlobalId,
        fd: BorrowedFd<'_>,
        size: i32,
    ) -> Result<PoolId, Error> {
        let id = self.session.create_pool(shm, size)?;
        let GlobalProxy::Shm(wl_shm) = self.global_proxy(shm)? else {
            return Err(Error::StaleHandle { kind: "global" });
        };
        let pool = wl_shm.create_pool(fd, size, &self.qh, id);
        self.pools.insert(id, pool);
        Ok(id)
    }

    /// Grows a pool after the caller has grown the backing file.
    pub fn resize_pool(&mut self, pool: PoolId, size: i32) -> Result<(), Error> {
        self.session.resize_pool(pool, size)?;
        proxy(&self.pools, pool)?.resize(size);
        Ok(())
    }

    /// Destroys a pool whose buffers are all destroyed.
    pub fn destroy_pool(&mut self, pool: PoolId) -> Result<(), Error> {
        self.session.destroy_pool(pool)?;
        if let Some(wl_pool) = self.pools.remove(&pool) {
            wl_pool.destroy();
        }
        Ok(())
    }

    /// Carves a buffer view out of `pool`. No pixels are copied.
    pub fn create_buffer(&mut self, pool: PoolId, spec: BufferSpec) -> Result<BufferId, Error> {
        let id = self.session.create_buffer(pool, spec)?;
        let buffer = proxy(&self.pools, pool)?.create_buffer(
            spec.offset,
            spec.width,
            spec.height,
            spec.stride,
            wl_shm_format(spec.format),
            &self.qh,
            id,
        );
        self.buffers.insert(id, buffer);
        Ok(id)
    }

    /// Destroys a buffer that is not held by the compositor.
    pub fn destroy_buffer(&mut self, buffer: BufferId) -> Result<(), Error> {
        self.session.destroy_buffer(buffer)?;
        if let Some(wl_buffer) = self.buffers.remove(&buffer) {
            wl_buffer.destroy();
        }
        Ok(())
    }
}
