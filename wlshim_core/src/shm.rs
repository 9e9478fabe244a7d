// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared-memory pools and the buffers carved from them.
//!
//! The pool is a dumb allocator over caller-provided memory: it validates
//! geometry and tracks which buffers the compositor still holds, but never
//! copies, caches, or recycles pixels. Double-buffering is the caller's job.

use core::ops::Range;

use crate::error::{Error, OutOfBounds, Violation};
use crate::format::PixelFormat;
use crate::handle::{BufferId, GlobalId, PoolId, SurfaceId};
use crate::registry::GlobalKind;
use crate::session::Session;

/// A shared-memory region of `size` bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pool {
    /// The `wl_shm` global the pool was created from.
    pub shm: GlobalId,
    /// Current size in bytes.
    pub size: i32,
}

/// Placement and layout of a buffer inside its pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferSpec {
    /// Byte offset of the first row.
    pub offset: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
    /// Bytes between the starts of consecutive rows.
    pub stride: i32,
    /// Pixel layout.
    pub format: PixelFormat,
}

impl BufferSpec {
    /// A tightly packed buffer at `offset` (stride = width * bytes per pixel).
    #[must_use]
    pub const fn packed(offset: i32, width: i32, height: i32, format: PixelFormat) -> Self {
        Self {
            offset,
            width,
            height,
            stride: width.saturating_mul(format.bytes_per_pixel()),
            format,
        }
    }

    /// Number of bytes spanned: `stride * height`.
    #[must_use]
    pub const fn byte_len(&self) -> i64 {
        self.stride as i64 * self.height as i64
    }

    /// Byte range of the pool the buffer covers.
    #[must_use]
    pub const fn extent(&self) -> Range<i64> {
        self.offset as i64..self.offset as i64 + self.byte_len()
    }

    fn validate(&self, pool_size: i32) -> Result<(), Error> {
        for (name, value) in [
            ("offset", self.offset),
            ("width", self.width),
            ("height", self.height),
            ("stride", self.stride),
        ] {
            if value < 0 || (value == 0 && name != "offset") {
                return Err(Error::InvalidArgument { name, value });
            }
        }
        let min_stride = i64::from(self.width) * i64::from(self.format.bytes_per_pixel());
        if i64::from(self.stride) < min_stride {
            return Err(OutOfBounds::StrideTooSmall {
                stride: self.stride,
                min_stride,
            }
            .into());
        }
        let end = self.extent().end;
        if end > i64::from(pool_size) {
            return Err(OutOfBounds::ExceedsPool { end, pool_size }.into());
        }
        Ok(())
    }
}

/// A buffer view over a pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Buffer {
    /// The pool the view is carved from.
    pub pool: PoolId,
    /// Geometry inside the pool.
    pub spec: BufferSpec,
    /// Surface the buffer was last committed to.
    pub committed_to: Option<SurfaceId>,
    /// Committed and not yet released by the compositor.
    pub in_flight: bool,
}

impl Session {
    /// Validates and records a pool over an already-sized shared-memory file.
    pub fn create_pool(&mut self, shm: GlobalId, size: i32) -> Result<PoolId, Error> {
        self.expect_global(shm, GlobalKind::Shm)?;
        if size <= 0 {
            return Err(Error::InvalidSize { size });
        }
        let id = self.pools.insert(Pool { shm, size });
        tracing::debug!(?id, size, "pool created");
        Ok(id)
    }

    /// Grows a pool. Pools can never shrink.
    pub fn resize_pool(&mut self, pool: PoolId, size: i32) -> Result<(), Error> {
        let record = self.pools.lookup_mut(pool)?;
        if size < record.size {
            return Err(Error::InvalidSize { size });
        }
        record.size = size;
        Ok(())
    }

    /// Returns the pool behind `id`.
    pub fn pool(&self, id: PoolId) -> Result<&Pool, Error> {
        self.pools.lookup(id)
    }

    /// Releases the pool's claim on its memory. Every buffer carved from it
    /// must be destroyed first.
    pub fn destroy_pool(&mut self, pool: PoolId) -> Result<(), Error> {
        self.pools.lookup(pool)?;
        let count = self
            .buffers
            .iter()
            .filter(|(_, buffer)| buffer.pool == pool)
            .count();
        if count > 0 {
            return Err(Violation::LiveChildren {
                parent: "pool",
                child: "buffer",
                count,
            }
            .into());
        }
        self.pools.remove(pool)?;
        tracing::debug!(id = ?pool, "pool destroyed");
        Ok(())
    }

    /// Carves a buffer view out of `pool`.
    ///
    /// Fails with [`OutOfBounds`] when the stride cannot hold a row or the
    /// view runs past the end of the pool.
    pub fn create_buffer(&mut self, pool: PoolId, spec: BufferSpec) -> Result<BufferId, Error> {
        spec.validate(self.pools.lookup(pool)?.size)?;
        let id = self.buffers.insert(Buffer {
            pool,
            spec,
            committed_to: None,
            in_flight: false,
        });
        tracing::debug!(?id, ?pool, ?spec, "buffer created");
        Ok(id)
    }

    /// Returns the buffer behind `id`.
    pub fn buffer(&self, id: BufferId) -> Result<&Buffer, Error> {
        self.buffers.lookup(id)
    }

    /// Records `wl_buffer.release`: the compositor no longer reads the buffer.
    pub fn buffer_released(&mut self, buffer: BufferId) -> Result<(), Error> {
        self.buffers.lookup_mut(buffer)?.in_flight = false;
        Ok(())
    }

    /// Destroys a buffer that was never committed or has been released.
    pub fn destroy_buffer(&mut self, buffer: BufferId) -> Result<(), Error> {
        if self.buffers.lookup(buffer)?.in_flight {
            return Err(Violation::BufferInFlight.into());
        }
        self.buffers.remove(buffer)?;
        tracing::debug!(id = ?buffer, "buffer destroyed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::BufferSpec;
    use crate::error::{Error, OutOfBounds, Violation};
    use crate::format::PixelFormat;
    use crate::handle::GlobalId;
    use crate::registry::{Advertisement, GlobalKind};
    use crate::session::Session;
    use alloc::string::String;

    fn session_with_shm() -> (Session, GlobalId) {
        let mut session = Session::new();
        session.advertise(Advertisement {
            name: 1,
            interface: String::from("wl_shm"),
            version: 1,
        });
        let shm = session.bind_global(1, GlobalKind::Shm, 1).unwrap();
        (session, shm)
    }

    #[test]
    fn non_positive_pool_size_is_invalid() {
        let (mut session, shm) = session_with_shm();
        assert_eq!(session.create_pool(shm, 0), Err(Error::InvalidSize { size: 0 }));
        assert_eq!(session.create_pool(shm, -4), Err(Error::InvalidSize { size: -4 }));
    }

    #[test]
    fn valid_geometry_spans_offset_to_stride_times_height() {
        let (mut session, shm) = session_with_shm();
        let pool = session.create_pool(shm, 8192).unwrap();

        let cases = [
            (0, 32, 32, 128, PixelFormat::Xrgb8888),
            (4096, 32, 32, 128, PixelFormat::Argb8888),
            (100, 10, 7, 40, PixelFormat::Rgb888),
            (0, 64, 64, 128, PixelFormat::Rgb565),
        ];
        for (offset, width, height, stride, format) in cases {
            let spec = BufferSpec {
                offset,
                width,
                height,
                stride,
                format,
            };
            let buffer = session.create_buffer(pool, spec).unwrap();
            let extent = session.buffer(buffer).unwrap().spec.extent();
            assert_eq!(
                extent,
                i64::from(offset)..i64::from(offset) + i64::from(stride) * i64::from(height)
            );
        }
    }

    #[test]
    fn buffer_filling_the_pool_exactly_is_accepted() {
        let (mut session, shm) = session_with_shm();
        let pool = session.create_pool(shm, 4096).unwrap();
        let spec = BufferSpec::packed(0, 32, 32, PixelFormat::Xrgb8888);
        assert_eq!(spec.extent(), 0..4096);
        assert!(session.create_buffer(pool, spec).is_ok());
    }

    #[test]
    fn narrow_stride_is_out_of_bounds() {
        let (mut session, shm) = session_with_shm();
        let pool = session.create_pool(shm, 4096).unwrap();

        for (width, stride, format) in [
            (32, 127, PixelFormat::Xrgb8888),
            (10, 29, PixelFormat::Rgb888),
            (8, 15, PixelFormat::Rgb565),
        ] {
            let spec = BufferSpec {
                offset: 0,
                width,
                height: 1,
                stride,
                format,
            };
            assert!(matches!(
                session.create_buffer(pool, spec),
                Err(Error::OutOfBounds(OutOfBounds::StrideTooSmall { .. }))
            ));
        }
    }

    #[test]
    fn buffer_past_pool_end_is_out_of_bounds() {
        let (mut session, shm) = session_with_shm();
        let pool = session.create_pool(shm, 4096).unwrap();
        let spec = BufferSpec::packed(4, 32, 32, PixelFormat::Xrgb8888);
        assert_eq!(
            session.create_buffer(pool, spec),
            Err(Error::OutOfBounds(OutOfBounds::ExceedsPool {
                end: 4100,
                pool_size: 4096,
            }))
        );
    }

    #[test]
    fn negative_geometry_is_invalid() {
        let (mut session, shm) = session_with_shm();
        let pool = session.create_pool(shm, 4096).unwrap();
        let spec = BufferSpec {
            offset: 0,
            width: -1,
            height: 4,
            stride: 16,
            format: PixelFormat::Argb8888,
        };
        assert_eq!(
            session.create_buffer(pool, spec),
            Err(Error::InvalidArgument {
                name: "width",
                value: -1
            })
        );
    }

    #[test]
    fn resize_grows_and_refuses_to_shrink() {
        let (mut session, shm) = session_with_shm();
        let pool = session.create_pool(shm, 4096).unwrap();
        let spec = BufferSpec::packed(4096, 32, 32, PixelFormat::Xrgb8888);

        assert!(session.create_buffer(pool, spec).is_err());
        session.resize_pool(pool, 8192).unwrap();
        assert!(session.create_buffer(pool, spec).is_ok());
        assert_eq!(
            session.resize_pool(pool, 4096),
            Err(Error::InvalidSize { size: 4096 })
        );
    }

    #[test]
    fn pool_outlives_its_buffers() {
        let (mut session, shm) = session_with_shm();
        let pool = session.create_pool(shm, 4096).unwrap();
        let buffer = session
            .create_buffer(pool, BufferSpec::packed(0, 16, 16, PixelFormat::Argb8888))
            .unwrap();

        assert_eq!(
            session.destroy_pool(pool),
            Err(Error::OrderingViolation(Violation::LiveChildren {
                parent: "pool",
                child: "buffer",
                count: 1,
            }))
        );
        session.destroy_buffer(buffer).unwrap();
        session.destroy_pool(pool).unwrap();
        assert!(session.pool(pool).is_err());
    }

    #[test]
    fn pool_requires_an_shm_global() {
        let mut session = Session::new();
        session.advertise(Advertisement {
            name: 1,
            interface: String::from("wl_compositor"),
            version: 6,
        });
        let compositor = session.bind_global(1, GlobalKind::Compositor, 6).unwrap();
        assert!(matches!(
            session.create_pool(compositor, 4096),
            Err(Error::ProtocolMismatch(_))
        ));
    }
}
