// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Surfaces and their double-buffered pending/committed state.

use alloc::vec::Vec;

use crate::error::{Error, Violation};
use crate::handle::{BufferId, FrameToken, GlobalId, SurfaceId, ToplevelId};
use crate::registry::GlobalKind;
use crate::session::Session;

/// A damaged rectangle in buffer pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width, never negative.
    pub width: i32,
    /// Height, never negative.
    pub height: i32,
}

impl Rect {
    /// Creates a rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// What the next commit does with the surface's buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Attachment {
    /// Attach `buffer` with its top-left corner moved by `(x, y)`.
    Buffer {
        /// Buffer to show.
        buffer: BufferId,
        /// Horizontal offset.
        x: i32,
        /// Vertical offset.
        y: i32,
    },
    /// Attach null, unmapping the surface.
    Detach,
}

/// Requests accumulated since the last commit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingState {
    /// Latest attach, if any.
    pub attachment: Option<Attachment>,
    /// All damage since the last commit, in call order.
    pub damage: Vec<Rect>,
    /// Latest buffer scale, if any.
    pub scale: Option<i32>,
}

/// State published by the last commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommittedState {
    /// Buffer on screen, if any.
    pub buffer: Option<BufferId>,
    /// Buffer-to-logical pixel ratio.
    pub scale: i32,
    /// Damage carried by the last commit.
    pub damage: Vec<Rect>,
    /// Number of commits so far.
    pub commits: u64,
}

impl Default for CommittedState {
    fn default() -> Self {
        Self {
            buffer: None,
            scale: 1,
            damage: Vec::new(),
            commits: 0,
        }
    }
}

/// A `wl_surface` and its role bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    /// Compositor the surface was created from.
    pub compositor: GlobalId,
    /// Toplevel role hosted by this surface. Stays set after the role is
    /// destroyed: a surface gets at most one role in its lifetime.
    pub role: Option<ToplevelId>,
    /// Requests waiting for the next commit.
    pub pending: PendingState,
    /// State published by the last commit.
    pub committed: CommittedState,
    /// Outstanding frame callback.
    pub frame: Option<FrameToken>,
}

impl Session {
    /// Creates a surface from a compositor global.
    pub fn create_surface(&mut self, compositor: GlobalId) -> Result<SurfaceId, Error> {
        self.expect_global(compositor, GlobalKind::Compositor)?;
        let id = self.surfaces.insert(Surface {
            compositor,
            role: None,
            pending: PendingState::default(),
            committed: CommittedState::default(),
            frame: None,
        });
        tracing::debug!(?id, "surface created");
        Ok(id)
    }

    /// Returns the surface behind `id`.
    pub fn surface(&self, id: SurfaceId) -> Result<&Surface, Error> {
        self.surfaces.lookup(id)
    }

    /// Queues `buffer` for the next commit at offset `(x, y)`.
    ///
    /// A buffer the compositor still holds cannot be attached again until it
    /// is released.
    pub fn attach(
        &mut self,
        surface: SurfaceId,
        buffer: BufferId,
        x: i32,
        y: i32,
    ) -> Result<(), Error> {
        self.surfaces.lookup(surface)?;
        if self.buffers.lookup(buffer)?.in_flight {
            return Err(Violation::BufferInFlight.into());
        }
        self.surfaces.lookup_mut(surface)?.pending.attachment =
            Some(Attachment::Buffer { buffer, x, y });
        Ok(())
    }

    /// Queues a null attach for the next commit.
    pub fn detach(&mut self, surface: SurfaceId) -> Result<(), Error> {
        self.surfaces.lookup_mut(surface)?.pending.attachment = Some(Attachment::Detach);
        Ok(())
    }

    /// Adds a damaged rectangle in buffer pixels; damage accumulates until
    /// the next commit.
    pub fn damage(&mut self, surface: SurfaceId, rect: Rect) -> Result<(), Error> {
        let record = self.surfaces.lookup_mut(surface)?;
        if rect.width < 0 {
            return Err(Error::InvalidArgument {
                name: "width",
                value: rect.width,
            });
        }
        if rect.height < 0 {
            return Err(Error::InvalidArgument {
                name: "height",
                value: rect.height,
            });
        }
        record.pending.damage.push(rect);
        Ok(())
    }

    /// Queues a buffer scale; must be a positive integer.
    pub fn set_scale(&mut self, surface: SurfaceId, factor: i32) -> Result<(), Error> {
        let record = self.surfaces.lookup_mut(surface)?;
        if factor <= 0 {
            return Err(Error::InvalidArgument {
                name: "scale",
                value: factor,
            });
        }
        record.pending.scale = Some(factor);
        Ok(())
    }

    /// Atomically publishes the pending attach, damage, and scale.
    ///
    /// On a toplevel, a commit that would show a buffer is rejected until the
    /// first configure has been acknowledged. A bufferless commit is always
    /// allowed; it is how a new toplevel asks for its first configure.
    ///
    /// The attached buffer becomes in flight. A buffer it replaces stays in
    /// flight until the compositor releases it. Committing a buffer that went
    /// in flight after it was attached is rejected and changes nothing.
    pub fn commit(&mut self, surface: SurfaceId) -> Result<(), Error> {
        let record = self.surfaces.lookup(surface)?;
        let next_buffer = match record.pending.attachment {
            Some(Attachment::Buffer { buffer, .. }) => Some(buffer),
            Some(Attachment::Detach) => None,
            None => record.committed.buffer,
        };

        if let Some(Attachment::Buffer { buffer, .. }) = record.pending.attachment {
            if self.buffers.lookup(buffer)?.in_flight {
                tracing::warn!(?surface, ?buffer, "buffer committed while still in flight");
                return Err(Violation::BufferInFlight.into());
            }
        }

        if let Some(role) = record.role {
            let toplevel = self.toplevels.lookup(role)?;
            if next_buffer.is_some() && !toplevel.is_closed() && !toplevel.acknowledged_once {
                tracing::warn!(?surface, "buffer commit before first ack_configure");
                return Err(Violation::CommitBeforeAck.into());
            }
        }

        if let Some(Attachment::Buffer { buffer, .. }) = record.pending.attachment {
            let committed = self.buffers.lookup_mut(buffer)?;
            committed.in_flight = true;
            committed.committed_to = Some(surface);
        }

        let record = self.surfaces.lookup_mut(surface)?;
        let pending = core::mem::take(&mut record.pending);
        record.committed.buffer = next_buffer;
        record.committed.damage = pending.damage;
        if let Some(scale) = pending.scale {
            record.committed.scale = scale;
        }
        record.committed.commits += 1;
        Ok(())
    }

    /// Destroys a surface. Any toplevel role must be destroyed first; an
    /// outstanding frame callback is dropped with the surface, and buffers it
    /// was showing are no longer in flight.
    pub fn destroy_surface(&mut self, surface: SurfaceId) -> Result<(), Error> {
        let record = self.surfaces.lookup(surface)?;
        if let Some(role) = record.role {
            if self.toplevels.get(role).is_some_and(|toplevel| !toplevel.is_closed()) {
                tracing::warn!(?surface, "surface destroyed before its toplevel");
                return Err(Violation::LiveChildren {
                    parent: "surface",
                    child: "toplevel",
                    count: 1,
                }
                .into());
            }
        }

        let record = self.surfaces.remove(surface)?;
        if let Some(role) = record.role {
            let _ = self.toplevels.remove(role);
        }
        if let Some(frame) = record.frame {
            let _ = self.frames.remove(frame);
        }
        // The compositor drops its hold on whatever the surface showed.
        for buffer in self.buffers.values_mut() {
            if buffer.committed_to == Some(surface) {
                buffer.in_flight = false;
                buffer.committed_to = None;
            }
        }
        tracing::debug!(id = ?surface, "surface destroyed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Attachment, Rect};
    use crate::error::{Error, Violation};
    use crate::format::PixelFormat;
    use crate::handle::{BufferId, GlobalId, SurfaceId};
    use crate::registry::{Advertisement, GlobalKind};
    use crate::session::Session;
    use crate::shm::BufferSpec;
    use alloc::string::String;
    use alloc::vec;

    struct Fixture {
        session: Session,
        compositor: GlobalId,
        surface: SurfaceId,
        front: BufferId,
        back: BufferId,
    }

    fn fixture() -> Fixture {
        let mut session = Session::new();
        for (name, interface) in [(1, "wl_compositor"), (2, "wl_shm")] {
            session.advertise(Advertisement {
                name,
                interface: String::from(interface),
                version: 1,
            });
        }
        let compositor = session.bind_global(1, GlobalKind::Compositor, 1).unwrap();
        let shm = session.bind_global(2, GlobalKind::Shm, 1).unwrap();
        let surface = session.create_surface(compositor).unwrap();
        let pool = session.create_pool(shm, 8192).unwrap();
        let front = session
            .create_buffer(pool, BufferSpec::packed(0, 32, 32, PixelFormat::Xrgb8888))
            .unwrap();
        let back = session
            .create_buffer(pool, BufferSpec::packed(4096, 32, 32, PixelFormat::Xrgb8888))
            .unwrap();
        Fixture {
            session,
            compositor,
            surface,
            front,
            back,
        }
    }

    #[test]
    fn damage_accumulates_until_commit() {
        let Fixture {
            mut session,
            surface,
            ..
        } = fixture();
        session.damage(surface, Rect::new(0, 0, 4, 4)).unwrap();
        session.damage(surface, Rect::new(8, 8, 2, 2)).unwrap();
        assert_eq!(session.surface(surface).unwrap().pending.damage.len(), 2);

        session.commit(surface).unwrap();
        let record = session.surface(surface).unwrap();
        assert_eq!(
            record.committed.damage,
            vec![Rect::new(0, 0, 4, 4), Rect::new(8, 8, 2, 2)]
        );
        assert!(record.pending.damage.is_empty());
        assert_eq!(record.committed.commits, 1);
    }

    #[test]
    fn negative_damage_and_scale_are_invalid() {
        let Fixture {
            mut session,
            surface,
            ..
        } = fixture();
        assert_eq!(
            session.damage(surface, Rect::new(0, 0, -1, 4)),
            Err(Error::InvalidArgument {
                name: "width",
                value: -1
            })
        );
        assert!(session.set_scale(surface, 0).is_err());
        assert!(session.set_scale(surface, -2).is_err());
        session.set_scale(surface, 2).unwrap();
        session.commit(surface).unwrap();
        assert_eq!(session.surface(surface).unwrap().committed.scale, 2);
    }

    #[test]
    fn attach_takes_effect_on_commit() {
        let Fixture {
            mut session,
            surface,
            front,
            ..
        } = fixture();
        session.attach(surface, front, 0, 0).unwrap();
        assert_eq!(session.surface(surface).unwrap().committed.buffer, None);
        assert!(!session.buffer(front).unwrap().in_flight);

        session.commit(surface).unwrap();
        assert_eq!(session.surface(surface).unwrap().committed.buffer, Some(front));
        assert!(session.buffer(front).unwrap().in_flight);
    }

    #[test]
    fn in_flight_buffer_cannot_be_reattached_or_destroyed() {
        let Fixture {
            mut session,
            surface,
            front,
            back,
            ..
        } = fixture();
        session.attach(surface, front, 0, 0).unwrap();
        session.commit(surface).unwrap();

        assert_eq!(
            session.attach(surface, front, 0, 0),
            Err(Error::OrderingViolation(Violation::BufferInFlight))
        );
        assert_eq!(
            session.destroy_buffer(front),
            Err(Error::OrderingViolation(Violation::BufferInFlight))
        );

        // Swap to the back buffer; the front one stays held until released.
        session.attach(surface, back, 0, 0).unwrap();
        session.commit(surface).unwrap();
        assert!(session.buffer(front).unwrap().in_flight);

        session.buffer_released(front).unwrap();
        session.attach(surface, front, 0, 0).unwrap();
        session.commit(surface).unwrap();
        assert_eq!(session.surface(surface).unwrap().committed.buffer, Some(front));
    }

    #[test]
    fn buffer_attached_to_two_surfaces_commits_once() {
        let Fixture {
            mut session,
            compositor,
            surface,
            front,
            ..
        } = fixture();
        let other = session.create_surface(compositor).unwrap();
        session.attach(surface, front, 0, 0).unwrap();
        session.attach(other, front, 0, 0).unwrap();
        session.commit(surface).unwrap();

        assert_eq!(
            session.commit(other),
            Err(Error::OrderingViolation(Violation::BufferInFlight))
        );
        let record = session.surface(other).unwrap();
        assert_eq!(record.committed.buffer, None);
        assert_eq!(record.committed.commits, 0);
        assert_eq!(
            record.pending.attachment,
            Some(Attachment::Buffer {
                buffer: front,
                x: 0,
                y: 0
            })
        );
        assert_eq!(session.buffer(front).unwrap().committed_to, Some(surface));
    }

    #[test]
    fn detach_clears_the_committed_buffer() {
        let Fixture {
            mut session,
            surface,
            front,
            ..
        } = fixture();
        session.attach(surface, front, 0, 0).unwrap();
        session.commit(surface).unwrap();
        session.detach(surface).unwrap();
        assert_eq!(
            session.surface(surface).unwrap().pending.attachment,
            Some(Attachment::Detach)
        );
        session.commit(surface).unwrap();
        assert_eq!(session.surface(surface).unwrap().committed.buffer, None);
    }

    #[test]
    fn committing_a_destroyed_buffer_reports_stale_handle() {
        let Fixture {
            mut session,
            surface,
            front,
            ..
        } = fixture();
        session.attach(surface, front, 0, 0).unwrap();
        session.destroy_buffer(front).unwrap();
        assert_eq!(
            session.commit(surface),
            Err(Error::StaleHandle { kind: "buffer" })
        );
    }

    #[test]
    fn surfaces_are_independent() {
        let Fixture {
            mut session,
            compositor,
            surface,
            ..
        } = fixture();
        let other = session.create_surface(compositor).unwrap();
        session.damage(other, Rect::new(0, 0, 1, 1)).unwrap();
        session.destroy_surface(other).unwrap();

        assert!(session.surface(surface).unwrap().pending.damage.is_empty());
        assert!(session.surface(other).is_err());
        assert_eq!(
            session.destroy_surface(other),
            Err(Error::StaleHandle { kind: "surface" })
        );
    }

    #[test]
    fn destroying_a_surface_returns_its_buffers() {
        let Fixture {
            mut session,
            surface,
            front,
            ..
        } = fixture();
        session.attach(surface, front, 0, 0).unwrap();
        session.commit(surface).unwrap();
        session.destroy_surface(surface).unwrap();

        assert!(!session.buffer(front).unwrap().in_flight);
        session.destroy_buffer(front).unwrap();
    }
}
