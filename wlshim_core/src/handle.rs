// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational handles and the arena that hands them out.

use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

use crate::error::Error;

/// Marker trait naming the object kind a [`Handle`] refers to.
pub trait Kind {
    /// Human-readable kind name used in diagnostics and errors.
    const NAME: &'static str;
}

macro_rules! kinds {
    ($($(#[$meta:meta])* $kind:ident => $alias:ident, $name:literal;)*) => {
        $(
            #[doc = concat!("Marker for `", $name, "` handles.")]
            #[derive(Debug)]
            pub enum $kind {}

            impl Kind for $kind {
                const NAME: &'static str = $name;
            }

            $(#[$meta])*
            pub type $alias = Handle<$kind>;
        )*
    };
}

kinds! {
    /// A bound registry global (compositor, shm, seat, or wm-base).
    GlobalTag => GlobalId, "global";
    /// A `wl_surface`.
    SurfaceTag => SurfaceId, "surface";
    /// An `xdg_toplevel` role (with its `xdg_surface`).
    ToplevelTag => ToplevelId, "toplevel";
    /// A `wl_shm_pool`.
    PoolTag => PoolId, "pool";
    /// A `wl_buffer` carved from a pool.
    BufferTag => BufferId, "buffer";
    /// A one-shot `wl_callback` requested with `wl_surface.frame`.
    FrameTag => FrameToken, "frame";
    /// A `wl_pointer` obtained from a seat.
    PointerTag => PointerId, "pointer";
}

/// An opaque handle into an arena of objects of kind `K`.
///
/// Contains both a slot index and a generation counter so that stale handles
/// are detected after the object is destroyed and the slot is reused.
pub struct Handle<K> {
    idx: u32,
    generation: u32,
    _kind: PhantomData<fn() -> K>,
}

impl<K> Handle<K> {
    const fn new(idx: u32, generation: u32) -> Self {
        Self {
            idx,
            generation,
            _kind: PhantomData,
        }
    }

    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl<K> Clone for Handle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Handle<K> {}

impl<K> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx && self.generation == other.generation
    }
}

impl<K> Eq for Handle<K> {}

impl<K> Hash for Handle<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.idx.hash(state);
        self.generation.hash(state);
    }
}

impl<K: Kind> fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}@gen{})", K::NAME, self.idx, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage with a free list; freed slots are recycled under a new
/// generation.
#[derive(Debug)]
pub(crate) struct Arena<K, T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    live: usize,
    _kind: PhantomData<fn() -> K>,
}

impl<K: Kind, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kind, T> Arena<K, T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
            _kind: PhantomData,
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> Handle<K> {
        self.live += 1;
        if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.value = Some(value);
            return Handle::new(idx, slot.generation);
        }
        let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Handle::new(idx, 0)
    }

    pub(crate) fn get(&self, handle: Handle<K>) -> Option<&T> {
        self.slots
            .get(handle.idx as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    pub(crate) fn get_mut(&mut self, handle: Handle<K>) -> Option<&mut T> {
        self.slots
            .get_mut(handle.idx as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Like [`Self::get`], but reports a stale handle as an error.
    pub(crate) fn lookup(&self, handle: Handle<K>) -> Result<&T, Error> {
        self.get(handle).ok_or(Error::StaleHandle { kind: K::NAME })
    }

    pub(crate) fn lookup_mut(&mut self, handle: Handle<K>) -> Result<&mut T, Error> {
        self.get_mut(handle).ok_or(Error::StaleHandle { kind: K::NAME })
    }

    pub(crate) fn remove(&mut self, handle: Handle<K>) -> Result<T, Error> {
        let slot = self
            .slots
            .get_mut(handle.idx as usize)
            .filter(|slot| slot.generation == handle.generation)
            .ok_or(Error::StaleHandle { kind: K::NAME })?;
        let value = slot.value.take().ok_or(Error::StaleHandle { kind: K::NAME })?;
        // Bump generation so old handles immediately fail validation.
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.idx);
        self.live -= 1;
        Ok(value)
    }

    pub(crate) fn contains(&self, handle: Handle<K>) -> bool {
        self.get(handle).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Handle<K>, &T)> {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            let idx = u32::try_from(idx).ok()?;
            slot.value
                .as_ref()
                .map(|value| (Handle::new(idx, slot.generation), value))
        })
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(|slot| slot.value.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::{Arena, SurfaceId, SurfaceTag};
    use crate::error::Error;

    #[test]
    fn removed_handle_is_stale_after_slot_reuse() {
        let mut arena: Arena<SurfaceTag, u32> = Arena::new();
        let first = arena.insert(1);
        assert_eq!(arena.remove(first), Ok(1));

        let second = arena.insert(2);
        assert_eq!(second.index(), first.index());
        assert_ne!(second.generation(), first.generation());
        assert_eq!(arena.get(first), None);
        assert_eq!(arena.get(second), Some(&2));
    }

    #[test]
    fn double_remove_reports_stale_handle() {
        let mut arena: Arena<SurfaceTag, ()> = Arena::new();
        let handle = arena.insert(());
        assert!(arena.remove(handle).is_ok());
        assert_eq!(
            arena.remove(handle),
            Err(Error::StaleHandle { kind: "surface" })
        );
        assert_eq!(arena.len(), 0);
    }

    #[test]
    fn iter_skips_free_slots() {
        let mut arena: Arena<SurfaceTag, u32> = Arena::new();
        let a = arena.insert(10);
        let b = arena.insert(20);
        let c = arena.insert(30);
        let _ = arena.remove(b);

        let live: alloc::vec::Vec<(SurfaceId, u32)> =
            arena.iter().map(|(handle, value)| (handle, *value)).collect();
        assert_eq!(live, alloc::vec![(a, 10), (c, 30)]);
        assert!(arena.contains(a));
        assert!(!arena.contains(b));
    }

    #[test]
    fn debug_names_the_kind() {
        let mut arena: Arena<SurfaceTag, ()> = Arena::new();
        let handle = arena.insert(());
        assert_eq!(alloc::format!("{handle:?}"), "surface(0@gen0)");
    }
}
