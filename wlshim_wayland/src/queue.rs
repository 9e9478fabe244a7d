// Copyright 2026 the wlshim Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Internal bounded queue used for compositor events.

use std::collections::VecDeque;

/// Bounded FIFO queue that evicts the oldest *evictable* item on overflow.
///
/// Items the caller must see are never evicted; while none of the queued
/// items is evictable the queue grows past its capacity.
#[derive(Debug, Clone)]
pub(crate) struct BoundedQueue<T> {
    items: VecDeque<T>,
    capacity: usize,
    dropped_count: u64,
}

impl<T> BoundedQueue<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            dropped_count: 0,
        }
    }

    /// Pushes `item`, returning whatever was dropped to make room.
    ///
    /// When full, the oldest queued item matching `evictable` is removed. If
    /// there is none, an evictable `item` is dropped itself; any other item is
    /// queued beyond capacity.
    pub(crate) fn push(&mut self, item: T, evictable: impl Fn(&T) -> bool) -> Option<T> {
        if self.items.len() >= self.capacity {
            if let Some(position) = self.items.iter().position(&evictable) {
                self.dropped_count += 1;
                let evicted = self.items.remove(position);
                self.items.push_back(item);
                return evicted;
            }
            if evictable(&item) {
                self.dropped_count += 1;
                return Some(item);
            }
        }
        self.items.push_back(item);
        None
    }

    pub(crate) fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.items.drain(..)
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn dropped_count(&self) -> u64 {
        self.dropped_count
    }
}
