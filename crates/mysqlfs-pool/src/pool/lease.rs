//! Checked-out sessions

use std::fmt;
use std::ops::Deref;

use mysqlfs_core::Session;
use uuid::Uuid;

use super::pool::SessionPool;

/// A session borrowed from the pool
///
/// The slot stays busy until the lease is handed to
/// [`SessionPool::release`] or dropped, whichever comes first.
pub struct PooledSession<'a, S: Session> {
    pool: &'a SessionPool<S>,
    slot: usize,
    generation: u64,
    released: bool,
}

impl<'a, S: Session> PooledSession<'a, S> {
    pub(super) fn new(pool: &'a SessionPool<S>, slot: usize, generation: u64) -> Self {
        Self {
            pool,
            slot,
            generation,
            released: false,
        }
    }

    /// Index of the slot this session lives in
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn session(&self) -> &'a S {
        self.pool.session_at(self.slot)
    }

    /// Flag the session as unusable.
    ///
    /// The slot is still released normally, but `acquire` skips it until a
    /// health check gets an answer from the session again.
    pub fn mark_broken(&self) {
        self.pool.set_broken(self.slot, true);
    }

    /// Turn the lease into a token that keeps the slot busy without
    /// borrowing the pool.
    ///
    /// The slot is only freed again through [`SessionPool::release_token`].
    pub fn detach(mut self) -> SlotToken {
        self.released = true;
        self.pool.mark_detached(self.slot, self.generation);
        SlotToken {
            pool_id: self.pool.id(),
            slot: self.slot,
            generation: self.generation,
        }
    }

    pub(super) fn pool(&self) -> &'a SessionPool<S> {
        self.pool
    }

    pub(super) fn generation(&self) -> u64 {
        self.generation
    }

    pub(super) fn mark_released(&mut self) {
        self.released = true;
    }
}

impl<S: Session> Deref for PooledSession<'_, S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        self.session()
    }
}

impl<S: Session> Drop for PooledSession<'_, S> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.pool.release_slot(self.slot, self.generation) {
            tracing::warn!(slot = self.slot, error = %e, "dropped lease could not be returned");
        }
    }
}

impl<S: Session> fmt::Debug for PooledSession<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledSession")
            .field("pool", &self.pool.id())
            .field("slot", &self.slot)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Detached proof of a checkout
///
/// Tokens outlive the borrow of a [`PooledSession`], e.g. when a filesystem
/// server keeps a session per open file handle. A token is consumed by
/// [`SessionPool::attach`] or [`SessionPool::release_token`], and the pool
/// refuses a token for a slot that has already been attached again.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SlotToken {
    pub(super) pool_id: Uuid,
    pub(super) slot: usize,
    pub(super) generation: u64,
}

impl SlotToken {
    pub fn pool_id(&self) -> Uuid {
        self.pool_id
    }

    pub fn slot(&self) -> usize {
        self.slot
    }
}
