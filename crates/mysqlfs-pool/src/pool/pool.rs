//! Session pool implementation

use mysqlfs_core::{Backend, Error, MisuseKind, Result, Session, SessionOption};
use parking_lot::Mutex;
use uuid::Uuid;

use super::config::PoolConfig;
use super::lease::{PooledSession, SlotToken};
use super::stats::{PoolStats, ShutdownReport, SlotState};
use crate::health::{HealthCheckConfig, HealthStatus, SlotCheck, ping_session};

/// One pool-owned backend session and its fixed index
struct Slot<S> {
    id: usize,
    session: S,
}

/// Mutable per-slot bookkeeping, only touched under the pool lock
#[derive(Debug, Clone, Copy, Default)]
struct SlotFlags {
    busy: bool,
    broken: bool,
    /// Busy slot held through a [`SlotToken`] rather than a lease
    detached: bool,
    /// Bumped on every checkout so stale leases and tokens can be detected
    generation: u64,
}

impl SlotFlags {
    fn state(&self) -> SlotState {
        if self.busy {
            SlotState::Busy
        } else if self.broken {
            SlotState::Broken
        } else {
            SlotState::Free
        }
    }

    fn claim(&mut self) -> u64 {
        self.busy = true;
        self.detached = false;
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }
}

/// A fixed set of backend sessions shared by many worker threads
///
/// Every session is opened by [`SessionPool::init`] and closed by
/// [`SessionPool::shutdown`]; the pool never grows, shrinks or replaces a
/// session in between. A single mutex guards the busy state of all slots.
///
/// Acquisition never waits: when every slot is busy, [`SessionPool::acquire`]
/// returns `None` immediately and the caller decides whether to retry.
pub struct SessionPool<S: Session> {
    id: Uuid,
    slots: Box<[Slot<S>]>,
    flags: Mutex<Box<[SlotFlags]>>,
}

impl<S: Session> SessionPool<S> {
    /// Open `connection_count` sessions and validate the backend.
    ///
    /// Sessions are opened in slot order. Auto-reconnect is switched on for
    /// each one once it is live. After all slots are connected, the server
    /// version reported by slot 0 must be at least the configured minimum.
    ///
    /// Any failure closes the sessions opened so far and returns an error;
    /// no partially built pool is ever returned.
    #[tracing::instrument(skip_all, fields(backend = backend.name(), connection_count = config.connection_count()))]
    pub async fn init<B>(config: &PoolConfig, backend: &B) -> Result<Self>
    where
        B: Backend<Session = S>,
    {
        let capacity = config.capacity()?;
        let id = Uuid::new_v4();

        let mut flags = Vec::new();
        flags.try_reserve_exact(capacity).map_err(|e| {
            Error::Allocation(format!("slot table for {} slots: {}", capacity, e))
        })?;
        flags.resize(capacity, SlotFlags::default());

        let mut slots: Vec<Slot<S>> = Vec::new();
        slots.try_reserve_exact(capacity).map_err(|e| {
            Error::Allocation(format!("session table for {} slots: {}", capacity, e))
        })?;

        for index in 0..capacity {
            let session = match backend.connect(config.backend()).await {
                Ok(session) => session,
                Err(e) => {
                    tracing::error!(slot = index, error = %e, "failed to establish backend session");
                    close_all(slots).await;
                    return Err(Error::Connection {
                        slot: index,
                        message: backend_message(e),
                    });
                }
            };

            // Reconnect only has an effect once the session is live.
            if let Err(e) = session.set_option(SessionOption::AutoReconnect(true)) {
                tracing::error!(slot = index, error = %e, "failed to enable auto-reconnect");
                slots.push(Slot { id: index, session });
                close_all(slots).await;
                return Err(Error::Connection {
                    slot: index,
                    message: backend_message(e),
                });
            }

            tracing::debug!(slot = index, "backend session established");
            slots.push(Slot { id: index, session });
        }

        match slots.first() {
            Some(first) => {
                let found = first.session.server_version();
                let required = config.minimum_server_version();
                if found < required {
                    tracing::error!(
                        server = %first.session.server_info(),
                        %found,
                        %required,
                        "backend server version is too old"
                    );
                    close_all(slots).await;
                    return Err(Error::Version { found, required });
                }
            }
            None => {
                tracing::warn!("session pool created with zero slots, acquire will never succeed");
            }
        }

        tracing::info!(pool = %id, capacity, "session pool ready");
        Ok(Self {
            id,
            slots: slots.into_boxed_slice(),
            flags: Mutex::new(flags.into_boxed_slice()),
        })
    }

    /// Unique identifier of this pool, shown in logs and carried by tokens
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Check out the lowest-indexed free slot.
    ///
    /// Returns `None` without blocking when no slot is free; a full pool is
    /// an expected condition under load, not an error. Slots flagged broken
    /// and sessions a caller closed are skipped.
    pub fn acquire(&self) -> Option<PooledSession<'_, S>> {
        let claimed = {
            let mut flags = self.flags.lock();
            flags
                .iter_mut()
                .enumerate()
                .find(|(index, slot)| {
                    !slot.busy && !slot.broken && !self.slots[*index].session.is_closed()
                })
                .map(|(index, slot)| (index, slot.claim()))
        };

        match claimed {
            Some((slot, generation)) => {
                tracing::debug!(pool = %self.id, slot, "acquire");
                Some(PooledSession::new(self, slot, generation))
            }
            None => {
                tracing::debug!(pool = %self.id, slot = -1, "acquire");
                self.dump();
                None
            }
        }
    }

    /// Return a lease to the pool.
    ///
    /// Fails with [`MisuseKind::ForeignPool`] if the lease came from another
    /// pool; that lease then goes back to its own pool when it is dropped.
    pub fn release(&self, mut lease: PooledSession<'_, S>) -> Result<()> {
        if !std::ptr::eq(lease.pool(), self) {
            tracing::error!(pool = %self.id, slot = lease.slot(), "release of a lease from another pool");
            return Err(MisuseKind::ForeignPool.into());
        }

        lease.mark_released();
        self.release_slot(lease.slot(), lease.generation())
    }

    /// Bring a detached token back as a lease without freeing the slot.
    ///
    /// The slot is held by the returned lease from then on, so a second
    /// token for the same checkout is rejected.
    pub fn attach(&self, token: SlotToken) -> Result<PooledSession<'_, S>> {
        self.redeem_token(&token, |entry| entry.detached = false)?;
        tracing::debug!(pool = %self.id, slot = token.slot, "attach");
        Ok(PooledSession::new(self, token.slot, token.generation))
    }

    /// Free the slot held by a detached token.
    pub fn release_token(&self, token: SlotToken) -> Result<()> {
        tracing::debug!(pool = %self.id, slot = token.slot, "release");
        self.redeem_token(&token, |entry| {
            entry.busy = false;
            entry.detached = false;
        })?;
        self.flag_if_closed(token.slot);
        Ok(())
    }

    /// Validate `token` and apply `redeem` to its slot under one lock
    fn redeem_token(&self, token: &SlotToken, redeem: impl FnOnce(&mut SlotFlags)) -> Result<()> {
        if token.pool_id != self.id {
            tracing::error!(pool = %self.id, token_pool = %token.pool_id, "token from another pool");
            return Err(MisuseKind::ForeignPool.into());
        }

        let mut flags = self.flags.lock();
        let checked = check_checkout(&flags, token.slot, token.generation).and_then(|()| {
            if flags[token.slot].detached {
                Ok(())
            } else {
                Err(MisuseKind::AlreadyAttached { slot: token.slot }.into())
            }
        });
        if let Err(e) = checked {
            tracing::error!(pool = %self.id, slot = token.slot, error = %e, "invalid token");
            return Err(e);
        }
        redeem(&mut flags[token.slot]);
        Ok(())
    }

    /// Record that the current checkout of `slot` is now held by a token
    pub(super) fn mark_detached(&self, slot: usize, generation: u64) {
        let mut flags = self.flags.lock();
        if let Some(entry) = flags.get_mut(slot) {
            if entry.busy && entry.generation == generation {
                entry.detached = true;
            }
        }
    }

    /// Clear the busy flag of `slot` if `generation` is its current checkout.
    pub(super) fn release_slot(&self, slot: usize, generation: u64) -> Result<()> {
        tracing::debug!(pool = %self.id, slot, "release");

        {
            let mut flags = self.flags.lock();
            check_checkout(&flags, slot, generation).inspect_err(|e| {
                tracing::error!(pool = %self.id, slot, error = %e, "invalid release");
            })?;
            flags[slot].busy = false;
            flags[slot].detached = false;
        }
        self.flag_if_closed(slot);
        Ok(())
    }

    /// Flag `slot` broken if its session was closed behind the pool's back.
    ///
    /// The pool never reopens a session, so such a slot stays out of
    /// rotation until shutdown.
    fn flag_if_closed(&self, slot: usize) {
        if self.slots[slot].session.is_closed() {
            tracing::warn!(pool = %self.id, slot, "session returned closed, taking slot out of rotation");
            self.set_broken(slot, true);
        }
    }

    pub(super) fn session_at(&self, slot: usize) -> &S {
        &self.slots[slot].session
    }

    pub(super) fn set_broken(&self, slot: usize, broken: bool) {
        let mut flags = self.flags.lock();
        if let Some(entry) = flags.get_mut(slot) {
            if entry.broken != broken {
                tracing::info!(pool = %self.id, slot, broken, "slot health changed");
            }
            entry.broken = broken;
        }
    }

    /// Log the state of every slot at debug level
    pub fn dump(&self) {
        let flags = self.flags.lock();
        for (slot, entry) in self.slots.iter().zip(flags.iter()) {
            tracing::debug!(
                pool = %self.id,
                slot = slot.id,
                busy = entry.busy,
                broken = entry.broken,
                "pool slot"
            );
        }
    }

    /// Current state of every slot, by index
    pub fn slot_states(&self) -> Vec<SlotState> {
        self.flags.lock().iter().map(SlotFlags::state).collect()
    }

    pub fn stats(&self) -> PoolStats {
        let flags = self.flags.lock();
        let busy = flags.iter().filter(|slot| slot.busy).count();
        let broken = flags.iter().filter(|slot| !slot.busy && slot.broken).count();
        PoolStats::new(flags.len(), busy, broken)
    }

    /// Ping every free slot and update its broken flag.
    ///
    /// Each slot is checked out for the duration of its ping, so callers
    /// racing with the check simply see it as busy. Slots already checked out
    /// are skipped.
    pub async fn check_health(&self, config: &HealthCheckConfig) -> Vec<SlotCheck> {
        let mut checks = Vec::with_capacity(self.capacity());

        for slot in 0..self.capacity() {
            let claimed = {
                let mut flags = self.flags.lock();
                let entry = &mut flags[slot];
                (!entry.busy).then(|| entry.claim())
            };
            let Some(generation) = claimed else {
                checks.push(SlotCheck::Skipped { slot });
                continue;
            };

            let lease = PooledSession::new(self, slot, generation);
            let check = match ping_session(lease.session(), config.ping_timeout).await {
                Ok(latency) => {
                    let status = HealthStatus::from_latency_with_thresholds(latency, &config.thresholds);
                    if !status.is_usable() {
                        tracing::warn!(pool = %self.id, slot, ?latency, "session too slow");
                    }
                    self.set_broken(slot, !status.is_usable());
                    SlotCheck::Responded {
                        slot,
                        status,
                        latency,
                    }
                }
                Err(e) => {
                    tracing::warn!(pool = %self.id, slot, error = %e, "health check failed");
                    self.set_broken(slot, true);
                    SlotCheck::Failed {
                        slot,
                        error: e.to_string(),
                    }
                }
            };
            drop(lease);
            checks.push(check);
        }

        checks
    }

    /// Close every session and tear the pool down.
    ///
    /// Taking the pool by value means no [`PooledSession`] can still be
    /// alive. Slots held through detached tokens are closed anyway and
    /// counted in the report. Close failures are logged and counted; the
    /// remaining sessions are still closed.
    pub async fn shutdown(self) -> ShutdownReport {
        let outstanding = self.stats().busy();
        if outstanding > 0 {
            tracing::warn!(pool = %self.id, outstanding, "shutting down with slots still checked out");
        }

        let mut report = close_all(self.slots.into_vec()).await;
        report.outstanding = outstanding;
        tracing::info!(
            pool = %self.id,
            closed = report.closed,
            failed = report.failed,
            already_closed = report.already_closed,
            "session pool shut down"
        );
        report
    }
}

/// Check that `slot` exists and is checked out under `generation`
fn check_checkout(flags: &[SlotFlags], slot: usize, generation: u64) -> Result<()> {
    let entry = flags.get(slot).ok_or(MisuseKind::SlotOutOfRange {
        slot,
        capacity: flags.len(),
    })?;
    if !entry.busy {
        return Err(MisuseKind::NotCheckedOut { slot }.into());
    }
    if entry.generation != generation {
        return Err(MisuseKind::StaleLease { slot }.into());
    }
    Ok(())
}

/// Close sessions in slot order, each exactly once
///
/// Sessions a caller already closed are counted, not closed again.
async fn close_all<S: Session>(slots: Vec<Slot<S>>) -> ShutdownReport {
    let mut report = ShutdownReport::default();
    for slot in slots {
        if slot.session.is_closed() {
            tracing::warn!(slot = slot.id, "backend session was already closed");
            report.already_closed += 1;
            continue;
        }
        match slot.session.close().await {
            Ok(()) => report.closed += 1,
            Err(e) => {
                tracing::error!(slot = slot.id, error = %e, "failed to close backend session");
                report.failed += 1;
            }
        }
    }
    report
}

/// Backend error text without our own prefix
fn backend_message(error: Error) -> String {
    match error {
        Error::Session(message) => message,
        other => other.to_string(),
    }
}
