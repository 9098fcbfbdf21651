//! In-memory sibling store for tests and embedding.
//!
//! Applies each move or removal while holding the write lock for the whole
//! re-validate / shift / place sequence, giving the same all-or-nothing and
//! conflict-detection behaviour as the `PostgreSQL` adapter's transactions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::ordering::domain::{
    ContainerId, MemberId, MemberPlacement, MemberRecord, MovePlan, MoveScope, Position,
};
use crate::ordering::ports::{SiblingStore, SiblingStoreError, SiblingStoreResult};

/// Thread-safe in-memory sibling store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySiblingStore {
    state: Arc<RwLock<InMemoryState>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    members: HashMap<MemberId, MemberRecord>,
}

impl InMemoryState {
    fn ordered_container(&self, container: ContainerId) -> Vec<MemberRecord> {
        let mut records: Vec<MemberRecord> = self
            .members
            .values()
            .filter(|record| record.container_id() == container)
            .copied()
            .collect();
        records.sort_by_key(MemberRecord::position);
        records
    }

    fn container_len(&self, container: ContainerId) -> SiblingStoreResult<u32> {
        let len = self
            .members
            .values()
            .filter(|record| record.container_id() == container)
            .count();
        u32::try_from(len).map_err(SiblingStoreError::persistence)
    }

    /// Checks a container's current length against the length a plan's
    /// bounds check ran against.
    fn verify_container_len(
        &self,
        container: ContainerId,
        planned: u32,
    ) -> SiblingStoreResult<()> {
        let actual = self.container_len(container)?;
        if actual != planned {
            return Err(SiblingStoreError::LengthConflict {
                container_id: container,
                planned,
                actual,
            });
        }
        Ok(())
    }
}

impl InMemorySiblingStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a member record, replacing any existing record with the same
    /// identifier.
    ///
    /// Record creation belongs to the surrounding CRUD layer; this helper
    /// exists so tests and embedding callers can populate containers. The
    /// caller is responsible for seeding dense positions.
    ///
    /// # Errors
    ///
    /// Returns [`SiblingStoreError::Persistence`] when the store lock is
    /// poisoned.
    pub fn insert(&self, record: MemberRecord) -> SiblingStoreResult<()> {
        let mut state = write_locked(&self.state)?;
        state.members.insert(record.id(), record);
        Ok(())
    }
}

fn write_locked(
    state: &Arc<RwLock<InMemoryState>>,
) -> SiblingStoreResult<std::sync::RwLockWriteGuard<'_, InMemoryState>> {
    state
        .write()
        .map_err(|err| SiblingStoreError::persistence(std::io::Error::other(err.to_string())))
}

fn read_locked(
    state: &Arc<RwLock<InMemoryState>>,
) -> SiblingStoreResult<std::sync::RwLockReadGuard<'_, InMemoryState>> {
    state
        .read()
        .map_err(|err| SiblingStoreError::persistence(std::io::Error::other(err.to_string())))
}

#[async_trait]
impl SiblingStore for InMemorySiblingStore {
    async fn find_member(&self, id: MemberId) -> SiblingStoreResult<Option<MemberRecord>> {
        let state = read_locked(&self.state)?;
        Ok(state.members.get(&id).copied())
    }

    async fn list_container(
        &self,
        container: ContainerId,
    ) -> SiblingStoreResult<Vec<MemberRecord>> {
        let state = read_locked(&self.state)?;
        Ok(state.ordered_container(container))
    }

    async fn container_len(&self, container: ContainerId) -> SiblingStoreResult<u32> {
        let state = read_locked(&self.state)?;
        state.container_len(container)
    }

    async fn next_position(&self, container: ContainerId) -> SiblingStoreResult<Position> {
        let state = read_locked(&self.state)?;
        let next = state
            .members
            .values()
            .filter(|record| record.container_id() == container)
            .map(|record| record.position().succ())
            .max()
            .unwrap_or(Position::ZERO);
        Ok(next)
    }

    async fn apply_move(&self, plan: &MovePlan) -> SiblingStoreResult<MemberPlacement> {
        let mut state = write_locked(&self.state)?;

        let stored = state
            .members
            .get(&plan.member_id())
            .ok_or(SiblingStoreError::NotFound(plan.member_id()))?;
        let claimed = MemberPlacement::new(
            plan.member_id(),
            plan.source_container(),
            plan.expected_source_position(),
        );
        if stored.placement() != claimed {
            return Err(SiblingStoreError::PlacementConflict {
                member_id: plan.member_id(),
                claimed,
                actual: stored.placement(),
            });
        }

        // The plan's bounds check ran against lengths read before this
        // lock was taken; a container that grew or shrank since makes the
        // target rank unsafe to persist.
        state.verify_container_len(plan.source_container(), plan.source_len())?;
        if plan.scope() == MoveScope::CrossContainer {
            state.verify_container_len(plan.target_container(), plan.target_len())?;
        }

        // The plan's ranges never cover the moved member's own rank, so the
        // shifts can be applied to every matching sibling unconditionally.
        for shift in plan.shifts() {
            for record in state.members.values_mut() {
                if record.container_id() == shift.container_id()
                    && shift.contains(record.position())
                {
                    record.set_position(shift.apply(record.position()));
                }
            }
        }

        let moved = state
            .members
            .get_mut(&plan.member_id())
            .ok_or(SiblingStoreError::NotFound(plan.member_id()))?;
        moved.relocate(plan.target_container(), plan.target_position());

        Ok(plan.placement())
    }

    async fn apply_removal(&self, id: MemberId) -> SiblingStoreResult<()> {
        let mut state = write_locked(&self.state)?;

        let removed = state
            .members
            .remove(&id)
            .ok_or(SiblingStoreError::NotFound(id))?;

        // Compact: siblings above the vacated rank slide down by one.
        for record in state.members.values_mut() {
            if record.container_id() == removed.container_id()
                && record.position() > removed.position()
            {
                record.set_position(Position::new(record.position().value().saturating_sub(1)));
            }
        }
        Ok(())
    }
}
