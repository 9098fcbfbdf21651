//! Sibling store port: ordered-member lookup and atomic repositioning.

use crate::ordering::domain::{
    ContainerId, MemberId, MemberPlacement, MemberRecord, MovePlan, Position,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for sibling store operations.
pub type SiblingStoreResult<T> = Result<T, SiblingStoreError>;

/// Persistence contract for one kind of ordered member (board columns, or
/// column tasks).
///
/// Implementations must apply [`apply_move`](Self::apply_move) and
/// [`apply_removal`](Self::apply_removal) atomically: either every position
/// change in the batch is persisted, or none is.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SiblingStore: Send + Sync {
    /// Looks up a member's current container and position.
    ///
    /// Returns `None` when the member does not exist.
    async fn find_member(&self, id: MemberId) -> SiblingStoreResult<Option<MemberRecord>>;

    /// Returns the members of `container`, ordered by ascending position.
    async fn list_container(
        &self,
        container: ContainerId,
    ) -> SiblingStoreResult<Vec<MemberRecord>>;

    /// Returns the number of members currently in `container`.
    async fn container_len(&self, container: ContainerId) -> SiblingStoreResult<u32>;

    /// Returns the position a newly created member of `container` must take:
    /// one past the current maximum, or zero when the container is empty.
    async fn next_position(&self, container: ContainerId) -> SiblingStoreResult<Position>;

    /// Atomically applies a computed move plan.
    ///
    /// The whole re-validate / shift / place sequence runs inside one
    /// storage transaction. Before any shift is applied, the member's
    /// stored placement is re-read under a write lock and compared against
    /// the plan's expected source placement, and the affected containers'
    /// current lengths are re-checked against the lengths the plan's
    /// bounds check ran against.
    ///
    /// # Errors
    ///
    /// Returns [`SiblingStoreError::NotFound`] when the member no longer
    /// exists, [`SiblingStoreError::PlacementConflict`] when its stored
    /// placement disagrees with the plan (stale read),
    /// [`SiblingStoreError::LengthConflict`] when a container grew or
    /// shrank after the plan was computed, or
    /// [`SiblingStoreError::Persistence`] when the transaction fails; every
    /// error implies a full rollback.
    async fn apply_move(&self, plan: &MovePlan) -> SiblingStoreResult<MemberPlacement>;

    /// Atomically deletes a member and closes the gap it leaves, keeping
    /// the container dense.
    ///
    /// # Errors
    ///
    /// Returns [`SiblingStoreError::NotFound`] when the member does not
    /// exist, or [`SiblingStoreError::Persistence`] when the transaction
    /// fails.
    async fn apply_removal(&self, id: MemberId) -> SiblingStoreResult<()>;
}

/// Errors returned by sibling store implementations.
#[derive(Debug, Clone, Error)]
pub enum SiblingStoreError {
    /// The member was not found.
    #[error("member not found: {0}")]
    NotFound(MemberId),

    /// The caller addressed the member through a container it does not
    /// occupy; the caller must refetch and retry with fresh data.
    #[error("member {member_id} is not in container {claimed}; store has {actual}")]
    ContainerConflict {
        /// Member the caller addressed.
        member_id: MemberId,
        /// Container the caller believed held the member.
        claimed: ContainerId,
        /// Placement actually recorded in storage.
        actual: MemberPlacement,
    },

    /// The caller's view of the member's placement no longer matches
    /// storage; the caller must refetch and retry with fresh data.
    #[error("stale placement for member {member_id}: caller saw {claimed}, store has {actual}")]
    PlacementConflict {
        /// Member whose placement was re-validated.
        member_id: MemberId,
        /// Placement the caller's plan was computed from.
        claimed: MemberPlacement,
        /// Placement actually recorded in storage.
        actual: MemberPlacement,
    },

    /// A container's length no longer matches the length the plan's bounds
    /// check ran against; the caller must refetch and retry with fresh data.
    #[error("stale length for container {container_id}: plan saw {planned} members, store has {actual}")]
    LengthConflict {
        /// Container whose membership changed after the plan was computed.
        container_id: ContainerId,
        /// Length the plan's bounds check ran against.
        planned: u32,
        /// Length actually recorded in storage.
        actual: u32,
    },

    /// Persistence-layer failure; the transaction rolled back fully and the
    /// whole operation is safe to retry from a fresh read.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl SiblingStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}

impl From<diesel::result::Error> for SiblingStoreError {
    fn from(err: diesel::result::Error) -> Self {
        // All Diesel errors become persistence errors: by the time a
        // statement fails the semantic checks (NotFound, PlacementConflict)
        // have already run inside the same transaction.
        Self::persistence(err)
    }
}
