//! Move orchestration: validates a reorder request, computes the plan, and
//! hands it to the sibling store for atomic application.

use crate::ordering::domain::{
    ContainerId, MemberId, MemberPlacement, MoveComputation, MovePlan, OrderingError, Position,
};
use crate::ordering::ports::{SiblingStore, SiblingStoreError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// A single reorder or relocation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    member_id: MemberId,
    source_container: ContainerId,
    target_container: ContainerId,
    target_position: Position,
}

impl MoveRequest {
    /// Creates a move request.
    ///
    /// `source_container` is the container the caller believes currently
    /// holds the member; a mismatch with storage fails the move with a
    /// placement conflict rather than silently reordering the wrong
    /// container.
    #[must_use]
    pub const fn new(
        member_id: MemberId,
        source_container: ContainerId,
        target_container: ContainerId,
        target_position: Position,
    ) -> Self {
        Self {
            member_id,
            source_container,
            target_container,
            target_position,
        }
    }

    /// Returns the member to move.
    #[must_use]
    pub const fn member_id(&self) -> MemberId {
        self.member_id
    }

    /// Returns the container the caller believes holds the member.
    #[must_use]
    pub const fn source_container(&self) -> ContainerId {
        self.source_container
    }

    /// Returns the container that should hold the member afterwards.
    #[must_use]
    pub const fn target_container(&self) -> ContainerId {
        self.target_container
    }

    /// Returns the requested rank in the target container.
    #[must_use]
    pub const fn target_position(&self) -> Position {
        self.target_position
    }
}

/// Service-level errors for reorder operations.
#[derive(Debug, Error)]
pub enum MoveError {
    /// The requested target position is out of bounds.
    #[error(transparent)]
    Ordering(#[from] OrderingError),
    /// The sibling store rejected the operation.
    #[error(transparent)]
    Store(#[from] SiblingStoreError),
}

/// Result type for reorder service operations.
pub type MoveResult<T> = Result<T, MoveError>;

/// Orchestrates reorder and relocation requests against a sibling store.
///
/// Each request is one synchronous unit of work: load the member's current
/// placement, compute the sibling shifts, and apply them in one storage
/// transaction. Failure at any step leaves storage untouched.
#[derive(Clone)]
pub struct MoveCoordinator<S, C>
where
    S: SiblingStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> MoveCoordinator<S, C>
where
    S: SiblingStore,
    C: Clock + Send + Sync,
{
    /// Creates a new move coordinator.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Moves a member to a new rank, within its container or across to
    /// another, and returns its new placement.
    ///
    /// Moving a member onto its own rank is a no-op that leaves every
    /// sibling position unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SiblingStoreError::NotFound`] when the member does not
    /// exist, [`SiblingStoreError::ContainerConflict`] when the caller's
    /// claimed source container does not hold the member,
    /// [`OrderingError::InvalidPosition`] when the target rank is out of
    /// bounds, [`SiblingStoreError::PlacementConflict`] or
    /// [`SiblingStoreError::LengthConflict`] when the placements or
    /// container lengths the plan was computed from have gone stale, and
    /// [`SiblingStoreError::Persistence`] when the storage transaction
    /// fails; no partial reorder is ever persisted.
    pub async fn move_member(&self, request: MoveRequest) -> MoveResult<MemberPlacement> {
        let member = self
            .store
            .find_member(request.member_id())
            .await?
            .ok_or(SiblingStoreError::NotFound(request.member_id()))?;

        if member.container_id() != request.source_container() {
            warn!(
                member = %request.member_id(),
                claimed = %request.source_container(),
                actual = %member.container_id(),
                "rejecting move computed from a stale container view",
            );
            return Err(MoveError::Store(SiblingStoreError::ContainerConflict {
                member_id: request.member_id(),
                claimed: request.source_container(),
                actual: member.placement(),
            }));
        }

        let source_len = self.store.container_len(member.container_id()).await?;
        let target_len = if request.target_container() == member.container_id() {
            source_len
        } else {
            self.store.container_len(request.target_container()).await?
        };

        let plan = MovePlan::compute(MoveComputation {
            member_id: request.member_id(),
            source_container: member.container_id(),
            target_container: request.target_container(),
            source_index: member.position(),
            target_index: request.target_position(),
            source_len,
            target_len,
            moved_at: self.clock.utc(),
        })?;

        let placement = self.store.apply_move(&plan).await?;
        debug!(
            member = %placement.member_id(),
            from = %request.source_container(),
            to = %placement.container_id(),
            position = placement.position().value(),
            "member moved",
        );
        Ok(placement)
    }

    /// Returns the position a newly created member of `container` must
    /// take: one past the current maximum, or zero for an empty container.
    ///
    /// This is the single piece of position assignment outside
    /// [`move_member`](Self::move_member); the creation path shares it so
    /// appends never break density.
    ///
    /// # Errors
    ///
    /// Returns [`SiblingStoreError::Persistence`] when the lookup fails.
    pub async fn next_append_position(&self, container: ContainerId) -> MoveResult<Position> {
        Ok(self.store.next_position(container).await?)
    }

    /// Deletes a member and compacts its container so the remaining
    /// positions stay dense.
    ///
    /// # Errors
    ///
    /// Returns [`SiblingStoreError::NotFound`] when the member does not
    /// exist, or [`SiblingStoreError::Persistence`] when the transaction
    /// fails.
    pub async fn remove_member(&self, member_id: MemberId) -> MoveResult<()> {
        self.store.apply_removal(member_id).await?;
        debug!(member = %member_id, "member removed and container compacted");
        Ok(())
    }
}
