//! Pure reorder arithmetic: computes the sibling shifts a move requires.
//!
//! Given a member's current placement and a requested placement, the
//! computation yields a [`MovePlan`]: the minimal set of container-scoped
//! position ranges that must shift by one rank, plus the moved member's new
//! placement. Applying a plan leaves every involved container dense. The
//! computation never touches storage.

use super::{ContainerId, MemberId, MemberPlacement, OrderingError, Position};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// Whether a move stays within one container or crosses between two.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveScope {
    /// Reordering within one container: only the rank changes.
    SameContainer,
    /// Relocating between containers: the source closes a gap and the
    /// target opens a slot.
    CrossContainer,
}

/// Direction a run of sibling positions shifts by one rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDirection {
    /// Positions move up by one (a slot opens below them).
    Increment,
    /// Positions move down by one (a gap closes below them).
    Decrement,
}

/// A contiguous run of sibling positions within one container that shifts
/// by exactly one rank.
///
/// Ranges are inclusive on both ends; an absent upper bound means the run
/// extends to the end of the container. Expressing shifts as ranges lets
/// storage adapters apply each one as a single conditional bulk update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiblingShift {
    container_id: ContainerId,
    lower: Position,
    upper: Option<Position>,
    direction: ShiftDirection,
}

impl SiblingShift {
    const fn new(
        container_id: ContainerId,
        lower: Position,
        upper: Option<Position>,
        direction: ShiftDirection,
    ) -> Self {
        Self {
            container_id,
            lower,
            upper,
            direction,
        }
    }

    /// Returns the container whose siblings shift.
    #[must_use]
    pub const fn container_id(&self) -> ContainerId {
        self.container_id
    }

    /// Returns the inclusive lower bound of the shifted range.
    #[must_use]
    pub const fn lower(&self) -> Position {
        self.lower
    }

    /// Returns the inclusive upper bound, or `None` when the range extends
    /// to the end of the container.
    #[must_use]
    pub const fn upper(&self) -> Option<Position> {
        self.upper
    }

    /// Returns the shift direction.
    #[must_use]
    pub const fn direction(&self) -> ShiftDirection {
        self.direction
    }

    /// Returns `true` when `position` falls inside this shift's range.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        position >= self.lower && self.upper.is_none_or(|upper| position <= upper)
    }

    /// Applies this shift to a position inside its range.
    #[must_use]
    pub const fn apply(&self, position: Position) -> Position {
        match self.direction {
            ShiftDirection::Increment => position.succ(),
            ShiftDirection::Decrement => Position::new(position.value().saturating_sub(1)),
        }
    }
}

/// Parameter object carrying everything a move computation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveComputation {
    /// Member being moved.
    pub member_id: MemberId,
    /// Container currently holding the member.
    pub source_container: ContainerId,
    /// Container that should hold the member afterwards.
    pub target_container: ContainerId,
    /// Member's current rank in the source container.
    pub source_index: Position,
    /// Requested rank in the target container.
    pub target_index: Position,
    /// Current member count of the source container.
    pub source_len: u32,
    /// Current member count of the target container.
    pub target_len: u32,
    /// Timestamp recorded on every row the move touches.
    pub moved_at: DateTime<Utc>,
}

/// The computed effect of one move: which sibling ranges shift, and where
/// the moved member ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    member_id: MemberId,
    scope: MoveScope,
    source_container: ContainerId,
    target_container: ContainerId,
    expected_source_position: Position,
    target_position: Position,
    source_len: u32,
    target_len: u32,
    shifts: Vec<SiblingShift>,
    moved_at: DateTime<Utc>,
}

impl MovePlan {
    /// Computes the shifts a move requires.
    ///
    /// The scope is derived from container identity: a move whose source and
    /// target containers match reorders in place, anything else relocates.
    /// For an in-place reorder every sibling strictly between the old and
    /// new rank shifts one step towards the vacated slot; for a relocation
    /// the source closes the gap above the old rank and the target opens a
    /// slot at the new one. A move onto the member's own rank is a no-op
    /// and yields an empty shift set.
    ///
    /// The plan records the container lengths the bounds check ran against
    /// so storage adapters can re-check them when the plan is applied.
    ///
    /// # Errors
    ///
    /// Returns [`OrderingError::InvalidPosition`] when `target_index`
    /// exceeds the valid insertion range: `0..=source_len - 1` for an
    /// in-place reorder, `0..=target_len` for a relocation.
    pub fn compute(computation: MoveComputation) -> Result<Self, OrderingError> {
        let scope = if computation.source_container == computation.target_container {
            MoveScope::SameContainer
        } else {
            MoveScope::CrossContainer
        };

        let max = match scope {
            MoveScope::SameContainer => computation.source_len.saturating_sub(1),
            MoveScope::CrossContainer => computation.target_len,
        };
        if computation.target_index.value() > max {
            return Err(OrderingError::InvalidPosition {
                requested: computation.target_index.value(),
                max,
            });
        }

        let shifts = match scope {
            MoveScope::SameContainer => same_container_shifts(
                computation.source_container,
                computation.source_index,
                computation.target_index,
            ),
            MoveScope::CrossContainer => cross_container_shifts(
                computation.source_container,
                computation.target_container,
                computation.source_index,
                computation.target_index,
            ),
        };

        Ok(Self {
            member_id: computation.member_id,
            scope,
            source_container: computation.source_container,
            target_container: computation.target_container,
            expected_source_position: computation.source_index,
            target_position: computation.target_index,
            source_len: computation.source_len,
            target_len: computation.target_len,
            shifts,
            moved_at: computation.moved_at,
        })
    }

    /// Returns the member being moved.
    #[must_use]
    pub const fn member_id(&self) -> MemberId {
        self.member_id
    }

    /// Returns whether the move stays within one container.
    #[must_use]
    pub const fn scope(&self) -> MoveScope {
        self.scope
    }

    /// Returns the container the member is moving out of.
    #[must_use]
    pub const fn source_container(&self) -> ContainerId {
        self.source_container
    }

    /// Returns the container the member is moving into.
    #[must_use]
    pub const fn target_container(&self) -> ContainerId {
        self.target_container
    }

    /// Returns the rank the member held when the plan was computed.
    ///
    /// Storage adapters re-validate the stored rank against this value
    /// inside the application transaction; a mismatch means the plan was
    /// computed from a stale read and must not be applied.
    #[must_use]
    pub const fn expected_source_position(&self) -> Position {
        self.expected_source_position
    }

    /// Returns the rank the member takes in the target container.
    #[must_use]
    pub const fn target_position(&self) -> Position {
        self.target_position
    }

    /// Returns the source container length the bounds check ran against.
    ///
    /// Storage adapters re-check the container's current length against this
    /// value inside the application transaction; a mismatch means the
    /// container's membership changed after the plan was computed.
    #[must_use]
    pub const fn source_len(&self) -> u32 {
        self.source_len
    }

    /// Returns the target container length the bounds check ran against.
    #[must_use]
    pub const fn target_len(&self) -> u32 {
        self.target_len
    }

    /// Returns the sibling ranges that shift when the plan is applied.
    #[must_use]
    pub fn shifts(&self) -> &[SiblingShift] {
        &self.shifts
    }

    /// Returns the timestamp recorded on every row the move touches.
    #[must_use]
    pub const fn moved_at(&self) -> DateTime<Utc> {
        self.moved_at
    }

    /// Returns the moved member's placement once the plan is applied.
    #[must_use]
    pub const fn placement(&self) -> MemberPlacement {
        MemberPlacement::new(self.member_id, self.target_container, self.target_position)
    }
}

fn same_container_shifts(
    container: ContainerId,
    source: Position,
    target: Position,
) -> Vec<SiblingShift> {
    match target.cmp(&source) {
        // Siblings in (source, target] slide down into the vacated slot.
        Ordering::Greater => vec![SiblingShift::new(
            container,
            source.succ(),
            Some(target),
            ShiftDirection::Decrement,
        )],
        // Siblings in [target, source) slide up to make room.
        Ordering::Less => source
            .pred()
            .map(|upper| {
                vec![SiblingShift::new(
                    container,
                    target,
                    Some(upper),
                    ShiftDirection::Increment,
                )]
            })
            .unwrap_or_default(),
        Ordering::Equal => Vec::new(),
    }
}

fn cross_container_shifts(
    source_container: ContainerId,
    target_container: ContainerId,
    source: Position,
    target: Position,
) -> Vec<SiblingShift> {
    vec![
        // Source siblings above the vacated rank close the gap.
        SiblingShift::new(
            source_container,
            source.succ(),
            None,
            ShiftDirection::Decrement,
        ),
        // Target siblings at or above the insertion rank open a slot.
        SiblingShift::new(target_container, target, None, ShiftDirection::Increment),
    ]
}
