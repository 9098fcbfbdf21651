//! Orderable member records and placement results.

use super::{ContainerId, MemberId, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An orderable member as the sibling store reports it: its identity plus
/// its current container and rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    id: MemberId,
    container_id: ContainerId,
    position: Position,
}

impl MemberRecord {
    /// Creates a member record from its parts.
    #[must_use]
    pub const fn new(id: MemberId, container_id: ContainerId, position: Position) -> Self {
        Self {
            id,
            container_id,
            position,
        }
    }

    /// Returns the member identifier.
    #[must_use]
    pub const fn id(&self) -> MemberId {
        self.id
    }

    /// Returns the container currently holding the member.
    #[must_use]
    pub const fn container_id(&self) -> ContainerId {
        self.container_id
    }

    /// Returns the member's current rank within its container.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Returns this record's placement.
    #[must_use]
    pub const fn placement(&self) -> MemberPlacement {
        MemberPlacement::new(self.id, self.container_id, self.position)
    }

    pub(crate) const fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) const fn relocate(&mut self, container_id: ContainerId, position: Position) {
        self.container_id = container_id;
        self.position = position;
    }
}

/// Where a member sits after an operation: the result shape of a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPlacement {
    member_id: MemberId,
    container_id: ContainerId,
    position: Position,
}

impl MemberPlacement {
    /// Creates a placement from its parts.
    #[must_use]
    pub const fn new(member_id: MemberId, container_id: ContainerId, position: Position) -> Self {
        Self {
            member_id,
            container_id,
            position,
        }
    }

    /// Returns the member identifier.
    #[must_use]
    pub const fn member_id(&self) -> MemberId {
        self.member_id
    }

    /// Returns the container holding the member.
    #[must_use]
    pub const fn container_id(&self) -> ContainerId {
        self.container_id
    }

    /// Returns the member's rank within the container.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }
}

impl fmt::Display for MemberPlacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "container {} position {}",
            self.container_id, self.position
        )
    }
}
