//! Rank conversions between the domain and the `Int4` schema columns.

use crate::ordering::domain::{ContainerId, MemberId, MemberRecord, Position};
use crate::ordering::ports::{SiblingStoreError, SiblingStoreResult};

/// Converts a domain position to its database representation.
pub(super) fn to_db_rank(position: Position) -> SiblingStoreResult<i32> {
    i32::try_from(position.value()).map_err(SiblingStoreError::persistence)
}

/// Converts a stored rank back to a domain position.
///
/// A negative stored rank means the table was mutated outside this engine;
/// it surfaces as a persistence error rather than a panic.
pub(super) fn from_db_rank(rank: i32) -> SiblingStoreResult<Position> {
    u32::try_from(rank)
        .map(Position::new)
        .map_err(SiblingStoreError::persistence)
}

/// Builds a member record from an `(id, container, position)` row.
pub(super) fn row_to_member(row: (uuid::Uuid, uuid::Uuid, i32)) -> SiblingStoreResult<MemberRecord> {
    let (id, container, rank) = row;
    Ok(MemberRecord::new(
        MemberId::from_uuid(id),
        ContainerId::from_uuid(container),
        from_db_rank(rank)?,
    ))
}

/// Converts a `COUNT(*)` result to the domain's container length.
pub(super) fn count_to_len(count: i64) -> SiblingStoreResult<u32> {
    u32::try_from(count).map_err(SiblingStoreError::persistence)
}

/// Computes the append rank from the stored maximum.
pub(super) fn next_rank(max: Option<i32>) -> SiblingStoreResult<Position> {
    max.map_or(Ok(Position::ZERO), |rank| {
        let next = rank
            .checked_add(1)
            .ok_or_else(|| SiblingStoreError::persistence(RankOverflow))?;
        from_db_rank(next)
    })
}

/// Error raised when a container's maximum rank cannot be incremented.
#[derive(Debug, thiserror::Error)]
#[error("position overflow: container maximum rank reached i32::MAX")]
struct RankOverflow;
