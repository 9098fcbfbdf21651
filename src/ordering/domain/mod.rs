//! Domain model for dense-position ordering.
//!
//! The ordering domain models containers of ordered members, the positions
//! they occupy, and the pure arithmetic that reorders them, while keeping
//! all infrastructure concerns outside of the domain boundary.

mod error;
mod ids;
mod member;
mod position;
mod reindex;
mod role;

pub use error::{OrderingError, ParseBoardRoleError};
pub use ids::{ContainerId, MemberId};
pub use member::{MemberPlacement, MemberRecord};
pub use position::Position;
pub use reindex::{MoveComputation, MovePlan, MoveScope, ShiftDirection, SiblingShift};
pub use role::{BoardAction, BoardRole};
