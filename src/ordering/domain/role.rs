//! Board membership roles and the actions they permit.
//!
//! The role → allowed-actions mapping is a pure function consumed by the
//! caller that resolves a user's role on a board; the reordering engine
//! itself never authorizes and trusts its caller to have done so.

use super::ParseBoardRoleError;
use serde::{Deserialize, Serialize};

/// Role a user holds on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BoardRole {
    /// The board's creator; holds every capability.
    Owner,
    /// Delegated administrator; manages membership and board settings.
    Admin,
    /// Regular collaborator; creates and edits content.
    Member,
    /// Read-only participant.
    Viewer,
}

impl BoardRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
            Self::Viewer => "VIEWER",
        }
    }

    /// Returns whether this role may perform `action`.
    #[must_use]
    pub const fn allows(self, action: BoardAction) -> bool {
        match action {
            BoardAction::ViewBoard => true,
            BoardAction::EditContent => {
                matches!(self, Self::Owner | Self::Admin | Self::Member)
            }
            BoardAction::ModifyBoard | BoardAction::InviteMembers | BoardAction::RemoveMembers => {
                matches!(self, Self::Owner | Self::Admin)
            }
        }
    }
}

impl TryFrom<&str> for BoardRole {
    type Error = ParseBoardRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "OWNER" => Ok(Self::Owner),
            "ADMIN" => Ok(Self::Admin),
            "MEMBER" => Ok(Self::Member),
            "VIEWER" => Ok(Self::Viewer),
            _ => Err(ParseBoardRoleError(value.to_owned())),
        }
    }
}

/// Action a caller may attempt against a board or its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardAction {
    /// Read the board and its contents.
    ViewBoard,
    /// Create, edit, or reorder columns, tasks, labels, and comments.
    EditContent,
    /// Rename or delete the board itself.
    ModifyBoard,
    /// Invite new members to the board.
    InviteMembers,
    /// Remove existing members from the board.
    RemoveMembers,
}
