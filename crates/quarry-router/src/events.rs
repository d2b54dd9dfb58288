//! Administrative mutations that invalidate routing state.

use quarry_core::Role;

/// A change made by the administrative layer.
///
/// Pass each one to [`Router::apply_admin_event`](crate::Router::apply_admin_event)
/// before acknowledging the change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminEvent {
    /// A user's password or role changed.
    UserChanged(String),
    UserRemoved(String),
    RoleCreated(Role),
    /// The role's users, documents, and partitions moved to the general role.
    RoleDeleted(Role),
    DocumentIngested(Role),
    PartitionIngested(Role),
    PartitionRelabeled { from: Role, to: Role },
}

impl AdminEvent {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UserChanged(_) => "user_changed",
            Self::UserRemoved(_) => "user_removed",
            Self::RoleCreated(_) => "role_created",
            Self::RoleDeleted(_) => "role_deleted",
            Self::DocumentIngested(_) => "document_ingested",
            Self::PartitionIngested(_) => "partition_ingested",
            Self::PartitionRelabeled { .. } => "partition_relabeled",
        }
    }
}

impl std::fmt::Display for AdminEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
