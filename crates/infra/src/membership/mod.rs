//! Group membership provider boundary.
//!
//! The provider is the only source of truth for which assets belong to a group.
//! It is consulted fresh on every filter run; nothing here caches.

pub mod http;
pub mod in_memory;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use gridbill_assets::GroupMember;
use gridbill_core::GroupId;

pub use http::HttpMembershipProvider;
pub use in_memory::InMemoryMembershipProvider;

/// Result type for membership lookups.
pub type MembershipResult<T> = Result<T, MembershipError>;

/// Membership lookup failure.
///
/// Any of these aborts a filter run; the engine does not try to tell them apart.
#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("malformed membership payload: {0}")]
    Malformed(String),

    #[error("unknown group: {0}")]
    UnknownGroup(GroupId),

    #[error("provider error: {0}")]
    Provider(String),
}

/// Source of group → member asset mappings.
///
/// Implementations own their transport concerns (timeouts, auth). Callers do
/// not retry; a failed lookup is reported once.
#[async_trait]
pub trait MembershipProvider: Send + Sync {
    async fn group_members(&self, group_id: &GroupId) -> MembershipResult<Vec<GroupMember>>;
}

#[async_trait]
impl<P> MembershipProvider for Arc<P>
where
    P: MembershipProvider + ?Sized,
{
    async fn group_members(&self, group_id: &GroupId) -> MembershipResult<Vec<GroupMember>> {
        (**self).group_members(group_id).await
    }
}
