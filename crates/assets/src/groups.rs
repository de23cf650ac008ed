//! Group membership and the `Primary ∩ AND \ NOT` set algebra.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use gridbill_core::{AssetId, Entity, GroupId};

/// Role a group plays in a contract's filter formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupRole {
    Primary,
    And,
    Not,
}

impl core::fmt::Display for GroupRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            GroupRole::Primary => "primary",
            GroupRole::And => "and",
            GroupRole::Not => "not",
        })
    }
}

/// One member row as reported by the membership provider.
///
/// Providers may send more fields; only the asset id matters here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub asset_id: AssetId,
}

impl GroupMember {
    pub fn new(asset_id: impl Into<AssetId>) -> Self {
        Self {
            asset_id: asset_id.into(),
        }
    }
}

/// Resolved set of asset ids belonging to one group.
///
/// Built fresh for every filter invocation and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipSet {
    group_id: GroupId,
    members: HashSet<AssetId>,
}

impl MembershipSet {
    pub fn from_members(group_id: GroupId, members: impl IntoIterator<Item = GroupMember>) -> Self {
        Self::from_asset_ids(group_id, members.into_iter().map(|m| m.asset_id))
    }

    pub fn from_asset_ids(group_id: GroupId, ids: impl IntoIterator<Item = AssetId>) -> Self {
        Self {
            group_id,
            members: ids.into_iter().collect(),
        }
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    pub fn contains(&self, asset_id: &str) -> bool {
        self.members.contains(asset_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Membership predicates for one filter run.
///
/// A missing AND/NOT set means that constraint is absent, which is different
/// from an empty set: an empty AND set admits nothing, an empty NOT set
/// excludes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPredicates {
    primary: MembershipSet,
    and: Option<MembershipSet>,
    not: Option<MembershipSet>,
}

impl GroupPredicates {
    pub fn new(primary: MembershipSet) -> Self {
        Self {
            primary,
            and: None,
            not: None,
        }
    }

    pub fn with_and(mut self, and: Option<MembershipSet>) -> Self {
        self.and = and;
        self
    }

    pub fn with_not(mut self, not: Option<MembershipSet>) -> Self {
        self.not = not;
        self
    }

    pub fn primary(&self) -> &MembershipSet {
        &self.primary
    }

    pub fn and(&self) -> Option<&MembershipSet> {
        self.and.as_ref()
    }

    pub fn not(&self) -> Option<&MembershipSet> {
        self.not.as_ref()
    }

    /// Whether a single asset id satisfies `Primary ∩ AND \ NOT`.
    ///
    /// Checks run primary → AND → NOT and stop at the first failure.
    pub fn admits(&self, asset_id: &str) -> bool {
        if !self.primary.contains(asset_id) {
            return false;
        }
        if let Some(and) = &self.and {
            if !and.contains(asset_id) {
                return false;
            }
        }
        if let Some(not) = &self.not {
            if not.contains(asset_id) {
                return false;
            }
        }
        true
    }

    /// Filter an inventory, keeping input order.
    ///
    /// Returns borrows of the caller's records: nothing is cloned, reordered,
    /// duplicated or mutated.
    pub fn apply<'a, A>(&self, inventory: &'a [A]) -> Vec<&'a A>
    where
        A: Entity<Id = AssetId>,
    {
        inventory
            .iter()
            .filter(|asset| self.admits(asset.id().as_str()))
            .collect()
    }
}
