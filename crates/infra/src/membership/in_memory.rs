use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use gridbill_assets::GroupMember;
use gridbill_core::{AssetId, GroupId};

use super::{MembershipError, MembershipProvider, MembershipResult};

/// In-memory membership provider for tests/dev.
///
/// Unknown groups fail with [`MembershipError::UnknownGroup`], like the real API.
/// Groups marked with [`fail_group`](Self::fail_group) fail with a provider error.
#[derive(Debug, Default)]
pub struct InMemoryMembershipProvider {
    groups: RwLock<HashMap<GroupId, Vec<GroupMember>>>,
    failing: RwLock<HashSet<GroupId>>,
    lookups: Mutex<Vec<GroupId>>,
}

impl InMemoryMembershipProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group<I, S>(self, group_id: impl Into<GroupId>, asset_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<AssetId>,
    {
        self.set_group(group_id, asset_ids);
        self
    }

    /// Replace a group's roster.
    pub fn set_group<I, S>(&self, group_id: impl Into<GroupId>, asset_ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<AssetId>,
    {
        let members = asset_ids.into_iter().map(GroupMember::new).collect();
        if let Ok(mut groups) = self.groups.write() {
            groups.insert(group_id.into(), members);
        }
    }

    /// Make every lookup of `group_id` fail.
    pub fn fail_group(&self, group_id: impl Into<GroupId>) {
        if let Ok(mut failing) = self.failing.write() {
            failing.insert(group_id.into());
        }
    }

    /// Every group id looked up so far, in call order.
    pub fn lookups(&self) -> Vec<GroupId> {
        self.lookups.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MembershipProvider for InMemoryMembershipProvider {
    async fn group_members(&self, group_id: &GroupId) -> MembershipResult<Vec<GroupMember>> {
        if let Ok(mut lookups) = self.lookups.lock() {
            lookups.push(group_id.clone());
        }

        let failing = self
            .failing
            .read()
            .map_err(|_| MembershipError::Provider("failure registry poisoned".to_string()))?;
        if failing.contains(group_id) {
            return Err(MembershipError::Provider(format!(
                "simulated failure for group {group_id}"
            )));
        }

        let groups = self
            .groups
            .read()
            .map_err(|_| MembershipError::Provider("group registry poisoned".to_string()))?;
        groups
            .get(group_id)
            .cloned()
            .ok_or_else(|| MembershipError::UnknownGroup(group_id.clone()))
    }
}
