//! Asset-group boolean filter: `Primary ∩ AND \ NOT` over a customer inventory.
//!
//! Membership is resolved fresh on every call, with the up to three lookups
//! issued concurrently and joined before any filtering happens. Any failed
//! lookup fails the whole run closed: an empty billable set, never the
//! unfiltered inventory.

use tracing::{debug, error, warn};

use gridbill_assets::{ContractGroups, GroupPredicates, GroupRole, MembershipSet};
use gridbill_core::{AssetId, Entity, GroupId};

use crate::membership::{MembershipError, MembershipProvider, MembershipResult};

/// Resolves group membership through a [`MembershipProvider`] and filters
/// inventories with it.
///
/// Stateless between calls: no caching, no retries, no locks.
#[derive(Debug, Clone)]
pub struct GroupFilterEngine<P> {
    provider: P,
}

impl<P> GroupFilterEngine<P>
where
    P: MembershipProvider,
{
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Filter `inventory` down to the assets in `primary ∩ and \ not`.
    ///
    /// - absent or empty primary group: the inventory is returned unchanged
    ///   (group filtering is not configured);
    /// - absent or empty AND/NOT ids mean "no constraint";
    /// - any other id, whitespace included, is looked up verbatim;
    /// - if any requested lookup fails the result is empty and the failure is
    ///   logged. Use [`try_filter_assets_by_groups`](Self::try_filter_assets_by_groups)
    ///   to observe the failure instead.
    pub async fn filter_assets_by_groups<'a, A>(
        &self,
        inventory: &'a [A],
        primary_group_id: Option<&str>,
        and_group_id: Option<&str>,
        not_group_id: Option<&str>,
    ) -> Vec<&'a A>
    where
        A: Entity<Id = AssetId>,
    {
        match self
            .try_filter_assets_by_groups(inventory, primary_group_id, and_group_id, not_group_id)
            .await
        {
            Ok(filtered) => filtered,
            Err(e) => {
                error!(
                    primary_group_id = primary_group_id.unwrap_or_default(),
                    and_group_id = and_group_id.unwrap_or_default(),
                    not_group_id = not_group_id.unwrap_or_default(),
                    withheld_assets = inventory.len(),
                    error = %e,
                    "group membership resolution failed; billing no assets for this run"
                );
                Vec::new()
            }
        }
    }

    /// [`filter_assets_by_groups`](Self::filter_assets_by_groups) driven by a
    /// contract's group config.
    pub async fn filter_for_contract<'a, A>(
        &self,
        inventory: &'a [A],
        groups: &ContractGroups,
    ) -> Vec<&'a A>
    where
        A: Entity<Id = AssetId>,
    {
        self.filter_assets_by_groups(
            inventory,
            groups.primary().map(GroupId::as_str),
            groups.and().map(GroupId::as_str),
            groups.not().map(GroupId::as_str),
        )
        .await
    }

    /// Same filter, but a failed lookup is returned instead of collapsing to
    /// an empty result. Lets callers tell "nothing matched" from "could not
    /// resolve membership".
    pub async fn try_filter_assets_by_groups<'a, A>(
        &self,
        inventory: &'a [A],
        primary_group_id: Option<&str>,
        and_group_id: Option<&str>,
        not_group_id: Option<&str>,
    ) -> MembershipResult<Vec<&'a A>>
    where
        A: Entity<Id = AssetId>,
    {
        let Some(primary) = parse_group(primary_group_id) else {
            debug!(
                assets = inventory.len(),
                "no primary group configured; passing inventory through"
            );
            return Ok(inventory.iter().collect());
        };
        if inventory.is_empty() {
            return Ok(Vec::new());
        }

        let and = parse_group(and_group_id);
        let not = parse_group(not_group_id);

        let predicates = self
            .resolve_predicates(&primary, and.as_ref(), not.as_ref())
            .await?;
        let filtered = predicates.apply(inventory);

        debug!(
            primary_group_id = %primary,
            primary_members = predicates.primary().len(),
            and_members = ?predicates.and().map(MembershipSet::len),
            not_members = ?predicates.not().map(MembershipSet::len),
            inventory = inventory.len(),
            billable = filtered.len(),
            "filtered inventory by asset groups"
        );
        Ok(filtered)
    }

    /// Fetch all requested rosters concurrently; all-or-nothing.
    async fn resolve_predicates(
        &self,
        primary: &GroupId,
        and: Option<&GroupId>,
        not: Option<&GroupId>,
    ) -> MembershipResult<GroupPredicates> {
        let (primary, and, not) = tokio::try_join!(
            self.resolve(GroupRole::Primary, primary),
            self.resolve_optional(GroupRole::And, and),
            self.resolve_optional(GroupRole::Not, not),
        )?;

        Ok(GroupPredicates::new(primary).with_and(and).with_not(not))
    }

    async fn resolve(
        &self,
        role: GroupRole,
        group_id: &GroupId,
    ) -> MembershipResult<MembershipSet> {
        let members = self.provider.group_members(group_id).await.map_err(|e| {
            warn!(
                role = %role,
                group_id = %group_id,
                error = %e,
                "group membership lookup failed"
            );
            e
        })?;
        Ok(MembershipSet::from_members(group_id.clone(), members))
    }

    async fn resolve_optional(
        &self,
        role: GroupRole,
        group_id: Option<&GroupId>,
    ) -> Result<Option<MembershipSet>, MembershipError> {
        match group_id {
            Some(id) => self.resolve(role, id).await.map(Some),
            None => Ok(None),
        }
    }
}

fn parse_group(raw: Option<&str>) -> Option<GroupId> {
    raw.and_then(|s| GroupId::parse(s).ok())
}
