use serde::{Deserialize, Serialize};

use gridbill_core::{ContractId, CustomerId, GroupId};

use crate::billing::MwRate;

/// Group filter attached to a contract.
///
/// Every field is optional on the wire; an empty string counts as absent. Any
/// other value, whitespace included, is an opaque group id. With no primary
/// group there is no group logic at all and the inventory passes through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractGroups {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_group_id: Option<GroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub and_group_id: Option<GroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_group_id: Option<GroupId>,
}

impl ContractGroups {
    pub fn new(primary_group_id: impl Into<GroupId>) -> Self {
        Self {
            primary_group_id: Some(primary_group_id.into()),
            ..Self::default()
        }
    }

    pub fn with_and(mut self, and_group_id: impl Into<GroupId>) -> Self {
        self.and_group_id = Some(and_group_id.into());
        self
    }

    pub fn with_not(mut self, not_group_id: impl Into<GroupId>) -> Self {
        self.not_group_id = Some(not_group_id.into());
        self
    }

    pub fn primary(&self) -> Option<&GroupId> {
        non_empty(&self.primary_group_id)
    }

    pub fn and(&self) -> Option<&GroupId> {
        non_empty(&self.and_group_id)
    }

    pub fn not(&self) -> Option<&GroupId> {
        non_empty(&self.not_group_id)
    }

    /// True iff any of the three group ids is set to a non-empty value.
    pub fn has_asset_group_filtering(&self) -> bool {
        self.primary().is_some() || self.and().is_some() || self.not().is_some()
    }
}

fn non_empty(id: &Option<GroupId>) -> Option<&GroupId> {
    id.as_ref().filter(|g| !g.is_empty())
}

/// A billing contract between us and a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub contract_id: ContractId,
    pub customer_id: CustomerId,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub groups: ContractGroups,
    pub rate: MwRate,
}

impl Contract {
    pub fn new(customer_id: CustomerId, name: impl Into<String>, rate: MwRate) -> Self {
        Self {
            contract_id: ContractId::new(),
            customer_id,
            name: name.into(),
            groups: ContractGroups::default(),
            rate,
        }
    }

    pub fn with_groups(mut self, groups: ContractGroups) -> Self {
        self.groups = groups;
        self
    }
}

/// Whether a contract restricts billing by asset group at all.
///
/// Callers use this to skip the membership round trip for contracts with no
/// group configured. Pure; no IO.
pub fn has_asset_group_filtering(contract: &Contract) -> bool {
    contract.groups.has_asset_group_filtering()
}
