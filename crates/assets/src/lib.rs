//! Asset domain module.
//!
//! Business rules for deciding which assets a contract bills for, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage). Group
//! membership arrives here already resolved; fetching it is an infra concern.

pub mod asset;
pub mod billing;
pub mod contract;
pub mod groups;

pub use asset::AssetRecord;
pub use billing::{BillingPeriod, CapacitySummary, InvoiceDraft, MwRate};
pub use contract::{Contract, ContractGroups, has_asset_group_filtering};
pub use groups::{GroupMember, GroupPredicates, GroupRole, MembershipSet};
