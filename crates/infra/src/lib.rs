//! Infrastructure layer: membership providers, inventory storage, config and
//! the async services that drive the pure asset domain.

pub mod billing_service;
pub mod capability_sync;
pub mod config;
pub mod filter_engine;
pub mod inventory;
pub mod membership;

pub use billing_service::ContractBillingService;
pub use capability_sync::{CapabilitySource, CapabilitySync, SyncError, SyncReport};
pub use config::{AmmpConfig, ConfigError};
pub use filter_engine::GroupFilterEngine;
pub use inventory::{InMemoryInventoryStore, InventoryStore, InventoryStoreError};
pub use membership::{
    HttpMembershipProvider, InMemoryMembershipProvider, MembershipError, MembershipProvider,
    MembershipResult,
};
