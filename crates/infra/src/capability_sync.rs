//! Capability metadata sync.
//!
//! Copies per-asset metadata (names, MW totals, hybrid/Solcast flags, kWp)
//! from the external inventory system into an [`InventoryStore`]. Runs as a
//! batch job, independent of billing; the group filter only ever reads the
//! result.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use gridbill_assets::AssetRecord;
use gridbill_core::{AssetId, CustomerId};

use crate::inventory::{InventoryStore, InventoryStoreError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("capability source failed: {0}")]
    Source(String),

    #[error(transparent)]
    Store(#[from] InventoryStoreError),

    /// The store failed after some writes landed; `report` counts them.
    #[error("inventory store failed mid-sync: {source}")]
    Interrupted {
        report: Box<SyncReport>,
        #[source]
        source: InventoryStoreError,
    },
}

/// External system reporting the current asset list of a customer.
#[async_trait]
pub trait CapabilitySource: Send + Sync {
    async fn fetch_assets(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<AssetRecord>, SyncError>;
}

/// Outcome of one sync run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    pub customer_id: CustomerId,
    pub created: u64,
    pub updated: u64,
    pub unchanged: u64,
    pub removed: u64,
    /// Records that failed validation or repeated an asset id.
    pub rejected: u64,
    pub duration_ms: u64,
    pub completed_at: DateTime<Utc>,
}

impl SyncReport {
    fn new(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            created: 0,
            updated: 0,
            unchanged: 0,
            removed: 0,
            rejected: 0,
            duration_ms: 0,
            completed_at: Utc::now(),
        }
    }
}

/// Sync job wiring a source to a store.
pub struct CapabilitySync<S, T> {
    source: S,
    store: T,
}

impl<S, T> CapabilitySync<S, T>
where
    S: CapabilitySource,
    T: InventoryStore,
{
    pub fn new(source: S, store: T) -> Self {
        Self { source, store }
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    /// Bring the stored inventory of `customer_id` in line with the source.
    ///
    /// A source failure, or a store failure while reading the current
    /// inventory, aborts before anything is written. A store failure while
    /// writing returns [`SyncError::Interrupted`] with the counts of what did
    /// land; there is no rollback. Invalid records are skipped; whatever was
    /// stored for them before is kept.
    pub async fn run(&self, customer_id: CustomerId) -> Result<SyncReport, SyncError> {
        let started = Instant::now();
        let mut report = SyncReport::new(customer_id);

        let fetched = self.source.fetch_assets(customer_id).await.map_err(|e| {
            warn!(customer_id = %customer_id, error = %e, "capability sync aborted: source failed");
            e
        })?;

        let existing: HashMap<AssetId, AssetRecord> = self
            .store
            .list(customer_id)?
            .into_iter()
            .map(|r| (r.asset_id.clone(), r))
            .collect();

        let applied = self.apply(customer_id, fetched, &existing, &mut report);

        report.duration_ms = started.elapsed().as_millis() as u64;
        report.completed_at = Utc::now();

        if let Err(source) = applied {
            warn!(
                customer_id = %customer_id,
                created = report.created,
                updated = report.updated,
                removed = report.removed,
                error = %source,
                "capability sync interrupted: store failed"
            );
            return Err(SyncError::Interrupted {
                report: Box::new(report),
                source,
            });
        }

        info!(
            customer_id = %customer_id,
            created = report.created,
            updated = report.updated,
            unchanged = report.unchanged,
            removed = report.removed,
            rejected = report.rejected,
            duration_ms = report.duration_ms,
            "capability sync completed"
        );
        Ok(report)
    }

    fn apply(
        &self,
        customer_id: CustomerId,
        fetched: Vec<AssetRecord>,
        existing: &HashMap<AssetId, AssetRecord>,
        report: &mut SyncReport,
    ) -> Result<(), InventoryStoreError> {
        let mut reported: HashSet<AssetId> = HashSet::with_capacity(fetched.len());
        for record in fetched {
            if !reported.insert(record.asset_id.clone()) {
                warn!(
                    customer_id = %customer_id,
                    asset_id = %record.asset_id,
                    "duplicate asset in source; keeping first"
                );
                report.rejected += 1;
                continue;
            }
            if let Err(e) = record.validate() {
                warn!(
                    customer_id = %customer_id,
                    asset_id = %record.asset_id,
                    error = %e,
                    "rejecting asset record"
                );
                report.rejected += 1;
                continue;
            }

            match existing.get(&record.asset_id) {
                Some(current) if *current == record => report.unchanged += 1,
                Some(_) => {
                    self.store.upsert(customer_id, record)?;
                    report.updated += 1;
                }
                None => {
                    self.store.upsert(customer_id, record)?;
                    report.created += 1;
                }
            }
        }

        for asset_id in existing.keys().filter(|id| !reported.contains(*id)) {
            if self.store.remove(customer_id, asset_id)? {
                report.removed += 1;
            }
        }
        Ok(())
    }
}
