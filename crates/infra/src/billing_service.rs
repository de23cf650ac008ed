//! Contract billing: decide the billable asset set and draft the invoice.

use tracing::info;

use gridbill_assets::{
    AssetRecord, BillingPeriod, Contract, InvoiceDraft, has_asset_group_filtering,
};

use crate::filter_engine::GroupFilterEngine;
use crate::membership::MembershipProvider;

/// Drafts invoices for contracts from a customer's synced inventory.
#[derive(Debug, Clone)]
pub struct ContractBillingService<P> {
    engine: GroupFilterEngine<P>,
}

impl<P> ContractBillingService<P>
where
    P: MembershipProvider,
{
    pub fn new(provider: P) -> Self {
        Self {
            engine: GroupFilterEngine::new(provider),
        }
    }

    pub fn engine(&self) -> &GroupFilterEngine<P> {
        &self.engine
    }

    /// Billable subset of `inventory` for `contract`.
    ///
    /// Contracts without any group configured bill the whole inventory and skip
    /// the membership round trip. Otherwise the fail-closed group filter decides.
    pub async fn billable_assets<'a>(
        &self,
        contract: &Contract,
        inventory: &'a [AssetRecord],
    ) -> Vec<&'a AssetRecord> {
        if !has_asset_group_filtering(contract) {
            return inventory.iter().collect();
        }
        self.engine.filter_for_contract(inventory, &contract.groups).await
    }

    pub async fn draft_invoice(
        &self,
        contract: &Contract,
        inventory: &[AssetRecord],
        period: BillingPeriod,
    ) -> InvoiceDraft {
        let billable = self.billable_assets(contract, inventory).await;
        let draft = InvoiceDraft::compute(
            contract.contract_id,
            contract.customer_id,
            period,
            contract.rate,
            billable,
        );

        info!(
            contract_id = %contract.contract_id,
            customer_id = %contract.customer_id,
            inventory = inventory.len(),
            billable = draft.summary.asset_count,
            total_mw = draft.summary.total_mw,
            amount_due = draft.amount_due,
            "drafted invoice"
        );
        draft
    }
}
