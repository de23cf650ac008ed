//! MW/capacity aggregation and invoice drafting over a billable asset set.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use gridbill_core::{AssetId, ContractId, CustomerId, DomainError, DomainResult, ValueObject};

use crate::asset::AssetRecord;

/// Price per MW for one billing period, in the smallest currency unit (e.g. cents).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MwRate(u64);

impl MwRate {
    pub fn per_mw_cents(cents: u64) -> Self {
        Self(cents)
    }

    pub fn cents(&self) -> u64 {
        self.0
    }

    /// Amount for `total_mw`, rounded to the nearest cent.
    ///
    /// Non-finite or negative totals bill zero.
    pub fn amount_for(&self, total_mw: f64) -> u64 {
        let amount = (total_mw * self.0 as f64).round();
        if amount.is_finite() && amount > 0.0 {
            amount as u64
        } else {
            0
        }
    }
}

impl ValueObject for MwRate {}

/// Aggregated capacity of a set of assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacitySummary {
    pub asset_count: usize,
    pub total_mw: f64,
    /// Sum over assets that report a kWp capacity.
    pub total_capacity_kwp: f64,
    pub hybrid_count: usize,
    pub solcast_count: usize,
}

impl CapacitySummary {
    pub fn from_assets<'a>(assets: impl IntoIterator<Item = &'a AssetRecord>) -> Self {
        assets.into_iter().fold(Self::default(), |mut s, a| {
            s.asset_count += 1;
            s.total_mw += a.total_mw;
            s.total_capacity_kwp += a.capacity_kwp.unwrap_or(0.0);
            if a.is_hybrid() {
                s.hybrid_count += 1;
            }
            if a.has_solcast() {
                s.solcast_count += 1;
            }
            s
        })
    }
}

impl ValueObject for CapacitySummary {}

/// Inclusive date range an invoice covers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl BillingPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> DomainResult<Self> {
        if end < start {
            return Err(DomainError::validation(format!(
                "billing period ends ({end}) before it starts ({start})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Invoice computed for one contract and period, ready to be persisted elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    pub contract_id: ContractId,
    pub customer_id: CustomerId,
    pub period: BillingPeriod,
    pub billable_assets: Vec<AssetId>,
    pub summary: CapacitySummary,
    pub rate: MwRate,
    /// Amount due in smallest currency unit.
    pub amount_due: u64,
}

impl InvoiceDraft {
    pub fn compute<'a>(
        contract_id: ContractId,
        customer_id: CustomerId,
        period: BillingPeriod,
        rate: MwRate,
        billable: impl IntoIterator<Item = &'a AssetRecord>,
    ) -> Self {
        let billable: Vec<&AssetRecord> = billable.into_iter().collect();
        let summary = CapacitySummary::from_assets(billable.iter().copied());
        let amount_due = rate.amount_for(summary.total_mw);

        Self {
            contract_id,
            customer_id,
            period,
            billable_assets: billable.iter().map(|a| a.asset_id.clone()).collect(),
            summary,
            rate,
            amount_due,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn summary_counts_capabilities() {
        let assets = vec![
            AssetRecord::new("a1", "one", 1.25).with_hybrid(true).with_capacity_kwp(1250.0),
            AssetRecord::new("a2", "two", 0.75).with_solcast(true),
            AssetRecord::new("a3", "three", 2.0).with_hybrid(false),
        ];
        let s = CapacitySummary::from_assets(&assets);

        assert_eq!(s.asset_count, 3);
        assert!((s.total_mw - 4.0).abs() < 1e-9);
        assert!((s.total_capacity_kwp - 1250.0).abs() < 1e-9);
        assert_eq!(s.hybrid_count, 1);
        assert_eq!(s.solcast_count, 1);
    }

    #[test]
    fn empty_asset_set_summarizes_to_zero() {
        let s = CapacitySummary::from_assets(std::iter::empty());
        assert_eq!(s, CapacitySummary::default());
    }

    #[test]
    fn rate_rounds_to_nearest_cent_and_never_goes_negative() {
        let rate = MwRate::per_mw_cents(12_345);
        assert_eq!(rate.amount_for(2.0), 24_690);
        assert_eq!(rate.amount_for(0.5), 6_173);
        assert_eq!(rate.amount_for(-1.0), 0);
        assert_eq!(rate.amount_for(f64::NAN), 0);
    }

    #[test]
    fn period_must_not_end_before_start() {
        assert!(BillingPeriod::new(date(2025, 1, 1), date(2025, 1, 31)).is_ok());
        assert!(BillingPeriod::new(date(2025, 1, 1), date(2025, 1, 1)).is_ok());
        assert!(matches!(
            BillingPeriod::new(date(2025, 2, 1), date(2025, 1, 31)),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn invoice_draft_bills_total_mw_of_billable_assets() {
        let assets = vec![
            AssetRecord::new("a1", "one", 1.5),
            AssetRecord::new("a2", "two", 2.5),
        ];
        let period = BillingPeriod::new(date(2025, 3, 1), date(2025, 3, 31)).unwrap();
        let draft = InvoiceDraft::compute(
            ContractId::new(),
            CustomerId::new(),
            period,
            MwRate::per_mw_cents(10_000),
            &assets,
        );

        assert_eq!(draft.amount_due, 40_000);
        assert_eq!(draft.billable_assets, vec![AssetId::from("a1"), AssetId::from("a2")]);
        assert_eq!(draft.summary.asset_count, 2);
    }

    #[test]
    fn summary_serializes_with_camel_case_keys() {
        let s = CapacitySummary::from_assets(&[AssetRecord::new("a1", "one", 1.5)]);
        let json = serde_json::to_value(&s).unwrap();

        assert_eq!(json["assetCount"], 1);
        assert_eq!(json["totalMw"], 1.5);
        assert!(json.get("asset_count").is_none());
    }
}
