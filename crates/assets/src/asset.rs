use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use gridbill_core::{AssetId, DomainError, DomainResult, Entity};

/// One physical or metered asset known to a customer.
///
/// Field names on the wire follow the external inventory system
/// (`assetId`, `totalMW`, `capacityKWp`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub asset_id: AssetId,
    #[serde(default)]
    pub asset_name: String,
    /// Generating/managed capacity in megawatts.
    #[serde(rename = "totalMW", default)]
    pub total_mw: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hybrid: Option<bool>,
    #[serde(rename = "capacityKWp", default, skip_serializing_if = "Option::is_none")]
    pub capacity_kwp: Option<f64>,
    /// Whether external solar-forecast data is available for the asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_solcast: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_date: Option<NaiveDate>,
}

impl AssetRecord {
    pub fn new(asset_id: impl Into<AssetId>, asset_name: impl Into<String>, total_mw: f64) -> Self {
        Self {
            asset_id: asset_id.into(),
            asset_name: asset_name.into(),
            total_mw,
            is_hybrid: None,
            capacity_kwp: None,
            has_solcast: None,
            onboarding_date: None,
        }
    }

    pub fn with_hybrid(mut self, is_hybrid: bool) -> Self {
        self.is_hybrid = Some(is_hybrid);
        self
    }

    pub fn with_capacity_kwp(mut self, capacity_kwp: f64) -> Self {
        self.capacity_kwp = Some(capacity_kwp);
        self
    }

    pub fn with_solcast(mut self, has_solcast: bool) -> Self {
        self.has_solcast = Some(has_solcast);
        self
    }

    pub fn with_onboarding_date(mut self, date: NaiveDate) -> Self {
        self.onboarding_date = Some(date);
        self
    }

    pub fn is_hybrid(&self) -> bool {
        self.is_hybrid.unwrap_or(false)
    }

    pub fn has_solcast(&self) -> bool {
        self.has_solcast.unwrap_or(false)
    }

    /// Check the record before it is accepted into the inventory.
    ///
    /// The group filter never calls this: it filters whatever the caller hands it.
    pub fn validate(&self) -> DomainResult<()> {
        if self.asset_id.is_blank() {
            return Err(DomainError::invalid_id("asset id cannot be blank"));
        }
        if !(self.total_mw.is_finite() && self.total_mw >= 0.0) {
            return Err(DomainError::validation(format!(
                "asset {}: totalMW must be a finite non-negative number (got {})",
                self.asset_id, self.total_mw
            )));
        }
        if let Some(kwp) = self.capacity_kwp {
            if !(kwp.is_finite() && kwp >= 0.0) {
                return Err(DomainError::validation(format!(
                    "asset {}: capacityKWp must be a finite non-negative number (got {kwp})",
                    self.asset_id
                )));
            }
        }
        Ok(())
    }
}

impl Entity for AssetRecord {
    type Id = AssetId;

    fn id(&self) -> &Self::Id {
        &self.asset_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_well_formed_record() {
        let a = AssetRecord::new("a1", "Site 1", 1.5)
            .with_capacity_kwp(1500.0)
            .with_hybrid(true);
        assert!(a.validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_or_nan_capacity() {
        assert!(matches!(
            AssetRecord::new("a1", "x", -0.1).validate(),
            Err(DomainError::Validation(_))
        ));
        assert!(AssetRecord::new("a1", "x", f64::NAN).validate().is_err());
        assert!(
            AssetRecord::new("a1", "x", 1.0)
                .with_capacity_kwp(-5.0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn validate_rejects_blank_id() {
        assert!(matches!(
            AssetRecord::new(" ", "x", 1.0).validate(),
            Err(DomainError::InvalidId(_))
        ));
    }

    #[test]
    fn deserializes_inventory_field_names() {
        let json = r#"{
            "assetId": "a1",
            "assetName": "Kisumu Solar",
            "totalMW": 2.5,
            "isHybrid": true,
            "capacityKWp": 2500.0,
            "hasSolcast": false,
            "onboardingDate": "2024-03-01"
        }"#;
        let a: AssetRecord = serde_json::from_str(json).unwrap();
        assert_eq!(a.asset_id.as_str(), "a1");
        assert_eq!(a.total_mw, 2.5);
        assert!(a.is_hybrid());
        assert!(!a.has_solcast());
        assert_eq!(a.onboarding_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn optional_capabilities_default_to_absent() {
        let a: AssetRecord = serde_json::from_str(r#"{"assetId":"a2","totalMW":0.4}"#).unwrap();
        assert_eq!(a.asset_name, "");
        assert_eq!(a.is_hybrid, None);
        assert_eq!(a.capacity_kwp, None);
        assert!(!a.has_solcast());
    }
}
