use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Value, json};

use gridbill_assets::{AssetRecord, CapacitySummary, Contract, MwRate, has_asset_group_filtering};
use gridbill_infra::{AmmpConfig, GroupFilterEngine, HttpMembershipProvider, MembershipProvider};

pub struct FilterArgs {
    pub inventory: PathBuf,
    pub primary: Option<String>,
    pub and_group: Option<String>,
    pub not_group: Option<String>,
    pub rate_cents: Option<u64>,
    pub strict: bool,
}

pub async fn filter(args: FilterArgs) -> Result<String> {
    let inventory = load_inventory(&args.inventory)?;

    // Without a primary group nothing is looked up, so the API need not be configured.
    let output = if args.primary.as_deref().is_some_and(|p| !p.is_empty()) {
        let config = AmmpConfig::from_env().context("loading asset API configuration")?;
        let provider =
            HttpMembershipProvider::new(&config).context("building membership provider")?;
        run_filter(GroupFilterEngine::new(provider), &inventory, &args).await?
    } else {
        report(inventory.iter().collect(), args.rate_cents)
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

async fn run_filter<P: MembershipProvider>(
    engine: GroupFilterEngine<P>,
    inventory: &[AssetRecord],
    args: &FilterArgs,
) -> Result<Value> {
    let primary = args.primary.as_deref();
    let and = args.and_group.as_deref();
    let not = args.not_group.as_deref();

    let billable = if args.strict {
        engine
            .try_filter_assets_by_groups(inventory, primary, and, not)
            .await
            .context("resolving group membership")?
    } else {
        engine.filter_assets_by_groups(inventory, primary, and, not).await
    };

    Ok(report(billable, args.rate_cents))
}

fn report(billable: Vec<&AssetRecord>, rate_cents: Option<u64>) -> Value {
    let summary = CapacitySummary::from_assets(billable.iter().copied());
    let amount_due =
        rate_cents.map(|cents| MwRate::per_mw_cents(cents).amount_for(summary.total_mw));

    json!({
        "billable": billable,
        "summary": summary,
        "amountDue": amount_due,
    })
}

pub fn check(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let contract: Contract = serde_json::from_str(&raw)
        .with_context(|| format!("parsing contract {}", path.display()))?;

    Ok(serde_json::to_string_pretty(&json!({
        "contractId": contract.contract_id,
        "hasAssetGroupFiltering": has_asset_group_filtering(&contract),
    }))?)
}

fn load_inventory(path: &Path) -> Result<Vec<AssetRecord>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing inventory {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridbill_infra::InMemoryMembershipProvider;

    fn args(primary: Option<&str>, not: Option<&str>, strict: bool) -> FilterArgs {
        FilterArgs {
            inventory: PathBuf::new(),
            primary: primary.map(str::to_string),
            and_group: None,
            not_group: not.map(str::to_string),
            rate_cents: Some(100),
            strict,
        }
    }

    fn inventory() -> Vec<AssetRecord> {
        vec![
            AssetRecord::new("a1", "one", 1.5),
            AssetRecord::new("a2", "two", 2.5),
        ]
    }

    #[tokio::test]
    async fn reports_billable_assets_summary_and_amount() {
        let engine = GroupFilterEngine::new(
            InMemoryMembershipProvider::new()
                .with_group("p", ["a1", "a2"])
                .with_group("n", ["a2"]),
        );

        let out = run_filter(engine, &inventory(), &args(Some("p"), Some("n"), false))
            .await
            .unwrap();

        assert_eq!(out["billable"][0]["assetId"], "a1");
        assert_eq!(out["billable"].as_array().unwrap().len(), 1);
        assert_eq!(out["summary"]["assetCount"], 1);
        assert_eq!(out["summary"]["totalMw"], 1.5);
        assert_eq!(out["amountDue"], 150);
    }

    #[tokio::test]
    async fn strict_mode_surfaces_resolution_failure() {
        let engine = GroupFilterEngine::new(InMemoryMembershipProvider::new());

        let lenient = run_filter(
            GroupFilterEngine::new(InMemoryMembershipProvider::new()),
            &inventory(),
            &args(Some("missing"), None, false),
        )
        .await
        .unwrap();
        assert_eq!(lenient["billable"].as_array().unwrap().len(), 0);

        assert!(
            run_filter(engine, &inventory(), &args(Some("missing"), None, true))
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn pass_through_filter_needs_no_api_configuration() {
        let path = std::env::temp_dir().join(format!(
            "gridbill-inventory-{}.json",
            std::process::id()
        ));
        fs::write(&path, serde_json::to_string(&inventory()).unwrap()).unwrap();

        let mut filter_args = args(None, Some("n"), false);
        filter_args.inventory = path.clone();
        let out = filter(filter_args).await;
        fs::remove_file(&path).unwrap();

        let out: Value = serde_json::from_str(&out.unwrap()).unwrap();
        assert_eq!(out["billable"].as_array().unwrap().len(), 2);
        assert_eq!(out["summary"]["totalMw"], 4.0);
        assert_eq!(out["amountDue"], 400);
    }
}
