//! Commands that talk to a running server through the API clients.

use anyhow::Result;
use medassist_client::{
    ApiClient, LocalReportStore, PriceReportClient, PriceReportDraft, StrategyClient,
    default_store_path,
};
use medassist_core::{
    InsuranceType, StrategyLookup, filter_savings_options_by_insurance, format_price,
    format_price_range,
};

fn price_client(api: ApiClient) -> PriceReportClient {
    let store = LocalReportStore::new(default_store_path());
    tracing::debug!(path = %store.path().display(), "local price report store");
    PriceReportClient::new(api, store)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_human(lookup: &StrategyLookup) {
    let Some(strategy) = &lookup.strategy else {
        println!("No strategy found");
        return;
    };
    let name = strategy.brand_name.as_deref().unwrap_or(&strategy.generic_name);
    let retail = format_price_range(
        strategy.retail_price_low.map(i64::from),
        strategy.retail_price_high.map(i64::from),
    );
    match retail {
        Some(range) => println!("{name} ({}): retail {range}", strategy.generic_name),
        None => println!("{name} ({})", strategy.generic_name),
    }
    for option in &strategy.savings_options {
        let cost = format_price(option.estimated_cost_cents.map(i64::from));
        println!("  - {} [{}]: {}", option.name, option.option_type, cost.as_deref().unwrap_or("?"));
    }
    for (pharmacy, entry) in &lookup.pharmacies {
        let state = if entry.available { "available" } else { "unavailable" };
        let price = format_price(entry.price_cents.map(i64::from));
        println!("  {pharmacy}: {state} {}", price.as_deref().unwrap_or(""));
    }
}

pub(crate) async fn strategy(
    api: ApiClient,
    medication_id: Option<&str>,
    insurance: Option<InsuranceType>,
    human: bool,
) -> Result<()> {
    let client = StrategyClient::new(api);
    let Some(medication_id) = medication_id else {
        return print_json(&client.fetch_all_medication_strategies().await);
    };

    let mut lookup = client.fetch_medication_strategy(medication_id).await;
    if let Some(strategy) = lookup.strategy.as_mut() {
        strategy.savings_options =
            filter_savings_options_by_insurance(&strategy.savings_options, insurance);
    }
    if human {
        print_human(&lookup);
        Ok(())
    } else {
        print_json(&lookup)
    }
}

pub(crate) async fn prices(api: ApiClient, medication_id: &str, source: &str) -> Result<()> {
    let stats = price_client(api).fetch_price_stats(medication_id, source).await;
    print_json(&stats)
}

pub(crate) async fn report(api: ApiClient, draft: PriceReportDraft) -> Result<()> {
    let outcome = price_client(api).submit_price_report(&draft).await;
    print_json(&outcome)?;
    if !outcome.success {
        anyhow::bail!(
            "price report rejected: {}",
            outcome.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

pub(crate) async fn price_stats(api: ApiClient) -> Result<()> {
    let stats = price_client(api).fetch_all_price_stats().await;
    print_json(&stats)
}
