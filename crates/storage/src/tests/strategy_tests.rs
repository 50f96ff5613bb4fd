use std::io::Write as _;

use medassist_core::{LookupColumn, normalize_medication_key};

use super::*;
use crate::traits::StrategyStore;

#[tokio::test]
async fn list_active_strategies_sorted_by_brand_nulls_last() {
    let storage = create_seeded_storage();
    let list = storage.list_active_strategies().await.unwrap();
    let ids: Vec<&str> = list.iter().map(|s| s.medication_id.as_str()).collect();
    assert_eq!(ids, vec!["mycophenolate", "tacrolimus", "prednisone"]);
}

#[tokio::test]
async fn find_medication_id_by_each_column() {
    let storage = create_seeded_storage();
    let hit = storage.find_medication_id(LookupColumn::MedicationId, "tacrolimus").await.unwrap();
    assert_eq!(hit.as_deref(), Some("tacrolimus"));
    let hit = storage.find_medication_id(LookupColumn::GenericName, "tacrolimus").await.unwrap();
    assert_eq!(hit.as_deref(), Some("tacrolimus"));
    let hit = storage.find_medication_id(LookupColumn::BrandName, "prograf").await.unwrap();
    assert_eq!(hit.as_deref(), Some("tacrolimus"));
    let miss = storage.find_medication_id(LookupColumn::BrandName, "tacrolimus").await.unwrap();
    assert_eq!(miss, None);
}

#[tokio::test]
async fn find_medication_id_folds_stored_names() {
    let storage = create_seeded_storage();
    storage.insert_strategy(create_test_strategy("mtx", "Methotrexate", Some("\u{FF34}rexall ")));
    let key = normalize_medication_key("TREXALL");
    let hit = storage.find_medication_id(LookupColumn::BrandName, &key).await.unwrap();
    assert_eq!(hit.as_deref(), Some("mtx"));
}

#[tokio::test]
async fn find_medication_id_ignores_inactive() {
    let storage = create_seeded_storage();
    let miss = storage.find_medication_id(LookupColumn::BrandName, "oldbrand").await.unwrap();
    assert_eq!(miss, None);
    assert!(storage.get_active_strategy("retired").await.unwrap().is_none());
}

#[tokio::test]
async fn savings_options_active_only_priority_descending() {
    let storage = create_seeded_storage();
    storage.insert_savings_option(create_test_savings_option("tacrolimus", 1, 10, true));
    storage.insert_savings_option(create_test_savings_option("tacrolimus", 2, 50, true));
    storage.insert_savings_option(create_test_savings_option("tacrolimus", 3, 90, false));
    storage.insert_savings_option(create_test_savings_option("tacrolimus", 4, 30, true));
    storage.insert_savings_option(create_test_savings_option("prednisone", 5, 99, true));

    let options = storage.get_savings_options("tacrolimus").await.unwrap();
    let ids: Vec<i64> = options.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![2, 4, 1]);
}

#[tokio::test]
async fn pharmacy_rows_are_unique_per_pair() {
    let storage = create_seeded_storage();
    storage.insert_pharmacy(create_test_pharmacy("tacrolimus", "costco", true));
    storage.insert_pharmacy(create_test_pharmacy("tacrolimus", "walgreens", true));
    storage.insert_pharmacy(create_test_pharmacy("tacrolimus", "costco", false));
    storage.insert_pharmacy(create_test_pharmacy("prednisone", "costco", true));

    let rows = storage.get_pharmacy_availability("tacrolimus").await.unwrap();
    assert_eq!(rows.len(), 2);
    let costco = rows.iter().find(|r| r.pharmacy == "costco").unwrap();
    assert!(!costco.is_available);

    let flags = storage.list_pharmacy_flags().await.unwrap();
    assert_eq!(flags.len(), 3);
}

#[tokio::test]
async fn fixture_file_seeds_all_tables() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let fixture = serde_json::json!({
        "strategies": [{
            "medication_id": "tacrolimus",
            "generic_name": "Tacrolimus",
            "brand_name": "Prograf",
            "category": null,
            "condition": null,
            "retail_price_low": 20000,
            "retail_price_high": null,
            "retail_price_note": null
        }],
        "savings_options": [{
            "medication_id": "tacrolimus",
            "priority": 5,
            "id": 11,
            "option_type": "pap",
            "name": "Manufacturer PAP",
            "description": null,
            "estimated_cost_cents": 0,
            "estimated_cost_note": null,
            "eligibility_criteria": "Household income under 400% FPL",
            "url": null,
            "phone": "1-800-555-0100",
            "insurance_types": ["uninsured"]
        }],
        "pharmacy_availability": [{
            "medication_id": "tacrolimus",
            "pharmacy": "costco",
            "is_available": true,
            "price_cents": 4200,
            "price_note": "90-day supply",
            "url": null
        }]
    });
    write!(file, "{fixture}").unwrap();

    let storage = crate::MemoryStorage::from_fixture_file(file.path()).unwrap();
    let strategy = storage.get_active_strategy("tacrolimus").await.unwrap().unwrap();
    assert_eq!(strategy.brand_name.as_deref(), Some("Prograf"));
    assert!(strategy.common_mistakes.is_empty());

    let options = storage.get_savings_options("tacrolimus").await.unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].insurance_types, vec!["uninsured"]);
    assert!(options[0].steps.is_empty());

    let pharmacies = storage.get_pharmacy_availability("tacrolimus").await.unwrap();
    assert_eq!(pharmacies[0].price_cents, Some(4200));
}

#[test]
fn fixture_file_missing_is_reported() {
    let err = crate::MemoryStorage::from_fixture_file(std::path::Path::new("/nonexistent/seed.json"))
        .unwrap_err();
    assert!(matches!(err, crate::StorageError::Fixture(_)));
}
