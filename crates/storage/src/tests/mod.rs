//! Test utilities and module declarations for storage tests.

use medassist_core::{PharmacyAvailability, SavingsOption};

use crate::{MemoryStorage, PharmacyRecord, SavingsOptionRecord, StrategyRecord};

mod strategy_tests;

pub fn create_test_strategy(id: &str, generic: &str, brand: Option<&str>) -> StrategyRecord {
    StrategyRecord {
        medication_id: id.to_owned(),
        generic_name: generic.to_owned(),
        brand_name: brand.map(ToOwned::to_owned),
        category: Some("immunosuppressant".to_owned()),
        condition: Some("transplant".to_owned()),
        retail_price_low: Some(20_000),
        retail_price_high: Some(60_000),
        retail_price_note: None,
        common_mistakes: vec!["Switching manufacturers without telling the team".to_owned()],
        is_active: true,
    }
}

pub fn create_test_savings_option(
    medication_id: &str,
    id: i64,
    priority: i32,
    is_active: bool,
) -> SavingsOptionRecord {
    SavingsOptionRecord {
        medication_id: medication_id.to_owned(),
        priority,
        is_active,
        option: SavingsOption {
            id,
            option_type: "copay_card".to_owned(),
            name: format!("Option {id}"),
            description: None,
            estimated_cost_cents: Some(1000),
            estimated_cost_note: None,
            eligibility_criteria: None,
            steps: vec!["Call the program".to_owned()],
            documents_needed: vec![],
            url: None,
            phone: None,
            insurance_types: vec![],
        },
    }
}

pub fn create_test_pharmacy(medication_id: &str, pharmacy: &str, available: bool) -> PharmacyRecord {
    PharmacyRecord {
        medication_id: medication_id.to_owned(),
        availability: PharmacyAvailability {
            pharmacy: pharmacy.to_owned(),
            is_available: available,
            price_cents: Some(4500),
            price_note: None,
            url: None,
        },
    }
}

pub fn create_seeded_storage() -> MemoryStorage {
    let storage = MemoryStorage::new();
    storage.insert_strategy(create_test_strategy("tacrolimus", "Tacrolimus", Some("Prograf")));
    storage.insert_strategy(create_test_strategy("mycophenolate", "Mycophenolate", Some("CellCept")));
    storage.insert_strategy(create_test_strategy("prednisone", "Prednisone", None));
    let mut inactive = create_test_strategy("retired", "Retiredzol", Some("Oldbrand"));
    inactive.is_active = false;
    storage.insert_strategy(inactive);
    storage
}
