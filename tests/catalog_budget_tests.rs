// 🧪 End-to-end checks against tests/fixtures/catalog.csv
//
// alpha / beta share the same items at different prices; gamma carries a
// duplicate and a negative row that the loader must skip.

use std::io::Write;
use std::path::{Path, PathBuf};

use city_budget::affordability::{evaluate_offer, AffordabilityTier};
use city_budget::{
    compare_selected, compute_budget, compute_monthly_budget, equivalent_salary, tier_for_city,
    BudgetGroup, ComparisonError, DeepLink, DiffDirection, PriceCatalog, ProfileKey,
    SelectionState, ShareState, ViewMode,
};

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog.csv")
}

fn load_fixture() -> PriceCatalog {
    PriceCatalog::load(&fixture_path()).expect("fixture catalog loads")
}

fn professional(slugs: &[&str]) -> SelectionState {
    SelectionState::new(ProfileKey::Professional, slugs).unwrap()
}

#[test]
fn test_fixture_loads_and_skips_bad_rows() {
    let catalog = load_fixture();
    assert_eq!(catalog.slugs(), vec!["alpha", "beta", "gamma"]);

    let gamma = catalog.get("gamma").unwrap();
    assert_eq!(gamma.entries.len(), 2);
    assert_eq!(gamma.base_price("Milk (1L)"), Some(40.0));
    assert!(!gamma.has_item("Veg Thali"));
}

#[test]
fn test_professional_budget_totals() {
    let catalog = load_fixture();
    let alpha = catalog.get("alpha").unwrap();
    let selection = professional(&["alpha"]);

    let budget = compute_budget(alpha, &selection);
    // rent 20000 + milk 30×50 + thali 8×100 + biryani 4×200 + power 1000 + gym 1500
    assert_eq!(budget.total, 25_600.0);
    assert_eq!(budget.category_total("Rent Per Month"), 20_000.0);
    assert_eq!(budget.category_total("Restaurants"), 1_600.0);
    assert_eq!(budget.group_total(BudgetGroup::Lifestyle), 1_500.0);
    // Untagged demographic: gendered items stay out for professionals
    assert!(budget.item("Men's Haircut").is_none());

    let sum: f64 = budget.by_category.values().sum();
    assert_eq!(sum, budget.total);
}

#[test]
fn test_selection_edits_flow_into_budget() {
    let catalog = load_fixture();
    let alpha = catalog.get("alpha").unwrap();
    let mut selection = professional(&["alpha"]);

    selection.set_veg_only(true);
    assert_eq!(compute_monthly_budget(alpha, &selection).total, 24_800.0);

    selection.use_centre(false);
    assert_eq!(compute_monthly_budget(alpha, &selection).total, 16_800.0);

    selection.set_price_override("alpha", "Milk (1L)", 0.0);
    assert_eq!(compute_monthly_budget(alpha, &selection).total, 15_300.0);

    selection.set_view_mode(ViewMode::Yearly);
    assert_eq!(compute_budget(alpha, &selection).total, 15_300.0 * 12.0);

    selection.reset();
    assert_eq!(compute_budget(alpha, &selection).total, 25_600.0);
}

#[test]
fn test_compare_two_cities() {
    let catalog = load_fixture();
    let selection = professional(&["alpha", "beta"]);

    let result = compare_selected(&catalog, &selection).unwrap();
    assert_eq!(result.cheapest_slug, "alpha");
    assert_eq!(result.costliest_slug, "beta");
    assert_eq!(result.budget_for("beta").unwrap().total, 38_200.0);
    // (38200 - 25600) / 25600 = 49.2%
    assert_eq!(result.spread_percent, 49);

    let diffs = result.item_diffs.as_ref().unwrap();
    let milk = diffs.iter().find(|d| d.item == "Milk (1L)").unwrap();
    assert_eq!((milk.diff_percent, milk.direction), (20, DiffDirection::Costlier));

    assert_eq!(result.housing.len(), 2);
    assert_eq!(result.housing[0].principal, 7_200_000.0);
    assert_eq!(result.housing[1].principal, 10_800_000.0);
}

#[test]
fn test_compare_three_cities_has_no_item_diffs() {
    let catalog = load_fixture();
    let selection = professional(&["alpha", "beta", "gamma"]);

    let result = compare_selected(&catalog, &selection).unwrap();
    assert_eq!(result.cheapest_slug, "gamma");
    assert!(result.item_diffs.is_none());
    // Only Milk and 1BHK centre are priced in all three
    assert_eq!(result.item_rows.len(), 2);
}

#[test]
fn test_compare_rejects_bad_city_sets() {
    let catalog = load_fixture();

    let single = professional(&["alpha"]);
    assert_eq!(
        compare_selected(&catalog, &single).unwrap_err(),
        ComparisonError::CityCount(1)
    );

    let unknown = professional(&["alpha", "atlantis"]);
    assert_eq!(
        compare_selected(&catalog, &unknown).unwrap_err(),
        ComparisonError::UnknownCity("atlantis".to_string())
    );
}

#[test]
fn test_salary_equivalence_and_offer() {
    let catalog = load_fixture();
    let alpha = catalog.get("alpha").unwrap();
    let beta = catalog.get("beta").unwrap();
    let selection = professional(&["alpha", "beta"]);

    assert_eq!(equivalent_salary(64_000.0, alpha, beta, None, &selection), 95_500.0);

    let offer = evaluate_offer(64_000.0, alpha, 100_000.0, beta, &selection);
    assert!(offer.worth_it);
    assert_eq!(offer.offer_gap, 4_500.0);
    assert_eq!(offer.tier_now, AffordabilityTier::SavingWell);
    assert_eq!(offer.tier_after, AffordabilityTier::SavingWell);

    assert_eq!(tier_for_city(30_000.0, alpha, &selection), AffordabilityTier::Survival);
}

#[test]
fn test_share_link_round_trip_through_catalog() {
    let catalog = load_fixture();
    let mut selection = professional(&["beta", "alpha"]);
    selection.set_accommodation("alpha", "2BHK Apartment in City Centre");

    let query = ShareState::from_selection(&selection, &[90_000.0]).encode();
    let mut restored = SelectionState::for_city(ProfileKey::Professional, "gamma");
    ShareState::decode(&query).apply_to(&mut restored);

    let before = compare_selected(&catalog, &selection).unwrap();
    let after = compare_selected(&catalog, &restored).unwrap();
    assert_eq!(before.deltas, after.deltas);
}

#[test]
fn test_deep_link_budget() {
    let catalog = load_fixture();
    let selection = DeepLink::parse("?city=alpha&centre=0")
        .to_selection(ProfileKey::Professional)
        .unwrap();

    let alpha = catalog.get(&selection.city_slugs[0]).unwrap();
    assert_eq!(compute_budget(alpha, &selection).total, 17_600.0);
}

#[test]
fn test_json_catalog_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"[{{"slug": "delta", "name": "Delta", "entries": [
            {{"category": "Markets", "item": "Milk (1L)", "unit": "1 litre", "price": 10}}
        ]}}]"#
    )
    .unwrap();

    let catalog = PriceCatalog::load(file.path()).unwrap();
    let delta = catalog.get("delta").unwrap();
    let selection = SelectionState::for_city(ProfileKey::Professional, "delta");
    assert_eq!(compute_budget(delta, &selection).total, 300.0);
}
