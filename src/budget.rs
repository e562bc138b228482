// 🧮 Budget Calculator - (City, Selection) → monthly totals
//
// Pure function of its inputs: no I/O, no errors. Anything the catalog does
// not price contributes zero.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::City;
use crate::entities::{BudgetGroup, ItemRegistry};
use crate::selection::{SelectionState, ViewMode};

// ============================================================================
// RESULT TYPES
// ============================================================================

/// One counted line of a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemContribution {
    pub item: String,
    pub category: String,
    pub unit: String,
    pub budget_group: BudgetGroup,

    /// Effective unit price (override or catalog)
    pub unit_price: f64,
    pub quantity: u32,

    /// `unit_price × quantity`, scaled to the view mode
    pub amount: f64,

    /// True when `unit_price` comes from a manual override
    pub overridden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedBudget {
    pub city_slug: String,
    pub view_mode: ViewMode,
    pub total: f64,

    /// Totals keyed by the catalog's category field
    pub by_category: BTreeMap<String, f64>,

    /// Totals keyed by registry budget group
    pub by_group: BTreeMap<BudgetGroup, f64>,

    pub items: Vec<ItemContribution>,
}

impl ComputedBudget {
    fn empty(city_slug: &str) -> Self {
        ComputedBudget {
            city_slug: city_slug.to_string(),
            view_mode: ViewMode::Monthly,
            total: 0.0,
            by_category: BTreeMap::new(),
            by_group: BTreeMap::new(),
            items: Vec::new(),
        }
    }

    fn add(&mut self, contribution: ItemContribution) {
        self.total += contribution.amount;
        *self
            .by_category
            .entry(contribution.category.clone())
            .or_insert(0.0) += contribution.amount;
        *self.by_group.entry(contribution.budget_group).or_insert(0.0) += contribution.amount;
        self.items.push(contribution);
    }

    /// Re-express the budget in another view mode
    pub fn in_view(mut self, view_mode: ViewMode) -> Self {
        let from = self.view_mode.multiplier();
        let to = view_mode.multiplier();
        if from != to {
            let rescale = |v: &mut f64| *v = *v / from * to;
            rescale(&mut self.total);
            self.by_category.values_mut().for_each(rescale);
            self.by_group.values_mut().for_each(rescale);
            self.items.iter_mut().for_each(|i| rescale(&mut i.amount));
        }
        self.view_mode = view_mode;
        self
    }

    pub fn monthly_total(&self) -> f64 {
        self.total / self.view_mode.multiplier()
    }

    pub fn category_total(&self, category: &str) -> f64 {
        self.by_category.get(category).copied().unwrap_or(0.0)
    }

    pub fn group_total(&self, group: BudgetGroup) -> f64 {
        self.by_group.get(&group).copied().unwrap_or(0.0)
    }

    pub fn item(&self, item: &str) -> Option<&ItemContribution> {
        self.items.iter().find(|i| i.item == item)
    }
}

// ============================================================================
// CALCULATION
// ============================================================================

/// Budget for one city, in the selection's view mode
pub fn compute_budget(city: &City, selection: &SelectionState) -> ComputedBudget {
    compute_monthly_budget(city, selection).in_view(selection.view_mode)
}

/// Monthly budget for one city, ignoring the selection's view mode
pub fn compute_monthly_budget(city: &City, selection: &SelectionState) -> ComputedBudget {
    let registry = ItemRegistry::global();
    let mut budget = ComputedBudget::empty(&city.slug);

    // 1. Accommodation: always quantity 1, zero when excluded
    let accommodation = selection.accommodation_for(&city.slug);
    if !selection.excluded_items.contains(accommodation) {
        if let Some(contribution) = contribution(city, selection, accommodation, 1) {
            budget.add(ItemContribution {
                budget_group: registry.group_of(accommodation),
                ..contribution
            });
        }
    }

    // 2. Active item set
    for config in selection.active_items() {
        let quantity = selection.quantity(&config.item);
        if let Some(contribution) = contribution(city, selection, &config.item, quantity) {
            budget.add(ItemContribution {
                budget_group: config.budget_group,
                ..contribution
            });
        }
    }

    budget
}

fn contribution(
    city: &City,
    selection: &SelectionState,
    item: &str,
    quantity: u32,
) -> Option<ItemContribution> {
    let entry = city.entry(item)?;
    let override_price = selection.price_override(&city.slug, item);
    let unit_price = override_price.unwrap_or(entry.price);

    Some(ItemContribution {
        item: entry.item.clone(),
        category: entry.category.clone(),
        unit: entry.unit.clone(),
        budget_group: BudgetGroup::Accommodation,
        unit_price,
        quantity,
        amount: unit_price * quantity as f64,
        overridden: override_price.is_some(),
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::item::{ONE_BHK_CENTRE, ONE_BHK_OUTSKIRTS};
    use crate::entities::ProfileKey;

    fn create_test_city() -> City {
        City::with_prices(
            "pune",
            "Pune",
            &[
                ("Rent Per Month", ONE_BHK_CENTRE, "month", 22000.0),
                ("Rent Per Month", ONE_BHK_OUTSKIRTS, "month", 14000.0),
                ("Restaurants", "Veg Thali", "1 plate", 80.0),
                ("Restaurants", "Chicken Biryani", "1 plate", 220.0),
                ("Markets", "Milk (1L)", "1 litre", 56.0),
                ("Markets", "Eggs (12)", "dozen", 84.0),
                ("Markets", "Fish (1kg)", "1 kg", 450.0),
                ("Utilities (Monthly)", "Electricity Bill", "month", 1500.0),
            ],
        )
    }

    fn create_test_selection() -> SelectionState {
        SelectionState::for_city(ProfileKey::Professional, "pune")
    }

    #[test]
    fn test_compute_budget_counts_accommodation_and_items() {
        let city = create_test_city();
        let budget = compute_budget(&city, &create_test_selection());

        // 22000 + 80×8 + 220×4 + 56×30 + 84×4 + 1500
        let expected = 22000.0 + 640.0 + 880.0 + 1680.0 + 336.0 + 1500.0;
        assert_eq!(budget.total, expected);
        assert_eq!(budget.category_total("Rent Per Month"), 22000.0);
        assert_eq!(budget.category_total("Restaurants"), 1520.0);
        assert_eq!(budget.group_total(BudgetGroup::Accommodation), 22000.0);
        assert_eq!(budget.group_total(BudgetGroup::Groceries), 2016.0);
        // Optional fish is not counted
        assert!(budget.item("Fish (1kg)").is_none());
    }

    #[test]
    fn test_category_sum_matches_total() {
        let city = create_test_city();
        let mut selection = create_test_selection();
        selection.include_item("Fish (1kg)");
        selection.set_quantity("Veg Thali", 13);
        selection.set_price_override("pune", "Milk (1L)", 61.5);

        let budget = compute_budget(&city, &selection);
        let category_sum: f64 = budget.by_category.values().sum();
        let group_sum: f64 = budget.by_group.values().sum();

        assert!((category_sum - budget.total).abs() < 1e-6);
        assert!((group_sum - budget.total).abs() < 1e-6);
    }

    #[test]
    fn test_override_quantity_and_reset() {
        let city = create_test_city();
        let mut selection = create_test_selection();

        selection.set_price_override("pune", "Veg Thali", 120.0);
        selection.set_quantity("Veg Thali", 2);
        let budget = compute_budget(&city, &selection);
        let thali = budget.item("Veg Thali").unwrap();
        assert_eq!(thali.amount, 240.0);
        assert!(thali.overridden);

        selection.reset_price_override("pune", "Veg Thali");
        let budget = compute_budget(&city, &selection);
        let thali = budget.item("Veg Thali").unwrap();
        assert_eq!(thali.amount, 160.0);
        assert!(!thali.overridden);
    }

    #[test]
    fn test_doubling_quantity_doubles_contribution() {
        let city = create_test_city();
        let mut selection = create_test_selection();

        selection.set_quantity("Milk (1L)", 10);
        let single = compute_budget(&city, &selection);
        selection.set_quantity("Milk (1L)", 20);
        let double = compute_budget(&city, &selection);

        let milk_single = single.item("Milk (1L)").unwrap().amount;
        assert_eq!(double.item("Milk (1L)").unwrap().amount, 2.0 * milk_single);
        assert_eq!(double.total - single.total, milk_single);
    }

    #[test]
    fn test_yearly_is_twelve_times_monthly() {
        let city = create_test_city();
        let mut selection = create_test_selection();
        let monthly = compute_budget(&city, &selection);

        selection.set_view_mode(ViewMode::Yearly);
        let yearly = compute_budget(&city, &selection);

        assert_eq!(yearly.total, 12.0 * monthly.total);
        assert_eq!(yearly.category_total("Restaurants"), 12.0 * monthly.category_total("Restaurants"));
        assert_eq!(yearly.monthly_total(), monthly.total);
        assert_eq!(yearly.view_mode, ViewMode::Yearly);
        // Scaling never touches the selection itself
        assert_eq!(selection.quantity("Veg Thali"), 8);
    }

    #[test]
    fn test_in_view_round_trip() {
        let city = create_test_city();
        let monthly = compute_monthly_budget(&city, &create_test_selection());
        let back = monthly.clone().in_view(ViewMode::Yearly).in_view(ViewMode::Monthly);
        assert_eq!(back, monthly);
    }

    #[test]
    fn test_excluded_accommodation_contributes_zero() {
        let city = create_test_city();
        let mut selection = create_test_selection();
        selection.exclude_item(ONE_BHK_CENTRE);

        let budget = compute_budget(&city, &selection);
        assert_eq!(budget.group_total(BudgetGroup::Accommodation), 0.0);
        assert!(budget.item(ONE_BHK_CENTRE).is_none());
    }

    #[test]
    fn test_outskirts_accommodation() {
        let city = create_test_city();
        let mut selection = create_test_selection();
        selection.use_centre(false);

        let budget = compute_budget(&city, &selection);
        assert_eq!(budget.item(ONE_BHK_OUTSKIRTS).unwrap().amount, 14000.0);
    }

    #[test]
    fn test_missing_items_contribute_nothing() {
        let city = City::with_prices("goa", "Goa", &[("Restaurants", "Veg Thali", "1 plate", 90.0)]);
        let mut selection = SelectionState::for_city(ProfileKey::Student, "goa");
        selection.set_accommodation("goa", "Houseboat");
        selection.set_price_override("goa", "Milk (1L)", 60.0);

        let budget = compute_budget(&city, &selection);
        assert_eq!(budget.total, 720.0);
        assert_eq!(budget.items.len(), 1);
    }

    #[test]
    fn test_veg_mode_lowers_budget() {
        let city = create_test_city();
        let mut selection = create_test_selection();
        let full = compute_budget(&city, &selection);

        selection.set_veg_only(true);
        let veg = compute_budget(&city, &selection);

        assert_eq!(full.total - veg.total, 220.0 * 4.0 + 84.0 * 4.0);
        assert!(veg.item("Chicken Biryani").is_none());
    }

    #[test]
    fn test_compute_budget_is_deterministic() {
        let city = create_test_city();
        let selection = create_test_selection();
        assert_eq!(compute_budget(&city, &selection), compute_budget(&city, &selection));
    }
}
