// 🛒 Budget Items - Canonical catalog of trackable items
//
// Every item a budget can count lives here exactly once, tagged with:
// - the budget group it is edited under
// - its default monthly quantity
// - whether it is optional (inactive until the user opts in)
// - an optional demographic tag
//
// The table is built once and never mutated.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

// ============================================================================
// BUDGET GROUP
// ============================================================================

/// Coarse grouping used to cluster editable items
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetGroup {
    Accommodation,
    Groceries,
    Restaurants,
    Transportation,
    Utilities,
    Lifestyle,
    Clothing,
    Childcare,
}

impl BudgetGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetGroup::Accommodation => "Accommodation",
            BudgetGroup::Groceries => "Groceries",
            BudgetGroup::Restaurants => "Restaurants",
            BudgetGroup::Transportation => "Transportation",
            BudgetGroup::Utilities => "Utilities",
            BudgetGroup::Lifestyle => "Lifestyle",
            BudgetGroup::Clothing => "Clothing",
            BudgetGroup::Childcare => "Childcare",
        }
    }
}

// ============================================================================
// DEMOGRAPHIC
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Demographic {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl Demographic {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Some(Demographic::Male),
            "f" | "female" => Some(Demographic::Female),
            _ => None,
        }
    }
}

// ============================================================================
// ITEM CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItemConfig {
    /// Item name, matching `PriceCatalogEntry::item`
    pub item: String,

    pub budget_group: BudgetGroup,

    /// Monthly quantity used until the user edits it
    pub default_qty: u32,

    /// Optional items only count once the user includes them
    pub is_optional: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub demographic_tag: Option<Demographic>,
}

impl BudgetItemConfig {
    pub fn new(item: &str, budget_group: BudgetGroup, default_qty: u32) -> Self {
        BudgetItemConfig {
            item: item.to_string(),
            budget_group,
            default_qty,
            is_optional: false,
            demographic_tag: None,
        }
    }

    /// Builder: mark as optional
    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    /// Builder: tag with a demographic
    pub fn for_demographic(mut self, tag: Demographic) -> Self {
        self.demographic_tag = Some(tag);
        self
    }

    pub fn is_accommodation(&self) -> bool {
        self.budget_group == BudgetGroup::Accommodation
    }
}

// ============================================================================
// WELL-KNOWN ITEM NAMES
// ============================================================================

pub const PG_ROOM_CENTRE: &str = "PG Single Room in City Centre";
pub const PG_ROOM_OUTSKIRTS: &str = "PG Single Room Outside Centre";
pub const ONE_BHK_CENTRE: &str = "1BHK Apartment in City Centre";
pub const ONE_BHK_OUTSKIRTS: &str = "1BHK Apartment Outside Centre";
pub const TWO_BHK_CENTRE: &str = "2BHK Apartment in City Centre";
pub const TWO_BHK_OUTSKIRTS: &str = "2BHK Apartment Outside Centre";
pub const THREE_BHK_CENTRE: &str = "3BHK Apartment in City Centre";
pub const THREE_BHK_OUTSKIRTS: &str = "3BHK Apartment Outside Centre";

/// Purchase prices, used by the housing EMI scenario rather than the budget
pub const BUY_PRICE_SQFT_CENTRE: &str = "Price per Sqft to Buy Apartment in City Centre";
pub const BUY_PRICE_SQFT_OUTSKIRTS: &str = "Price per Sqft to Buy Apartment Outside Centre";

/// Items dropped when veg mode is on
pub const NON_VEG_ITEMS: &[&str] = &[
    "Eggs (12)",
    "Chicken (1kg)",
    "Fish (1kg)",
    "Mutton (1kg)",
    "Chicken Biryani",
];

pub fn is_non_veg(item: &str) -> bool {
    NON_VEG_ITEMS.contains(&item)
}

// ============================================================================
// ITEM REGISTRY
// ============================================================================

/// Read-only table of all trackable items, in display order
#[derive(Debug)]
pub struct ItemRegistry {
    items: Vec<BudgetItemConfig>,
}

static ITEM_REGISTRY: OnceLock<ItemRegistry> = OnceLock::new();

impl ItemRegistry {
    /// The process-wide registry
    pub fn global() -> &'static ItemRegistry {
        ITEM_REGISTRY.get_or_init(ItemRegistry::with_defaults)
    }

    fn with_defaults() -> Self {
        use BudgetGroup::*;
        use Demographic::*;

        let items = vec![
            // Accommodation (chosen per city, never part of the item set)
            BudgetItemConfig::new(PG_ROOM_CENTRE, Accommodation, 1).optional(),
            BudgetItemConfig::new(PG_ROOM_OUTSKIRTS, Accommodation, 1).optional(),
            BudgetItemConfig::new(ONE_BHK_CENTRE, Accommodation, 1).optional(),
            BudgetItemConfig::new(ONE_BHK_OUTSKIRTS, Accommodation, 1).optional(),
            BudgetItemConfig::new(TWO_BHK_CENTRE, Accommodation, 1).optional(),
            BudgetItemConfig::new(TWO_BHK_OUTSKIRTS, Accommodation, 1).optional(),
            BudgetItemConfig::new(THREE_BHK_CENTRE, Accommodation, 1).optional(),
            BudgetItemConfig::new(THREE_BHK_OUTSKIRTS, Accommodation, 1).optional(),
            // Groceries
            BudgetItemConfig::new("Milk (1L)", Groceries, 30),
            BudgetItemConfig::new("Rice (1kg)", Groceries, 5),
            BudgetItemConfig::new("Atta (1kg)", Groceries, 5),
            BudgetItemConfig::new("Toor Dal (1kg)", Groceries, 3),
            BudgetItemConfig::new("Paneer (1kg)", Groceries, 1),
            BudgetItemConfig::new("Eggs (12)", Groceries, 4),
            BudgetItemConfig::new("Chicken (1kg)", Groceries, 3),
            BudgetItemConfig::new("Fish (1kg)", Groceries, 1).optional(),
            BudgetItemConfig::new("Mutton (1kg)", Groceries, 1).optional(),
            BudgetItemConfig::new("Fresh Vegetables (1kg)", Groceries, 15),
            BudgetItemConfig::new("Fruits (1kg)", Groceries, 6),
            BudgetItemConfig::new("Cooking Oil (1L)", Groceries, 3),
            // Eating out
            BudgetItemConfig::new("Veg Thali", Restaurants, 8),
            BudgetItemConfig::new("Chicken Biryani", Restaurants, 4),
            BudgetItemConfig::new("Cappuccino", Restaurants, 6),
            BudgetItemConfig::new("Meal for Two, Mid-range Restaurant", Restaurants, 2),
            BudgetItemConfig::new("Domestic Beer (650ml)", Restaurants, 4).optional(),
            // Getting around
            BudgetItemConfig::new("Monthly Metro/Bus Pass", Transportation, 1),
            BudgetItemConfig::new("Auto Rickshaw Ride (5km)", Transportation, 10),
            BudgetItemConfig::new("Cab Ride (10km)", Transportation, 4).optional(),
            BudgetItemConfig::new("Petrol (1L)", Transportation, 20).optional(),
            // Bills
            BudgetItemConfig::new("Electricity Bill", Utilities, 1),
            BudgetItemConfig::new("Broadband Internet", Utilities, 1),
            BudgetItemConfig::new("Mobile Plan", Utilities, 1),
            BudgetItemConfig::new("Cooking Gas Cylinder", Utilities, 1),
            BudgetItemConfig::new("Domestic Help", Utilities, 1).optional(),
            // Lifestyle
            BudgetItemConfig::new("Cinema Ticket", Lifestyle, 2),
            BudgetItemConfig::new("Gym Membership", Lifestyle, 1).optional(),
            BudgetItemConfig::new("Men's Haircut", Lifestyle, 1).for_demographic(Male),
            BudgetItemConfig::new("Women's Salon Visit", Lifestyle, 1).for_demographic(Female),
            // Clothing
            BudgetItemConfig::new("Pair of Jeans", Clothing, 1),
            BudgetItemConfig::new("Formal Shirt", Clothing, 1).for_demographic(Male),
            BudgetItemConfig::new("Cotton Kurti", Clothing, 1).for_demographic(Female),
            BudgetItemConfig::new("Running Shoes", Clothing, 1).optional(),
            // Childcare
            BudgetItemConfig::new("Preschool Monthly Fee", Childcare, 1).optional(),
            BudgetItemConfig::new("Private School Monthly Fee", Childcare, 1).optional(),
        ];

        ItemRegistry { items }
    }

    pub fn get(&self, item: &str) -> Option<&BudgetItemConfig> {
        self.items.iter().find(|c| c.item == item)
    }

    pub fn items(&self) -> &[BudgetItemConfig] {
        &self.items
    }

    pub fn by_group(&self, group: BudgetGroup) -> Vec<&BudgetItemConfig> {
        self.items.iter().filter(|c| c.budget_group == group).collect()
    }

    /// Default monthly quantity, or 1 for items the registry does not know
    pub fn default_qty(&self, item: &str) -> u32 {
        self.get(item).map(|c| c.default_qty).unwrap_or(1)
    }

    /// Budget group for an item; unknown items count as accommodation since
    /// only the accommodation choice can reference them
    pub fn group_of(&self, item: &str) -> BudgetGroup {
        self.get(item)
            .map(|c| c.budget_group)
            .unwrap_or(BudgetGroup::Accommodation)
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_names_are_unique() {
        let registry = ItemRegistry::global();
        let names: HashSet<&str> = registry.items().iter().map(|c| c.item.as_str()).collect();
        assert_eq!(names.len(), registry.count());
    }

    #[test]
    fn test_global_registry_is_shared() {
        assert!(std::ptr::eq(ItemRegistry::global(), ItemRegistry::global()));
    }

    #[test]
    fn test_accommodation_items_registered() {
        let registry = ItemRegistry::global();
        for name in [
            PG_ROOM_CENTRE,
            PG_ROOM_OUTSKIRTS,
            ONE_BHK_CENTRE,
            ONE_BHK_OUTSKIRTS,
            TWO_BHK_CENTRE,
            TWO_BHK_OUTSKIRTS,
            THREE_BHK_CENTRE,
            THREE_BHK_OUTSKIRTS,
        ] {
            let config = registry.get(name).unwrap();
            assert!(config.is_accommodation(), "{} should be accommodation", name);
            assert_eq!(config.default_qty, 1);
        }
        assert_eq!(registry.by_group(BudgetGroup::Accommodation).len(), 8);
    }

    #[test]
    fn test_non_veg_items_are_registered() {
        let registry = ItemRegistry::global();
        for name in NON_VEG_ITEMS {
            assert!(registry.get(name).is_some(), "{} missing from registry", name);
        }
        assert!(is_non_veg("Chicken Biryani"));
        assert!(!is_non_veg("Veg Thali"));
    }

    #[test]
    fn test_defaults_for_unknown_items() {
        let registry = ItemRegistry::global();
        assert_eq!(registry.default_qty("Milk (1L)"), 30);
        assert_eq!(registry.default_qty("Hovercraft Rental"), 1);
        assert_eq!(registry.group_of("Veg Thali"), BudgetGroup::Restaurants);
        assert_eq!(registry.group_of("Hovercraft Rental"), BudgetGroup::Accommodation);
    }

    #[test]
    fn test_demographic_parse() {
        assert_eq!(Demographic::parse("m"), Some(Demographic::Male));
        assert_eq!(Demographic::parse(" Female "), Some(Demographic::Female));
        assert_eq!(Demographic::parse("x"), None);
    }

    #[test]
    fn test_demographic_tags() {
        let registry = ItemRegistry::global();
        assert_eq!(
            registry.get("Men's Haircut").unwrap().demographic_tag,
            Some(Demographic::Male)
        );
        assert_eq!(registry.get("Veg Thali").unwrap().demographic_tag, None);
    }
}
