// 🎛️ Selection State - What the user has picked
//
// One value per budgeting view. The presentation layer mutates it through the
// methods below (whole-field replacements) and recomputes every derived view
// from the latest snapshot.
//
// Entries that reference items missing from a city's catalog are inert: they
// contribute nothing and never raise an error.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::debug;

use crate::catalog::City;
use crate::entities::{
    is_non_veg, BudgetItemConfig, Demographic, ItemRegistry, ProfileConfig, ProfileKey,
};

/// Most cities a single view can hold
pub const MAX_CITIES: usize = 5;

/// Quantity bounds for optional (discretionary) items
pub const MIN_OPTIONAL_QTY: u32 = 1;
pub const MAX_OPTIONAL_QTY: u32 = 99;

// ============================================================================
// VIEW MODE
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Monthly,
    Yearly,
}

impl ViewMode {
    pub fn multiplier(&self) -> f64 {
        match self {
            ViewMode::Monthly => 1.0,
            ViewMode::Yearly => 12.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Monthly => "monthly",
            ViewMode::Yearly => "yearly",
        }
    }

    /// Accepts the long form and the one-letter share-link form
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "m" | "monthly" => Some(ViewMode::Monthly),
            "y" | "yearly" => Some(ViewMode::Yearly),
            _ => None,
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectionError {
    #[error("city '{0}' is already selected")]
    DuplicateCity(String),

    #[error("at most {MAX_CITIES} cities can be selected")]
    TooManyCities,

    #[error("at least one city must stay selected")]
    NoCities,

    #[error("city '{0}' is not selected")]
    CityNotSelected(String),
}

// ============================================================================
// SELECTION STATE
// ============================================================================

/// Deserialized through [`RawSelection`], so JSON input gets the same
/// checks and clamping as the mutators below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSelection")]
pub struct SelectionState {
    pub profile: ProfileKey,

    /// Selected cities in display order, all distinct
    pub city_slugs: Vec<String>,

    /// Accommodation item per city; missing cities use the profile default
    pub accommodation_by_slug: BTreeMap<String, String>,

    /// Whether profile defaults use the city-centre variant
    pub use_centre: bool,

    pub excluded_items: BTreeSet<String>,

    /// Optional items the user opted into
    pub included_items: BTreeSet<String>,

    /// Quantity edits; items without an entry use the registry default
    pub quantities: BTreeMap<String, u32>,

    /// Manual prices keyed by `"slug:item"`. Presence marks an override,
    /// so an override of 0 is distinct from no override.
    pub price_overrides: BTreeMap<String, f64>,

    pub view_mode: ViewMode,
    pub veg_only: bool,
    pub demographic: Option<Demographic>,
}

impl Default for SelectionState {
    fn default() -> Self {
        SelectionState {
            profile: ProfileKey::default(),
            city_slugs: Vec::new(),
            accommodation_by_slug: BTreeMap::new(),
            use_centre: true,
            excluded_items: BTreeSet::new(),
            included_items: BTreeSet::new(),
            quantities: BTreeMap::new(),
            price_overrides: BTreeMap::new(),
            view_mode: ViewMode::Monthly,
            veg_only: false,
            demographic: None,
        }
    }
}

/// Wire form of [`SelectionState`] before validation
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawSelection {
    profile: ProfileKey,
    city_slugs: Vec<String>,
    accommodation_by_slug: BTreeMap<String, String>,
    use_centre: bool,
    excluded_items: BTreeSet<String>,
    included_items: BTreeSet<String>,
    quantities: BTreeMap<String, u32>,
    price_overrides: BTreeMap<String, f64>,
    view_mode: ViewMode,
    veg_only: bool,
    demographic: Option<Demographic>,
}

impl Default for RawSelection {
    fn default() -> Self {
        let state = SelectionState::default();
        RawSelection {
            profile: state.profile,
            city_slugs: state.city_slugs,
            accommodation_by_slug: state.accommodation_by_slug,
            use_centre: state.use_centre,
            excluded_items: state.excluded_items,
            included_items: state.included_items,
            quantities: state.quantities,
            price_overrides: state.price_overrides,
            view_mode: state.view_mode,
            veg_only: state.veg_only,
            demographic: state.demographic,
        }
    }
}

impl TryFrom<RawSelection> for SelectionState {
    type Error = SelectionError;

    /// Replay every field through the mutators. An empty city list is kept
    /// as is; a duplicate or a sixth city is an error.
    fn try_from(raw: RawSelection) -> Result<Self, Self::Error> {
        let mut state = SelectionState {
            profile: raw.profile,
            use_centre: raw.use_centre,
            view_mode: raw.view_mode,
            veg_only: raw.veg_only,
            demographic: raw.demographic,
            ..SelectionState::default()
        };

        if !raw.city_slugs.is_empty() {
            state.set_cities(&raw.city_slugs)?;
        }
        for (slug, item) in &raw.accommodation_by_slug {
            state.set_accommodation(slug, item);
        }
        for item in &raw.included_items {
            state.include_item(item);
        }
        for item in &raw.excluded_items {
            state.exclude_item(item);
        }
        for (item, qty) in &raw.quantities {
            state.set_quantity(item, i64::from(*qty));
        }
        for (key, price) in &raw.price_overrides {
            match key.split_once(':') {
                Some((slug, item)) if !slug.is_empty() && !item.is_empty() => {
                    state.set_price_override(slug, item, *price)
                }
                _ => debug!(key = %key, "ignoring malformed price override key"),
            }
        }

        Ok(state)
    }
}

/// Key used in `price_overrides`
pub fn override_key(slug: &str, item: &str) -> String {
    format!("{}:{}", slug, item)
}

impl SelectionState {
    /// Create a selection for the given cities (1 to 5, all distinct)
    pub fn new<S: AsRef<str>>(profile: ProfileKey, slugs: &[S]) -> Result<Self, SelectionError> {
        let mut state = SelectionState {
            profile,
            ..SelectionState::default()
        };
        state.set_cities(slugs)?;
        Ok(state)
    }

    /// Single-city selection, as used by the budgeting flow
    pub fn for_city(profile: ProfileKey, slug: &str) -> Self {
        SelectionState {
            profile,
            city_slugs: vec![slug.to_string()],
            ..SelectionState::default()
        }
    }

    pub fn profile_config(&self) -> &'static ProfileConfig {
        self.profile.config()
    }

    // ========================================================================
    // CITIES
    // ========================================================================

    /// Replace the whole city list
    pub fn set_cities<S: AsRef<str>>(&mut self, slugs: &[S]) -> Result<(), SelectionError> {
        if slugs.is_empty() {
            return Err(SelectionError::NoCities);
        }
        if slugs.len() > MAX_CITIES {
            return Err(SelectionError::TooManyCities);
        }

        let mut next: Vec<String> = Vec::with_capacity(slugs.len());
        for slug in slugs {
            let slug = slug.as_ref();
            if next.iter().any(|s| s == slug) {
                return Err(SelectionError::DuplicateCity(slug.to_string()));
            }
            next.push(slug.to_string());
        }

        self.city_slugs = next;
        Ok(())
    }

    pub fn add_city(&mut self, slug: &str) -> Result<(), SelectionError> {
        if self.city_slugs.iter().any(|s| s == slug) {
            return Err(SelectionError::DuplicateCity(slug.to_string()));
        }
        if self.city_slugs.len() >= MAX_CITIES {
            return Err(SelectionError::TooManyCities);
        }
        self.city_slugs.push(slug.to_string());
        Ok(())
    }

    /// Remove a city along with its accommodation choice and price overrides
    pub fn remove_city(&mut self, slug: &str) -> Result<(), SelectionError> {
        if !self.city_slugs.iter().any(|s| s == slug) {
            return Err(SelectionError::CityNotSelected(slug.to_string()));
        }
        if self.city_slugs.len() == 1 {
            return Err(SelectionError::NoCities);
        }

        self.city_slugs.retain(|s| s != slug);
        self.accommodation_by_slug.remove(slug);
        let prefix = format!("{}:", slug);
        self.price_overrides.retain(|key, _| !key.starts_with(&prefix));
        Ok(())
    }

    // ========================================================================
    // PROFILE & ACCOMMODATION
    // ========================================================================

    /// Switch profile. Accommodation choices fall back to the new profile's
    /// defaults; quantity and price edits are kept.
    pub fn set_profile(&mut self, profile: ProfileKey) {
        self.profile = profile;
        self.accommodation_by_slug.clear();
    }

    /// Choose a city's accommodation. Registry items from other budget
    /// groups are ignored; they are already counted through the item set.
    pub fn set_accommodation(&mut self, slug: &str, item: &str) {
        if let Some(config) = ItemRegistry::global().get(item) {
            if !config.is_accommodation() {
                debug!(slug, item, "ignoring non-accommodation item as accommodation");
                return;
            }
        }
        self.accommodation_by_slug
            .insert(slug.to_string(), item.to_string());
    }

    /// Choose between the centre and outskirts defaults for every city
    pub fn use_centre(&mut self, centre: bool) {
        self.use_centre = centre;
        self.accommodation_by_slug.clear();
    }

    /// Accommodation item counted for a city
    pub fn accommodation_for(&self, slug: &str) -> &str {
        self.accommodation_by_slug
            .get(slug)
            .map(|s| s.as_str())
            .unwrap_or_else(|| self.profile_config().accommodation(self.use_centre))
    }

    // ========================================================================
    // ITEM SET
    // ========================================================================

    pub fn exclude_item(&mut self, item: &str) {
        self.excluded_items.insert(item.to_string());
        self.included_items.remove(item);
    }

    pub fn include_item(&mut self, item: &str) {
        self.excluded_items.remove(item);
        self.included_items.insert(item.to_string());
    }

    /// Flip an item between counted and not counted
    pub fn toggle_item(&mut self, item: &str) {
        let active = match ItemRegistry::global().get(item) {
            // Accommodation is counted through the per-city choice
            Some(config) if config.is_accommodation() => !self.excluded_items.contains(item),
            Some(config) => self.is_active(config),
            None => false,
        };
        if active {
            self.exclude_item(item);
        } else {
            self.include_item(item);
        }
    }

    pub fn set_veg_only(&mut self, veg_only: bool) {
        self.veg_only = veg_only;
    }

    pub fn set_demographic(&mut self, demographic: Option<Demographic>) {
        self.demographic = demographic;
    }

    fn demographic_allows(&self, config: &BudgetItemConfig) -> bool {
        match config.demographic_tag {
            None => true,
            Some(_) if !self.profile_config().exclude_demographic => true,
            Some(tag) => self.demographic == Some(tag),
        }
    }

    /// Whether a registry item is counted by the budget
    pub fn is_active(&self, config: &BudgetItemConfig) -> bool {
        let name = config.item.as_str();
        if config.is_accommodation() || self.excluded_items.contains(name) {
            return false;
        }
        if self.veg_only && is_non_veg(name) {
            return false;
        }
        if !self.demographic_allows(config) {
            return false;
        }

        let profile = self.profile_config();
        let opted_in = self.included_items.contains(name);
        if profile.excludes(name) && !opted_in {
            return false;
        }
        !config.is_optional || opted_in || profile.includes(name)
    }

    /// Registry items counted by the budget, in registry order
    pub fn active_items(&self) -> Vec<&'static BudgetItemConfig> {
        ItemRegistry::global()
            .items()
            .iter()
            .filter(|config| self.is_active(config))
            .collect()
    }

    // ========================================================================
    // QUANTITIES
    // ========================================================================

    pub fn quantity(&self, item: &str) -> u32 {
        self.quantities
            .get(item)
            .copied()
            .unwrap_or_else(|| ItemRegistry::global().default_qty(item))
    }

    /// Set a quantity. Optional items stay within 1..=99; other items only
    /// have a lower bound of 0.
    pub fn set_quantity(&mut self, item: &str, qty: i64) {
        let optional = ItemRegistry::global()
            .get(item)
            .map(|c| c.is_optional)
            .unwrap_or(false);

        let clamped = if optional {
            qty.clamp(MIN_OPTIONAL_QTY as i64, MAX_OPTIONAL_QTY as i64)
        } else {
            qty.clamp(0, u32::MAX as i64)
        };
        self.quantities.insert(item.to_string(), clamped as u32);
    }

    pub fn reset_quantity(&mut self, item: &str) {
        self.quantities.remove(item);
    }

    // ========================================================================
    // PRICE OVERRIDES
    // ========================================================================

    /// Store a manual price. Non-finite values are ignored and negative
    /// values are stored as 0.
    pub fn set_price_override(&mut self, slug: &str, item: &str, price: f64) {
        if !price.is_finite() {
            debug!(slug, item, "ignoring non-finite price override");
            return;
        }
        self.price_overrides
            .insert(override_key(slug, item), price.max(0.0));
    }

    pub fn reset_price_override(&mut self, slug: &str, item: &str) {
        self.price_overrides.remove(&override_key(slug, item));
    }

    pub fn price_override(&self, slug: &str, item: &str) -> Option<f64> {
        self.price_overrides.get(&override_key(slug, item)).copied()
    }

    /// Override if present, else the catalog price. Items the city does not
    /// price have no effective price, even with an override.
    pub fn effective_price(&self, city: &City, item: &str) -> Option<f64> {
        let base = city.base_price(item)?;
        Some(self.price_override(&city.slug, item).unwrap_or(base))
    }

    // ========================================================================
    // VIEW
    // ========================================================================

    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
    }

    /// Drop every edit and return to the profile defaults, keeping the
    /// selected cities and profile
    pub fn reset(&mut self) {
        *self = SelectionState {
            profile: self.profile,
            city_slugs: std::mem::take(&mut self.city_slugs),
            ..SelectionState::default()
        };
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::item::{ONE_BHK_CENTRE, ONE_BHK_OUTSKIRTS, PG_ROOM_CENTRE};

    fn two_cities() -> SelectionState {
        SelectionState::new(ProfileKey::Professional, &["pune", "mumbai"]).unwrap()
    }

    fn active_names(state: &SelectionState) -> Vec<&'static str> {
        state.active_items().iter().map(|c| c.item.as_str()).collect()
    }

    #[test]
    fn test_new_rejects_invalid_city_lists() {
        let empty: [&str; 0] = [];
        assert_eq!(
            SelectionState::new(ProfileKey::Student, &empty),
            Err(SelectionError::NoCities)
        );
        assert_eq!(
            SelectionState::new(ProfileKey::Student, &["pune", "pune"]),
            Err(SelectionError::DuplicateCity("pune".to_string()))
        );
        assert_eq!(
            SelectionState::new(ProfileKey::Student, &["a", "b", "c", "d", "e", "f"]),
            Err(SelectionError::TooManyCities)
        );
    }

    #[test]
    fn test_add_and_remove_city() {
        let mut state = two_cities();
        state.add_city("delhi").unwrap();
        assert_eq!(state.city_slugs, vec!["pune", "mumbai", "delhi"]);

        assert_eq!(
            state.add_city("pune"),
            Err(SelectionError::DuplicateCity("pune".to_string()))
        );

        state.add_city("goa").unwrap();
        state.add_city("jaipur").unwrap();
        assert_eq!(state.add_city("surat"), Err(SelectionError::TooManyCities));

        state.set_price_override("goa", "Veg Thali", 90.0);
        state.set_price_override("pune", "Veg Thali", 70.0);
        state.set_accommodation("goa", ONE_BHK_OUTSKIRTS);
        state.remove_city("goa").unwrap();
        assert!(state.price_override("goa", "Veg Thali").is_none());
        assert_eq!(state.price_override("pune", "Veg Thali"), Some(70.0));
        assert!(!state.accommodation_by_slug.contains_key("goa"));

        assert_eq!(
            state.remove_city("goa"),
            Err(SelectionError::CityNotSelected("goa".to_string()))
        );
    }

    #[test]
    fn test_last_city_cannot_be_removed() {
        let mut state = SelectionState::for_city(ProfileKey::Student, "pune");
        assert_eq!(state.remove_city("pune"), Err(SelectionError::NoCities));
    }

    #[test]
    fn test_accommodation_defaults_follow_profile() {
        let mut state = two_cities();
        assert_eq!(state.accommodation_for("pune"), ONE_BHK_CENTRE);

        state.use_centre(false);
        assert_eq!(state.accommodation_for("pune"), ONE_BHK_OUTSKIRTS);

        state.set_accommodation("pune", PG_ROOM_CENTRE);
        assert_eq!(state.accommodation_for("pune"), PG_ROOM_CENTRE);
        assert_eq!(state.accommodation_for("mumbai"), ONE_BHK_OUTSKIRTS);

        state.set_profile(ProfileKey::Student);
        assert_eq!(state.accommodation_for("pune"), "PG Single Room Outside Centre");
    }

    #[test]
    fn test_active_items_skip_optional_and_accommodation() {
        let state = two_cities();
        let names = active_names(&state);

        assert!(names.contains(&"Veg Thali"));
        assert!(names.contains(&"Gym Membership")); // profile include
        assert!(!names.contains(&"Fish (1kg)")); // optional
        assert!(!names.contains(&ONE_BHK_CENTRE));
        assert!(!names.contains(&"Preschool Monthly Fee")); // profile exclude
    }

    #[test]
    fn test_include_and_exclude_items() {
        let mut state = two_cities();

        state.include_item("Fish (1kg)");
        assert!(active_names(&state).contains(&"Fish (1kg)"));

        state.exclude_item("Fish (1kg)");
        assert!(!active_names(&state).contains(&"Fish (1kg)"));

        // Explicit include restores an item the profile leaves out
        state.include_item("Preschool Monthly Fee");
        assert!(active_names(&state).contains(&"Preschool Monthly Fee"));
    }

    #[test]
    fn test_toggle_item() {
        let mut state = two_cities();

        state.toggle_item("Veg Thali");
        assert!(!active_names(&state).contains(&"Veg Thali"));
        state.toggle_item("Veg Thali");
        assert!(active_names(&state).contains(&"Veg Thali"));
    }

    #[test]
    fn test_veg_mode_drops_non_veg_items() {
        let mut state = two_cities();
        state.set_veg_only(true);
        let names = active_names(&state);

        assert!(!names.contains(&"Chicken Biryani"));
        assert!(!names.contains(&"Eggs (12)"));
        assert!(names.contains(&"Veg Thali"));

        // Including does not beat veg mode
        state.include_item("Mutton (1kg)");
        assert!(!active_names(&state).contains(&"Mutton (1kg)"));
    }

    #[test]
    fn test_demographic_filtering() {
        let mut state = SelectionState::for_city(ProfileKey::Professional, "pune");
        let names = active_names(&state);
        assert!(!names.contains(&"Men's Haircut"));
        assert!(!names.contains(&"Women's Salon Visit"));

        state.set_demographic(Some(Demographic::Female));
        let names = active_names(&state);
        assert!(names.contains(&"Women's Salon Visit"));
        assert!(!names.contains(&"Men's Haircut"));

        state.set_profile(ProfileKey::Couple);
        let names = active_names(&state);
        assert!(names.contains(&"Women's Salon Visit"));
        assert!(names.contains(&"Men's Haircut"));
    }

    #[test]
    fn test_quantity_defaults_and_clamping() {
        let mut state = two_cities();
        assert_eq!(state.quantity("Milk (1L)"), 30);

        state.set_quantity("Milk (1L)", 0);
        assert_eq!(state.quantity("Milk (1L)"), 0);
        state.set_quantity("Milk (1L)", -5);
        assert_eq!(state.quantity("Milk (1L)"), 0);
        state.set_quantity("Milk (1L)", 150);
        assert_eq!(state.quantity("Milk (1L)"), 150);

        state.set_quantity("Fish (1kg)", 0);
        assert_eq!(state.quantity("Fish (1kg)"), 1);
        state.set_quantity("Fish (1kg)", 500);
        assert_eq!(state.quantity("Fish (1kg)"), 99);

        state.reset_quantity("Milk (1L)");
        assert_eq!(state.quantity("Milk (1L)"), 30);
        assert!(!state.quantities.contains_key("Milk (1L)"));
    }

    #[test]
    fn test_price_override_round_trip() {
        let city = City::with_prices("pune", "Pune", &[("Restaurants", "Veg Thali", "1 plate", 80.0)]);
        let mut state = SelectionState::for_city(ProfileKey::Student, "pune");

        state.set_price_override("pune", "Veg Thali", 120.0);
        assert_eq!(state.effective_price(&city, "Veg Thali"), Some(120.0));

        state.reset_price_override("pune", "Veg Thali");
        assert_eq!(state.effective_price(&city, "Veg Thali"), Some(80.0));
        assert!(state.price_overrides.is_empty());
    }

    #[test]
    fn test_zero_override_is_distinct_from_none() {
        let city = City::with_prices("pune", "Pune", &[("Restaurants", "Veg Thali", "1 plate", 80.0)]);
        let mut state = SelectionState::for_city(ProfileKey::Student, "pune");

        state.set_price_override("pune", "Veg Thali", 0.0);
        assert_eq!(state.effective_price(&city, "Veg Thali"), Some(0.0));

        state.set_price_override("pune", "Veg Thali", -10.0);
        assert_eq!(state.price_override("pune", "Veg Thali"), Some(0.0));

        state.set_price_override("pune", "Veg Thali", f64::NAN);
        assert_eq!(state.price_override("pune", "Veg Thali"), Some(0.0));
    }

    #[test]
    fn test_override_for_unpriced_item_is_inert() {
        let city = City::with_prices("pune", "Pune", &[]);
        let mut state = SelectionState::for_city(ProfileKey::Student, "pune");
        state.set_price_override("pune", "Veg Thali", 100.0);
        assert_eq!(state.effective_price(&city, "Veg Thali"), None);
    }

    #[test]
    fn test_reset_keeps_cities_and_profile() {
        let mut state = two_cities();
        state.set_quantity("Milk (1L)", 3);
        state.exclude_item("Veg Thali");
        state.set_view_mode(ViewMode::Yearly);
        state.use_centre(false);

        state.reset();

        assert_eq!(state.city_slugs, vec!["pune", "mumbai"]);
        assert_eq!(state.profile, ProfileKey::Professional);
        assert!(state.quantities.is_empty());
        assert!(state.excluded_items.is_empty());
        assert_eq!(state.view_mode, ViewMode::Monthly);
        assert!(state.use_centre);
    }

    #[test]
    fn test_view_mode_parse() {
        assert_eq!(ViewMode::parse("y"), Some(ViewMode::Yearly));
        assert_eq!(ViewMode::parse("Monthly"), Some(ViewMode::Monthly));
        assert_eq!(ViewMode::parse("weekly"), None);
        assert_eq!(ViewMode::Yearly.multiplier(), 12.0);
    }

    #[test]
    fn test_toggle_accommodation_off_and_on() {
        let mut state = SelectionState::for_city(ProfileKey::Professional, "pune");
        assert_eq!(state.accommodation_for("pune"), ONE_BHK_CENTRE);

        state.toggle_item(ONE_BHK_CENTRE);
        assert!(state.excluded_items.contains(ONE_BHK_CENTRE));

        state.toggle_item(ONE_BHK_CENTRE);
        assert!(!state.excluded_items.contains(ONE_BHK_CENTRE));
    }

    #[test]
    fn test_set_accommodation_ignores_other_groups() {
        let mut state = SelectionState::for_city(ProfileKey::Professional, "pune");
        state.set_accommodation("pune", "Veg Thali");
        assert_eq!(state.accommodation_for("pune"), ONE_BHK_CENTRE);

        state.set_accommodation("pune", PG_ROOM_CENTRE);
        assert_eq!(state.accommodation_for("pune"), PG_ROOM_CENTRE);
    }

    #[test]
    fn test_deserialize_clamps_like_mutators() {
        let state: SelectionState = serde_json::from_str(
            r#"{
                "city_slugs": ["pune"],
                "accommodation_by_slug": {"pune": "Veg Thali"},
                "price_overrides": {"pune:1BHK Apartment in City Centre": -50000, "broken": 10},
                "included_items": ["Fish (1kg)"],
                "quantities": {"Fish (1kg)": 500, "Milk (1L)": 0}
            }"#,
        )
        .unwrap();

        assert_eq!(state.price_override("pune", ONE_BHK_CENTRE), Some(0.0));
        assert_eq!(state.price_overrides.len(), 1);
        assert_eq!(state.quantity("Fish (1kg)"), MAX_OPTIONAL_QTY);
        assert_eq!(state.quantity("Milk (1L)"), 0);
        assert_eq!(state.accommodation_for("pune"), ONE_BHK_CENTRE);
    }

    #[test]
    fn test_deserialize_rejects_bad_city_lists() {
        let duplicate = serde_json::from_str::<SelectionState>(r#"{"city_slugs": ["pune", "pune"]}"#);
        assert!(duplicate.is_err());

        let six = serde_json::from_str::<SelectionState>(
            r#"{"city_slugs": ["a", "b", "c", "d", "e", "f"]}"#,
        );
        assert!(six.is_err());

        let empty: SelectionState = serde_json::from_str("{}").unwrap();
        assert!(empty.city_slugs.is_empty());
        assert_eq!(empty, SelectionState::default());
    }

    #[test]
    fn test_serialized_state_reads_back_unchanged() {
        let mut state = two_cities();
        state.set_accommodation("mumbai", ONE_BHK_OUTSKIRTS);
        state.include_item("Gym Membership");
        state.exclude_item("Cinema Ticket");
        state.set_quantity("Milk (1L)", 12);
        state.set_price_override("pune", "Milk (1L)", 0.0);

        let json = serde_json::to_string(&state).unwrap();
        let back: SelectionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_selection_deserializes_with_defaults() {
        let state: SelectionState =
            serde_json::from_str(r#"{"city_slugs": ["pune"], "veg_only": true}"#).unwrap();
        assert_eq!(state.city_slugs, vec!["pune"]);
        assert!(state.veg_only);
        assert!(state.use_centre);
        assert_eq!(state.profile, ProfileKey::Professional);
    }
}
