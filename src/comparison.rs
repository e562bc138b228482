// ⚖️ Comparison Engine - Budgets across 2 to 5 cities
//
// Ties for cheapest/costliest go to the city listed first in the selection.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::budget::{compute_budget, ComputedBudget};
use crate::catalog::{City, PriceCatalog};
use crate::emi::{HousingEstimate, HousingPurchase};
use crate::selection::{SelectionState, MAX_CITIES};

pub const MIN_COMPARE_CITIES: usize = 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComparisonError {
    #[error("comparison needs {MIN_COMPARE_CITIES} to {MAX_CITIES} cities, got {0}")]
    CityCount(usize),

    #[error("unknown city '{0}'")]
    UnknownCity(String),

    #[error("city '{0}' is listed more than once")]
    DuplicateCity(String),
}

// ============================================================================
// RESULT TYPES
// ============================================================================

/// How a city's total relates to the cheapest one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityDelta {
    pub city_slug: String,
    pub total: f64,
    pub above_cheapest: f64,
    pub percent_above_cheapest: i64,
}

/// An item priced in every compared city, one effective price per city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRow {
    pub item: String,
    pub category: String,
    pub unit: String,
    pub prices: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffDirection {
    Same,
    /// City 2 is costlier
    Costlier,
    /// City 2 is cheaper
    Cheaper,
}

/// Signed per-item difference between exactly two cities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDiff {
    pub item: String,
    pub category: String,
    pub unit: String,
    pub price1: f64,
    pub price2: f64,
    pub diff_percent: i64,
    pub direction: DiffDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub per_city: Vec<ComputedBudget>,
    pub cheapest_slug: String,
    pub costliest_slug: String,
    pub spread_percent: i64,
    pub deltas: Vec<CityDelta>,
    pub item_rows: Vec<ItemRow>,

    /// Only present when exactly two cities are compared
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_diffs: Option<Vec<ItemDiff>>,

    /// 2BHK purchase EMI for every city that prices it
    pub housing: Vec<HousingEstimate>,
}

impl ComparisonResult {
    pub fn budget_for(&self, slug: &str) -> Option<&ComputedBudget> {
        self.per_city.iter().find(|b| b.city_slug == slug)
    }
}

// ============================================================================
// PERCENTAGES
// ============================================================================

/// `round((max - min) / min × 100)`, 0 when `min` is 0
pub fn spread_percent(min: f64, max: f64) -> i64 {
    if min <= 0.0 {
        return 0;
    }
    ((max - min) / min * 100.0).round() as i64
}

/// Signed percent change from `price1` to `price2`. A zero `price1` counts
/// as no change.
pub fn percent_diff(price1: f64, price2: f64) -> (i64, DiffDirection) {
    if price1 == 0.0 {
        return (0, DiffDirection::Same);
    }
    let diff = ((price2 - price1) / price1 * 100.0).round() as i64;
    let direction = match diff {
        d if d > 0 => DiffDirection::Costlier,
        d if d < 0 => DiffDirection::Cheaper,
        _ => DiffDirection::Same,
    };
    (diff, direction)
}

// ============================================================================
// COMPARISON
// ============================================================================

/// Compare budgets for the given cities under one selection
pub fn compare(
    cities: &[&City],
    selection: &SelectionState,
) -> Result<ComparisonResult, ComparisonError> {
    compare_with_housing(cities, selection, &HousingPurchase::default())
}

pub fn compare_with_housing(
    cities: &[&City],
    selection: &SelectionState,
    purchase: &HousingPurchase,
) -> Result<ComparisonResult, ComparisonError> {
    if cities.len() < MIN_COMPARE_CITIES || cities.len() > MAX_CITIES {
        return Err(ComparisonError::CityCount(cities.len()));
    }
    for (idx, city) in cities.iter().enumerate() {
        if cities[..idx].iter().any(|c| c.slug == city.slug) {
            return Err(ComparisonError::DuplicateCity(city.slug.clone()));
        }
    }

    let per_city: Vec<ComputedBudget> = cities
        .iter()
        .map(|city| compute_budget(city, selection))
        .collect();

    // First city in order wins ties
    let mut cheapest = &per_city[0];
    let mut costliest = &per_city[0];
    for budget in &per_city[1..] {
        if budget.total < cheapest.total {
            cheapest = budget;
        }
        if budget.total > costliest.total {
            costliest = budget;
        }
    }

    let deltas = per_city
        .iter()
        .map(|b| CityDelta {
            city_slug: b.city_slug.clone(),
            total: b.total,
            above_cheapest: b.total - cheapest.total,
            percent_above_cheapest: spread_percent(cheapest.total, b.total),
        })
        .collect();

    let item_rows = matched_items(cities, selection);
    let item_diffs = (cities.len() == 2).then(|| diff_rows(&item_rows));

    let housing = cities
        .iter()
        .filter_map(|city| purchase.estimate(city, selection))
        .collect();

    Ok(ComparisonResult {
        cheapest_slug: cheapest.city_slug.clone(),
        costliest_slug: costliest.city_slug.clone(),
        spread_percent: spread_percent(cheapest.total, costliest.total),
        deltas,
        item_rows,
        item_diffs,
        housing,
        per_city,
    })
}

/// Resolve the selection's cities in the catalog and compare them
pub fn compare_selected(
    catalog: &PriceCatalog,
    selection: &SelectionState,
) -> Result<ComparisonResult, ComparisonError> {
    let cities = selection
        .city_slugs
        .iter()
        .map(|slug| {
            catalog
                .get(slug)
                .ok_or_else(|| ComparisonError::UnknownCity(slug.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    compare(&cities, selection)
}

/// Items present in every city with the same (item, category) pair, in the
/// first city's catalog order
fn matched_items(cities: &[&City], selection: &SelectionState) -> Vec<ItemRow> {
    let Some((first, rest)) = cities.split_first() else {
        return Vec::new();
    };

    first
        .entries
        .iter()
        .filter_map(|entry| {
            let mut prices = Vec::with_capacity(cities.len());
            prices.push(selection.effective_price(first, &entry.item)?);
            for city in rest {
                let other = city.entry(&entry.item)?;
                if other.category != entry.category {
                    return None;
                }
                prices.push(selection.effective_price(city, &entry.item)?);
            }
            Some(ItemRow {
                item: entry.item.clone(),
                category: entry.category.clone(),
                unit: entry.unit.clone(),
                prices,
            })
        })
        .collect()
}

fn diff_rows(rows: &[ItemRow]) -> Vec<ItemDiff> {
    rows.iter()
        .filter_map(|row| {
            let (&price1, &price2) = (row.prices.first()?, row.prices.get(1)?);
            let (diff_percent, direction) = percent_diff(price1, price2);
            Some(ItemDiff {
                item: row.item.clone(),
                category: row.category.clone(),
                unit: row.unit.clone(),
                price1,
                price2,
                diff_percent,
                direction,
            })
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
