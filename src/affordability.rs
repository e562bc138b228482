// 💰 Affordability - Salary vs. cost of living
//
// Three questions answered from one selection snapshot:
// - tier: how comfortably does a salary cover a monthly cost?
// - equivalent_salary: what salary in city B matches a salary in city A?
// - evaluate_offer: is an offer in another city worth taking?

use serde::{Deserialize, Serialize};

use crate::budget::compute_monthly_budget;
use crate::catalog::City;
use crate::selection::SelectionState;

// ============================================================================
// TIERS
// ============================================================================

/// Ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffordabilityTier {
    CannotAfford,
    Survival,
    Comfortable,
    SavingWell,
    Luxury,
}

impl AffordabilityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            AffordabilityTier::CannotAfford => "cannot_afford",
            AffordabilityTier::Survival => "survival",
            AffordabilityTier::Comfortable => "comfortable",
            AffordabilityTier::SavingWell => "saving_well",
            AffordabilityTier::Luxury => "luxury",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AffordabilityTier::CannotAfford => "Cannot afford",
            AffordabilityTier::Survival => "Survival mode",
            AffordabilityTier::Comfortable => "Comfortable",
            AffordabilityTier::SavingWell => "Saving well",
            AffordabilityTier::Luxury => "Luxury",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AffordabilityTier::CannotAfford => "Salary does not cover the monthly cost.",
            AffordabilityTier::Survival => "Costs are covered with little left over.",
            AffordabilityTier::Comfortable => "Costs are covered with room for savings.",
            AffordabilityTier::SavingWell => "A large share of the salary can be saved.",
            AffordabilityTier::Luxury => "Salary is at least three times the cost.",
        }
    }
}

/// Classify `salary / cost`. A zero cost is treated as comfortable.
pub fn tier(salary: f64, cost: f64) -> AffordabilityTier {
    if cost <= 0.0 {
        return AffordabilityTier::Comfortable;
    }

    let ratio = salary / cost;
    if ratio < 1.0 {
        AffordabilityTier::CannotAfford
    } else if ratio < 1.3 {
        AffordabilityTier::Survival
    } else if ratio < 2.0 {
        AffordabilityTier::Comfortable
    } else if ratio < 3.0 {
        AffordabilityTier::SavingWell
    } else {
        AffordabilityTier::Luxury
    }
}

/// Tier for a salary against a city's accommodation-inclusive monthly cost
pub fn tier_for_city(salary: f64, city: &City, selection: &SelectionState) -> AffordabilityTier {
    tier(salary, compute_monthly_budget(city, selection).total)
}

// ============================================================================
// SALARY EQUIVALENCE
// ============================================================================

/// `round(salary × cost_b / cost_a)`; the salary itself when `cost_a` is 0
pub fn scale_salary(salary_in_a: f64, cost_a: f64, cost_b: f64) -> f64 {
    if cost_a <= 0.0 {
        return salary_in_a;
    }
    (salary_in_a * cost_b / cost_a).round()
}

/// Monthly costs of both cities under one item set. With `accommodation`
/// set, both cities count that item; otherwise each uses its own choice.
pub fn paired_costs(
    city_a: &City,
    city_b: &City,
    accommodation: Option<&str>,
    selection: &SelectionState,
) -> (f64, f64) {
    match accommodation {
        Some(item) => {
            let mut shared = selection.clone();
            shared.set_accommodation(&city_a.slug, item);
            shared.set_accommodation(&city_b.slug, item);
            (
                compute_monthly_budget(city_a, &shared).total,
                compute_monthly_budget(city_b, &shared).total,
            )
        }
        None => (
            compute_monthly_budget(city_a, selection).total,
            compute_monthly_budget(city_b, selection).total,
        ),
    }
}

/// Salary in city B that matches `salary_in_a` in city A
pub fn equivalent_salary(
    salary_in_a: f64,
    city_a: &City,
    city_b: &City,
    accommodation: Option<&str>,
    selection: &SelectionState,
) -> f64 {
    let (cost_a, cost_b) = paired_costs(city_a, city_b, accommodation, selection);
    scale_salary(salary_in_a, cost_a, cost_b)
}

// ============================================================================
// OFFER EVALUATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferEvaluation {
    pub from_slug: String,
    pub to_slug: String,
    pub cost_from: f64,
    pub cost_to: f64,

    /// Salary needed in the target city to match the current one
    pub equivalent_salary: f64,

    /// `offer - equivalent_salary`; negative means the offer falls short
    pub offer_gap: f64,
    pub offer_gap_percent: i64,

    pub tier_now: AffordabilityTier,
    pub tier_after: AffordabilityTier,
    pub monthly_savings_now: f64,
    pub monthly_savings_after: f64,
    pub worth_it: bool,
}

/// Compare a current monthly salary with an offer in another city
pub fn evaluate_offer(
    current_salary: f64,
    from: &City,
    offer_salary: f64,
    to: &City,
    selection: &SelectionState,
) -> OfferEvaluation {
    let (cost_from, cost_to) = paired_costs(from, to, None, selection);
    let equivalent = scale_salary(current_salary, cost_from, cost_to);
    let offer_gap = offer_salary - equivalent;
    let offer_gap_percent = if equivalent > 0.0 {
        (offer_gap / equivalent * 100.0).round() as i64
    } else {
        0
    };

    OfferEvaluation {
        from_slug: from.slug.clone(),
        to_slug: to.slug.clone(),
        cost_from,
        cost_to,
        equivalent_salary: equivalent,
        offer_gap,
        offer_gap_percent,
        tier_now: tier(current_salary, cost_from),
        tier_after: tier(offer_salary, cost_to),
        monthly_savings_now: current_salary - cost_from,
        monthly_savings_after: offer_salary - cost_to,
        worth_it: offer_salary >= equivalent,
    }
}

// ============================================================================
// TESTS
// ============================================================================
