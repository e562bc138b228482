// 🏦 EMI Calculator - Standard loan amortization
//
// emi = P × r × (1+r)^n / ((1+r)^n − 1)
// with r = annual rate / 100 / 12 and n = years × 12.
// Only the final EMI is rounded to the rupee.

use serde::{Deserialize, Serialize};

use crate::catalog::City;
use crate::entities::item::{BUY_PRICE_SQFT_CENTRE, BUY_PRICE_SQFT_OUTSKIRTS};
use crate::selection::SelectionState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EmiBreakdown {
    pub emi: f64,
    pub total_interest: f64,
    pub total_amount: f64,
}

/// Monthly instalment for a loan. Non-positive principal, rate or tenure
/// gives all zeros.
pub fn emi(principal: f64, annual_rate_percent: f64, tenure_years: u32) -> EmiBreakdown {
    let r = annual_rate_percent / 100.0 / 12.0;
    let n = tenure_years.saturating_mul(12);

    if principal.is_nan() || principal <= 0.0 || r.is_nan() || r <= 0.0 || n == 0 {
        return EmiBreakdown::default();
    }

    let growth = (1.0 + r).powf(n as f64);
    let emi = (principal * r * growth / (growth - 1.0)).round();
    let total_amount = emi * n as f64;

    EmiBreakdown {
        emi,
        total_interest: total_amount - principal,
        total_amount,
    }
}

// ============================================================================
// HOUSING PURCHASE SCENARIO
// ============================================================================

/// Loan assumptions for buying a flat, defaulting to a 900 sqft 2BHK
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HousingPurchase {
    pub area_sqft: f64,
    pub down_payment_percent: f64,
    pub annual_rate_percent: f64,
    pub tenure_years: u32,
}

impl Default for HousingPurchase {
    fn default() -> Self {
        HousingPurchase {
            area_sqft: 900.0,
            down_payment_percent: 20.0,
            annual_rate_percent: 8.75,
            tenure_years: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingEstimate {
    pub city_slug: String,
    pub price_per_sqft: f64,
    pub property_price: f64,
    pub down_payment: f64,
    pub principal: f64,
    pub emi: EmiBreakdown,
}

impl HousingPurchase {
    /// Loan figures for a city, using the centre or outskirts per-sqft price
    /// the selection points at (overrides honoured). `None` when the city
    /// has no purchase price.
    pub fn estimate(&self, city: &City, selection: &SelectionState) -> Option<HousingEstimate> {
        let item = if selection.use_centre {
            BUY_PRICE_SQFT_CENTRE
        } else {
            BUY_PRICE_SQFT_OUTSKIRTS
        };
        let price_per_sqft = selection.effective_price(city, item)?;

        let property_price = price_per_sqft * self.area_sqft;
        let down_share = (self.down_payment_percent / 100.0).clamp(0.0, 1.0);
        let down_payment = property_price * down_share;
        let principal = property_price - down_payment;

        Some(HousingEstimate {
            city_slug: city.slug.clone(),
            price_per_sqft,
            property_price,
            down_payment,
            principal,
            emi: emi(principal, self.annual_rate_percent, self.tenure_years),
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================
