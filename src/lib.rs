// City Budget - Core Library
// Cost-of-living budgets and salary affordability for Indian cities.
// Exposes all modules for use in CLI, API server, and tests

pub mod catalog;        // Price catalog + CSV/JSON loaders
pub mod entities;       // Item and profile registries
pub mod selection;      // User selection state
pub mod budget;         // Budget engine
pub mod comparison;     // Multi-city comparison
pub mod affordability;  // Tiers, salary equivalence, offers
pub mod emi;            // Loan EMI + housing purchase
pub mod share;          // Share links and deep links
pub mod input;          // Text field sanitation
pub mod config;         // App configuration

// Re-export commonly used types
pub use catalog::{City, PriceCatalog, PriceCatalogEntry};
pub use entities::{
    BudgetGroup, BudgetItemConfig, Demographic, ItemRegistry, ProfileConfig, ProfileKey,
    ProfileRegistry,
};
pub use selection::{SelectionError, SelectionState, ViewMode, MAX_CITIES};
pub use budget::{compute_budget, compute_monthly_budget, ComputedBudget, ItemContribution};
pub use comparison::{
    compare, compare_selected, compare_with_housing, ComparisonError, ComparisonResult,
    DiffDirection, ItemDiff, ItemRow,
};
pub use affordability::{
    equivalent_salary, evaluate_offer, tier, tier_for_city, AffordabilityTier, OfferEvaluation,
};
pub use emi::{emi, EmiBreakdown, HousingEstimate, HousingPurchase};
pub use share::{DeepLink, ShareState, SharedCity, SHARE_SCHEMA_VERSION};
pub use input::{parse_amount, parse_quantity, sanitize_amount, InputError};
pub use config::AppConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
