// Registries - process-wide constant tables
//
// Both tables are built on first use and never change afterwards:
// - item: every trackable budget item with its group and default quantity
// - profile: lifestyle presets (student/professional/couple/family)

pub mod item;
pub mod profile;

pub use item::{
    is_non_veg, BudgetGroup, BudgetItemConfig, Demographic, ItemRegistry, NON_VEG_ITEMS,
};
pub use profile::{ProfileConfig, ProfileKey, ProfileRegistry};
