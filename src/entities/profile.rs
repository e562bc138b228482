// 👥 Lifestyle Profiles - Named presets
//
// A profile picks the default accommodation (city centre and outskirts
// variants) and the items that household type usually does without.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::OnceLock;

use super::item::{
    ONE_BHK_CENTRE, ONE_BHK_OUTSKIRTS, PG_ROOM_CENTRE, PG_ROOM_OUTSKIRTS, THREE_BHK_CENTRE,
    THREE_BHK_OUTSKIRTS, TWO_BHK_CENTRE, TWO_BHK_OUTSKIRTS,
};

// ============================================================================
// PROFILE KEY
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileKey {
    Student,
    #[default]
    Professional,
    Couple,
    Family,
}

impl ProfileKey {
    pub const ALL: [ProfileKey; 4] = [
        ProfileKey::Student,
        ProfileKey::Professional,
        ProfileKey::Couple,
        ProfileKey::Family,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKey::Student => "student",
            ProfileKey::Professional => "professional",
            ProfileKey::Couple => "couple",
            ProfileKey::Family => "family",
        }
    }

    /// Case-insensitive parse of a profile key
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        ProfileKey::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(value))
    }

    pub fn config(&self) -> &'static ProfileConfig {
        ProfileRegistry::global().get(*self)
    }
}

// ============================================================================
// PROFILE CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    pub key: ProfileKey,
    pub label: String,

    /// Default accommodation item in the city centre
    pub accommodation_centre: String,

    /// Default accommodation item outside the centre
    pub accommodation_outskirts: String,

    /// Items this profile leaves out unless the user includes them
    pub exclude_items: BTreeSet<String>,

    /// Optional items this profile counts without asking
    pub include_items: BTreeSet<String>,

    /// Single-person profiles only count items for one demographic
    pub exclude_demographic: bool,
}

impl ProfileConfig {
    pub fn accommodation(&self, centre: bool) -> &str {
        if centre {
            &self.accommodation_centre
        } else {
            &self.accommodation_outskirts
        }
    }

    pub fn excludes(&self, item: &str) -> bool {
        self.exclude_items.contains(item)
    }

    pub fn includes(&self, item: &str) -> bool {
        self.include_items.contains(item)
    }
}

fn set_of(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

const CHILDCARE: [&str; 2] = ["Preschool Monthly Fee", "Private School Monthly Fee"];

fn profile_row(key: ProfileKey) -> ProfileConfig {
    match key {
        ProfileKey::Student => ProfileConfig::row(
            key,
            "Student",
            (PG_ROOM_CENTRE, PG_ROOM_OUTSKIRTS),
            &[
                "Meal for Two, Mid-range Restaurant",
                "Broadband Internet",
                "Cooking Gas Cylinder",
                "Electricity Bill",
                CHILDCARE[0],
                CHILDCARE[1],
            ],
            &[],
            true,
        ),
        ProfileKey::Professional => ProfileConfig::row(
            key,
            "Working Professional",
            (ONE_BHK_CENTRE, ONE_BHK_OUTSKIRTS),
            &CHILDCARE,
            &["Gym Membership"],
            true,
        ),
        ProfileKey::Couple => ProfileConfig::row(
            key,
            "Couple",
            (TWO_BHK_CENTRE, TWO_BHK_OUTSKIRTS),
            &CHILDCARE,
            &[],
            false,
        ),
        ProfileKey::Family => ProfileConfig::row(
            key,
            "Family with Kids",
            (THREE_BHK_CENTRE, THREE_BHK_OUTSKIRTS),
            &["Domestic Beer (650ml)"],
            &["Private School Monthly Fee", "Domestic Help"],
            false,
        ),
    }
}

impl ProfileConfig {
    fn row(
        key: ProfileKey,
        label: &str,
        (centre, outskirts): (&str, &str),
        exclude: &[&str],
        include: &[&str],
        exclude_demographic: bool,
    ) -> Self {
        ProfileConfig {
            key,
            label: label.to_string(),
            accommodation_centre: centre.to_string(),
            accommodation_outskirts: outskirts.to_string(),
            exclude_items: set_of(exclude),
            include_items: set_of(include),
            exclude_demographic,
        }
    }
}

// ============================================================================
// PROFILE REGISTRY
// ============================================================================

#[derive(Debug)]
pub struct ProfileRegistry {
    profiles: Vec<ProfileConfig>,
}

static PROFILE_REGISTRY: OnceLock<ProfileRegistry> = OnceLock::new();

impl ProfileRegistry {
    pub fn global() -> &'static ProfileRegistry {
        PROFILE_REGISTRY.get_or_init(ProfileRegistry::with_defaults)
    }

    fn with_defaults() -> Self {
        ProfileRegistry {
            profiles: ProfileKey::ALL.into_iter().map(profile_row).collect(),
        }
    }

    pub fn get(&self, key: ProfileKey) -> &ProfileConfig {
        // Rows are built in ProfileKey::ALL order, which is declaration order
        &self.profiles[key as usize]
    }

    pub fn profiles(&self) -> &[ProfileConfig] {
        &self.profiles
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::item::ItemRegistry;

    #[test]
    fn test_every_key_has_a_profile() {
        let registry = ProfileRegistry::global();
        assert_eq!(registry.profiles().len(), ProfileKey::ALL.len());
        for key in ProfileKey::ALL {
            assert_eq!(registry.get(key).key, key);
        }
    }

    #[test]
    fn test_profile_rows_follow_key_order() {
        let keys: Vec<ProfileKey> = ProfileRegistry::global().profiles().iter().map(|p| p.key).collect();
        assert_eq!(keys, ProfileKey::ALL.to_vec());
        for (idx, key) in ProfileKey::ALL.into_iter().enumerate() {
            assert_eq!(key as usize, idx);
        }
    }

    #[test]
    fn test_profile_key_parse() {
        assert_eq!(ProfileKey::parse("student"), Some(ProfileKey::Student));
        assert_eq!(ProfileKey::parse(" Family "), Some(ProfileKey::Family));
        assert_eq!(ProfileKey::parse("retiree"), None);
        assert_eq!(ProfileKey::default(), ProfileKey::Professional);
    }

    #[test]
    fn test_profile_accommodation_variants() {
        let student = ProfileKey::Student.config();
        assert_eq!(student.accommodation(true), PG_ROOM_CENTRE);
        assert_eq!(student.accommodation(false), PG_ROOM_OUTSKIRTS);

        let family = ProfileKey::Family.config();
        assert_eq!(family.accommodation(true), THREE_BHK_CENTRE);
    }

    #[test]
    fn test_profile_items_reference_registry() {
        let items = ItemRegistry::global();
        for profile in ProfileRegistry::global().profiles() {
            for name in profile.exclude_items.iter().chain(profile.include_items.iter()) {
                assert!(items.get(name).is_some(), "{} references unknown item {}", profile.label, name);
            }
            assert!(items.get(&profile.accommodation_centre).unwrap().is_accommodation());
            assert!(items.get(&profile.accommodation_outskirts).unwrap().is_accommodation());
        }
    }

    #[test]
    fn test_single_person_profiles_exclude_demographic() {
        assert!(ProfileKey::Student.config().exclude_demographic);
        assert!(ProfileKey::Professional.config().exclude_demographic);
        assert!(!ProfileKey::Couple.config().exclude_demographic);
        assert!(!ProfileKey::Family.config().exclude_demographic);
    }
}
