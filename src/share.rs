// 🔗 Share Links - Selection state ↔ query string
//
// Schema v1, keys in encode order:
//   sv        schema version
//   v         view mode ("m" | "y")
//   c{n}      city slug           (n = 1..=5)
//   acc{n}    accommodation item  for city n
//   s{n}      monthly salary      for city n, omitted when ≤ 0
//
// Decoding never fails: unknown keys, bad values and out-of-range indices
// are dropped and missing keys fall back to defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::entities::ProfileKey;
use crate::selection::{SelectionState, ViewMode, MAX_CITIES};

pub const SHARE_SCHEMA_VERSION: u32 = 1;

// ============================================================================
// QUERY HELPERS
// ============================================================================

/// Split a query string into decoded key/value pairs. A leading `?` is
/// allowed and `+` decodes to a space; undecodable pairs are dropped.
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    let query = query.trim().trim_start_matches('?');

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(key)?;
            let value = decode_component(value)?;
            Some((key, value))
        })
        .collect()
}

fn decode_component(raw: &str) -> Option<String> {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Some(decoded.into_owned()),
        Err(err) => {
            debug!(raw, %err, "dropping undecodable query component");
            None
        }
    }
}

/// Split `"acc2"` into `("acc", 2)` for indices 1..=MAX_CITIES
fn indexed_key(key: &str) -> Option<(&str, usize)> {
    let split = key.find(|c: char| c.is_ascii_digit())?;
    let (name, digits) = key.split_at(split);
    let index: usize = digits.parse().ok()?;
    (1..=MAX_CITIES).contains(&index).then_some((name, index))
}

// ============================================================================
// SHARE STATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedCity {
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accommodation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
}

/// The part of a selection that travels in a share link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShareState {
    #[serde(default)]
    pub cities: Vec<SharedCity>,
    #[serde(default)]
    pub view_mode: ViewMode,
}

#[derive(Default)]
struct PartialCity {
    slug: Option<String>,
    accommodation: Option<String>,
    salary: Option<f64>,
}

impl ShareState {
    /// Snapshot a selection. `salaries` line up with `city_slugs`; missing
    /// or non-positive entries are left out.
    pub fn from_selection(selection: &SelectionState, salaries: &[f64]) -> Self {
        let cities = selection
            .city_slugs
            .iter()
            .take(MAX_CITIES)
            .enumerate()
            .map(|(idx, slug)| SharedCity {
                slug: slug.clone(),
                accommodation: selection.accommodation_by_slug.get(slug).cloned(),
                salary: salaries.get(idx).copied().filter(|s| *s > 0.0),
            })
            .collect();

        ShareState {
            cities,
            view_mode: selection.view_mode,
        }
    }

    pub fn encode(&self) -> String {
        let mut pairs = vec![
            format!("sv={}", SHARE_SCHEMA_VERSION),
            format!(
                "v={}",
                match self.view_mode {
                    ViewMode::Monthly => "m",
                    ViewMode::Yearly => "y",
                }
            ),
        ];

        for (idx, city) in self.cities.iter().take(MAX_CITIES).enumerate() {
            let n = idx + 1;
            pairs.push(format!("c{}={}", n, urlencoding::encode(&city.slug)));
            if let Some(acc) = &city.accommodation {
                pairs.push(format!("acc{}={}", n, urlencoding::encode(acc)));
            }
            if let Some(salary) = city.salary.filter(|s| *s > 0.0 && s.is_finite()) {
                pairs.push(format!("s{}={}", n, salary));
            }
        }

        pairs.join("&")
    }

    pub fn decode(query: &str) -> Self {
        let mut view_mode = ViewMode::default();
        let mut slots: BTreeMap<usize, PartialCity> = BTreeMap::new();

        for (key, value) in parse_query(query) {
            match key.as_str() {
                "sv" => {
                    if value.parse::<u32>().map_or(true, |v| v > SHARE_SCHEMA_VERSION) {
                        debug!(version = %value, "share link from unknown schema version");
                    }
                    continue;
                }
                "v" => {
                    match ViewMode::parse(&value) {
                        Some(mode) => view_mode = mode,
                        None => debug!(value = %value, "ignoring bad view mode"),
                    }
                    continue;
                }
                _ => {}
            }

            let Some((name, index)) = indexed_key(&key) else {
                debug!(key = %key, "ignoring unknown share key");
                continue;
            };
            let slot = slots.entry(index).or_default();
            match name {
                "c" if !value.trim().is_empty() => slot.slug = Some(value.trim().to_string()),
                "acc" if !value.is_empty() => slot.accommodation = Some(value),
                "s" => match value.trim().parse::<f64>() {
                    Ok(salary) if salary > 0.0 && salary.is_finite() => slot.salary = Some(salary),
                    _ => debug!(value = %value, "ignoring bad salary"),
                },
                _ => debug!(key = %key, "ignoring unknown share key"),
            }
        }

        let mut cities: Vec<SharedCity> = Vec::new();
        for slot in slots.into_values() {
            let Some(slug) = slot.slug else {
                continue;
            };
            if cities.iter().any(|c| c.slug == slug) {
                continue;
            }
            cities.push(SharedCity {
                slug,
                accommodation: slot.accommodation,
                salary: slot.salary,
            });
        }

        ShareState { cities, view_mode }
    }

    /// Salaries in city order, 0 where none was shared
    pub fn salaries(&self) -> Vec<f64> {
        self.cities.iter().map(|c| c.salary.unwrap_or(0.0)).collect()
    }

    /// Re-hydrate a selection. Cities and accommodation are replaced only
    /// when the link carries cities.
    pub fn apply_to(&self, selection: &mut SelectionState) {
        selection.set_view_mode(self.view_mode);
        if self.cities.is_empty() {
            return;
        }

        let slugs: Vec<&str> = self.cities.iter().map(|c| c.slug.as_str()).collect();
        if let Err(err) = selection.set_cities(&slugs) {
            debug!(%err, "share link cities rejected");
            return;
        }
        selection.accommodation_by_slug.clear();
        for city in &self.cities {
            if let Some(acc) = &city.accommodation {
                selection.set_accommodation(&city.slug, acc);
            }
        }
    }
}

// ============================================================================
// DEEP LINK
// ============================================================================

/// Entry point for the single-city budgeting flow:
/// `?city=<slug>&profile=<key>&centre=<"0" for outskirts>`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeepLink {
    pub city: Option<String>,
    pub profile: Option<ProfileKey>,
    pub centre: bool,
}

impl DeepLink {
    pub fn parse(query: &str) -> Self {
        let mut link = DeepLink {
            centre: true,
            ..DeepLink::default()
        };

        for (key, value) in parse_query(query) {
            match key.as_str() {
                "city" if !value.trim().is_empty() => link.city = Some(value.trim().to_string()),
                "profile" => link.profile = ProfileKey::parse(&value),
                "centre" => link.centre = value.trim() != "0",
                _ => debug!(key = %key, "ignoring unknown deep-link key"),
            }
        }

        link
    }

    /// Initial selection, or `None` when the link names no city
    pub fn to_selection(&self, default_profile: ProfileKey) -> Option<SelectionState> {
        let slug = self.city.as_deref()?;
        let mut selection = SelectionState::for_city(self.profile.unwrap_or(default_profile), slug);
        selection.use_centre(self.centre);
        Some(selection)
    }
}

// ============================================================================
// TESTS
// ============================================================================
