// 🧾 Price Catalog - Per-city price lists
// The catalog is supplied data: the engine only looks prices up by item name
// and skips anything it cannot find.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

// ============================================================================
// CATALOG ENTRY
// ============================================================================

/// One priced item in one city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCatalogEntry {
    /// Catalog category (e.g., "Restaurants", "Markets")
    pub category: String,

    /// Item name, unique within a city
    pub item: String,

    /// Unit the price refers to (e.g., "1 kg", "month")
    pub unit: String,

    /// Price in rupees, never negative
    pub price: f64,
}

impl PriceCatalogEntry {
    pub fn new(
        category: impl Into<String>,
        item: impl Into<String>,
        unit: impl Into<String>,
        price: f64,
    ) -> Self {
        PriceCatalogEntry {
            category: category.into(),
            item: item.into(),
            unit: unit.into(),
            price,
        }
    }
}

// ============================================================================
// CITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// URL-safe identifier (e.g., "mumbai")
    pub slug: String,

    /// Display name (e.g., "Mumbai")
    pub name: String,

    #[serde(default)]
    pub entries: Vec<PriceCatalogEntry>,
}

impl City {
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        City {
            slug: slug.into(),
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Builder: create a city from `(category, item, unit, price)` rows
    pub fn with_prices(
        slug: impl Into<String>,
        name: impl Into<String>,
        rows: &[(&str, &str, &str, f64)],
    ) -> Self {
        let mut city = City::new(slug, name);
        for (category, item, unit, price) in rows {
            city.push_entry(PriceCatalogEntry::new(*category, *item, *unit, *price));
        }
        city
    }

    /// Add an entry unless the item name is already priced in this city.
    /// Returns false when the entry was rejected.
    pub fn push_entry(&mut self, entry: PriceCatalogEntry) -> bool {
        if !entry.price.is_finite() || entry.price < 0.0 || self.has_item(&entry.item) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    pub fn entry(&self, item: &str) -> Option<&PriceCatalogEntry> {
        self.entries.iter().find(|e| e.item == item)
    }

    /// Catalog price for an item, ignoring any user override
    pub fn base_price(&self, item: &str) -> Option<f64> {
        self.entry(item).map(|e| e.price)
    }

    pub fn has_item(&self, item: &str) -> bool {
        self.entry(item).is_some()
    }
}

// ============================================================================
// PRICE CATALOG
// ============================================================================

/// All cities known to the engine, in load order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceCatalog {
    cities: Vec<City>,
}

/// One CSV row: `city_slug,city_name,category,item,unit,price`
#[derive(Debug, Deserialize)]
struct CatalogRow {
    city_slug: String,
    city_name: String,
    category: String,
    item: String,
    unit: String,
    price: f64,
}

impl PriceCatalog {
    pub fn new() -> Self {
        PriceCatalog { cities: Vec::new() }
    }

    pub fn from_cities(cities: Vec<City>) -> Self {
        let mut catalog = PriceCatalog::new();
        for city in cities {
            catalog.insert(city);
        }
        catalog
    }

    /// Insert or replace a city (matched by slug)
    pub fn insert(&mut self, city: City) {
        match self.cities.iter_mut().find(|c| c.slug == city.slug) {
            Some(existing) => *existing = city,
            None => self.cities.push(city),
        }
    }

    pub fn get(&self, slug: &str) -> Option<&City> {
        self.cities.iter().find(|c| c.slug == slug)
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn slugs(&self) -> Vec<&str> {
        self.cities.iter().map(|c| c.slug.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Load a catalog file, picking the format from the extension (.json or .csv)
    pub fn load(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::load_json(path),
            _ => Self::load_csv(path),
        }
    }

    pub fn load_csv(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)
            .with_context(|| format!("Failed to open catalog CSV: {:?}", path))?;
        let catalog = Self::from_csv_reader(file)?;
        info!(
            cities = catalog.len(),
            path = %path.display(),
            "loaded price catalog"
        );
        Ok(catalog)
    }

    /// Parse CSV rows. Bad prices and duplicate items are skipped, not fatal.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut catalog = PriceCatalog::new();

        for (idx, result) in rdr.deserialize::<CatalogRow>().enumerate() {
            let row = result.with_context(|| format!("Failed to deserialize catalog row {}", idx + 1))?;

            if catalog.get(&row.city_slug).is_none() {
                catalog.cities.push(City::new(row.city_slug.clone(), row.city_name.clone()));
            }
            let Some(city) = catalog.cities.iter_mut().find(|c| c.slug == row.city_slug) else {
                continue;
            };

            let entry = PriceCatalogEntry::new(row.category, row.item, row.unit, row.price);
            let item = entry.item.clone();
            if !city.push_entry(entry) {
                warn!(city = %row.city_slug, item = %item, "skipping invalid or duplicate catalog row");
            }
        }

        Ok(catalog)
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog JSON: {:?}", path))?;
        let catalog = Self::from_json_str(&content)?;
        info!(
            cities = catalog.len(),
            path = %path.display(),
            "loaded price catalog"
        );
        Ok(catalog)
    }

    /// Parse a JSON array of cities, applying the same row filtering as CSV
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: Vec<City> = serde_json::from_str(content).context("Failed to parse catalog JSON")?;

        let mut catalog = PriceCatalog::new();
        let mut seen = HashSet::new();
        for raw_city in raw {
            if !seen.insert(raw_city.slug.clone()) {
                warn!(city = %raw_city.slug, "skipping duplicate city");
                continue;
            }
            let mut city = City::new(raw_city.slug, raw_city.name);
            for entry in raw_city.entries {
                let item = entry.item.clone();
                if !city.push_entry(entry) {
                    warn!(city = %city.slug, item = %item, "skipping invalid or duplicate catalog row");
                }
            }
            catalog.cities.push(city);
        }

        Ok(catalog)
    }
}

// ============================================================================
// TESTS
// ============================================================================
