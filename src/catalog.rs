use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Restaurant chains tracked by the atlas.
///
/// Declaration order is the catalog enumeration order used to break ties
/// wherever brands are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Brand {
    #[serde(rename = "McDonald's")]
    McDonalds,
    #[serde(rename = "KFC")]
    Kfc,
    #[serde(rename = "Subway")]
    Subway,
    #[serde(rename = "Domino's")]
    Dominos,
    #[serde(rename = "Nando's")]
    Nandos,
    #[serde(rename = "Papa John's")]
    PapaJohns,
}

impl Brand {
    pub const ALL: [Brand; 6] = [
        Brand::McDonalds,
        Brand::Kfc,
        Brand::Subway,
        Brand::Dominos,
        Brand::Nandos,
        Brand::PapaJohns,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Brand::McDonalds => "McDonald's",
            Brand::Kfc => "KFC",
            Brand::Subway => "Subway",
            Brand::Dominos => "Domino's",
            Brand::Nandos => "Nando's",
            Brand::PapaJohns => "Papa John's",
        }
    }

    /// Position in the catalog enumeration.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// Accepts the display name or a loose slug ("mcdonalds", "papa-johns").
impl FromStr for Brand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = slug(s);
        Brand::ALL
            .into_iter()
            .find(|b| slug(b.name()) == wanted)
            .ok_or_else(|| anyhow!("Unknown brand: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Pizza,
    Sandwiches,
    Burgers,
    Grill,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Pizza,
        Category::Sandwiches,
        Category::Burgers,
        Category::Grill,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Pizza => "Pizza",
            Category::Sandwiches => "Sandwiches",
            Category::Burgers => "Burgers",
            Category::Grill => "Grill",
        }
    }

    /// Key mixed into category trend hashes, independent of the display
    /// name. Changing it changes every category figure.
    pub fn hash_id(self) -> &'static str {
        match self {
            Category::Pizza => "Пицца",
            Category::Sandwiches => "Сендвичи",
            Category::Burgers => "Бургеры",
            Category::Grill => "Гриль",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = slug(s);
        Category::ALL
            .into_iter()
            .find(|c| slug(c.name()) == wanted)
            .ok_or_else(|| anyhow!("Unknown category: {}", s))
    }
}

fn slug(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct BrandEntry {
    pub brand: Brand,
    /// Display colour, opaque to the engine.
    pub color: String,
    pub categories: Vec<Category>,
}

/// Immutable brand → colour/category table built once at startup.
#[derive(Debug, Clone)]
pub struct BrandCatalog {
    entries: Vec<BrandEntry>,
}

impl Default for BrandCatalog {
    fn default() -> Self {
        fn entry(brand: Brand, color: &str, categories: &[Category]) -> BrandEntry {
            BrandEntry {
                brand,
                color: color.to_string(),
                categories: categories.to_vec(),
            }
        }
        Self::new(vec![
            entry(Brand::McDonalds, "#FFC72C", &[Category::Burgers]),
            entry(Brand::Kfc, "#E4002B", &[Category::Burgers]),
            entry(Brand::Subway, "#008C15", &[Category::Sandwiches]),
            entry(Brand::Dominos, "#0B439C", &[Category::Pizza]),
            entry(Brand::Nandos, "#E35205", &[Category::Grill]),
            entry(Brand::PapaJohns, "#CC0000", &[Category::Pizza]),
        ])
    }
}

impl BrandCatalog {
    /// Entries are reordered into brand enumeration order; a brand listed
    /// twice keeps its first entry.
    pub fn new(mut entries: Vec<BrandEntry>) -> Self {
        entries.sort_by_key(|e| e.brand);
        entries.dedup_by_key(|e| e.brand);
        Self { entries }
    }

    pub fn entries(&self) -> &[BrandEntry] {
        &self.entries
    }

    pub fn brands(&self) -> impl Iterator<Item = Brand> + '_ {
        self.entries.iter().map(|e| e.brand)
    }

    pub fn entry(&self, brand: Brand) -> Option<&BrandEntry> {
        self.entries.iter().find(|e| e.brand == brand)
    }

    pub fn color(&self, brand: Brand) -> &str {
        self.entry(brand).map(|e| e.color.as_str()).unwrap_or("#888888")
    }

    /// Every category that at least one catalog brand belongs to.
    pub fn categories(&self) -> BTreeSet<Category> {
        self.entries
            .iter()
            .flat_map(|e| e.categories.iter().copied())
            .collect()
    }

    /// The brands a category maps to, in catalog order.
    pub fn category_brands(&self, category: Category) -> Vec<Brand> {
        self.entries
            .iter()
            .filter(|e| e.categories.contains(&category))
            .map(|e| e.brand)
            .collect()
    }
}
