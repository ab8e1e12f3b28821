use crate::catalog::{Brand, BrandCatalog, Category};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Active brand and category selection.
///
/// Transitions consume the current state and return the next one. After any
/// transition every brand required by an active category is active; brands
/// may also be active on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub active_brands: BTreeSet<Brand>,
    pub active_categories: BTreeSet<Category>,
}

/// A single filter transition, as sent by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "target", rename_all = "snake_case")]
pub enum FilterAction {
    ToggleBrand(Brand),
    ToggleCategory(Category),
    SelectAll,
    DeselectAll,
}

impl FilterState {
    /// Everything active.
    pub fn all(catalog: &BrandCatalog) -> Self {
        Self {
            active_brands: catalog.brands().collect(),
            active_categories: catalog.categories(),
        }
    }

    /// Builds a state from explicit parts, adding the brands the given
    /// categories require.
    pub fn from_parts(
        catalog: &BrandCatalog,
        brands: impl IntoIterator<Item = Brand>,
        categories: impl IntoIterator<Item = Category>,
    ) -> Self {
        let active_categories: BTreeSet<Category> = categories.into_iter().collect();
        let mut active_brands: BTreeSet<Brand> = brands.into_iter().collect();
        for &category in &active_categories {
            active_brands.extend(catalog.category_brands(category));
        }
        Self {
            active_brands,
            active_categories,
        }
    }

    pub fn apply(self, catalog: &BrandCatalog, action: FilterAction) -> Self {
        match action {
            FilterAction::ToggleBrand(brand) => self.toggle_brand(brand),
            FilterAction::ToggleCategory(category) => self.toggle_category(catalog, category),
            FilterAction::SelectAll => self.select_all_brands(catalog),
            FilterAction::DeselectAll => self.deselect_all_brands(),
        }
    }

    pub fn toggle_brand(mut self, brand: Brand) -> Self {
        if !self.active_brands.remove(&brand) {
            self.active_brands.insert(brand);
        }
        self
    }

    pub fn toggle_category(mut self, catalog: &BrandCatalog, category: Category) -> Self {
        if self.active_categories.remove(&category) {
            let still_required: BTreeSet<Brand> = self
                .active_categories
                .iter()
                .flat_map(|&c| catalog.category_brands(c))
                .collect();
            for brand in catalog.category_brands(category) {
                if !still_required.contains(&brand) {
                    self.active_brands.remove(&brand);
                }
            }
        } else {
            self.active_categories.insert(category);
            self.active_brands.extend(catalog.category_brands(category));
        }
        self
    }

    pub fn select_all_brands(mut self, catalog: &BrandCatalog) -> Self {
        self.active_brands = catalog.brands().collect();
        self
    }

    pub fn deselect_all_brands(mut self) -> Self {
        self.active_brands.clear();
        self
    }

    pub fn is_brand_active(&self, brand: Brand) -> bool {
        self.active_brands.contains(&brand)
    }

    /// Brands of `category` that are currently active, in catalog order.
    pub fn active_brands_in(&self, catalog: &BrandCatalog, category: Category) -> Vec<Brand> {
        catalog
            .category_brands(category)
            .into_iter()
            .filter(|b| self.active_brands.contains(b))
            .collect()
    }
}
