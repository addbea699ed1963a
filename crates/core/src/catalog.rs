//! The read-only menu of orderable items.
//!
//! A [`Catalog`] is loaded once at startup from a JSON document and validated
//! into strongly-typed records. It is never mutated afterwards.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{ItemId, Price};

/// Errors that can occur when building a [`Catalog`].
#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    /// The document is not valid catalog JSON.
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// An item has an empty identifier.
    #[error("catalog item '{name}' has an empty id")]
    EmptyId {
        /// Display name of the offending item.
        name: String,
    },
    /// Two items share an identifier.
    #[error("duplicate catalog item id: {0}")]
    DuplicateId(ItemId),
    /// An item has an empty display name.
    #[error("catalog item {0} has an empty name")]
    EmptyName(ItemId),
    /// An item has an empty category label.
    #[error("catalog item {0} has an empty category")]
    EmptyCategory(ItemId),
    /// An item is priced at zero.
    #[error("catalog item {0} must have a positive price")]
    NonPositivePrice(ItemId),
}

/// One orderable item on the menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique item identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Short description, may be empty.
    #[serde(default)]
    pub description: String,
    /// Unit price in the smallest currency unit.
    pub price: Price,
    /// Image URL or path.
    pub image_url: String,
    /// Category label the item is listed under.
    pub category: String,
}

/// A group of items under one category label, as stored in catalog JSON.
#[derive(Debug, Clone, Deserialize)]
struct CategoryGroup {
    name: String,
    items: Vec<GroupedItem>,
}

/// An item inside a [`CategoryGroup`]; the category comes from the group.
#[derive(Debug, Clone, Deserialize)]
struct GroupedItem {
    id: ItemId,
    name: String,
    #[serde(default)]
    description: String,
    price: Price,
    image_url: String,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogDocument {
    categories: Vec<CategoryGroup>,
}

/// Which part of the catalog to show.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Every item, in catalog order.
    #[default]
    All,
    /// Only items in the named category.
    Category(String),
}

impl CategoryFilter {
    /// Interpret a user's category selection.
    ///
    /// A missing selection or one equal to `all_label` selects everything.
    #[must_use]
    pub fn from_selection(selection: Option<&str>, all_label: &str) -> Self {
        match selection {
            None => Self::All,
            Some(label) if label == all_label => Self::All,
            Some(label) => Self::Category(label.to_owned()),
        }
    }

    /// Whether an item passes this filter.
    #[must_use]
    pub fn matches(&self, item: &CatalogItem) -> bool {
        match self {
            Self::All => true,
            Self::Category(category) => item.category == *category,
        }
    }
}

/// The validated, immutable menu.
///
/// Invariants: item ids are unique and non-empty, names and categories are
/// non-empty, and prices are positive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// Build a catalog from a list of items, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns an error if any item violates the catalog invariants.
    pub fn new(items: Vec<CatalogItem>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.id.as_str().trim().is_empty() {
                return Err(CatalogError::EmptyId {
                    name: item.name.clone(),
                });
            }
            if !seen.insert(&item.id) {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
            if item.name.trim().is_empty() {
                return Err(CatalogError::EmptyName(item.id.clone()));
            }
            if item.category.trim().is_empty() {
                return Err(CatalogError::EmptyCategory(item.id.clone()));
            }
            if item.price.is_zero() {
                return Err(CatalogError::NonPositivePrice(item.id.clone()));
            }
        }
        Ok(Self { items })
    }

    /// Parse a catalog from its grouped JSON form.
    ///
    /// ```json
    /// { "categories": [
    ///     { "name": "🍕 PITSA", "items": [
    ///         { "id": "p1", "name": "Pizza Pepperoni", "price": 70000,
    ///           "image_url": "img/pepperoni.png", "description": "..." }
    ///     ] }
    /// ] }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or any item is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        let items = document
            .categories
            .into_iter()
            .flat_map(|group| {
                let category = group.name;
                group.items.into_iter().map(move |item| CatalogItem {
                    id: item.id,
                    name: item.name,
                    description: item.description,
                    price: item.price,
                    image_url: item.image_url,
                    category: category.clone(),
                })
            })
            .collect();
        Self::new(items)
    }

    /// All items in catalog order.
    #[must_use]
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by id.
    #[must_use]
    pub fn get(&self, id: &ItemId) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == *id)
    }

    /// Distinct category labels in order of first appearance.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.items
            .iter()
            .map(|item| item.category.as_str())
            .filter(|category| seen.insert(*category))
            .collect()
    }

    /// Items passing `filter`, in catalog order.
    pub fn filter<'a>(&'a self, filter: &'a CategoryFilter) -> impl Iterator<Item = &'a CatalogItem> {
        self.items.iter().filter(move |item| filter.matches(item))
    }
}
