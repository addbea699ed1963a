//! Menu route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use presto_core::{CatalogItem, CategoryFilter, CurrencyCode, Price};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::state::AppState;

/// Category selector entries.
#[derive(Debug, Serialize)]
pub struct CategoriesView {
    /// Label that selects every item.
    pub all_label: String,
    /// The "all" label followed by each category in menu order.
    pub categories: Vec<String>,
}

/// Menu item for display.
#[derive(Debug, Serialize)]
pub struct MenuItemView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub price_display: String,
    pub image_url: String,
    pub category: String,
}

impl MenuItemView {
    fn new(item: &CatalogItem, currency: CurrencyCode) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            price_display: item.price.display(currency),
            image_url: item.image_url.clone(),
            category: item.category.clone(),
        }
    }
}

/// Filtered menu.
#[derive(Debug, Serialize)]
pub struct CatalogView {
    /// The selection that produced this list.
    pub category: String,
    pub items: Vec<MenuItemView>,
}

/// Menu query parameters.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

/// List the category selector entries.
#[instrument(skip(state))]
pub async fn categories(State(state): State<AppState>) -> Json<CategoriesView> {
    let all_label = state.config().all_categories_label.clone();
    let categories = std::iter::once(all_label.clone())
        .chain(state.catalog().categories().into_iter().map(String::from))
        .collect();
    Json(CategoriesView {
        all_label,
        categories,
    })
}

/// List menu items in the selected category.
///
/// An unknown category yields an empty list.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Json<CatalogView> {
    let all_label = &state.config().all_categories_label;
    let filter = CategoryFilter::from_selection(query.category.as_deref(), all_label);
    let currency = state.config().currency;
    let items = state
        .catalog()
        .filter(&filter)
        .map(|item| MenuItemView::new(item, currency))
        .collect();
    let category = match filter {
        CategoryFilter::All => all_label.clone(),
        CategoryFilter::Category(name) => name,
    };
    Json(CatalogView { category, items })
}
