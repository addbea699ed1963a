//! Application state shared across handlers.

use std::sync::Arc;

use presto_core::{Catalog, CatalogError};

use crate::config::StorefrontConfig;
use crate::services::checkout::CheckoutService;
use crate::services::sessions::SessionRegistry;
use crate::services::submission::{self, OrderSubmitter, SubmissionError};

/// Menu bundled into the binary.
const BUNDLED_MENU: &str = include_str!("../catalog/menu.json");

/// Errors building the application state at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("catalog category {0:?} is also the all-categories label")]
    CategoryLabelClash(String),
    #[error("failed to create order submitter: {0}")]
    Submitter(#[from] SubmissionError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the catalog, the live order sessions and the checkout service.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    sessions: SessionRegistry,
    checkout: CheckoutService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `catalog` - Menu to serve
    /// * `submitter` - Destination for confirmed orders
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        catalog: Catalog,
        submitter: Arc<dyn OrderSubmitter>,
    ) -> Self {
        let sessions =
            SessionRegistry::new(config.submission.phone_policy(), config.session_idle);
        let checkout = CheckoutService::new(submitter, config.submission.timeout);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                sessions,
                checkout,
            }),
        }
    }

    /// Build the state described by `config`: load the catalog and the
    /// configured submitter.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read or fails validation, or
    /// if the submitter cannot be created.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, StartupError> {
        let catalog = load_catalog(&config)?;
        let submitter = submission::from_config(&config.submission)?;
        tracing::info!(
            items = catalog.len(),
            categories = catalog.categories().len(),
            submitter = submitter.name(),
            "Application state ready"
        );
        Ok(Self::new(config, catalog, submitter))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the menu.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the order session registry.
    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry {
        &self.inner.sessions
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }
}

/// Load the configured catalog file, or the bundled menu.
fn load_catalog(config: &StorefrontConfig) -> Result<Catalog, StartupError> {
    let catalog = match &config.catalog_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading catalog");
            Catalog::from_json(&std::fs::read_to_string(path)?)?
        }
        None => Catalog::from_json(BUNDLED_MENU)?,
    };
    check_all_label(&catalog, &config.all_categories_label)?;
    Ok(catalog)
}

/// A category named like the "all" selection could never be picked on its own.
fn check_all_label(catalog: &Catalog, all_label: &str) -> Result<(), StartupError> {
    match catalog
        .categories()
        .into_iter()
        .find(|category| *category == all_label)
    {
        Some(category) => Err(StartupError::CategoryLabelClash(category.to_string())),
        None => Ok(()),
    }
}
