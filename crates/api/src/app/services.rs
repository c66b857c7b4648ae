use std::sync::Arc;

use tracing::info;

use restock_infra::{
    Clock, InMemoryInventory, InventorySource, JsonFileInventory, LogNotificationSink, NotificationSink,
    ReplenishmentCheck, SystemClock,
};

use crate::config::ApiConfig;

/// Replenishment check over type-erased collaborators.
pub type DynReplenishmentCheck =
    ReplenishmentCheck<Arc<dyn InventorySource>, Arc<dyn NotificationSink>, Arc<dyn Clock>>;

/// Shared state handed to handlers.
pub struct AppServices {
    pub check: Arc<DynReplenishmentCheck>,
    pub api_token: Option<String>,
}

impl AppServices {
    pub fn new(check: DynReplenishmentCheck) -> Self {
        Self {
            check: Arc::new(check),
            api_token: None,
        }
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}

/// Wire collaborators from configuration: JSON file inventory when a path is
/// set (in-memory otherwise), log notifications, system clock.
pub fn build_services(config: &ApiConfig) -> AppServices {
    let inventory: Arc<dyn InventorySource> = match &config.inventory_path {
        Some(path) => {
            info!(path = %path.display(), "using json file inventory");
            Arc::new(JsonFileInventory::new(path.clone()))
        }
        None => {
            info!("RESTOCK_INVENTORY_PATH not set; using empty in-memory inventory");
            Arc::new(InMemoryInventory::new())
        }
    };
    let notifier: Arc<dyn NotificationSink> = Arc::new(LogNotificationSink);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let check = ReplenishmentCheck::new(inventory, notifier, clock)
        .with_defaults(config.defaults.clone())
        .with_subject_prefix(config.subject_prefix.clone());

    AppServices {
        check: Arc::new(check),
        api_token: config.api_token.clone(),
    }
}
