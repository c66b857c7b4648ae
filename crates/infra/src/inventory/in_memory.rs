use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, warn};

use restock_inventory::{DerivedAttributes, Item, ItemUpdate};

use crate::ports::{AdapterError, AdapterErrorKind, InventorySource, SaveOptions};

/// One stored row: caller-owned item plus the derived attributes last written.
#[derive(Debug, Clone, PartialEq)]
pub struct InMemoryRecord {
    pub item: Item,
    pub derived: Option<DerivedAttributes>,
}

/// In-memory inventory store for tests/dev.
///
/// Rows keep insertion order; inserting an existing id replaces the row.
#[derive(Debug, Default)]
pub struct InMemoryInventory {
    inner: RwLock<Vec<InMemoryRecord>>,
    saves: AtomicUsize,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: impl IntoIterator<Item = Item>) -> Self {
        let store = Self::new();
        for item in items {
            store.upsert(item);
        }
        store
    }

    /// Insert or replace by id. A lock poisoned by a panicking writer is
    /// recovered (with a `warn`) rather than dropping the insert.
    pub fn upsert(&self, item: Item) {
        let mut rows = self.inner.write().unwrap_or_else(|poisoned| {
            warn!(item_id = %item.id(), "in-memory inventory lock poisoned; recovering for upsert");
            poisoned.into_inner()
        });
        match rows.iter_mut().find(|r| r.item.id() == item.id()) {
            Some(existing) => existing.item = item,
            None => rows.push(InMemoryRecord { item, derived: None }),
        }
    }

    pub fn records(&self) -> Vec<InMemoryRecord> {
        self.inner.read().map(|rows| rows.clone()).unwrap_or_default()
    }

    /// Number of `save` calls received.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl InventorySource for InMemoryInventory {
    async fn list(&self) -> Result<Vec<Item>, AdapterError> {
        let rows = self
            .inner
            .read()
            .map_err(|_| AdapterError::inventory("list", AdapterErrorKind::Io, "inventory lock poisoned"))?;
        Ok(rows.iter().map(|r| r.item.clone()).collect())
    }

    async fn save(&self, updates: &[ItemUpdate], options: SaveOptions) -> Result<(), AdapterError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        let mut rows = self
            .inner
            .write()
            .map_err(|_| AdapterError::inventory("save", AdapterErrorKind::Io, "inventory lock poisoned"))?;

        for update in updates {
            let Some(row) = rows.iter_mut().find(|r| r.item.id() == &update.id) else {
                debug!(item_id = %update.id, "skipping update for item no longer in inventory");
                continue;
            };
            row.derived = Some(update.derived.clone());
            if options.update_quantities {
                row.item = row.item.with_quantity_remaining(update.calculated_quantity);
            }
        }
        Ok(())
    }
}
