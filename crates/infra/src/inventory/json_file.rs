use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use serde_json::{Map, Value as JsonValue};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use restock_inventory::{Item, ItemRow, ItemUpdate};

use crate::ports::{AdapterError, AdapterErrorKind, InventorySource, SaveOptions};

/// Inventory stored as a JSON array of row objects.
///
/// `save` rewrites only the derived keys of matching rows and preserves every
/// other key, then swaps the file in atomically (temp file + rename).
#[derive(Debug)]
pub struct JsonFileInventory {
    path: PathBuf,
    // Serialises read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileInventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_rows(&self, operation: &'static str) -> Result<Vec<JsonValue>, AdapterError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| AdapterError::inventory(operation, AdapterErrorKind::Io, e))?;
        serde_json::from_slice::<Vec<JsonValue>>(&bytes)
            .map_err(|e| AdapterError::inventory(operation, AdapterErrorKind::Malformed, e))
    }

    async fn write_rows(&self, rows: &[JsonValue]) -> Result<(), AdapterError> {
        let bytes = serde_json::to_vec_pretty(rows)
            .map_err(|e| AdapterError::inventory("save", AdapterErrorKind::Malformed, e))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| AdapterError::inventory("save", AdapterErrorKind::Io, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| AdapterError::inventory("save", AdapterErrorKind::Io, e))
    }
}

#[async_trait::async_trait]
impl InventorySource for JsonFileInventory {
    async fn list(&self) -> Result<Vec<Item>, AdapterError> {
        let rows = self.read_rows("list").await?;
        let total = rows.len();

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(total);
        for row in rows {
            match ItemRow::parse_value(row) {
                Ok(item) => {
                    if !seen.insert(item.id().clone()) {
                        warn!(path = %self.path.display(), item_id = %item.id(), "dropping duplicate inventory row");
                        continue;
                    }
                    items.push(item);
                }
                Err(rejection) => {
                    warn!(
                        path = %self.path.display(),
                        item_id = rejection.id.as_deref().unwrap_or("<none>"),
                        reason = %rejection.reason,
                        "dropping invalid inventory row"
                    );
                }
            }
        }

        debug!(path = %self.path.display(), total, valid = items.len(), "inventory loaded");
        Ok(items)
    }

    async fn save(&self, updates: &[ItemUpdate], options: SaveOptions) -> Result<(), AdapterError> {
        let _guard = self.write_lock.lock().await;

        let mut by_id: HashMap<&str, Map<String, JsonValue>> = HashMap::with_capacity(updates.len());
        for update in updates {
            let mut columns = match serde_json::to_value(&update.derived) {
                Ok(JsonValue::Object(map)) => map,
                Ok(_) => Map::new(),
                Err(e) => return Err(AdapterError::inventory("save", AdapterErrorKind::Malformed, e)),
            };
            if options.update_quantities {
                columns.insert(
                    "quantityRemaining".to_string(),
                    JsonValue::from(update.calculated_quantity),
                );
            }
            by_id.insert(update.id.as_str(), columns);
        }

        let mut rows = self.read_rows("save").await?;
        let mut written = HashSet::with_capacity(by_id.len());
        for row in rows.iter_mut() {
            // Only the row `list` keeps for an id: the first structurally valid one.
            let Ok(item) = ItemRow::parse_value(row.clone()) else { continue };
            let Some(columns) = by_id.get(item.id().as_str()) else { continue };
            if !written.insert(item.id().clone()) {
                continue;
            }
            let Some(obj) = row.as_object_mut() else { continue };
            for (key, value) in columns {
                obj.insert(key.clone(), value.clone());
            }
        }

        self.write_rows(&rows).await?;
        debug!(path = %self.path.display(), requested = updates.len(), written = written.len(), "inventory derived attributes saved");
        Ok(())
    }
}
