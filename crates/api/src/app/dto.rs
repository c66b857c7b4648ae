use serde::Deserialize;

use restock_infra::NotificationOptions;
use restock_policy::PolicyOverrides;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /v1/replenishment/check`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    #[serde(default)]
    pub policy_overrides: PolicyOverrides,
    pub notification: NotificationOptions,
}
