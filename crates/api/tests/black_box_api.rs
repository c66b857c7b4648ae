use std::sync::Arc;

use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use serde_json::json;

use restock_api::app::services::AppServices;
use restock_core::ItemId;
use restock_infra::{
    AdapterError, AdapterErrorKind, Clock, FixedClock, InMemoryInventory, InMemoryNotificationSink,
    InventorySource, NotificationSink, ReplenishmentCheck, SaveOptions,
};
use restock_inventory::{Item, ItemUpdate, Unit};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(services: AppServices) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = restock_api::app::build_app(Arc::new(services));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn check_url(&self) -> String {
        format!("{}/v1/replenishment/check", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct UnreachableInventory;

#[async_trait::async_trait]
impl InventorySource for UnreachableInventory {
    async fn list(&self) -> Result<Vec<Item>, AdapterError> {
        Err(AdapterError::inventory("list", AdapterErrorKind::Transport, "connection refused"))
    }

    async fn save(&self, _updates: &[ItemUpdate], _options: SaveOptions) -> Result<(), AdapterError> {
        Ok(())
    }
}

fn item(id: &str, qty: f64) -> Item {
    Item::builder(ItemId::new(id).unwrap(), id, Unit::VolumeMl, qty)
        .daily_consumption(8.0)
        .pack_size(250.0)
        .build()
        .unwrap()
}

fn services(
    inventory: Arc<dyn InventorySource>,
    sink: Arc<InMemoryNotificationSink>,
) -> AppServices {
    let sink: Arc<dyn NotificationSink> = sink;
    let clock: Arc<dyn Clock> = Arc::new(FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
    AppServices::new(ReplenishmentCheck::new(inventory, sink, clock))
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn(
        services(Arc::new(InMemoryInventory::new()), Arc::new(InMemoryNotificationSink::new()))
            .with_api_token("s3cret"),
    )
    .await;

    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn check_requires_token_when_configured() {
    let srv = TestServer::spawn(
        services(Arc::new(InMemoryInventory::new()), Arc::new(InMemoryNotificationSink::new()))
            .with_api_token("s3cret"),
    )
    .await;
    let client = reqwest::Client::new();
    let body = json!({ "notification": { "enabled": false } });

    let res = client.post(srv.check_url()).json(&body).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(srv.check_url())
        .bearer_auth("wrong")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .post(srv.check_url())
        .bearer_auth("s3cret")
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn check_returns_summary_and_notifies_once() {
    let store = Arc::new(InMemoryInventory::from_items([item("shampoo", 30.0), item("conditioner", 250.0)]));
    let sink = Arc::new(InMemoryNotificationSink::new());
    let srv = TestServer::spawn(services(store.clone(), sink.clone())).await;

    let res = reqwest::Client::new()
        .post(srv.check_url())
        .json(&json!({
            "policyOverrides": { "reviewHorizonDays": 14 },
            "notification": { "enabled": true, "subjectPrefix": "[Bathroom]" }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let summary: serde_json::Value = res.json().await.unwrap();
    assert_eq!(summary["checkedCount"], 2);
    assert_eq!(summary["notifiedCount"], 1);
    assert_eq!(summary["persistedCount"], 2);
    assert_eq!(summary["dryRun"], false);
    assert_eq!(summary["notification"]["status"], "sent");
    assert_eq!(summary["policy"]["reviewHorizonDays"], 14.0);
    assert_eq!(
        summary["policy"]["targetWindow"],
        json!({ "mode": "per_item", "minDays": 5.0, "maxDays": 5.0 })
    );

    let first = &summary["rows"][0];
    assert_eq!(first["id"], "shampoo");
    assert_eq!(first["needsReplenishment"], true);
    assert_eq!(first["reasonCode"], "WITHIN_TARGET_WINDOW");
    assert_eq!(first["recommendedOrderQty"], 250.0);
    assert_eq!(first["replenishByDate"], "2024-01-02");
    assert_eq!(first["daysUntilDepletion"], 3.75);

    let second = &summary["rows"][1];
    assert_eq!(second["reasonCode"], "SUFFICIENT_STOCK");
    assert_eq!(second["daysUntilDepletion"], 31.25);

    let messages = sink.messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(
        messages[0].subject,
        "[Bathroom] 1 item(s) need replenishment — 2024-01-01"
    );
    assert_eq!(store.saves(), 1);
}

#[tokio::test]
async fn dry_run_returns_preview_without_side_effects() {
    let store = Arc::new(InMemoryInventory::from_items([item("shampoo", 30.0)]));
    let sink = Arc::new(InMemoryNotificationSink::new());
    let srv = TestServer::spawn(services(store.clone(), sink.clone())).await;

    let res = reqwest::Client::new()
        .post(srv.check_url())
        .json(&json!({ "notification": { "enabled": true, "dryRun": true } }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let summary: serde_json::Value = res.json().await.unwrap();
    assert_eq!(summary["notification"]["status"], "dry_run");
    assert!(summary["notification"]["preview"]["subject"]
        .as_str()
        .unwrap()
        .starts_with("[Restock] 1 item(s)"));
    assert_eq!(summary["persistedCount"], 0);
    assert_eq!(store.saves(), 0);
    assert!(sink.messages().is_empty());
}

#[tokio::test]
async fn invalid_overrides_are_a_400_listing_every_field() {
    let srv = TestServer::spawn(services(
        Arc::new(InMemoryInventory::new()),
        Arc::new(InMemoryNotificationSink::new()),
    ))
    .await;

    let res = reqwest::Client::new()
        .post(srv.check_url())
        .json(&json!({
            "policyOverrides": { "reviewHorizonDays": -1, "overrideTargetWindowDays": 99999 },
            "notification": { "enabled": true, "subjectPrefix": "" }
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
    let fields: Vec<_> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        fields,
        vec![
            "policyOverrides.reviewHorizonDays",
            "policyOverrides.overrideTargetWindowDays",
            "notification.subjectPrefix",
        ]
    );
}

#[tokio::test]
async fn malformed_body_is_a_400() {
    let srv = TestServer::spawn(services(
        Arc::new(InMemoryInventory::new()),
        Arc::new(InMemoryNotificationSink::new()),
    ))
    .await;

    let res = reqwest::Client::new()
        .post(srv.check_url())
        .json(&json!({ "policyOverrides": {} }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn adapter_failure_is_a_502_naming_the_collaborator() {
    let srv = TestServer::spawn(services(
        Arc::new(UnreachableInventory),
        Arc::new(InMemoryNotificationSink::new()),
    ))
    .await;

    let res = reqwest::Client::new()
        .post(srv.check_url())
        .json(&json!({ "notification": { "enabled": true } }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "adapter_error");
    assert_eq!(body["collaborator"], "inventory_source");
    assert_eq!(body["operation"], "list");
    assert_eq!(body["kind"], "transport");
}
