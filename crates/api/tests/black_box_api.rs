use reqwest::StatusCode;
use serde_json::{Value, json};

use stockroom_infra::{AppConfig, ReleasePolicy};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        Self::spawn_with(AppConfig::default()).await
    }

    async fn spawn_with(config: AppConfig) -> Self {
        // Same router as prod (demo catalogue), bound to an ephemeral port.
        let app = stockroom_api::app::build_app(&config)
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_is_ok() {
    let server = TestServer::spawn().await;
    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn get_inventory_returns_the_seeded_record() {
    let server = TestServer::spawn().await;

    let (status, body) = server.get("/inventory/product-123").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["product_id"], "product-123");
    assert_eq!(body["available"], 100);
    assert_eq!(body["reserved"], 5);
    assert_eq!(body["total"], 105);
    assert_eq!(body["warehouse_id"], "warehouse-001");
    assert_eq!(body["needs_reorder"], false);
    assert!(body["last_updated"].is_string());

    let (status, body) = server.get("/inventory/p404").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PRODUCT_NOT_FOUND");
    assert!(body["error"].is_string());
    assert!(body["message"].as_str().unwrap().contains("p404"));
}

#[tokio::test]
async fn reserve_conflict_then_release_round_trip() {
    let server = TestServer::spawn().await;

    let (status, reserved) = server
        .post(
            "/inventory/reserve",
            json!({ "product_id": "product-123", "quantity": 30, "order_id": "order-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reserved["success"], true);
    assert_eq!(reserved["available"], 70);
    assert_eq!(reserved["reserved"], 35);
    assert_eq!(reserved["message"], "Inventory reserved successfully");
    let reservation_id = reserved["reservation_id"].as_str().unwrap().to_string();
    assert!(reservation_id.starts_with("res-"));

    let (status, body) = server
        .post(
            "/inventory/reserve",
            json!({ "product_id": "product-123", "quantity": 80, "order_id": "order-2" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_INVENTORY");
    assert_eq!(body["available"], 70);

    let (status, released) = server
        .post(
            "/inventory/release",
            json!({ "product_id": "product-123", "quantity": 30, "reservation_id": reservation_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(released["available"], 100);
    assert_eq!(released["reserved"], 5);
    assert!(released.get("reservation_id").is_none());

    // Same reservation cannot be released twice.
    let (status, body) = server
        .post(
            "/inventory/release",
            json!({ "product_id": "product-123", "quantity": 30, "reservation_id": reservation_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_RESERVED");

    let (_, record) = server.get("/inventory/product-123").await;
    assert_eq!(record["available"], 100);
    assert_eq!(record["reserved"], 5);
}

#[tokio::test]
async fn bad_input_is_rejected_with_400() {
    let server = TestServer::spawn().await;

    for quantity in [0, -3] {
        let (status, body) = server
            .post("/inventory/reserve", json!({ "product_id": "product-123", "quantity": quantity }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_REQUEST");
    }

    let (status, body) = server
        .post("/inventory/reserve", json!({ "product_id": "product-123" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_FIELD");

    let (status, body) = server
        .post("/inventory/release", json!({ "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_FIELD");

    let res = server
        .client
        .post(format!("{}/inventory/reserve", server.base_url))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["code"], "INVALID_REQUEST");

    let (_, record) = server.get("/inventory/product-123").await;
    assert_eq!(record["available"], 100);
}

#[tokio::test]
async fn client_reservation_ids_are_idempotent_and_queryable() {
    let server = TestServer::spawn().await;
    let request = json!({
        "product_id": "product-456",
        "quantity": 10,
        "order_id": "order-7",
        "reservation_id": "res-client-1",
    });

    let (status, first) = server.post("/inventory/reserve", request.clone()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["reservation_id"], "res-client-1");
    assert_eq!(first["available"], 240);

    let (status, replay) = server.post("/inventory/reserve", request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay["available"], 240);
    assert_eq!(replay["message"], "Reservation already applied");

    let (status, body) = server
        .post(
            "/inventory/reserve",
            json!({ "product_id": "product-456", "quantity": 11, "reservation_id": "res-client-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "RESERVATION_CONFLICT");

    let (status, reservation) = server.get("/inventory/reservations/res-client-1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reservation["status"], "active");
    assert_eq!(reservation["remaining"], 10);
    assert_eq!(reservation["order_id"], "order-7");

    let (status, body) = server.get("/inventory/reservations/res-missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "RESERVATION_NOT_FOUND");
}

#[tokio::test]
async fn releases_are_checked_against_the_reservation() {
    let server = TestServer::spawn().await;

    let (_, reserved) = server
        .post("/inventory/reserve", json!({ "product_id": "product-123", "quantity": 4 }))
        .await;
    let reservation_id = reserved["reservation_id"].as_str().unwrap().to_string();

    let (status, body) = server
        .post(
            "/inventory/release",
            json!({ "product_id": "product-456", "quantity": 4, "reservation_id": reservation_id }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_REQUEST");

    let (status, body) = server
        .post(
            "/inventory/release",
            json!({ "product_id": "product-123", "quantity": 1, "reservation_id": "res-unknown" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "RESERVATION_NOT_FOUND");

    let (status, partial) = server
        .post(
            "/inventory/release",
            json!({ "product_id": "product-123", "quantity": 1, "reservation_id": reservation_id }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(partial["reservation_remaining"], 3);
}

#[tokio::test]
async fn strict_mode_requires_reservation_ids_on_release() {
    let server = TestServer::spawn_with(AppConfig {
        release_policy: ReleasePolicy::RequireReservation,
        ..AppConfig::default()
    })
    .await;

    let (status, body) = server
        .post("/inventory/release", json!({ "product_id": "product-123", "quantity": 5 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_FIELD");

    let (_, record) = server.get("/inventory/product-123").await;
    assert_eq!(record["reserved"], 5);
}

#[tokio::test]
async fn untracked_release_is_allowed_by_default() {
    let server = TestServer::spawn().await;
    let (status, body) = server
        .post("/inventory/release", json!({ "product_id": "product-123", "quantity": 5 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], 105);
    assert_eq!(body["reserved"], 0);
}

#[tokio::test]
async fn untracked_release_cannot_take_units_of_a_reservation() {
    let server = TestServer::spawn().await;
    let (status, _) = server
        .post("/inventory/reserve", json!({ "product_id": "product-123", "quantity": 10 }))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Only the 5 seeded units are outside any reservation.
    let (status, body) = server
        .post("/inventory/release", json!({ "product_id": "product-123", "quantity": 6 }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INSUFFICIENT_RESERVED");
    assert_eq!(body["reserved"], 5);

    let (_, record) = server.get("/inventory/product-123").await;
    assert_eq!(record["available"], 90);
    assert_eq!(record["reserved"], 15);
}

#[tokio::test]
async fn events_are_tracked() {
    let server = TestServer::spawn().await;

    let (status, body) = server
        .post(
            "/events",
            json!({
                "event_type": "stock_update",
                "product_id": "product-123",
                "quantity": 10,
                "properties": { "source": "cycle_count" },
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["event_id"].as_str().unwrap().starts_with("event-"));
    assert!(body["timestamp"].is_string());

    let (status, body) = server
        .post("/events", json!({ "product_id": "product-123", "quantity": 1 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_FIELD");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_reservations_never_oversell() {
    let server = TestServer::spawn().await;

    // product-789 starts with 50 available.
    let mut tasks = Vec::new();
    for i in 0..10 {
        let client = server.client.clone();
        let url = format!("{}/inventory/reserve", server.base_url);
        tasks.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({ "product_id": "product-789", "quantity": 10, "order_id": format!("order-{i}") }))
                .send()
                .await
                .unwrap()
                .status()
        }));
    }

    let mut ok = 0;
    for t in tasks {
        match t.await.unwrap() {
            StatusCode::OK => ok += 1,
            StatusCode::CONFLICT => {}
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(ok, 5);

    let (_, record) = server.get("/inventory/product-789").await;
    assert_eq!(record["available"], 0);
    assert_eq!(record["reserved"], 52);
    assert_eq!(record["total"], 52);
}
