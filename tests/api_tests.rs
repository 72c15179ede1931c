//! End-to-end REST tests against a server bound to an ephemeral port.

#![allow(clippy::panic)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use weight_tracker::config::TrackerConfig;
use weight_tracker::{build_app, in_memory_state};

struct TestServer {
    base: String,
    client: reqwest::Client,
    owner: String,
}

impl TestServer {
    async fn start() -> Self {
        let app = build_app(in_memory_state(&TrackerConfig::default()));
        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Self {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
            owner: uuid::Uuid::new_v4().to_string(),
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> (StatusCode, Value) {
        let Ok(resp) = builder.header("x-owner-id", &self.owner).send().await else {
            panic!("request failed");
        };
        let status = resp.status();
        let body = resp.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let url = format!("{}{path}", self.base);
        self.send(self.client.post(url).json(&body)).await
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let url = format!("{}{path}", self.base);
        self.send(self.client.get(url)).await
    }

    async fn animal(&self, name: &str) -> String {
        let (status, body) = self.post("/api/v1/animals", json!({ "name": name })).await;
        assert_eq!(status, StatusCode::CREATED);
        let Some(id) = body["animal_id"].as_str() else {
            panic!("no animal id in {body}");
        };
        id.to_string()
    }

    async fn weigh(&self, animal: &str, weight: f64, date: &str) -> Value {
        let (status, body) = self
            .post(
                &format!("/api/v1/animals/{animal}/weights"),
                json!({ "weight": weight, "record_date": date }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body
    }
}

fn days_before(base: chrono::DateTime<chrono::Utc>, days: i64) -> String {
    (base - chrono::Duration::days(days)).to_rfc3339()
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::start().await;
    let Ok(resp) = server
        .client
        .get(format!("{}/health", server.base))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(resp.status(), StatusCode::OK);
    let Ok(body) = resp.json::<Value>().await else {
        panic!("bad body");
    };
    assert_eq!(body["backdate_policy"], "chronological");
}

#[tokio::test]
async fn missing_owner_header_is_unauthorized() {
    let server = TestServer::start().await;
    let Ok(resp) = server
        .client
        .post(format!("{}/api/v1/animals", server.base))
        .json(&json!({ "name": "Bessie" }))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn recording_derives_growth_and_updates_summary() {
    let server = TestServer::start().await;
    let animal = server.animal("Bessie").await;
    let now = chrono::Utc::now();

    let first = server.weigh(&animal, 100.0, &days_before(now, 12)).await;
    assert_eq!(first["weight_change"], 0.0);

    let second = server.weigh(&animal, 110.0, &days_before(now, 2)).await;
    assert_eq!(second["weight_change"], 10.0);
    assert_eq!(second["change_percentage"], 10.0);
    assert_eq!(second["growth_rate"], 1.0);

    let (status, body) = server.get(&format!("/api/v1/animals/{animal}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_weight"], 110.0);

    let (status, stats) = server
        .get(&format!("/api/v1/animals/{animal}/weights/stats?period=30"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_gain"], 10.0);
    assert_eq!(stats["record_count"], 2);
    assert_eq!(stats["average_growth_rate"], 1.0);
}

#[tokio::test]
async fn negative_weight_and_bad_date_are_validation_errors() {
    let server = TestServer::start().await;
    let animal = server.animal("Rex").await;
    let path = format!("/api/v1/animals/{animal}/weights");

    let (status, body) = server.post(&path, json!({ "weight": -3.0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation_error");

    let (status, body) = server
        .post(&path, json!({ "weight": 3.0, "record_date": "last tuesday" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation_error");
}

#[tokio::test]
async fn other_owners_see_not_found() {
    let server = TestServer::start().await;
    let animal = server.animal("Daisy").await;
    let obs = server.weigh(&animal, 40.0, "2024-05-01").await;
    let Some(obs_id) = obs["observation_id"].as_str() else {
        panic!("no observation id");
    };

    let Ok(resp) = server
        .client
        .get(format!("{}/api/v1/weights/{obs_id}", server.base))
        .header("x-owner-id", uuid::Uuid::new_v4().to_string())
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_and_delete_keep_summary_consistent() {
    let server = TestServer::start().await;
    let animal = server.animal("Clover").await;
    server.weigh(&animal, 50.0, "2024-01-01").await;
    let last = server.weigh(&animal, 55.0, "2024-01-06").await;
    let Some(last_id) = last["observation_id"].as_str() else {
        panic!("no observation id");
    };

    let url = format!("{}/api/v1/weights/{last_id}", server.base);
    let (status, patched) = server
        .send(server.client.patch(&url).json(&json!({ "weight": 60.0 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["weight_change"], 10.0);
    assert_eq!(patched["growth_rate"], 2.0);

    let (_, body) = server.get(&format!("/api/v1/animals/{animal}")).await;
    assert_eq!(body["current_weight"], 60.0);

    let (status, _) = server.send(server.client.delete(&url)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = server.get(&format!("/api/v1/animals/{animal}")).await;
    assert_eq!(body["current_weight"], 50.0);

    let (status, list) = server
        .get(&format!("/api/v1/animals/{animal}/weights?per_page=10"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["pagination"]["total"], 1);
}

#[tokio::test]
async fn compare_rejects_bad_lists_and_keeps_order() {
    let server = TestServer::start().await;
    let a = server.animal("A").await;
    let b = server.animal("B").await;
    let now = chrono::Utc::now();
    server.weigh(&a, 100.0, &days_before(now, 11)).await;
    server.weigh(&a, 110.0, &days_before(now, 1)).await;

    let (status, body) = server
        .post("/api/v1/weights/compare", json!({ "animal_ids": a }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "invalid_input");

    let (status, _) = server
        .post("/api/v1/weights/compare", json!({ "animal_ids": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = server
        .post(
            "/api/v1/weights/compare",
            json!({ "animal_ids": [b, a], "period": 30 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["animals"][0]["animal_name"], "B");
    assert_eq!(body["animals"][0]["growth_rate"], 0.0);
    assert_eq!(body["animals"][1]["total_gain"], 10.0);
    assert_eq!(body["animals"][1]["records"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn malformed_bodies_and_queries_get_error_envelopes() {
    let server = TestServer::start().await;
    let animal = server.animal("Pip").await;

    let (status, body) = server
        .post(
            &format!("/api/v1/animals/{animal}/weights"),
            json!({ "notes": "no weight" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation_error");

    let (status, body) = server
        .post("/api/v1/weights/compare", json!({ "period": 30 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "invalid_input");

    let (status, body) = server
        .get(&format!("/api/v1/animals/{animal}/weights/stats?period=abc"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation_error");
}
