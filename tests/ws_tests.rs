//! WebSocket event stream tests.

#![allow(clippy::panic)]

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;

use weight_tracker::config::TrackerConfig;
use weight_tracker::{build_app, in_memory_state};

type Socket =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn start() -> std::net::SocketAddr {
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
    addr
}

async fn connect(addr: std::net::SocketAddr, owner: &str) -> Socket {
    let Ok(mut request) = format!("ws://{addr}/ws").into_client_request() else {
        panic!("bad ws url");
    };
    let Ok(value) = HeaderValue::from_str(owner) else {
        panic!("bad header");
    };
    request.headers_mut().insert("x-owner-id", value);
    let Ok((socket, _)) = tokio_tungstenite::connect_async(request).await else {
        panic!("ws connect failed");
    };
    socket
}

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(5), socket.next()).await
        else {
            panic!("no message within timeout");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else {
                panic!("non-JSON frame");
            };
            return value;
        }
    }
}

async fn create_animal(client: &reqwest::Client, addr: std::net::SocketAddr, owner: &str) -> String {
    let Ok(resp) = client
        .post(format!("http://{addr}/api/v1/animals"))
        .header("x-owner-id", owner)
        .json(&json!({ "name": "Bessie" }))
        .send()
        .await
    else {
        panic!("request failed");
    };
    let Ok(body) = resp.json::<Value>().await else {
        panic!("bad body");
    };
    let Some(id) = body["animal_id"].as_str() else {
        panic!("no animal id");
    };
    id.to_string()
}

#[tokio::test]
async fn subscriber_receives_recorded_and_summary_events() {
    let addr = start().await;
    let client = reqwest::Client::new();
    let owner = uuid::Uuid::new_v4().to_string();
    let animal = create_animal(&client, addr, &owner).await;

    let mut socket = connect(addr, &owner).await;
    let subscribe = json!({
        "id": "sub-1",
        "type": "command",
        "timestamp": chrono::Utc::now(),
        "payload": { "command": "subscribe", "animal_ids": [animal] }
    });
    let Ok(()) = socket.send(Message::text(subscribe.to_string())).await else {
        panic!("send failed");
    };
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "response");
    assert_eq!(reply["id"], "sub-1");
    assert_eq!(reply["payload"]["count"], 1);

    let Ok(resp) = client
        .post(format!("http://{addr}/api/v1/animals/{animal}/weights"))
        .header("x-owner-id", &owner)
        .json(&json!({ "weight": 42.0 }))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert!(resp.status().is_success());

    let recorded = next_json(&mut socket).await;
    assert_eq!(recorded["type"], "event");
    assert_eq!(recorded["payload"]["event_type"], "observation_recorded");
    let summary = next_json(&mut socket).await;
    assert_eq!(summary["payload"]["event_type"], "summary_updated");
    assert_eq!(summary["payload"]["current_weight"], 42.0);
}

#[tokio::test]
async fn foreign_animals_cannot_be_subscribed() {
    let addr = start().await;
    let client = reqwest::Client::new();
    let owner = uuid::Uuid::new_v4().to_string();
    let animal = create_animal(&client, addr, &owner).await;

    let stranger = uuid::Uuid::new_v4().to_string();
    let mut socket = connect(addr, &stranger).await;
    let subscribe = json!({
        "id": "sub-2",
        "type": "command",
        "timestamp": chrono::Utc::now(),
        "payload": { "command": "subscribe", "animal_ids": [animal] }
    });
    let Ok(()) = socket.send(Message::text(subscribe.to_string())).await else {
        panic!("send failed");
    };
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["payload"]["count"], 0);
    assert_eq!(reply["payload"]["rejected"][0], animal.as_str());
}

#[tokio::test]
async fn malformed_frame_gets_error_reply() {
    let addr = start().await;
    let mut socket = connect(addr, &uuid::Uuid::new_v4().to_string()).await;
    let Ok(()) = socket.send(Message::text("{not json")).await else {
        panic!("send failed");
    };
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["payload"]["code"], 400);
}
