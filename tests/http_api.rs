use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use contact_relay::application::usecases::SubmitContactUseCase;
use contact_relay::application::{AppResult, EmailRelay, NotificationCenter, SubmissionThrottle};
use contact_relay::domain::ContactMessage;
use contact_relay::infrastructure::{
    clock::ManualClock, memory_store::InMemoryKeyValueStore, simulated_relay::SimulatedRelay,
};
use contact_relay::interfaces::http_api::{build_router, ApiState};
use serde_json::{json, Value};
use tokio::sync::Notify;

struct InstantRelay;

#[async_trait]
impl EmailRelay for InstantRelay {
    async fn send(&self, _message: &ContactMessage) -> AppResult<()> {
        Ok(())
    }
}

struct BlockingRelay {
    release: Arc<Notify>,
    entered: Arc<Notify>,
}

#[async_trait]
impl EmailRelay for BlockingRelay {
    async fn send(&self, _message: &ContactMessage) -> AppResult<()> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(())
    }
}

fn valid_form() -> Value {
    json!({
        "name": "Ada",
        "email": "ada@example.com",
        "message": "Would love to collaborate on something."
    })
}

/// Appends body chunks to `buf` until `needle` shows up.
async fn read_until(resp: &mut reqwest::Response, buf: &mut String, needle: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !buf.contains(needle) {
            let chunk = resp.chunk().await.unwrap().expect("stream ended early");
            buf.push_str(&String::from_utf8_lossy(&chunk));
        }
    })
    .await
    .expect("timed out waiting for stream data");
}

async fn spawn_api(relay: Arc<dyn EmailRelay>) -> String {
    let flow = Arc::new(SubmitContactUseCase::new(
        SubmissionThrottle::new(Arc::new(InMemoryKeyValueStore::new())),
        relay,
        Arc::new(NotificationCenter::new()),
        Arc::new(ManualClock::new(1_700_000_000_000)),
    ));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, build_router(ApiState { flow }))
            .await
            .unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_is_ok() {
    let base = spawn_api(Arc::new(SimulatedRelay::new())).await;

    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn submit_reports_outcome_notification_and_cleared_form() {
    let base = spawn_api(Arc::new(SimulatedRelay::new())).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/contact"))
        .json(&valid_form())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["outcome"]["kind"], "sent");
    assert_eq!(body["notification"]["kind"], "success");
    assert_eq!(body["form"]["message"], "");

    let current: Value = reqwest::get(format!("{base}/notification"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(current["kind"], "success");

    let state: Value = reqwest::get(format!("{base}/state"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["state"], "idle");
}

#[tokio::test]
async fn short_message_is_unprocessable_and_form_kept() {
    let base = spawn_api(Arc::new(SimulatedRelay::new())).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/contact"))
        .json(&json!({ "name": "Ada", "email": "ada@example.com", "message": "hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["outcome"]["kind"], "invalid");
    assert_eq!(body["notification"]["kind"], "warning");
    assert_eq!(body["form"]["message"], "hi");
}

#[tokio::test]
async fn dismiss_clears_notification() {
    let base = spawn_api(Arc::new(SimulatedRelay::new())).await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/contact"))
        .json(&json!({ "name": "", "email": "", "message": "" }))
        .send()
        .await
        .unwrap();

    let resp = client
        .delete(format!("{base}/notification"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let current: Value = reqwest::get(format!("{base}/notification"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(current.is_null());
}

#[tokio::test]
async fn fourth_submit_in_a_burst_is_too_many_requests() {
    let base = spawn_api(Arc::new(InstantRelay)).await;
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let resp = client
            .post(format!("{base}/contact"))
            .json(&valid_form())
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
    }

    let resp = client
        .post(format!("{base}/contact"))
        .json(&valid_form())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 429);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["outcome"]["kind"], "throttled");
    assert_eq!(body["outcome"]["remaining_minutes"], 5);
    assert_eq!(body["notification"]["kind"], "error");
    assert_eq!(body["form"]["name"], "Ada");
}

#[tokio::test]
async fn submit_while_sending_is_conflict_without_notification() {
    let release = Arc::new(Notify::new());
    let entered = Arc::new(Notify::new());
    let base = spawn_api(Arc::new(BlockingRelay {
        release: release.clone(),
        entered: entered.clone(),
    }))
    .await;
    let client = reqwest::Client::new();

    // leave a warning on screen from an earlier attempt
    let resp = client
        .post(format!("{base}/contact"))
        .json(&json!({ "name": "", "email": "", "message": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    let first = {
        let client = client.clone();
        let url = format!("{base}/contact");
        tokio::spawn(async move { client.post(url).json(&valid_form()).send().await })
    };
    entered.notified().await;

    let resp = client
        .post(format!("{base}/contact"))
        .json(&valid_form())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["outcome"]["kind"], "busy");
    assert!(body["notification"].is_null(), "{body}");
    assert_eq!(body["form"]["name"], "Ada");

    release.notify_one();
    let first = first.await.unwrap().unwrap();
    assert_eq!(first.status(), 200);
}

#[tokio::test]
async fn notification_stream_sends_current_then_changes() {
    let base = spawn_api(Arc::new(InstantRelay)).await;
    let client = reqwest::Client::new();

    let mut stream = client
        .get(format!("{base}/notifications/stream"))
        .send()
        .await
        .unwrap();
    assert_eq!(stream.status(), 200);
    assert!(stream.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let mut buf = String::new();
    read_until(&mut stream, &mut buf, "\n\n").await;
    assert!(buf.starts_with("event: notification\ndata: null\n"), "{buf:?}");

    client
        .post(format!("{base}/contact"))
        .json(&json!({ "name": "Ada", "email": "ada@example.com", "message": "hi" }))
        .send()
        .await
        .unwrap();

    read_until(&mut stream, &mut buf, "\"warning\"").await;
    let change = buf.split("\n\n").nth(1).unwrap();
    assert!(change.starts_with("event: notification\ndata: {"), "{change:?}");
    assert!(change.contains("at least 10 characters"), "{change:?}");
}
