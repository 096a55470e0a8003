use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use futures::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use tea_timer::{
    create_router,
    services::RecordingEffects,
    state::AppState,
    store::{KeyValueStore, MemoryStore, OPTIONS_KEY},
    tasks::restore_timer,
    utils::ManualClock,
};

const T0: i64 = 1_700_000_000_000;

struct TestApp {
    router: Router,
    clock: ManualClock,
    store: Arc<MemoryStore>,
}

async fn app_with(store: MemoryStore) -> TestApp {
    let clock = ManualClock::new(T0);
    let store = Arc::new(store);
    let state = Arc::new(AppState::new(
        store.clone(),
        Arc::new(RecordingEffects::new()),
        Arc::new(clock.clone()),
    ));
    restore_timer(&state).await;
    TestApp {
        router: create_router(state),
        clock,
        store,
    }
}

async fn app() -> TestApp {
    app_with(MemoryStore::new()).await
}

async fn send(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test(start_paused = true)]
async fn command_lifecycle() {
    let app = app().await;

    let (status, body) = send(&app, Method::POST, "/start", Some(json!({"totalSeconds": 180}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    app.clock.advance_secs(30.0);
    let (_, state) = send(&app, Method::GET, "/state", None).await;
    assert_eq!(state, json!({"status": "running", "totalSeconds": 180, "remainingSeconds": 150.0}));

    send(&app, Method::POST, "/pause", None).await;
    send(&app, Method::POST, "/add-time", Some(json!({"seconds": 30}))).await;
    let (_, state) = send(&app, Method::GET, "/state", None).await;
    assert_eq!(state["status"], "paused");
    assert_eq!(state["totalSeconds"], 210);
    assert_eq!(state["remainingSeconds"], 180.0);

    let (_, badge) = send(&app, Method::GET, "/badge", None).await;
    assert_eq!(badge["text"], "3m");

    send(&app, Method::POST, "/resume", None).await;
    let (status, body) = send(&app, Method::POST, "/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let (_, state) = send(&app, Method::GET, "/state", None).await;
    assert_eq!(state, json!({"status": "idle", "totalSeconds": 0, "remainingSeconds": 0.0}));
}

#[tokio::test(start_paused = true)]
async fn invalid_durations_are_unprocessable() {
    let app = app().await;
    let (status, body) = send(&app, Method::POST, "/start", Some(json!({"totalSeconds": 0}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["ok"], false);

    let (status, _) = send(&app, Method::POST, "/popup/start", Some(json!({"minutes": "00", "seconds": "0"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, state) = send(&app, Method::GET, "/state", None).await;
    assert_eq!(state["status"], "idle");
}

#[tokio::test(start_paused = true)]
async fn popup_start_and_view() {
    let app = app().await;
    let (status, _) = send(&app, Method::POST, "/popup/start", Some(json!({"minutes": "4", "seconds": "0"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, popup) = send(&app, Method::GET, "/popup?minutes=04&seconds=00", None).await;
    assert_eq!(popup["view"]["status"], "running");
    assert_eq!(popup["view"]["countdown"], "04:00");
    assert_eq!(popup["view"]["label"], "remaining");
    assert_eq!(popup["view"]["controls"]["pause"], true);
    assert_eq!(popup["presets"].as_array().unwrap().len(), 3);
    assert_eq!(popup["presets"][1]["active"], true);
    assert_eq!(popup["badge"]["text"], "4m");
}

#[tokio::test(start_paused = true)]
async fn quick_add_adjusts_inputs_when_idle() {
    let app = app().await;
    let (_, body) = send(
        &app,
        Method::POST,
        "/popup/quick-add",
        Some(json!({"add": 30, "minutes": "02", "seconds": "45"})),
    )
    .await;
    assert_eq!(body, json!({"ok": true, "minutes": "03", "seconds": "15"}));

    send(&app, Method::POST, "/start", Some(json!({"totalSeconds": 60}))).await;
    let (_, body) = send(&app, Method::POST, "/popup/quick-add", Some(json!({"add": 60}))).await;
    assert_eq!(body["minutes"], Value::Null);
    let (_, state) = send(&app, Method::GET, "/state", None).await;
    assert_eq!(state["totalSeconds"], 120);
}

#[tokio::test(start_paused = true)]
async fn quick_add_with_huge_chip_saturates() {
    let app = app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/popup/quick-add",
        Some(json!({"add": u32::MAX, "minutes": "01", "seconds": "00"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["minutes"], "99");
}

#[tokio::test(start_paused = true)]
async fn popup_survives_out_of_range_stored_presets() {
    let app = app_with(MemoryStore::new().with_record(
        OPTIONS_KEY,
        json!({"presets": [
            {"label": "Huge", "minutes": u32::MAX, "seconds": 0},
            {"label": "B", "minutes": 500, "seconds": 900},
            {"label": "C", "minutes": 1, "seconds": 0}
        ]}),
    ))
    .await;
    let (status, popup) = send(&app, Method::GET, "/popup", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(popup["presets"][0]["time"], "99:00");
    assert_eq!(popup["presets"][1]["time"], "99:59");
}

#[tokio::test(start_paused = true)]
async fn events_stream_reports_state_changes() {
    let app = app().await;
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/events").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");
    let mut frames = response.into_body().into_data_stream();

    send(&app, Method::POST, "/start", Some(json!({"totalSeconds": 60}))).await;

    let frame = frames.next().await.unwrap().unwrap();
    let frame = String::from_utf8(frame.to_vec()).unwrap();
    assert!(frame.contains("event: stateChanged\n"), "{}", frame);
    assert!(frame.contains("data: {\"type\":\"stateChanged\"}\n"), "{}", frame);
}

#[tokio::test(start_paused = true)]
async fn settings_round_trip_through_store() {
    let app = app_with(
        MemoryStore::new().with_record(OPTIONS_KEY, json!({"presets": [{"label": "Only", "minutes": 1, "seconds": 0}]})),
    )
    .await;

    let (_, form) = send(&app, Method::GET, "/settings", None).await;
    assert_eq!(form["presets"][0]["label"], "Green");
    assert_eq!(form["alarmDuration"], "15");

    let mut edited = form.clone();
    edited["presets"][0]["minutes"] = json!("120");
    edited["alarmDuration"] = json!("1");
    edited["toastText"] = json!("Steeped!");
    let (status, saved) = send(&app, Method::PUT, "/settings", Some(edited)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["presets"][0]["minutes"], 99);
    assert_eq!(saved["alarmDuration"], 3);

    let (_, options) = send(&app, Method::GET, "/options", None).await;
    assert_eq!(options["toastText"], "Steeped!");
    assert_eq!(app.store.get(OPTIONS_KEY).unwrap().unwrap()["alarmDuration"], 3);

    let (_, defaults) = send(&app, Method::GET, "/settings/defaults", None).await;
    assert_eq!(defaults["toastText"], "Your tea is ready! 🍵");
}

#[tokio::test(start_paused = true)]
async fn options_changed_reloads_from_store() {
    let app = app().await;
    app.store.set(OPTIONS_KEY, &json!({"autoDismiss": false})).unwrap();
    let (_, body) = send(&app, Method::POST, "/options/changed", None).await;
    assert_eq!(body["ok"], true);
    let (_, options) = send(&app, Method::GET, "/options", None).await;
    assert_eq!(options["autoDismiss"], false);
}

#[tokio::test(start_paused = true)]
async fn health_reports_version() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}
