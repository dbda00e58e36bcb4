//! Exercises `RestRemote` and `CloudSync` against an in-process stub of the
//! PostgREST table endpoint.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use gymlog::models::{MuscleGroup, WorkoutLog};
use gymlog::store::LocalStore;
use gymlog::sync::{CloudSync, RemoteBackend, RemoteError, RemoteRecord, RestRemote, USER_ID_KEY};

#[derive(Clone, Default)]
struct StubState {
    rows: Arc<Mutex<HashMap<String, Value>>>,
    headers: Arc<Mutex<Vec<HeaderMap>>>,
    fail: bool,
}

async fn select_rows(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Value>>, StatusCode> {
    state.headers.lock().unwrap().push(headers);
    if state.fail {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let user_id = params
        .get("user_id")
        .and_then(|v| v.strip_prefix("eq."))
        .ok_or(StatusCode::BAD_REQUEST)?;
    let rows = state.rows.lock().unwrap();
    Ok(Json(rows.get(user_id).cloned().into_iter().collect()))
}

async fn upsert_row(
    State(state): State<StubState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(row): Json<Value>,
) -> StatusCode {
    let merge = headers
        .get("prefer")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("resolution=merge-duplicates"));
    state.headers.lock().unwrap().push(headers);
    if state.fail {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    if params.get("on_conflict").map(String::as_str) != Some("user_id") || !merge {
        return StatusCode::CONFLICT;
    }
    let Some(user_id) = row["user_id"].as_str().map(str::to_string) else {
        return StatusCode::BAD_REQUEST;
    };
    state.rows.lock().unwrap().insert(user_id, row);
    StatusCode::CREATED
}

async fn spawn_stub(state: StubState) -> SocketAddr {
    let app = Router::new()
        .route("/rest/v1/workout_logs", get(select_rows).post(upsert_row))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn remote_for(addr: SocketAddr) -> RestRemote {
    RestRemote::new(
        format!("http://{}", addr),
        Some("anon-key".to_string()),
        "workout_logs",
    )
}

async fn local_store() -> (LocalStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = LocalStore::init(
        &temp_dir.path().join("gymlog.db"),
        &temp_dir.path().join("fallback.json"),
    )
    .await;
    (store, temp_dir)
}

fn sample_log() -> WorkoutLog {
    let mut log = WorkoutLog::new();
    log.record("2024-01-01", MuscleGroup::Legs);
    log.record("2024-01-02", MuscleGroup::ChestTriceps);
    log
}

#[tokio::test]
async fn test_upsert_then_fetch() {
    let state = StubState::default();
    let addr = spawn_stub(state.clone()).await;
    let remote = remote_for(addr);

    let record = RemoteRecord {
        user_id: "user_abc".to_string(),
        data: sample_log(),
        last_updated: Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap(),
    };
    remote.upsert(&record).await.unwrap();

    let fetched = remote.fetch("user_abc").await.unwrap();
    assert_eq!(fetched, Some(record));

    let headers = state.headers.lock().unwrap();
    assert_eq!(headers[0]["apikey"], "anon-key");
    assert_eq!(headers[0]["authorization"], "Bearer anon-key");
}

#[tokio::test]
async fn test_upsert_replaces_row() {
    let state = StubState::default();
    let addr = spawn_stub(state.clone()).await;
    let remote = remote_for(addr);

    let mut record = RemoteRecord {
        user_id: "user_abc".to_string(),
        data: sample_log(),
        last_updated: Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap(),
    };
    remote.upsert(&record).await.unwrap();

    record.data = WorkoutLog::new();
    record.last_updated = Utc.with_ymd_and_hms(2024, 1, 3, 8, 0, 0).unwrap();
    remote.upsert(&record).await.unwrap();

    assert_eq!(state.rows.lock().unwrap().len(), 1);
    assert_eq!(remote.fetch("user_abc").await.unwrap(), Some(record));
}

#[tokio::test]
async fn test_fetch_missing_row_is_none() {
    let addr = spawn_stub(StubState::default()).await;
    assert_eq!(remote_for(addr).fetch("nobody").await.unwrap(), None);
}

#[tokio::test]
async fn test_fetch_accepts_postgres_offset_timestamps() {
    let state = StubState::default();
    state.rows.lock().unwrap().insert(
        "user_pg".to_string(),
        serde_json::json!({
            "user_id": "user_pg",
            "data": {"2024-01-01": "legs"},
            "last_updated": "2024-01-02T08:00:00.123+00:00",
        }),
    );
    let addr = spawn_stub(state).await;

    let record = remote_for(addr).fetch("user_pg").await.unwrap().unwrap();
    assert_eq!(record.last_updated.timestamp_millis(), 1_704_182_400_123);
    assert_eq!(record.data.get("2024-01-01"), Some("legs"));
}

#[tokio::test]
async fn test_server_error_status() {
    let addr = spawn_stub(StubState {
        fail: true,
        ..StubState::default()
    })
    .await;

    let result = remote_for(addr).fetch("user_abc").await;
    assert!(matches!(
        result,
        Err(RemoteError::ServerError { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_push_and_pull_between_devices() {
    let addr = spawn_stub(StubState::default()).await;

    let (phone, _phone_dir) = local_store().await;
    phone.save_log(&sample_log()).await;
    let phone_sync = CloudSync::new(&phone, Box::new(remote_for(addr)));
    assert!(phone_sync.sync_to_cloud().await);

    // Second device sharing the same anonymous identifier
    let (laptop, _laptop_dir) = local_store().await;
    laptop
        .kv()
        .set(USER_ID_KEY, &phone_sync.get_or_create_user_id())
        .unwrap();
    laptop.save_log_at(&WorkoutLog::new(), 1).await;
    let laptop_sync = CloudSync::new(&laptop, Box::new(remote_for(addr)));

    let status = laptop_sync.get_sync_status().await;
    assert!(status.has_cloud_data);
    assert!(status.conflict_detected);

    let pulled = laptop_sync.sync_from_cloud().await.unwrap();
    laptop.save_log(&pulled).await;

    assert_eq!(laptop.load_log().await, sample_log());
    assert!(!laptop_sync.should_sync_from_cloud().await);
}

#[tokio::test]
async fn test_failing_server_degrades_to_negative_results() {
    let addr = spawn_stub(StubState {
        fail: true,
        ..StubState::default()
    })
    .await;
    let (store, _dir) = local_store().await;
    store.save_log(&sample_log()).await;
    let sync = CloudSync::new(&store, Box::new(remote_for(addr)));

    assert!(!sync.sync_to_cloud().await);
    assert_eq!(sync.sync_from_cloud().await, None);
    assert!(!sync.should_sync_from_cloud().await);
    assert!(!sync.get_sync_status().await.has_cloud_data);
    assert_eq!(store.load_log().await, sample_log());
}

#[tokio::test]
async fn test_unreachable_server_degrades_to_negative_results() {
    // Grab a free port and release it so nothing is listening there
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (store, _dir) = local_store().await;
    let sync = CloudSync::new(&store, Box::new(remote_for(addr)));

    assert!(!sync.sync_to_cloud().await);
    assert_eq!(sync.sync_from_cloud().await, None);
    assert!(!sync.get_sync_status().await.conflict_detected);
}
