use eval_tracker_core::{
    BlobKind, BlobSpec, Cell, CoreError, ResultTable, RunConfig, RunFilter, RunInit, RunLocator,
    RunOutcome, RunStore, LEADERBOARD_TABLE_NAME,
};
use eval_tracker_sdk::{
    AuthConfig, FinishRunRequest, SdkConfig, SdkError, SearchRunsRequest, TablePayload,
    TrackerClient,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROJECT: &str = "/entities/team/projects/board";

fn client(server: &MockServer) -> TrackerClient {
    TrackerClient::new(
        SdkConfig::new(server.uri()).with_auth(AuthConfig::ApiKey("secret".to_string())),
    )
    .expect("client build")
}

fn locator() -> RunLocator {
    RunLocator::new("team", "board").unwrap()
}

fn run_json(id: &str, model: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": model,
        "config": {
            "target_model": {"value": model, "desc": null},
            "batch_size": {"value": 8, "desc": null}
        },
        "state": "finished",
        "created_at": "2024-03-01T12:00:00Z"
    })
}

fn table() -> ResultTable {
    ResultTable::from_parts(
        vec![
            "model_name".to_string(),
            "Average".to_string(),
            "drop".to_string(),
            "Elapsed Time".to_string(),
        ],
        vec![vec![
            Cell::from("org/model"),
            Cell::Number(f64::NAN),
            Cell::Number(0.5),
            Cell::Integer(120),
        ]],
    )
    .unwrap()
}

#[tokio::test]
async fn test_search_sends_filter_and_api_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{}/runs/search", PROJECT)))
        .and(header("X-API-Key", "secret"))
        .and(body_json(json!({"filters": {"config.target_model": "org/model"}})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"runs": [run_json("abc", "org/model")]})),
        )
        .mount(&server)
        .await;

    let runs = client(&server)
        .runs()
        .search(
            &locator(),
            &SearchRunsRequest::new().with_filter("config.target_model", "org/model"),
        )
        .await
        .unwrap();

    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].id, "abc");
    assert!(runs[0].created_at.is_some());
}

#[tokio::test]
async fn test_list_runs_unwraps_config_and_filters_locally() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{}/runs/search", PROJECT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "runs": [run_json("abc", "org/model"), run_json("def", "org/other")]
        })))
        .mount(&server)
        .await;

    let records = client(&server)
        .list_runs(&locator(), &RunFilter::target_model("org/model"))
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "abc");
    assert_eq!(records[0].config.get("batch_size"), Some(&json!(8)));
}

#[tokio::test]
async fn test_find_run_rejects_ambiguous_match() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{}/runs/search", PROJECT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "runs": [run_json("abc", "org/model"), run_json("def", "org/model")]
        })))
        .mount(&server)
        .await;

    let error = client(&server)
        .find_run(&locator(), &RunFilter::target_model("org/model"))
        .await
        .unwrap_err();

    assert!(matches!(error, CoreError::RunLookup { count: 2, .. }));
}

#[tokio::test]
async fn test_fetch_latest_table_reads_storage_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!(
            "{}/artifacts/run-abc-openllmleaderboard/versions/latest/tables/open-llm-leaderboard",
            PROJECT
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "columns": ["model_name", "Average", "drop", "Elapsed Time"],
            "data": [["org/model", 0.5, 0.5, 120]]
        })))
        .mount(&server)
        .await;

    let table = client(&server)
        .fetch_latest_table(&locator(), "abc", LEADERBOARD_TABLE_NAME)
        .await
        .unwrap();

    assert_eq!(table.cell("Elapsed Time"), Some(&Cell::Integer(120)));
    assert_eq!(table.cell("drop"), Some(&Cell::Number(0.5)));
}

#[tokio::test]
async fn test_create_session_publishes_uploads_and_finishes() {
    let server = MockServer::start().await;
    let blob_dir = tempfile::tempdir().unwrap();
    std::fs::write(blob_dir.path().join("drop.json"), b"{}").unwrap();

    Mock::given(method("POST"))
        .and(path(format!("{}/runs", PROJECT)))
        .and(body_json(json!({
            "name": "org/model",
            "config": {"target_model": "org/model", "batch_size": 8}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "new1"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{}/runs/new1/tables/open-llm-leaderboard", PROJECT)))
        .and(body_json(json!({
            "columns": ["model_name", "Average", "drop", "Elapsed Time"],
            "data": [["org/model", null, 0.5, 120]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "artifact": "run-new1-openllmleaderboard",
            "version": "v0"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{}/runs/new1/artifacts", PROJECT)))
        .and(query_param("name", "org.model.result"))
        .and(query_param("type", "lm-evaluation-harness-result"))
        .and(header("content-type", "application/gzip"))
        .and(header_exists("X-Artifact-Digest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "org.model.result",
            "version": "v0"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{}/runs/new1/finish", PROJECT)))
        .and(body_json(json!({"exit_code": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "new1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let config = RunConfig::new()
        .with("target_model", "org/model")
        .with("batch_size", 8);
    let mut session = client
        .open_run(&locator(), RunInit::create(config).with_name("org/model"))
        .await
        .unwrap();

    assert_eq!(session.run_id(), "new1");
    session
        .publish_table(LEADERBOARD_TABLE_NAME, &table())
        .await
        .unwrap();
    session
        .upload_blob(&BlobSpec::new("org/model", BlobKind::Result, blob_dir.path()))
        .await
        .unwrap();
    session.finish(RunOutcome::Succeeded).await.unwrap();
}

#[tokio::test]
async fn test_resume_session_and_double_finish() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("{}/runs/abc", PROJECT)))
        .and(body_json(json!({"config": {"average_exclude_tasks": ["drop"]}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_json("abc", "org/model")))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("{}/runs/abc/finish", PROJECT)))
        .and(body_json(json!({"exit_code": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = RunConfig::new();
    config.set_excluded_tasks(&["drop".to_string()]);
    let mut session = client(&server)
        .open_run(&locator(), RunInit::resume("abc", config))
        .await
        .unwrap();

    session.finish(RunOutcome::Failed).await.unwrap();
    assert!(session.finish(RunOutcome::Failed).await.is_err());
    assert!(session
        .publish_table(LEADERBOARD_TABLE_NAME, &table())
        .await
        .is_err());
}

#[tokio::test]
async fn test_upload_missing_directory_fails_before_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{}/runs", PROJECT)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "new1"})))
        .mount(&server)
        .await;

    let mut session = client(&server)
        .open_run(&locator(), RunInit::create(RunConfig::new()))
        .await
        .unwrap();

    let error = session
        .upload_blob(&BlobSpec::new("org/model", BlobKind::Output, "/nonexistent/write_out"))
        .await
        .unwrap_err();
    assert!(matches!(error, CoreError::Remote(_)));
}

#[tokio::test]
async fn test_error_status_mapping() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "internal",
            "message": "database unavailable"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let client = client(&server);
    let http = client.http_client();

    let missing = http.get::<serde_json::Value>(&["missing"]).await.unwrap_err();
    assert!(matches!(missing, SdkError::NotFound(ref p) if p == "/missing"));

    let broken = http.get::<serde_json::Value>(&["broken"]).await.unwrap_err();
    assert!(matches!(broken, SdkError::ServerError(ref m) if m == "database unavailable"));

    let busy = http.get::<serde_json::Value>(&["busy"]).await.unwrap_err();
    assert!(matches!(busy, SdkError::RateLimited { retry_after: Some(30) }));
}

#[tokio::test]
async fn test_remote_failure_surfaces_as_core_remote() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{}/runs/search", PROJECT)))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let error = client(&server)
        .list_runs(&locator(), &RunFilter::target_model("org/model"))
        .await
        .unwrap_err();

    assert!(matches!(error, CoreError::Remote(ref m) if m.contains("unavailable")));
}

#[test]
fn test_table_payload_serializes_nan_as_null() {
    let payload = TablePayload::from(&table());
    assert_eq!(
        serde_json::to_value(&payload).unwrap(),
        json!({
            "columns": ["model_name", "Average", "drop", "Elapsed Time"],
            "data": [["org/model", null, 0.5, 120]]
        })
    );
}

#[tokio::test]
async fn test_names_with_spaces_and_slashes_stay_one_segment() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/entities/my%20team/projects/llm%2Fboard/runs/r%201/finish"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "r 1"})))
        .expect(1)
        .mount(&server)
        .await;

    let locator = RunLocator::new("my team", "llm/board").unwrap();
    let run = client(&server)
        .runs()
        .finish(&locator, "r 1", FinishRunRequest::from(RunOutcome::Succeeded))
        .await
        .unwrap();

    assert_eq!(run.id, "r 1");
}
