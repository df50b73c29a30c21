// Router-level tests: validation failures, response shapes, and the
// error-taxonomy mapping, with the vector store populated directly and
// Ollama mocked.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use grant_rag::api::server::{AppState, router};
use grant_rag::config::Config;
use grant_rag::database::lancedb::{EmbeddingRecord, StoredChunk, VectorStore};
use grant_rag::embeddings::ollama::OllamaClient;
use grant_rag::grants::GrantMetadata;
use grant_rag::pipeline::{GENERATION_FAILURE_PLACEHOLDER, GrantPipeline};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIM: usize = 8;

fn axis(index: usize, value: f32) -> Vec<f32> {
    let mut vector = vec![0.01_f32; DIM];
    vector[index] = value;
    vector
}

fn chunk_record(
    seq: u32,
    vector: Vec<f32>,
    program_id: &str,
    program_name: &str,
    chunk_index: u32,
    content: String,
) -> EmbeddingRecord {
    EmbeddingRecord {
        id: format!("row-{}", seq),
        vector,
        seq,
        chunk: StoredChunk {
            content,
            chunk_index,
            metadata: GrantMetadata {
                program_id: program_id.to_string(),
                program_name: program_name.to_string(),
                program_status: "Open".to_string(),
                location: "Ontario".to_string(),
                country: "Canada".to_string(),
                ..GrantMetadata::default()
            },
            created_at: "2024-01-01T00:00:00Z".to_string(),
        },
    }
}

async fn state_for(dir: &Path, server: &MockServer) -> AppState {
    let mut config = Config::load(dir).expect("config should load");
    let url = Url::parse(&server.uri()).expect("mock server uri parses");
    config.ollama.host = url.host_str().expect("uri has host").to_string();
    config.ollama.port = url.port().expect("uri has port");
    config.ollama.embedding_dimension = DIM as u32;
    config.ollama.timeout_seconds = 5;

    let mut store = VectorStore::create(&config).await.expect("create store");
    store
        .store_embeddings_batch(vec![
            chunk_record(
                0,
                axis(0, 1.0),
                "1",
                "Emerging Artist Fellowship",
                0,
                "Funding for individual artists. ".repeat(20),
            ),
            chunk_record(
                1,
                axis(0, 0.9),
                "1",
                "Emerging Artist Fellowship",
                1,
                "Applicants must be residents aged 18-30.".to_string(),
            ),
            chunk_record(
                2,
                axis(1, 1.0),
                "2",
                "Corporate Growth Program",
                0,
                "Funding for incorporated companies.".to_string(),
            ),
        ])
        .await
        .expect("store embeddings");

    let client = Arc::new(
        OllamaClient::new(&config.ollama)
            .expect("client should build")
            .with_retry_attempts(1),
    );

    AppState {
        store: Arc::new(store),
        client: Arc::clone(&client),
        pipeline: Arc::new(GrantPipeline::new(client)),
    }
}

async fn mount_query_embedding(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/embed"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "embedding": axis(0, 1.0) })),
        )
        .mount(server)
        .await;
}

async fn post_json(state: AppState, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds");

    let response = router(state).oneshot(request).await.expect("router responds");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let value = serde_json::from_slice(&bytes).expect("response is json");
    (status, value)
}

#[tokio::test(flavor = "multi_thread")]
async fn search_rejects_empty_query() {
    let dir = TempDir::new().expect("temp dir");
    let server = MockServer::start().await;
    let state = state_for(dir.path(), &server).await;

    let (status, body) = post_json(state, "/api/search", json!({ "query": "" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .expect("error message")
            .contains("No query provided")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn search_rejects_zero_limit() {
    let dir = TempDir::new().expect("temp dir");
    let server = MockServer::start().await;
    let state = state_for(dir.path(), &server).await;

    let (status, _) = post_json(state, "/api/search", json!({ "query": "grants", "k": 0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test(flavor = "multi_thread")]
async fn search_returns_ranked_results_with_previews() {
    let dir = TempDir::new().expect("temp dir");
    let server = MockServer::start().await;
    mount_query_embedding(&server).await;
    let state = state_for(dir.path(), &server).await;

    let (status, body) = post_json(
        state,
        "/api/search",
        json!({ "query": "young artist funding", "k": 3 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().expect("results array");
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["program_name"], "Emerging Artist Fellowship");

    // distances are non-decreasing
    let scores: Vec<f64> = results
        .iter()
        .map(|r| r["relevance_score"].as_f64().expect("score"))
        .collect();
    assert!(scores.windows(2).all(|pair| pair[0] <= pair[1]));

    // the long chunk is previewed, the short ones pass through verbatim
    let preview = results[0]["content_preview"].as_str().expect("preview");
    assert!(preview.ends_with("..."));
    assert_eq!(preview.chars().count(), 503);
    assert!(
        results[0]["full_content"]
            .as_str()
            .expect("full content")
            .chars()
            .count()
            > 503
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn answer_lists_each_contributing_grant_once() {
    let dir = TempDir::new().expect("temp dir");
    let server = MockServer::start().await;
    mount_query_embedding(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({ "message": { "role": "assistant", "content": "Yes, residents aged 18-30 qualify." } }),
        ))
        .mount(&server)
        .await;
    let state = state_for(dir.path(), &server).await;

    let (status, body) = post_json(
        state,
        "/api/answer",
        json!({ "question": "Can young artists apply?" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Yes, residents aged 18-30 qualify.");

    // two of the three retrieved chunks belong to the same grant
    let grants = body["relevant_grants"].as_array().expect("grants array");
    assert_eq!(grants.len(), 2);
    assert_eq!(grants[0]["program_name"], "Emerging Artist Fellowship");
}

#[tokio::test(flavor = "multi_thread")]
async fn eligibility_soft_fails_to_placeholder() {
    let dir = TempDir::new().expect("temp dir");
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let state = state_for(dir.path(), &server).await;

    let (status, body) = post_json(
        state,
        "/api/eligibility",
        json!({ "grant_content": "Some grant text" }),
    )
    .await;

    // generation failure is not a request failure
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["eligibility_points"], GENERATION_FAILURE_PLACEHOLDER);
    assert_eq!(body["grant_type"], "ORGANIZATION");
}

#[tokio::test(flavor = "multi_thread")]
async fn proposal_requires_grant_content_and_inputs() {
    let dir = TempDir::new().expect("temp dir");
    let server = MockServer::start().await;
    let state = state_for(dir.path(), &server).await;

    let (status, body) = post_json(
        state,
        "/api/generate_proposal",
        json!({ "grant_content": "Some grant text", "user_inputs": {} }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["error"]
            .as_str()
            .expect("error message")
            .contains("No user inputs provided")
    );
}
