//! HTTP routing
//!
//! Thin glue between the web frontend and the retrieval/generation core:
//! handlers validate the payload, call the core, and map the error taxonomy
//! onto status codes. Generation failures never become error responses;
//! the placeholder text rides inside an otherwise-success payload.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use itertools::Itertools;
use tracing::error;

use crate::database::lancedb::VectorStore;
use crate::embeddings::ollama::OllamaClient;
use crate::pipeline::{GrantPipeline, GrantType, interpret_reply};
use crate::{GrantRagError, Result};

use super::validation;
use super::{
    AnswerRequest, AnswerResponse, DEFAULT_SEARCH_LIMIT, EligibilityRequest, EligibilityResponse,
    ErrorResponse, GrantSearchResult, ProposalRequest, ProposalResponse, QuestionsRequest,
    QuestionsResponse, RelevantGrant, SearchRequest, SearchResponse,
};

/// Shared read-only state: the index is built or loaded before the listener
/// binds and is never mutated while serving.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<VectorStore>,
    pub client: Arc<OllamaClient>,
    pub pipeline: Arc<GrantPipeline>,
}

#[inline]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", post(search))
        .route("/api/eligibility", post(eligibility))
        .route("/api/questions", post(questions))
        .route("/api/answer", post(answer))
        .route("/api/generate_proposal", post(generate_proposal))
        .with_state(state)
}

fn error_response(err: &GrantRagError) -> Response {
    let status = match err {
        GrantRagError::Validation(_) | GrantRagError::Config(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

fn embed_query(state: &AppState, text: &str) -> Result<Vec<f32>> {
    state.client.embed(text).map_err(|e| {
        error!("Failed to embed query: {:#}", e);
        GrantRagError::Embedding(format!("{:#}", e))
    })
}

async fn search(State(state): State<AppState>, Json(request): Json<SearchRequest>) -> Response {
    if let Err(e) = validation::require_non_empty(&request.query, "query") {
        return error_response(&e);
    }
    let k = match validation::resolve_search_limit(request.k) {
        Ok(k) => k,
        Err(e) => return error_response(&e),
    };

    let query_vector = match embed_query(&state, &request.query) {
        Ok(vector) => vector,
        Err(e) => return error_response(&e),
    };

    match state.store.search_similar(&query_vector, k).await {
        Ok(results) => Json(SearchResponse {
            results: results.iter().map(GrantSearchResult::from_search).collect(),
        })
        .into_response(),
        Err(e) => error_response(&e),
    }
}

async fn eligibility(
    State(state): State<AppState>,
    Json(request): Json<EligibilityRequest>,
) -> Response {
    if let Err(e) = validation::require_non_empty(&request.grant_content, "grant content") {
        return error_response(&e);
    }

    let grant_type = state.pipeline.classify(&request.grant_content);
    let eligibility_points = state
        .pipeline
        .extract_eligibility(&request.grant_content, grant_type);

    Json(EligibilityResponse {
        eligibility_points,
        grant_type,
    })
    .into_response()
}

async fn questions(
    State(state): State<AppState>,
    Json(request): Json<QuestionsRequest>,
) -> Response {
    if let Err(e) = validation::require_non_empty(&request.grant_content, "grant content") {
        return error_response(&e);
    }

    let grant_type = state.pipeline.classify(&request.grant_content);
    let questions = state
        .pipeline
        .generate_questions(&request.grant_content, grant_type);

    Json(QuestionsResponse {
        questions,
        grant_type,
    })
    .into_response()
}

// TODO: exercise this route from the chat UI end to end; unlike the other
// routes it has never run against a real frontend session
async fn answer(State(state): State<AppState>, Json(request): Json<AnswerRequest>) -> Response {
    if let Err(e) = validation::require_non_empty(&request.question, "question") {
        return error_response(&e);
    }

    let query_vector = match embed_query(&state, &request.question) {
        Ok(vector) => vector,
        Err(e) => return error_response(&e),
    };

    let results = match state
        .store
        .search_similar(&query_vector, DEFAULT_SEARCH_LIMIT)
        .await
    {
        Ok(results) => results,
        Err(e) => return error_response(&e),
    };

    let context = results.iter().map(|r| r.chunk.content.as_str()).join("\n\n");
    let answer = state.pipeline.answer_question(&context, &request.question);

    // one entry per grant, not per chunk
    let relevant_grants: Vec<RelevantGrant> = results
        .iter()
        .unique_by(|r| {
            (
                r.chunk.metadata.program_id.clone(),
                r.chunk.metadata.program_name.clone(),
            )
        })
        .map(|r| RelevantGrant::from(&r.chunk.metadata))
        .collect();

    Json(AnswerResponse {
        answer,
        relevant_grants,
    })
    .into_response()
}

async fn generate_proposal(
    State(state): State<AppState>,
    Json(request): Json<ProposalRequest>,
) -> Response {
    if let Err(e) = validation::require_non_empty(&request.grant_content, "grant content") {
        return error_response(&e);
    }
    if let Err(e) = validation::require_inputs(&request.user_inputs) {
        return error_response(&e);
    }

    let grant_type = request
        .grant_type
        .as_deref()
        .map_or(GrantType::Organization, interpret_reply);

    let proposal =
        state
            .pipeline
            .generate_proposal(&request.grant_content, &request.user_inputs, grant_type);

    Json(ProposalResponse { proposal }).into_response()
}
