// HTTP API boundary
// Request/response shapes consumed by the web frontend. Routing itself is
// thin glue in `server`; validation and the error taxonomy mapping live in
// `validation` and `server`.

pub mod server;
pub mod validation;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::database::lancedb::SearchResult;
use crate::grants::GrantMetadata;
use crate::pipeline::GrantType;

/// Results returned per search when the caller does not ask for a count
pub const DEFAULT_SEARCH_LIMIT: usize = 3;

const PREVIEW_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    /// Number of results to return; defaults to [`DEFAULT_SEARCH_LIMIT`]
    pub k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<GrantSearchResult>,
}

#[derive(Debug, Serialize)]
pub struct GrantSearchResult {
    pub program_name: String,
    pub program_status: String,
    pub location: String,
    pub country: String,
    pub main_industry: String,
    pub target_audience: String,
    pub content_preview: String,
    pub relevance_score: f32,
    pub full_content: String,
}

impl GrantSearchResult {
    #[inline]
    pub fn from_search(result: &SearchResult) -> Self {
        let metadata = &result.chunk.metadata;
        Self {
            program_name: metadata.program_name.clone(),
            program_status: metadata.program_status.clone(),
            location: metadata.location.clone(),
            country: metadata.country.clone(),
            main_industry: metadata.main_industry.clone(),
            target_audience: metadata.target_audience.clone(),
            content_preview: content_preview(&result.chunk.content),
            relevance_score: result.distance,
            full_content: result.chunk.content.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EligibilityRequest {
    #[serde(default)]
    pub grant_content: String,
}

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub eligibility_points: String,
    pub grant_type: GrantType,
}

#[derive(Debug, Deserialize)]
pub struct QuestionsRequest {
    #[serde(default)]
    pub grant_content: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionsResponse {
    pub questions: String,
    pub grant_type: GrantType,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub relevant_grants: Vec<RelevantGrant>,
}

/// Metadata subset identifying a grant that contributed retrieved context
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelevantGrant {
    pub program_name: String,
    pub program_status: String,
    pub location: String,
    pub country: String,
}

impl From<&GrantMetadata> for RelevantGrant {
    #[inline]
    fn from(metadata: &GrantMetadata) -> Self {
        Self {
            program_name: metadata.program_name.clone(),
            program_status: metadata.program_status.clone(),
            location: metadata.location.clone(),
            country: metadata.country.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProposalRequest {
    #[serde(default)]
    pub grant_content: String,
    #[serde(default)]
    pub user_inputs: BTreeMap<String, String>,
    /// Label from a previous eligibility call; absent or unrecognized values
    /// default to ORGANIZATION
    pub grant_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProposalResponse {
    pub proposal: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// First 500 characters of the content, marked when truncated
#[inline]
pub fn content_preview(content: &str) -> String {
    let mut chars = content.chars();
    let mut preview: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        preview.push_str("...");
    }
    preview
}
