// LLM prompt pipeline
// Classification, redaction, and the staged prompt templates applied to
// retrieved grant content

pub mod classify;
pub mod prompts;
pub mod redact;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::embeddings::ollama::OllamaClient;

pub use classify::{GrantType, interpret_reply};
pub use redact::redact_inputs;

/// Returned in place of generated text when the generation service fails.
/// A generation failure never aborts a request; callers display this
/// placeholder instead.
pub const GENERATION_FAILURE_PLACEHOLDER: &str = "Error generating response";

/// Staged prompt pipeline over a shared generation client
pub struct GrantPipeline {
    client: Arc<OllamaClient>,
}

impl GrantPipeline {
    #[inline]
    pub fn new(client: Arc<OllamaClient>) -> Self {
        Self { client }
    }

    /// Label a grant's target applicant with a single generation call.
    /// A failed call or an unrecognizable reply defaults to Organization.
    #[inline]
    pub fn classify(&self, grant_content: &str) -> GrantType {
        match self
            .client
            .generate(&prompts::classification_prompt(grant_content))
        {
            Ok(reply) => {
                let label = interpret_reply(&reply);
                debug!("Classified grant as {}", label);
                label
            }
            Err(e) => {
                warn!(
                    "Classification call failed, defaulting to {}: {:#}",
                    GrantType::Organization,
                    e
                );
                GrantType::Organization
            }
        }
    }

    /// Extract bulleted eligibility criteria for the labeled applicant type
    #[inline]
    pub fn extract_eligibility(&self, grant_content: &str, grant_type: GrantType) -> String {
        self.generate_or_placeholder(&prompts::eligibility_prompt(grant_content, grant_type))
    }

    /// Generate eligibility questions for the labeled applicant type
    #[inline]
    pub fn generate_questions(&self, grant_content: &str, grant_type: GrantType) -> String {
        self.generate_or_placeholder(&prompts::questions_prompt(grant_content, grant_type))
    }

    /// Answer a free-text question against concatenated retrieved chunks
    #[inline]
    pub fn answer_question(&self, context: &str, question: &str) -> String {
        self.generate_or_placeholder(&prompts::answer_prompt(context, question))
    }

    /// Draft a structured proposal from grant content and caller-supplied
    /// fields. Inputs are redacted here, unconditionally, before any prompt
    /// text is assembled.
    #[inline]
    pub fn generate_proposal(
        &self,
        grant_content: &str,
        user_inputs: &BTreeMap<String, String>,
        grant_type: GrantType,
    ) -> String {
        let redacted = redact_inputs(user_inputs);
        self.generate_or_placeholder(&prompts::proposal_prompt(
            grant_content,
            &redacted,
            grant_type,
        ))
    }

    fn generate_or_placeholder(&self, prompt: &str) -> String {
        match self.client.generate(prompt) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Generation call failed, returning placeholder: {:#}", e);
                GENERATION_FAILURE_PLACEHOLDER.to_string()
            }
        }
    }
}
