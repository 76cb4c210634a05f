//! Linear summarize → verify → refine pipeline

use super::prompts::{context_json, refine_prompt, summarize_prompt, verify_prompt};
use crate::error::{IshtarError, Result};
use crate::llm::LlmGateway;
use crate::search::SearchHit;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Default answer length limit
pub const DEFAULT_MAX_TOKENS: u32 = 512;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// State carried through the stages; each stage fills one field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    pub query: String,
    #[serde(default)]
    pub context: Vec<SearchHit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verdict: Option<String>,
    #[serde(rename = "final", default, skip_serializing_if = "Option::is_none")]
    pub final_answer: Option<String>,
}

impl AgentState {
    pub fn new(query: impl Into<String>, context: Vec<SearchHit>) -> Self {
        Self {
            query: query.into(),
            context,
            ..Default::default()
        }
    }

    /// Final answer if refine ran, else the draft
    pub fn best_answer(&self) -> Option<&str> {
        self.final_answer.as_deref().or(self.draft.as_deref())
    }
}

/// Pipeline stage, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Summarize,
    Verify,
    Refine,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Summarize, Stage::Verify, Stage::Refine];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summarize => "summarize",
            Self::Verify => "verify",
            Self::Refine => "refine",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage that failed, and why
#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: IshtarError,
}

impl StageFailure {
    pub fn into_error(self) -> IshtarError {
        IshtarError::Stage {
            stage: self.stage.as_str(),
            message: self.error.to_string(),
        }
    }
}

/// Outcome of one pipeline run: the state reached, plus the failure that
/// stopped it early, if any
#[derive(Debug)]
pub struct PipelineRun {
    pub state: AgentState,
    pub failure: Option<StageFailure>,
}

impl PipelineRun {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }

    /// Completed state, or the failure as a `Stage` error
    pub fn into_result(self) -> Result<AgentState> {
        match self.failure {
            None => Ok(self.state),
            Some(failure) => Err(failure.into_error()),
        }
    }
}

/// Answer pipeline over an LLM gateway
pub struct AnswerPipeline {
    gateway: Arc<dyn LlmGateway>,
    max_tokens: u32,
    temperature: f32,
}

impl AnswerPipeline {
    pub fn new(gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            gateway,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    pub fn with_generation(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    pub fn backend_name(&self) -> &str {
        self.gateway.backend_name()
    }

    /// Run every stage in order, stopping at the first failure
    pub async fn run(&self, mut state: AgentState) -> PipelineRun {
        for stage in Stage::ALL {
            let start = Instant::now();
            if let Err(error) = self.step(stage, &mut state).await {
                tracing::warn!("Pipeline stage {} failed: {}", stage, error);
                return PipelineRun {
                    state,
                    failure: Some(StageFailure { stage, error }),
                };
            }
            tracing::debug!("Stage {} done in {}ms", stage, start.elapsed().as_millis());
        }
        PipelineRun {
            state,
            failure: None,
        }
    }

    async fn step(&self, stage: Stage, state: &mut AgentState) -> Result<()> {
        match stage {
            Stage::Summarize => {
                let prompt = summarize_prompt(&state.query, &context_json(&state.context));
                state.draft = Some(self.call(&prompt).await?);
            }
            Stage::Verify => {
                let prompt = verify_prompt(draft_of(state)?, &context_json(&state.context));
                state.verdict = Some(self.call(&prompt).await?);
            }
            Stage::Refine => {
                let verdict = state.verdict.as_deref().ok_or_else(|| {
                    IshtarError::validation("refine requires a verdict")
                })?;
                let prompt = refine_prompt(draft_of(state)?, verdict);
                state.final_answer = Some(self.call(&prompt).await?);
            }
        }
        Ok(())
    }

    async fn call(&self, prompt: &str) -> Result<String> {
        self.gateway
            .call(prompt, self.max_tokens, self.temperature)
            .await
    }
}

fn draft_of(state: &AgentState) -> Result<&str> {
    state
        .draft
        .as_deref()
        .ok_or_else(|| IshtarError::validation("stage requires a draft"))
}
