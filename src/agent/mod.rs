//! Orchestrator - drives one question through the fixed workflow
//!
//! QUESTION → NEWS → SENTIMENT → QUOTE → SYNTHESIZE → ANSWER
//!
//! The orchestrator makes exactly the three registered capabilities available
//! to the planner, folds every capability result (success- or failure-tagged)
//! into the planner's context, and enforces the disclaimer post-condition on
//! whatever the planner produces. A question always ends in an answer; a
//! failed data source degrades the answer, it never aborts it.

use crate::capabilities::CapabilityRegistry;
use crate::classifier::{QuestionClassifier, QuestionKind};
use crate::gemini::{GeminiClient, SYNTHESIS_TEMPERATURE};
use crate::memory::Transcript;
use crate::models::CapabilityObservation;
use crate::planner::Planner;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The literal sentence every final answer must end with.
pub const DISCLAIMER: &str = "Note: This is not financial advice. Please conduct your own research before making any investment decisions.";

/// Hardening bound: a hung capability call surfaces as a failure-tagged
/// result instead of blocking the question forever.
const DEFAULT_CAPABILITY_TIMEOUT: Duration = Duration::from_secs(30);

const CONVERSATIONAL_SYSTEM_PROMPT: &str = r#"You are a helpful and cautious junior financial analyst.
Answer the user's question accurately and concisely.

IMPORTANT RULES:
- You must explicitly state that this is not financial advice.
- Always add this disclaimer at the very end of your response:
  "Note: This is not financial advice. Please conduct your own research before making any investment decisions.""#;

/// Main orchestrator, constructed once per process and reused read-only
/// across all questions.
pub struct Orchestrator {
    planner: Box<dyn Planner>,
    registry: CapabilityRegistry,
    gemini: GeminiClient,
    capability_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        planner: Box<dyn Planner>,
        registry: CapabilityRegistry,
        gemini_api_key: String,
    ) -> Self {
        Self {
            planner,
            registry,
            gemini: GeminiClient::new(gemini_api_key),
            capability_timeout: DEFAULT_CAPABILITY_TIMEOUT,
        }
    }

    pub fn with_capability_timeout(mut self, timeout: Duration) -> Self {
        self.capability_timeout = timeout;
        self
    }

    /// Answer one user question.
    ///
    /// Infallible by design: configuration faults are caught at startup, and
    /// every mid-workflow fault is folded into a degraded,
    /// disclaimer-terminated answer.
    pub async fn answer(&self, question: &str, transcript: &Transcript) -> String {
        info!(question, "Processing question");

        let answer = match QuestionClassifier::classify(question) {
            QuestionKind::Market(_) => self.run_workflow(question, transcript).await,
            QuestionKind::General => self.answer_conversationally(question, transcript).await,
        };

        ensure_disclaimer(answer)
    }

    /// Drive the planner through the fixed data-gathering workflow.
    async fn run_workflow(&self, question: &str, transcript: &Transcript) -> String {
        let specs = self.registry.specs();
        let mut observations: Vec<CapabilityObservation> = Vec::new();

        // Safety bound: one invocation per registered capability. The fixed
        // workflow never needs more than one pass.
        let max_invocations = self.registry.len();

        loop {
            let action = match self
                .planner
                .next_action(question, transcript, &observations, &specs)
                .await
            {
                Ok(action) => action,
                Err(e) => {
                    warn!("Planner failed, composing degraded answer: {}", e);
                    return degraded_answer(question, &observations);
                }
            };

            match action {
                crate::models::NextAction::Finish { answer } => {
                    info!(
                        observation_count = observations.len(),
                        "Workflow answered"
                    );
                    return answer;
                }
                crate::models::NextAction::Invoke { capability, input } => {
                    if observations.len() >= max_invocations {
                        warn!(
                            capability,
                            "Invocation limit reached, forcing degraded answer"
                        );
                        return degraded_answer(question, &observations);
                    }

                    let output = self.invoke_capability(&capability, &input).await;
                    debug!(capability, output_len = output.len(), "Capability result");

                    observations.push(CapabilityObservation {
                        capability,
                        input,
                        output,
                    });
                }
            }
        }
    }

    /// Invoke one capability under the bounded timeout. Always returns a
    /// result string; an unknown name or an elapsed timeout is reported as a
    /// failure-tagged result, never an abort.
    async fn invoke_capability(&self, name: &str, input: &str) -> String {
        let Some(capability) = self.registry.get(name) else {
            warn!(name, "Planner requested unknown capability");
            return format!("Error: capability '{}' is not available.", name);
        };

        match tokio::time::timeout(self.capability_timeout, capability.invoke(input)).await {
            Ok(output) => output,
            Err(_) => {
                warn!(name, "Capability call timed out");
                format!(
                    "Error: {} timed out after {} seconds.",
                    name,
                    self.capability_timeout.as_secs()
                )
            }
        }
    }

    /// Direct LLM path for questions that do not concern a company.
    async fn answer_conversationally(&self, question: &str, transcript: &Transcript) -> String {
        let mut prompt = String::new();

        let context = transcript.recent_context(6);
        if !context.is_empty() {
            prompt.push_str("Conversation so far:\n");
            prompt.push_str(&context);
            prompt.push('\n');
        }
        prompt.push_str("Question: ");
        prompt.push_str(question);

        match self
            .gemini
            .generate(CONVERSATIONAL_SYSTEM_PROMPT, &prompt, SYNTHESIS_TEMPERATURE)
            .await
        {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Conversational generation failed: {}", e);
                format!("Sorry, an error occurred: {}", e)
            }
        }
    }
}

/// Compose a best-effort answer directly from whatever was gathered.
fn degraded_answer(question: &str, observations: &[CapabilityObservation]) -> String {
    if observations.is_empty() {
        return format!(
            "I was unable to gather any data to answer \"{}\". Please try again.",
            question.trim()
        );
    }

    let mut answer = format!(
        "I could not complete the full analysis for \"{}\", but here is what I gathered:\n",
        question.trim()
    );
    for obs in observations {
        answer.push_str(&format!("- {}: {}\n", obs.capability, obs.output));
    }
    answer
}

/// Structural post-condition: the disclaimer sentence ends every answer
/// exactly once, regardless of what the planner produced.
fn ensure_disclaimer(answer: String) -> String {
    if answer.trim_end().ends_with(DISCLAIMER) {
        answer
    } else {
        format!("{}\n\n{}", answer.trim_end(), DISCLAIMER)
    }
}
