//! Deterministic workflow planner
//!
//! Drives the fixed news → sentiment → quote → synthesis sequence as a state
//! machine, using the LLM only for the final synthesis step. Capability
//! results are consumed as-is — a failure-tagged result advances the workflow
//! exactly like a success, and the synthesis step is expected to acknowledge
//! the missing source.

use crate::classifier::{MarketQuestion, QuestionClassifier, QuestionKind};
use crate::gemini::{GeminiClient, SYNTHESIS_TEMPERATURE};
use crate::memory::Transcript;
use crate::models::{CapabilityObservation, CapabilitySpec, NextAction, WorkflowPhase};
use crate::planner::{Planner, ANALYST_SYSTEM_PROMPT};
use crate::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

pub const NEWS_CAPABILITY: &str = "get_financial_news";
pub const SENTIMENT_CAPABILITY: &str = "analyze_sentiment";
pub const QUOTE_CAPABILITY: &str = "get_stock_info";

pub struct WorkflowPlanner {
    gemini: GeminiClient,
}

impl WorkflowPlanner {
    pub fn new(gemini_api_key: String) -> Self {
        Self {
            gemini: GeminiClient::new(gemini_api_key),
        }
    }

    /// Where one question currently is in the fixed workflow, derived from
    /// the capabilities observed so far.
    pub fn phase(observations: &[CapabilityObservation]) -> WorkflowPhase {
        let observed = |name: &str| observations.iter().any(|obs| obs.capability == name);

        if !observed(NEWS_CAPABILITY) {
            WorkflowPhase::NewsRequested
        } else if !observed(SENTIMENT_CAPABILITY) {
            WorkflowPhase::SentimentRequested
        } else if !observed(QUOTE_CAPABILITY) {
            WorkflowPhase::QuoteRequested
        } else {
            WorkflowPhase::Synthesizing
        }
    }

    fn market_question(question: &str) -> MarketQuestion {
        match QuestionClassifier::classify(question) {
            QuestionKind::Market(market) => market,
            // The orchestrator routes only market questions here; if one
            // slips through, the whole question serves as the query.
            QuestionKind::General => MarketQuestion {
                query: question.trim().to_string(),
                ticker: None,
            },
        }
    }

    fn synthesis_prompt(
        question: &str,
        transcript: &Transcript,
        observations: &[CapabilityObservation],
    ) -> String {
        let mut prompt = String::new();

        let context = transcript.recent_context(6);
        if !context.is_empty() {
            prompt.push_str("Conversation so far:\n");
            prompt.push_str(&context);
            prompt.push('\n');
        }

        prompt.push_str("Question: ");
        prompt.push_str(question);
        prompt.push_str("\n\nGathered information:\n");

        for obs in observations {
            prompt.push_str(&format!("[{}] {}\n", obs.capability, obs.output));
        }

        prompt.push_str(
            "\nSynthesize one comprehensive answer from the news, the sentiment judgment and the quote data above. \
             If any source reported an error, say so and use the rest.",
        );

        prompt
    }

    /// Degraded composition used when the synthesis generation call itself
    /// faults: the gathered results are presented verbatim so the workflow
    /// still reaches an answer.
    fn fallback_answer(question: &str, observations: &[CapabilityObservation]) -> String {
        let mut answer = format!(
            "I could not generate a full analysis for \"{}\", but here is the information I gathered:\n",
            question.trim()
        );

        for obs in observations {
            answer.push_str(&format!("- {}: {}\n", obs.capability, obs.output));
        }

        answer
    }
}

#[async_trait]
impl Planner for WorkflowPlanner {
    async fn next_action(
        &self,
        question: &str,
        transcript: &Transcript,
        observations: &[CapabilityObservation],
        _capabilities: &[CapabilitySpec],
    ) -> Result<NextAction> {
        let phase = Self::phase(observations);
        debug!(?phase, "Workflow step");

        match phase {
            WorkflowPhase::Idle | WorkflowPhase::NewsRequested => {
                let market = Self::market_question(question);
                Ok(NextAction::Invoke {
                    capability: NEWS_CAPABILITY.to_string(),
                    input: market.query,
                })
            }
            WorkflowPhase::SentimentRequested => {
                // Step 2 consumes step 1's result text, success or failure.
                let news_result = observations
                    .iter()
                    .find(|obs| obs.capability == NEWS_CAPABILITY)
                    .map(|obs| obs.output.clone())
                    .unwrap_or_default();

                Ok(NextAction::Invoke {
                    capability: SENTIMENT_CAPABILITY.to_string(),
                    input: news_result,
                })
            }
            WorkflowPhase::QuoteRequested => {
                let market = Self::market_question(question);
                Ok(NextAction::Invoke {
                    capability: QUOTE_CAPABILITY.to_string(),
                    input: market.quote_symbol().to_string(),
                })
            }
            WorkflowPhase::Synthesizing | WorkflowPhase::Answered => {
                let prompt = Self::synthesis_prompt(question, transcript, observations);

                let answer = match self
                    .gemini
                    .generate(ANALYST_SYSTEM_PROMPT, &prompt, SYNTHESIS_TEMPERATURE)
                    .await
                {
                    Ok(answer) => answer,
                    Err(e) => {
                        warn!("Synthesis generation failed, composing degraded answer: {}", e);
                        Self::fallback_answer(question, observations)
                    }
                };

                Ok(NextAction::Finish { answer })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(capability: &str, output: &str) -> CapabilityObservation {
        CapabilityObservation {
            capability: capability.to_string(),
            input: String::new(),
            output: output.to_string(),
        }
    }

    #[test]
    fn test_phase_progression() {
        let mut observations = Vec::new();
        assert_eq!(
            WorkflowPlanner::phase(&observations),
            WorkflowPhase::NewsRequested
        );

        observations.push(obs(NEWS_CAPABILITY, "headlines"));
        assert_eq!(
            WorkflowPlanner::phase(&observations),
            WorkflowPhase::SentimentRequested
        );

        observations.push(obs(SENTIMENT_CAPABILITY, "Positive"));
        assert_eq!(
            WorkflowPlanner::phase(&observations),
            WorkflowPhase::QuoteRequested
        );

        observations.push(obs(QUOTE_CAPABILITY, "quote"));
        assert_eq!(
            WorkflowPlanner::phase(&observations),
            WorkflowPhase::Synthesizing
        );
    }

    #[tokio::test]
    async fn test_first_step_requests_news_for_company_query() {
        let planner = WorkflowPlanner::new(String::new());
        let action = planner
            .next_action(
                "How is NVIDIA (NVDA) doing today?",
                &Transcript::new(),
                &[],
                &[],
            )
            .await
            .unwrap();

        assert_eq!(
            action,
            NextAction::Invoke {
                capability: NEWS_CAPABILITY.to_string(),
                input: "NVIDIA".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_second_step_feeds_news_result_to_sentiment() {
        let planner = WorkflowPlanner::new(String::new());
        let observations = vec![obs(NEWS_CAPABILITY, "Successfully fetched news for NVIDIA: [\"Up\"]")];

        let action = planner
            .next_action(
                "How is NVIDIA (NVDA) doing today?",
                &Transcript::new(),
                &observations,
                &[],
            )
            .await
            .unwrap();

        match action {
            NextAction::Invoke { capability, input } => {
                assert_eq!(capability, SENTIMENT_CAPABILITY);
                assert!(input.contains("Successfully fetched news"));
            }
            other => panic!("expected Invoke, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_news_step_still_advances_to_sentiment() {
        let planner = WorkflowPlanner::new(String::new());
        let observations = vec![obs(
            NEWS_CAPABILITY,
            "Error fetching news for NVIDIA: Transport fault: timeout",
        )];

        let action = planner
            .next_action("How is NVIDIA (NVDA) doing?", &Transcript::new(), &observations, &[])
            .await
            .unwrap();

        match action {
            NextAction::Invoke { capability, input } => {
                assert_eq!(capability, SENTIMENT_CAPABILITY);
                assert!(input.starts_with("Error fetching news"));
            }
            other => panic!("expected Invoke, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_third_step_requests_quote_for_ticker() {
        let planner = WorkflowPlanner::new(String::new());
        let observations = vec![
            obs(NEWS_CAPABILITY, "headlines"),
            obs(SENTIMENT_CAPABILITY, "Sentiment: Positive"),
        ];

        let action = planner
            .next_action(
                "How is NVIDIA (NVDA) doing today?",
                &Transcript::new(),
                &observations,
                &[],
            )
            .await
            .unwrap();

        assert_eq!(
            action,
            NextAction::Invoke {
                capability: QUOTE_CAPABILITY.to_string(),
                input: "NVDA".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_synthesis_without_credentials_degrades_but_answers() {
        // Empty API key makes the synthesis call fault; the planner must
        // still finish with an answer composed from the raw observations.
        let planner = WorkflowPlanner::new(String::new());
        let observations = vec![
            obs(NEWS_CAPABILITY, "Successfully fetched news for NVIDIA: [\"Up\"]"),
            obs(SENTIMENT_CAPABILITY, "Sentiment: Positive, Justification: strong quarter."),
            obs(QUOTE_CAPABILITY, "Successfully fetched stock data for NVDA: {\"current_price\":905.12}"),
        ];

        let action = planner
            .next_action("How is NVIDIA (NVDA) doing?", &Transcript::new(), &observations, &[])
            .await
            .unwrap();

        match action {
            NextAction::Finish { answer } => {
                assert!(answer.contains("905.12"));
                assert!(answer.contains("Positive"));
            }
            other => panic!("expected Finish, got {:?}", other),
        }
    }

    #[test]
    fn test_fallback_answer_lists_every_observation() {
        let observations = vec![
            obs(NEWS_CAPABILITY, "No news articles found for 'NVIDIA'."),
            obs(QUOTE_CAPABILITY, "Successfully fetched stock data for NVDA: {}"),
        ];

        let answer = WorkflowPlanner::fallback_answer("How is NVDA?", &observations);
        assert!(answer.contains("No news articles found"));
        assert!(answer.contains("Successfully fetched stock data"));
    }
}
