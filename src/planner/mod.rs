//! Planner trait and implementations
//!
//! The planner is the reasoning-engine seam: given the question, the session
//! transcript and the capability results gathered so far, it decides the next
//! action — invoke a capability, or produce the final answer.

use crate::memory::Transcript;
use crate::models::{CapabilityObservation, CapabilitySpec, NextAction};
use crate::Result;
use async_trait::async_trait;

pub mod gemini;
pub mod workflow;

pub use gemini::GeminiPlanner;
pub use workflow::WorkflowPlanner;

/// Fixed behavioral instruction: the required data-gathering order and the
/// disclaimer rule the reasoning engine must honor.
pub(crate) const ANALYST_SYSTEM_PROMPT: &str = r#"You are a helpful and cautious junior financial analyst.
Your goal is to provide a comprehensive answer to the user's question.
You must use your capabilities to gather all necessary information.

Here is your required workflow:
1. First, use the `get_financial_news` capability to find recent news for the company.
2. Second, take the news headlines from step 1 and use the `analyze_sentiment` capability.
3. Third, use the `get_stock_info` capability to get the latest stock price data.
4. Finally, synthesize all this information (news, sentiment, and stock data)
   into a single, comprehensive answer.

If a capability reported an error, acknowledge the missing data source and
answer from the remaining sources instead of refusing.

IMPORTANT RULES:
- You must explicitly state that this is not financial advice.
- Always add this disclaimer at the very end of your response:
  "Note: This is not financial advice. Please conduct your own research before making any investment decisions.""#;

/// Trait for next-action planning
#[async_trait]
pub trait Planner: Send + Sync {
    async fn next_action(
        &self,
        question: &str,
        transcript: &Transcript,
        observations: &[CapabilityObservation],
        capabilities: &[CapabilitySpec],
    ) -> Result<NextAction>;
}

/// Mock planner for development & testing
/// Walks the registered capabilities in order, then finishes with a plain
/// concatenation of everything gathered.
pub struct MockPlanner;

#[async_trait]
impl Planner for MockPlanner {
    async fn next_action(
        &self,
        question: &str,
        _transcript: &Transcript,
        observations: &[CapabilityObservation],
        capabilities: &[CapabilitySpec],
    ) -> Result<NextAction> {
        if let Some(next) = capabilities
            .iter()
            .find(|spec| !observations.iter().any(|obs| obs.capability == spec.name))
        {
            return Ok(NextAction::Invoke {
                capability: next.name.clone(),
                input: question.to_string(),
            });
        }

        let gathered = observations
            .iter()
            .map(|obs| obs.output.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        Ok(NextAction::Finish {
            answer: format!("Summary for \"{}\":\n{}", question, gathered),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<CapabilitySpec> {
        vec![
            CapabilitySpec {
                name: "get_financial_news".to_string(),
                description: "news".to_string(),
            },
            CapabilitySpec {
                name: "get_stock_info".to_string(),
                description: "quotes".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_mock_planner_invokes_each_capability_once_then_finishes() {
        let planner = MockPlanner;
        let transcript = Transcript::new();
        let mut observations = Vec::new();

        let action = planner
            .next_action("How is NVDA?", &transcript, &observations, &specs())
            .await
            .unwrap();
        assert_eq!(
            action,
            NextAction::Invoke {
                capability: "get_financial_news".to_string(),
                input: "How is NVDA?".to_string(),
            }
        );

        observations.push(CapabilityObservation {
            capability: "get_financial_news".to_string(),
            input: "How is NVDA?".to_string(),
            output: "some headlines".to_string(),
        });
        observations.push(CapabilityObservation {
            capability: "get_stock_info".to_string(),
            input: "NVDA".to_string(),
            output: "some quote".to_string(),
        });

        let action = planner
            .next_action("How is NVDA?", &transcript, &observations, &specs())
            .await
            .unwrap();

        match action {
            NextAction::Finish { answer } => {
                assert!(answer.contains("some headlines"));
                assert!(answer.contains("some quote"));
            }
            other => panic!("expected Finish, got {:?}", other),
        }
    }
}
