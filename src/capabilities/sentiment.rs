//! Headline sentiment capability
//!
//! Classifies a block of headline text as Positive, Negative or Neutral with
//! a one-sentence justification, via Gemini at the minimum temperature the
//! engine supports. The generated output is returned unmodified: the label is
//! not parsed or validated locally, so a malformed response propagates as-is.

use crate::capabilities::Capability;
use crate::gemini::{GeminiClient, DETERMINISTIC_TEMPERATURE};
use crate::models::SentimentLabel;
use tracing::debug;

const SENTIMENT_SYSTEM_INSTRUCTION: &str =
    "You are a financial news sentiment classifier. Follow the instructions exactly.";

/// Sentiment capability registered as `analyze_sentiment`.
pub struct SentimentCapability {
    client: GeminiClient,
}

impl SentimentCapability {
    pub fn new(api_key: String) -> Self {
        Self {
            client: GeminiClient::new(api_key),
        }
    }
}

/// Fixed instruction template: a single label from the closed set plus
/// exactly one justification sentence.
fn build_prompt(headlines: &str) -> String {
    format!(
        r#"Analyze the sentiment of the following news headlines.
Classify the overall sentiment as '{positive}', '{negative}', or '{neutral}'.
Provide a one-sentence justification for your classification.

Headlines:
{headlines}

Your analysis (Sentiment: [{positive}/{negative}/{neutral}], Justification: [Your one-sentence justification]):
"#,
        positive = SentimentLabel::Positive,
        negative = SentimentLabel::Negative,
        neutral = SentimentLabel::Neutral,
        headlines = headlines,
    )
}

#[async_trait::async_trait]
impl Capability for SentimentCapability {
    fn name(&self) -> &'static str {
        "analyze_sentiment"
    }

    fn description(&self) -> &'static str {
        "Analyzes the sentiment of a list of news headlines (provided as a single string) and returns a sentiment classification (Positive, Negative, or Neutral) with a justification."
    }

    // Empty or whitespace input is not rejected here; the result is whatever
    // the engine produces for it.
    async fn invoke(&self, input: &str) -> String {
        debug!(input_len = input.len(), "Classifying headline sentiment");

        let prompt = build_prompt(input);

        match self
            .client
            .generate(SENTIMENT_SYSTEM_INSTRUCTION, &prompt, DETERMINISTIC_TEMPERATURE)
            .await
        {
            Ok(analysis) => analysis,
            Err(e) => format!("Error analyzing sentiment: {}", e),
        }
    }
}
