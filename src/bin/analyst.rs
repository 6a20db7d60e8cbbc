use financial_analyst_agent::{
    agent::Orchestrator,
    capabilities::CapabilityRegistry,
    config::Settings,
    memory::Transcript,
    models::ConversationTurn,
    planner::WorkflowPlanner,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    // Load credentials; missing secrets halt before any question is served.
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            eprintln!("Both GEMINI_API_KEY and NEWS_API_KEY are required. See .env.example.");
            std::process::exit(1);
        }
    };

    info!("Financial Analyst Agent starting");

    // Construct the agent once; it is reused read-only across all questions.
    let registry = CapabilityRegistry::with_defaults(&settings);
    let planner = Box::new(WorkflowPlanner::new(settings.gemini_api_key.clone()));
    let orchestrator = Orchestrator::new(planner, registry, settings.gemini_api_key.clone());

    let mut transcript = Transcript::new();

    println!("Financial Analyst Agent");
    println!("Ask me about a stock (e.g., 'How is NVIDIA (NVDA) doing today?').");
    println!("Type 'exit' to quit.\n");

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        // One question is processed to completion before the next is read.
        let answer = orchestrator.answer(question, &transcript).await;

        transcript.push(ConversationTurn::user(question));
        transcript.push(ConversationTurn::assistant(answer.clone()));

        println!("\n{}\n", answer);
    }

    Ok(())
}
