//! Question Classifier
//!
//! Classifies user questions as either:
//! - Market: about a company/ticker (e.g., "How is NVIDIA (NVDA) doing today?") — runs the full data-gathering workflow
//! - General: everything else (e.g., "what is a P/E ratio?") — answered conversationally

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// Question about a specific company/ticker.
    Market(MarketQuestion),
    General,
}

/// The company query and optional ticker extracted from a market question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketQuestion {
    /// Free-text query for the news fetcher (company name when extractable,
    /// otherwise the whole question).
    pub query: String,
    /// Ticker symbol for the quote fetcher, when one could be extracted.
    pub ticker: Option<String>,
}

impl MarketQuestion {
    /// What the quote fetcher is invoked with: the ticker when present,
    /// otherwise the raw query (invalid symbols are the provider's problem).
    pub fn quote_symbol(&self) -> &str {
        self.ticker.as_deref().unwrap_or(&self.query)
    }
}

/// Static keyword lists — zero allocation
const MARKET_KEYWORDS: &[&str] = &[
    // Price/quote
    "stock", "share", "shares", "price", "quote", "ticker", "trading", "volume",
    // Performance
    "doing", "performing", "performance", "up or down", "gain", "drop",
    // News/sentiment
    "news", "headline", "headlines", "sentiment",
    // Company events
    "earnings", "dividend", "valuation", "market cap",
];

/// All-caps tokens that look like tickers but never are.
const TICKER_STOPWORDS: &[&str] = &[
    "I", "A", "AI", "CEO", "CFO", "IPO", "ETF", "GDP", "USA", "US", "UK", "EU",
    "Q1", "Q2", "Q3", "Q4", "OK", "FAQ", "PE", "EPS",
];

/// Question classifier
pub struct QuestionClassifier;

impl QuestionClassifier {
    /// Classify a user question and extract the company query/ticker pair.
    pub fn classify(question: &str) -> QuestionKind {
        let ticker = extract_parenthesized_ticker(question)
            .or_else(|| extract_bare_ticker(question));

        let lowered = question.to_lowercase();
        let keyword_hits = MARKET_KEYWORDS
            .iter()
            .filter(|kw| lowered.contains(**kw))
            .count();

        if ticker.is_none() && keyword_hits == 0 {
            return QuestionKind::General;
        }

        let query = extract_company_query(question)
            .or_else(|| ticker.clone())
            .unwrap_or_else(|| question.trim().to_string());

        QuestionKind::Market(MarketQuestion { query, ticker })
    }
}

fn is_ticker_shaped(token: &str) -> bool {
    let len = token.chars().count();
    (1..=5).contains(&len)
        && token
            .chars()
            .all(|c| c.is_ascii_uppercase() || c == '.' || c == '-')
        && token.chars().any(|c| c.is_ascii_uppercase())
}

/// `"NVIDIA (NVDA)"` → `Some("NVDA")`
fn extract_parenthesized_ticker(question: &str) -> Option<String> {
    let start = question.find('(')?;
    let rest = &question[start + 1..];
    let end = rest.find(')')?;
    let inner = rest[..end].trim();

    if is_ticker_shaped(inner) {
        Some(inner.to_string())
    } else {
        None
    }
}

/// A standalone all-caps token that is not a common abbreviation.
fn extract_bare_ticker(question: &str) -> Option<String> {
    question
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '.' && c != '-')
        .filter(|token| token.len() >= 2)
        .filter(|token| is_ticker_shaped(token))
        .find(|token| !TICKER_STOPWORDS.contains(token))
        .map(|token| token.to_string())
}

/// The run of capitalized words immediately before a parenthesized ticker,
/// e.g. `"How is Advanced Micro Devices (AMD) doing?"` → `"Advanced Micro Devices"`.
fn extract_company_query(question: &str) -> Option<String> {
    let paren = question.find('(')?;
    let before = question[..paren].trim_end();

    let words: Vec<&str> = before.split_whitespace().collect();
    let mut company: Vec<&str> = Vec::new();

    for word in words.iter().rev() {
        let starts_upper = word.chars().next().is_some_and(|c| c.is_uppercase());
        if starts_upper {
            company.push(word);
        } else {
            break;
        }
    }

    if company.is_empty() {
        return None;
    }

    company.reverse();
    Some(company.join(" "))
}
