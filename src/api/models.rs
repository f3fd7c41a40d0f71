use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A single turn forwarded to the backend as conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Region the backend should scope its search to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Marketplace {
    #[default]
    India,
    Usa,
}

impl Marketplace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Marketplace::India => "india",
            Marketplace::Usa => "usa",
        }
    }

    /// Currency code assumed for products that don't carry one
    pub fn default_currency(&self) -> &'static str {
        match self {
            Marketplace::India => "INR",
            Marketplace::Usa => "USD",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Marketplace::India => Marketplace::Usa,
            Marketplace::Usa => Marketplace::India,
        }
    }
}

impl fmt::Display for Marketplace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retrieval strategy used by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    #[default]
    Scraper,
    DeepAgent,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Scraper => "scraper",
            SearchMode::DeepAgent => "deep-agent",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SearchMode::Scraper => SearchMode::DeepAgent,
            SearchMode::DeepAgent => SearchMode::Scraper,
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<ConversationMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marketplace: Option<Marketplace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<SearchMode>,
}

impl SearchRequest {
    /// Build a request from raw user input. Returns `None` when the query
    /// is empty after trimming.
    pub fn new(query: &str) -> Option<Self> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        Some(Self {
            query: query.to_string(),
            history: Vec::new(),
            marketplace: None,
            mode: None,
        })
    }

    pub fn with_history(mut self, history: Vec<ConversationMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_marketplace(mut self, marketplace: Option<Marketplace>) -> Self {
        self.marketplace = marketplace;
        self
    }

    pub fn with_mode(mut self, mode: Option<SearchMode>) -> Self {
        self.mode = mode;
        self
    }
}

/// What the backend decided to do with the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Search,
    Ask,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Body of a successful `POST /search`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub analysis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarifying_questions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_message: Option<String>,
    #[serde(default)]
    pub action: Action,
}

impl SearchResponse {
    /// Text of the assistant turn: the conversational reply when present,
    /// otherwise the analysis.
    pub fn assistant_text(&self) -> &str {
        match self.reply_message.as_deref() {
            Some(reply) if !reply.trim().is_empty() => reply,
            _ => &self.analysis,
        }
    }

    pub fn clarifying_questions(&self) -> &[String] {
        self.clarifying_questions.as_deref().unwrap_or(&[])
    }
}

/// One entry from `GET /logs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub timestamp: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LogsResponse {
    #[serde(default)]
    pub logs: Vec<LogLine>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    #[serde(rename = "accessToken", default)]
    pub access_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_rejects_blank_query() {
        assert!(SearchRequest::new("").is_none());
        assert!(SearchRequest::new("   \t").is_none());
        assert_eq!(SearchRequest::new("  phone  ").unwrap().query, "phone");
    }

    #[test]
    fn test_request_omits_empty_fields() {
        let request = SearchRequest::new("noise cancelling headphones")
            .unwrap()
            .with_marketplace(Some(Marketplace::India))
            .with_mode(Some(SearchMode::Scraper));

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "query": "noise cancelling headphones",
                "marketplace": "india",
                "mode": "scraper"
            })
        );
    }

    #[test]
    fn test_request_serializes_history_and_deep_agent() {
        let request = SearchRequest::new("laptop")
            .unwrap()
            .with_history(vec![
                ConversationMessage::new(Role::User, "hi"),
                ConversationMessage::new(Role::Assistant, "hello"),
            ])
            .with_mode(Some(SearchMode::DeepAgent));

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["mode"], "deep-agent");
        assert_eq!(value["history"][1]["role"], "assistant");
        assert!(value.get("marketplace").is_none());
    }

    #[test]
    fn test_minimal_response_uses_defaults() {
        let response: SearchResponse = serde_json::from_value(json!({
            "products": [{
                "title": "X",
                "price": null,
                "rating": 4.5,
                "url": "http://x",
                "image_url": null,
                "source": "Flipkart"
            }],
            "analysis": "fine"
        }))
        .unwrap();

        assert_eq!(response.action, Action::Search);
        assert_eq!(response.products[0].price, None);
        assert!(response.clarifying_questions().is_empty());
        assert_eq!(response.assistant_text(), "fine");
    }

    #[test]
    fn test_reply_message_wins_over_analysis() {
        let response: SearchResponse = serde_json::from_value(json!({
            "products": [],
            "analysis": "analysis",
            "reply_message": "What is your budget?",
            "clarifying_questions": ["Under 10k", "Under 20k"],
            "action": "ask"
        }))
        .unwrap();

        assert_eq!(response.action, Action::Ask);
        assert_eq!(response.assistant_text(), "What is your budget?");
        assert_eq!(response.clarifying_questions().len(), 2);
    }
}
