//! LLM-backed ticket categorizer

use ticket_assist_anthropic::{AnthropicClient, Message, MessagesRequest};
use ticket_assist_core::categorizer::{parse_label, CategorizeError, Categorizer};
use ticket_assist_core::Category;

/// A label is one short token; anything longer is not an answer
const MAX_LABEL_TOKENS: u32 = 16;

/// Classifies ticket content with a zero-temperature model call
#[derive(Clone, Debug)]
pub struct LlmCategorizer {
    client: AnthropicClient,
    model: String,
}

impl LlmCategorizer {
    /// Categorizer using `model`
    #[must_use]
    pub fn new(client: AnthropicClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn system_prompt() -> String {
        format!(
            "You are an expert support ticket categorizer. Analyze the semantic meaning of the \
             ticket and choose the most appropriate category from: {}. Return ONLY the category \
             name.",
            Category::label_list()
        )
    }
}

impl Categorizer for LlmCategorizer {
    async fn categorize(&self, content: &str) -> Result<Category, CategorizeError> {
        let request = MessagesRequest::new(vec![Message::user(format!(
            "Ticket content: {content}"
        ))])
        .with_model(self.model.clone())
        .with_system(Self::system_prompt())
        .with_max_tokens(MAX_LABEL_TOKENS)
        .with_temperature(0.0);

        let response = self
            .client
            .messages(request)
            .await
            .map_err(|e| CategorizeError::Unavailable(e.to_string()))?;

        let answer = response.text();
        tracing::debug!(answer = %answer, "Categorizer answered");
        parse_label(&answer)
    }
}
