//! AI client module for narrating dataset profiles through the OpenAI API.
//!
//! Narration is pluggable through the [`Narrator`] trait. [`AIAssistant`]
//! talks to OpenAI; [`OfflineNarrator`] is used when no API key is available
//! and answers every request with a "not configured" message.

use anyhow::{Context as _, Result};
use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;

use crate::analyser::logic::{Dataset, Stats};
pub use crate::config::AIConfig;

/// Environment variable holding the OpenAI API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const NOT_CONFIGURED: &str =
    "AI narration is not configured. Set OPENAI_API_KEY in the environment to enable it.";

/// Turns profiles and questions into prose.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Narrative insights for a dataset profile.
    async fn narrate(&self, stats: &Stats) -> Result<String>;

    /// Answers a free-form question about a dataset described by `context`.
    async fn answer(&self, query: &str, context: &str) -> Result<String>;
}

/// AI Assistant client for interacting with OpenAI API
pub struct AIAssistant {
    client: Client<OpenAIConfig>,
    config: AIConfig,
}

impl AIAssistant {
    /// Create a new AI Assistant with the provided API key and configuration
    pub fn new(api_key: String, config: AIConfig) -> Self {
        let openai_config = OpenAIConfig::new().with_api_key(api_key);
        let client = Client::with_config(openai_config);

        Self { client, config }
    }

    /// Send a query to the AI assistant with optional context
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be built, the API call fails or
    /// the response has no content.
    pub async fn send_query(&self, query: &str, context: Option<&str>) -> Result<String> {
        let mut messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(Self::system_prompt())
                .build()
                .context("Failed to build system message")?
                .into(),
        ];

        if let Some(ctx) = context {
            messages.push(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(format!("Dataset Context:\n{ctx}"))
                    .build()
                    .context("Failed to build context message")?
                    .into(),
            );
        }

        messages.push(
            ChatCompletionRequestUserMessageArgs::default()
                .content(query)
                .build()
                .context("Failed to build user message")?
                .into(),
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .messages(messages)
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens)
            .build()
            .context("Failed to build chat completion request")?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| anyhow::anyhow!("OpenAI API error: {e}"))?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("No response content received"))
    }

    fn system_prompt() -> String {
        r"You are a data analyst assistant embedded in sifter, a dataset profiling engine.
Your role is to help users understand the quality and structure of a tabular dataset,
prioritise cleaning work and spot analysis opportunities.

When answering:
- Be concise and practical
- Refer to columns by name
- Suggest concrete cleaning steps (drop or fill missing values, remove outliers or duplicates,
  standardize or normalize numeric columns) when relevant
- Explain statistical concepts in accessible terms"
            .to_owned()
    }
}

#[async_trait]
impl Narrator for AIAssistant {
    async fn narrate(&self, stats: &Stats) -> Result<String> {
        self.send_query(&insights_prompt(stats), None).await
    }

    async fn answer(&self, query: &str, context: &str) -> Result<String> {
        let prompt = format!(
            "User query: \"{query}\"\n\nProvide a specific analysis result or insight that answers \
             the question. If it is about trends, patterns or specific data points, give \
             concrete findings."
        );
        self.send_query(&prompt, Some(context)).await
    }
}

/// Narrator used when no API key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineNarrator;

#[async_trait]
impl Narrator for OfflineNarrator {
    async fn narrate(&self, _stats: &Stats) -> Result<String> {
        Ok(NOT_CONFIGURED.to_owned())
    }

    async fn answer(&self, _query: &str, _context: &str) -> Result<String> {
        Ok(NOT_CONFIGURED.to_owned())
    }
}

/// Picks the OpenAI narrator when enabled and a key is present.
pub fn build_narrator(config: &AIConfig) -> Box<dyn Narrator> {
    match std::env::var(API_KEY_ENV) {
        Ok(key) if config.enabled && !key.trim().is_empty() => {
            tracing::info!(model = %config.model, "AI narration enabled");
            Box::new(AIAssistant::new(key, config.clone()))
        }
        _ => {
            tracing::debug!("AI narration disabled; using offline narrator");
            Box::new(OfflineNarrator)
        }
    }
}

/// Prompt asking for quality, pattern and preprocessing insights.
pub fn insights_prompt(stats: &Stats) -> String {
    let types: Vec<String> = stats
        .data_types
        .iter()
        .map(|(name, kind)| format!("{name}: {kind}"))
        .collect();
    let missing: Vec<String> = stats
        .missing_values
        .iter()
        .map(|(name, count)| format!("{name}: {count}"))
        .collect();
    let outliers: Vec<String> = stats
        .outliers
        .iter()
        .map(|(name, count)| format!("{name}: {count}"))
        .collect();

    format!(
        "Analyze this dataset and provide comprehensive insights:
- Rows: {}, Columns: {}
- Data Quality Score: {:.1}%
- Column names: {}
- Data types: {}
- Missing values: {}
- Outliers detected: {}
- Duplicate rows: {}

Provide insights on:
1. Data quality assessment and recommendations
2. Patterns and anomalies detected
3. Suggested preprocessing steps
4. Potential analysis opportunities
5. Data cleaning priorities",
        stats.rows,
        stats.columns,
        stats.quality_score,
        stats.column_names.join(", "),
        types.join(", "),
        missing.join(", "),
        outliers.join(", "),
        stats.duplicate_rows,
    )
}

/// Column names, types and the first rows, as context for free-form questions.
pub fn dataset_context(dataset: &Dataset) -> String {
    let columns: Vec<String> = dataset
        .columns()
        .iter()
        .map(|c| format!("{} ({})", c.name(), c.kind()))
        .collect();
    let sample = dataset.rows_as_json(0..dataset.row_count(), 3);
    let sample = serde_json::to_string(&sample).unwrap_or_default();
    format!("Dataset columns: {}\nSample rows: {sample}", columns.join(", "))
}
