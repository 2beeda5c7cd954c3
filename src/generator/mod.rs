//! Assistant reply generation
//!
//! Every strategy implements [`ResponseGenerator`]; the conversation only ever
//! holds an `Arc<dyn ResponseGenerator>` and does not know which one is in use.

pub mod mock;
pub mod openai;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
use crate::message::Message;
use crate::strategy::Strategy;

pub use mock::MockGenerator;
pub use openai::OpenAIGenerator;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("completion request failed with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("reply generation aborted: {0}")]
    Aborted(String),
}

#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Produce the assistant reply to `utterance`. `history` holds the
    /// conversation as it stood before the utterance was added.
    async fn generate(&self, history: &[Message], utterance: &str) -> Result<String, GenerateError>;

    /// Short label for status lines and logs
    fn label(&self) -> String;

    /// How many prior messages the generator looks at. `None` means all.
    fn context_window(&self) -> Option<usize> {
        None
    }
}

/// Build the generator selected by `config`. The API key is only used by the
/// OpenAI strategy.
pub fn from_config(config: &Config, api_key: Option<String>) -> Arc<dyn ResponseGenerator> {
    match config.strategy() {
        Strategy::Mock => {
            let delay = config.mock_delay();
            Arc::new(MockGenerator::new().with_delay(delay.min, delay.max))
        }
        Strategy::OpenAI => {
            let mut generator = OpenAIGenerator::new(api_key)
                .with_preferences(config.preferences.clone());
            if let Some(model) = &config.model {
                generator = generator.with_model(model);
            }
            if let Some(endpoint) = &config.endpoint {
                generator = generator.with_endpoint(endpoint);
            }
            Arc::new(generator)
        }
    }
}
