use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::{GenerateError, ResponseGenerator};
use crate::message::Message;

pub const TEMPLATES: [&str; 5] = [
    "That's an interesting question! Let me think about that...",
    "I understand what you're asking. Here's my perspective on that:",
    "Thank you for sharing that with me. Here's what I think:",
    "That's a great point! Let me elaborate on that:",
    "I appreciate you bringing this up. Here's my response:",
];

const ECHO_SUFFIX: &str = " - Here's your message reversed as an example response!";

/// Offline reply generator: waits a random interval, then answers with a
/// canned sentence followed by the user's words in reverse order.
pub struct MockGenerator {
    rng: Mutex<StdRng>,
    min_delay_ms: u64,
    max_delay_ms: u64,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            min_delay_ms: 1000,
            max_delay_ms: 3000,
        }
    }

    pub fn with_delay(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_delay_ms = min_ms.min(max_ms);
        self.max_delay_ms = min_ms.max(max_ms);
        self
    }

    fn pick(&self) -> (Duration, &'static str) {
        // The guard must be gone before the caller awaits
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let delay = rng.gen_range(self.min_delay_ms..=self.max_delay_ms);
        let template = TEMPLATES[rng.gen_range(0..TEMPLATES.len())];
        (Duration::from_millis(delay), template)
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Reverse the order of space-separated words, keeping each word intact
pub fn reverse_words(text: &str) -> String {
    text.split(' ').rev().collect::<Vec<_>>().join(" ")
}

pub fn mock_reply(template: &str, utterance: &str) -> String {
    format!("{}\n\n{}{}", template, reverse_words(utterance), ECHO_SUFFIX)
}

#[async_trait]
impl ResponseGenerator for MockGenerator {
    async fn generate(&self, _history: &[Message], utterance: &str) -> Result<String, GenerateError> {
        let (delay, template) = self.pick();
        debug!(delay_ms = delay.as_millis() as u64, "mock reply scheduled");
        tokio::time::sleep(delay).await;
        Ok(mock_reply(template, utterance))
    }

    fn label(&self) -> String {
        "Mock (Local)".to_string()
    }
}
