//! Conversation controller
//!
//! Owns the message store and drives one turn at a time:
//! the user message is appended, the reply is generated on a background task,
//! and the reply (or a fallback) is appended when the task finishes.

use std::sync::Arc;

use thiserror::Error;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

use crate::generator::{GenerateError, ResponseGenerator};
use crate::message::{Message, MessageStore, Role};

pub const GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";
pub const FALLBACK_REPLY: &str =
    "Sorry, I encountered an error while processing your message. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Replied,
    Failed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TurnRejected {
    #[error("message is empty")]
    Empty,
    #[error("a reply is still being generated")]
    Busy,
}

type PendingReply = JoinHandle<Result<String, GenerateError>>;

pub struct Conversation {
    store: MessageStore,
    generator: Arc<dyn ResponseGenerator>,
    loading: bool,
    pending: Option<PendingReply>,
}

impl Conversation {
    pub fn new(generator: Arc<dyn ResponseGenerator>) -> Self {
        let mut store = MessageStore::new();
        let greeting = store.compose(Role::Assistant, GREETING);
        store.append(greeting);

        Self {
            store,
            generator,
            loading: false,
            pending: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.store.snapshot()
    }

    /// True while a reply is being generated. Input must stay disabled.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generator_label(&self) -> String {
        self.generator.label()
    }

    /// Append the user message and start generating the reply in the
    /// background. Must be called from within a tokio runtime.
    pub fn start_turn(&mut self, content: &str) -> Result<(), TurnRejected> {
        let content = content.trim();
        if content.is_empty() {
            return Err(TurnRejected::Empty);
        }
        if self.loading {
            return Err(TurnRejected::Busy);
        }

        let history = match self.generator.context_window() {
            Some(n) => self.store.recent(n).to_vec(),
            None => self.store.snapshot().to_vec(),
        };
        let user_message = self.store.compose(Role::User, content);
        self.store.append(user_message);
        self.loading = true;

        info!(chars = content.chars().count(), generator = %self.generator.label(), "turn started");

        let generator = Arc::clone(&self.generator);
        let utterance = content.to_string();
        self.pending = Some(tokio::spawn(async move {
            generator.generate(&history, &utterance).await
        }));
        Ok(())
    }

    /// Finish the turn if its reply is ready; never waits
    pub async fn poll_turn(&mut self) -> Option<TurnOutcome> {
        if self.pending.as_ref().is_some_and(|task| task.is_finished()) {
            self.wait_turn().await
        } else {
            None
        }
    }

    /// Wait for the pending reply, if any, and finish the turn
    pub async fn wait_turn(&mut self) -> Option<TurnOutcome> {
        let task = self.pending.take()?;
        let result = task.await;
        Some(self.finish_turn(result))
    }

    /// Run a whole turn: submit and wait for the reply
    pub async fn send(&mut self, content: &str) -> Result<TurnOutcome, TurnRejected> {
        self.start_turn(content)?;
        Ok(self.wait_turn().await.unwrap_or(TurnOutcome::Failed))
    }

    fn finish_turn(&mut self, result: Result<Result<String, GenerateError>, JoinError>) -> TurnOutcome {
        let result = result.unwrap_or_else(|e| Err(GenerateError::Aborted(e.to_string())));

        let (content, outcome) = match result {
            Ok(reply) => (reply, TurnOutcome::Replied),
            Err(e) => {
                error!(error = %e, "Error generating response");
                (FALLBACK_REPLY.to_string(), TurnOutcome::Failed)
            }
        };

        let reply = self.store.compose(Role::Assistant, content);
        self.store.append(reply);
        self.loading = false;

        info!(?outcome, messages = self.store.len(), "turn finished");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::openai::OpenAIGenerator;
    use crate::generator::testing::serve_once;
    use crate::generator::MockGenerator;
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tokio::sync::Notify;

    fn mock_conversation() -> Conversation {
        let generator = MockGenerator::with_rng(StdRng::seed_from_u64(3)).with_delay(0, 0);
        Conversation::new(Arc::new(generator))
    }

    struct FailingGenerator;

    #[async_trait]
    impl ResponseGenerator for FailingGenerator {
        async fn generate(&self, _history: &[Message], _utterance: &str) -> Result<String, GenerateError> {
            Err(GenerateError::Aborted("always fails".to_string()))
        }

        fn label(&self) -> String {
            "failing".to_string()
        }
    }

    struct PanickingGenerator;

    #[async_trait]
    impl ResponseGenerator for PanickingGenerator {
        async fn generate(&self, _history: &[Message], _utterance: &str) -> Result<String, GenerateError> {
            panic!("generator bug");
        }

        fn label(&self) -> String {
            "panicking".to_string()
        }
    }

    /// Replies only once released, so tests can observe the pending state
    struct GatedGenerator {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl ResponseGenerator for GatedGenerator {
        async fn generate(&self, history: &[Message], utterance: &str) -> Result<String, GenerateError> {
            self.gate.notified().await;
            Ok(format!("{} prior, got {}", history.len(), utterance))
        }

        fn label(&self) -> String {
            "gated".to_string()
        }
    }

    #[test]
    fn test_starts_with_greeting() {
        let conversation = mock_conversation();
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].role, Role::Assistant);
        assert_eq!(conversation.messages()[0].content, GREETING);
        assert!(!conversation.is_loading());
    }

    #[tokio::test]
    async fn test_successful_turns_add_two_messages_each() {
        let mut conversation = mock_conversation();
        let greeting_id = conversation.messages()[0].id;

        for (i, text) in ["hello there friend", "second message", "third"].iter().enumerate() {
            let outcome = conversation.send(text).await.unwrap();
            assert_eq!(outcome, TurnOutcome::Replied);
            assert_eq!(conversation.messages().len(), 1 + 2 * (i + 1));
        }

        let messages = conversation.messages();
        assert_eq!(messages[0].id, greeting_id);
        assert_eq!(messages[0].content, GREETING);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "hello there friend");
        assert_eq!(messages[2].role, Role::Assistant);
        assert!(messages[2].content.contains("friend there hello"));
        assert!(messages.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_failed_turn_appends_fallback() {
        let mut conversation = Conversation::new(Arc::new(FailingGenerator));
        let outcome = conversation.send("hi").await.unwrap();

        assert_eq!(outcome, TurnOutcome::Failed);
        assert_eq!(conversation.messages().len(), 3);
        assert_eq!(conversation.messages()[2].content, FALLBACK_REPLY);
        assert!(!conversation.is_loading());

        // The session keeps working after a failure
        let outcome = conversation.send("again").await.unwrap();
        assert_eq!(outcome, TurnOutcome::Failed);
        assert_eq!(conversation.messages().len(), 5);
        assert_eq!(conversation.messages()[0].content, GREETING);
    }

    #[tokio::test]
    async fn test_panicking_generator_is_caught() {
        let mut conversation = Conversation::new(Arc::new(PanickingGenerator));
        let outcome = conversation.send("hi").await.unwrap();
        assert_eq!(outcome, TurnOutcome::Failed);
        assert_eq!(conversation.messages().last().unwrap().content, FALLBACK_REPLY);
        assert!(!conversation.is_loading());
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let mut conversation = mock_conversation();
        assert_eq!(conversation.start_turn("   \n\t"), Err(TurnRejected::Empty));
        assert_eq!(conversation.send("").await, Err(TurnRejected::Empty));
        assert_eq!(conversation.messages().len(), 1);
        assert!(!conversation.is_loading());
        assert!(conversation.wait_turn().await.is_none());
    }

    #[tokio::test]
    async fn test_second_submission_rejected_while_pending() {
        let gate = Arc::new(Notify::new());
        let mut conversation = Conversation::new(Arc::new(GatedGenerator { gate: Arc::clone(&gate) }));

        conversation.start_turn("first").unwrap();
        assert!(conversation.is_loading());
        assert_eq!(conversation.messages().len(), 2);

        assert_eq!(conversation.start_turn("second"), Err(TurnRejected::Busy));
        assert_eq!(conversation.messages().len(), 2);
        assert!(conversation.poll_turn().await.is_none());

        gate.notify_one();
        assert_eq!(conversation.wait_turn().await, Some(TurnOutcome::Replied));
        assert!(!conversation.is_loading());
        // History handed to the generator excludes the new utterance
        assert_eq!(conversation.messages()[2].content, "1 prior, got first");

        gate.notify_one();
        assert_eq!(conversation.send("second").await, Ok(TurnOutcome::Replied));
        assert_eq!(conversation.messages().len(), 5);
        assert_eq!(conversation.messages()[4].content, "3 prior, got second");
    }

    #[tokio::test]
    async fn test_message_is_trimmed() {
        let mut conversation = mock_conversation();
        conversation.send("  padded  ").await.unwrap();
        assert_eq!(conversation.messages()[1].content, "padded");
    }

    #[tokio::test]
    async fn test_openai_missing_key_replies_with_advisory() {
        let generator = OpenAIGenerator::new(None)
            .with_endpoint("http://127.0.0.1:9/v1/chat/completions");
        let mut conversation = Conversation::new(Arc::new(generator));

        let outcome = conversation.send("hello").await.unwrap();
        assert_eq!(outcome, TurnOutcome::Replied);
        assert_eq!(
            conversation.messages()[2].content,
            crate::generator::openai::MISSING_KEY_ADVISORY
        );
    }

    #[tokio::test]
    async fn test_openai_error_status_ends_in_fallback() {
        let stub = serve_once(503, r#"{"error":"unavailable"}"#).await;
        let generator = OpenAIGenerator::new(Some("sk-test".to_string())).with_endpoint(&stub.url);
        let mut conversation = Conversation::new(Arc::new(generator));

        let outcome = conversation.send("hello").await.unwrap();
        assert_eq!(outcome, TurnOutcome::Failed);
        assert_eq!(conversation.messages().len(), 3);
        assert_eq!(conversation.messages()[2].content, FALLBACK_REPLY);
        assert!(!conversation.is_loading());
    }
}
