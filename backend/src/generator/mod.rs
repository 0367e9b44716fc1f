//! Remark generation on top of a chat-completion service.
//!
//! [`CommentaryGenerator::generate`] never fails. Every upstream error is
//! logged and replaced by [`FALLBACK_LINE`].

mod error;
mod openai;

use std::sync::Arc;

use tracing::instrument;

pub use error::GenerationError;
pub use openai::OpenAiClient;

use crate::prompt::Prompt;

/// Said by the persona when no remark could be generated
pub const FALLBACK_LINE: &str = "Ik weet effe niks zinnigs te zeggen, maat.";

/// Sampling temperature for every remark
pub const TEMPERATURE: f32 = 0.8;

/// One chat-style completion request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatRequest<'a> {
    /// Identity line setting the voice
    pub system_message: &'a str,
    /// The composed prompt
    pub user_message: &'a str,
    /// Sampling temperature
    pub temperature: f32,
}

/// A chat-completion service
#[async_trait::async_trait]
pub trait ChatCompletionApi: Send + Sync {
    /// Returns the text of the top completion
    async fn complete(&self, request: ChatRequest<'_>) -> Result<String, GenerationError>;
}

/// Where the text of a [`Commentary`] came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentarySource {
    /// Written by the language model, possibly served from cache
    Generated,
    /// [`FALLBACK_LINE`], because generation failed
    Fallback,
}

/// A remark ready to be spoken
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commentary {
    /// The remark itself
    pub text: String,
    /// Where `text` came from
    pub source: CommentarySource,
}

impl Commentary {
    /// The fixed line used when generation failed
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            text: FALLBACK_LINE.to_string(),
            source: CommentarySource::Fallback,
        }
    }

    /// Whether this is the fallback line rather than a generated remark
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == CommentarySource::Fallback
    }
}

/// Generates remarks, making exactly one upstream attempt per call
pub struct CommentaryGenerator {
    chat: Arc<dyn ChatCompletionApi>,
}

impl CommentaryGenerator {
    /// Creates a generator on top of `chat`
    #[must_use]
    pub fn new(chat: Arc<dyn ChatCompletionApi>) -> Self {
        Self { chat }
    }

    /// Generates a remark for `prompt` in the voice set by `system_message`
    #[instrument(skip_all)]
    pub async fn generate(&self, prompt: &Prompt, system_message: &str) -> Commentary {
        let request = ChatRequest {
            system_message,
            user_message: prompt.as_str(),
            temperature: TEMPERATURE,
        };

        match self.chat.complete(request).await {
            Ok(text) => Commentary {
                text,
                source: CommentarySource::Generated,
            },
            Err(e) => {
                tracing::error!(error = %e, "Text generation failed, using fallback line");
                Commentary::fallback()
            }
        }
    }
}

/// Scriptable chat-completion service for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::{ChatCompletionApi, ChatRequest, GenerationError};

    /// A request as seen by [`MockChatApi`]
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedRequest {
        /// System message as sent
        pub system_message: String,
        /// User message as sent
        pub user_message: String,
        /// Temperature as sent
        pub temperature: f32,
    }

    /// Scripted chat-completion service.
    ///
    /// Replies are consumed in order; once exhausted every call fails.
    #[derive(Debug, Default)]
    pub struct MockChatApi {
        replies: Mutex<VecDeque<Option<String>>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl MockChatApi {
        /// Always answers `reply`
        #[must_use]
        pub fn replying(reply: &str) -> Self {
            let mock = Self::default();
            mock.push_reply(reply);
            mock
        }

        /// Fails every call
        #[must_use]
        pub fn failing() -> Self {
            Self::default()
        }

        /// Queues one more successful answer
        ///
        /// # Panics
        ///
        /// Panics if the internal lock is poisoned
        pub fn push_reply(&self, reply: &str) {
            self.replies
                .lock()
                .unwrap()
                .push_back(Some(reply.to_string()));
        }

        /// Queues one failing call
        ///
        /// # Panics
        ///
        /// Panics if the internal lock is poisoned
        pub fn push_failure(&self) {
            self.replies.lock().unwrap().push_back(None);
        }

        /// All requests received, in call order
        ///
        /// # Panics
        ///
        /// Panics if the internal lock is poisoned
        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl ChatCompletionApi for MockChatApi {
        async fn complete(&self, request: ChatRequest<'_>) -> Result<String, GenerationError> {
            self.requests.lock().unwrap().push(RecordedRequest {
                system_message: request.system_message.to_string(),
                user_message: request.user_message.to_string(),
                temperature: request.temperature,
            });

            let mut replies = self.replies.lock().unwrap();
            // The last successful reply keeps answering
            let reply = if replies.len() > 1 {
                replies.pop_front().flatten()
            } else {
                replies.front().cloned().flatten()
            };

            reply.ok_or_else(|| GenerationError::Network("connection refused".to_string()))
        }
    }
}
