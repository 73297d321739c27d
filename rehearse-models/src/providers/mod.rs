//! Model provider trait and implementations.
//!
//! The [`ModelProvider`] trait is the single seam between rehearse and a
//! language model. The role-play responder and the feedback generator hold an
//! `Arc<dyn ModelProvider>` and never see the wire format.
//!
//! # Example
//!
//! ```ignore
//! use rehearse_models::providers::{ChatRequest, Message, ModelProvider};
//!
//! async fn chat(provider: &dyn ModelProvider) {
//!     let request = ChatRequest::new("gpt-4o-mini", vec![Message::user("Hello!")]);
//!     let response = provider.chat(request).await?;
//!     println!("Response: {}", response.content);
//! }
//! ```

#[cfg(any(test, feature = "mock"))]
pub mod mock;
mod openai;
mod types;

use async_trait::async_trait;

pub use openai::{DEFAULT_BASE_URL, OpenAiCompatProvider};
pub use types::*;

use crate::Result;

/// Trait for chat-completion providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Returns the provider name (e.g., "openai", "mock").
    fn name(&self) -> &str;

    /// Perform a chat completion request.
    ///
    /// # Arguments
    ///
    /// * `request` - The chat request containing messages, model, and parameters
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;
}
