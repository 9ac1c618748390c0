//! LLM integration for rhetor.
//!
//! One gateway, many backends: [`ChatGateway`] speaks to any of the
//! supported chat-completion services through a [`ProviderKind`] variant
//! selected at construction time. Each variant contributes only its request
//! body shape and response extraction path; transport, error mapping, and
//! response normalization exist exactly once.
//!
//! ```ignore
//! use rhetor::llm::{ChatGateway, GenerationRequest, LlmProvider, Message, ProviderKind};
//!
//! let gateway = ChatGateway::new(ProviderKind::LmStudio);
//! let request = GenerationRequest::new(vec![
//!     Message::system("You are terse."),
//!     Message::user("Say hello."),
//! ])
//! .with_temperature(0.8);
//! let text = gateway.generate(request).await?;
//! ```

pub mod client;
pub mod provider;

pub use client::{ChatGateway, GenerationRequest, LlmProvider, Message};
pub use provider::ProviderKind;
