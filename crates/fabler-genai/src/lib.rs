//! Clients for the upstream generation providers.
//!
//! Each client owns a `reqwest::Client` with an explicit timeout and exposes
//! a small typed surface over the provider's wire format. The traits here
//! ([`ImageGenerator`], [`MediaFetcher`], [`MuxService`]) are the seams the
//! video pipeline mocks in tests.

pub mod chat;
pub mod fetch;
pub mod image;
pub mod mux;
pub mod tts;

pub use chat::{ChatClient, ChatMessage, ChatOptions};
pub use fetch::{HttpMediaFetcher, MediaFetcher};
pub use image::{ImageGenerator, OpenAiImageClient, RunwareImageClient};
pub use mux::{HttpMuxService, MuxOutcome, MuxRequest, MuxService};
pub use tts::SpeechClient;
