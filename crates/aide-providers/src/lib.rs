//! # aide-providers
//!
//! Completion backends. Currently one: any OpenAI-compatible chat
//! completions endpoint.

pub mod openai;

pub use openai::OpenAiCompletion;
