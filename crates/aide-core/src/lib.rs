//! # aide-core
//!
//! Core types, traits, configuration, and error handling for the Aide
//! scheduling assistant.

pub mod config;
pub mod error;
pub mod event;
pub mod message;
pub mod traits;
