//! Shared building blocks for the review scoring service: configuration
//! handling, error types, the request/response DTOs and the chat completion
//! client used to obtain rating predictions.

pub mod config;
pub mod dto;
pub mod error;
pub mod openai_client;
