//! Review scoring service: loads a CSV of customer reviews, asks a chat
//! completion model for food/delivery ratings and an acceptance confidence,
//! and scores those predictions against the ground truth in the file.

pub mod handlers;
pub mod loader;
pub mod parser;
pub mod pipeline;
pub mod prompt;
pub mod scoring;
