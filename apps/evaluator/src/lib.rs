//! False-rejection-rate evaluation of candidate screening systems.
//!
//! A keyword-matching baseline and a multi-stage system (fuzzy scoring plus
//! confidence-based review triage) screen the same candidates; the statistics
//! module compares how many qualified candidates each one rejected.

pub mod config;
pub mod errors;
pub mod evaluation;
pub mod extraction;
pub mod llm_client;
pub mod models;
pub mod scoring;
pub mod skills;
pub mod stats;
pub mod triage;
