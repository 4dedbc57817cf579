// src/core/mod.rs — Feedback loop engine

pub mod cleaner;
pub mod generator;
pub mod orchestrator;
pub mod project;
pub mod prompts;
pub mod session;
pub mod state_machine;
pub mod suite_store;
pub mod types;
