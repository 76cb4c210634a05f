//! Answer generation
//!
//! A strictly linear `summarize → verify → refine` pipeline. Each stage is a
//! single LLM call; a failing stage stops the run and the state reached so far
//! is returned with it.

mod pipeline;
pub mod prompts;

pub use pipeline::*;
