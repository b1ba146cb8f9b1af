//! Narrator engine.
//!
//! Runs one chat turn end to end: campaign state, memory retrieval, the model
//! call, post-processing of the reply, and the persistence that follows it.

pub mod memory;
pub mod narrator;
