//! Domain logic for the Chromance RPG backend.
//!
//! This crate has no I/O. Handlers and repositories pass plain data in and
//! get decisions back: validation results, narrative phases, detected rewards,
//! extracted player actions, prompts, and similarity rankings.

pub mod actions;
pub mod campaigns;
pub mod combat;
pub mod error;
pub mod lore;
pub mod pagination;
pub mod progression;
pub mod prompt;
pub mod ranking;
pub mod rewards;
pub mod types;
pub mod validation;
