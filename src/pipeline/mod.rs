//! Running whole programs.
//!
//! Drives a root module through every stage and hands back its value and
//! exports, or the first stage that failed.

pub mod pipeline;
