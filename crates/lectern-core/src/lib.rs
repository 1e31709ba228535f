//! lectern-core — Answer grading, markdown conversion and reader state.
//!
//! This crate defines the worksheet and answer-set model, the similarity
//! grader with its outcome policy, the line-oriented markdown converter and
//! the navigation/notes helpers that the CLI and report crates build on.

pub mod config;
pub mod engine;
pub mod error;
pub mod grader;
pub mod markdown;
pub mod model;
pub mod parser;
pub mod reader;
pub mod report;
pub mod session;
pub mod similarity;
pub mod sources;
pub mod traits;
