//! timequiz-core: Quiz session state machine, grading, and scoring.
//!
//! This crate defines the data model, the storage and clock traits, and the
//! session logic that the timequiz front end builds on.

pub mod bank;
pub mod error;
pub mod grading;
pub mod model;
pub mod persistence;
pub mod review;
pub mod scoring;
pub mod session;
pub mod traits;
