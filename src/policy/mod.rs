//! Rule engine for navfilter.
//!
//! This module provides the TOML rule-set document ([`config`]), pattern
//! compilation ([`pattern`]), compiled rules ([`rule`]), the shipped rule set
//! ([`builtin`]), the evaluation engine ([`evaluator`]) that decides whether
//! each request is allowed, blocked or redirected, and hot reload ([`reload`]).

pub mod builtin;
pub mod config;
pub mod evaluator;
pub mod pattern;
pub mod reload;
pub mod rule;

pub use evaluator::{DispositionEngine, Evaluation, RequestDescriptor, Tier};
pub use reload::EngineHandle;
pub use rule::{Disposition, Rule};
