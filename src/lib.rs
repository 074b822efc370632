//! # navfilter
//!
//! **Request disposition engine for an embedded browser runtime.**
//!
//! The host application hands every outgoing navigation and subresource
//! request to a [`DispositionEngine`](policy::DispositionEngine) before it goes
//! onto the wire. The engine classifies the request by URL and resource
//! category against a small, ordered rule table and answers with one of three
//! dispositions: allow, block, or redirect. Enforcing the answer is the host's
//! job; the engine performs no I/O.
//!
//! ## Architecture
//!
//! - **[`category`]**: closed set of resource categories and host tag synonyms
//! - **[`policy`]**: TOML rule sets, pattern compilation, evaluation, hot reload
//! - **[`response`]**: disposition rendered as the host callback response
//! - **[`cli`]**: command-line interface (clap) for checking URLs and rule sets
//! - **[`error`]**: unified error types using `thiserror`
//!
//! ## Precedence
//!
//! 1. Passthrough rules: always allow, checked before anything else.
//! 2. Ordered rules: first match wins.
//! 3. Default: allow.
//!
//! ## Example
//!
//! ```no_run
//! use navfilter::category::ResourceCategory;
//! use navfilter::policy::{Disposition, DispositionEngine, RequestDescriptor};
//!
//! let engine = DispositionEngine::builtin()?;
//! let req = RequestDescriptor::new("https://m.facebook.com/watch", ResourceCategory::MainFrame);
//! assert_eq!(
//!     engine.evaluate(&req),
//!     Disposition::Redirect("https://m.facebook.com/me".to_string())
//! );
//! # Ok::<(), navfilter::error::NavFilterError>(())
//! ```

pub mod category;
pub mod cli;
pub mod error;
pub mod policy;
pub mod response;
