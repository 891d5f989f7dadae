//! Layered configuration resolution for the archiver node.
//!
//! This crate resolves the single process-wide [`Config`] record by layering
//! four sources of truth in fixed precedence order:
//!
//! 1. Hardcoded defaults (the Default Table)
//! 2. An optional JSON configuration file
//! 3. Environment variables named exactly like schema keys
//! 4. Command-line flags (highest precedence)
//!
//! Resolution is fail-open: a missing file is expected, a malformed file or
//! environment value is logged and skipped, and the resolver always returns
//! a complete, typed record. Each pass records what it did in a
//! [`ResolutionReport`] so callers can inspect outcomes instead of log
//! output.
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use archiver_config::ConfigResolver;
//!
//! let env: HashMap<String, String> = std::env::vars().collect();
//! let args: Vec<String> = std::env::args().collect();
//!
//! let (config, _report) = ConfigResolver::from_env(&env)
//!     .with_file("archiver-config.json")
//!     .with_env(&env)
//!     .with_cli(&args)
//!     .finish();
//!
//! println!("rate limit: {} req/s", config.rate_limit);
//! ```
//!
//! # Configuration File Format
//!
//! The file is a JSON document containing any subset of the record, nested
//! sections included:
//!
//! ```json
//! {
//!   "ARCHIVER_IP": "0.0.0.0",
//!   "ARCHIVER_PORT": 4100,
//!   "STATISTICS": { "interval": 5 },
//!   "dataLogWrite": false
//! }
//! ```
//!
//! Nested objects merge key-by-key over the current values; sequences are
//! replaced wholesale; keys the Default Table does not know are ignored.
//!
//! # Environment and CLI Overrides
//!
//! One environment variable per schema key, name-identical, e.g.
//! `ARCHIVER_PORT=4100`, `VERBOSE=true`, or for object-typed keys a JSON
//! string such as `STATISTICS='{"save":false,"interval":5}'`. CLI flags use
//! the same names (`--ARCHIVER_PORT 4100`, `--VERBOSE`); object-typed keys
//! are not settable from the CLI.
//!
//! Every override is coerced by the type tag its key is declared with in
//! [`SCHEMA`]; the tag is fixed by the Default Table and never widens.

#![warn(missing_docs)]

mod coerce;
mod error;
mod merge;
mod resolver;
mod schema;

pub use coerce::{coerce_cli, coerce_env, Coerced, FlagValue};
pub use error::ConfigError;
pub use resolver::{
    resolve, ConfigResolver, FileOutcome, KeyAction, KeyOutcome, ResolutionReport,
};
pub use schema::{
    Config, DataLogWriterConfig, DebugConfig, StatisticsConfig, ValueKind, SCHEMA,
};
