//! Layered override resolution.
//!
//! This module provides the [`ConfigResolver`], which layers four sources of
//! truth over each other in fixed precedence order:
//!
//! 1. The Default Table (lowest precedence)
//! 2. An optional JSON configuration file
//! 3. Environment variables matching schema keys
//! 4. Command-line flags (highest precedence)
//!
//! Every pass mutates the same record; a later pass's successful coercion
//! overwrites an earlier pass's value for that key, and a skipped or failed
//! coercion leaves the earlier value untouched. No failure aborts
//! resolution: the resolver always yields a usable [`Config`].
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
//! let (config, report) = ConfigResolver::from_env(&env)
//!     .with_file("archiver-config.json")
//!     .with_env(&env)
//!     .with_cli(&args)
//!     .finish();
//!
//! println!("archiver listening on {}:{}", config.ip, config.port);
//! # let _ = report;
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::coerce::{coerce_cli, coerce_env, Coerced, FlagValue};
use crate::merge::deep_merge;
use crate::{Config, ConfigError, SCHEMA};

/// Outcome of the file override pass.
#[derive(Debug, Default)]
pub enum FileOutcome {
    /// No file at the given path, or the pass was not run. Not an error.
    #[default]
    Absent,
    /// The file parsed and was merged over the record.
    Merged,
    /// The file exists but was rejected; previous values were kept.
    Rejected(ConfigError),
}

/// What happened to a single key during the env or CLI pass.
#[derive(Debug)]
pub enum KeyAction {
    /// The coerced value was written to the record.
    Applied,
    /// The value was rejected and the key kept its previous value.
    Rejected(ConfigError),
}

/// Per-key outcome recorded by the env and CLI passes.
///
/// Only keys actually present in the source appear; a key with no matching
/// environment variable or flag produces no outcome at all.
#[derive(Debug)]
pub struct KeyOutcome {
    /// The schema key.
    pub key: &'static str,
    /// What happened to it.
    pub action: KeyAction,
}

impl KeyOutcome {
    fn applied(key: &'static str) -> Self {
        Self {
            key,
            action: KeyAction::Applied,
        }
    }

    fn rejected(key: &'static str, error: ConfigError) -> Self {
        Self {
            key,
            action: KeyAction::Rejected(error),
        }
    }
}

/// Record of what every pass did during resolution.
///
/// Fail-open behavior means errors never surface to the caller as `Err`;
/// they surface here instead, so callers and tests can assert on pass
/// outcomes rather than only on the resulting field values.
#[derive(Debug, Default)]
pub struct ResolutionReport {
    /// Outcome of the file pass.
    pub file: FileOutcome,
    /// Outcomes of the environment pass, one per matched key.
    pub env: Vec<KeyOutcome>,
    /// Outcomes of the CLI pass, one per matched flag.
    pub cli: Vec<KeyOutcome>,
}

/// Layered configuration resolver.
///
/// The resolver owns the record while the passes run and hands it back from
/// [`finish`](Self::finish). Passes are applied in call order; callers are
/// expected to chain file, then env, then CLI to get the documented
/// precedence.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use archiver_config::{Config, ConfigResolver};
///
/// let env = HashMap::from([("VERBOSE".to_string(), "true".to_string())]);
/// let (config, _report) = ConfigResolver::new(Config::default())
///     .with_env(&env)
///     .finish();
/// assert!(config.verbose);
/// ```
#[derive(Debug, Default)]
pub struct ConfigResolver {
    config: Config,
    report: ResolutionReport,
}

impl ConfigResolver {
    /// Create a resolver over an explicit default record.
    #[must_use]
    pub fn new(defaults: Config) -> Self {
        Self {
            config: defaults,
            report: ResolutionReport::default(),
        }
    }

    /// Create a resolver over [`Config::bootstrap`] defaults.
    ///
    /// The bootstrap fields (public key, secret key, global account) are
    /// resolved from `env` at construction time, ahead of the override
    /// passes.
    #[must_use]
    pub fn from_env(env: &HashMap<String, String>) -> Self {
        Self::new(Config::bootstrap(env))
    }

    /// Run the file override pass.
    ///
    /// A missing file is skipped silently. A file that exists but cannot be
    /// read or parsed is logged at warn level and skipped; the record keeps
    /// its previous values. A parsed document is deep-merged over the
    /// record: nested objects key-by-key, sequences replaced wholesale,
    /// unknown keys ignored.
    #[must_use]
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.report.file = self.apply_file(path.as_ref());
        self
    }

    /// Run the environment override pass.
    ///
    /// Every schema key is looked up by its exact name in `env` and, when
    /// set, coerced by its declared tag. Empty values are treated as unset.
    /// A malformed object value is logged at error level and the key keeps
    /// its previous value.
    #[must_use]
    pub fn with_env(mut self, env: &HashMap<String, String>) -> Self {
        for &(key, kind) in SCHEMA {
            let Some(raw) = env.get(key) else { continue };
            if raw.is_empty() {
                continue;
            }
            let outcome = match coerce_env(key, kind, raw)
                .and_then(|value| apply_override(&mut self.config, key, value))
            {
                Ok(()) => KeyOutcome::applied(key),
                Err(error) => {
                    tracing::error!(key, error = %error, "environment override rejected");
                    KeyOutcome::rejected(key, error)
                }
            };
            self.report.env.push(outcome);
        }
        self
    }

    /// Run the CLI override pass.
    ///
    /// The first two entries of `args` are the program and script
    /// identifiers and are not scanned. The rest are parsed into a flag map
    /// (`--KEY value`, `--KEY=value`, or a bare `--KEY`); flags whose name
    /// is not a schema key are ignored. Object-typed keys cannot be set
    /// from the CLI.
    #[must_use]
    pub fn with_cli(mut self, args: &[String]) -> Self {
        let flags = scan_flags(args);
        for &(key, kind) in SCHEMA {
            let Some(flag) = flags.get(key) else { continue };
            let Some(value) = coerce_cli(kind, flag) else {
                continue;
            };
            let outcome = match apply_override(&mut self.config, key, value) {
                Ok(()) => KeyOutcome::applied(key),
                Err(error) => {
                    tracing::error!(key, error = %error, "CLI override rejected");
                    KeyOutcome::rejected(key, error)
                }
            };
            self.report.cli.push(outcome);
        }
        self
    }

    /// Finalize and return the resolved record with the pass report.
    #[must_use]
    pub fn finish(self) -> (Config, ResolutionReport) {
        (self.config, self.report)
    }

    fn apply_file(&mut self, path: &Path) -> FileOutcome {
        if !path.exists() {
            return FileOutcome::Absent;
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => return self.reject_file(ConfigError::file_read(path, e)),
        };

        let document: serde_json::Value = match serde_json::from_str(&content) {
            Ok(document) => document,
            Err(e) => return self.reject_file(ConfigError::file_parse(path, e)),
        };

        let mut current = match serde_json::to_value(&self.config) {
            Ok(current) => current,
            Err(e) => return self.reject_file(ConfigError::file_decode(path, e)),
        };
        deep_merge(&mut current, &document);

        match serde_json::from_value(current) {
            Ok(merged) => {
                self.config = merged;
                FileOutcome::Merged
            }
            Err(e) => self.reject_file(ConfigError::file_decode(path, e)),
        }
    }

    fn reject_file(&self, error: ConfigError) -> FileOutcome {
        tracing::warn!(error = %error, "configuration file rejected; keeping previous values");
        FileOutcome::Rejected(error)
    }
}

/// Resolve a configuration record from all four sources.
///
/// Convenience wrapper over [`ConfigResolver`] for callers that do not need
/// the [`ResolutionReport`]. Never fails; every malformed input degrades to
/// keeping the previous value for the affected key.
pub fn resolve<P: AsRef<Path>>(
    defaults: Config,
    file_path: P,
    env: &HashMap<String, String>,
    args: &[String],
) -> Config {
    let (config, _report) = ConfigResolver::new(defaults)
        .with_file(file_path)
        .with_env(env)
        .with_cli(args)
        .finish();
    config
}

/// Scan arguments after the two leading positional entries into a flag map.
fn scan_flags(args: &[String]) -> HashMap<String, FlagValue> {
    let mut flags = HashMap::new();
    let mut iter = args.iter().skip(2).peekable();

    while let Some(arg) = iter.next() {
        let Some(name) = arg.strip_prefix("--") else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        if let Some((key, value)) = name.split_once('=') {
            flags.insert(key.to_string(), FlagValue::Value(value.to_string()));
            continue;
        }
        match iter.peek() {
            Some(next) if !next.starts_with("--") => {
                let value = (*next).clone();
                iter.next();
                flags.insert(name.to_string(), FlagValue::Value(value));
            }
            _ => {
                flags.insert(name.to_string(), FlagValue::Switch);
            }
        }
    }

    flags
}

// Write a coerced value to its field. The coercion was driven by the same
// schema table, so a tag/variant mismatch cannot occur; only decoding an
// object into its fixed sub-shape can fail.
fn apply_override(config: &mut Config, key: &str, value: Coerced) -> Result<(), ConfigError> {
    match (key, value) {
        ("ARCHIVER_IP", Coerced::String(v)) => config.ip = v,
        ("ARCHIVER_PORT", Coerced::Number(v)) => config.port = v,
        ("ARCHIVER_HASH_KEY", Coerced::String(v)) => config.hash_key = v,
        ("ARCHIVER_PUBLIC_KEY", Coerced::String(v)) => config.public_key = v,
        ("ARCHIVER_SECRET_KEY", Coerced::String(v)) => config.secret_key = v,
        ("ARCHIVER_LOGS", Coerced::String(v)) => config.logs_dir = v,
        ("ARCHIVER_DB", Coerced::String(v)) => config.db_dir = v,
        ("DATASENDER_TIMEOUT", Coerced::Number(v)) => config.data_sender_timeout = v,
        ("RATE_LIMIT", Coerced::Number(v)) => config.rate_limit = v,
        ("N_NODE_REJECT_PERCENT", Coerced::Number(v)) => config.node_reject_percent = v,
        ("N_NODELIST", Coerced::Number(v)) => config.nodelist_limit = v,
        ("N_RANDOM_NODELIST_BUCKETS", Coerced::Number(v)) => config.random_nodelist_buckets = v,
        ("STATISTICS", Coerced::Object(v)) => {
            config.statistics = decode_section(key, v)?;
        }
        ("MODE", Coerced::String(v)) => config.mode = v,
        ("DEBUG", Coerced::Object(v)) => {
            config.debug = decode_section(key, v)?;
        }
        ("dataLogWrite", Coerced::Bool(v)) => config.data_log_write = v,
        ("dataLogWriter", Coerced::Object(v)) => {
            config.data_log_writer = decode_section(key, v)?;
        }
        ("experimentalSnapshot", Coerced::Bool(v)) => config.experimental_snapshot = v,
        ("VERBOSE", Coerced::Bool(v)) => config.verbose = v,
        ("useSerialization", Coerced::Bool(v)) => config.use_serialization = v,
        ("useSyncV2", Coerced::Bool(v)) => config.use_sync_v2 = v,
        ("sendActiveMessage", Coerced::Bool(v)) => config.send_active_message = v,
        ("globalAccount", Coerced::String(v)) => config.global_account = v,
        _ => {}
    }
    Ok(())
}

fn decode_section<T: serde::de::DeserializeOwned>(
    key: &str,
    value: serde_json::Value,
) -> Result<T, ConfigError> {
    serde_json::from_value(value).map_err(|e| ConfigError::value_malformed(key, e))
}
