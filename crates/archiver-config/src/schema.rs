//! Configuration schema types and the static key table.
//!
//! The [`Config`] record is the single source of settings for the archiver
//! node. Its key set is closed: every key an override source may touch is
//! declared here, together with its wire name and its [`ValueKind`] tag in
//! [`SCHEMA`]. Coercion of untyped input is driven by that table, never by
//! inspecting a value's runtime shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The type tag a schema key is declared with.
///
/// Every key's tag is fixed by its entry in [`SCHEMA`] and never changes
/// across override passes; an override that cannot match the tag is dropped
/// for that key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A JSON number. Modeled as `f64` so that an unparseable override can
    /// still be written through as NaN.
    Number,
    /// A verbatim string.
    String,
    /// A boolean. String input matches `"true"` case-insensitively.
    Bool,
    /// A nested fixed-shape object, supplied as a JSON document.
    Object,
}

/// Static table of every schema key and its declared type tag.
///
/// The env and CLI passes iterate this table; keys not listed here can never
/// enter the resolved record.
pub const SCHEMA: &[(&str, ValueKind)] = &[
    ("ARCHIVER_IP", ValueKind::String),
    ("ARCHIVER_PORT", ValueKind::Number),
    ("ARCHIVER_HASH_KEY", ValueKind::String),
    ("ARCHIVER_PUBLIC_KEY", ValueKind::String),
    ("ARCHIVER_SECRET_KEY", ValueKind::String),
    ("ARCHIVER_LOGS", ValueKind::String),
    ("ARCHIVER_DB", ValueKind::String),
    ("DATASENDER_TIMEOUT", ValueKind::Number),
    ("RATE_LIMIT", ValueKind::Number),
    ("N_NODE_REJECT_PERCENT", ValueKind::Number),
    ("N_NODELIST", ValueKind::Number),
    ("N_RANDOM_NODELIST_BUCKETS", ValueKind::Number),
    ("STATISTICS", ValueKind::Object),
    ("MODE", ValueKind::String),
    ("DEBUG", ValueKind::Object),
    ("dataLogWrite", ValueKind::Bool),
    ("dataLogWriter", ValueKind::Object),
    ("experimentalSnapshot", ValueKind::Bool),
    ("VERBOSE", ValueKind::Bool),
    ("useSerialization", ValueKind::Bool),
    ("useSyncV2", ValueKind::Bool),
    ("sendActiveMessage", ValueKind::Bool),
    ("globalAccount", ValueKind::String),
];

/// The resolved archiver node configuration.
///
/// Constructed once at process bootstrap via [`Config::bootstrap`] (or
/// [`Config::default`] in tests), then mutated in place by the three
/// override passes of
/// [`ConfigResolver`](crate::ConfigResolver). After resolution the record is
/// treated as read-only shared state for the remainder of the process.
///
/// Field names on the wire (config file, environment, CLI flags) are the
/// renamed forms, e.g. `ARCHIVER_PORT` and `dataLogWriter`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Address the archiver binds and advertises.
    #[serde(rename = "ARCHIVER_IP", default = "default_ip")]
    pub ip: String,

    /// Port the archiver listens on.
    #[serde(rename = "ARCHIVER_PORT", default = "default_port")]
    pub port: f64,

    /// Key used when hashing network payloads.
    #[serde(rename = "ARCHIVER_HASH_KEY", default = "default_hash_key")]
    pub hash_key: String,

    /// This node's public key. Bootstrapped from the environment.
    #[serde(rename = "ARCHIVER_PUBLIC_KEY", default = "default_public_key")]
    pub public_key: String,

    /// This node's secret key. Bootstrapped from the environment.
    #[serde(rename = "ARCHIVER_SECRET_KEY", default = "default_secret_key")]
    pub secret_key: String,

    /// Directory the log writers place their output under.
    #[serde(rename = "ARCHIVER_LOGS", default = "default_logs_dir")]
    pub logs_dir: String,

    /// Directory holding the archiver database.
    #[serde(rename = "ARCHIVER_DB", default = "default_db_dir")]
    pub db_dir: String,

    /// Milliseconds without data before a sender is considered lost.
    #[serde(rename = "DATASENDER_TIMEOUT", default = "default_data_sender_timeout")]
    pub data_sender_timeout: f64,

    /// Allowed requests per second.
    #[serde(rename = "RATE_LIMIT", default = "default_rate_limit")]
    pub rate_limit: f64,

    /// Percentage of old nodes to drop from the node list.
    #[serde(rename = "N_NODE_REJECT_PERCENT", default = "default_node_reject_percent")]
    pub node_reject_percent: f64,

    /// Number of active nodes the node-list endpoint emits.
    #[serde(rename = "N_NODELIST", default = "default_nodelist_limit")]
    pub nodelist_limit: f64,

    /// Number of random node lists kept in the node-list cache.
    #[serde(
        rename = "N_RANDOM_NODELIST_BUCKETS",
        default = "default_random_nodelist_buckets"
    )]
    pub random_nodelist_buckets: f64,

    /// Statistics collection settings.
    #[serde(rename = "STATISTICS", default)]
    pub statistics: StatisticsConfig,

    /// Run mode, `"debug"` or `"release"`.
    #[serde(rename = "MODE", default = "default_mode")]
    pub mode: String,

    /// Developer debug settings.
    #[serde(rename = "DEBUG", default)]
    pub debug: DebugConfig,

    /// Whether the data-log writer is active.
    #[serde(rename = "dataLogWrite", default = "default_true")]
    pub data_log_write: bool,

    /// Data-log writer settings.
    #[serde(rename = "dataLogWriter", default)]
    pub data_log_writer: DataLogWriterConfig,

    /// Serve snapshot data from the experimental store.
    #[serde(rename = "experimentalSnapshot", default = "default_true")]
    pub experimental_snapshot: bool,

    /// Verbose logging.
    #[serde(rename = "VERBOSE", default)]
    pub verbose: bool,

    /// Use binary serialization on gossip payloads.
    #[serde(rename = "useSerialization", default = "default_true")]
    pub use_serialization: bool,

    /// Use the v2 cycle-sync protocol.
    #[serde(rename = "useSyncV2", default = "default_true")]
    pub use_sync_v2: bool,

    /// Send an active message when joining the network.
    #[serde(rename = "sendActiveMessage", default)]
    pub send_active_message: bool,

    /// Address of the network's global account. Bootstrapped from the
    /// environment via `GLOBAL_ACCOUNT`.
    #[serde(rename = "globalAccount", default = "default_global_account")]
    pub global_account: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ip: default_ip(),
            port: default_port(),
            hash_key: default_hash_key(),
            public_key: default_public_key(),
            secret_key: default_secret_key(),
            logs_dir: default_logs_dir(),
            db_dir: default_db_dir(),
            data_sender_timeout: default_data_sender_timeout(),
            rate_limit: default_rate_limit(),
            node_reject_percent: default_node_reject_percent(),
            nodelist_limit: default_nodelist_limit(),
            random_nodelist_buckets: default_random_nodelist_buckets(),
            statistics: StatisticsConfig::default(),
            mode: default_mode(),
            debug: DebugConfig::default(),
            data_log_write: true,
            data_log_writer: DataLogWriterConfig::default(),
            experimental_snapshot: true,
            verbose: false,
            use_serialization: true,
            use_sync_v2: true,
            send_active_message: false,
            global_account: default_global_account(),
        }
    }
}

impl Config {
    /// Build the Default Table, resolving the bootstrap fields from the
    /// given environment map.
    ///
    /// `ARCHIVER_PUBLIC_KEY`, `ARCHIVER_SECRET_KEY`, and `GLOBAL_ACCOUNT`
    /// are read here, at construction time, ahead of the override passes.
    /// The first two are also schema keys, so the environment pass applies
    /// them again with the same value; `GLOBAL_ACCOUNT` is not a schema key
    /// and is only honored here.
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use archiver_config::Config;
    ///
    /// let env: HashMap<String, String> =
    ///     [("ARCHIVER_PUBLIC_KEY".to_string(), "ab".repeat(32))].into();
    /// let config = Config::bootstrap(&env);
    /// assert_eq!(config.public_key, "ab".repeat(32));
    /// ```
    #[must_use]
    pub fn bootstrap(env: &HashMap<String, String>) -> Self {
        let mut config = Self::default();
        if let Some(value) = env.get("ARCHIVER_PUBLIC_KEY") {
            config.public_key.clone_from(value);
        }
        if let Some(value) = env.get("ARCHIVER_SECRET_KEY") {
            config.secret_key.clone_from(value);
        }
        if let Some(value) = env.get("GLOBAL_ACCOUNT") {
            config.global_account.clone_from(value);
        }
        config
    }
}

/// Statistics collection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StatisticsConfig {
    /// Persist collected statistics.
    #[serde(default = "default_true")]
    pub save: bool,

    /// Collection interval in seconds.
    #[serde(default = "default_statistics_interval")]
    pub interval: f64,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            save: true,
            interval: default_statistics_interval(),
        }
    }
}

/// Developer debug settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct DebugConfig {
    /// Hashed credential granting access to debug endpoints.
    #[serde(rename = "hashedDevAuth", default)]
    pub hashed_dev_auth: String,

    /// Public key trusted for signed debug requests.
    #[serde(rename = "devPublicKey", default)]
    pub dev_public_key: String,
}

/// Data-log writer settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DataLogWriterConfig {
    /// Directory the writer rotates files in.
    #[serde(rename = "dirName", default = "default_data_log_dir")]
    pub dir_name: String,

    /// Maximum number of rotated log files to keep.
    #[serde(rename = "maxLogFiles", default = "default_max_log_files")]
    pub max_log_files: f64,

    /// Receipt entries per log file.
    #[serde(rename = "maxReceiptEntries", default = "default_max_entries")]
    pub max_receipt_entries: f64,

    /// Cycle entries per log file.
    #[serde(rename = "maxCycleEntries", default = "default_max_entries")]
    pub max_cycle_entries: f64,

    /// Original-transaction entries per log file.
    #[serde(rename = "maxOriginalTxEntries", default = "default_max_entries")]
    pub max_original_tx_entries: f64,
}

impl Default for DataLogWriterConfig {
    fn default() -> Self {
        Self {
            dir_name: default_data_log_dir(),
            max_log_files: default_max_log_files(),
            max_receipt_entries: default_max_entries(),
            max_cycle_entries: default_max_entries(),
            max_original_tx_entries: default_max_entries(),
        }
    }
}

fn default_ip() -> String {
    "localhost".to_string()
}

fn default_port() -> f64 {
    4000.0
}

fn default_hash_key() -> String {
    "69fa4195670576c0160d660c3be36556ff8d504725be8a59b5a96509e0c994bc".to_string()
}

fn default_public_key() -> String {
    "758b1c119412298802cd28dbfa394cdfeecc4074492d60844cc192d632d84de3".to_string()
}

fn default_secret_key() -> String {
    "3be00019f23847529bd63e41124864983175063bb524bd54ea3c155f2fa12969\
     758b1c119412298802cd28dbfa394cdfeecc4074492d60844cc192d632d84de3"
        .to_string()
}

fn default_logs_dir() -> String {
    "archiver-logs".to_string()
}

fn default_db_dir() -> String {
    "archiver-db".to_string()
}

fn default_data_sender_timeout() -> f64 {
    // 5 minutes
    300_000.0
}

fn default_rate_limit() -> f64 {
    100.0
}

fn default_node_reject_percent() -> f64 {
    5.0
}

fn default_nodelist_limit() -> f64 {
    30.0
}

fn default_random_nodelist_buckets() -> f64 {
    10.0
}

fn default_mode() -> String {
    "debug".to_string()
}

fn default_global_account() -> String {
    "0".repeat(64)
}

fn default_statistics_interval() -> f64 {
    1.0
}

fn default_data_log_dir() -> String {
    "data-logs".to_string()
}

fn default_max_log_files() -> f64 {
    10.0
}

fn default_max_entries() -> f64 {
    1000.0
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ip, "localhost");
        assert_eq!(config.port, 4000.0);
        assert_eq!(config.logs_dir, "archiver-logs");
        assert_eq!(config.db_dir, "archiver-db");
        assert_eq!(config.data_sender_timeout, 300_000.0);
        assert_eq!(config.mode, "debug");
        assert!(config.data_log_write);
        assert!(!config.verbose);
        assert_eq!(config.global_account, "0".repeat(64));
    }

    #[test]
    fn test_default_sections() {
        let config = Config::default();
        assert!(config.statistics.save);
        assert_eq!(config.statistics.interval, 1.0);
        assert_eq!(config.debug.hashed_dev_auth, "");
        assert_eq!(config.data_log_writer.dir_name, "data-logs");
        assert_eq!(config.data_log_writer.max_log_files, 10.0);
        assert_eq!(config.data_log_writer.max_receipt_entries, 1000.0);
    }

    #[test]
    fn test_bootstrap_reads_env_fields() {
        let env: HashMap<String, String> = [
            ("ARCHIVER_PUBLIC_KEY".to_string(), "pk".to_string()),
            ("ARCHIVER_SECRET_KEY".to_string(), "sk".to_string()),
            ("GLOBAL_ACCOUNT".to_string(), "1".repeat(64)),
        ]
        .into();

        let config = Config::bootstrap(&env);
        assert_eq!(config.public_key, "pk");
        assert_eq!(config.secret_key, "sk");
        assert_eq!(config.global_account, "1".repeat(64));
        // Everything else stays at the default table values.
        assert_eq!(config.port, 4000.0);
    }

    #[test]
    fn test_bootstrap_without_env_matches_default() {
        let config = Config::bootstrap(&HashMap::new());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_wire_names_round_trip() {
        let value = serde_json::to_value(Config::default()).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("ARCHIVER_PORT"));
        assert!(object.contains_key("dataLogWriter"));
        assert!(object["STATISTICS"].is_object());

        let back: Config = serde_json::from_value(value).unwrap();
        assert_eq!(back, Config::default());
    }

    #[test]
    fn test_schema_table_covers_every_key() {
        let value = serde_json::to_value(Config::default()).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), SCHEMA.len());
        for &(key, kind) in SCHEMA {
            let field = object
                .get(key)
                .unwrap_or_else(|| panic!("schema key {key} missing from record"));
            let matches_kind = match kind {
                ValueKind::Number => field.is_number(),
                ValueKind::String => field.is_string(),
                ValueKind::Bool => field.is_boolean(),
                ValueKind::Object => field.is_object(),
            };
            assert!(matches_kind, "declared tag for {key} does not match its default");
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let json = r#"{"ARCHIVER_IP": "10.0.0.1", "NOT_A_KEY": 1}"#;
        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_section_decodes_with_defaults() {
        let json = r#"{"save": false}"#;
        let stats: StatisticsConfig = serde_json::from_str(json).unwrap();
        assert!(!stats.save);
        assert_eq!(stats.interval, 1.0);
    }
}
