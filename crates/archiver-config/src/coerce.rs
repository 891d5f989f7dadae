//! Type-tag driven coercion of raw override input.
//!
//! Both the environment and CLI passes funnel through these routines. The
//! target type of every key is fixed by its [`SCHEMA`](crate::SCHEMA) entry,
//! so coercion is a total function for number, string, and boolean tags;
//! only the object tag can fail, and only the environment pass offers it.

use serde_json::Value;

use crate::{ConfigError, ValueKind};

/// A raw override value typed by the schema tag of its key.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// A number. Unparseable input coerces to NaN rather than being dropped.
    Number(f64),
    /// A verbatim string.
    String(String),
    /// A boolean.
    Bool(bool),
    /// A parsed JSON document for an object-typed key.
    Object(Value),
}

/// A single CLI flag as scanned from the argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    /// A bare `--KEY` with no value attached.
    Switch,
    /// A `--KEY value` or `--KEY=value` form.
    Value(String),
}

/// Coerce a raw environment string by the key's declared tag.
///
/// Number and string tags never fail: non-numeric input for a number key is
/// written through as NaN (coercion is attempted unconditionally, not
/// validated). A boolean is `true` iff the input equals `"true"` ignoring
/// case. Object input must parse as JSON; anything else is rejected and the
/// key keeps its previous value.
///
/// # Example
///
/// ```
/// use archiver_config::{coerce_env, Coerced, ValueKind};
///
/// let port = coerce_env("ARCHIVER_PORT", ValueKind::Number, "4100").unwrap();
/// assert_eq!(port, Coerced::Number(4100.0));
///
/// let verbose = coerce_env("VERBOSE", ValueKind::Bool, "TRUE").unwrap();
/// assert_eq!(verbose, Coerced::Bool(true));
/// ```
pub fn coerce_env(key: &str, kind: ValueKind, raw: &str) -> Result<Coerced, ConfigError> {
    match kind {
        ValueKind::Number => Ok(Coerced::Number(parse_number(raw))),
        ValueKind::String => Ok(Coerced::String(raw.to_string())),
        ValueKind::Bool => Ok(Coerced::Bool(parse_bool(raw))),
        ValueKind::Object => serde_json::from_str(raw)
            .map(Coerced::Object)
            .map_err(|e| ConfigError::value_malformed(key, e)),
    }
}

/// Coerce a scanned CLI flag by the key's declared tag.
///
/// Number and string coercion are identical to [`coerce_env`]. A boolean key
/// accepts either a bare flag (native boolean, always `true`) or an attached
/// value compared case-insensitively to `"true"`. Object-typed keys are not
/// settable from the CLI, and a bare flag carries no value for a number or
/// string key; both return `None` and leave the key untouched.
pub fn coerce_cli(kind: ValueKind, flag: &FlagValue) -> Option<Coerced> {
    match (kind, flag) {
        (ValueKind::Number, FlagValue::Value(raw)) => Some(Coerced::Number(parse_number(raw))),
        (ValueKind::String, FlagValue::Value(raw)) => Some(Coerced::String(raw.clone())),
        (ValueKind::Bool, FlagValue::Switch) => Some(Coerced::Bool(true)),
        (ValueKind::Bool, FlagValue::Value(raw)) => Some(Coerced::Bool(parse_bool(raw))),
        _ => None,
    }
}

fn parse_number(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(f64::NAN)
}

fn parse_bool(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_number() {
        let coerced = coerce_env("RATE_LIMIT", ValueKind::Number, "250").unwrap();
        assert_eq!(coerced, Coerced::Number(250.0));

        let coerced = coerce_env("RATE_LIMIT", ValueKind::Number, "2.5").unwrap();
        assert_eq!(coerced, Coerced::Number(2.5));
    }

    #[test]
    fn test_coerce_number_non_numeric_is_nan() {
        let coerced = coerce_env("RATE_LIMIT", ValueKind::Number, "plenty").unwrap();
        match coerced {
            Coerced::Number(n) => assert!(n.is_nan()),
            other => panic!("expected a number, got {other:?}"),
        }
    }

    #[test]
    fn test_coerce_string_verbatim() {
        let coerced = coerce_env("MODE", ValueKind::String, "release").unwrap();
        assert_eq!(coerced, Coerced::String("release".to_string()));
    }

    #[test]
    fn test_coerce_bool() {
        for raw in ["true", "True", "TRUE"] {
            let coerced = coerce_env("VERBOSE", ValueKind::Bool, raw).unwrap();
            assert_eq!(coerced, Coerced::Bool(true));
        }
        for raw in ["false", "1", "yes", ""] {
            let coerced = coerce_env("VERBOSE", ValueKind::Bool, raw).unwrap();
            assert_eq!(coerced, Coerced::Bool(false));
        }
    }

    #[test]
    fn test_coerce_object() {
        let coerced =
            coerce_env("STATISTICS", ValueKind::Object, r#"{"save":false,"interval":5}"#).unwrap();
        match coerced {
            Coerced::Object(value) => assert_eq!(value["interval"], 5),
            other => panic!("expected an object, got {other:?}"),
        }
    }

    #[test]
    fn test_coerce_object_malformed_is_rejected() {
        let result = coerce_env("STATISTICS", ValueKind::Object, "not json at all");
        assert!(matches!(
            result,
            Err(ConfigError::ValueMalformed { ref key, .. }) if key == "STATISTICS"
        ));
    }

    #[test]
    fn test_coerce_cli_scalar() {
        let coerced = coerce_cli(ValueKind::Number, &FlagValue::Value("9".to_string()));
        assert_eq!(coerced, Some(Coerced::Number(9.0)));

        let coerced = coerce_cli(ValueKind::String, &FlagValue::Value("x".to_string()));
        assert_eq!(coerced, Some(Coerced::String("x".to_string())));
    }

    #[test]
    fn test_coerce_cli_bool_switch_and_value() {
        assert_eq!(
            coerce_cli(ValueKind::Bool, &FlagValue::Switch),
            Some(Coerced::Bool(true))
        );
        assert_eq!(
            coerce_cli(ValueKind::Bool, &FlagValue::Value("FALSE".to_string())),
            Some(Coerced::Bool(false))
        );
        assert_eq!(
            coerce_cli(ValueKind::Bool, &FlagValue::Value("true".to_string())),
            Some(Coerced::Bool(true))
        );
    }

    #[test]
    fn test_coerce_cli_object_not_settable() {
        let flag = FlagValue::Value(r#"{"save":false}"#.to_string());
        assert_eq!(coerce_cli(ValueKind::Object, &flag), None);
    }

    #[test]
    fn test_coerce_cli_switch_without_value_skipped_for_scalars() {
        assert_eq!(coerce_cli(ValueKind::Number, &FlagValue::Switch), None);
        assert_eq!(coerce_cli(ValueKind::String, &FlagValue::Switch), None);
    }
}
