//! Environment access
//!
//! Settings never call `std::env` directly. They read through an
//! [`EnvSource`], so tests can hand in a [`MapEnv`] instead of mutating the
//! process environment.

use crate::datapoint::{Datapoint, parse_poll_items_json};
use crate::{Error, Result};
use std::collections::HashMap;
use std::env::VarError;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

/// Environment variable names
pub mod vars {
    pub const PORT_OPTOLINK: &str = "PORT_OPTOLINK";
    pub const PORT_VITOCONNECT: &str = "PORT_VITOCONNECT";
    pub const VS2_TIMEOUT: &str = "VS2_TIMEOUT";
    pub const MQTT_HOST: &str = "MQTT_HOST";
    pub const MQTT_USER: &str = "MQTT_USER";
    pub const MQTT_LOGGING: &str = "MQTT_LOGGING";
    pub const MQTT_FSTR: &str = "MQTT_FSTR";
    pub const MQTT_TOPIC: &str = "MQTT_TOPIC";
    pub const MQTT_LISTEN: &str = "MQTT_LISTEN";
    pub const MQTT_RESPOND: &str = "MQTT_RESPOND";
    pub const MQTT_RETAIN: &str = "MQTT_RETAIN";
    pub const LOG_OPTOLINK: &str = "LOG_OPTOLINK";
    pub const POLL_INTERVAL: &str = "POLL_INTERVAL";
    pub const POLL_ITEMS: &str = "POLL_ITEMS";
    /// Path of an optional TOML config file, only consulted by the CLI
    pub const OPTOLINK_CONFIG: &str = "OPTOLINK_CONFIG";

    /// Every variable that overrides a setting
    pub const ALL: [&str; 14] = [
        PORT_OPTOLINK,
        PORT_VITOCONNECT,
        VS2_TIMEOUT,
        MQTT_HOST,
        MQTT_USER,
        MQTT_LOGGING,
        MQTT_FSTR,
        MQTT_TOPIC,
        MQTT_LISTEN,
        MQTT_RESPOND,
        MQTT_RETAIN,
        LOG_OPTOLINK,
        POLL_INTERVAL,
        POLL_ITEMS,
    ];
}

/// Read-only view of an environment
pub trait EnvSource {
    /// Same contract as [`std::env::var`]
    fn var(&self, key: &str) -> std::result::Result<String, VarError>;
}

/// The real process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> std::result::Result<String, VarError> {
        std::env::var(key)
    }
}

/// An in-memory environment
#[derive(Debug, Default, Clone)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for MapEnv
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> std::result::Result<String, VarError> {
        self.vars.get(key).cloned().ok_or(VarError::NotPresent)
    }
}

/// Parse a boolean environment value
///
/// Accepts `true`/`false`/`1`/`0` in any case. An empty value is `false`.
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" => Some(false),
        "true" | "1" => Some(true),
        _ => None,
    }
}

/// Typed access on top of an [`EnvSource`]
///
/// Every getter returns `Ok(None)` when the variable is unset.
pub struct EnvReader<'a, E: EnvSource + ?Sized> {
    source: &'a E,
}

impl<'a, E: EnvSource + ?Sized> EnvReader<'a, E> {
    pub fn new(source: &'a E) -> Self {
        Self { source }
    }

    fn raw(&self, var: &str) -> Result<Option<String>> {
        match self.source.var(var) {
            Ok(value) => {
                debug!("Environment override {}", var);
                Ok(Some(value))
            }
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(value)) => Err(Error::malformed_env(
                var,
                value.to_string_lossy(),
                "value is not valid UTF-8",
            )),
        }
    }

    /// A string passed through verbatim
    pub fn string(&self, var: &str) -> Result<Option<String>> {
        self.raw(var)
    }

    /// A setting that can be switched off; an empty value means disabled
    pub fn optional_string(&self, var: &str) -> Result<Option<Option<String>>> {
        Ok(self
            .raw(var)?
            .map(|value| if value.is_empty() { None } else { Some(value) }))
    }

    /// A base-10 integer
    pub fn integer<T>(&self, var: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.raw(var)? {
            Some(value) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|e: T::Err| Error::malformed_env(var, value.as_str(), e.to_string())),
            None => Ok(None),
        }
    }

    pub fn boolean(&self, var: &str) -> Result<Option<bool>> {
        match self.raw(var)? {
            Some(value) => parse_bool(&value).map(Some).ok_or_else(|| {
                Error::malformed_env(var, value.as_str(), "expected 'true' or 'false'")
            }),
            None => Ok(None),
        }
    }

    /// A JSON-encoded polling list; an empty value keeps the default
    pub fn poll_items(&self, var: &str) -> Result<Option<Vec<Datapoint>>> {
        let Some(value) = self.raw(var)? else {
            return Ok(None);
        };
        if value.trim().is_empty() {
            return Ok(None);
        }

        let items = parse_poll_items_json(&value)
            .map_err(|e| Error::malformed_env(var, value.as_str(), e.to_string()))??;
        Ok(Some(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("true", Some(true))]
    #[case("TRUE", Some(true))]
    #[case("1", Some(true))]
    #[case("False", Some(false))]
    #[case("0", Some(false))]
    #[case("", Some(false))]
    #[case("yes", None)]
    #[case("no", None)]
    fn test_parse_bool(#[case] text: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_bool(text), expected);
    }

    #[test]
    fn test_unset_variables_are_none() {
        let env = MapEnv::new();
        let reader = EnvReader::new(&env);

        assert_eq!(reader.string("PORT_OPTOLINK").unwrap(), None);
        assert_eq!(reader.optional_string("MQTT_USER").unwrap(), None);
        assert_eq!(reader.integer::<i64>("POLL_INTERVAL").unwrap(), None);
        assert_eq!(reader.boolean("MQTT_RETAIN").unwrap(), None);
        assert!(reader.poll_items("POLL_ITEMS").unwrap().is_none());
    }

    #[test]
    fn test_optional_string_empty_disables() {
        let env = MapEnv::new().with("MQTT_HOST", "").with("MQTT_USER", "me:secret");
        let reader = EnvReader::new(&env);

        assert_eq!(reader.optional_string("MQTT_HOST").unwrap(), Some(None));
        assert_eq!(
            reader.optional_string("MQTT_USER").unwrap(),
            Some(Some("me:secret".to_string()))
        );
    }

    #[test]
    fn test_integer_parsing() {
        let env: MapEnv = [("A", " -1 "), ("B", "abc"), ("C", "70000")]
            .into_iter()
            .collect();
        let reader = EnvReader::new(&env);

        assert_eq!(reader.integer::<i64>("A").unwrap(), Some(-1));
        assert!(matches!(
            reader.integer::<i64>("B"),
            Err(Error::MalformedEnvironmentValue { .. })
        ));
        assert!(reader.integer::<u16>("C").is_err());
    }

    #[test]
    fn test_boolean_rejects_garbage() {
        let env = MapEnv::new().with("MQTT_RETAIN", "maybe");
        let reader = EnvReader::new(&env);

        let err = reader.boolean("MQTT_RETAIN").unwrap_err();
        assert!(err.to_string().contains("MQTT_RETAIN"));
    }

    #[test]
    fn test_poll_items_errors() {
        let env = MapEnv::new()
            .with("BAD_JSON", "[[")
            .with("BAD_ENTRY", r#"[["x", 1]]"#)
            .with("EMPTY", "  ");
        let reader = EnvReader::new(&env);

        assert!(matches!(
            reader.poll_items("BAD_JSON"),
            Err(Error::MalformedEnvironmentValue { .. })
        ));
        assert!(matches!(
            reader.poll_items("BAD_ENTRY"),
            Err(Error::InvalidDatapointDescriptor { .. })
        ));
        assert!(reader.poll_items("EMPTY").unwrap().is_none());
    }
}
