//! Gateway settings
//!
//! Every setting has a compiled-in default. A subset can be overridden from
//! the environment (see [`super::env::vars`]); all of them can be set from an
//! optional TOML file. Once loaded, a [`Settings`] value is never mutated.

use super::env::{EnvReader, EnvSource, ProcessEnv, vars};
use crate::datapoint::{Datapoint, DatapointKind, default_poll_items, duplicate_addresses};
use crate::format::{NumberFormat, render_topic, validate_template};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use tracing::warn;

// Helper functions for serde defaults
fn default_port_optolink() -> String {
    "/dev/serial0".to_string()
}

fn default_vs2timeout() -> u64 {
    120
}

fn default_mqtt_host() -> Option<String> {
    Some("192.168.0.123:1883".to_string())
}

fn default_mqtt_fstr() -> String {
    "{dpname}".to_string()
}

fn default_mqtt_topic() -> String {
    "Vito".to_string()
}

fn default_mqtt_listen() -> Option<String> {
    Some("Vito/cmnd".to_string())
}

fn default_mqtt_respond() -> Option<String> {
    Some("Vito/resp".to_string())
}

fn default_tcpip_port() -> Option<u16> {
    Some(65234)
}

fn default_fullraw_eot_time() -> Duration {
    Duration::from_millis(50)
}

fn default_fullraw_timeout() -> Duration {
    Duration::from_secs(2)
}

fn default_olbreath() -> Duration {
    Duration::from_millis(100)
}

fn default_true() -> bool {
    true
}

fn default_max_decimals() -> u32 {
    4
}

fn default_data_hex_format() -> NumberFormat {
    NumberFormat::hex_byte()
}

fn default_resp_addr_format() -> NumberFormat {
    NumberFormat::hex()
}

fn default_buffer_to_write() -> usize {
    60
}

fn default_dec_separator() -> String {
    ",".to_string()
}

fn default_poll_interval() -> i64 {
    30
}

/// Default MQTT broker port when `mqtt.host` carries none
pub const DEFAULT_MQTT_PORT: u16 = 1883;

/// Stands in for the MQTT password in printed and logged settings
pub const REDACTED: &str = "********";

// Fractional seconds, as the timing settings are written
mod duration_secs_f64 {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(duration.as_secs_f64())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}

// Optional strings; TOML has no null, so "" stands for disabled
mod optional_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(if value.is_empty() { None } else { Some(value) })
    }
}

// Optional port; 0 stands for disabled
mod optional_port {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<u16>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u16(value.unwrap_or(0))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let port = u16::deserialize(deserializer)?;
        Ok(if port == 0 { None } else { Some(port) })
    }
}

// 1-Wire sensors keyed by "0xFFF4"-style address strings
mod w1sensor_map {
    use super::W1Sensor;
    use crate::datapoint::parse_address;
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};
    use std::collections::BTreeMap;

    pub fn serialize<S>(map: &BTreeMap<u16, W1Sensor>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        map.iter()
            .map(|(address, sensor)| (format!("0x{:04X}", address), sensor))
            .collect::<BTreeMap<_, _>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<u16, W1Sensor>, D::Error>
    where
        D: Deserializer<'de>,
    {
        BTreeMap::<String, W1Sensor>::deserialize(deserializer)?
            .into_iter()
            .map(|(key, sensor)| {
                parse_address(&key)
                    .map(|address| (address, sensor))
                    .ok_or_else(|| D::Error::custom(format!("invalid sensor address '{}'", key)))
            })
            .collect()
    }
}

// Polling list as positional tuples
mod poll_items {
    use crate::datapoint::{Datapoint, DescriptorField, parse_poll_items};
    use crate::error::format_error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error};

    pub fn serialize<S>(items: &[Datapoint], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        items.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Datapoint>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<Vec<DescriptorField>>::deserialize(deserializer)?;
        parse_poll_items(rows).map_err(|e| D::Error::custom(format_error(&e)))
    }
}

/// Main configuration settings for the gateway
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Serial interfaces
    #[serde(default)]
    pub serial: SerialSettings,
    /// MQTT bridge
    #[serde(default)]
    pub mqtt: MqttSettings,
    /// TCP/IP responder
    #[serde(default)]
    pub tcpip: TcpIpSettings,
    /// Optolink telegram timing
    #[serde(default)]
    pub timing: TimingSettings,
    /// Optolink logging
    #[serde(default)]
    pub logging: LoggingSettings,
    /// Value and address rendering
    #[serde(default)]
    pub format: FormatSettings,
    /// Viessdata CSV export
    #[serde(default)]
    pub viessdata: ViessdataSettings,
    /// Locally attached 1-Wire sensors by Optolink address
    #[serde(default, with = "w1sensor_map")]
    pub w1sensors: BTreeMap<u16, W1Sensor>,
    /// Polling schedule and table
    #[serde(default)]
    pub polling: PollSettings,
}

/// Serial port configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerialSettings {
    /// Device path of the Optolink adapter (`PORT_OPTOLINK`)
    #[serde(default = "default_port_optolink")]
    pub port_optolink: String,
    /// Device path of the Vitoconnect, `None` when not attached (`PORT_VITOCONNECT`)
    #[serde(default, with = "optional_string")]
    pub port_vitoconnect: Option<String>,
    /// VS2 protocol detection timeout in seconds (`VS2_TIMEOUT`)
    #[serde(default = "default_vs2timeout")]
    pub vs2timeout: u64,
}

/// MQTT configuration
///
/// `Debug` masks the password part of `user`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct MqttSettings {
    /// Broker as `host:port`, `None` disables MQTT (`MQTT_HOST`)
    #[serde(default = "default_mqtt_host", with = "optional_string")]
    pub host: Option<String>,
    /// Credentials as `user:password`, `None` for anonymous (`MQTT_USER`)
    #[serde(default, with = "optional_string")]
    pub user: Option<String>,
    /// Verbose client library logging (`MQTT_LOGGING`)
    #[serde(default)]
    pub logging: bool,
    /// Topic template per datapoint (`MQTT_FSTR`)
    #[serde(default = "default_mqtt_fstr")]
    pub fstr: String,
    /// Base publish topic (`MQTT_TOPIC`)
    #[serde(default = "default_mqtt_topic")]
    pub topic: String,
    /// Command topic, `None` disables inbound commands (`MQTT_LISTEN`)
    #[serde(default = "default_mqtt_listen", with = "optional_string")]
    pub listen: Option<String>,
    /// Response topic, `None` disables responses (`MQTT_RESPOND`)
    #[serde(default = "default_mqtt_respond", with = "optional_string")]
    pub respond: Option<String>,
    /// Publish with the retain flag (`MQTT_RETAIN`)
    #[serde(default)]
    pub retain: bool,
}

/// TCP/IP responder configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcpIpSettings {
    /// Listener port, `None` disables the interface
    #[serde(default = "default_tcpip_port", with = "optional_port")]
    pub port: Option<u16>,
}

/// Optolink timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingSettings {
    /// Silence that marks the end of a telegram
    #[serde(with = "duration_secs_f64", default = "default_fullraw_eot_time")]
    pub fullraw_eot_time: Duration,
    /// Overall wait for a complete response
    #[serde(with = "duration_secs_f64", default = "default_fullraw_timeout")]
    pub fullraw_timeout: Duration,
    /// Pause after each request/response cycle
    #[serde(with = "duration_secs_f64", default = "default_olbreath")]
    pub olbreath: Duration,
}

/// Optolink logging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log Vitoconnect rx/tx telegrams
    #[serde(default)]
    pub log_vitoconnect: bool,
    /// Echo received Optolink data (`LOG_OPTOLINK`)
    #[serde(default = "default_true")]
    pub show_opto_rx: bool,
}

/// Value and address rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatSettings {
    /// Rounding precision for scaled values
    #[serde(default = "default_max_decimals")]
    pub max_decimals: u32,
    /// Rendering of raw data bytes
    #[serde(default = "default_data_hex_format")]
    pub data_hex_format: NumberFormat,
    /// Rendering of addresses in MQTT/TCP responses
    #[serde(default = "default_resp_addr_format")]
    pub resp_addr_format: NumberFormat,
}

/// Viessdata CSV export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViessdataSettings {
    #[serde(default)]
    pub write_csv: bool,
    /// Output path, empty for the working directory
    #[serde(default)]
    pub csv_path: String,
    /// Rows buffered before a flush
    #[serde(default = "default_buffer_to_write")]
    pub buffer_to_write: usize,
    #[serde(default = "default_dec_separator")]
    pub dec_separator: String,
}

/// A locally attached 1-Wire sensor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct W1Sensor {
    /// Folder / serial number under the 1-Wire bus, e.g. `28-3ce1d4438fd4`
    pub device: String,
    /// Slave type, e.g. `ds18b20`
    pub sensor_type: String,
}

/// Polling schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollSettings {
    /// Seconds between cycles; 0 continuous, negative disabled (`POLL_INTERVAL`)
    #[serde(default = "default_poll_interval")]
    pub interval: i64,
    /// Datapoints polled each cycle (`POLL_ITEMS`)
    #[serde(default = "default_poll_items", with = "poll_items")]
    pub items: Vec<Datapoint>,
}

/// How the poller schedules its cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// Back to back, no pause between cycles
    Continuous,
    /// No polling at all
    Disabled,
    /// Fixed interval
    Every(Duration),
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port_optolink: default_port_optolink(),
            port_vitoconnect: None,
            vs2timeout: default_vs2timeout(),
        }
    }
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            host: default_mqtt_host(),
            user: None,
            logging: false,
            fstr: default_mqtt_fstr(),
            topic: default_mqtt_topic(),
            listen: default_mqtt_listen(),
            respond: default_mqtt_respond(),
            retain: false,
        }
    }
}

impl Default for TcpIpSettings {
    fn default() -> Self {
        Self {
            port: default_tcpip_port(),
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            fullraw_eot_time: default_fullraw_eot_time(),
            fullraw_timeout: default_fullraw_timeout(),
            olbreath: default_olbreath(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            log_vitoconnect: false,
            show_opto_rx: default_true(),
        }
    }
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            max_decimals: default_max_decimals(),
            data_hex_format: default_data_hex_format(),
            resp_addr_format: default_resp_addr_format(),
        }
    }
}

impl Default for ViessdataSettings {
    fn default() -> Self {
        Self {
            write_csv: false,
            csv_path: String::new(),
            buffer_to_write: default_buffer_to_write(),
            dec_separator: default_dec_separator(),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            items: default_poll_items(),
        }
    }
}

impl fmt::Debug for MqttSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MqttSettings")
            .field("host", &self.host)
            .field("user", &self.redacted_user())
            .field("logging", &self.logging)
            .field("fstr", &self.fstr)
            .field("topic", &self.topic)
            .field("listen", &self.listen)
            .field("respond", &self.respond)
            .field("retain", &self.retain)
            .finish()
    }
}

impl MqttSettings {
    pub fn is_enabled(&self) -> bool {
        self.host.is_some()
    }

    /// Broker host and port, `None` when MQTT is disabled
    pub fn broker(&self) -> Result<Option<(String, u16)>> {
        let Some(host) = &self.host else {
            return Ok(None);
        };

        match host.rsplit_once(':') {
            Some((name, port)) => {
                let port = port.parse().map_err(|e| {
                    Error::config("mqtt.host", format!("Invalid port in '{}': {}", host, e))
                })?;
                Ok(Some((name.to_string(), port)))
            }
            None => Ok(Some((host.clone(), DEFAULT_MQTT_PORT))),
        }
    }

    /// User and password; a value without `:` is a user with an empty password
    pub fn credentials(&self) -> Option<(String, String)> {
        self.user.as_ref().map(|user| match user.split_once(':') {
            Some((name, password)) => (name.to_string(), password.to_string()),
            None => (user.clone(), String::new()),
        })
    }

    /// `user` with a non-empty password replaced by [`REDACTED`]
    pub fn redacted_user(&self) -> Option<String> {
        self.credentials().map(|(name, password)| {
            if password.is_empty() {
                name
            } else {
                format!("{}:{}", name, REDACTED)
            }
        })
    }

    /// Full publish topic of a datapoint
    pub fn topic_for(&self, datapoint: &Datapoint) -> Result<String> {
        let leaf = render_topic(&self.fstr, &datapoint.name, datapoint.address)?;
        Ok(format!("{}/{}", self.topic, leaf))
    }
}

impl PollSettings {
    pub fn mode(&self) -> PollMode {
        match self.interval {
            0 => PollMode::Continuous,
            i if i < 0 => PollMode::Disabled,
            i => PollMode::Every(Duration::from_secs(i as u64)),
        }
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_env_source(&ProcessEnv)
    }

    /// Defaults overridden from the given environment
    pub fn from_env_source<E: EnvSource + ?Sized>(env: &E) -> Result<Self> {
        Self::default().merge_with_env(env)
    }

    /// Load settings from a TOML configuration file
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        Self::from_toml_str(&content)
    }

    /// Parse settings from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::config("file", format!("Failed to parse config file: {}", e)))
    }

    /// Apply environment overrides on top of these settings
    ///
    /// Only variables that are set replace a value. A variable that is set but
    /// does not parse is an error.
    pub fn merge_with_env<E: EnvSource + ?Sized>(mut self, env: &E) -> Result<Self> {
        let env = EnvReader::new(env);

        // Serial
        if let Some(port) = env.string(vars::PORT_OPTOLINK)? {
            self.serial.port_optolink = port;
        }
        if let Some(port) = env.optional_string(vars::PORT_VITOCONNECT)? {
            self.serial.port_vitoconnect = port;
        }
        if let Some(timeout) = env.integer(vars::VS2_TIMEOUT)? {
            self.serial.vs2timeout = timeout;
        }

        // MQTT
        if let Some(host) = env.optional_string(vars::MQTT_HOST)? {
            self.mqtt.host = host;
        }
        if let Some(user) = env.optional_string(vars::MQTT_USER)? {
            self.mqtt.user = user;
        }
        if let Some(logging) = env.boolean(vars::MQTT_LOGGING)? {
            self.mqtt.logging = logging;
        }
        if let Some(fstr) = env.string(vars::MQTT_FSTR)? {
            self.mqtt.fstr = fstr;
        }
        if let Some(topic) = env.string(vars::MQTT_TOPIC)? {
            self.mqtt.topic = topic;
        }
        if let Some(listen) = env.optional_string(vars::MQTT_LISTEN)? {
            self.mqtt.listen = listen;
        }
        if let Some(respond) = env.optional_string(vars::MQTT_RESPOND)? {
            self.mqtt.respond = respond;
        }
        if let Some(retain) = env.boolean(vars::MQTT_RETAIN)? {
            self.mqtt.retain = retain;
        }

        // Optolink logging
        if let Some(show) = env.boolean(vars::LOG_OPTOLINK)? {
            self.logging.show_opto_rx = show;
        }

        // Polling
        if let Some(interval) = env.integer(vars::POLL_INTERVAL)? {
            self.polling.interval = interval;
        }
        if let Some(items) = env.poll_items(vars::POLL_ITEMS)? {
            self.polling.items = items;
        }

        Ok(self)
    }

    /// Validate configuration settings
    ///
    /// Checks structure only; values are not range checked.
    pub fn validate(&self) -> Result<()> {
        validate_template(&self.mqtt.fstr)?;

        if !self.format.data_hex_format.is_hex() {
            return Err(Error::config(
                "data_hex_format",
                format!("'{}' is not a hex format", self.format.data_hex_format),
            ));
        }

        for (index, dp) in self.polling.items.iter().enumerate() {
            if dp.length == 0 {
                return Err(Error::invalid_datapoint(
                    index,
                    Some(dp.name.as_str()),
                    "length must be positive",
                ));
            }
            if let DatapointKind::BitSlice(slice) = &dp.kind {
                slice
                    .check_bounds(dp.length)
                    .map_err(|message| Error::invalid_datapoint(index, Some(dp.name.as_str()), message))?;
            }
        }

        for address in duplicate_addresses(&self.polling.items) {
            warn!("Datapoint address 0x{:04X} is polled more than once", address);
        }

        Ok(())
    }

    /// Copy safe to print, with the MQTT password masked
    pub fn redacted(&self) -> Self {
        let mut settings = self.clone();
        settings.mqtt.user = self.mqtt.redacted_user();
        settings
    }

    /// Render as TOML, in the same layout the config file uses
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
