//! Configuration management for the Optolink gateway
//!
//! This module resolves every setting from the environment, an optional
//! config file and compiled-in defaults.

pub mod env;
pub mod loader;
pub mod settings;

pub use env::{EnvSource, MapEnv, ProcessEnv};
pub use loader::ConfigLoader;
pub use settings::{
    FormatSettings, LoggingSettings, MqttSettings, PollMode, PollSettings, SerialSettings,
    Settings, TcpIpSettings, TimingSettings, ViessdataSettings, W1Sensor,
};
