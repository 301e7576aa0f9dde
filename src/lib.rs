//! Optolink gateway configuration
//!
//! Settings and the datapoint polling table for a gateway that bridges a
//! Viessmann heating controller's Optolink interface to MQTT and TCP/IP.
//!
//! # Features
//!
//! - **Environment overrides**: every deployment knob the gateway exposes as an
//!   environment variable, with typed parsing that fails fast
//! - **Typed polling table**: datapoint descriptors decoded once at load time
//!   into a tagged enum instead of positional tuples
//! - **Optional config file**: TOML layer for settings without an environment
//!   variable (timing, formatting, CSV export, 1-Wire sensors)
//! - **Injected environment**: loading reads through [`config::EnvSource`], so
//!   tests never touch the process environment
//!
//! # Precedence
//!
//! 1. Environment variables (highest priority)
//! 2. Configuration file
//! 3. Default values (lowest priority)
//!
//! # Examples
//!
//! ```rust
//! use optolink_config::config::{MapEnv, PollMode, Settings};
//!
//! # fn example() -> optolink_config::Result<()> {
//! let env = MapEnv::new().with("POLL_INTERVAL", "0");
//! let settings = Settings::from_env_source(&env)?;
//! assert_eq!(settings.polling.mode(), PollMode::Continuous);
//! assert_eq!(settings.polling.items[0].name, "Anlagenzeit");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod cli;
pub mod config;
pub mod datapoint;
pub mod error;
pub mod format;
pub mod utils;

pub use config::{ConfigLoader, Settings};
pub use datapoint::{Datapoint, DatapointKind};
pub use error::{Error, Result};
