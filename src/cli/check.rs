//! `check` subcommand
//!
//! Loads and validates the configuration, then prints a one-line summary of
//! which interfaces are enabled.

use super::load_settings;
use crate::config::PollMode;
use crate::{Settings, error::format_error};
use anyhow::Result;
use tracing::info;

/// Arguments for `check`
#[derive(Debug)]
pub struct CheckArgs {
    pub config: Option<String>,
}

/// Run check mode with the given arguments
pub fn run_check(args: CheckArgs) -> Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    let summary = summarize(&settings)?;
    info!("Configuration check passed");
    println!("OK: {}", summary);
    Ok(())
}

pub fn summarize(settings: &Settings) -> Result<String> {
    let mqtt = match settings
        .mqtt
        .broker()
        .map_err(|e| anyhow::anyhow!(format_error(&e)))?
    {
        Some((host, port)) => format!("mqtt {}:{}", host, port),
        None => "mqtt disabled".to_string(),
    };

    let tcpip = match settings.tcpip.port {
        Some(port) => format!("tcp/ip port {}", port),
        None => "tcp/ip disabled".to_string(),
    };

    let polling = match settings.polling.mode() {
        PollMode::Continuous => "polling continuous".to_string(),
        PollMode::Disabled => "polling disabled".to_string(),
        PollMode::Every(interval) => format!("polling every {}s", interval.as_secs()),
    };

    let vitoconnect = match &settings.serial.port_vitoconnect {
        Some(port) => format!(", vitoconnect {}", port),
        None => String::new(),
    };

    Ok(format!(
        "optolink {}{}, {}, {}, {}, {} poll items, {} 1-wire sensors",
        settings.serial.port_optolink,
        vitoconnect,
        mqtt,
        tcpip,
        polling,
        settings.polling.items.len(),
        settings.w1sensors.len()
    ))
}
