//! `show` and `datapoints` subcommands

use super::load_settings;
use crate::{DatapointKind, Settings};
use anyhow::Result;
use clap::ValueEnum;
use std::fmt::Write;

/// Output format for `show`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Toml,
    Json,
}

/// Arguments for `show`
#[derive(Debug)]
pub struct ShowArgs {
    pub config: Option<String>,
    pub format: OutputFormat,
}

/// Arguments for `datapoints`
#[derive(Debug)]
pub struct DatapointsArgs {
    pub config: Option<String>,
}

/// Print the resolved settings
pub fn run_show(args: ShowArgs) -> Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    print!("{}", render_settings(&settings, args.format)?);
    Ok(())
}

/// Print the polling table
pub fn run_datapoints(args: DatapointsArgs) -> Result<()> {
    let settings = load_settings(args.config.as_deref())?;
    print!("{}", render_datapoints(&settings));
    Ok(())
}

/// Settings as TOML or JSON, with the MQTT password masked
pub fn render_settings(settings: &Settings, format: OutputFormat) -> Result<String> {
    let settings = settings.redacted();
    let mut text = match format {
        OutputFormat::Toml => settings.to_toml_string()?,
        OutputFormat::Json => settings.to_json_string()?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

/// One line per datapoint: address, length, decode rule, name
///
/// Addresses follow `resp_addr_format` so the listing matches what the
/// gateway puts into its responses.
pub fn render_datapoints(settings: &Settings) -> String {
    let addr_format = settings.format.resp_addr_format;
    let mut out = String::new();

    for dp in &settings.polling.items {
        let marker = match dp.kind {
            DatapointKind::BitSlice(_) => "  ",
            _ => "",
        };
        writeln!(
            out,
            "{:>6} {:>3}  {:<28} {}{}",
            addr_format.format_u64(u64::from(dp.address)),
            dp.length,
            dp.kind_label(),
            marker,
            dp.name
        )
        .ok();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_datapoints_default_table() {
        let text = render_datapoints(&Settings::default());
        let first = text.lines().next().unwrap();

        assert!(first.contains("88e"));
        assert!(first.contains("vdatetime"));
        assert!(first.ends_with("Anlagenzeit"));
        assert_eq!(text.lines().count(), 27);
    }

    #[test]
    fn test_render_datapoints_uses_address_format() {
        let mut settings = Settings::default();
        settings.format.resp_addr_format = "04X".parse().unwrap();

        let text = render_datapoints(&settings);
        assert!(text.lines().next().unwrap().contains("088E"));
    }

    #[test]
    fn test_render_settings_hides_password() {
        let mut settings = Settings::default();
        settings.mqtt.user = Some("vito:s3cret".to_string());

        for format in [OutputFormat::Toml, OutputFormat::Json] {
            let text = render_settings(&settings, format).unwrap();
            assert!(!text.contains("s3cret"));
            assert!(text.contains("vito:********"));
        }
    }

    #[test]
    fn test_render_settings_formats() {
        let settings = Settings::default();

        let toml = render_settings(&settings, OutputFormat::Toml).unwrap();
        assert!(toml.contains("[serial]"));
        assert!(toml.contains("port_optolink = \"/dev/serial0\""));

        let json = render_settings(&settings, OutputFormat::Json).unwrap();
        assert!(json.trim_start().starts_with('{'));
        assert!(json.ends_with('\n'));
    }
}
