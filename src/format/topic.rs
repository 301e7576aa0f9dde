//! MQTT topic templates
//!
//! `mqtt_fstr` names each datapoint's topic. Supported placeholders are
//! `{dpname}` and `{dpaddr}`, the latter optionally with a number format
//! spec (`{dpaddr:04X}`). Braces are escaped by doubling them.

use super::NumberFormat;
use crate::{Error, Result};

const FIELD: &str = "mqtt_fstr";

/// Expand a topic template for one datapoint
pub fn render_topic(template: &str, name: &str, address: u16) -> Result<String> {
    let mut out = String::with_capacity(template.len() + name.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut placeholder = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    placeholder.push(c);
                }
                if !closed {
                    return Err(Error::config(
                        FIELD,
                        format!("Unterminated placeholder in '{}'", template),
                    ));
                }
                out.push_str(&expand(&placeholder, name, address)?);
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(Error::config(
                    FIELD,
                    format!("Single '}}' in '{}'", template),
                ));
            }
            c => out.push(c),
        }
    }

    Ok(out)
}

/// Check a template without rendering a real datapoint
pub fn validate_template(template: &str) -> Result<()> {
    render_topic(template, "", 0).map(|_| ())
}

fn expand(placeholder: &str, name: &str, address: u16) -> Result<String> {
    let (key, spec) = match placeholder.split_once(':') {
        Some((key, spec)) => (key, Some(spec)),
        None => (placeholder, None),
    };

    match (key, spec) {
        ("dpname", None) | ("dpname", Some("")) | ("dpname", Some("s")) => Ok(name.to_string()),
        ("dpaddr", None) | ("dpaddr", Some("")) => Ok(address.to_string()),
        ("dpaddr", Some(spec)) => {
            let format: NumberFormat = spec.parse()?;
            Ok(format.format_u64(u64::from(address)))
        }
        ("dpname", Some(spec)) => Err(Error::config(
            FIELD,
            format!("Unsupported format '{}' for dpname", spec),
        )),
        (other, _) => Err(Error::config(
            FIELD,
            format!("Unknown placeholder '{{{}}}'", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("{dpname}", "KesselTemp")]
    #[case("{dpaddr:04X}_{dpname}", "0802_KesselTemp")]
    #[case("{dpaddr}", "2050")]
    #[case("{dpaddr:x}/{dpname}", "802/KesselTemp")]
    #[case("raw/{{{dpname}}}", "raw/{KesselTemp}")]
    #[case("static", "static")]
    fn test_render_topic(#[case] template: &str, #[case] expected: &str) {
        assert_eq!(render_topic(template, "KesselTemp", 0x0802).unwrap(), expected);
    }

    #[rstest]
    #[case("{dpunit}")]
    #[case("{dpname")]
    #[case("name}")]
    #[case("{dpaddr:04q}")]
    #[case("{dpname:>10}")]
    fn test_invalid_templates(#[case] template: &str) {
        let err = render_topic(template, "KesselTemp", 0x0802).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_validate_template() {
        assert!(validate_template("{dpaddr:04X}_{dpname}").is_ok());
        assert!(validate_template("{nope}").is_err());
    }
}
