//! Output formatting helpers
//!
//! Typed forms of the formatting settings shared by the MQTT bridge, the TCP
//! responder and the CSV exporter.

pub mod spec;
pub mod topic;

pub use spec::{NumberFormat, Radix};
pub use topic::{render_topic, validate_template};
