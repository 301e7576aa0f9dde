//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use optolink_config::config::env::vars;
use std::sync::{Mutex, MutexGuard};

/// Serializes every test that touches the process environment
pub static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

/// Holds the env lock, clears the gateway variables and restores them on drop
pub struct EnvGuard {
    saved: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvGuard {
    pub fn new() -> Self {
        let lock = ENV_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        let names = vars::ALL.iter().copied().chain([vars::OPTOLINK_CONFIG]);

        let saved = names
            .map(|name| (name, std::env::var(name).ok()))
            .collect::<Vec<_>>();

        unsafe {
            for (name, _) in &saved {
                std::env::remove_var(name);
            }
        }

        Self {
            saved,
            _lock: lock,
        }
    }

    pub fn set(&self, name: &str, value: &str) {
        unsafe {
            std::env::set_var(name, value);
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe {
            for (name, value) in &self.saved {
                match value {
                    Some(value) => std::env::set_var(name, value),
                    None => std::env::remove_var(name),
                }
            }
        }
    }
}

/// A polling list override in the `POLL_ITEMS` wire format
pub const SAMPLE_POLL_ITEMS: &str = r#"[
    ["AussenTemp", 2048, 2, 0.1, true],
    ["Frostgefahr", "0x2500", 22, "b:16:16::raw"],
    ["RTS_akt", 9472, 22, "b:12:13", 0.1, false]
]"#;
