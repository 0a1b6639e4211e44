//! DARP settings.
//!
//! Settings live in a JSON file, by default `~/.config/darp/config.json`.
//! A missing file is created with defaults on first load.
//!
//! ```no_run
//! use darp_config::Config;
//!
//! let mut config = Config::load(None)?;
//! config.validate()?;
//! config.set("network.mtu", "1420")?;
//! # Ok::<(), darp_config::ConfigError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
mod file;
mod keys;
mod settings;

pub use error::{ConfigError, Result};
pub use file::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, default_config_path};
pub use keys::CONFIG_KEYS;
pub use settings::{
    CloudflareSettings, Config, DEFAULT_DNS, DEFAULT_INTERFACE, DEFAULT_MTU,
    DEFAULT_TIMEOUT_SECS, DEFAULT_WARP_ENDPOINT, DEFAULT_WIREGUARD_DIR, LogFormat, LogLevel,
    LoggingSettings, NetworkSettings, WireGuardSettings,
};
