//! Input validation and safe command execution for DARP.
//!
//! Everything that ends up on an external command line or in a file name
//! passes through this crate first: interface names, hostnames, MTUs and
//! timeouts are checked here, and the `command` feature adds a
//! [`command::SafeCommand`] builder that only launches allowlisted programs.
//!
//! ```
//! use darp_validation::{sanitize_interface_name, validate_mtu};
//!
//! let iface = sanitize_interface_name("warp0")?;
//! assert_eq!(iface.as_str(), "warp0");
//! assert_eq!(validate_mtu(1280)?.value(), 1280);
//! assert!(sanitize_interface_name("warp0; reboot").is_err());
//! # Ok::<(), darp_validation::ValidationError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "command")]
pub mod command;
mod error;
mod numeric;
mod sanitized;
#[cfg(all(feature = "command", any(test, feature = "testing")))]
pub mod scripted;
mod strings;

#[cfg(feature = "command")]
pub use command::{
    AllowedProgram, CommandError, CommandOutput, CommandRunner, SafeCommand, SystemRunner,
    find_program, running_as_root,
};
#[cfg(all(feature = "command", any(test, feature = "testing")))]
pub use scripted::ScriptedRunner;
pub use error::{ValidationError, ValidationErrorKind};
pub use numeric::{
    ValidatedMtu, ValidatedPort, ValidatedTimeout, validate_mtu, validate_port, validate_timeout,
};
pub use sanitized::{Hostname, InterfaceName, SanitizationKind, Sanitized, ValidatedValue};
pub use strings::{sanitize_hostname, sanitize_interface_name};

/// Maximum length for interface names (`IFNAMSIZ - 1`).
pub const MAX_INTERFACE_NAME_LENGTH: usize = 15;

/// Smallest MTU accepted for the tunnel interface.
pub const MIN_MTU: u32 = 576;

/// Largest MTU accepted for the tunnel interface.
pub const MAX_MTU: u32 = 9000;

/// Maximum timeout (one hour in seconds).
pub const MAX_TIMEOUT_SECONDS: u64 = 60 * 60;
