//! CLI command implementations.
//!
//! Each submodule implements one subcommand:
//! - [`tunnel`] - `connect` and `disconnect`
//! - [`status`] - Tunnel status
//! - [`config`] - Settings file management
//! - [`test`] - Connectivity, latency and DNS tests
//! - [`optimize`] - Kernel network tuning
//! - [`keygen`] - Key pair generation
//! - [`info`] - Network information and firewall check
//!
//! Commands that run system tools are generic over a
//! [`CommandRunner`](darp_validation::CommandRunner) so they can be tested
//! without WireGuard installed.

pub mod config;
pub mod info;
pub mod keygen;
pub mod optimize;
pub mod status;
pub mod tunnel;

pub use config::ConfigCommand;
pub use info::{FirewallCommand, InfoCommand};
pub use keygen::KeygenCommand;
pub use optimize::OptimizeCommand;
pub use status::StatusCommand;
pub use test::TestCommand;
pub use tunnel::{ConnectCommand, DisconnectCommand};
