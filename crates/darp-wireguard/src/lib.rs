//! WireGuard support for DARP.
//!
//! This crate provides:
//! - Curve25519 key types compatible with `wg genkey`/`wg pubkey`
//! - The Cloudflare WARP profile built from DARP settings
//! - Rendering and parsing of `wg-quick` config files
//! - Parsing of `wg show` output
//! - [`TunnelManager`], which brings the tunnel up and down via `wg-quick`
//!
//! ```no_run
//! # async fn example() -> darp_wireguard::Result<()> {
//! use darp_config::Config;
//! use darp_wireguard::{TunnelManager, TunnelSettings, WarpProfile};
//!
//! let config = Config::default();
//! let manager = TunnelManager::new(TunnelSettings::from_config(&config))?;
//! manager.connect(&WarpProfile::generate(&config)?).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
mod keys;
mod profile;
mod show;
mod tunnel;
mod types;

pub use config::{InterfaceConfig, PeerConfig, PeerConfigBuilder, parse_wg_config, render_wg_config};
pub use error::{INSTALL_HINT, Result, WireGuardError};
pub use keys::{KEY_SIZE, KeyPair, PresharedKey, PrivateKey, PublicKey, generate_keypair};
pub use profile::{WARP_ALLOWED_IPS, WARP_CLIENT_ADDRESS, WARP_PEER_PUBLIC_KEY, WarpProfile};
pub use show::{WgShow, WgShowPeer, parse_wg_show};
pub use tunnel::{TunnelManager, TunnelSettings, TunnelStatus};
pub use types::{AllowedIp, Endpoint};
