//! Startup checks and the welcome banner.

use darp_validation::{AllowedProgram, CommandRunner, running_as_root};
use darp_wireguard::INSTALL_HINT;

use crate::output::Welcome;

/// Name shown when no user can be determined.
const FALLBACK_USER: &str = "user";

/// The user to greet, from `$USER` then `$LOGNAME`.
#[must_use]
pub fn username() -> String {
    username_from(|name| std::env::var(name).ok())
}

fn username_from(lookup: impl Fn(&str) -> Option<String>) -> String {
    ["USER", "LOGNAME"]
        .into_iter()
        .filter_map(lookup)
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_USER.to_string())
}

/// The banner printed when `darp` runs without a subcommand.
#[must_use]
pub fn welcome() -> Welcome {
    Welcome {
        version: env!("CARGO_PKG_VERSION").to_string(),
        username: username(),
    }
}

/// Warnings printed to stderr before a command runs.
///
/// Covers running without root and missing WireGuard tools.
pub async fn environment_warnings<R: CommandRunner>(runner: &R, is_root: bool) -> Vec<String> {
    let mut warnings = Vec::new();

    if !is_root {
        warnings.push(
            "⚠️  Warning: Some operations may require root privileges\n   \
             Consider running with sudo for full functionality"
                .to_string(),
        );
    }

    for program in [AllowedProgram::Wg, AllowedProgram::WgQuick] {
        if !runner.is_installed(program).await {
            warnings.push(format!(
                "⚠️  WireGuard not found: {program} is not installed\n   \
                 Some features may not work without WireGuard\n   \
                 Install with: {INSTALL_HINT}"
            ));
            break;
        }
    }

    warnings
}

/// [`environment_warnings`] for the current process.
pub async fn host_warnings<R: CommandRunner>(runner: &R) -> Vec<String> {
    environment_warnings(runner, running_as_root()).await
}
