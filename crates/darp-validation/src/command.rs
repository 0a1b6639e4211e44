//! Safe command execution with command injection prevention.
//!
//! Every external tool DARP drives (`wg`, `wg-quick`, `ip`, `sysctl`,
//! `systemctl`, `iptables`) is launched through [`SafeCommand`]:
//!
//! - **No shell invocation**: arguments are passed directly, never via `sh -c`
//! - **Argument validation**: all arguments are validated before use
//! - **Allowlist enforcement**: only the programs in [`AllowedProgram`] can run
//!
//! Callers that need to be tested without root take a [`CommandRunner`]
//! instead of executing directly. [`SystemRunner`] runs for real; with the
//! `testing` feature, `ScriptedRunner` replays canned output.
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), darp_validation::command::CommandError> {
//! use darp_validation::command::{AllowedProgram, SafeCommand};
//!
//! let output = SafeCommand::new(AllowedProgram::Ip)
//!     .args(["addr", "show", "warp0"])
//!     .execute()
//!     .await?;
//!
//! println!("stdout: {}", output.stdout_lossy());
//! # Ok(())
//! # }
//! ```

use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command as TokioCommand;
use tracing::debug;

use crate::error::ValidationError;

/// Programs that are explicitly allowed to be executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AllowedProgram {
    /// The `wg` WireGuard inspection tool.
    Wg,
    /// The `wg-quick` interface helper.
    WgQuick,
    /// The iproute2 `ip` tool.
    Ip,
    /// The `sysctl` kernel parameter tool.
    Sysctl,
    /// The `systemctl` service manager CLI.
    Systemctl,
    /// The `iptables` firewall CLI.
    Iptables,
}

impl AllowedProgram {
    /// Get the program name to execute.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wg => "wg",
            Self::WgQuick => "wg-quick",
            Self::Ip => "ip",
            Self::Sysctl => "sysctl",
            Self::Systemctl => "systemctl",
            Self::Iptables => "iptables",
        }
    }

    /// Check whether the program can be found on `PATH`.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        find_program(self.as_str()).is_some()
    }
}

impl fmt::Display for AllowedProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors that can occur during safe command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Validation of a command argument failed.
    #[error("argument validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// The program binary could not be found.
    #[error("program '{program}' not found")]
    NotFound {
        /// The program that was looked up.
        program: String,
    },

    /// The command returned a non-zero exit code.
    #[error("command '{command}' exited with code {exit_code}: {stderr}")]
    NonZeroExit {
        /// The command that was executed.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// Standard error output.
        stderr: String,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CommandError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(program: impl Into<String>) -> Self {
        Self::NotFound {
            program: program.into(),
        }
    }

    /// Create a non-zero exit error.
    #[must_use]
    pub fn non_zero_exit(
        command: impl Into<String>,
        exit_code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        Self::NonZeroExit {
            command: command.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// Check if this is a validation error.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationFailed(_))
    }

    /// Check if the program was missing.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Characters that are never allowed in command arguments.
const FORBIDDEN_CHARS: &[char] = &[
    '\0', // Null byte
    '\n', // Newline (can break argument parsing)
    '\r', // Carriage return
];

/// Validate a command argument.
///
/// # Errors
///
/// Returns an error if the argument contains forbidden characters.
pub fn validate_argument(arg: &str, field_name: &str) -> Result<(), ValidationError> {
    for c in arg.chars() {
        if FORBIDDEN_CHARS.contains(&c) {
            return Err(ValidationError::shell_injection(field_name, c));
        }
    }

    Ok(())
}

/// Look up a program on `PATH` the way `which` does.
///
/// Returns the first executable regular file named `name`.
#[must_use]
pub fn find_program(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    find_program_in(name, &path)
}

/// Whether the current process runs as root.
///
/// Reads the owner of `/proc/self`, which the kernel sets to the process's
/// effective uid.
#[must_use]
pub fn running_as_root() -> bool {
    use std::os::unix::fs::MetadataExt;

    std::fs::metadata("/proc/self").is_ok_and(|meta| meta.uid() == 0)
}

fn find_program_in(name: &str, search_path: &OsStr) -> Option<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    std::env::split_paths(search_path)
        .map(|dir| dir.join(name))
        .find(|candidate| {
            std::fs::metadata(candidate)
                .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        })
}

/// Output from a command execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output.
    pub stdout: Vec<u8>,
    /// Standard error.
    pub stderr: Vec<u8>,
    /// Exit status code (0 for success).
    pub exit_code: i32,
}

impl CommandOutput {
    /// Build a successful output carrying `stdout`.
    #[must_use]
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into().into_bytes(),
            stderr: Vec::new(),
            exit_code: 0,
        }
    }

    /// Build a failed output carrying `stderr`.
    #[must_use]
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: Vec::new(),
            stderr: stderr.into().into_bytes(),
            exit_code,
        }
    }

    /// Get stdout as a UTF-8 string, replacing invalid characters.
    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Get stderr as a UTF-8 string, replacing invalid characters.
    #[must_use]
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Check if the command succeeded (exit code 0).
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Turn a non-zero exit into [`CommandError::NonZeroExit`].
    ///
    /// # Errors
    ///
    /// Returns an error if the exit code is not 0.
    pub fn check(self, command: &str) -> Result<Self, CommandError> {
        if self.success() {
            Ok(self)
        } else {
            Err(CommandError::non_zero_exit(
                command,
                self.exit_code,
                self.stderr_lossy().trim(),
            ))
        }
    }
}

/// A safe command builder that validates all inputs.
///
/// ```rust,no_run
/// # async fn example() -> Result<(), darp_validation::command::CommandError> {
/// use darp_validation::command::{AllowedProgram, SafeCommand};
///
/// SafeCommand::new(AllowedProgram::WgQuick)
///     .args(["up", "warp0"])
///     .with_sudo(true)
///     .execute()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SafeCommand {
    program: AllowedProgram,
    args: Vec<String>,
    sudo: bool,
    validation_errors: Vec<ValidationError>,
}

impl SafeCommand {
    /// Create a new safe command for the given program.
    #[must_use]
    pub fn new(program: AllowedProgram) -> Self {
        Self {
            program,
            args: Vec::new(),
            sudo: false,
            validation_errors: Vec::new(),
        }
    }

    /// Add a single argument to the command.
    #[must_use]
    pub fn arg(mut self, arg: &str) -> Self {
        match validate_argument(arg, "argument") {
            Ok(()) => self.args.push(arg.to_string()),
            Err(e) => self.validation_errors.push(e),
        }
        self
    }

    /// Add multiple arguments to the command.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            let arg = arg.as_ref();
            match validate_argument(arg, "argument") {
                Ok(()) => self.args.push(arg.to_string()),
                Err(e) => self.validation_errors.push(e),
            }
        }
        self
    }

    /// Run the program through `sudo`.
    #[must_use]
    pub fn with_sudo(mut self, sudo: bool) -> Self {
        self.sudo = sudo;
        self
    }

    /// The program this command runs.
    #[must_use]
    pub fn program(&self) -> AllowedProgram {
        self.program
    }

    /// The validated arguments, excluding any `sudo` prefix.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Whether the command is run through `sudo`.
    #[must_use]
    pub fn uses_sudo(&self) -> bool {
        self.sudo
    }

    /// Check if there are any validation errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.validation_errors.is_empty()
    }

    /// Get any validation errors that occurred.
    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.validation_errors
    }

    /// The command line as it would be typed, for logging and error messages.
    #[must_use]
    pub fn description(&self) -> String {
        let mut parts = Vec::with_capacity(self.args.len() + 2);
        if self.sudo {
            parts.push("sudo");
        }
        parts.push(self.program.as_str());
        parts.extend(self.args.iter().map(String::as_str));
        parts.join(" ")
    }

    fn build(&self) -> TokioCommand {
        let mut cmd = if self.sudo {
            let mut cmd = TokioCommand::new("sudo");
            cmd.arg(self.program.as_str());
            cmd
        } else {
            TokioCommand::new(self.program.as_str())
        };
        cmd.args(&self.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }

    /// Execute the command and return the output.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Validation errors were collected during building
    /// - The program is missing or fails to start
    /// - The command returns a non-zero exit code
    pub async fn execute(self) -> Result<CommandOutput, CommandError> {
        let description = self.description();
        self.execute_unchecked().await?.check(&description)
    }

    /// Execute the command without checking the exit code.
    ///
    /// # Errors
    ///
    /// Returns an error if validation failed or the command couldn't be started.
    pub async fn execute_unchecked(self) -> Result<CommandOutput, CommandError> {
        if let Some(error) = self.validation_errors.first() {
            return Err(CommandError::ValidationFailed(error.clone()));
        }

        let description = self.description();
        debug!(command = %description, "executing command");

        let output = self.build().output().await.map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                let program = if self.sudo { "sudo" } else { self.program.as_str() };
                CommandError::not_found(program)
            } else {
                CommandError::Io(e)
            }
        })?;

        let exit_code = output.status.code().unwrap_or(-1);
        debug!(command = %description, exit_code, "command finished");

        Ok(CommandOutput {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code,
        })
    }
}

/// Something that can run a [`SafeCommand`].
///
/// Implementations return the output whatever the exit code; callers decide
/// whether a failure matters with [`CommandOutput::check`].
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run the command and capture its output.
    async fn run(&self, command: SafeCommand) -> Result<CommandOutput, CommandError>;

    /// Whether `program` is available to run.
    async fn is_installed(&self, program: AllowedProgram) -> bool {
        program.is_installed()
    }
}

/// Runs commands on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    async fn run(&self, command: SafeCommand) -> Result<CommandOutput, CommandError> {
        command.execute_unchecked().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedRunner;
    use crate::ValidationErrorKind;

    #[test]
    fn test_validate_argument_valid() {
        assert!(validate_argument("--flag", "arg").is_ok());
        assert!(validate_argument("net.core.rmem_max=134217728", "arg").is_ok());
        assert!(validate_argument("", "arg").is_ok());
        assert!(validate_argument("/etc/wireguard/warp0.conf", "arg").is_ok());
    }

    #[test]
    fn test_validate_argument_null_byte() {
        let err = validate_argument("arg\0value", "arg").unwrap_err();
        assert!(matches!(err.kind, ValidationErrorKind::ShellInjection { .. }));
    }

    #[test]
    fn test_forbidden_chars_rejected() {
        assert!(validate_argument("line1\nline2", "arg").is_err());
        assert!(validate_argument("text\r", "arg").is_err());
    }

    #[test]
    fn test_safe_command_builder() {
        let cmd = SafeCommand::new(AllowedProgram::Ip).arg("addr").arg("show");

        assert!(!cmd.has_errors());
        assert_eq!(cmd.arguments(), ["addr", "show"]);
        assert_eq!(cmd.program(), AllowedProgram::Ip);
    }

    #[test]
    fn test_safe_command_with_invalid_arg() {
        let cmd = SafeCommand::new(AllowedProgram::Wg)
            .arg("show")
            .arg("warp0\0");

        assert!(cmd.has_errors());
        assert_eq!(cmd.errors().len(), 1);
        assert_eq!(cmd.arguments(), ["show"]);
    }

    #[test]
    fn test_description() {
        let cmd = SafeCommand::new(AllowedProgram::Iptables).args(["-L", "INPUT", "-n"]);
        assert_eq!(cmd.description(), "iptables -L INPUT -n");
    }

    #[test]
    fn test_description_with_sudo() {
        let cmd = SafeCommand::new(AllowedProgram::WgQuick)
            .args(["up", "warp0"])
            .with_sudo(true);
        assert!(cmd.uses_sudo());
        assert_eq!(cmd.description(), "sudo wg-quick up warp0");
    }

    #[test]
    fn test_allowed_program_as_str() {
        assert_eq!(AllowedProgram::Wg.as_str(), "wg");
        assert_eq!(AllowedProgram::WgQuick.as_str(), "wg-quick");
        assert_eq!(AllowedProgram::Sysctl.to_string(), "sysctl");
    }

    #[test]
    fn test_command_output_check() {
        let output = CommandOutput::ok("hello");
        assert!(output.success());
        assert_eq!(output.stdout_lossy(), "hello");
        assert!(output.check("echo hello").is_ok());

        let err = CommandOutput::failed(1, "boom\n")
            .check("wg-quick up warp0")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "command 'wg-quick up warp0' exited with code 1: boom"
        );
    }

    #[test]
    fn test_find_program_in_custom_path() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("wg");
        std::fs::write(&exe, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();
        let plain = dir.path().join("wg-quick");
        std::fs::write(&plain, "not executable").unwrap();
        std::fs::set_permissions(&plain, std::fs::Permissions::from_mode(0o644)).unwrap();

        let search = std::env::join_paths(["/nonexistent-darp-dir", dir.path().to_str().unwrap()])
            .unwrap();
        assert_eq!(find_program_in("wg", &search), Some(exe));
        assert_eq!(find_program_in("wg-quick", &search), None);
    }

    #[test]
    fn test_find_program_missing() {
        assert!(find_program("definitely-not-a-real-program-darp").is_none());
    }

    #[tokio::test]
    async fn test_scripted_runner_replays_and_records() {
        let runner = ScriptedRunner::new();
        runner.respond_ok("ip link show warp0", "3: warp0: <POINTOPOINT>").await;
        runner
            .respond_failure("sudo wg-quick down warp0", 1, "not a wireguard interface")
            .await;

        let up = runner
            .run(SafeCommand::new(AllowedProgram::Ip).args(["link", "show", "warp0"]))
            .await
            .unwrap();
        assert!(up.success());

        let down = runner
            .run(
                SafeCommand::new(AllowedProgram::WgQuick)
                    .args(["down", "warp0"])
                    .with_sudo(true),
            )
            .await
            .unwrap();
        assert_eq!(down.exit_code, 1);

        let missing = runner
            .run(SafeCommand::new(AllowedProgram::Sysctl).arg("-a"))
            .await
            .unwrap_err();
        assert!(missing.is_not_found());

        assert_eq!(
            runner.calls().await,
            vec!["ip link show warp0", "sudo wg-quick down warp0", "sysctl -a"]
        );
    }

    #[tokio::test]
    async fn test_scripted_runner_rejects_invalid_arguments() {
        let runner = ScriptedRunner::new();
        let err = runner
            .run(SafeCommand::new(AllowedProgram::Ip).arg("bad\narg"))
            .await
            .unwrap_err();
        assert!(err.is_validation_error());
        assert!(runner.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_scripted_runner_installation() {
        let runner = ScriptedRunner::new();
        assert!(runner.is_installed(AllowedProgram::WgQuick).await);

        runner.set_missing(AllowedProgram::WgQuick).await;
        assert!(!runner.is_installed(AllowedProgram::WgQuick).await);
        assert!(runner.is_installed(AllowedProgram::Wg).await);
    }

    #[test]
    fn test_running_as_root_matches_proc_owner() {
        use std::os::unix::fs::MetadataExt;

        let expected = std::fs::metadata("/proc/self").is_ok_and(|m| m.uid() == 0);
        assert_eq!(running_as_root(), expected);
    }

    #[tokio::test]
    async fn test_execute_unchecked_rejects_invalid_arguments() {
        let err = SafeCommand::new(AllowedProgram::Ip)
            .arg("bad\0arg")
            .execute_unchecked()
            .await
            .unwrap_err();
        assert!(err.is_validation_error());
    }
}
