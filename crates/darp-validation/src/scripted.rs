//! Canned command output for exercising [`CommandRunner`] callers without
//! root or the real tools.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::command::{AllowedProgram, CommandError, CommandOutput, CommandRunner, SafeCommand};

/// A runner that replays canned output, keyed by [`SafeCommand::description`].
///
/// Unscripted commands fail with [`CommandError::NotFound`], which is also
/// what a missing binary looks like on a real host.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRunner {
    responses: Arc<Mutex<HashMap<String, CommandOutput>>>,
    calls: Arc<Mutex<Vec<String>>>,
    missing: Arc<Mutex<HashSet<AllowedProgram>>>,
}

impl ScriptedRunner {
    /// Creates a runner with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the output for a command line.
    pub async fn respond(&self, command: &str, output: CommandOutput) {
        self.responses
            .lock()
            .await
            .insert(command.to_string(), output);
    }

    /// Script a successful command with the given stdout.
    pub async fn respond_ok(&self, command: &str, stdout: &str) {
        self.respond(command, CommandOutput::ok(stdout)).await;
    }

    /// Script a failing command with the given exit code and stderr.
    pub async fn respond_failure(&self, command: &str, exit_code: i32, stderr: &str) {
        self.respond(command, CommandOutput::failed(exit_code, stderr))
            .await;
    }

    /// Report `program` as not installed.
    pub async fn set_missing(&self, program: AllowedProgram) {
        self.missing.lock().await.insert(program);
    }

    /// Every command line run so far, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: SafeCommand) -> Result<CommandOutput, CommandError> {
        if let Some(error) = command.errors().first() {
            return Err(CommandError::ValidationFailed(error.clone()));
        }

        let description = command.description();
        self.calls.lock().await.push(description.clone());

        self.responses
            .lock()
            .await
            .get(&description)
            .cloned()
            .ok_or_else(|| CommandError::not_found(command.program().as_str()))
    }

    async fn is_installed(&self, program: AllowedProgram) -> bool {
        !self.missing.lock().await.contains(&program)
    }
}
