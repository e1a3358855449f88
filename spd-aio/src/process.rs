// spd-aio/src/process.rs
use std::process::{Command, Stdio};

use spd_common::error::{Result, SpdError};
use tracing::{debug, error};

/// Exit status plus everything the process printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// -1 when the process could not be spawned or died from a signal.
    pub exit_code: i32,
    /// stdout followed by stderr, lossily decoded.
    pub combined_output: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn spawn_failure(message: impl Into<String>) -> Self {
        Self {
            exit_code: -1,
            combined_output: message.into(),
        }
    }
}

/// Seam between the acquisition logic and real subprocesses.
///
/// `command` is the program followed by its arguments. Implementations must not
/// fail on a non-zero exit; that is reported through `ProcessOutput::exit_code`.
pub trait CommandRunner: Send + Sync {
    fn run(&self, label: &str, command: &[String]) -> ProcessOutput;
}

/// Runs commands as blocking child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, label: &str, command: &[String]) -> ProcessOutput {
        let Some((program, args)) = command.split_first() else {
            return ProcessOutput::spawn_failure(format!("[{label}] empty command"));
        };
        debug!("{} CMD: {}", label, command.join(" "));
        match run_command_sync(program, args) {
            Ok(output) => output,
            Err(e) => ProcessOutput::spawn_failure(format!("[{label}] {e}")),
        }
    }
}

/// Runs an external command to completion and captures its output.
///
/// No timeout: callers run on a dedicated blocking thread.
pub fn run_command_sync(program: &str, args: &[String]) -> Result<ProcessOutput> {
    debug!("Sync Running command: {} {:?}", program, args);
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.stdin(Stdio::null()); // Prevent hanging on stdin

    match cmd.output() {
        Ok(output) => {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.is_empty() {
                if !combined.is_empty() && !combined.ends_with('\n') {
                    combined.push('\n');
                }
                combined.push_str(&stderr);
            }
            if !output.status.success() {
                debug!("Sync Command failed with status: {}", output.status);
                if !combined.trim().is_empty() {
                    debug!("Output:\n{}", combined.trim());
                }
            } else {
                debug!("Sync Command finished successfully.");
            }
            Ok(ProcessOutput {
                exit_code: output.status.code().unwrap_or(-1),
                combined_output: combined,
            })
        }
        Err(e) => {
            error!("Sync Failed to execute command {}: {}", program, e);
            Err(SpdError::CommandExec(format!("{program}: {e}")))
        }
    }
}
