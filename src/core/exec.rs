//! Execution of assembled command lines with captured output.

use std::path::Path;
use std::process::Command;

use thiserror::Error;

/// Errors that can occur when running an external command.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExecError {
    /// The command line could not be tokenized.
    #[error("invalid command line: {0}")]
    Parse(#[from] shell_words::ParseError),

    /// The command line contained no program name.
    #[error("empty command line")]
    EmptyCommand,

    /// The process could not be launched.
    #[error("failed to launch command: {0}")]
    Io(#[from] std::io::Error),

    /// The process ran but exited with a non-zero status.
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Run an assembled command line in `dir` and capture its standard output.
///
/// The command string is split with shell quoting rules, so arguments
/// wrapped in double quotes survive as single tokens. The child runs to
/// completion with both output streams captured. Invalid UTF-8 in the
/// output is replaced with U+FFFD.
#[must_use = "this returns a Result that should be checked"]
pub fn run_command(command_line: &str, dir: &Path) -> Result<String, ExecError> {
    let argv = shell_words::split(command_line)?;
    let Some((program, args)) = argv.split_first() else {
        return Err(ExecError::EmptyCommand);
    };

    log::debug!("running `{}` in {}", command_line, dir.display());

    let output = Command::new(program).args(args).current_dir(dir).output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = if stderr.trim().is_empty() {
            format!("{} exited with {}", program, output.status)
        } else {
            stderr.trim().to_string()
        };
        return Err(ExecError::CommandFailed(message));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
