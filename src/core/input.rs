//! Diff input acquisition: file, standard input, or a live `git diff`.

use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::{run_command, ExecError};

/// Arguments used when the caller supplies none: detect renames and
/// copies, diff HEAD against the working tree.
const DEFAULT_GIT_ARGS: &str = "-M -C HEAD";

/// Errors that can occur while resolving diff input.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InputError {
    /// The input file is missing or unreadable.
    #[error("failed to read {path}: {source}")]
    FileRead {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Standard input could not be read.
    #[error("failed to read stdin: {0}")]
    Stdin(std::io::Error),

    /// The `git diff` subprocess failed.
    #[error("git diff failed: {0}")]
    GitDiff(#[from] ExecError),

    /// File input was requested without a path argument.
    #[error("file input requires a path argument")]
    MissingPath,
}

/// Raw unified-diff text, however it was obtained.
///
/// The pipeline treats the text as opaque; its structure is the rendering
/// engine's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDiff(String);

impl RawDiff {
    /// Wrap already-obtained diff text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The diff text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether any diff text was captured at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Where the raw diff for one invocation comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffInput {
    /// Read a unified diff from a file.
    File(PathBuf),

    /// Read a unified diff from standard input until EOF.
    Stdin,

    /// Run `git diff` in a directory and capture its output.
    GitDiff {
        /// Positional arguments handed through to `git diff`.
        args: Vec<String>,
        /// Paths excluded via `":(exclude)<path>"` pathspecs.
        ignore: Vec<String>,
        /// Working directory for the subprocess.
        dir: PathBuf,
    },
}

impl DiffInput {
    /// Map a CLI input-type value onto a source.
    ///
    /// `file` reads from the first positional argument and `stdin` from
    /// standard input; any other value runs `git diff` with the positional
    /// arguments.
    pub fn from_cli(
        kind: &str,
        args: Vec<String>,
        ignore: Vec<String>,
        dir: PathBuf,
    ) -> Result<Self, InputError> {
        match kind {
            "file" => {
                let path = args.into_iter().next().ok_or(InputError::MissingPath)?;
                Ok(Self::File(PathBuf::from(path)))
            }
            "stdin" => Ok(Self::Stdin),
            _ => Ok(Self::GitDiff { args, ignore, dir }),
        }
    }
}

/// Resolve a diff source to raw diff text.
///
/// Each call performs its I/O exactly once. Invalid UTF-8 in file or
/// subprocess output is replaced with U+FFFD rather than rejected, since
/// diffs routinely mix encodings.
#[must_use = "this returns a Result that should be checked"]
pub fn resolve(input: &DiffInput) -> Result<RawDiff, InputError> {
    match input {
        DiffInput::File(path) => read_file(path),
        DiffInput::Stdin => read_stdin(),
        DiffInput::GitDiff { args, ignore, dir } => {
            let command = git_diff_command(args, ignore);
            let stdout = run_command(&command, dir)?;
            Ok(RawDiff(stdout))
        }
    }
}

fn read_file(path: &Path) -> Result<RawDiff, InputError> {
    let bytes = std::fs::read(path).map_err(|source| InputError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(RawDiff(String::from_utf8_lossy(&bytes).into_owned()))
}

fn read_stdin() -> Result<RawDiff, InputError> {
    let mut bytes = Vec::new();
    std::io::stdin()
        .lock()
        .read_to_end(&mut bytes)
        .map_err(InputError::Stdin)?;
    Ok(RawDiff(String::from_utf8_lossy(&bytes).into_owned()))
}

/// Assemble the full `git diff` command string.
///
/// Every caller argument is individually double-quoted so whitespace and
/// shell metacharacters survive tokenization as opaque tokens. Without
/// arguments the command defaults to `-M -C HEAD`. `--no-color` is
/// appended unless already present, and each ignored path becomes an
/// `":(exclude)<path>"` pathspec at the end.
///
/// # Examples
///
/// ```
/// use diffpage::core::git_diff_command;
///
/// let cmd = git_diff_command(&["HEAD~1".to_string()], &["vendor".to_string()]);
/// assert_eq!(cmd, "git diff \"HEAD~1\" --no-color \":(exclude)vendor\"");
/// ```
#[must_use]
pub fn git_diff_command(args: &[String], ignore: &[String]) -> String {
    let mut git_args = if args.is_empty() {
        DEFAULT_GIT_ARGS.to_string()
    } else {
        args.iter()
            .map(|arg| format!("\"{}\"", arg))
            .collect::<Vec<_>>()
            .join(" ")
    };

    if !git_args.contains("--no-color") {
        git_args.push_str(" --no-color");
    }

    let mut command = format!("git diff {}", git_args);
    for path in ignore {
        command.push_str(&format!(" \":(exclude){}\"", path));
    }
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_each_arg_and_preserves_order() {
        let args = vec![
            "HEAD~3".to_string(),
            "--stat".to_string(),
            "my file.txt".to_string(),
        ];
        let cmd = git_diff_command(&args, &[]);
        assert_eq!(
            cmd,
            "git diff \"HEAD~3\" \"--stat\" \"my file.txt\" --no-color"
        );
    }

    #[test]
    fn defaults_to_rename_detection_against_head() {
        let cmd = git_diff_command(&[], &[]);
        assert_eq!(cmd, "git diff -M -C HEAD --no-color");
    }

    #[test]
    fn no_color_is_not_duplicated() {
        let args = vec!["--no-color".to_string(), "HEAD".to_string()];
        let cmd = git_diff_command(&args, &[]);
        assert_eq!(cmd.matches("--no-color").count(), 1);
        assert_eq!(cmd, "git diff \"--no-color\" \"HEAD\"");
    }

    #[test]
    fn ignored_paths_become_exclude_pathspecs_in_order() {
        let ignore = vec!["package-lock.json".to_string(), "dist".to_string()];
        let cmd = git_diff_command(&[], &ignore);
        assert_eq!(
            cmd,
            "git diff -M -C HEAD --no-color \":(exclude)package-lock.json\" \":(exclude)dist\""
        );
        let first = cmd.find(":(exclude)package-lock.json").unwrap();
        let second = cmd.find(":(exclude)dist").unwrap();
        assert!(first < second);
    }

    #[test]
    fn empty_ignore_list_adds_nothing() {
        let cmd = git_diff_command(&["HEAD".to_string()], &[]);
        assert!(!cmd.contains(":(exclude)"));
    }

    #[test]
    fn assembled_command_tokenizes_back_to_the_original_args() {
        let args = vec!["my file.txt".to_string(), "--stat".to_string()];
        let cmd = git_diff_command(&args, &["a dir".to_string()]);
        let tokens = shell_words::split(&cmd).unwrap();
        assert_eq!(
            tokens,
            vec![
                "git",
                "diff",
                "my file.txt",
                "--stat",
                "--no-color",
                ":(exclude)a dir"
            ]
        );
    }

    #[test]
    fn file_input_requires_a_path() {
        let err = DiffInput::from_cli("file", vec![], vec![], PathBuf::from("."));
        assert!(matches!(err, Err(InputError::MissingPath)));
    }

    #[test]
    fn unknown_input_kind_falls_through_to_git() {
        let input = DiffInput::from_cli(
            "command",
            vec!["HEAD".to_string()],
            vec![],
            PathBuf::from("."),
        )
        .unwrap();
        assert!(matches!(input, DiffInput::GitDiff { .. }));
    }

    #[test]
    fn missing_file_reports_the_path() {
        let input = DiffInput::File(PathBuf::from("/nonexistent/some.diff"));
        let err = resolve(&input).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/some.diff"));
    }

    #[test]
    fn file_input_round_trips_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("changes.diff");
        std::fs::write(&path, "diff --git a/x b/x\n").unwrap();
        let raw = resolve(&DiffInput::File(path)).unwrap();
        assert_eq!(raw.as_str(), "diff --git a/x b/x\n");
        assert!(!raw.is_empty());
    }
}
