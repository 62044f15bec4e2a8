//! Test utilities and mocks for preflight unit tests.
//!
//! Process execution and archive retrieval are the two seams that reach
//! outside the process; both get canned implementations here.
//!
//! # Example
//!
//! ```rust,ignore
//! use preflight::test_support::{MockProcessOutput, MockRunner};
//!
//! let runner = MockRunner::new();
//! runner.expect("uname -s", MockProcessOutput::success("Linux\n"));
//! ```

pub mod fixtures;

use std::path::Path;
use std::sync::Mutex;

use url::Url;

use crate::core::error::ConfigureError;
use crate::sources::headers::ArchiveRetriever;
use crate::util::process::{CommandOutput, CommandRunner, ProcessBuilder};

pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    fn to_output(&self) -> CommandOutput {
        CommandOutput {
            status: Some(self.status),
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        }
    }
}

/// Pattern for matching commands in [`MockRunner`].
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
}

impl CommandPattern {
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

#[derive(Debug, Default)]
struct RunnerState {
    expectations: Vec<(CommandPattern, MockProcessOutput)>,
    calls: Vec<String>,
}

/// Mock command runner.
///
/// Commands are matched against expectations in registration order on their
/// displayed form. Anything unmatched fails as if it could not be spawned.
#[derive(Debug, Default)]
pub struct MockRunner {
    state: Mutex<RunnerState>,
}

impl MockRunner {
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&self, cmd: &str, output: MockProcessOutput) -> &Self {
        self.expect_pattern(CommandPattern::Exact(cmd.to_string()), output)
    }

    /// Add an expectation for a command starting with a prefix.
    pub fn expect_prefix(&self, prefix: &str, output: MockProcessOutput) -> &Self {
        self.expect_pattern(CommandPattern::StartsWith(prefix.to_string()), output)
    }

    /// Add an expectation for a command containing a substring.
    pub fn expect_contains(&self, substring: &str, output: MockProcessOutput) -> &Self {
        self.expect_pattern(CommandPattern::Contains(substring.to_string()), output)
    }

    pub fn expect_pattern(&self, pattern: CommandPattern, output: MockProcessOutput) -> &Self {
        self.state.lock().unwrap().expectations.push((pattern, output));
        self
    }

    /// Get all commands that were run.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<CommandOutput, ConfigureError> {
        let full_cmd = cmd.display_command();
        let mut state = self.state.lock().unwrap();
        state.calls.push(full_cmd.clone());

        state
            .expectations
            .iter()
            .find(|(pattern, _)| pattern.matches(&full_cmd))
            .map(|(_, output)| output.to_output())
            .ok_or_else(|| ConfigureError::ExternalCommandFailure {
                command: full_cmd,
                status: None,
                stderr: "unexpected command".to_string(),
            })
    }
}

/// Mock archive retriever that records calls instead of downloading.
#[derive(Debug)]
pub struct MockRetriever {
    behavior: RetrieverBehavior,
    calls: Mutex<usize>,
}

#[derive(Debug)]
enum RetrieverBehavior {
    Create(String),
    Fail(i32),
}

impl MockRetriever {
    /// Unpacks an empty bundle directory named `dir_name`.
    pub fn creating(dir_name: &str) -> Self {
        MockRetriever {
            behavior: RetrieverBehavior::Create(dir_name.to_string()),
            calls: Mutex::new(0),
        }
    }

    /// Fails like a download pipeline exiting with `status`.
    pub fn failing(status: i32) -> Self {
        MockRetriever {
            behavior: RetrieverBehavior::Fail(status),
            calls: Mutex::new(0),
        }
    }

    /// Number of retrievals attempted.
    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl ArchiveRetriever for MockRetriever {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn retrieve_and_extract(&self, url: &Url, dest: &Path) -> Result<(), ConfigureError> {
        *self.calls.lock().unwrap() += 1;
        match self.behavior {
            RetrieverBehavior::Create(ref name) => {
                let dir = dest.join(name);
                std::fs::create_dir_all(dir.join("src"))
                    .map_err(|e| ConfigureError::io(&dir, e))?;
                Ok(())
            }
            RetrieverBehavior::Fail(status) => Err(ConfigureError::ExternalCommandFailure {
                command: format!("fetch {}", url),
                status: Some(status),
                stderr: "mock failure".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_matches_in_order() {
        let runner = MockRunner::new();
        runner.expect("uname -s", MockProcessOutput::success("Darwin"));
        runner.expect_prefix("uname", MockProcessOutput::failure(1, "nope"));

        let out = runner.run(&ProcessBuilder::new("uname").arg("-s")).unwrap();
        assert_eq!(out.stdout, "Darwin");
        let out = runner.run(&ProcessBuilder::new("uname").arg("-r")).unwrap();
        assert_eq!(out.status, Some(1));
        assert!(runner.run(&ProcessBuilder::new("lsb_release")).is_err());
        assert_eq!(runner.calls(), ["uname -s", "uname -r", "lsb_release"]);
    }
}
