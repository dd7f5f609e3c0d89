//! Recording `CommandRunner` shared by the adapter tests.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use infractl::application::ports::CommandRunner;

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub streamed: bool,
    /// Explicit timeout override, `None` when the runner default applies.
    pub timeout: Option<Duration>,
}

/// A `CommandRunner` that records every call and replays canned results.
///
/// Results are consumed in order; once the queue is empty every call exits
/// zero with empty output.
#[derive(Clone, Default)]
pub struct MockCommandRunner {
    calls: Arc<Mutex<Vec<Call>>>,
    results: Arc<Mutex<VecDeque<(i32, String)>>>,
}

impl MockCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next result as `(exit code, stdout)`.
    pub fn then(self, code: i32, stdout: &str) -> Self {
        self.results
            .lock()
            .expect("mutex poisoned")
            .push_back((code, stdout.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("mutex poisoned").clone()
    }

    /// Argument vectors only, in call order.
    pub fn argv(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().map(|c| c.args).collect()
    }

    fn record(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        streamed: bool,
        timeout: Option<Duration>,
    ) -> (i32, String) {
        self.calls.lock().expect("mutex poisoned").push(Call {
            program: program.to_owned(),
            args: args.iter().map(ToString::to_string).collect(),
            cwd: cwd.map(Path::to_path_buf),
            streamed,
            timeout,
        });
        self.results
            .lock()
            .expect("mutex poisoned")
            .pop_front()
            .unwrap_or((0, String::new()))
    }
}

impl CommandRunner for MockCommandRunner {
    async fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<Output> {
        let (code, stdout) = self.record(program, args, cwd, false, None);
        Ok(output(code, stdout))
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> Result<Output> {
        let (code, stdout) = self.record(program, args, cwd, false, Some(timeout));
        Ok(output(code, stdout))
    }

    async fn run_streaming(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<ExitStatus> {
        let (code, _) = self.record(program, args, cwd, true, None);
        Ok(exit_status(code))
    }
}

fn output(code: i32, stdout: String) -> Output {
    Output {
        status: exit_status(code),
        stdout: stdout.into_bytes(),
        stderr: if code == 0 { Vec::new() } else { b"ERROR: boom".to_vec() },
    }
}

/// Build a real `ExitStatus` with the given code.
pub fn exit_status(code: i32) -> ExitStatus {
    // The only stable way to construct an ExitStatus portably is to run a
    // trivial process and capture its status.
    if cfg!(windows) {
        std::process::Command::new("cmd")
            .args(["/C", &format!("exit {code}")])
            .status()
            .expect("failed to spawn helper process for exit status")
    } else {
        std::process::Command::new("sh")
            .args(["-c", &format!("exit {code}")])
            .status()
            .expect("failed to spawn helper process for exit status")
    }
}
