//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill on all platforms.

use std::path::Path;
use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::mpsc;

use crate::application::ports::CommandRunner;

/// Default timeout for short `az` and `terraform` queries.
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(120);

/// Which stream a captured line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Production `CommandRunner` — uses tokio for async process execution
/// with guaranteed timeout and kill on all platforms.
///
/// `tokio::time::timeout` around `.output().await` drops the future but
/// leaves the OS process running on some platforms, so `tokio::select!`
/// with an explicit `child.kill()` is used instead.
pub struct TokioCommandRunner {
    timeout: Duration,
    echo: bool,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            echo: true,
        }
    }

    /// Suppress the live echo of streamed commands (`--quiet`, `--json`).
    #[must_use]
    pub fn silent(mut self) -> Self {
        self.echo = false;
        self
    }

    fn command(program: &str, args: &[&str], cwd: Option<&Path>) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str], cwd: Option<&Path>) -> Result<Output> {
        self.run_with_timeout(program, args, cwd, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
        timeout: Duration,
    ) -> Result<Output> {
        tracing::debug!(program, ?args, ?cwd, "running command");
        let mut child = Self::command(program, args, cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stdout_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stderr_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                );
                Ok(Output {
                    status: status.with_context(|| format!("waiting for {program}"))?,
                    stdout,
                    stderr,
                })
            } => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                anyhow::bail!("{program} timed out after {}s", timeout.as_secs())
            }
        }
    }

    async fn run_streaming(
        &self,
        program: &str,
        args: &[&str],
        cwd: Option<&Path>,
    ) -> Result<ExitStatus> {
        tracing::debug!(program, ?args, ?cwd, "running streamed command");
        let mut child = Self::command(program, args, cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let (tx, rx) = mpsc::unbounded_channel();
        let readers = [
            child
                .stdout
                .take()
                .map(|out| tokio::spawn(forward_lines(out, Stream::Stdout, tx.clone()))),
            child
                .stderr
                .take()
                .map(|err| tokio::spawn(forward_lines(err, Stream::Stderr, tx.clone()))),
        ];
        drop(tx);
        let printer = tokio::spawn(print_lines(rx, self.echo));

        for reader in readers.into_iter().flatten() {
            reader.await.context("output reader task panicked")?;
        }
        let lines = printer.await.context("output printer task panicked")?;
        let status = child
            .wait()
            .await
            .with_context(|| format!("waiting for {program}"))?;
        tracing::debug!(program, lines, %status, "streamed command finished");
        Ok(status)
    }
}

/// Forward every line of `reader` until EOF. A closed channel ends the loop.
async fn forward_lines<R>(reader: R, stream: Stream, tx: mpsc::UnboundedSender<(Stream, String)>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if tx.send((stream, line)).is_err() {
            break;
        }
    }
}

/// Print lines in arrival order; returns the number of lines seen.
async fn print_lines(mut rx: mpsc::UnboundedReceiver<(Stream, String)>, echo: bool) -> usize {
    let mut count = 0;
    while let Some((stream, line)) = rx.recv().await {
        count += 1;
        if !echo {
            tracing::debug!(?stream, "{line}");
            continue;
        }
        match stream {
            Stream::Stdout => println!("{line}"),
            Stream::Stderr => eprintln!("{line}"),
        }
    }
    count
}
