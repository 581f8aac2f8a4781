//! Render probing via the Mermaid CLI (`mmdc`).
//!
//! Each probe gets its own temporary directory holding the diagram source
//! and the discarded render output. The directory guard removes both on
//! every exit path, including timeouts and I/O errors.
//!
//! The timeout bounds the whole probe. Stderr is read on a helper thread and
//! collected only until the deadline, so a renderer that leaves a background
//! process holding the pipe cannot stall the run.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use crate::consts::{DEFAULT_RENDERER, DEFAULT_TIMEOUT, POLL_INTERVAL, STDERR_CHUNK_SIZE};
use crate::probe::{RenderOutcome, RenderProbe};

/// Diagram source filename inside the probe directory.
const INPUT_FILENAME: &str = "diagram.mmd";

/// Render target inside the probe directory. Never read back.
const OUTPUT_FILENAME: &str = "diagram.svg";

/// Prefix of per-probe scratch directories.
const WORKDIR_PREFIX: &str = "mdv-probe-";

/// [`RenderProbe`] that shells out to `mmdc`.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use mdv_diagrams::{MermaidCli, RenderProbe};
///
/// let probe = MermaidCli::new("mmdc").timeout(Duration::from_secs(30));
/// let outcome = probe.probe("graph TD\nA-->B");
/// ```
#[derive(Debug, Clone)]
pub struct MermaidCli {
    /// Executable to run.
    program: String,
    /// Arguments placed before the probe's own (e.g. `mmdc` for `npx mmdc`).
    leading_args: Vec<String>,
    timeout: Duration,
    /// Parent of the scratch directories; `None` uses the system temp dir.
    work_dir: Option<PathBuf>,
}

impl Default for MermaidCli {
    fn default() -> Self {
        Self::new(DEFAULT_RENDERER)
    }
}

impl MermaidCli {
    /// Create a probe for `command`.
    ///
    /// The command is split on whitespace: the first word is the executable,
    /// the rest are passed before the probe arguments.
    #[must_use]
    pub fn new(command: &str) -> Self {
        let mut words = command.split_whitespace().map(str::to_owned);
        Self {
            program: words.next().unwrap_or_else(|| DEFAULT_RENDERER.to_owned()),
            leading_args: words.collect(),
            timeout: DEFAULT_TIMEOUT,
            work_dir: None,
        }
    }

    /// Set the per-diagram timeout. Default is 10 seconds.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create scratch directories under `dir` instead of the system temp dir.
    #[must_use]
    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    fn unavailable(&self) -> RenderOutcome {
        RenderOutcome::unavailable(format!("{} not available", self.program))
    }

    fn try_probe(&self, source: &str) -> io::Result<RenderOutcome> {
        let deadline = Instant::now() + self.timeout;

        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKDIR_PREFIX);
        let workdir = match &self.work_dir {
            Some(dir) => builder.tempdir_in(dir)?,
            None => builder.tempdir()?,
        };
        let input = workdir.path().join(INPUT_FILENAME);
        let output = workdir.path().join(OUTPUT_FILENAME);

        let mut file = std::fs::File::create_new(&input)?;
        file.write_all(source.as_bytes())?;
        file.flush()?;
        drop(file);

        let mut child = match self.spawn(&input, &output) {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(program = %self.program, "Renderer not found");
                return Ok(self.unavailable());
            }
            Err(e) => return Err(e),
        };

        // Drain stderr concurrently so a chatty renderer cannot fill the pipe
        let stderr = child.stderr.take().map(drain_stderr);

        let Some(status) = wait_until(&mut child, deadline)? else {
            tracing::debug!(
                program = %self.program,
                timeout_secs = self.timeout.as_secs(),
                "Renderer timed out"
            );
            return Ok(self.unavailable());
        };

        if status.success() {
            return Ok(RenderOutcome::rendered());
        }

        let stderr = stderr
            .map(|chunks| collect_stderr(&chunks, deadline))
            .unwrap_or_default();
        Ok(RenderOutcome::failed(format!(
            "Rendering failed: {}",
            stderr.trim()
        )))
    }

    fn spawn(&self, input: &Path, output: &Path) -> io::Result<Child> {
        Command::new(&self.program)
            .args(&self.leading_args)
            .arg("-i")
            .arg(input)
            .arg("-o")
            .arg(output)
            .arg("--quiet")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
    }
}

impl RenderProbe for MermaidCli {
    fn probe(&self, source: &str) -> RenderOutcome {
        self.try_probe(source).unwrap_or_else(|e| {
            tracing::warn!(program = %self.program, error = %e, "Render probe failed");
            RenderOutcome::failed(format!("Rendering test error: {e}"))
        })
    }
}

/// Forward stderr chunks from a helper thread until the pipe closes.
fn drain_stderr(mut stderr: ChildStderr) -> Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = [0u8; STDERR_CHUNK_SIZE];
        while let Ok(n @ 1..) = stderr.read(&mut buf) {
            if tx.send(buf[..n].to_vec()).is_err() {
                break;
            }
        }
    });
    rx
}

/// Gather stderr until the pipe closes or `deadline` passes.
///
/// Output already received is kept when the deadline cuts collection short.
fn collect_stderr(chunks: &Receiver<Vec<u8>>, deadline: Instant) -> String {
    // The child has exited, so allow a short grace for buffered output
    let deadline = deadline.max(Instant::now() + POLL_INTERVAL);
    let remaining = || deadline.saturating_duration_since(Instant::now());
    let mut bytes = Vec::new();
    while let Ok(chunk) = chunks.recv_timeout(remaining()) {
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Poll `child` until it exits or `deadline` passes.
///
/// Returns `None` on timeout. The child is killed and reaped on timeout and
/// when polling itself fails.
fn wait_until(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {}
            Err(e) => {
                kill_and_reap(child);
                return Err(e);
            }
        }
        if Instant::now() >= deadline {
            kill_and_reap(child);
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn kill_and_reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
