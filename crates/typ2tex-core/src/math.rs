//! Math conversion through an external command
//!
//! Every `$...$` span is handed, one at a time and in source order, to a
//! [`MathConverter`]. Spans are the math regions of the mode-aware scanner,
//! the same ones the emphasis pass skips: an escaped `\$` opens nothing and
//! a `$` inside a `/* ... */` comment is comment text. A `$` that is never
//! closed is left alone. The default converter writes the span to a scoped
//! temporary file and runs `pandoc -f typst -t latex <file>` with a timeout.
//!
//! A failed span is never fatal: the converter's error becomes a
//! [`MathOutcome::Degraded`] carrying the original text, a warning is
//! logged, and the span is left as it was.

use std::io::{self, Read, Write};
use std::process::{Command, ExitStatus, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};
use typ_markup::{Mode, regions};

/// Default time a single span may take
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Interval between checks on a running converter process
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Errors from a single math conversion
#[derive(Debug, Error)]
pub enum DelegateError {
    #[error("Failed to write math span to a temporary file: {0}")]
    TempFile(#[source] io::Error),

    #[error("Failed to run `{command}`: {source}")]
    Spawn { command: String, source: io::Error },

    #[error("Failed while waiting for `{command}`: {source}")]
    Wait { command: String, source: io::Error },

    #[error("`{command}` timed out after {timeout:?}")]
    Timeout { command: String, timeout: Duration },

    #[error("`{command}` failed ({status}): {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("`{command}` produced invalid UTF-8 output")]
    InvalidOutput { command: String },
}

/// Converts one math span to LaTeX
pub trait MathConverter {
    /// Convert the span, delimiters included
    fn convert(&self, span: &str) -> Result<String, DelegateError>;
}

impl<F> MathConverter for F
where
    F: Fn(&str) -> Result<String, DelegateError>,
{
    fn convert(&self, span: &str) -> Result<String, DelegateError> {
        self(span)
    }
}

/// Runs an external command on a temporary file holding the span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandConverter {
    /// Program to run (e.g. "pandoc")
    pub command: String,
    /// Arguments placed before the input file path
    pub args: Vec<String>,
    /// Time after which the process is killed
    pub timeout: Duration,
}

impl Default for CommandConverter {
    fn default() -> Self {
        Self {
            command: "pandoc".to_string(),
            args: ["-f", "typst", "-t", "latex"]
                .into_iter()
                .map(String::from)
                .collect(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl CommandConverter {
    /// Create a converter for `command` with no arguments
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl MathConverter for CommandConverter {
    fn convert(&self, span: &str) -> Result<String, DelegateError> {
        let mut file = tempfile::Builder::new()
            .prefix("typ2tex-math-")
            .suffix(".typ")
            .tempfile()
            .map_err(DelegateError::TempFile)?;
        file.write_all(span.as_bytes())
            .and_then(|()| file.flush())
            .map_err(DelegateError::TempFile)?;

        // Close our handle so the converter can open the file on every
        // platform; the path is still removed when `input` drops.
        let input = file.into_temp_path();

        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .arg(&*input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = execute_with_timeout(&mut cmd, &self.command, self.timeout)?;

        if !output.status.success() {
            return Err(DelegateError::Failed {
                command: self.command.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|_| DelegateError::InvalidOutput {
            command: self.command.clone(),
        })?;

        Ok(stdout.trim_end_matches(['\r', '\n']).to_string())
    }
}

/// Run a command, killing it once `timeout` has elapsed
///
/// stdout and stderr are drained on background threads while the process
/// runs, so a converter writing more than a pipe buffer never stalls.
fn execute_with_timeout(
    cmd: &mut Command,
    command: &str,
    timeout: Duration,
) -> Result<Output, DelegateError> {
    let mut child = cmd.spawn().map_err(|source| DelegateError::Spawn {
        command: command.to_string(),
        source,
    })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let wait_error = |source| DelegateError::Wait {
        command: command.to_string(),
        source,
    };
    let start = Instant::now();

    // Poll for completion with timeout
    let status = loop {
        match child.try_wait().map_err(wait_error)? {
            Some(status) => break status,
            None if start.elapsed() > timeout => {
                // Reap the killed process so it does not linger as a zombie.
                // The drain threads are left to finish on their own, since a
                // grandchild may still hold the pipes open.
                let _ = child.kill();
                let _ = child.wait();
                return Err(DelegateError::Timeout {
                    command: command.to_string(),
                    timeout,
                });
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    Ok(Output {
        status,
        stdout: collect(stdout).map_err(wait_error)?,
        stderr: collect(stderr).map_err(wait_error)?,
    })
}

/// Read a child pipe to the end on its own thread
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn collect(handle: JoinHandle<io::Result<Vec<u8>>>) -> io::Result<Vec<u8>> {
    handle
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("pipe reader panicked")))
}

/// Result of converting one span
#[derive(Debug)]
pub enum MathOutcome {
    /// The converter's output
    Converted(String),
    /// The span could not be converted and is kept as written
    Degraded {
        original: String,
        error: DelegateError,
    },
}

impl MathOutcome {
    /// The text that replaces the span
    pub fn into_text(self) -> String {
        match self {
            MathOutcome::Converted(text) => text,
            MathOutcome::Degraded { original, .. } => original,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, MathOutcome::Degraded { .. })
    }
}

/// Convert a single span, keeping the original on failure
pub fn delegate_span(span: &str, converter: &dyn MathConverter) -> MathOutcome {
    match converter.convert(span) {
        Ok(text) => MathOutcome::Converted(text),
        Err(error) => MathOutcome::Degraded {
            original: span.to_string(),
            error,
        },
    }
}

/// Convert every `$...$` span in source order
pub fn convert_math(input: &str, converter: &dyn MathConverter) -> String {
    let mut output = String::with_capacity(input.len());
    let mut copied = 0;
    let mut converted = 0usize;
    let mut degraded = 0usize;

    // An unterminated region runs to the end of the input and is not math
    let spans = regions(input)
        .into_iter()
        .filter(|region| region.mode == Mode::Math && region.end < input.len());

    for region in spans {
        // Widen the interior by the one-byte `$` delimiters
        let (start, end) = (region.start - 1, region.end + 1);
        output.push_str(&input[copied..start]);

        match delegate_span(&input[start..end], converter) {
            MathOutcome::Converted(text) => {
                converted += 1;
                output.push_str(&text);
            }
            MathOutcome::Degraded { original, error } => {
                degraded += 1;
                warn!(span = %preview(&original), %error, "Math conversion failed, keeping original");
                output.push_str(&original);
            }
        }
        copied = end;
    }
    output.push_str(&input[copied..]);

    debug!(converted, degraded, "Math spans processed");
    output
}

/// First 100 characters of a span, for diagnostics
fn preview(span: &str) -> String {
    const LIMIT: usize = 100;
    let mut chars = span.chars();
    let head: String = chars.by_ref().take(LIMIT).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
