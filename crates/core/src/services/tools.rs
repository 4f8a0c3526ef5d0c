//! Collaborator traits for the external forensic tools, plus a bounded
//! process runner shared by the production adapters.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::debug;

use crate::model::Entry;

/// Failure of an external collaborator.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to spawn {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}: {stderr}")]
    Failed { tool: String, status: String, stderr: String },
    #[error("{tool} timed out after {timeout_secs}s")]
    Timeout { tool: String, timeout_secs: u64 },
    #[error("I/O error while talking to {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    /// The collaborator has nothing for the requested location.
    #[error("no content available for {0}")]
    NotFound(String),
}

/// Enumerates recoverable entries of an image.
pub trait EntryLister: Send + Sync {
    /// List present (`deleted == false`) or deleted entries. An empty listing is not an error.
    fn list_entries(&self, image: &Path, deleted: bool) -> Result<Vec<Entry>, ToolError>;
}

/// Retrieves the raw bytes of one entry.
pub trait ContentFetcher: Send + Sync {
    fn fetch(&self, image: &Path, location: &str) -> Result<Vec<u8>, ToolError>;
}

/// Reports file-system type and free-text details for an image.
pub trait FilesystemProbe: Send + Sync {
    fn probe_type(&self, image: &Path) -> Result<String, ToolError>;
    fn probe_details(&self, image: &Path) -> Result<String, ToolError>;
}

/// Produces a best-guess type label (in the style of `file -b`) for a byte buffer.
pub trait TypeSniffer: Send + Sync {
    fn sniff(&self, bytes: &[u8]) -> Result<String, ToolError>;
    fn name(&self) -> &'static str;
}

/// Run an external tool to completion, bounded by `timeout`, and return its stdout.
///
/// When `stdin` is given it is written on a helper thread; a child that closes
/// its input early (as `file` does) is not an error.
pub fn run_tool(
    program: &Path,
    args: &[&str],
    stdin: Option<&[u8]>,
    timeout: Duration,
) -> Result<Vec<u8>, ToolError> {
    let tool = program.display().to_string();
    debug!(tool = %tool, ?args, "invoking external tool");

    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| ToolError::Spawn { tool: tool.clone(), source })?;

    let io_err = |source| ToolError::Io { tool: tool.clone(), source };

    let mut stdout = child.stdout.take().ok_or_else(|| io_err(missing_pipe("stdout")))?;
    let mut stderr = child.stderr.take().ok_or_else(|| io_err(missing_pipe("stderr")))?;
    let stdout_reader = thread::spawn(move || {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).map(|_| buf)
    });
    let stderr_reader = thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = stderr.read_to_end(&mut buf);
        buf
    });

    let stdin_writer = match (stdin, child.stdin.take()) {
        (Some(input), Some(mut pipe)) => {
            let input = input.to_vec();
            Some(thread::spawn(move || {
                // Broken pipes are expected when the tool stops reading early.
                let _ = pipe.write_all(&input);
            }))
        }
        _ => None,
    };

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait().map_err(io_err)? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ToolError::Timeout { tool, timeout_secs: timeout.as_secs() });
            }
            None => thread::sleep(Duration::from_millis(10)),
        }
    };

    if let Some(writer) = stdin_writer {
        let _ = writer.join();
    }
    let out = stdout_reader
        .join()
        .map_err(|_| io_err(missing_pipe("stdout reader panicked")))?
        .map_err(io_err)?;
    let err = stderr_reader.join().unwrap_or_default();

    if !status.success() {
        return Err(ToolError::Failed {
            tool,
            status: status.to_string(),
            stderr: String::from_utf8_lossy(&err).trim().to_string(),
        });
    }
    Ok(out)
}

fn missing_pipe(what: &str) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::BrokenPipe, what.to_string())
}
