//! Internal constants for diagram verification.

use std::time::Duration;

/// Default timeout for a single external render (10 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default renderer executable.
pub const DEFAULT_RENDERER: &str = "mmdc";

/// Interval between child process status polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Number of leading non-empty lines searched for a dialect header.
pub const HEADER_SCAN_LINES: usize = 3;

/// Read size for renderer stderr.
pub const STDERR_CHUNK_SIZE: usize = 4096;
