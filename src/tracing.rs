//! Program-wide logging setup.
//!
//! The binary calls [`init_journald_or_stdout`] once at startup to install a
//! tracing subscriber. Library code uses `crate::tracing::prelude::*` for
//! convenient access to the `trace!()` through `error!()` macros.

use std::fmt;

use time::OffsetDateTime;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    fmt::{format::Writer as FmtWriter, time::FormatTime},
    prelude::*,
};

#[cfg(target_os = "linux")]
use std::{env, io, os::unix::io::AsRawFd};

#[cfg(target_os = "linux")]
use nix::libc;

pub mod prelude {
    #[allow(unused_imports)]
    pub use tracing::{debug, error, info, trace, warn};
}

use prelude::*;

/// Check if stderr is connected to the systemd journal by validating
/// JOURNAL_STREAM.
///
/// Per systemd documentation, programs should parse the device and inode
/// numbers from JOURNAL_STREAM and compare them against stderr's file
/// descriptor to detect I/O redirection and ensure the connection is
/// genuine.
#[cfg(target_os = "linux")]
fn stderr_is_journal_stream() -> bool {
    let journal_stream = match env::var("JOURNAL_STREAM") {
        Ok(val) => val,
        Err(_) => return false,
    };

    // Parse "device:inode" format
    let mut parts = journal_stream.split(':');
    let (expected_dev, expected_ino) = match (parts.next(), parts.next(), parts.next()) {
        (Some(dev), Some(ino), None) => {
            match (dev.parse::<u64>(), ino.parse::<u64>()) {
                (Ok(dev), Ok(ino)) => (dev, ino),
                _ => return false,
            }
        }
        _ => return false,
    };

    // Get actual device and inode from stderr
    let stderr = io::stderr();
    let fd = stderr.as_raw_fd();

    let mut stat: libc::stat = unsafe { std::mem::zeroed() };
    if unsafe { libc::fstat(fd, &mut stat) } != 0 {
        return false;
    }

    stat.st_dev == expected_dev && stat.st_ino == expected_ino
}

/// Initialize logging.
///
/// If running under systemd, use journald; otherwise fall back to stdout.
pub fn init_journald_or_stdout() {
    #[cfg(target_os = "linux")]
    {
        if stderr_is_journal_stream() {
            if let Ok(layer) = tracing_journald::layer() {
                tracing_subscriber::registry().with(layer).init();
                return;
            } else {
                error!("Failed to initialize journald logging, using stdout.");
            }
        }
    }

    use_stdout();
}

// Log to stdout, filtering according to environment variable RUST_LOG,
// overriding the default level (ERROR) to INFO.
fn use_stdout() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("RUST_LOG")
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(LocalTimer)
                .with_target(true),
        )
        .init();
}

// Provide our own timer that formats timestamps in local time and to the
// nearest second. The default timer is in UTC and formats timestamps as a
// long string.
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut FmtWriter<'_>) -> fmt::Result {
        let now = OffsetDateTime::now_local().unwrap_or(OffsetDateTime::now_utc());
        let ts = now
            .format(time::macros::format_description!(
                "[hour]:[minute]:[second]"
            ))
            .map_err(|_| fmt::Error)?;
        write!(w, "{ts}")
    }
}
