#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::uninlined_format_args)]

//! Account and follow-graph synchronization for nostr clients.
//!
//! Build a [`Globals`] over a [`Storage`] and your relay client (an
//! implementation of [`ProfileDataSource`] and [`FileUploader`]), then use
//! the repositories and controllers on top of it.

pub mod accounts;
pub mod error;
pub mod follows;
pub mod globals;
pub mod metadata;
pub mod names;
pub mod notifications;
pub mod repository;
mod scope;
pub mod settings;
pub mod source;
pub mod storage;

#[cfg(test)]
mod testing;

pub use error::{Error, ErrorKind, FailureKind};
pub use globals::Globals;
pub use source::{FileUploader, ProfileDataSource};
pub use storage::Storage;

use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Install a fmt subscriber for `tracing`, filtered by `RUST_LOG` (default
/// `info`). File and line are shown in debug builds or when debug logging is
/// on.
pub fn setup_logging() -> Result<(), Error> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::new("info"),
    };
    let max_level = match env_filter.max_level_hint() {
        Some(l) => l,
        None => LevelFilter::ERROR,
    };
    let show_debug = cfg!(debug_assertions) || max_level >= LevelFilter::DEBUG;
    tracing_subscriber::fmt::fmt()
        .with_target(false)
        .with_file(show_debug)
        .with_line_number(show_debug)
        .with_env_filter(env_filter)
        .try_init()
        .map_err(|e| Error::from(format!("Logging setup failed: {}", e)))
}
