// ABOUTME: SSH client configuration editing for sshmint.
// ABOUTME: Lossless ssh_config parsing plus Host block upserts keyed by first pattern.

//! # sshmint-config
//!
//! Reads an `ssh_config` file into a [`Config`] that remembers the exact
//! text of every line, replaces or appends one `Host` block, and writes the
//! document back. Lines that were not touched come out byte-identical.
//!
//! ```no_run
//! use sshmint_config::{add_or_replace, generate_host, load_config, save_config};
//! use std::path::Path;
//!
//! let path = Path::new("/home/me/.ssh/config");
//! let mut config = load_config(path).expect("config should load");
//! add_or_replace(
//!     &mut config,
//!     generate_host("example", "example.com", Path::new("/home/me/.ssh/example")),
//! );
//! save_config(path, &config).expect("config should save");
//! ```

mod error;
mod io;
mod merge;
mod model;
mod parse;

pub use error::{ConfigError, Result};
pub use io::{load_config, save_config, update_host_in_config};
pub use merge::{add_or_replace, generate_host, ATTRIBUTION};
pub use model::{BlockKind, Comment, Config, Empty, Host, KeyValue, Node};
