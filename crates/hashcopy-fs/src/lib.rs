//! Filesystem primitives for hashcopy
//!
//! Provides forward-slash path handling, timestamp-preserving copies and
//! atomic writes used by the publishing engine.

pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::NormalizedPath;
