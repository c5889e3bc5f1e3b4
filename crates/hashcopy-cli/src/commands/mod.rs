//! Command implementations

pub mod lookup;
pub mod publish;

pub use lookup::run_lookup;
pub use publish::{PublishRequest, run_build, run_publish};
