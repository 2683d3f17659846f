//! Configuration trees, loading and provenance.

mod builder;
mod duration;
mod error;
mod file;
mod origin;
pub mod path;
mod resolve;
mod system;
mod tree;

pub use builder::ConfigBuilder;
pub use error::ConfigError;
pub use origin::{Origin, UNKNOWN_ORIGIN};
pub use system::{system_environment, system_properties};
pub use tree::{Config, PathKind};
