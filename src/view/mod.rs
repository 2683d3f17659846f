//! Derived views over a config: path algebra, summaries, diffs.

mod diff;
mod obscure;
mod paths;
mod summary;

pub use diff::Difference;
pub use obscure::{obscure_secrets, Obscure, OBSCURED};
pub use summary::{StringEntry, SHOW_KEY};
