//! Folding override fragments over a base config.

use tracing::debug;

use crate::config::Config;

/// Merges override fragments over `base`.
///
/// A left fold of `fragments ++ [base]` with [`Config::with_fallback`]: for
/// every path the value comes from the first source that defines it, so the
/// first fragment wins over later fragments and all of them win over `base`.
/// With no fragments the result equals `base`.
///
/// Any grouping of the fold gives the same result as long as the sources
/// agree on which keys hold objects. When one source has a scalar where
/// another has an object, the left-to-right order used here is the
/// reference.
pub fn merge(base: &Config, fragments: &[Config]) -> Config {
    debug!(fragments = fragments.len(), "merging overrides over base config");
    fragments
        .iter()
        .chain(std::iter::once(base))
        .fold(Config::empty(), |merged, next| merged.with_fallback(next))
}
