//! Named-flag lookup port.
//!
//! `debug` emissions are gated on a named condition, by default an
//! environment variable. The lookup is evaluated on every call, never cached.

use std::collections::HashSet;

/// Port for checking whether a named debug flag is switched on.
#[cfg_attr(any(test, feature = "test-utils"), mockall::automock)]
pub trait FlagSource: Send + Sync {
    /// Returns `true` if `flag` is currently set.
    fn is_set(&self, flag: &str) -> bool;
}

/// Flags backed by the process environment.
///
/// A flag is set when the variable exists and is non-empty, so
/// `MY_DEBUG=` counts as off while `MY_DEBUG=0` counts as on.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvFlags;

impl FlagSource for EnvFlags {
    fn is_set(&self, flag: &str) -> bool {
        std::env::var_os(flag).is_some_and(|value| !value.is_empty())
    }
}

/// A fixed set of switched-on flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticFlags {
    enabled: HashSet<String>,
}

impl StaticFlags {
    /// Create an empty set (every flag off).
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch a flag on.
    pub fn with(mut self, flag: impl Into<String>) -> Self {
        self.enabled.insert(flag.into());
        self
    }
}

impl<S: Into<String>> FromIterator<S> for StaticFlags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            enabled: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl FlagSource for StaticFlags {
    fn is_set(&self, flag: &str) -> bool {
        self.enabled.contains(flag)
    }
}
