use std::borrow::Borrow;
use std::fmt::Display;
use std::sync::Arc;

/// The name of a command category, used as the subscription key.
///
/// Equality is an exact string match with no normalization. The hash matches that of the
/// underlying `str`, so maps keyed by [`CommandType`] can be queried with a plain `&str`.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CommandType(Arc<str>);

impl Display for CommandType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Borrow<str> for CommandType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for CommandType {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for CommandType {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}
