//! Paths into the nested state tree.
//!
//! A path is an ordered sequence of object keys and array indices. The last
//! segment doubles as the registration key when a logic's reducer is mounted
//! into the root reducer.

use serde_json::Value;

/// One step into the state tree: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathPart {
    Key(String),
    Index(usize),
}

impl From<&str> for PathPart {
    fn from(key: &str) -> Self {
        PathPart::Key(key.to_string())
    }
}

impl From<String> for PathPart {
    fn from(key: String) -> Self {
        PathPart::Key(key)
    }
}

impl From<usize> for PathPart {
    fn from(index: usize) -> Self {
        PathPart::Index(index)
    }
}

pub type Path = Vec<PathPart>;

/// Build a [`Path`] from anything convertible to path parts.
pub fn path<I, T>(parts: I) -> Path
where
    I: IntoIterator<Item = T>,
    T: Into<PathPart>,
{
    parts.into_iter().map(Into::into).collect()
}

/// Walk `state` through each segment of `path`, starting from `state` itself.
///
/// Returns `None` as soon as an intermediate segment does not exist. That
/// case is deliberately not reported here; propagation is the caller's
/// responsibility.
pub fn resolve<'a>(path: &[PathPart], state: &'a Value) -> Option<&'a Value> {
    path.iter().try_fold(state, |value, part| match part {
        PathPart::Key(key) => value.get(key.as_str()),
        PathPart::Index(index) => value.get(*index),
    })
}
