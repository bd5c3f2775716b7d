//! Cross-logic prop selection.
//!
//! [`select_props_from_logic`] picks named selectors out of several logic
//! containers (or raw selector maps) and combines them into one structured
//! selector, the shape a view layer consumes as its props.

use crate::logic::Logic;
use crate::selector::{create_structured_selector, Selector, SelectorMap};
use std::fmt;
use std::sync::Arc;
use tracing::error;

/// Where mapped selectors come from: a logic container or a raw selector map.
#[derive(Clone)]
pub enum SelectorSource {
    Logic(Arc<Logic>),
    Map(SelectorMap),
}

impl SelectorSource {
    fn selectors(&self) -> &SelectorMap {
        match self {
            SelectorSource::Logic(logic) => &logic.selectors,
            SelectorSource::Map(map) => map,
        }
    }

    /// The source's own root selector, when it has one.
    fn root(&self) -> Option<Selector> {
        match self {
            SelectorSource::Logic(logic) => logic.selector.clone(),
            SelectorSource::Map(_) => None,
        }
    }
}

impl fmt::Debug for SelectorSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectorSource::Logic(logic) => f.debug_tuple("Logic").field(&logic.path).finish(),
            SelectorSource::Map(map) => f
                .debug_tuple("Map")
                .field(&map.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

impl From<Arc<Logic>> for SelectorSource {
    fn from(logic: Arc<Logic>) -> Self {
        SelectorSource::Logic(logic)
    }
}

impl From<&Arc<Logic>> for SelectorSource {
    fn from(logic: &Arc<Logic>) -> Self {
        SelectorSource::Logic(Arc::clone(logic))
    }
}

impl From<SelectorMap> for SelectorSource {
    fn from(map: SelectorMap) -> Self {
        SelectorSource::Map(map)
    }
}

/// One element of the flat alternating mapping: a source followed by the
/// property names to pick from it.
#[derive(Debug, Clone)]
pub enum PropsMapEntry {
    Source(SelectorSource),
    Props(Vec<String>),
}

impl PropsMapEntry {
    pub fn source(source: impl Into<SelectorSource>) -> Self {
        PropsMapEntry::Source(source.into())
    }

    pub fn props<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PropsMapEntry::Props(names.into_iter().map(Into::into).collect())
    }
}

/// Build one structured selector out of named selectors picked from several
/// sources.
///
/// `mapping` alternates sources and property lists. A property may rename its
/// result key (`"from as to"`); `"*"` picks the source's root selector, or a
/// structured selector over its whole map when it has no root. Malformed
/// entries are reported and skipped; only an uneven mapping aborts the build
/// (returning `None`).
pub fn select_props_from_logic(mapping: &[PropsMapEntry]) -> Option<Selector> {
    if mapping.len() % 2 == 1 {
        error!(entries = mapping.len(), "uneven mapping given to select_props_from_logic");
        return None;
    }

    let mut picked = SelectorMap::new();

    for pair in mapping.chunks(2) {
        let (source, names) = match pair {
            [PropsMapEntry::Source(source), PropsMapEntry::Props(names)] => (source, names),
            _ => {
                error!(pair = ?pair, "mapping pair is not (source, props), skipping");
                continue;
            }
        };

        for query in names {
            let (from, to) = match query.split_once(" as ") {
                Some((from, to)) => (from, to),
                None => (query.as_str(), query.as_str()),
            };

            if from == "*" {
                let selector = match source.root() {
                    Some(root) => root,
                    None => create_structured_selector(source.selectors().clone()),
                };
                picked.insert(to.to_string(), selector);
            } else if let Some(selector) = source.selectors().get(from) {
                picked.insert(to.to_string(), Arc::clone(selector));
            } else {
                error!(source = ?source, selector = %query, "selector missing for logic");
            }
        }
    }

    Some(create_structured_selector(picked))
}
