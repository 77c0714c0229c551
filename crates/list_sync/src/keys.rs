//! Tracked keys of one list view: display/canonical naming and per-key coercion.

use std::{fmt, sync::Arc};

use shared::domain::{parse_leading_int, CanonicalKey, DisplayKey, ParamValue, Query};
use tracing::warn;

use crate::state::RouteParams;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PER_PAGE: i64 = 20;

const SORT_KEY_MARKER: &str = "sort_";

/// camelCase display name to the snake_case name used in the query string.
pub fn canonical_name(display: &str) -> String {
    let mut canonical = String::with_capacity(display.len() + 4);
    for ch in display.chars() {
        if ch.is_ascii_uppercase() {
            canonical.push('_');
            canonical.push(ch.to_ascii_lowercase());
        } else {
            canonical.push(ch);
        }
    }
    canonical
}

pub type CoerceFn = Arc<dyn Fn(Option<&str>) -> Option<ParamValue> + Send + Sync>;

#[derive(Clone, Default)]
pub enum Coercion {
    #[default]
    Identity,
    /// Leading-digit integer parse; absent, empty or non-numeric input yields `default`.
    Integer { default: i64 },
    Custom(CoerceFn),
}

impl Coercion {
    pub fn custom(
        coerce: impl Fn(Option<&str>) -> Option<ParamValue> + Send + Sync + 'static,
    ) -> Self {
        Self::Custom(Arc::new(coerce))
    }

    pub fn apply(&self, raw: Option<&str>) -> Option<ParamValue> {
        match self {
            Self::Identity => raw.map(ParamValue::from),
            Self::Integer { default } => Some(ParamValue::Int(
                raw.filter(|value| !value.is_empty())
                    .and_then(parse_leading_int)
                    .unwrap_or(*default),
            )),
            Self::Custom(coerce) => coerce(raw),
        }
    }

    /// Same as [`Coercion::apply`] for a value already held in state. Falsy
    /// values are treated as absent.
    pub fn apply_value(&self, value: Option<&ParamValue>) -> Option<ParamValue> {
        let raw = value
            .filter(|value| value.is_truthy())
            .map(ToString::to_string);
        self.apply(raw.as_deref())
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::Integer { default } => f.debug_struct("Integer").field("default", default).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrackedKey {
    pub display: DisplayKey,
    pub canonical: CanonicalKey,
    pub coercion: Coercion,
}

impl TrackedKey {
    fn new(display: &str, coercion: Coercion) -> Self {
        Self {
            display: DisplayKey::from(display),
            canonical: CanonicalKey(canonical_name(display)),
            coercion,
        }
    }

    fn matches(&self, key: &str) -> bool {
        self.display.as_str() == key || self.canonical.as_str() == key
    }

    pub fn is_sort_key(&self) -> bool {
        self.canonical.as_str().contains(SORT_KEY_MARKER)
    }
}

/// Ordered key set: page, per-page, then the caller's filter keys.
///
/// Display and canonical names are one-to-one within a registry; an extra key
/// whose canonical name is already taken is dropped.
#[derive(Debug, Clone)]
pub struct KeyRegistry {
    keys: Vec<TrackedKey>,
}

impl KeyRegistry {
    pub fn new<S: AsRef<str>>(page_key: &str, per_page_key: &str, filter_keys: &[S]) -> Self {
        let mut keys = vec![
            TrackedKey::new(page_key, Coercion::Integer { default: DEFAULT_PAGE }),
            TrackedKey::new(
                per_page_key,
                Coercion::Integer {
                    default: DEFAULT_PER_PAGE,
                },
            ),
        ];

        for filter_key in filter_keys {
            let candidate = TrackedKey::new(filter_key.as_ref(), Coercion::Identity);
            if keys.iter().any(|key| key.canonical == candidate.canonical) {
                warn!(
                    key = filter_key.as_ref(),
                    canonical = candidate.canonical.as_str(),
                    "keys: dropping filter key with duplicate canonical name"
                );
                continue;
            }
            keys.push(candidate);
        }

        Self { keys }
    }

    /// Attaches a custom coercion to a filter key. Page and per-page keep
    /// their integer coercions.
    pub fn with_coercion(mut self, key: &str, coercion: Coercion) -> Self {
        match self.keys.iter().position(|tracked| tracked.matches(key)) {
            Some(index) if index < 2 => {
                warn!(key, "keys: pagination coercions cannot be replaced");
            }
            Some(index) => self.keys[index].coercion = coercion,
            None => warn!(key, "keys: coercion registered for untracked key"),
        }
        self
    }

    pub fn keys(&self) -> &[TrackedKey] {
        &self.keys
    }

    pub fn page(&self) -> &TrackedKey {
        &self.keys[0]
    }

    pub fn per_page(&self) -> &TrackedKey {
        &self.keys[1]
    }

    pub fn is_pagination(&self, key: &TrackedKey) -> bool {
        key.canonical == self.page().canonical || key.canonical == self.per_page().canonical
    }

    /// Finds a key by either its display or canonical name.
    pub fn lookup(&self, key: &str) -> Option<&TrackedKey> {
        self.keys
            .iter()
            .find(|tracked| tracked.display.as_str() == key)
            .or_else(|| self.keys.iter().find(|tracked| tracked.canonical.as_str() == key))
    }

    pub fn sort_keys(&self) -> impl Iterator<Item = &TrackedKey> {
        self.keys.iter().filter(|key| key.is_sort_key())
    }

    /// Coerced view of `query`, one entry per tracked key.
    pub fn route_params(&self, query: &Query) -> RouteParams {
        RouteParams::from_entries(self.keys.iter().map(|key| {
            let raw = query.get(key.canonical.as_str()).map(String::as_str);
            (key.canonical.clone(), key.coercion.apply(raw))
        }))
    }
}

#[cfg(test)]
#[path = "tests/keys_tests.rs"]
mod tests;
