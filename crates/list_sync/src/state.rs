//! Value stores behind the list controller.

use shared::{
    domain::{CanonicalKey, DisplayKey, ParamValue},
    protocol::ListPayload,
};

/// Ordered key -> optional value map with a fixed key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamStore<K> {
    entries: Vec<(K, Option<ParamValue>)>,
}

/// Working values the user edits before committing, keyed by display name.
pub type FilterState = ParamStore<DisplayKey>;
/// Values mirrored to and from the route query, keyed by canonical name.
pub type QueryState = ParamStore<CanonicalKey>;

impl<K: AsRef<str>> ParamStore<K> {
    pub fn from_entries(entries: impl IntoIterator<Item = (K, Option<ParamValue>)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(name, _)| name.as_ref() == key)
            .and_then(|(_, value)| value.as_ref())
    }

    /// Returns whether the stored value changed. Unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: Option<ParamValue>) -> bool {
        let Some((_, slot)) = self.entries.iter_mut().find(|(name, _)| name.as_ref() == key) else {
            return false;
        };
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }

    pub fn clear(&mut self) {
        for (_, slot) in &mut self.entries {
            *slot = None;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, Option<&ParamValue>)> {
        self.entries.iter().map(|(key, value)| (key, value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Coerced, read-only view of the current route query. Built only from a
/// query through [`crate::keys::KeyRegistry::route_params`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteParams {
    values: ParamStore<CanonicalKey>,
}

impl RouteParams {
    pub(crate) fn from_entries(
        entries: impl IntoIterator<Item = (CanonicalKey, Option<ParamValue>)>,
    ) -> Self {
        Self {
            values: ParamStore::from_entries(entries),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalKey, Option<&ParamValue>)> {
        self.values.iter()
    }

    /// Fetch payload: every key with a coerced value, canonical-cased.
    pub fn to_payload(&self) -> ListPayload {
        let mut payload = ListPayload::default();
        for (key, value) in self.values.iter() {
            if let Some(value) = value {
                payload.insert(key.clone(), value.clone());
            }
        }
        payload
    }
}
