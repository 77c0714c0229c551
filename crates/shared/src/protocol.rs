use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{CanonicalKey, ParamValue};

/// One result row. The list layer never looks inside it.
pub type Record = serde_json::Value;

/// Flat canonical-key payload handed to a list action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListPayload(pub BTreeMap<CanonicalKey, ParamValue>);

impl ListPayload {
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(&CanonicalKey::from(key))
    }

    pub fn insert(&mut self, key: CanonicalKey, value: ParamValue) {
        self.0.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Query-string pairs in key order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub data: Vec<Record>,
    #[serde(default)]
    pub total: u64,
}
