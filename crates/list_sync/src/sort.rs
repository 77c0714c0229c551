//! Tri-state column sort expressed as filter values.

use shared::domain::{CanonicalKey, ParamValue, SortDirection};

/// Receives the direction to display for a sort column. The UI layer owns
/// the actual header elements.
pub trait SortIndicator: Send + Sync {
    fn render(&self, key: &CanonicalKey, direction: SortDirection);
}

pub struct NoopSortIndicator;

impl SortIndicator for NoopSortIndicator {
    fn render(&self, _key: &CanonicalKey, _direction: SortDirection) {}
}

pub fn direction_of(value: Option<&ParamValue>) -> SortDirection {
    SortDirection::from_code(value.and_then(ParamValue::as_text))
}

/// Advances a sort filter value one step and returns the new direction with
/// the value to store for it.
pub fn toggle(current: Option<&ParamValue>) -> (SortDirection, Option<ParamValue>) {
    let next = direction_of(current).next();
    (next, next.code().map(ParamValue::from))
}
