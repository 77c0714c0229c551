use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

macro_rules! key_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

key_newtype!(DisplayKey);
key_newtype!(CanonicalKey);

/// Route query as the router stores it: every value is a string.
pub type Query = BTreeMap<String, String>;

/// A single tracked value, either still raw from the route or already coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Text(String),
}

impl ParamValue {
    /// Empty strings and zero count as unset.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Int(value) => *value != 0,
            Self::Text(value) => !value.is_empty(),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Text(value) => parse_leading_int(value),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Int(_) => None,
            Self::Text(value) => Some(value),
        }
    }

    /// Compares against a raw route value the way a string-typed route would:
    /// `Int(5)` matches `"5"` and `" 5"`, text matches only exactly.
    pub fn loosely_eq(&self, raw: &str) -> bool {
        match self {
            Self::Int(value) => raw.trim().parse::<i64>().ok() == Some(*value),
            Self::Text(value) => value == raw,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

pub fn is_truthy(value: Option<&ParamValue>) -> bool {
    value.is_some_and(ParamValue::is_truthy)
}

/// Parses the leading integer of `raw` (`"5abc"` -> 5), ignoring leading
/// whitespace. Returns `None` when no digits lead the string.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end].parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteLocation {
    pub name: String,
    #[serde(default)]
    pub query: Query,
}

impl RouteLocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: Query::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::Ascending,
            Self::Ascending => Self::Descending,
            Self::Descending => Self::None,
        }
    }

    /// Short code written into the query string; `None` leaves the key unset.
    pub fn code(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Ascending => Some("asc"),
            Self::Descending => Some("desc"),
        }
    }

    pub fn from_code(code: Option<&str>) -> Self {
        match code {
            Some("asc") => Self::Ascending,
            Some("desc") => Self::Descending,
            _ => Self::None,
        }
    }

    /// Value for an `aria-sort` style attribute.
    pub fn aria_label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_int_parsing_stops_at_first_non_digit() {
        assert_eq!(parse_leading_int("5"), Some(5));
        assert_eq!(parse_leading_int(" 12abc"), Some(12));
        assert_eq!(parse_leading_int("-3"), Some(-3));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn loose_equality_matches_string_typed_route_values() {
        assert!(ParamValue::Int(5).loosely_eq("5"));
        assert!(!ParamValue::Int(5).loosely_eq("6"));
        assert!(ParamValue::from("name").loosely_eq("name"));
        assert!(!ParamValue::from("5").loosely_eq(" 5"));
    }

    #[test]
    fn sort_direction_cycles_through_three_states() {
        let first = SortDirection::default();
        assert_eq!(first, SortDirection::None);
        assert_eq!(first.next(), SortDirection::Ascending);
        assert_eq!(first.next().next(), SortDirection::Descending);
        assert_eq!(first.next().next().next(), SortDirection::None);
        assert_eq!(SortDirection::from_code(Some("desc")).code(), Some("desc"));
        assert_eq!(SortDirection::from_code(Some("sideways")), SortDirection::None);
    }
}
