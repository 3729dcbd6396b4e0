use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Scalar route parameter. Comparisons between parameters go through
/// [`ParamValue::as_param_string`], so `Number(42)` and `Text("42")` are equal
/// for tab matching purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl ParamValue {
    pub fn as_param_string(&self) -> String {
        match self {
            Self::Bool(value) => value.to_string(),
            Self::Number(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }

    pub fn param_eq(&self, other: &Self) -> bool {
        self.as_param_string() == other.as_param_string()
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_param_string())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(Self::Number)
            .unwrap_or_else(|_| Self::Text(value.to_string()))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteParams(BTreeMap<String, ParamValue>);

impl RouteParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    /// String form of a parameter; empty strings are treated as absent.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.0
            .get(key)
            .map(ParamValue::as_param_string)
            .filter(|value| !value.is_empty())
    }

    pub fn parse<T>(&self, key: &str) -> Result<Option<T>, CoreError>
    where
        T: std::str::FromStr,
        T::Err: fmt::Display,
    {
        let Some(raw) = self.get_string(key) else {
            return Ok(None);
        };
        raw.parse::<T>()
            .map(Some)
            .map_err(|error| CoreError::InvalidRouteParam {
                key: key.to_owned(),
                reason: format!("'{raw}': {error}"),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every key of `other` is present here with a string-equal
    /// value. Keys only present in `self` are ignored.
    pub fn covers(&self, other: &RouteParams) -> bool {
        other.iter().all(|(key, value)| {
            self.get(key)
                .is_some_and(|existing| existing.param_eq(value))
        })
    }
}

impl<K, V> FromIterator<(K, V)> for RouteParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
