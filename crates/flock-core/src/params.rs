//! Deserialisers for query-string filters.
//!
//! HTML forms submit every field, so an unused filter arrives as
//! `?service_id=` rather than being left out. Filters declared with
//! `#[serde(default, deserialize_with = "crate::params::blank_as_none")]`
//! treat an empty value the same as an absent one.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, de::Error as _};

/// Parse a present, non-blank value with [`FromStr`]; blank means `None`.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: FromStr,
  T::Err: Display,
{
  let Some(raw) = Option::<String>::deserialize(deserializer)? else {
    return Ok(None);
  };
  let raw = raw.trim();
  if raw.is_empty() {
    return Ok(None);
  }
  raw.parse().map(Some).map_err(D::Error::custom)
}
