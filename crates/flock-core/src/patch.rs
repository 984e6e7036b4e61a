//! Helpers for partial-update ("patch") payloads.
//!
//! A patch field of type `Option<T>` means "replace if present". Nullable
//! columns need a third state, so they use `Option<Option<T>>`:
//!
//! | JSON            | Rust                | Effect        |
//! |-----------------|---------------------|---------------|
//! | field absent    | `None`              | keep          |
//! | `"field": null` | `Some(None)`        | clear         |
//! | `"field": "x"`  | `Some(Some("x"))`   | replace       |
//!
//! Serde collapses absent and `null` into `None` for a plain `Option`, so
//! nullable fields must be declared with
//! `#[serde(default, deserialize_with = "crate::patch::nullable")]`.

use serde::{Deserialize, Deserializer};

/// Deserialise a present field (even `null`) as `Some(inner)`.
pub fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(deserializer).map(Some)
}

/// Collapse an empty or whitespace-only string to `None`. Optional text
/// columns store `NULL` rather than `""`.
pub fn non_blank(value: Option<String>) -> Option<String> {
  value.filter(|s| !s.trim().is_empty())
}

/// Overwrite `slot` with `value` if the patch supplied one.
pub(crate) fn merge<T>(slot: &mut T, value: Option<T>) {
  if let Some(v) = value {
    *slot = v;
  }
}
