//! Believers, the members tracked by the register.

use std::{fmt, num::ParseIntError, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  patch::{merge, nullable},
  stats::AttendanceStats,
};

/// Store-assigned identifier of a [`Believer`].
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BelieverId(pub i64);

impl fmt::Display for BelieverId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl FromStr for BelieverId {
  type Err = ParseIntError;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> { s.parse().map(Self) }
}

/// A church member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Believer {
  pub id:          BelieverId,
  pub first_name:  String,
  pub last_name:   String,
  /// Unique across all believers when present.
  pub email:       Option<String>,
  pub phone:       Option<String>,
  pub address:     Option<String>,
  pub date_joined: NaiveDate,
  /// Inactive believers are hidden from listings and rankings but kept.
  pub is_active:   bool,
}

impl Believer {
  /// First and last name joined by a single space.
  pub fn full_name(&self) -> String {
    crate::stats::full_name(&self.first_name, &self.last_name)
  }
}

// ─── NewBeliever ─────────────────────────────────────────────────────────────

/// Input to [`crate::store::RecordStore::add_believer`].
///
/// A missing `date_joined` is filled in by the store with the current date.
/// New believers are always active.
#[derive(Debug, Clone, Default)]
pub struct NewBeliever {
  pub first_name:  String,
  pub last_name:   String,
  pub email:       Option<String>,
  pub phone:       Option<String>,
  pub address:     Option<String>,
  pub date_joined: Option<NaiveDate>,
}

impl NewBeliever {
  /// Convenience constructor with all optional fields unset.
  pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
    Self {
      first_name: first_name.into(),
      last_name: last_name.into(),
      ..Default::default()
    }
  }
}

// ─── BelieverPatch ───────────────────────────────────────────────────────────

/// Partial update of a [`Believer`]. Unset fields keep their current value;
/// see [`crate::patch`] for how nullable fields are cleared.
///
/// `date_joined` is fixed at registration and cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BelieverPatch {
  pub first_name: Option<String>,
  pub last_name:  Option<String>,
  #[serde(default, deserialize_with = "nullable")]
  pub email:      Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub phone:      Option<Option<String>>,
  #[serde(default, deserialize_with = "nullable")]
  pub address:    Option<Option<String>>,
  pub is_active:  Option<bool>,
}

impl BelieverPatch {
  /// Merge the supplied fields into `believer`.
  pub fn apply(self, believer: &mut Believer) {
    merge(&mut believer.first_name, self.first_name);
    merge(&mut believer.last_name, self.last_name);
    merge(&mut believer.email, self.email);
    merge(&mut believer.phone, self.phone);
    merge(&mut believer.address, self.address);
    merge(&mut believer.is_active, self.is_active);
  }

  pub fn is_empty(&self) -> bool { *self == Self::default() }
}

// ─── Detail view ─────────────────────────────────────────────────────────────

/// A believer enriched with their attendance statistics. Never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BelieverDetail {
  #[serde(flatten)]
  pub believer: Believer,
  pub stats:    AttendanceStats,
}
