//! Timestamp-derived record ids and their generator.

use crate::{IdError, IdResult};
use chrono::{DateTime, Utc};
use std::{fmt, str::FromStr};

/// A timestamp-derived record identifier (milliseconds since the Unix epoch).
///
/// Displayed and serialised as a decimal string, which is the form stored in every
/// record's `id` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(i64);

impl RecordId {
    /// Wraps a raw millisecond value.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] for negative values, which cannot come from the
    /// generator.
    pub fn from_millis(millis: i64) -> IdResult<Self> {
        if millis < 0 {
            return Err(IdError::InvalidInput(format!(
                "record id must not be negative, got: {millis}"
            )));
        }
        Ok(Self(millis))
    }

    /// Returns the raw millisecond value.
    pub fn millis(&self) -> i64 {
        self.0
    }

    /// Returns the creation instant encoded in this id.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }

    /// Returns true if `input` looks like a generated id (ASCII digits only).
    ///
    /// Purely syntactic; use [`RecordId::from_str`] to also check the numeric range.
    pub fn is_generated(input: &str) -> bool {
        !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !Self::is_generated(s) {
            return Err(IdError::InvalidInput(format!(
                "record id must be decimal digits only, got: '{s}'"
            )));
        }
        let millis = s
            .parse::<i64>()
            .map_err(|e| IdError::InvalidInput(format!("record id out of range '{s}': {e}")))?;
        Self::from_millis(millis)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Largest id a generator resumes after: 9999-12-31T23:59:59.999Z.
pub const MAX_RESUMABLE_MILLIS: i64 = 253_402_300_799_999;

/// Issues strictly increasing [`RecordId`]s.
///
/// The generator is owned by the store that assigns ids, so `&mut self` is enough to keep
/// issuance ordered; no internal locking is needed.
#[derive(Clone, Debug, Default)]
pub struct RecordIdGenerator {
    last: Option<i64>,
}

impl RecordIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator that will only issue ids greater than every generated id in `ids`.
    ///
    /// Ids that are not in generated form, or lie beyond [`MAX_RESUMABLE_MILLIS`], are skipped.
    pub fn resume_after<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let last = ids
            .into_iter()
            .filter_map(|id| id.parse::<RecordId>().ok())
            .map(|id| id.millis())
            .filter(|millis| *millis <= MAX_RESUMABLE_MILLIS)
            .max();
        Self { last }
    }

    /// Issues the next id using the current wall-clock time.
    pub fn next_id(&mut self) -> RecordId {
        self.next_at(Utc::now())
    }

    /// Issues the next id for the given instant.
    ///
    /// If `now` is not later than the previous id, the previous id plus one millisecond is
    /// used instead.
    pub fn next_at(&mut self, now: DateTime<Utc>) -> RecordId {
        let candidate = now.timestamp_millis().max(0);
        let millis = match self.last {
            Some(prev) if candidate <= prev => prev.saturating_add(1),
            _ => candidate,
        };
        self.last = Some(millis);
        RecordId(millis)
    }
}
