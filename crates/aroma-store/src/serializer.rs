//! The save/deserialize contract shared by every repository.
//!
//! A [`Serializer`] translates one entity type to and from its row shape.
//! The two halves follow different failure disciplines:
//!
//! - `save` is programmer-controlled input, so it fails loudly: it
//!   re-validates the entity, computes derived column values (enum text,
//!   JSON arrays, TTL-to-expiration) and issues exactly one parameterized
//!   write with the statement the caller supplies.
//! - `deserialize` reads rows that may predate the current schema or carry
//!   corrupt text, so it degrades gracefully: a bad enum or JSON blob
//!   becomes an unset/default field with a warning logged, and unparseable
//!   array elements are dropped.  A single corrupt column must never fail an
//!   otherwise-valid row.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Row};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::Result;

/// Typed mapping between an entity and its row representation.
///
/// Implementations do not choose the statement text; the caller passes it in,
/// so one serializer can in principle back different statement variants
/// against the same column list.
pub trait Serializer {
    type Entity;

    /// Validate the entity and write it as a single row using `sql`.
    ///
    /// `ttl`, when supplied, is converted to an absolute expiration
    /// timestamp at write time.  Entities without expiration semantics
    /// ignore it.
    fn save(
        &self,
        entity: &Self::Entity,
        ttl: Option<Duration>,
        sql: &str,
        conn: &Connection,
    ) -> Result<()>;

    /// Reconstruct an entity from a single result row.
    fn deserialize(&self, row: &Row<'_>) -> rusqlite::Result<Self::Entity>;
}

// ---------------------------------------------------------------------------
// Strict column decoding (identity and timestamp columns)
// ---------------------------------------------------------------------------

/// Parse a UUID column.  Identity columns were validated at write time, so a
/// malformed one is real corruption and fails the row.
pub(crate) fn parse_uuid(index: usize, text: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

pub(crate) fn parse_uuid_opt(index: usize, text: Option<String>) -> rusqlite::Result<Option<Uuid>> {
    text.map(|s| parse_uuid(index, &s)).transpose()
}

/// Parse an RFC 3339 timestamp column.
pub(crate) fn parse_timestamp(index: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

pub(crate) fn parse_timestamp_opt(
    index: usize,
    text: Option<String>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    text.map(|s| parse_timestamp(index, &s)).transpose()
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

/// Convert an optional TTL into the absolute expiration it implies.
pub(crate) fn expiration_from(base: DateTime<Utc>, ttl: Option<Duration>) -> Option<DateTime<Utc>> {
    ttl.map(|d| base + d)
}

// ---------------------------------------------------------------------------
// Lenient column decoding (enums, blobs, arrays)
// ---------------------------------------------------------------------------

/// Parse enum text leniently: unknown or null text yields `None` with a
/// diagnostic logged, never an error.
pub(crate) fn parse_enum_lenient<T>(column: &'static str, text: Option<String>) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let text = text?;
    match T::from_str(&text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(column, value = %text, error = %e, "unparseable enum text, leaving unset");
            None
        }
    }
}

/// Parse a JSON blob column leniently: a malformed blob degrades to the
/// type's default with a diagnostic logged.
pub(crate) fn parse_json_lenient<T>(column: &'static str, text: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(column, error = %e, "malformed JSON blob, using default");
            T::default()
        }
    }
}

/// Decode a JSON array of UUID strings, dropping elements that fail to parse.
pub(crate) fn decode_uuid_array(column: &'static str, text: &str) -> Vec<Uuid> {
    let raw: Vec<String> = parse_json_lenient(column, text);
    raw.iter()
        .filter_map(|s| match Uuid::parse_str(s) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!(column, value = %s, error = %e, "dropping unparseable id element");
                None
            }
        })
        .collect()
}

/// Decode a JSON array of enum text, dropping elements that fail to parse.
pub(crate) fn decode_enum_array<T>(column: &'static str, text: &str) -> Vec<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Vec<String> = parse_json_lenient(column, text);
    raw.iter()
        .filter_map(|s| match T::from_str(s) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(column, value = %s, error = %e, "dropping unparseable enum element");
                None
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Column encoding (write path: fail loudly)
// ---------------------------------------------------------------------------

/// Encode a value as a JSON column.  Failures surface as a conversion error
/// so the repository normalizes them like any other write failure.
pub(crate) fn encode_json<T: serde::Serialize>(value: &T) -> rusqlite::Result<String> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub(crate) fn encode_uuid_array(ids: &[Uuid]) -> rusqlite::Result<String> {
    let raw: Vec<String> = ids.iter().map(Uuid::to_string).collect();
    encode_json(&raw)
}

pub(crate) fn encode_enum_array<T: std::fmt::Display>(values: &[T]) -> rusqlite::Result<String> {
    let raw: Vec<String> = values.iter().map(T::to_string).collect();
    encode_json(&raw)
}
