//! # aroma-store
//!
//! Data-access layer for the Aroma notification platform, backed by SQLite.
//!
//! The crate exposes a synchronous [`Database`] handle wrapping a
//! `rusqlite::Connection`, with one repository module per domain entity.
//! Every repository follows the same discipline: validate input before any
//! I/O, translate entities through a [`Serializer`], and normalize failures
//! into the small [`StoreError`] taxonomy (invalid argument, entity-specific
//! not-found, generic operation failure).

pub mod applications;
pub mod credentials;
pub mod database;
pub mod devices;
pub mod events;
pub mod followers;
pub mod media;
pub mod messages;
pub mod migrations;
pub mod organizations;
pub mod reactions;
pub mod serializer;
pub mod tokens;
pub mod users;

mod error;
mod validation;

pub use database::Database;
pub use error::{Result, StoreError};
pub use serializer::Serializer;
