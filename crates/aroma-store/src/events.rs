//! Repository for activity [`Event`] records.
//!
//! Events are the one deliberately denormalized entity: ids, timestamp and
//! type live in real columns for querying, while the free-form detail is a
//! single JSON blob.  A corrupt blob degrades to an empty detail on read
//! rather than failing the row, so one bad record cannot break a feed query.

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use aroma_model::Event;

use crate::database::Database;
use crate::error::{self, Result};
use crate::serializer::{self, Serializer};
use crate::validation;

const REPOSITORY: &str = "events";
const ENTITY: &str = "event";

const INSERT_EVENT: &str = "INSERT INTO events \
     (event_id, actor_id, application_id, recipient_id, timestamp, event_type, detail) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

const EVENT_COLUMNS: &str =
    "event_id, actor_id, application_id, recipient_id, timestamp, event_type, detail";

/// Maps an [`Event`] to and from its row shape.
pub struct EventSerializer;

impl Serializer for EventSerializer {
    type Entity = Event;

    fn save(
        &self,
        event: &Event,
        _ttl: Option<chrono::Duration>,
        sql: &str,
        conn: &Connection,
    ) -> Result<()> {
        validation::require_event(event)?;

        let detail = serializer::encode_json(&event.detail)
            .map_err(error::op(REPOSITORY, "save", &event.event_id))?;

        conn.execute(
            sql,
            params![
                event.event_id.to_string(),
                event.actor_id.to_string(),
                event.application_id.to_string(),
                event.recipient_id.to_string(),
                serializer::format_timestamp(&event.timestamp),
                event.event_type.map(|t| t.to_string()),
                detail,
            ],
        )
        .map_err(error::op(REPOSITORY, "save", &event.event_id))?;
        Ok(())
    }

    fn deserialize(&self, row: &Row<'_>) -> rusqlite::Result<Event> {
        Ok(Event {
            event_id: serializer::parse_uuid(0, &row.get::<_, String>(0)?)?,
            actor_id: serializer::parse_uuid(1, &row.get::<_, String>(1)?)?,
            application_id: serializer::parse_uuid(2, &row.get::<_, String>(2)?)?,
            recipient_id: serializer::parse_uuid(3, &row.get::<_, String>(3)?)?,
            timestamp: serializer::parse_timestamp(4, &row.get::<_, String>(4)?)?,
            event_type: serializer::parse_enum_lenient("event_type", row.get(5)?),
            detail: serializer::parse_json_lenient("detail", &row.get::<_, String>(6)?),
        })
    }
}

impl Database {
    /// Insert a new event into its recipient's feed.  Re-saving an existing
    /// event id is a conflict.
    pub fn save_event(&self, event: &Event) -> Result<()> {
        validation::require_event(event)?;
        EventSerializer.save(event, None, INSERT_EVENT, self.conn())
    }

    /// Fetch a single event by id.
    pub fn get_event(&self, event_id: Uuid) -> Result<Event> {
        validation::require_id("event id", event_id)?;
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = ?1");
        self.conn()
            .query_row(&sql, params![event_id.to_string()], |row| {
                EventSerializer.deserialize(row)
            })
            .map_err(|e| {
                error::single_row(
                    REPOSITORY,
                    "get_event",
                    &event_id,
                    error::does_not_exist(ENTITY),
                    e,
                )
            })
    }

    /// A user's activity feed, newest first.  An empty feed is an empty
    /// list, never an error.
    pub fn get_all_events_for(&self, recipient_id: Uuid) -> Result<Vec<Event>> {
        validation::require_id("recipient id", recipient_id)?;
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE recipient_id = ?1 ORDER BY timestamp DESC"
        );
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(error::op(REPOSITORY, "get_all_events_for", &recipient_id))?;

        let rows = stmt
            .query_map(params![recipient_id.to_string()], |row| {
                EventSerializer.deserialize(row)
            })
            .map_err(error::op(REPOSITORY, "get_all_events_for", &recipient_id))?;

        let mut events = Vec::new();
        for row in rows {
            events.push(row.map_err(error::op(REPOSITORY, "get_all_events_for", &recipient_id))?);
        }
        Ok(events)
    }

    /// Delete a single event.  Idempotent.
    pub fn delete_event(&self, event_id: Uuid) -> Result<bool> {
        validation::require_id("event id", event_id)?;
        let affected = self
            .conn()
            .execute(
                "DELETE FROM events WHERE event_id = ?1",
                params![event_id.to_string()],
            )
            .map_err(error::op(REPOSITORY, "delete_event", &event_id))?;
        Ok(affected > 0)
    }

    /// Clear a user's entire feed.  Returns how many events were removed.
    pub fn delete_all_events_for(&self, recipient_id: Uuid) -> Result<usize> {
        validation::require_id("recipient id", recipient_id)?;
        self.conn()
            .execute(
                "DELETE FROM events WHERE recipient_id = ?1",
                params![recipient_id.to_string()],
            )
            .map_err(error::op(REPOSITORY, "delete_all_events_for", &recipient_id))
    }
}
