//! Repository for [`Message`] records.
//!
//! Messages use a composite key (application id, message id); every
//! operation validates both halves before touching the store.  Saves may
//! carry a TTL, converted to an absolute expiration at write time.

use chrono::Duration;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use aroma_model::Message;

use crate::database::Database;
use crate::error::{self, Result};
use crate::serializer::{self, Serializer};
use crate::validation;

const REPOSITORY: &str = "messages";
const ENTITY: &str = "message";

const INSERT_MESSAGE: &str = "INSERT INTO messages \
     (application_id, message_id, title, body, urgency, time_created, time_received, \
      hostname, mac_address, device_name, time_of_expiration) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

const MESSAGE_COLUMNS: &str = "application_id, message_id, title, body, urgency, time_created, \
     time_received, hostname, mac_address, device_name, time_of_expiration";

/// Maps a [`Message`] to and from its row shape.
pub struct MessageSerializer;

impl Serializer for MessageSerializer {
    type Entity = Message;

    fn save(
        &self,
        message: &Message,
        ttl: Option<Duration>,
        sql: &str,
        conn: &Connection,
    ) -> Result<()> {
        validation::require_message(message)?;

        // An explicit TTL wins over whatever expiration the message carries.
        let expiration = serializer::expiration_from(message.time_received, ttl)
            .or(message.time_of_expiration);

        conn.execute(
            sql,
            params![
                message.application_id.to_string(),
                message.message_id.to_string(),
                message.title,
                message.body,
                message.urgency.map(|u| u.to_string()),
                serializer::format_timestamp(&message.time_created),
                serializer::format_timestamp(&message.time_received),
                message.hostname,
                message.mac_address,
                message.device_name,
                expiration.as_ref().map(serializer::format_timestamp),
            ],
        )
        .map_err(error::op(REPOSITORY, "save", &message.message_id))?;
        Ok(())
    }

    fn deserialize(&self, row: &Row<'_>) -> rusqlite::Result<Message> {
        Ok(Message {
            application_id: serializer::parse_uuid(0, &row.get::<_, String>(0)?)?,
            message_id: serializer::parse_uuid(1, &row.get::<_, String>(1)?)?,
            title: row.get(2)?,
            body: row.get(3)?,
            urgency: serializer::parse_enum_lenient("urgency", row.get(4)?),
            time_created: serializer::parse_timestamp(5, &row.get::<_, String>(5)?)?,
            time_received: serializer::parse_timestamp(6, &row.get::<_, String>(6)?)?,
            hostname: row.get(7)?,
            mac_address: row.get(8)?,
            device_name: row.get(9)?,
            time_of_expiration: serializer::parse_timestamp_opt(10, row.get(10)?)?,
        })
    }
}

impl Database {
    /// Insert a new message, optionally bounded by a TTL.
    pub fn save_message(&self, message: &Message, ttl: Option<Duration>) -> Result<()> {
        validation::require_message(message)?;
        MessageSerializer.save(message, ttl, INSERT_MESSAGE, self.conn())
    }

    /// Fetch a single message by its composite key.
    pub fn get_message(&self, application_id: Uuid, message_id: Uuid) -> Result<Message> {
        validation::require_message_key(application_id, message_id)?;
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE application_id = ?1 AND message_id = ?2"
        );
        self.conn()
            .query_row(
                &sql,
                params![application_id.to_string(), message_id.to_string()],
                |row| MessageSerializer.deserialize(row),
            )
            .map_err(|e| {
                error::single_row(
                    REPOSITORY,
                    "get_message",
                    &message_id,
                    error::does_not_exist(ENTITY),
                    e,
                )
            })
    }

    /// Whether a message with this composite key exists.
    pub fn contains_message(&self, application_id: Uuid, message_id: Uuid) -> Result<bool> {
        validation::require_message_key(application_id, message_id)?;
        let count: i64 = self
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM messages WHERE application_id = ?1 AND message_id = ?2",
                params![application_id.to_string(), message_id.to_string()],
                |row| row.get(0),
            )
            .map_err(error::op(REPOSITORY, "contains_message", &message_id))?;
        Ok(count > 0)
    }

    /// Delete a message.  Deleting a non-existent one is not an error.
    pub fn delete_message(&self, application_id: Uuid, message_id: Uuid) -> Result<bool> {
        validation::require_message_key(application_id, message_id)?;
        let affected = self
            .conn()
            .execute(
                "DELETE FROM messages WHERE application_id = ?1 AND message_id = ?2",
                params![application_id.to_string(), message_id.to_string()],
            )
            .map_err(error::op(REPOSITORY, "delete_message", &message_id))?;
        Ok(affected > 0)
    }

    /// All messages sent by an application, newest first.
    pub fn get_messages_for_application(&self, application_id: Uuid) -> Result<Vec<Message>> {
        validation::require_id("application id", application_id)?;
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE application_id = ?1 ORDER BY time_received DESC"
        );
        self.query_messages(&sql, params![application_id.to_string()], "get_messages_for_application")
    }

    /// All messages reported from a given hostname, newest first.
    pub fn get_messages_by_hostname(&self, hostname: &str) -> Result<Vec<Message>> {
        validation::require_text("hostname", hostname)?;
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE hostname = ?1 ORDER BY time_received DESC"
        );
        self.query_messages(&sql, params![hostname], "get_messages_by_hostname")
    }

    /// All messages with an exact title, newest first.
    pub fn get_messages_by_title(&self, title: &str) -> Result<Vec<Message>> {
        validation::require_text("title", title)?;
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM messages \
             WHERE title = ?1 ORDER BY time_received DESC"
        );
        self.query_messages(&sql, params![title], "get_messages_by_title")
    }

    /// How many messages an application has stored.
    pub fn count_messages_for_application(&self, application_id: Uuid) -> Result<i64> {
        validation::require_id("application id", application_id)?;
        self.conn()
            .query_row(
                "SELECT COUNT(*) FROM messages WHERE application_id = ?1",
                params![application_id.to_string()],
                |row| row.get(0),
            )
            .map_err(error::op(
                REPOSITORY,
                "count_messages_for_application",
                &application_id,
            ))
    }

    fn query_messages(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        operation: &'static str,
    ) -> Result<Vec<Message>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(sql)
            .map_err(error::op(REPOSITORY, operation, &"query"))?;

        let rows = stmt
            .query_map(params, |row| MessageSerializer.deserialize(row))
            .map_err(error::op(REPOSITORY, operation, &"query"))?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row.map_err(error::op(REPOSITORY, operation, &"query"))?);
        }
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use aroma_model::Urgency;
    use chrono::Utc;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn sample_message() -> Message {
        Message {
            application_id: Uuid::new_v4(),
            message_id: Uuid::new_v4(),
            title: "build failed".into(),
            body: "exit code 1".into(),
            urgency: Some(Urgency::High),
            time_created: Utc::now(),
            time_received: Utc::now(),
            hostname: "ci-01.internal".into(),
            mac_address: "aa:bb:cc:dd:ee:ff".into(),
            device_name: "runner".into(),
            time_of_expiration: None,
        }
    }

    #[test]
    fn save_and_get_round_trip() {
        let db = test_db();
        let message = sample_message();

        db.save_message(&message, None).unwrap();
        let fetched = db
            .get_message(message.application_id, message.message_id)
            .unwrap();
        assert_eq!(fetched, message);
    }

    #[test]
    fn ttl_is_stored_as_absolute_expiration() {
        let db = test_db();
        let message = sample_message();

        db.save_message(&message, Some(Duration::hours(1))).unwrap();
        let fetched = db
            .get_message(message.application_id, message.message_id)
            .unwrap();

        let expiration = fetched.time_of_expiration.expect("expiration should be set");
        assert_eq!(expiration, message.time_received + Duration::hours(1));
    }

    #[test]
    fn message_id_alone_is_not_enough() {
        // Same message id under a different application is a distinct row.
        let db = test_db();
        let message = sample_message();
        db.save_message(&message, None).unwrap();

        let err = db
            .get_message(Uuid::new_v4(), message.message_id)
            .unwrap_err();
        assert!(matches!(err, StoreError::DoesNotExist { entity: "message" }));
    }

    #[test]
    fn both_key_halves_are_validated() {
        let db = test_db();
        let err = db.get_message(Uuid::new_v4(), Uuid::nil()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));

        let err = db.get_message(Uuid::nil(), Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn untitled_message_is_rejected_before_io() {
        let db = test_db();
        let mut message = sample_message();
        message.title = String::new();

        let err = db.save_message(&message, None).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));

        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn corrupt_urgency_degrades_to_unset() {
        let db = test_db();
        let message = sample_message();
        db.save_message(&message, None).unwrap();

        db.conn()
            .execute(
                "UPDATE messages SET urgency = 'SHOUTING' WHERE message_id = ?1",
                params![message.message_id.to_string()],
            )
            .unwrap();

        let fetched = db
            .get_message(message.application_id, message.message_id)
            .unwrap();
        assert_eq!(fetched.urgency, None);
        assert_eq!(fetched.title, message.title);
    }

    #[test]
    fn secondary_key_queries() {
        let db = test_db();
        let app = Uuid::new_v4();

        let mut first = sample_message();
        first.application_id = app;
        first.hostname = "web-01".into();
        let mut second = sample_message();
        second.application_id = app;
        second.hostname = "web-01".into();
        second.title = "disk full".into();

        db.save_message(&first, None).unwrap();
        db.save_message(&second, None).unwrap();

        assert_eq!(db.get_messages_for_application(app).unwrap().len(), 2);
        assert_eq!(db.get_messages_by_hostname("web-01").unwrap().len(), 2);
        assert_eq!(db.get_messages_by_title("disk full").unwrap().len(), 1);
        assert_eq!(db.count_messages_for_application(app).unwrap(), 2);

        // No matches is an empty list, never an error.
        assert!(db.get_messages_by_hostname("unknown-host").unwrap().is_empty());
    }

    #[test]
    fn delete_is_idempotent() {
        let db = test_db();
        let message = sample_message();
        db.save_message(&message, None).unwrap();

        assert!(db
            .delete_message(message.application_id, message.message_id)
            .unwrap());
        assert!(!db
            .delete_message(message.application_id, message.message_id)
            .unwrap());
    }
}
