//! Repository for the follower association.
//!
//! Pure (user id, application id) pairs with a follow timestamp, no other
//! payload.  Following twice is a no-op, and both directions of the
//! association can be listed.

use chrono::Utc;
use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{self, Result};
use crate::serializer;
use crate::validation;

const REPOSITORY: &str = "followers";

impl Database {
    /// Record that a user follows an application.  Idempotent.
    pub fn save_follower(&self, user_id: Uuid, application_id: Uuid) -> Result<()> {
        validation::require_id("user id", user_id)?;
        validation::require_id("application id", application_id)?;
        self.conn()
            .execute(
                "INSERT OR IGNORE INTO followers (user_id, application_id, time_of_follow) \
                 VALUES (?1, ?2, ?3)",
                params![
                    user_id.to_string(),
                    application_id.to_string(),
                    serializer::format_timestamp(&Utc::now()),
                ],
            )
            .map_err(error::op(REPOSITORY, "save_follower", &user_id))?;
        Ok(())
    }

    /// Whether this user follows this application.
    pub fn is_following(&self, user_id: Uuid, application_id: Uuid) -> Result<bool> {
        validation::require_id("user id", user_id)?;
        validation::require_id("application id", application_id)?;
        let count: i64 = self
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM followers WHERE user_id = ?1 AND application_id = ?2",
                params![user_id.to_string(), application_id.to_string()],
                |row| row.get(0),
            )
            .map_err(error::op(REPOSITORY, "is_following", &user_id))?;
        Ok(count > 0)
    }

    /// Ids of the applications a user follows.
    pub fn get_applications_followed_by(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        validation::require_id("user id", user_id)?;
        self.query_association(
            "SELECT application_id FROM followers WHERE user_id = ?1 ORDER BY time_of_follow DESC",
            user_id,
            "get_applications_followed_by",
        )
    }

    /// Ids of the users following an application.
    pub fn get_followers_of(&self, application_id: Uuid) -> Result<Vec<Uuid>> {
        validation::require_id("application id", application_id)?;
        self.query_association(
            "SELECT user_id FROM followers WHERE application_id = ?1 ORDER BY time_of_follow DESC",
            application_id,
            "get_followers_of",
        )
    }

    /// Remove the association.  Unfollowing twice is not an error.
    pub fn delete_follower(&self, user_id: Uuid, application_id: Uuid) -> Result<bool> {
        validation::require_id("user id", user_id)?;
        validation::require_id("application id", application_id)?;
        let affected = self
            .conn()
            .execute(
                "DELETE FROM followers WHERE user_id = ?1 AND application_id = ?2",
                params![user_id.to_string(), application_id.to_string()],
            )
            .map_err(error::op(REPOSITORY, "delete_follower", &user_id))?;
        Ok(affected > 0)
    }

    fn query_association(
        &self,
        sql: &str,
        key: Uuid,
        operation: &'static str,
    ) -> Result<Vec<Uuid>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(sql)
            .map_err(error::op(REPOSITORY, operation, &key))?;

        let rows = stmt
            .query_map(params![key.to_string()], |row| {
                serializer::parse_uuid(0, &row.get::<_, String>(0)?)
            })
            .map_err(error::op(REPOSITORY, operation, &key))?;

        let mut ids = Vec::new();
        for row in rows {
            ids.push(row.map_err(error::op(REPOSITORY, operation, &key))?);
        }
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn follow_and_list_both_directions() {
        let db = test_db();
        let user = Uuid::new_v4();
        let app = Uuid::new_v4();

        db.save_follower(user, app).unwrap();

        assert!(db.is_following(user, app).unwrap());
        assert_eq!(db.get_applications_followed_by(user).unwrap(), vec![app]);
        assert_eq!(db.get_followers_of(app).unwrap(), vec![user]);
    }

    #[test]
    fn following_twice_is_a_noop() {
        let db = test_db();
        let user = Uuid::new_v4();
        let app = Uuid::new_v4();

        db.save_follower(user, app).unwrap();
        db.save_follower(user, app).unwrap();

        assert_eq!(db.get_followers_of(app).unwrap().len(), 1);
    }

    #[test]
    fn no_followers_is_an_empty_list() {
        let db = test_db();
        assert!(db.get_followers_of(Uuid::new_v4()).unwrap().is_empty());
        assert!(db
            .get_applications_followed_by(Uuid::new_v4())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn unfollow_is_idempotent() {
        let db = test_db();
        let user = Uuid::new_v4();
        let app = Uuid::new_v4();
        db.save_follower(user, app).unwrap();

        assert!(db.delete_follower(user, app).unwrap());
        assert!(!db.delete_follower(user, app).unwrap());
        assert!(!db.is_following(user, app).unwrap());
    }

    #[test]
    fn both_ids_are_validated() {
        let db = test_db();
        let err = db.save_follower(Uuid::nil(), Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));

        let err = db.save_follower(Uuid::new_v4(), Uuid::nil()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }
}
