//! Repository for [`User`] records.

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use aroma_model::User;

use crate::database::Database;
use crate::error::{self, Result};
use crate::serializer::{self, Serializer};
use crate::validation;

const REPOSITORY: &str = "users";
const ENTITY: &str = "user";

const INSERT_USER: &str = "INSERT INTO users \
     (user_id, first_name, middle_name, last_name, email, roles, birthdate, \
      profile_image_id, github_profile, time_joined) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

const USER_COLUMNS: &str = "user_id, first_name, middle_name, last_name, email, roles, \
     birthdate, profile_image_id, github_profile, time_joined";

/// Maps a [`User`] to and from its row shape.
pub struct UserSerializer;

impl Serializer for UserSerializer {
    type Entity = User;

    fn save(
        &self,
        user: &User,
        _ttl: Option<chrono::Duration>,
        sql: &str,
        conn: &Connection,
    ) -> Result<()> {
        validation::require_user(user)?;

        let roles = serializer::encode_enum_array(&user.roles)
            .map_err(error::op(REPOSITORY, "save", &user.user_id))?;

        conn.execute(
            sql,
            params![
                user.user_id.to_string(),
                user.first_name,
                user.middle_name,
                user.last_name,
                user.email,
                roles,
                user.birthdate.as_ref().map(serializer::format_timestamp),
                user.profile_image_id.map(|id| id.to_string()),
                user.github_profile,
                serializer::format_timestamp(&user.time_joined),
            ],
        )
        .map_err(error::op(REPOSITORY, "save", &user.user_id))?;
        Ok(())
    }

    fn deserialize(&self, row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            user_id: serializer::parse_uuid(0, &row.get::<_, String>(0)?)?,
            first_name: row.get(1)?,
            middle_name: row.get(2)?,
            last_name: row.get(3)?,
            email: row.get(4)?,
            roles: serializer::decode_enum_array("roles", &row.get::<_, String>(5)?),
            birthdate: serializer::parse_timestamp_opt(6, row.get(6)?)?,
            profile_image_id: serializer::parse_uuid_opt(7, row.get(7)?)?,
            github_profile: row.get(8)?,
            time_joined: serializer::parse_timestamp(9, &row.get::<_, String>(9)?)?,
        })
    }
}

impl Database {
    /// Insert a new user.  Saving an id that already exists is a conflict,
    /// surfaced as an operation failure.
    pub fn save_user(&self, user: &User) -> Result<()> {
        validation::require_user(user)?;
        UserSerializer.save(user, None, INSERT_USER, self.conn())
    }

    /// Fetch a single user by id.
    pub fn get_user(&self, user_id: Uuid) -> Result<User> {
        validation::require_id("user id", user_id)?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1");
        self.conn()
            .query_row(&sql, params![user_id.to_string()], |row| {
                UserSerializer.deserialize(row)
            })
            .map_err(|e| {
                error::single_row(
                    REPOSITORY,
                    "get_user",
                    &user_id,
                    error::does_not_exist(ENTITY),
                    e,
                )
            })
    }

    /// Fetch a single user by email address.
    pub fn get_user_by_email(&self, email: &str) -> Result<User> {
        validation::require_text("email", email)?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1");
        self.conn()
            .query_row(&sql, params![email], |row| UserSerializer.deserialize(row))
            .map_err(|e| {
                error::single_row(
                    REPOSITORY,
                    "get_user_by_email",
                    &email,
                    error::does_not_exist(ENTITY),
                    e,
                )
            })
    }

    /// Fetch a single user by GitHub profile.
    pub fn get_user_by_github_profile(&self, github_profile: &str) -> Result<User> {
        validation::require_text("github profile", github_profile)?;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE github_profile = ?1");
        self.conn()
            .query_row(&sql, params![github_profile], |row| {
                UserSerializer.deserialize(row)
            })
            .map_err(|e| {
                error::single_row(
                    REPOSITORY,
                    "get_user_by_github_profile",
                    &github_profile,
                    error::does_not_exist(ENTITY),
                    e,
                )
            })
    }

    /// Whether a user with this id exists.  Never reports not-found.
    pub fn contains_user(&self, user_id: Uuid) -> Result<bool> {
        validation::require_id("user id", user_id)?;
        let count: i64 = self
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM users WHERE user_id = ?1",
                params![user_id.to_string()],
                |row| row.get(0),
            )
            .map_err(error::op(REPOSITORY, "contains_user", &user_id))?;
        Ok(count > 0)
    }

    /// Delete a user.  Returns `true` if a row was deleted; deleting a
    /// non-existent user is not an error.
    pub fn delete_user(&self, user_id: Uuid) -> Result<bool> {
        validation::require_id("user id", user_id)?;
        let affected = self
            .conn()
            .execute(
                "DELETE FROM users WHERE user_id = ?1",
                params![user_id.to_string()],
            )
            .map_err(error::op(REPOSITORY, "delete_user", &user_id))?;
        Ok(affected > 0)
    }

    /// Most recently joined users, newest first.
    pub fn get_recent_users(&self, limit: u32) -> Result<Vec<User>> {
        let sql =
            format!("SELECT {USER_COLUMNS} FROM users ORDER BY time_joined DESC LIMIT ?1");
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(error::op(REPOSITORY, "get_recent_users", &limit))?;

        let rows = stmt
            .query_map(params![limit], |row| UserSerializer.deserialize(row))
            .map_err(error::op(REPOSITORY, "get_recent_users", &limit))?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row.map_err(error::op(REPOSITORY, "get_recent_users", &limit))?);
        }
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use aroma_model::Role;
    use chrono::{TimeZone, Utc};

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn sample_user() -> User {
        User {
            user_id: Uuid::new_v4(),
            first_name: "Ada".into(),
            middle_name: Some("King".into()),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            roles: vec![Role::Developer, Role::Owner],
            birthdate: Some(Utc.with_ymd_and_hms(1990, 12, 10, 0, 0, 0).unwrap()),
            profile_image_id: Some(Uuid::new_v4()),
            github_profile: Some("adal".into()),
            time_joined: Utc::now(),
        }
    }

    #[test]
    fn save_and_get_round_trip() {
        let db = test_db();
        let user = sample_user();

        db.save_user(&user).unwrap();
        let fetched = db.get_user(user.user_id).unwrap();
        assert_eq!(fetched, user);
    }

    #[test]
    fn minimal_user_round_trip() {
        // A user with only the required identity fields set.
        let db = test_db();
        let user = User {
            user_id: Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap(),
            first_name: "Grace".into(),
            middle_name: None,
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            roles: vec![],
            birthdate: None,
            profile_image_id: None,
            github_profile: None,
            time_joined: Utc::now(),
        };

        db.save_user(&user).unwrap();
        let fetched = db.get_user(user.user_id).unwrap();
        assert_eq!(fetched, user);
        assert!(fetched.birthdate.is_none());
    }

    #[test]
    fn save_twice_is_a_conflict() {
        let db = test_db();
        let user = sample_user();

        db.save_user(&user).unwrap();
        let err = db.save_user(&user).unwrap_err();
        assert!(matches!(err, StoreError::OperationFailed { .. }));
    }

    #[test]
    fn get_missing_user_is_not_found() {
        let db = test_db();
        let err = db.get_user(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, StoreError::DoesNotExist { entity: "user" }));
    }

    #[test]
    fn invalid_id_never_reaches_the_store() {
        let db = test_db();
        let mut user = sample_user();
        user.user_id = Uuid::nil();

        let err = db.save_user(&user).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));

        let count: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn lookup_by_email_and_github() {
        let db = test_db();
        let user = sample_user();
        db.save_user(&user).unwrap();

        assert_eq!(db.get_user_by_email("ada@example.com").unwrap(), user);
        assert_eq!(db.get_user_by_github_profile("adal").unwrap(), user);
        assert!(db.get_user_by_email("nobody@example.com").is_err());
    }

    #[test]
    fn delete_is_idempotent() {
        let db = test_db();
        let user = sample_user();
        db.save_user(&user).unwrap();

        assert!(db.delete_user(user.user_id).unwrap());
        assert!(!db.delete_user(user.user_id).unwrap());
    }

    #[test]
    fn contains_never_errors_on_missing() {
        let db = test_db();
        assert!(!db.contains_user(Uuid::new_v4()).unwrap());

        let user = sample_user();
        db.save_user(&user).unwrap();
        assert!(db.contains_user(user.user_id).unwrap());
    }

    #[test]
    fn corrupt_role_element_is_dropped() {
        let db = test_db();
        let user = sample_user();
        db.save_user(&user).unwrap();

        db.conn()
            .execute(
                "UPDATE users SET roles = '[\"DEVELOPER\", \"WIZARD\"]' WHERE user_id = ?1",
                params![user.user_id.to_string()],
            )
            .unwrap();

        let fetched = db.get_user(user.user_id).unwrap();
        assert_eq!(fetched.roles, vec![Role::Developer]);
    }

    #[test]
    fn recent_users_newest_first() {
        let db = test_db();
        let mut old = sample_user();
        old.email = "old@example.com".into();
        old.time_joined = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut new = sample_user();
        new.email = "new@example.com".into();
        new.time_joined = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        db.save_user(&old).unwrap();
        db.save_user(&new).unwrap();

        let recent = db.get_recent_users(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].user_id, new.user_id);
    }
}
