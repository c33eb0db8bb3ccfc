//! Repository for user credentials.
//!
//! The simplest repository: a user id mapped to an encrypted password
//! string.  Unlike most entities, saving is an upsert; rotating a password
//! overwrites the previous one.

use rusqlite::params;
use uuid::Uuid;

use crate::database::Database;
use crate::error::{self, Result};
use crate::validation;

const REPOSITORY: &str = "credentials";
const ENTITY: &str = "credential";

impl Database {
    /// Store (or replace) a user's encrypted password.
    pub fn save_credential(&self, user_id: Uuid, encrypted_password: &str) -> Result<()> {
        validation::require_id("user id", user_id)?;
        validation::require_text("encrypted password", encrypted_password)?;
        self.conn()
            .execute(
                "INSERT INTO credentials (user_id, encrypted_password) VALUES (?1, ?2) \
                 ON CONFLICT (user_id) DO UPDATE SET encrypted_password = excluded.encrypted_password",
                params![user_id.to_string(), encrypted_password],
            )
            .map_err(error::op(REPOSITORY, "save_credential", &user_id))?;
        Ok(())
    }

    /// Fetch a user's encrypted password.
    pub fn get_credential(&self, user_id: Uuid) -> Result<String> {
        validation::require_id("user id", user_id)?;
        self.conn()
            .query_row(
                "SELECT encrypted_password FROM credentials WHERE user_id = ?1",
                params![user_id.to_string()],
                |row| row.get(0),
            )
            .map_err(|e| {
                error::single_row(
                    REPOSITORY,
                    "get_credential",
                    &user_id,
                    error::does_not_exist(ENTITY),
                    e,
                )
            })
    }

    /// Whether a credential is stored for this user.
    pub fn contains_credential(&self, user_id: Uuid) -> Result<bool> {
        validation::require_id("user id", user_id)?;
        let count: i64 = self
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM credentials WHERE user_id = ?1",
                params![user_id.to_string()],
                |row| row.get(0),
            )
            .map_err(error::op(REPOSITORY, "contains_credential", &user_id))?;
        Ok(count > 0)
    }

    /// Remove a user's credential.  Idempotent.
    pub fn delete_credential(&self, user_id: Uuid) -> Result<bool> {
        validation::require_id("user id", user_id)?;
        let affected = self
            .conn()
            .execute(
                "DELETE FROM credentials WHERE user_id = ?1",
                params![user_id.to_string()],
            )
            .map_err(error::op(REPOSITORY, "delete_credential", &user_id))?;
        Ok(affected > 0)
    }
}
