//! Repository for [`AuthenticationToken`] records.
//!
//! Token lookups that find nothing report [`StoreError::InvalidToken`]
//! instead of a generic not-found: from the caller's perspective a missing
//! token and a bad token are the same thing.
//!
//! [`StoreError::InvalidToken`]: crate::StoreError::InvalidToken

use chrono::Duration;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use aroma_model::AuthenticationToken;

use crate::database::Database;
use crate::error::{self, Result, StoreError};
use crate::serializer::{self, Serializer};
use crate::validation;

const REPOSITORY: &str = "tokens";

const INSERT_TOKEN: &str = "INSERT INTO tokens \
     (token_id, owner_id, organization_id, owner_name, time_of_creation, \
      time_of_expiration, token_type, status) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const TOKEN_COLUMNS: &str = "token_id, owner_id, organization_id, owner_name, time_of_creation, \
     time_of_expiration, token_type, status";

/// Maps an [`AuthenticationToken`] to and from its row shape.
pub struct TokenSerializer;

impl Serializer for TokenSerializer {
    type Entity = AuthenticationToken;

    fn save(
        &self,
        token: &AuthenticationToken,
        ttl: Option<Duration>,
        sql: &str,
        conn: &Connection,
    ) -> Result<()> {
        validation::require_token(token)?;

        // A TTL overrides the expiration carried on the token.
        let expiration = serializer::expiration_from(token.time_of_creation, ttl)
            .unwrap_or(token.time_of_expiration);

        conn.execute(
            sql,
            params![
                token.token_id.to_string(),
                token.owner_id.to_string(),
                token.organization_id.map(|id| id.to_string()),
                token.owner_name,
                serializer::format_timestamp(&token.time_of_creation),
                serializer::format_timestamp(&expiration),
                token.token_type.map(|t| t.to_string()),
                token.status.map(|s| s.to_string()),
            ],
        )
        .map_err(error::op(REPOSITORY, "save", &token.token_id))?;
        Ok(())
    }

    fn deserialize(&self, row: &Row<'_>) -> rusqlite::Result<AuthenticationToken> {
        Ok(AuthenticationToken {
            token_id: serializer::parse_uuid(0, &row.get::<_, String>(0)?)?,
            owner_id: serializer::parse_uuid(1, &row.get::<_, String>(1)?)?,
            organization_id: serializer::parse_uuid_opt(2, row.get(2)?)?,
            owner_name: row.get(3)?,
            time_of_creation: serializer::parse_timestamp(4, &row.get::<_, String>(4)?)?,
            time_of_expiration: serializer::parse_timestamp(5, &row.get::<_, String>(5)?)?,
            token_type: serializer::parse_enum_lenient("token_type", row.get(6)?),
            status: serializer::parse_enum_lenient("status", row.get(7)?),
        })
    }
}

impl Database {
    /// Insert a new token.  When a TTL is given, the stored expiration is
    /// computed from the creation time rather than taken from the token.
    pub fn save_token(&self, token: &AuthenticationToken, ttl: Option<Duration>) -> Result<()> {
        validation::require_token(token)?;
        TokenSerializer.save(token, ttl, INSERT_TOKEN, self.conn())
    }

    /// Fetch a token by id.  A missing row is an invalid token.
    ///
    /// Expired tokens are still returned; expiry policy belongs to the
    /// caller, this layer only reports what is stored.
    pub fn get_token(&self, token_id: Uuid) -> Result<AuthenticationToken> {
        validation::require_id("token id", token_id)?;
        let sql = format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE token_id = ?1");
        self.conn()
            .query_row(&sql, params![token_id.to_string()], |row| {
                TokenSerializer.deserialize(row)
            })
            .map_err(|e| {
                error::single_row(REPOSITORY, "get_token", &token_id, StoreError::InvalidToken, e)
            })
    }

    /// Whether a token with this id exists.
    pub fn contains_token(&self, token_id: Uuid) -> Result<bool> {
        validation::require_id("token id", token_id)?;
        let count: i64 = self
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM tokens WHERE token_id = ?1",
                params![token_id.to_string()],
                |row| row.get(0),
            )
            .map_err(error::op(REPOSITORY, "contains_token", &token_id))?;
        Ok(count > 0)
    }

    /// Delete a token.  Deleting a non-existent one is not an error.
    pub fn delete_token(&self, token_id: Uuid) -> Result<bool> {
        validation::require_id("token id", token_id)?;
        let affected = self
            .conn()
            .execute(
                "DELETE FROM tokens WHERE token_id = ?1",
                params![token_id.to_string()],
            )
            .map_err(error::op(REPOSITORY, "delete_token", &token_id))?;
        Ok(affected > 0)
    }

    /// All tokens belonging to an owner, newest first.
    pub fn get_tokens_for_owner(&self, owner_id: Uuid) -> Result<Vec<AuthenticationToken>> {
        validation::require_id("owner id", owner_id)?;
        let sql = format!(
            "SELECT {TOKEN_COLUMNS} FROM tokens \
             WHERE owner_id = ?1 ORDER BY time_of_creation DESC"
        );
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(error::op(REPOSITORY, "get_tokens_for_owner", &owner_id))?;

        let rows = stmt
            .query_map(params![owner_id.to_string()], |row| {
                TokenSerializer.deserialize(row)
            })
            .map_err(error::op(REPOSITORY, "get_tokens_for_owner", &owner_id))?;

        let mut tokens = Vec::new();
        for row in rows {
            tokens.push(row.map_err(error::op(REPOSITORY, "get_tokens_for_owner", &owner_id))?);
        }
        Ok(tokens)
    }

    /// Delete every token belonging to an owner.  Returns how many were
    /// removed; zero is not an error.
    pub fn delete_tokens_for_owner(&self, owner_id: Uuid) -> Result<usize> {
        validation::require_id("owner id", owner_id)?;
        self.conn()
            .execute(
                "DELETE FROM tokens WHERE owner_id = ?1",
                params![owner_id.to_string()],
            )
            .map_err(error::op(REPOSITORY, "delete_tokens_for_owner", &owner_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aroma_model::{TokenStatus, TokenType};
    use chrono::Utc;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn sample_token() -> AuthenticationToken {
        let now = Utc::now();
        AuthenticationToken {
            token_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            organization_id: Some(Uuid::new_v4()),
            owner_name: Some("deployment-bot".into()),
            time_of_creation: now,
            time_of_expiration: now + Duration::days(30),
            token_type: Some(TokenType::Application),
            status: Some(TokenStatus::Active),
        }
    }

    #[test]
    fn save_and_get_round_trip() {
        let db = test_db();
        let token = sample_token();

        db.save_token(&token, None).unwrap();
        assert_eq!(db.get_token(token.token_id).unwrap(), token);
    }

    #[test]
    fn ttl_overrides_carried_expiration() {
        let db = test_db();
        let token = sample_token();

        db.save_token(&token, Some(Duration::minutes(10))).unwrap();
        let fetched = db.get_token(token.token_id).unwrap();

        assert_eq!(
            fetched.time_of_expiration,
            token.time_of_creation + Duration::minutes(10)
        );
        assert!(fetched.time_of_expiration > fetched.time_of_creation);
    }

    #[test]
    fn missing_token_is_invalid_token() {
        let db = test_db();
        let err = db.get_token(Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidToken));
    }

    #[test]
    fn expired_token_is_still_returned() {
        let db = test_db();
        let mut token = sample_token();
        token.time_of_expiration = token.time_of_creation - Duration::days(1);

        db.save_token(&token, None).unwrap();
        let fetched = db.get_token(token.token_id).unwrap();
        assert!(fetched.time_of_expiration < fetched.time_of_creation);
    }

    #[test]
    fn tokens_for_owner_and_bulk_delete() {
        let db = test_db();
        let owner = Uuid::new_v4();

        let mut first = sample_token();
        first.owner_id = owner;
        let mut second = sample_token();
        second.owner_id = owner;
        let unrelated = sample_token();

        db.save_token(&first, None).unwrap();
        db.save_token(&second, None).unwrap();
        db.save_token(&unrelated, None).unwrap();

        assert_eq!(db.get_tokens_for_owner(owner).unwrap().len(), 2);

        assert_eq!(db.delete_tokens_for_owner(owner).unwrap(), 2);
        assert!(db.get_tokens_for_owner(owner).unwrap().is_empty());
        assert_eq!(db.delete_tokens_for_owner(owner).unwrap(), 0);

        // The unrelated owner's token survives.
        assert!(db.contains_token(unrelated.token_id).unwrap());
    }

    #[test]
    fn nil_token_id_is_rejected_before_io() {
        let db = test_db();
        let err = db.get_token(Uuid::nil()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }
}
