//! Repository for [`Reaction`] sets.
//!
//! Reactions are blob-persisted: one row per owner (a user or an
//! application) holding the full set as a JSON array column.  The bulk
//! `save_reactions` is a replace-on-write: it clears the owner's row and
//! inserts the new set inside one transaction, so no stale members survive.
//! The single-item `save_reaction` appends without touching siblings.

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use aroma_model::Reaction;

use crate::database::Database;
use crate::error::{self, Result};
use crate::serializer::{self, Serializer};
use crate::validation;

const REPOSITORY: &str = "reactions";

const INSERT_REACTIONS: &str =
    "INSERT INTO reactions (owner_id, reactions) VALUES (?1, ?2)";

const UPSERT_REACTIONS: &str = "INSERT INTO reactions (owner_id, reactions) VALUES (?1, ?2) \
     ON CONFLICT (owner_id) DO UPDATE SET reactions = excluded.reactions";

/// Maps an owner's reaction set to and from its single-row shape.
///
/// The same serializer backs both the insert and the upsert statement; the
/// repository decides which variant to pass.
pub struct ReactionsSerializer {
    owner_id: Uuid,
}

impl ReactionsSerializer {
    pub fn for_owner(owner_id: Uuid) -> Self {
        Self { owner_id }
    }
}

impl Serializer for ReactionsSerializer {
    type Entity = Vec<Reaction>;

    fn save(
        &self,
        reactions: &Vec<Reaction>,
        _ttl: Option<chrono::Duration>,
        sql: &str,
        conn: &Connection,
    ) -> Result<()> {
        validation::require_id("owner id", self.owner_id)?;

        let blob = serializer::encode_json(reactions)
            .map_err(error::op(REPOSITORY, "save", &self.owner_id))?;

        conn.execute(sql, params![self.owner_id.to_string(), blob])
            .map_err(error::op(REPOSITORY, "save", &self.owner_id))?;
        Ok(())
    }

    fn deserialize(&self, row: &Row<'_>) -> rusqlite::Result<Vec<Reaction>> {
        Ok(serializer::parse_json_lenient(
            "reactions",
            &row.get::<_, String>(0)?,
        ))
    }
}

impl Database {
    /// Replace an owner's entire reaction set.
    ///
    /// Clear and insert run inside one transaction, so a failure leaves the
    /// previous set intact rather than an empty one.
    pub fn save_reactions(&self, owner_id: Uuid, reactions: &[Reaction]) -> Result<()> {
        validation::require_id("owner id", owner_id)?;

        let tx = self
            .conn()
            .unchecked_transaction()
            .map_err(error::op(REPOSITORY, "save_reactions", &owner_id))?;

        tx.execute(
            "DELETE FROM reactions WHERE owner_id = ?1",
            params![owner_id.to_string()],
        )
        .map_err(error::op(REPOSITORY, "save_reactions", &owner_id))?;

        ReactionsSerializer::for_owner(owner_id).save(
            &reactions.to_vec(),
            None,
            INSERT_REACTIONS,
            &tx,
        )?;

        tx.commit()
            .map_err(error::op(REPOSITORY, "save_reactions", &owner_id))
    }

    /// Append one reaction to an owner's set, leaving existing members alone.
    pub fn save_reaction(&self, owner_id: Uuid, reaction: &Reaction) -> Result<()> {
        validation::require_id("owner id", owner_id)?;

        let mut reactions = self.get_reactions_for(owner_id)?;
        reactions.push(reaction.clone());

        ReactionsSerializer::for_owner(owner_id).save(
            &reactions,
            None,
            UPSERT_REACTIONS,
            self.conn(),
        )
    }

    /// An owner's reaction set.  An owner with no reactions yields an empty
    /// list, never an error.
    pub fn get_reactions_for(&self, owner_id: Uuid) -> Result<Vec<Reaction>> {
        validation::require_id("owner id", owner_id)?;
        let set = self
            .conn()
            .query_row(
                "SELECT reactions FROM reactions WHERE owner_id = ?1",
                params![owner_id.to_string()],
                |row| ReactionsSerializer::for_owner(owner_id).deserialize(row),
            )
            .optional()
            .map_err(error::op(REPOSITORY, "get_reactions_for", &owner_id))?;
        Ok(set.unwrap_or_default())
    }

    /// Remove an owner's entire reaction set.  Idempotent.
    pub fn delete_reactions_for(&self, owner_id: Uuid) -> Result<bool> {
        validation::require_id("owner id", owner_id)?;
        let affected = self
            .conn()
            .execute(
                "DELETE FROM reactions WHERE owner_id = ?1",
                params![owner_id.to_string()],
            )
            .map_err(error::op(REPOSITORY, "delete_reactions_for", &owner_id))?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn reaction(label: &str) -> Reaction {
        Reaction {
            label: label.into(),
            emoticon: "🔥".into(),
            filters: vec![format!("title:{label}")],
        }
    }

    #[test]
    fn empty_owner_yields_empty_list() {
        let db = test_db();
        assert!(db.get_reactions_for(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn bulk_save_round_trips() {
        let db = test_db();
        let owner = Uuid::new_v4();
        let set = vec![reaction("deploys"), reaction("pages")];

        db.save_reactions(owner, &set).unwrap();
        assert_eq!(db.get_reactions_for(owner).unwrap(), set);
    }

    #[test]
    fn bulk_save_replaces_the_whole_set() {
        let db = test_db();
        let owner = Uuid::new_v4();

        db.save_reactions(owner, &[reaction("old")]).unwrap();
        let replacement = vec![reaction("new-a"), reaction("new-b")];
        db.save_reactions(owner, &replacement).unwrap();

        // The old member is gone, not merged.
        assert_eq!(db.get_reactions_for(owner).unwrap(), replacement);
    }

    #[test]
    fn single_save_appends_without_dropping_siblings() {
        let db = test_db();
        let owner = Uuid::new_v4();
        let set = vec![reaction("a"), reaction("b")];

        db.save_reactions(owner, &set).unwrap();
        db.save_reaction(owner, &reaction("c")).unwrap();

        let stored = db.get_reactions_for(owner).unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[2].label, "c");
    }

    #[test]
    fn corrupt_blob_degrades_to_empty_set() {
        let db = test_db();
        let owner = Uuid::new_v4();
        db.save_reactions(owner, &[reaction("x")]).unwrap();

        db.conn()
            .execute(
                "UPDATE reactions SET reactions = 'not json' WHERE owner_id = ?1",
                params![owner.to_string()],
            )
            .unwrap();

        assert!(db.get_reactions_for(owner).unwrap().is_empty());
    }

    #[test]
    fn delete_is_idempotent() {
        let db = test_db();
        let owner = Uuid::new_v4();
        db.save_reactions(owner, &[reaction("x")]).unwrap();

        assert!(db.delete_reactions_for(owner).unwrap());
        assert!(!db.delete_reactions_for(owner).unwrap());
    }

    #[test]
    fn nil_owner_is_rejected_before_io() {
        let db = test_db();
        let err = db.save_reactions(Uuid::nil(), &[reaction("x")]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }
}
