//! Repository for [`Organization`] records.

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use aroma_model::Organization;

use crate::database::Database;
use crate::error::{self, Result};
use crate::serializer::{self, Serializer};
use crate::validation;

const REPOSITORY: &str = "organizations";
const ENTITY: &str = "organization";

const INSERT_ORGANIZATION: &str = "INSERT INTO organizations \
     (organization_id, name, description, owners, industry, tier, email, \
      github_profile, website, stock_symbol) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

const ORGANIZATION_COLUMNS: &str = "organization_id, name, description, owners, industry, tier, \
     email, github_profile, website, stock_symbol";

/// Maps an [`Organization`] to and from its row shape.
pub struct OrganizationSerializer;

impl Serializer for OrganizationSerializer {
    type Entity = Organization;

    fn save(
        &self,
        org: &Organization,
        _ttl: Option<chrono::Duration>,
        sql: &str,
        conn: &Connection,
    ) -> Result<()> {
        validation::require_organization(org)?;

        let owners = serializer::encode_uuid_array(&org.owners)
            .map_err(error::op(REPOSITORY, "save", &org.organization_id))?;

        conn.execute(
            sql,
            params![
                org.organization_id.to_string(),
                org.name,
                org.description,
                owners,
                org.industry.map(|i| i.to_string()),
                org.tier.map(|t| t.to_string()),
                org.email,
                org.github_profile,
                org.website,
                org.stock_symbol,
            ],
        )
        .map_err(error::op(REPOSITORY, "save", &org.organization_id))?;
        Ok(())
    }

    fn deserialize(&self, row: &Row<'_>) -> rusqlite::Result<Organization> {
        Ok(Organization {
            organization_id: serializer::parse_uuid(0, &row.get::<_, String>(0)?)?,
            name: row.get(1)?,
            description: row.get(2)?,
            owners: serializer::decode_uuid_array("owners", &row.get::<_, String>(3)?),
            industry: serializer::parse_enum_lenient("industry", row.get(4)?),
            tier: serializer::parse_enum_lenient("tier", row.get(5)?),
            email: row.get(6)?,
            github_profile: row.get(7)?,
            website: row.get(8)?,
            stock_symbol: row.get(9)?,
        })
    }
}

impl Database {
    /// Insert a new organization.
    pub fn save_organization(&self, org: &Organization) -> Result<()> {
        validation::require_organization(org)?;
        OrganizationSerializer.save(org, None, INSERT_ORGANIZATION, self.conn())
    }

    /// Fetch a single organization by id.
    pub fn get_organization(&self, organization_id: Uuid) -> Result<Organization> {
        validation::require_id("organization id", organization_id)?;
        let sql = format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE organization_id = ?1"
        );
        self.conn()
            .query_row(&sql, params![organization_id.to_string()], |row| {
                OrganizationSerializer.deserialize(row)
            })
            .map_err(|e| {
                error::single_row(
                    REPOSITORY,
                    "get_organization",
                    &organization_id,
                    error::does_not_exist(ENTITY),
                    e,
                )
            })
    }

    /// Whether an organization with this id exists.
    pub fn contains_organization(&self, organization_id: Uuid) -> Result<bool> {
        validation::require_id("organization id", organization_id)?;
        let count: i64 = self
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM organizations WHERE organization_id = ?1",
                params![organization_id.to_string()],
                |row| row.get(0),
            )
            .map_err(error::op(REPOSITORY, "contains_organization", &organization_id))?;
        Ok(count > 0)
    }

    /// Delete an organization.  Deleting a non-existent one is not an error.
    pub fn delete_organization(&self, organization_id: Uuid) -> Result<bool> {
        validation::require_id("organization id", organization_id)?;
        let affected = self
            .conn()
            .execute(
                "DELETE FROM organizations WHERE organization_id = ?1",
                params![organization_id.to_string()],
            )
            .map_err(error::op(REPOSITORY, "delete_organization", &organization_id))?;
        Ok(affected > 0)
    }

    /// Organizations whose name contains the given fragment.
    pub fn search_organizations_by_name(&self, fragment: &str) -> Result<Vec<Organization>> {
        validation::require_text("name fragment", fragment)?;
        let sql = format!(
            "SELECT {ORGANIZATION_COLUMNS} FROM organizations \
             WHERE name LIKE '%' || ?1 || '%' ORDER BY name ASC"
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql).map_err(error::op(
            REPOSITORY,
            "search_organizations_by_name",
            &fragment,
        ))?;

        let rows = stmt
            .query_map(params![fragment], |row| {
                OrganizationSerializer.deserialize(row)
            })
            .map_err(error::op(
                REPOSITORY,
                "search_organizations_by_name",
                &fragment,
            ))?;

        let mut orgs = Vec::new();
        for row in rows {
            orgs.push(row.map_err(error::op(
                REPOSITORY,
                "search_organizations_by_name",
                &fragment,
            ))?);
        }
        Ok(orgs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use aroma_model::{Industry, Tier};

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn sample_organization() -> Organization {
        Organization {
            organization_id: Uuid::new_v4(),
            name: "Initech".into(),
            description: Some("TPS reports".into()),
            owners: vec![Uuid::new_v4()],
            industry: Some(Industry::Technology),
            tier: Some(Tier::Basic),
            email: Some("contact@initech.example".into()),
            github_profile: Some("initech".into()),
            website: Some("https://initech.example".into()),
            stock_symbol: Some("INTC".into()),
        }
    }

    #[test]
    fn save_and_get_round_trip() {
        let db = test_db();
        let org = sample_organization();

        db.save_organization(&org).unwrap();
        assert_eq!(db.get_organization(org.organization_id).unwrap(), org);
    }

    #[test]
    fn ownerless_organization_is_rejected() {
        let db = test_db();
        let mut org = sample_organization();
        org.owners.clear();

        let err = db.save_organization(&org).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
    }

    #[test]
    fn unnamed_organization_is_rejected() {
        let db = test_db();
        let mut org = sample_organization();
        org.name = String::new();

        assert!(db.save_organization(&org).is_err());
    }

    #[test]
    fn missing_organization_is_not_found() {
        let db = test_db();
        let err = db.get_organization(Uuid::new_v4()).unwrap_err();
        assert!(matches!(
            err,
            StoreError::DoesNotExist {
                entity: "organization"
            }
        ));
    }

    #[test]
    fn search_matches_name_fragment() {
        let db = test_db();
        let org = sample_organization();
        db.save_organization(&org).unwrap();

        let hits = db.search_organizations_by_name("nite").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].organization_id, org.organization_id);

        assert!(db.search_organizations_by_name("globex").unwrap().is_empty());
    }

    #[test]
    fn corrupt_industry_degrades_to_unset() {
        let db = test_db();
        let org = sample_organization();
        db.save_organization(&org).unwrap();

        db.conn()
            .execute(
                "UPDATE organizations SET industry = 'ALCHEMY' WHERE organization_id = ?1",
                params![org.organization_id.to_string()],
            )
            .unwrap();

        let fetched = db.get_organization(org.organization_id).unwrap();
        assert_eq!(fetched.industry, None);
    }

    #[test]
    fn delete_is_idempotent() {
        let db = test_db();
        let org = sample_organization();
        db.save_organization(&org).unwrap();

        assert!(db.delete_organization(org.organization_id).unwrap());
        assert!(!db.delete_organization(org.organization_id).unwrap());
    }
}
