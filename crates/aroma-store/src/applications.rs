//! Repository for [`Application`] records.

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use aroma_model::Application;

use crate::database::Database;
use crate::error::{self, Result};
use crate::serializer::{self, Serializer};
use crate::validation;

const REPOSITORY: &str = "applications";
const ENTITY: &str = "application";

const INSERT_APPLICATION: &str = "INSERT INTO applications \
     (application_id, name, description, organization_id, language, tier, \
      token_expiration, icon_media_id, owners, total_messages_sent) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

const APPLICATION_COLUMNS: &str = "application_id, name, description, organization_id, language, \
     tier, token_expiration, icon_media_id, owners, total_messages_sent";

/// Maps an [`Application`] to and from its row shape.
pub struct ApplicationSerializer;

impl Serializer for ApplicationSerializer {
    type Entity = Application;

    fn save(
        &self,
        app: &Application,
        _ttl: Option<chrono::Duration>,
        sql: &str,
        conn: &Connection,
    ) -> Result<()> {
        validation::require_application(app)?;

        let owners = serializer::encode_uuid_array(&app.owners)
            .map_err(error::op(REPOSITORY, "save", &app.application_id))?;

        conn.execute(
            sql,
            params![
                app.application_id.to_string(),
                app.name,
                app.description,
                app.organization_id.to_string(),
                app.language.map(|l| l.to_string()),
                app.tier.map(|t| t.to_string()),
                app.token_expiration.as_ref().map(serializer::format_timestamp),
                app.icon_media_id.map(|id| id.to_string()),
                owners,
                app.total_messages_sent,
            ],
        )
        .map_err(error::op(REPOSITORY, "save", &app.application_id))?;
        Ok(())
    }

    fn deserialize(&self, row: &Row<'_>) -> rusqlite::Result<Application> {
        Ok(Application {
            application_id: serializer::parse_uuid(0, &row.get::<_, String>(0)?)?,
            name: row.get(1)?,
            description: row.get(2)?,
            organization_id: serializer::parse_uuid(3, &row.get::<_, String>(3)?)?,
            language: serializer::parse_enum_lenient("language", row.get(4)?),
            tier: serializer::parse_enum_lenient("tier", row.get(5)?),
            token_expiration: serializer::parse_timestamp_opt(6, row.get(6)?)?,
            icon_media_id: serializer::parse_uuid_opt(7, row.get(7)?)?,
            owners: serializer::decode_uuid_array("owners", &row.get::<_, String>(8)?),
            total_messages_sent: row.get(9)?,
        })
    }
}

impl Database {
    /// Insert a new application.  Re-saving an existing id is a conflict.
    pub fn save_application(&self, app: &Application) -> Result<()> {
        validation::require_application(app)?;
        ApplicationSerializer.save(app, None, INSERT_APPLICATION, self.conn())
    }

    /// Fetch a single application by id.
    pub fn get_application(&self, application_id: Uuid) -> Result<Application> {
        validation::require_id("application id", application_id)?;
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE application_id = ?1");
        self.conn()
            .query_row(&sql, params![application_id.to_string()], |row| {
                ApplicationSerializer.deserialize(row)
            })
            .map_err(|e| {
                error::single_row(
                    REPOSITORY,
                    "get_application",
                    &application_id,
                    error::does_not_exist(ENTITY),
                    e,
                )
            })
    }

    /// Whether an application with this id exists.
    pub fn contains_application(&self, application_id: Uuid) -> Result<bool> {
        validation::require_id("application id", application_id)?;
        let count: i64 = self
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM applications WHERE application_id = ?1",
                params![application_id.to_string()],
                |row| row.get(0),
            )
            .map_err(error::op(REPOSITORY, "contains_application", &application_id))?;
        Ok(count > 0)
    }

    /// Delete an application.  Deleting a non-existent one is not an error.
    pub fn delete_application(&self, application_id: Uuid) -> Result<bool> {
        validation::require_id("application id", application_id)?;
        let affected = self
            .conn()
            .execute(
                "DELETE FROM applications WHERE application_id = ?1",
                params![application_id.to_string()],
            )
            .map_err(error::op(REPOSITORY, "delete_application", &application_id))?;
        Ok(affected > 0)
    }

    /// All applications belonging to an organization.  An organization with
    /// no applications yields an empty list, not an error.
    pub fn get_applications_for_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<Application>> {
        validation::require_id("organization id", organization_id)?;
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE organization_id = ?1 ORDER BY name ASC"
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql).map_err(error::op(
            REPOSITORY,
            "get_applications_for_organization",
            &organization_id,
        ))?;

        let rows = stmt
            .query_map(params![organization_id.to_string()], |row| {
                ApplicationSerializer.deserialize(row)
            })
            .map_err(error::op(
                REPOSITORY,
                "get_applications_for_organization",
                &organization_id,
            ))?;

        let mut apps = Vec::new();
        for row in rows {
            apps.push(row.map_err(error::op(
                REPOSITORY,
                "get_applications_for_organization",
                &organization_id,
            ))?);
        }
        Ok(apps)
    }

    /// All applications owned by a user.
    ///
    /// Owners live in a JSON array column, so this filters in memory rather
    /// than relying on string matching against the column text.
    pub fn get_applications_owned_by(&self, user_id: Uuid) -> Result<Vec<Application>> {
        validation::require_id("user id", user_id)?;
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications ORDER BY name ASC");
        let conn = self.conn();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(error::op(REPOSITORY, "get_applications_owned_by", &user_id))?;

        let rows = stmt
            .query_map([], |row| ApplicationSerializer.deserialize(row))
            .map_err(error::op(REPOSITORY, "get_applications_owned_by", &user_id))?;

        let mut apps = Vec::new();
        for row in rows {
            let app =
                row.map_err(error::op(REPOSITORY, "get_applications_owned_by", &user_id))?;
            if app.owners.contains(&user_id) {
                apps.push(app);
            }
        }
        Ok(apps)
    }
}
