//! Repository for a user's registered [`MobileDevice`] set.
//!
//! Same storage shape as reactions: one row per user, the full device set
//! as a JSON array column.  `save_devices` replaces the whole set inside a
//! transaction; `save_device` appends a single device (skipping exact
//! duplicates, since the collection is a set) without clearing siblings.

use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use aroma_model::MobileDevice;

use crate::database::Database;
use crate::error::{self, Result};
use crate::serializer::{self, Serializer};
use crate::validation;

const REPOSITORY: &str = "devices";

const INSERT_DEVICES: &str = "INSERT INTO devices (user_id, devices) VALUES (?1, ?2)";

const UPSERT_DEVICES: &str = "INSERT INTO devices (user_id, devices) VALUES (?1, ?2) \
     ON CONFLICT (user_id) DO UPDATE SET devices = excluded.devices";

/// Maps a user's device set to and from its single-row shape.
pub struct DevicesSerializer {
    user_id: Uuid,
}

impl DevicesSerializer {
    pub fn for_user(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

impl Serializer for DevicesSerializer {
    type Entity = Vec<MobileDevice>;

    fn save(
        &self,
        devices: &Vec<MobileDevice>,
        _ttl: Option<chrono::Duration>,
        sql: &str,
        conn: &Connection,
    ) -> Result<()> {
        validation::require_id("user id", self.user_id)?;
        for device in devices {
            validation::require_device(device)?;
        }

        let blob = serializer::encode_json(devices)
            .map_err(error::op(REPOSITORY, "save", &self.user_id))?;

        conn.execute(sql, params![self.user_id.to_string(), blob])
            .map_err(error::op(REPOSITORY, "save", &self.user_id))?;
        Ok(())
    }

    fn deserialize(&self, row: &Row<'_>) -> rusqlite::Result<Vec<MobileDevice>> {
        Ok(serializer::parse_json_lenient(
            "devices",
            &row.get::<_, String>(0)?,
        ))
    }
}

impl Database {
    /// Replace a user's entire device set.
    pub fn save_devices(&self, user_id: Uuid, devices: &[MobileDevice]) -> Result<()> {
        validation::require_id("user id", user_id)?;

        let tx = self
            .conn()
            .unchecked_transaction()
            .map_err(error::op(REPOSITORY, "save_devices", &user_id))?;

        tx.execute(
            "DELETE FROM devices WHERE user_id = ?1",
            params![user_id.to_string()],
        )
        .map_err(error::op(REPOSITORY, "save_devices", &user_id))?;

        DevicesSerializer::for_user(user_id).save(
            &devices.to_vec(),
            None,
            INSERT_DEVICES,
            &tx,
        )?;

        tx.commit()
            .map_err(error::op(REPOSITORY, "save_devices", &user_id))
    }

    /// Register one device for a user.  Existing devices are kept; an exact
    /// duplicate registration is a no-op.
    pub fn save_device(&self, user_id: Uuid, device: &MobileDevice) -> Result<()> {
        validation::require_id("user id", user_id)?;
        validation::require_device(device)?;

        let mut devices = self.get_devices_for(user_id)?;
        if devices.contains(device) {
            return Ok(());
        }
        devices.push(device.clone());

        DevicesSerializer::for_user(user_id).save(&devices, None, UPSERT_DEVICES, self.conn())
    }

    /// A user's registered devices.  No registrations means an empty list.
    pub fn get_devices_for(&self, user_id: Uuid) -> Result<Vec<MobileDevice>> {
        validation::require_id("user id", user_id)?;
        let set = self
            .conn()
            .query_row(
                "SELECT devices FROM devices WHERE user_id = ?1",
                params![user_id.to_string()],
                |row| DevicesSerializer::for_user(user_id).deserialize(row),
            )
            .optional()
            .map_err(error::op(REPOSITORY, "get_devices_for", &user_id))?;
        Ok(set.unwrap_or_default())
    }

    /// Unregister one device.  Returns `true` if it was present.
    pub fn delete_device(&self, user_id: Uuid, device: &MobileDevice) -> Result<bool> {
        validation::require_id("user id", user_id)?;

        let devices = self.get_devices_for(user_id)?;
        let remaining: Vec<MobileDevice> =
            devices.iter().filter(|d| *d != device).cloned().collect();

        if remaining.len() == devices.len() {
            return Ok(false);
        }

        if remaining.is_empty() {
            self.delete_all_devices_for(user_id)?;
        } else {
            DevicesSerializer::for_user(user_id).save(
                &remaining,
                None,
                UPSERT_DEVICES,
                self.conn(),
            )?;
        }
        Ok(true)
    }

    /// Unregister every device for a user.  Idempotent.
    pub fn delete_all_devices_for(&self, user_id: Uuid) -> Result<bool> {
        validation::require_id("user id", user_id)?;
        let affected = self
            .conn()
            .execute(
                "DELETE FROM devices WHERE user_id = ?1",
                params![user_id.to_string()],
            )
            .map_err(error::op(REPOSITORY, "delete_all_devices_for", &user_id))?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use aroma_model::DevicePlatform;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn device(name: &str) -> MobileDevice {
        MobileDevice {
            name: name.into(),
            platform: DevicePlatform::Android,
            device_token: format!("token-{name}"),
        }
    }

    #[test]
    fn no_registrations_yields_empty_list() {
        let db = test_db();
        assert!(db.get_devices_for(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn bulk_save_replaces_the_whole_set() {
        let db = test_db();
        let user = Uuid::new_v4();

        db.save_devices(user, &[device("old-phone")]).unwrap();
        let replacement = vec![device("pixel"), device("tablet")];
        db.save_devices(user, &replacement).unwrap();

        assert_eq!(db.get_devices_for(user).unwrap(), replacement);
    }

    #[test]
    fn single_save_appends_without_dropping_siblings() {
        let db = test_db();
        let user = Uuid::new_v4();
        db.save_devices(user, &[device("pixel")]).unwrap();

        db.save_device(user, &device("tablet")).unwrap();

        let stored = db.get_devices_for(user).unwrap();
        assert_eq!(stored, vec![device("pixel"), device("tablet")]);
    }

    #[test]
    fn duplicate_registration_is_a_noop() {
        let db = test_db();
        let user = Uuid::new_v4();

        db.save_device(user, &device("pixel")).unwrap();
        db.save_device(user, &device("pixel")).unwrap();

        assert_eq!(db.get_devices_for(user).unwrap().len(), 1);
    }

    #[test]
    fn delete_removes_one_device() {
        let db = test_db();
        let user = Uuid::new_v4();
        db.save_devices(user, &[device("pixel"), device("tablet")])
            .unwrap();

        assert!(db.delete_device(user, &device("pixel")).unwrap());
        assert_eq!(db.get_devices_for(user).unwrap(), vec![device("tablet")]);

        // Deleting it again finds nothing.
        assert!(!db.delete_device(user, &device("pixel")).unwrap());
    }

    #[test]
    fn corrupt_blob_degrades_to_empty_set() {
        let db = test_db();
        let user = Uuid::new_v4();
        db.save_devices(user, &[device("pixel")]).unwrap();

        db.conn()
            .execute(
                "UPDATE devices SET devices = '[[[' WHERE user_id = ?1",
                params![user.to_string()],
            )
            .unwrap();

        assert!(db.get_devices_for(user).unwrap().is_empty());
    }

    #[test]
    fn invalid_device_is_rejected_before_io() {
        let db = test_db();
        let user = Uuid::new_v4();
        let mut bad = device("pixel");
        bad.device_token = String::new();

        let err = db.save_device(user, &bad).unwrap_err();
        assert!(matches!(err, StoreError::InvalidArgument(_)));
        assert!(db.get_devices_for(user).unwrap().is_empty());
    }
}
