//! Repository for [`Image`] media and their thumbnail variants.
//!
//! Full-size images are keyed by media id; thumbnails by (media id, width,
//! height).  Every component of the composite thumbnail key is validated
//! independently before the lookup is built.

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use aroma_model::{Dimension, Image};

use crate::database::Database;
use crate::error::{self, Result};
use crate::serializer::{self, Serializer};
use crate::validation;

const REPOSITORY: &str = "media";
const ENTITY: &str = "media";
const THUMBNAIL: &str = "thumbnail";

const INSERT_MEDIA: &str =
    "INSERT INTO media (media_id, image_type, data) VALUES (?1, ?2, ?3)";

const INSERT_THUMBNAIL: &str = "INSERT INTO thumbnails \
     (media_id, width, height, image_type, data) VALUES (?1, ?2, ?3, ?4, ?5)";

/// Maps an [`Image`] to and from its row shape.
///
/// The identity columns (media id, dimensions) are not part of the image
/// itself, so this serializer only covers the payload columns; repositories
/// bind the key through [`Database::save_image`] / [`Database::save_thumbnail`].
pub struct ImageSerializer {
    media_id: Uuid,
    dimension: Option<Dimension>,
}

impl ImageSerializer {
    pub fn for_media(media_id: Uuid) -> Self {
        Self {
            media_id,
            dimension: None,
        }
    }

    pub fn for_thumbnail(media_id: Uuid, dimension: Dimension) -> Self {
        Self {
            media_id,
            dimension: Some(dimension),
        }
    }
}

impl Serializer for ImageSerializer {
    type Entity = Image;

    fn save(
        &self,
        image: &Image,
        _ttl: Option<chrono::Duration>,
        sql: &str,
        conn: &Connection,
    ) -> Result<()> {
        validation::require_id("media id", self.media_id)?;
        if let Some(dimension) = &self.dimension {
            validation::require_dimension(dimension)?;
        }

        let image_type = image.image_type.map(|t| t.to_string());
        let result = match &self.dimension {
            None => conn.execute(
                sql,
                params![self.media_id.to_string(), image_type, image.data],
            ),
            Some(d) => conn.execute(
                sql,
                params![
                    self.media_id.to_string(),
                    d.width,
                    d.height,
                    image_type,
                    image.data
                ],
            ),
        };

        result.map_err(error::op(REPOSITORY, "save", &self.media_id))?;
        Ok(())
    }

    fn deserialize(&self, row: &Row<'_>) -> rusqlite::Result<Image> {
        Ok(Image {
            image_type: serializer::parse_enum_lenient("image_type", row.get(0)?),
            data: row.get(1)?,
        })
    }
}

impl Database {
    /// Store a full-size image.  Re-saving an existing media id is a conflict.
    pub fn save_image(&self, media_id: Uuid, image: &Image) -> Result<()> {
        validation::require_id("media id", media_id)?;
        ImageSerializer::for_media(media_id).save(image, None, INSERT_MEDIA, self.conn())
    }

    /// Fetch a full-size image by media id.
    pub fn get_image(&self, media_id: Uuid) -> Result<Image> {
        validation::require_id("media id", media_id)?;
        self.conn()
            .query_row(
                "SELECT image_type, data FROM media WHERE media_id = ?1",
                params![media_id.to_string()],
                |row| ImageSerializer::for_media(media_id).deserialize(row),
            )
            .map_err(|e| {
                error::single_row(
                    REPOSITORY,
                    "get_image",
                    &media_id,
                    error::does_not_exist(ENTITY),
                    e,
                )
            })
    }

    /// Whether an image with this media id exists.
    pub fn contains_image(&self, media_id: Uuid) -> Result<bool> {
        validation::require_id("media id", media_id)?;
        let count: i64 = self
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM media WHERE media_id = ?1",
                params![media_id.to_string()],
                |row| row.get(0),
            )
            .map_err(error::op(REPOSITORY, "contains_image", &media_id))?;
        Ok(count > 0)
    }

    /// Delete an image and all of its thumbnails.  Idempotent.
    pub fn delete_image(&self, media_id: Uuid) -> Result<bool> {
        validation::require_id("media id", media_id)?;
        self.conn()
            .execute(
                "DELETE FROM thumbnails WHERE media_id = ?1",
                params![media_id.to_string()],
            )
            .map_err(error::op(REPOSITORY, "delete_image", &media_id))?;
        let affected = self
            .conn()
            .execute(
                "DELETE FROM media WHERE media_id = ?1",
                params![media_id.to_string()],
            )
            .map_err(error::op(REPOSITORY, "delete_image", &media_id))?;
        Ok(affected > 0)
    }

    /// Store a thumbnail variant for a media id.
    pub fn save_thumbnail(
        &self,
        media_id: Uuid,
        dimension: Dimension,
        image: &Image,
    ) -> Result<()> {
        validation::require_id("media id", media_id)?;
        validation::require_dimension(&dimension)?;
        ImageSerializer::for_thumbnail(media_id, dimension).save(
            image,
            None,
            INSERT_THUMBNAIL,
            self.conn(),
        )
    }

    /// Fetch a thumbnail variant.
    pub fn get_thumbnail(&self, media_id: Uuid, dimension: Dimension) -> Result<Image> {
        validation::require_id("media id", media_id)?;
        validation::require_dimension(&dimension)?;
        self.conn()
            .query_row(
                "SELECT image_type, data FROM thumbnails \
                 WHERE media_id = ?1 AND width = ?2 AND height = ?3",
                params![media_id.to_string(), dimension.width, dimension.height],
                |row| ImageSerializer::for_thumbnail(media_id, dimension).deserialize(row),
            )
            .map_err(|e| {
                error::single_row(
                    REPOSITORY,
                    "get_thumbnail",
                    &media_id,
                    error::does_not_exist(THUMBNAIL),
                    e,
                )
            })
    }

    /// Delete one thumbnail variant.  Idempotent.
    pub fn delete_thumbnail(&self, media_id: Uuid, dimension: Dimension) -> Result<bool> {
        validation::require_id("media id", media_id)?;
        validation::require_dimension(&dimension)?;
        let affected = self
            .conn()
            .execute(
                "DELETE FROM thumbnails WHERE media_id = ?1 AND width = ?2 AND height = ?3",
                params![media_id.to_string(), dimension.width, dimension.height],
            )
            .map_err(error::op(REPOSITORY, "delete_thumbnail", &media_id))?;
        Ok(affected > 0)
    }
}
