//! Image metadata queries.
//!
//! This module provides the repository operations for image records:
//! insert, update, upsert-by-id, get, and list. The insert path owns the
//! `uploaded_at` timestamp; callers never supply it and updates never
//! touch it.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use picstash_common::{Error, Result};

use crate::models::{Image, NewImage};

const IMAGE_COLUMNS: &str =
    "id, title, description, image_url, public_id, location, source, uploaded_at";

/// Parse an image from a database row.
///
/// Expects columns in the `IMAGE_COLUMNS` order.
fn parse_image_row(row: &rusqlite::Row) -> rusqlite::Result<Image> {
    Ok(Image {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        image_url: row.get(3)?,
        public_id: row.get(4)?,
        location: row.get(5)?,
        source: row.get(6)?,
        uploaded_at: DateTime::parse_from_rfc3339(&row.get::<_, String>(7)?)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
            })?
            .with_timezone(&Utc),
    })
}

/// Insert a new image record.
///
/// Sets `uploaded_at` to the current time; the caller cannot influence it.
///
/// # Returns
///
/// * `Ok(Image)` - The stored record, including the generated id
/// * `Err(Error)` - If a database error occurs
pub fn insert_image(conn: &Connection, image: &NewImage) -> Result<Image> {
    let uploaded_at = Utc::now();

    conn.execute(
        "INSERT INTO images (title, description, image_url, public_id, location, source, uploaded_at)
         VALUES (:title, :description, :image_url, :public_id, :location, :source, :uploaded_at)",
        rusqlite::named_params! {
            ":title": &image.title,
            ":description": &image.description,
            ":image_url": &image.image_url,
            ":public_id": &image.public_id,
            ":location": &image.location,
            ":source": &image.source,
            ":uploaded_at": uploaded_at.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    let id = conn.last_insert_rowid();

    Ok(Image {
        id,
        title: image.title.clone(),
        description: image.description.clone(),
        image_url: image.image_url.clone(),
        public_id: image.public_id.clone(),
        location: image.location.clone(),
        source: image.source.clone(),
        uploaded_at,
    })
}

/// Update an existing image record.
///
/// `uploaded_at` is preserved as-is.
///
/// # Returns
///
/// * `Ok(Some(Image))` - The updated record
/// * `Ok(None)` - If no record with the given id exists
/// * `Err(Error)` - If a database error occurs
pub fn update_image(conn: &Connection, id: i64, image: &NewImage) -> Result<Option<Image>> {
    let rows_affected = conn
        .execute(
            "UPDATE images SET title = :title, description = :description,
                    image_url = :image_url, public_id = :public_id,
                    location = :location, source = :source
             WHERE id = :id",
            rusqlite::named_params! {
                ":id": id,
                ":title": &image.title,
                ":description": &image.description,
                ":image_url": &image.image_url,
                ":public_id": &image.public_id,
                ":location": &image.location,
                ":source": &image.source,
            },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if rows_affected == 0 {
        return Ok(None);
    }

    get_image(conn, id)
}

/// Insert or update an image record keyed by id.
///
/// With no id, a new record is inserted. With an id, the existing record
/// is updated; an unknown id is a `NotFound` error.
pub fn upsert_image(conn: &Connection, id: Option<i64>, image: &NewImage) -> Result<Image> {
    match id {
        None => insert_image(conn, image),
        Some(id) => update_image(conn, id, image)?
            .ok_or_else(|| Error::not_found(format!("image {}", id))),
    }
}

/// Get an image by id.
///
/// # Returns
///
/// * `Ok(Some(Image))` - The image if found
/// * `Ok(None)` - If the image does not exist
/// * `Err(Error)` - If a database error occurs
pub fn get_image(conn: &Connection, id: i64) -> Result<Option<Image>> {
    let result = conn.query_row(
        &format!("SELECT {} FROM images WHERE id = :id", IMAGE_COLUMNS),
        rusqlite::named_params! { ":id": id },
        parse_image_row,
    );

    match result {
        Ok(image) => Ok(Some(image)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all images in insertion order.
pub fn list_images(conn: &Connection) -> Result<Vec<Image>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM images ORDER BY id",
            IMAGE_COLUMNS
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let images = stmt
        .query_map([], parse_image_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;

    fn sample_image(title: &str) -> NewImage {
        NewImage {
            title: title.to_string(),
            description: Some("a test image".to_string()),
            image_url: format!("https://cdn.example.com/{}.jpg", title),
            public_id: None,
            location: Some("Oslo".to_string()),
            source: None,
        }
    }

    #[test]
    fn test_insert_and_get_image() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let stored = insert_image(&conn, &sample_image("sunset")).unwrap();
        assert!(stored.id > 0);

        let found = get_image(&conn, stored.id).unwrap().unwrap();
        assert_eq!(found, stored);
        assert_eq!(found.title, "sunset");
        assert_eq!(found.image_url, "https://cdn.example.com/sunset.jpg");
        assert_eq!(found.location, Some("Oslo".to_string()));
    }

    #[test]
    fn test_get_image_not_found() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let found = get_image(&conn, 99999).unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_ids_are_monotonic() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let first = insert_image(&conn, &sample_image("a")).unwrap();
        let second = insert_image(&conn, &sample_image("b")).unwrap();
        assert!(second.id > first.id);
    }

    #[test]
    fn test_list_images_insertion_order() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        insert_image(&conn, &sample_image("a")).unwrap();
        insert_image(&conn, &sample_image("b")).unwrap();
        insert_image(&conn, &sample_image("c")).unwrap();

        let images = list_images(&conn).unwrap();
        assert_eq!(images.len(), 3);
        let titles: Vec<_> = images.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_list_images_empty() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let images = list_images(&conn).unwrap();
        assert!(images.is_empty());
    }

    #[test]
    fn test_update_preserves_uploaded_at() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let stored = insert_image(&conn, &sample_image("before")).unwrap();

        let mut changed = sample_image("after");
        changed.description = Some("edited".to_string());
        let updated = update_image(&conn, stored.id, &changed).unwrap().unwrap();

        assert_eq!(updated.id, stored.id);
        assert_eq!(updated.title, "after");
        assert_eq!(updated.description, Some("edited".to_string()));
        assert_eq!(updated.uploaded_at, stored.uploaded_at);
    }

    #[test]
    fn test_update_unknown_id() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let updated = update_image(&conn, 42, &sample_image("ghost")).unwrap();
        assert!(updated.is_none());
    }

    #[test]
    fn test_upsert_inserts_without_id() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let stored = upsert_image(&conn, None, &sample_image("fresh")).unwrap();
        assert!(stored.id > 0);
        assert_eq!(list_images(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_updates_with_id() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let stored = upsert_image(&conn, None, &sample_image("v1")).unwrap();
        let updated = upsert_image(&conn, Some(stored.id), &sample_image("v2")).unwrap();

        assert_eq!(updated.id, stored.id);
        assert_eq!(updated.title, "v2");
        assert_eq!(list_images(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_unknown_id_is_not_found() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let err = upsert_image(&conn, Some(7), &sample_image("ghost")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_malformed_uploaded_at_is_an_error() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        conn.execute(
            "INSERT INTO images (title, image_url, uploaded_at)
             VALUES ('bad clock', 'https://cdn.example.com/bad.jpg', 'not-a-timestamp')",
            [],
        )
        .unwrap();
        let id = conn.last_insert_rowid();

        let err = get_image(&conn, id).unwrap_err();
        assert!(matches!(err, Error::Database(_)));

        let err = list_images(&conn).unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn test_public_id_round_trip() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();

        let mut image = sample_image("hosted");
        image.public_id = Some("picstash/hosted".to_string());
        let stored = insert_image(&conn, &image).unwrap();

        let found = get_image(&conn, stored.id).unwrap().unwrap();
        assert_eq!(found.public_id, Some("picstash/hosted".to_string()));
    }
}
