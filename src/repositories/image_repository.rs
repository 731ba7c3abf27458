// src/repositories/image_repository.rs
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::dtos::image_dtos::ImageOut;
use crate::errors::ApiError;
use crate::models::image::Image;

// likes_count is a correlated subquery so a second like never duplicates
// the image row
const IMAGE_SELECT: &str = "SELECT i.id, i.owner_id, u.username AS owner_username, i.trip_id, \
     i.title, i.description, i.file_name, i.url, i.shared, i.uploaded_at, \
     (SELECT COUNT(*) FROM likes l WHERE l.image_id = i.id) AS likes_count \
 FROM images i \
 JOIN users u ON u.id = i.owner_id";

const IMAGE_ORDER: &str = "ORDER BY i.uploaded_at DESC, i.id DESC";

pub struct ImageRepository;

impl ImageRepository {
    /// Images of one trip. `include_private` is true when the requester
    /// owns the trip; otherwise only shared images come back.
    pub async fn list_for_trip(
        pool: &Pool,
        trip_id: i64,
        include_private: bool,
    ) -> Result<Vec<ImageOut>, ApiError> {
        let sql = format!(
            "{} WHERE i.trip_id = $1 AND (i.shared OR $2) {}",
            IMAGE_SELECT, IMAGE_ORDER
        );
        let client = pool.get().await?;
        let rows = client.query(sql.as_str(), &[&trip_id, &include_private]).await?;

        rows.iter().map(row_to_image_out).collect()
    }

    /// The public gallery: every shared image, regardless of requester.
    pub async fn gallery(pool: &Pool) -> Result<Vec<ImageOut>, ApiError> {
        let sql = format!("{} WHERE i.shared {}", IMAGE_SELECT, IMAGE_ORDER);
        let client = pool.get().await?;
        let rows = client.query(sql.as_str(), &[]).await?;

        rows.iter().map(row_to_image_out).collect()
    }

    pub async fn get_for_trip(
        pool: &Pool,
        trip_id: i64,
        image_id: i64,
    ) -> Result<Option<ImageOut>, ApiError> {
        let sql = format!("{} WHERE i.trip_id = $1 AND i.id = $2", IMAGE_SELECT);
        let client = pool.get().await?;
        let row = client.query_opt(sql.as_str(), &[&trip_id, &image_id]).await?;

        row.as_ref().map(row_to_image_out).transpose()
    }

    pub async fn get(pool: &Pool, id: i64) -> Result<Option<Image>, ApiError> {
        let client = pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, owner_id, trip_id, title, description, file_name, url, \
                 shared, uploaded_at FROM images WHERE id = $1",
                &[&id],
            )
            .await?;

        row.as_ref().map(row_to_image).transpose()
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &Pool,
        owner_id: Uuid,
        trip_id: i64,
        title: &str,
        description: &str,
        file_name: &str,
        url: &str,
        shared: bool,
    ) -> Result<i64, ApiError> {
        let client = pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO images (owner_id, trip_id, title, description, file_name, \
                 url, shared) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
                &[
                    &owner_id,
                    &trip_id,
                    &title,
                    &description,
                    &file_name,
                    &url,
                    &shared,
                ],
            )
            .await?;

        Ok(row.try_get("id")?)
    }

    pub async fn update(
        pool: &Pool,
        id: i64,
        title: &str,
        description: &str,
        shared: bool,
    ) -> Result<(), ApiError> {
        let client = pool.get().await?;
        client
            .execute(
                "UPDATE images SET title = $2, description = $3, shared = $4 WHERE id = $1",
                &[&id, &title, &description, &shared],
            )
            .await?;

        Ok(())
    }

    pub async fn delete(pool: &Pool, id: i64) -> Result<(), ApiError> {
        let client = pool.get().await?;
        client.execute("DELETE FROM images WHERE id = $1", &[&id]).await?;
        Ok(())
    }
}

fn row_to_image_out(row: &Row) -> Result<ImageOut, ApiError> {
    Ok(ImageOut {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        owner_username: row.try_get("owner_username")?,
        trip_id: row.try_get("trip_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        url: row.try_get("url")?,
        shared: row.try_get("shared")?,
        uploaded_at: row.try_get("uploaded_at")?,
        likes_count: row.try_get("likes_count")?,
    })
}

fn row_to_image(row: &Row) -> Result<Image, ApiError> {
    Ok(Image {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        trip_id: row.try_get("trip_id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        file_name: row.try_get("file_name")?,
        url: row.try_get("url")?,
        shared: row.try_get("shared")?,
        uploaded_at: row.try_get("uploaded_at")?,
    })
}
