// src/repositories/like_repository.rs
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::dtos::like_dtos::LikeOut;
use crate::errors::ApiError;
use crate::models::like::Like;
use crate::repositories::constraint_error;

const LIKE_SELECT: &str = "SELECT l.id, l.owner_id, u.username AS owner_username, l.image_id, \
     l.created_at \
 FROM likes l \
 JOIN users u ON u.id = l.owner_id";

pub struct LikeRepository;

impl LikeRepository {
    pub async fn list(pool: &Pool) -> Result<Vec<LikeOut>, ApiError> {
        let sql = format!("{} ORDER BY l.created_at DESC, l.id DESC", LIKE_SELECT);
        let client = pool.get().await?;
        let rows = client.query(sql.as_str(), &[]).await?;

        rows.iter().map(row_to_like_out).collect()
    }

    pub async fn get(pool: &Pool, id: i64) -> Result<Option<Like>, ApiError> {
        let client = pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, owner_id, image_id, created_at FROM likes WHERE id = $1",
                &[&id],
            )
            .await?;

        row.map(|r| {
            Ok(Like {
                id: r.try_get("id")?,
                owner_id: r.try_get("owner_id")?,
                image_id: r.try_get("image_id")?,
                created_at: r.try_get("created_at")?,
            })
        })
        .transpose()
    }

    pub async fn get_out(pool: &Pool, id: i64) -> Result<Option<LikeOut>, ApiError> {
        let sql = format!("{} WHERE l.id = $1", LIKE_SELECT);
        let client = pool.get().await?;
        let row = client.query_opt(sql.as_str(), &[&id]).await?;

        row.as_ref().map(row_to_like_out).transpose()
    }

    /// Insert a like; the (owner, image) unique constraint turns a
    /// duplicate into a validation error instead of a second row.
    pub async fn create(pool: &Pool, owner_id: Uuid, image_id: i64) -> Result<i64, ApiError> {
        let client = pool.get().await?;
        let result = client
            .query_one(
                "INSERT INTO likes (owner_id, image_id) VALUES ($1, $2) RETURNING id",
                &[&owner_id, &image_id],
            )
            .await;

        match result {
            Ok(row) => Ok(row.try_get("id")?),
            Err(e) => Err(constraint_error(
                e,
                "You have already liked this image.",
                "image",
                "image does not exist",
            )),
        }
    }

    pub async fn delete(pool: &Pool, id: i64) -> Result<(), ApiError> {
        let client = pool.get().await?;
        client.execute("DELETE FROM likes WHERE id = $1", &[&id]).await?;
        Ok(())
    }
}

fn row_to_like_out(row: &Row) -> Result<LikeOut, ApiError> {
    Ok(LikeOut {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        owner_username: row.try_get("owner_username")?,
        image: row.try_get("image_id")?,
        created_at: row.try_get("created_at")?,
    })
}
