// src/repositories/follower_repository.rs
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::dtos::follower_dtos::FollowerOut;
use crate::errors::ApiError;
use crate::models::follower::Follower;
use crate::repositories::constraint_error;

const FOLLOWER_SELECT: &str = "SELECT f.id, f.owner_id, uo.username AS owner_username, \
     f.followed_id, uf.username AS followed_name, f.created_at \
 FROM followers f \
 JOIN users uo ON uo.id = f.owner_id \
 JOIN users uf ON uf.id = f.followed_id";

pub struct FollowerRepository;

impl FollowerRepository {
    pub async fn list(pool: &Pool) -> Result<Vec<FollowerOut>, ApiError> {
        let sql = format!("{} ORDER BY f.created_at DESC, f.id DESC", FOLLOWER_SELECT);
        let client = pool.get().await?;
        let rows = client.query(sql.as_str(), &[]).await?;

        rows.iter().map(row_to_follower_out).collect()
    }

    pub async fn get(pool: &Pool, id: i64) -> Result<Option<Follower>, ApiError> {
        let client = pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, owner_id, followed_id, created_at FROM followers WHERE id = $1",
                &[&id],
            )
            .await?;

        row.map(|r| {
            Ok(Follower {
                id: r.try_get("id")?,
                owner_id: r.try_get("owner_id")?,
                followed_id: r.try_get("followed_id")?,
                created_at: r.try_get("created_at")?,
            })
        })
        .transpose()
    }

    pub async fn get_out(pool: &Pool, id: i64) -> Result<Option<FollowerOut>, ApiError> {
        let sql = format!("{} WHERE f.id = $1", FOLLOWER_SELECT);
        let client = pool.get().await?;
        let row = client.query_opt(sql.as_str(), &[&id]).await?;

        row.as_ref().map(row_to_follower_out).transpose()
    }

    /// Self-follow is rejected by the handler before this runs; the unique
    /// pair constraint catches duplicates, including concurrent ones.
    pub async fn create(pool: &Pool, owner_id: Uuid, followed_id: Uuid) -> Result<i64, ApiError> {
        let client = pool.get().await?;
        let result = client
            .query_one(
                "INSERT INTO followers (owner_id, followed_id) VALUES ($1, $2) RETURNING id",
                &[&owner_id, &followed_id],
            )
            .await;

        match result {
            Ok(row) => Ok(row.try_get("id")?),
            Err(e) => Err(constraint_error(
                e,
                "You are already following this user.",
                "followed",
                "user does not exist",
            )),
        }
    }

    pub async fn delete(pool: &Pool, id: i64) -> Result<(), ApiError> {
        let client = pool.get().await?;
        client
            .execute("DELETE FROM followers WHERE id = $1", &[&id])
            .await?;
        Ok(())
    }
}

fn row_to_follower_out(row: &Row) -> Result<FollowerOut, ApiError> {
    Ok(FollowerOut {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        owner_username: row.try_get("owner_username")?,
        followed: row.try_get("followed_id")?,
        followed_name: row.try_get("followed_name")?,
        created_at: row.try_get("created_at")?,
    })
}
