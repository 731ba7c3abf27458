// src/repositories/profile_repository.rs
use deadpool_postgres::Pool;
use tokio_postgres::Row;

use crate::dtos::profile_dtos::ProfileOut;
use crate::errors::ApiError;

const PROFILE_SELECT: &str = "SELECT p.id, p.user_id, u.username, p.display_name, p.bio, \
     p.image_url, p.created_at, p.updated_at \
 FROM profiles p \
 JOIN users u ON u.id = p.user_id";

pub struct ProfileRepository;

impl ProfileRepository {
    pub async fn list(pool: &Pool) -> Result<Vec<ProfileOut>, ApiError> {
        let sql = format!("{} ORDER BY p.created_at DESC, p.id DESC", PROFILE_SELECT);
        let client = pool.get().await?;
        let rows = client.query(sql.as_str(), &[]).await?;

        rows.iter().map(row_to_profile_out).collect()
    }

    pub async fn get(pool: &Pool, id: i64) -> Result<Option<ProfileOut>, ApiError> {
        let sql = format!("{} WHERE p.id = $1", PROFILE_SELECT);
        let client = pool.get().await?;
        let row = client.query_opt(sql.as_str(), &[&id]).await?;

        row.as_ref().map(row_to_profile_out).transpose()
    }

    /// Missing fields keep their stored value.
    pub async fn update(
        pool: &Pool,
        id: i64,
        display_name: Option<&str>,
        bio: Option<&str>,
    ) -> Result<(), ApiError> {
        let client = pool.get().await?;
        client
            .execute(
                "UPDATE profiles SET display_name = COALESCE($2, display_name), \
                 bio = COALESCE($3, bio), updated_at = now() WHERE id = $1",
                &[&id, &display_name, &bio],
            )
            .await?;

        Ok(())
    }
}

fn row_to_profile_out(row: &Row) -> Result<ProfileOut, ApiError> {
    Ok(ProfileOut {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        display_name: row.try_get("display_name")?,
        bio: row.try_get("bio")?,
        image_url: row.try_get("image_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
