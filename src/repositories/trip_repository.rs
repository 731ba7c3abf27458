// src/repositories/trip_repository.rs
//
// Visibility and aggregation for trips. The two counts are computed with
// correlated subqueries keyed by trip id; joining trips -> images -> likes
// and counting the joined rows would inflate both counts whenever a trip
// has more than one image (join fan-out).
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use uuid::Uuid;

use crate::dtos::trip_dtos::{TripFilterParams, TripOut};
use crate::errors::{ApiError, ValidationErrors};
use crate::models::trip::{Trip, TripCategory, TripStatus};
use crate::services::geocoding_services::Coordinates;
use crate::services::validation::ValidatedTrip;

const TRIP_SELECT: &str = "SELECT t.id, t.owner_id, u.username AS owner_username, t.place, \
     t.country, t.category, t.status, t.start_date, t.end_date, t.lat, t.lon, t.shared, \
     t.created_at, t.updated_at, \
     (SELECT COUNT(*) FROM images i WHERE i.trip_id = t.id) AS images_count, \
     (SELECT COUNT(*) FROM likes l JOIN images li ON li.id = l.image_id \
        WHERE li.trip_id = t.id) AS total_likes_count \
 FROM trips t \
 JOIN users u ON u.id = t.owner_id";

const TRIP_ORDER: &str = "ORDER BY t.created_at DESC, t.id DESC";

type SqlParam = Box<dyn ToSql + Sync + Send>;

pub struct TripRepository;

impl TripRepository {
    pub async fn list(
        pool: &Pool,
        requester: Option<Uuid>,
        filters: &TripFilterParams,
    ) -> Result<Vec<TripOut>, ApiError> {
        let (clauses, params) = build_trip_filters(requester, filters)?;
        let sql = format!(
            "{} WHERE {} {}",
            TRIP_SELECT,
            clauses.join(" AND "),
            TRIP_ORDER
        );

        let client = pool.get().await?;
        let refs: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();
        let rows = client.query(sql.as_str(), &refs).await?;

        rows.iter().map(row_to_trip_out).collect()
    }

    /// Fetch one trip with its aggregates. Visibility is the caller's job;
    /// this only distinguishes present from absent.
    pub async fn get_annotated(pool: &Pool, id: i64) -> Result<Option<TripOut>, ApiError> {
        let sql = format!("{} WHERE t.id = $1", TRIP_SELECT);
        let client = pool.get().await?;
        let row = client.query_opt(sql.as_str(), &[&id]).await?;

        row.as_ref().map(row_to_trip_out).transpose()
    }

    /// Raw row without aggregates, for ownership and update merging.
    pub async fn get(pool: &Pool, id: i64) -> Result<Option<Trip>, ApiError> {
        let client = pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, owner_id, place, country, category, status, start_date, \
                 end_date, lat, lon, shared, created_at, updated_at \
                 FROM trips WHERE id = $1",
                &[&id],
            )
            .await?;

        row.as_ref().map(row_to_trip).transpose()
    }

    pub async fn create(
        pool: &Pool,
        owner_id: Uuid,
        trip: &ValidatedTrip,
        coords: Coordinates,
    ) -> Result<i64, ApiError> {
        let client = pool.get().await?;
        let row = client
            .query_one(
                "INSERT INTO trips (owner_id, place, country, category, status, \
                 start_date, end_date, lat, lon, shared) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING id",
                &[
                    &owner_id,
                    &trip.place,
                    &trip.country,
                    &trip.category.as_str(),
                    &trip.status.as_str(),
                    &trip.start_date,
                    &trip.end_date,
                    &coords.lat,
                    &coords.lon,
                    &trip.shared,
                ],
            )
            .await?;

        Ok(row.try_get("id")?)
    }

    pub async fn update(
        pool: &Pool,
        id: i64,
        trip: &ValidatedTrip,
        lat: Option<f64>,
        lon: Option<f64>,
    ) -> Result<(), ApiError> {
        let client = pool.get().await?;
        client
            .execute(
                "UPDATE trips SET place = $2, country = $3, category = $4, status = $5, \
                 start_date = $6, end_date = $7, lat = $8, lon = $9, shared = $10, \
                 updated_at = now() WHERE id = $1",
                &[
                    &id,
                    &trip.place,
                    &trip.country,
                    &trip.category.as_str(),
                    &trip.status.as_str(),
                    &trip.start_date,
                    &trip.end_date,
                    &lat,
                    &lon,
                    &trip.shared,
                ],
            )
            .await?;

        Ok(())
    }

    /// Images (and their likes) go with the trip via cascade.
    pub async fn delete(pool: &Pool, id: i64) -> Result<(), ApiError> {
        let client = pool.get().await?;
        client.execute("DELETE FROM trips WHERE id = $1", &[&id]).await?;
        Ok(())
    }
}

/// Compose the WHERE clauses for the trip list: the visibility predicate
/// first, then any requested filters. Filters that require an identity are
/// skipped for anonymous requesters. Returns the clauses and the params
/// they reference, in placeholder order.
pub fn build_trip_filters(
    requester: Option<Uuid>,
    filters: &TripFilterParams,
) -> Result<(Vec<String>, Vec<SqlParam>), ValidationErrors> {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<SqlParam> = Vec::new();
    let mut errors = ValidationErrors::new();

    match requester {
        Some(user_id) => {
            params.push(Box::new(user_id));
            clauses.push(format!("(t.shared OR t.owner_id = ${})", params.len()));
        }
        None => clauses.push("t.shared".to_string()),
    }

    if let Some(username) = &filters.owner_username {
        params.push(Box::new(username.clone()));
        clauses.push(format!("u.username = ${}", params.len()));
    }

    if let Some(username) = &filters.owner_username_iexact {
        params.push(Box::new(username.clone()));
        clauses.push(format!("LOWER(u.username) = LOWER(${})", params.len()));
    }

    if let Some(country) = &filters.country {
        params.push(Box::new(country.clone()));
        clauses.push(format!("t.country = ${}", params.len()));
    }

    if let Some(place) = &filters.place {
        params.push(Box::new(place.clone()));
        clauses.push(format!("t.place = ${}", params.len()));
    }

    if let Some(raw) = &filters.category {
        match parse_multi::<TripCategory>(raw) {
            Ok(values) => {
                params.push(Box::new(values));
                clauses.push(format!("t.category = ANY(${})", params.len()));
            }
            Err(e) => errors.add("category", e),
        }
    }

    if let Some(raw) = &filters.status {
        match parse_multi::<TripStatus>(raw) {
            Ok(values) => {
                params.push(Box::new(values));
                clauses.push(format!("t.status = ANY(${})", params.len()));
            }
            Err(e) => errors.add("status", e),
        }
    }

    if let Some(start_date) = filters.start_date {
        params.push(Box::new(start_date));
        clauses.push(format!("t.start_date >= ${}", params.len()));
    }

    if let Some(end_date) = filters.end_date {
        params.push(Box::new(end_date));
        clauses.push(format!("t.end_date <= ${}", params.len()));
    }

    if filters.liked_by_user == Some(true) {
        if let Some(user_id) = requester {
            params.push(Box::new(user_id));
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM likes l JOIN images li ON li.id = l.image_id \
                 WHERE li.trip_id = t.id AND l.owner_id = ${})",
                params.len()
            ));
        }
    }

    if filters.followed_users == Some(true) {
        if let Some(user_id) = requester {
            params.push(Box::new(user_id));
            clauses.push(format!(
                "EXISTS (SELECT 1 FROM followers f \
                 WHERE f.followed_id = t.owner_id AND f.owner_id = ${})",
                params.len()
            ));
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok((clauses, params))
}

/// Comma-separated multi-select, validated against the enum.
fn parse_multi<T>(raw: &str) -> Result<Vec<String>, String>
where
    T: std::str::FromStr<Err = String>,
{
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<T>().map(|_| s.to_string()))
        .collect()
}

fn row_to_trip_out(row: &Row) -> Result<TripOut, ApiError> {
    Ok(TripOut {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        owner_username: row.try_get("owner_username")?,
        place: row.try_get("place")?,
        country: row.try_get("country")?,
        category: parse_enum(row.try_get("category")?)?,
        status: parse_enum(row.try_get("status")?)?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        lat: row.try_get("lat")?,
        lon: row.try_get("lon")?,
        shared: row.try_get("shared")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        images_count: row.try_get("images_count")?,
        total_likes_count: row.try_get("total_likes_count")?,
    })
}

fn row_to_trip(row: &Row) -> Result<Trip, ApiError> {
    Ok(Trip {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        place: row.try_get("place")?,
        country: row.try_get("country")?,
        category: parse_enum(row.try_get("category")?)?,
        status: parse_enum(row.try_get("status")?)?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        lat: row.try_get("lat")?,
        lon: row.try_get("lon")?,
        shared: row.try_get("shared")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn parse_enum<T>(stored: String) -> Result<T, ApiError>
where
    T: std::str::FromStr<Err = String>,
{
    stored
        .parse()
        .map_err(|e: String| ApiError::Internal(format!("corrupt enum value in store: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_sees_only_shared() {
        let (clauses, params) =
            build_trip_filters(None, &TripFilterParams::default()).unwrap();
        assert_eq!(clauses, vec!["t.shared".to_string()]);
        assert!(params.is_empty());
    }

    #[test]
    fn authenticated_sees_shared_or_own() {
        let (clauses, params) =
            build_trip_filters(Some(Uuid::new_v4()), &TripFilterParams::default()).unwrap();
        assert_eq!(clauses, vec!["(t.shared OR t.owner_id = $1)".to_string()]);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn identity_filters_are_noops_for_anonymous() {
        let filters = TripFilterParams {
            liked_by_user: Some(true),
            followed_users: Some(true),
            ..Default::default()
        };
        let (clauses, params) = build_trip_filters(None, &filters).unwrap();
        assert_eq!(clauses, vec!["t.shared".to_string()]);
        assert!(params.is_empty());
    }

    #[test]
    fn identity_filters_apply_for_authenticated() {
        let filters = TripFilterParams {
            liked_by_user: Some(true),
            followed_users: Some(true),
            ..Default::default()
        };
        let (clauses, params) =
            build_trip_filters(Some(Uuid::new_v4()), &filters).unwrap();
        assert_eq!(clauses.len(), 3);
        assert_eq!(params.len(), 3);
        assert!(clauses[1].contains("l.owner_id = $2"));
        assert!(clauses[2].contains("f.owner_id = $3"));
    }

    #[test]
    fn filters_compose_with_sequential_placeholders() {
        let filters = TripFilterParams {
            country: Some("USA".to_string()),
            place: Some("New York".to_string()),
            start_date: Some(chrono::NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
            end_date: Some(chrono::NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()),
            ..Default::default()
        };
        let (clauses, params) =
            build_trip_filters(Some(Uuid::new_v4()), &filters).unwrap();

        assert_eq!(
            clauses,
            vec![
                "(t.shared OR t.owner_id = $1)".to_string(),
                "t.country = $2".to_string(),
                "t.place = $3".to_string(),
                "t.start_date >= $4".to_string(),
                "t.end_date <= $5".to_string(),
            ]
        );
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn multi_select_enums_are_validated() {
        let filters = TripFilterParams {
            category: Some("Leisure,Family".to_string()),
            ..Default::default()
        };
        let (clauses, _) = build_trip_filters(None, &filters).unwrap();
        assert!(clauses.contains(&"t.category = ANY($1)".to_string()));

        let bad = TripFilterParams {
            category: Some("Leisure,Vacation".to_string()),
            ..Default::default()
        };
        let errors = build_trip_filters(None, &bad).unwrap_err();
        assert!(errors.field("category").is_some());
    }

    #[test]
    fn username_filters_exact_and_iexact() {
        let filters = TripFilterParams {
            owner_username: Some("Ada".to_string()),
            owner_username_iexact: Some("ada".to_string()),
            ..Default::default()
        };
        let (clauses, _) = build_trip_filters(None, &filters).unwrap();
        assert!(clauses.contains(&"u.username = $1".to_string()));
        assert!(clauses.contains(&"LOWER(u.username) = LOWER($2)".to_string()));
    }

    #[test]
    fn aggregate_subqueries_do_not_join_at_top_level() {
        // counts must come from correlated subqueries, not a fanned-out join
        assert!(TRIP_SELECT.contains("(SELECT COUNT(*) FROM images i WHERE i.trip_id = t.id)"));
        assert!(TRIP_SELECT.contains("(SELECT COUNT(*) FROM likes l JOIN images li"));
        assert!(!TRIP_SELECT.contains("LEFT JOIN images"));
        assert!(!TRIP_SELECT.contains("GROUP BY"));
    }
}
