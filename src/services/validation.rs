// src/services/validation.rs - field validation for trips
//
// Cheap field checks run first and are collected together; the geocoding
// call only happens once every field check has passed, so a bad date range
// never costs a network round trip.
use chrono::NaiveDate;

use crate::dtos::trip_dtos::{CreateTripDTO, UpdateTripDTO};
use crate::errors::ValidationErrors;
use crate::models::trip::{Trip, TripCategory, TripStatus};

pub const PLACE_MIN_LEN: usize = 2;
pub const PLACE_MAX_LEN: usize = 100;
pub const COUNTRY_MIN_LEN: usize = 2;
pub const COUNTRY_MAX_LEN: usize = 56;

/// A trip payload that passed every field check. `category`/`status` are
/// parsed, dates are ordered. Coordinates still come from the geocoder.
#[derive(Debug, Clone)]
pub struct ValidatedTrip {
    pub place: String,
    pub country: String,
    pub category: TripCategory,
    pub status: TripStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub shared: bool,
}

pub fn validate_new_trip(dto: &CreateTripDTO) -> Result<ValidatedTrip, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let place = dto.place.trim().to_string();
    let country = dto.country.trim().to_string();

    check_length(&mut errors, "place", &place, PLACE_MIN_LEN, PLACE_MAX_LEN);
    check_length(
        &mut errors,
        "country",
        &country,
        COUNTRY_MIN_LEN,
        COUNTRY_MAX_LEN,
    );

    let category = parse_category(&mut errors, &dto.category);
    let status = parse_status(&mut errors, &dto.status);

    if dto.start_date > dto.end_date {
        errors.add_non_field("start date must be on or before end date");
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedTrip {
        place,
        country,
        // both are Some once errors is empty
        category: category.unwrap_or(TripCategory::Leisure),
        status: status.unwrap_or(TripStatus::Planned),
        start_date: dto.start_date,
        end_date: dto.end_date,
        shared: dto.shared,
    })
}

/// Merge a partial update onto the stored trip, then run the same checks
/// as for creation.
pub fn validate_trip_update(
    dto: &UpdateTripDTO,
    existing: &Trip,
) -> Result<ValidatedTrip, ValidationErrors> {
    let merged = CreateTripDTO {
        place: dto.place.clone().unwrap_or_else(|| existing.place.clone()),
        country: dto
            .country
            .clone()
            .unwrap_or_else(|| existing.country.clone()),
        category: dto
            .category
            .clone()
            .unwrap_or_else(|| existing.category.as_str().to_string()),
        status: dto
            .status
            .clone()
            .unwrap_or_else(|| existing.status.as_str().to_string()),
        start_date: dto.start_date.unwrap_or(existing.start_date),
        end_date: dto.end_date.unwrap_or(existing.end_date),
        shared: dto.shared.unwrap_or(existing.shared),
    };

    validate_new_trip(&merged)
}

fn check_length(errors: &mut ValidationErrors, field: &str, value: &str, min: usize, max: usize) {
    let len = value.chars().count();
    if len < min {
        errors.add(
            field,
            format!("must be at least {} characters long", min),
        );
    } else if len > max {
        errors.add(field, format!("must be at most {} characters long", max));
    }
}

fn parse_category(errors: &mut ValidationErrors, value: &str) -> Option<TripCategory> {
    match value.parse() {
        Ok(category) => Some(category),
        Err(e) => {
            errors.add("category", e);
            None
        }
    }
}

fn parse_status(errors: &mut ValidationErrors, value: &str) -> Option<TripStatus> {
    match value.parse() {
        Ok(status) => Some(status),
        Err(e) => {
            errors.add("status", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::NON_FIELD_ERRORS;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn valid_dto() -> CreateTripDTO {
        CreateTripDTO {
            place: "New York".to_string(),
            country: "USA".to_string(),
            category: "Adventure".to_string(),
            status: "Planned".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            shared: true,
        }
    }

    fn stored_trip() -> Trip {
        Trip {
            id: 1,
            owner_id: Uuid::new_v4(),
            place: "New York".to_string(),
            country: "USA".to_string(),
            category: TripCategory::Adventure,
            status: TripStatus::Planned,
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            lat: Some(40.7128),
            lon: Some(-74.0060),
            shared: true,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn accepts_a_valid_trip() {
        let validated = validate_new_trip(&valid_dto()).unwrap();
        assert_eq!(validated.category, TripCategory::Adventure);
        assert_eq!(validated.status, TripStatus::Planned);
    }

    #[test]
    fn reversed_dates_are_a_non_field_error() {
        let mut dto = valid_dto();
        dto.start_date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        dto.end_date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let errors = validate_new_trip(&dto).unwrap_err();
        assert!(errors.field(NON_FIELD_ERRORS).is_some());
    }

    #[test]
    fn errors_are_collected_not_fail_fast() {
        let mut dto = valid_dto();
        dto.place = "x".to_string();
        dto.country = "y".to_string();
        dto.category = "Vacation".to_string();
        dto.start_date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        dto.end_date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let errors = validate_new_trip(&dto).unwrap_err();
        assert!(errors.field("place").is_some());
        assert!(errors.field("country").is_some());
        assert!(errors.field("category").is_some());
        assert!(errors.field(NON_FIELD_ERRORS).is_some());
    }

    #[test]
    fn country_upper_bound_enforced() {
        let mut dto = valid_dto();
        dto.country = "a".repeat(57);
        let errors = validate_new_trip(&dto).unwrap_err();
        assert!(errors.field("country").is_some());
    }

    #[test]
    fn update_merges_missing_fields_from_existing() {
        let dto = UpdateTripDTO {
            place: None,
            country: None,
            category: Some("Family".to_string()),
            status: None,
            start_date: None,
            end_date: None,
            shared: Some(false),
        };

        let validated = validate_trip_update(&dto, &stored_trip()).unwrap();
        assert_eq!(validated.place, "New York");
        assert_eq!(validated.category, TripCategory::Family);
        assert_eq!(validated.status, TripStatus::Planned);
        assert!(!validated.shared);
    }

    #[test]
    fn update_cannot_reverse_dates() {
        let dto = UpdateTripDTO {
            place: None,
            country: None,
            category: None,
            status: None,
            start_date: Some(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()),
            end_date: None,
            shared: None,
        };

        let errors = validate_trip_update(&dto, &stored_trip()).unwrap_err();
        assert!(errors.field(NON_FIELD_ERRORS).is_some());
    }
}
