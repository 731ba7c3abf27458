use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const TRIP_CATEGORIES: &[&str] = &["Leisure", "Business", "Adventure", "Family", "Romantic"];
pub const TRIP_STATUSES: &[&str] = &["Completed", "Ongoing", "Planned"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripCategory {
    Leisure,
    Business,
    Adventure,
    Family,
    Romantic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripStatus {
    Completed,
    Ongoing,
    Planned,
}

impl TripCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripCategory::Leisure => "Leisure",
            TripCategory::Business => "Business",
            TripCategory::Adventure => "Adventure",
            TripCategory::Family => "Family",
            TripCategory::Romantic => "Romantic",
        }
    }
}

impl FromStr for TripCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Leisure" => Ok(TripCategory::Leisure),
            "Business" => Ok(TripCategory::Business),
            "Adventure" => Ok(TripCategory::Adventure),
            "Family" => Ok(TripCategory::Family),
            "Romantic" => Ok(TripCategory::Romantic),
            other => Err(format!("'{}' is not a valid trip category", other)),
        }
    }
}

impl fmt::Display for TripCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Completed => "Completed",
            TripStatus::Ongoing => "Ongoing",
            TripStatus::Planned => "Planned",
        }
    }
}

impl FromStr for TripStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Completed" => Ok(TripStatus::Completed),
            "Ongoing" => Ok(TripStatus::Ongoing),
            "Planned" => Ok(TripStatus::Planned),
            other => Err(format!("'{}' is not a valid trip status", other)),
        }
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `trips` row as stored. Aggregate counts live on the outgoing DTO,
/// not here.
#[derive(Debug, Clone, Serialize)]
pub struct Trip {
    pub id: i64,
    pub owner_id: Uuid,
    pub place: String,
    pub country: String,
    pub category: TripCategory,
    pub status: TripStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_round_trips_through_str() {
        for name in TRIP_CATEGORIES {
            let parsed: TripCategory = name.parse().unwrap();
            assert_eq!(parsed.as_str(), *name);
        }
        assert!("leisure".parse::<TripCategory>().is_err());
        assert!("Vacation".parse::<TripCategory>().is_err());
    }

    #[test]
    fn status_round_trips_through_str() {
        for name in TRIP_STATUSES {
            let parsed: TripStatus = name.parse().unwrap();
            assert_eq!(parsed.as_str(), *name);
        }
        assert!("planned".parse::<TripStatus>().is_err());
    }
}
