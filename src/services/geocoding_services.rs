// src/services/geocoding_services.rs - place-name lookup with bounded retry
use std::env;
use std::time::Duration;

use log::warn;
use serde::Deserialize;
use thiserror::Error;

const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_TIMEOUT_MS: u64 = 5000;
const DEFAULT_MAX_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// per-attempt timeout; total wall-clock cost is bounded by
    /// `max_attempts * timeout`
    pub timeout: Duration,
    pub max_attempts: u32,
}

impl GeocoderConfig {
    pub fn from_env() -> Self {
        let base_url = env::var("GEOCODER_URL")
            .unwrap_or_else(|_| DEFAULT_GEOCODER_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeout_ms = env::var("GEOCODER_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let max_attempts = env::var("GEOCODER_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);

        Self {
            base_url,
            timeout: Duration::from_millis(timeout_ms),
            max_attempts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeocodeError {
    /// The service answered cleanly but found nothing for the place.
    /// Not transient, never retried.
    #[error("could not find a location matching this place")]
    LocationNotFound,
    /// Timed out `max_attempts` times, or failed with a non-timeout
    /// transport or HTTP error.
    #[error("geocoding service unavailable")]
    Unavailable,
}

#[derive(Deserialize)]
struct GeocoderMatch {
    lat: String,
    lon: String,
}

/// Resolve a place name to coordinates.
///
/// Timeouts are retried with a fresh, identical request up to
/// `config.max_attempts`. An empty match list comes back as
/// `LocationNotFound` immediately; any other failure is `Unavailable`.
pub async fn geocode(
    client: &reqwest::Client,
    config: &GeocoderConfig,
    place: &str,
) -> Result<Coordinates, GeocodeError> {
    let url = format!(
        "{}/search?q={}&format=json&limit=1&accept-language=en",
        config.base_url.trim_end_matches('/'),
        urlencoding::encode(place)
    );

    for attempt in 1..=config.max_attempts {
        let response = match client.get(&url).timeout(config.timeout).send().await {
            Ok(resp) => resp,
            Err(e) if e.is_timeout() => {
                warn!(
                    "geocoding attempt {}/{} for '{}' timed out",
                    attempt, config.max_attempts, place
                );
                continue;
            }
            Err(e) => {
                warn!("geocoding request for '{}' failed: {}", place, e);
                return Err(GeocodeError::Unavailable);
            }
        };

        if !response.status().is_success() {
            warn!(
                "geocoder answered {} for '{}'",
                response.status(),
                place
            );
            return Err(GeocodeError::Unavailable);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => {
                warn!(
                    "geocoding attempt {}/{} for '{}' timed out reading body",
                    attempt, config.max_attempts, place
                );
                continue;
            }
            Err(e) => {
                warn!("geocoding response for '{}' unreadable: {}", place, e);
                return Err(GeocodeError::Unavailable);
            }
        };

        return match parse_coordinates(&body) {
            Ok(Some(coords)) => Ok(coords),
            Ok(None) => Err(GeocodeError::LocationNotFound),
            Err(e) => {
                warn!("geocoder returned malformed body for '{}': {}", place, e);
                Err(GeocodeError::Unavailable)
            }
        };
    }

    warn!(
        "geocoding '{}' gave up after {} attempts",
        place, config.max_attempts
    );
    Err(GeocodeError::Unavailable)
}

fn parse_coordinates(body: &str) -> Result<Option<Coordinates>, String> {
    let matches: Vec<GeocoderMatch> =
        serde_json::from_str(body).map_err(|e| format!("invalid json: {}", e))?;

    let Some(first) = matches.into_iter().next() else {
        return Ok(None);
    };

    let lat: f64 = first
        .lat
        .parse()
        .map_err(|e| format!("bad latitude '{}': {}", first.lat, e))?;
    let lon: f64 = first
        .lon
        .parse()
        .map_err(|e| format!("bad longitude '{}': {}", first.lon, e))?;

    Ok(Some(Coordinates { lat, lon }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::io::Write;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MATCH_BODY: &str = r#"[{"lat":"48.8566","lon":"2.3522","display_name":"Paris"}]"#;

    fn test_config(base_url: String) -> GeocoderConfig {
        GeocoderConfig {
            base_url,
            timeout: Duration::from_millis(100),
            max_attempts: 5,
        }
    }

    #[test]
    fn parses_first_match() {
        let coords = parse_coordinates(MATCH_BODY).unwrap().unwrap();
        assert_eq!(coords.lat, 48.8566);
        assert_eq!(coords.lon, 2.3522);
    }

    #[test]
    fn empty_list_is_no_match() {
        assert_eq!(parse_coordinates("[]").unwrap(), None);
    }

    #[test]
    fn malformed_body_is_an_error() {
        assert!(parse_coordinates("not json").is_err());
        assert!(parse_coordinates(r#"[{"lat":"x","lon":"2.0"}]"#).is_err());
    }

    #[tokio::test]
    async fn match_on_first_call_makes_one_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_body(MATCH_BODY)
            .expect(1)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let config = test_config(server.url());
        let coords = geocode(&client, &config, "Paris").await.unwrap();

        assert_eq!(coords.lat, 48.8566);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn no_match_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_body("[]")
            .expect(1)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let config = test_config(server.url());
        let err = geocode(&client, &config, "Nowhereville").await.unwrap_err();

        assert_eq!(err, GeocodeError::LocationNotFound);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn two_timeouts_then_success_takes_three_calls() {
        let mut server = mockito::Server::new_async().await;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_chunked_body(move |w| {
                // first two responses stall past the client timeout
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    std::thread::sleep(Duration::from_millis(400));
                }
                w.write_all(MATCH_BODY.as_bytes())
            })
            .expect(3)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let config = test_config(server.url());
        let coords = geocode(&client, &config, "Paris").await.unwrap();

        assert_eq!(coords.lon, 2.3522);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_chunked_body(|w| {
                std::thread::sleep(Duration::from_millis(400));
                w.write_all(b"[]")
            })
            .expect(3)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let mut config = test_config(server.url());
        config.max_attempts = 3;
        let err = geocode(&client, &config, "Paris").await.unwrap_err();

        assert_eq!(err, GeocodeError::Unavailable);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_is_unavailable_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(Matcher::Any)
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let config = test_config(server.url());
        let err = geocode(&client, &config, "Paris").await.unwrap_err();

        assert_eq!(err, GeocodeError::Unavailable);
        mock.assert_async().await;
    }
}
