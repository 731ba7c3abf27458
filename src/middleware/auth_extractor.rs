// src/middleware/auth_extractor.rs
use actix_web::error::ErrorUnauthorized;
use actix_web::{Error, FromRequest, HttpRequest, dev::Payload, web};
use futures::future::{Ready, ready};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use log::debug;
use uuid::Uuid;

use crate::AppState;
use crate::models::user::JwtClaims;

/// The verified identity behind a `Bearer` token. Endpoints that allow
/// anonymous reads take `Option<AuthenticatedUser>` instead.
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<AuthenticatedUser, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let auth_header = match req.headers().get("Authorization") {
            Some(header) => match header.to_str() {
                Ok(h) => h,
                Err(_) => return ready(Err(ErrorUnauthorized("Invalid header format"))),
            },
            None => return ready(Err(ErrorUnauthorized("Missing Authorization header"))),
        };

        if !auth_header.starts_with("Bearer ") {
            return ready(Err(ErrorUnauthorized("Invalid auth header format")));
        }

        let token = auth_header.trim_start_matches("Bearer ").trim();

        let state = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state,
            None => return ready(Err(ErrorUnauthorized("Auth not configured"))),
        };

        match verify_token(token, &state.jwt_secret) {
            Ok(user_id) => {
                debug!("authenticated request from user {}", user_id);
                ready(Ok(AuthenticatedUser { user_id }))
            }
            Err(e) => {
                debug!("token rejected: {}", e);
                ready(Err(ErrorUnauthorized("Invalid token")))
            }
        }
    }
}

fn verify_token(token: &str, secret: &str) -> Result<Uuid, String> {
    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| format!("jwt error: {}", e))?;

    Uuid::parse_str(&data.claims.sub).map_err(|e| format!("invalid uuid in sub: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn make_token(sub: &str, secret: &str) -> String {
        let claims = JwtClaims {
            sub: sub.to_string(),
            exp: (chrono::Utc::now().timestamp() as u64) + 3600,
            username: Some("tester".to_string()),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn accepts_valid_token() {
        let id = Uuid::new_v4();
        let token = make_token(&id.to_string(), "s3cret");
        assert_eq!(verify_token(&token, "s3cret").unwrap(), id);
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = make_token(&Uuid::new_v4().to_string(), "s3cret");
        assert!(verify_token(&token, "other").is_err());
    }

    #[test]
    fn rejects_non_uuid_subject() {
        let token = make_token("not-a-uuid", "s3cret");
        assert!(verify_token(&token, "s3cret").is_err());
    }
}
