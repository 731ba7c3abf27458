use serde::{Deserialize, Serialize};

/// Claims we care about in the bearer token issued by the auth provider.
/// Token issuance is out of scope; we only verify and read.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// subject / user id
    pub sub: String,
    pub exp: u64,
    pub username: Option<String>,
}
