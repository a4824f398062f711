use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
    /// Minutes until the link expires; `0` (or absent) keeps it forever.
    #[serde(default)]
    pub expiration_in_minutes: i64,
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub short_link: String,
}

#[derive(Debug, Deserialize)]
pub struct InfoQuery {
    pub shortlink: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
