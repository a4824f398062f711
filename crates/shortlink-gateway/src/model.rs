mod url;

pub use url::{HealthResponse, InfoQuery, ShortenRequest, ShortenResponse};
