//! DTOs for link shortening endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten.
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,
}

/// Short URL created (or already held) for a single request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub result: String,
}

/// One entry of a batch shorten request.
///
/// Entries whose URL fails validation are dropped from the batch rather than
/// failing it.
#[derive(Debug, Deserialize, Validate)]
pub struct BatchShortenItem {
    #[validate(length(min = 1, max = 100))]
    pub correlation_id: String,

    #[validate(url(message = "Invalid URL format"))]
    pub original_url: String,
}

/// One stored entry of a batch shorten response.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchShortenResult {
    pub correlation_id: String,
    pub short_url: String,
}
