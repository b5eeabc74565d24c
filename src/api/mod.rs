//! Stateless clients for the two external REST APIs.
pub mod spotify;
pub mod twitch;

/// How a provider call failed.
///
/// Clients never retry; the calling workflow decides what a failure means and
/// reports it once.
#[derive(Debug)]
pub enum ApiError {
    /// No token in the store for this provider yet. Expected at startup.
    Unauthenticated,
    /// The provider rejected the token (401). The next refresh cycle recovers.
    Unauthorized,
    /// Permission denied (403).
    Forbidden,
    /// The call was valid but there was nothing there (404).
    NotFound,
    /// 429.
    RateLimited,
    /// Any other non-success status.
    Status(u16),
    /// The response did not have the expected shape.
    Malformed(String),
    /// The request never got a usable response.
    Transport(reqwest::Error),
}

impl ApiError {
    /// Maps a failure status to its variant; `None` for success statuses.
    pub(crate) fn from_status(status: u16) -> Option<ApiError> {
        match status {
            200..=299 => None,
            401 => Some(ApiError::Unauthorized),
            403 => Some(ApiError::Forbidden),
            404 => Some(ApiError::NotFound),
            429 => Some(ApiError::RateLimited),
            other => Some(ApiError::Status(other)),
        }
    }
}

pub(crate) fn parse_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::Malformed(err.to_string()))
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Unauthenticated => f.write_str("Not authenticated with the provider yet"),
            ApiError::Unauthorized => f.write_str("The provider rejected the access token"),
            ApiError::Forbidden => f.write_str("The provider denied permission"),
            ApiError::NotFound => f.write_str("The provider had no data for the request"),
            ApiError::RateLimited => f.write_str("The provider rate-limited the request"),
            ApiError::Status(status) => {
                f.write_fmt(format_args!("The provider answered with status {status}"))
            }
            ApiError::Malformed(err) => f.write_fmt(format_args!(
                "Error parsing a response from the provider: {err}"
            )),
            ApiError::Transport(err) => {
                f.write_fmt(format_args!("Error sending a request to the provider: {err}"))
            }
        }
    }
}
impl std::error::Error for ApiError {}
impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        ApiError::Transport(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(ApiError::from_status(200).is_none());
        assert!(ApiError::from_status(204).is_none());
        assert!(matches!(ApiError::from_status(401), Some(ApiError::Unauthorized)));
        assert!(matches!(ApiError::from_status(403), Some(ApiError::Forbidden)));
        assert!(matches!(ApiError::from_status(404), Some(ApiError::NotFound)));
        assert!(matches!(ApiError::from_status(429), Some(ApiError::RateLimited)));
        assert!(matches!(ApiError::from_status(502), Some(ApiError::Status(502))));
    }
}
