use chrono::{DateTime, Utc};

/// The live access/refresh token pair for one provider.
///
/// Exactly one instance exists per provider at any time; it is replaced as a
/// whole, never updated field by field.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}
