//! Token-endpoint exchanges and the background renewal task.
use super::error::AuthError;
use super::oauth::AuthCode;
use super::store::TokenStore;
use super::{ClientKeys, Provider};
use serde::Deserialize;
use std::time::Duration;

/// A (re)issued token pair.
///
/// Spotify omits `refresh_token` when answering a refresh grant; the previous
/// refresh token stays valid in that case.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: u64,
}

/// Exchanges an authorization code for the first token pair.
///
/// # Errors
/// Returns `Err(AuthError...)`:
/// * `::Net` if no response was received from the provider.
/// * `::Denied` if the provider refused the grant.
/// * `::BadData` if the response could not be parsed.
pub async fn exchange_code(
    provider: Provider,
    keys: &ClientKeys,
    code: &AuthCode,
    redirect_url: &str,
) -> Result<TokenResponse, AuthError> {
    request_tokens(
        provider,
        keys,
        &[
            ("grant_type", "authorization_code"),
            ("code", &code.0),
            ("redirect_uri", redirect_url),
        ],
    )
    .await
}

/// Exchanges a refresh token for a fresh token pair.
///
/// # Errors
/// Same as [exchange_code].
pub async fn exchange_refresh(
    provider: Provider,
    keys: &ClientKeys,
    refresh_token: &str,
) -> Result<TokenResponse, AuthError> {
    request_tokens(
        provider,
        keys,
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ],
    )
    .await
}

async fn request_tokens(
    provider: Provider,
    keys: &ClientKeys,
    grant: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    let mut params = vec![
        ("client_id", keys.client_id.as_str()),
        ("client_secret", keys.client_secret.as_str()),
    ];
    params.extend_from_slice(grant);

    let response = reqwest::Client::new()
        .post(provider.token_url())
        .form(&params)
        .send()
        .await
        .map_err(AuthError::Net)?;
    let status = response.status();
    let body = response.text().await.map_err(AuthError::Net)?;

    if !status.is_success() {
        return Err(AuthError::Denied {
            provider,
            status: status.as_u16(),
            body,
        });
    }
    serde_json::from_str(&body).map_err(AuthError::BadData)
}

/// Background renewal for one provider's credentials.
///
/// Fires at half the reported token lifetime, well before expiry. A failed
/// exchange leaves the previous (stale but possibly still usable) pair in the
/// store and waits for the next window instead of retrying immediately;
/// callers observe any fallout as 401-class failures on their own calls.
#[derive(Debug)]
pub struct Refresher {
    pub provider: Provider,
    pub keys: ClientKeys,
    pub store: TokenStore,
    /// Lifetime in seconds reported by the exchange that produced the
    /// currently stored pair.
    pub expires_in: u64,
}

impl Refresher {
    pub async fn run(self) {
        let mut expires_in = self.expires_in;
        loop {
            tokio::time::sleep(Duration::from_secs(expires_in / 2)).await;

            let Some(creds) = self.store.credentials(self.provider) else {
                continue;
            };
            match exchange_refresh(self.provider, &self.keys, &creds.refresh_token).await {
                Ok(tokens) => {
                    expires_in = tokens.expires_in;
                    let refresh_token = tokens.refresh_token.unwrap_or(creds.refresh_token);
                    self.store.set(
                        self.provider,
                        tokens.access_token,
                        refresh_token,
                        tokens.expires_in,
                    );
                    log::info!("Refreshed the {} access token", self.provider);
                }
                Err(err) => {
                    log::warn!("Could not refresh the {} access token: {err}", self.provider);
                }
            }
        }
    }
}
