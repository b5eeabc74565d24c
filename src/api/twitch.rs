//! Helix endpoints the bot needs: liveness, user lookup, clip create/poll.
use super::ApiError;
use crate::auth::store::TokenStore;
use crate::auth::Provider;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

const STREAMS_URL: &str = "https://api.twitch.tv/helix/streams";
const USERS_URL: &str = "https://api.twitch.tv/helix/users";
const CLIPS_URL: &str = "https://api.twitch.tv/helix/clips";

/// Auth context for Helix calls: the app's client id plus the live store.
///
/// Tokens are read from the store on every call, never cached here.
#[derive(Debug, Clone)]
pub struct Helix {
    pub client_id: String,
    pub store: TokenStore,
}

impl Helix {
    fn bearer(&self) -> Result<String, ApiError> {
        self.store
            .token(Provider::Twitch)
            .map(|token| format!("Bearer {token}"))
            .ok_or(ApiError::Unauthenticated)
    }
}

#[derive(Debug, Deserialize)]
struct Data<T> {
    data: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
}

/// A clip record as returned by clip lookup. `url` stays null until the clip
/// is playable.
#[derive(Debug, Clone, Deserialize)]
pub struct Clip {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedClip {
    id: String,
}

/// Whether the channel with this login is currently streaming.
pub async fn stream_is_live(login: &str, helix: &Helix) -> Result<bool, ApiError> {
    let response = Client::new()
        .get(format!("{STREAMS_URL}?user_login={login}"))
        .header("Client-Id", &helix.client_id)
        .header("Authorization", helix.bearer()?)
        .send()
        .await?;
    if let Some(err) = ApiError::from_status(response.status().as_u16()) {
        return Err(err);
    }

    let body = response.text().await?;
    let streams: Data<Value> = super::parse_json(&body)?;
    Ok(!streams.data.is_empty())
}

/// Resolves a channel login to its broadcaster id.
pub async fn broadcaster_from_login(login: &str, helix: &Helix) -> Result<String, ApiError> {
    let response = Client::new()
        .get(format!("{USERS_URL}?login={login}"))
        .header("Client-Id", &helix.client_id)
        .header("Authorization", helix.bearer()?)
        .send()
        .await?;
    if let Some(err) = ApiError::from_status(response.status().as_u16()) {
        return Err(err);
    }

    let body = response.text().await?;
    let users: Data<User> = super::parse_json(&body)?;
    users
        .data
        .into_iter()
        .next()
        .map(|user| user.id)
        .ok_or(ApiError::NotFound)
}

/// Asks Twitch to start generating a clip. Returns the clip id to poll;
/// generation itself is asynchronous on Twitch's side.
pub async fn create_clip(broadcaster_id: &str, helix: &Helix) -> Result<String, ApiError> {
    let response = Client::new()
        .post(format!("{CLIPS_URL}?broadcaster_id={broadcaster_id}"))
        .header("Client-Id", &helix.client_id)
        .header("Authorization", helix.bearer()?)
        .send()
        .await?;
    if let Some(err) = ApiError::from_status(response.status().as_u16()) {
        return Err(err);
    }

    let body = response.text().await?;
    let created: Data<CreatedClip> = super::parse_json(&body)?;
    created
        .data
        .into_iter()
        .next()
        .map(|clip| clip.id)
        .ok_or_else(|| ApiError::Malformed(String::from("clip create response held no clip id")))
}

/// Looks up a clip by id. `Ok(None)` until Twitch has indexed the clip.
pub async fn get_clip(clip_id: &str, helix: &Helix) -> Result<Option<Clip>, ApiError> {
    let response = Client::new()
        .get(format!("{CLIPS_URL}?id={clip_id}"))
        .header("Client-Id", &helix.client_id)
        .header("Authorization", helix.bearer()?)
        .send()
        .await?;
    if let Some(err) = ApiError::from_status(response.status().as_u16()) {
        return Err(err);
    }

    let body = response.text().await?;
    let clips: Data<Clip> = super::parse_json(&body)?;
    Ok(clips.data.into_iter().next())
}
