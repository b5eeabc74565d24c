//! Spotify player endpoints: now playing, recently played, queue.
use super::ApiError;
use crate::auth::store::TokenStore;
use crate::auth::Provider;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

const CURRENTLY_PLAYING_URL: &str = "https://api.spotify.com/v1/me/player/currently-playing";
const RECENTLY_PLAYED_URL: &str = "https://api.spotify.com/v1/me/player/recently-played";
const QUEUE_URL: &str = "https://api.spotify.com/v1/me/player/queue";

/// Auth context for player calls. Tokens are read from the store on every
/// call, never cached here.
#[derive(Debug, Clone)]
pub struct Player {
    pub store: TokenStore,
}

impl Player {
    fn bearer(&self) -> Result<String, ApiError> {
        self.store
            .token(Provider::Spotify)
            .map(|token| format!("Bearer {token}"))
            .ok_or(ApiError::Unauthenticated)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub name: String,
    pub artists: Vec<Artist>,
    pub album: Album,
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Album {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalUrls {
    pub spotify: String,
}

#[derive(Debug, Deserialize)]
struct CurrentlyPlaying {
    item: Option<Track>,
}

/// One entry of the playback history.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayedTrack {
    pub track: Track,
    pub played_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct RecentlyPlayed {
    items: Vec<PlayedTrack>,
}

/// The track playing right now, if any. Spotify answers 204 with an empty
/// body when nothing is playing.
pub async fn currently_playing(player: &Player) -> Result<Option<Track>, ApiError> {
    let response = Client::new()
        .get(CURRENTLY_PLAYING_URL)
        .header("Authorization", player.bearer()?)
        .send()
        .await?;
    let status = response.status().as_u16();
    if status == 204 {
        return Ok(None);
    }
    if let Some(err) = ApiError::from_status(status) {
        return Err(err);
    }

    let body = response.text().await?;
    let playing: CurrentlyPlaying = super::parse_json(&body)?;
    Ok(playing.item)
}

/// The `limit` most recently played tracks, newest first. Spotify caps the
/// page size at 50.
pub async fn recently_played(limit: u64, player: &Player) -> Result<Vec<PlayedTrack>, ApiError> {
    let response = Client::new()
        .get(format!("{RECENTLY_PLAYED_URL}?limit={limit}"))
        .header("Authorization", player.bearer()?)
        .send()
        .await?;
    if let Some(err) = ApiError::from_status(response.status().as_u16()) {
        return Err(err);
    }

    let body = response.text().await?;
    let played: RecentlyPlayed = super::parse_json(&body)?;
    Ok(played.items)
}

/// Adds a track to the playback queue. Success is exactly Spotify answering
/// 204; a 200 here still means the track was not queued.
pub async fn queue_track(track_id: &str, player: &Player) -> Result<(), ApiError> {
    let response = Client::new()
        .post(format!("{QUEUE_URL}?uri=spotify%3Atrack%3A{track_id}"))
        .header("Authorization", player.bearer()?)
        .send()
        .await?;
    let status = response.status().as_u16();
    if status == 204 {
        return Ok(());
    }
    match ApiError::from_status(status) {
        Some(err) => Err(err),
        None => Err(ApiError::Status(status)),
    }
}
