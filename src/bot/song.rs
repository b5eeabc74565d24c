//! The song workflow: now-playing and history queries, and reward-driven
//! queue additions.
use crate::api::spotify::{self, PlayedTrack, Player, Track};
use crate::api::ApiError;
use chrono::{DateTime, Utc};

/// Spotify's page-size cap for the recently-played endpoint.
pub const MAX_OFFSET: u64 = 50;

/// One external music operation set. Implemented for [Player] in production;
/// tests script their own.
pub trait MusicApi {
    async fn currently_playing(&self) -> Result<Option<Track>, ApiError>;
    async fn recently_played(&self, limit: u64) -> Result<Vec<PlayedTrack>, ApiError>;
    async fn queue(&self, track_id: &str) -> Result<(), ApiError>;
}

impl MusicApi for Player {
    async fn currently_playing(&self) -> Result<Option<Track>, ApiError> {
        spotify::currently_playing(self).await
    }
    async fn recently_played(&self, limit: u64) -> Result<Vec<PlayedTrack>, ApiError> {
        spotify::recently_played(limit, self).await
    }
    async fn queue(&self, track_id: &str) -> Result<(), ApiError> {
        spotify::queue_track(track_id, self).await
    }
}

/// The reply for a bare `!song`.
pub async fn now_playing<M: MusicApi>(api: &M) -> Result<String, ApiError> {
    match api.currently_playing().await? {
        Some(track) => Ok(format!(
            "{} by {} from the album {} | Link: {}",
            track.name,
            artist_names(&track),
            track.album.name,
            track.external_urls.spotify
        )),
        None => Ok(String::from("No track is currently playing.")),
    }
}

/// The reply for `!song <offset>`: the offset-th most recently played track,
/// 1-indexed from the most recent. Offsets past the page-size cap are
/// rejected here, before any call goes out.
pub async fn recently_played_at<M: MusicApi>(api: &M, offset: u64) -> Result<String, ApiError> {
    if offset > MAX_OFFSET {
        return Ok(String::from(
            "Only the 50 most recently played songs are supported. \
             Please use 50 as the max offset. Example: !song 50",
        ));
    }

    let items = api.recently_played(offset).await?;
    let Some(item) = offset
        .checked_sub(1)
        .and_then(|index| items.get(index as usize))
    else {
        return Ok(String::from(
            "Couldn't retrieve the requested song. Spotify returned fewer tracks than expected.",
        ));
    };
    Ok(format!(
        "{} by {} from the album {} | Link: {} | Played at: {}",
        item.track.name,
        artist_names(&item.track),
        item.track.album.name,
        item.track.external_urls.spotify,
        played_at_local(&item.played_at)
    ))
}

/// Handles one song-request redemption: extract the track link, issue the
/// single enqueue call, report. The caller has already checked the reward id,
/// the feature flag and channel liveness. Never fails the task: the outcome
/// is always a chat-visible message.
pub async fn handle_reward<M: MusicApi>(api: &M, text: &str) -> String {
    let Some(track_id) = super::command::track_id(text) else {
        return String::from(
            "Error while adding song to queue. Only Spotify links are supported.",
        );
    };
    match api.queue(track_id).await {
        Ok(()) => String::from("The song has been added to the queue."),
        // A rejected id and a failed call read the same to the viewer; the
        // distinction only reaches the log.
        Err(err) => {
            log::warn!("Could not queue track {track_id}: {err}");
            String::from("The Song ID is not correct. Check your link.")
        }
    }
}

fn artist_names(track: &Track) -> String {
    track
        .artists
        .iter()
        .map(|artist| artist.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Played-at instants are shown in the broadcaster's timezone.
fn played_at_local(at: &DateTime<Utc>) -> String {
    at.with_timezone(&chrono_tz::Europe::Berlin)
        .format("%d.%m.%Y, %H:%M:%S")
        .to_string()
}
