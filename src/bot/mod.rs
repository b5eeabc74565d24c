//! The dispatcher: one task per chat event, failures contained per task.
use crate::api::spotify::Player;
use crate::api::twitch::{self, Helix};
use crate::api::ApiError;
use crate::chat::client::ChatClient;
use crate::chat::data::{ChatClientData, ChatEvent};
use crate::chat::interface::ChatInterface;
use crate::options::Options;
use clip::ClipApi;
use error::BotError;
use song::MusicApi;
use std::sync::Arc;
use tokio::sync::mpsc;

pub mod clip;
pub mod command;
pub mod data;
pub mod error;
pub mod song;

const OFFLINE_MESSAGE: &str = "Stream is offline. As long as the stream is offline, \
     this bot will not process !song commands or song requests.";
const REWARD_OFFLINE_MESSAGE: &str =
    "Song requests are not processed while the stream is offline.";

/// Channel-level lookups the handlers need from the streaming platform.
/// Implemented for [Helix] in production; tests script their own.
pub trait StreamApi {
    async fn stream_is_live(&self, login: &str) -> Result<bool, ApiError>;
    async fn broadcaster_from_login(&self, login: &str) -> Result<String, ApiError>;
}

impl StreamApi for Helix {
    async fn stream_is_live(&self, login: &str) -> Result<bool, ApiError> {
        twitch::stream_is_live(login, self).await
    }
    async fn broadcaster_from_login(&self, login: &str) -> Result<String, ApiError> {
        twitch::broadcaster_from_login(login, self).await
    }
}

/// Where handler replies go. Implemented for [ChatInterface] in production;
/// tests collect the messages instead.
pub trait ChatSink {
    fn say(&self, channel: &str, message: impl Into<String>);
}

impl ChatSink for ChatInterface {
    fn say(&self, channel: &str, message: impl Into<String>) {
        ChatInterface::say(self, channel, message)
    }
}

pub struct Bot {
    chat_client: ChatClient,
    events: mpsc::Receiver<ChatEvent>,
    shared: Shared<ChatInterface, Helix, Player>,
}

/// Everything a handler task needs; cheap to clone into each spawned task.
#[derive(Clone)]
struct Shared<C, S, M> {
    chat: C,
    helix: S,
    player: M,
    options: Arc<Options>,
}

impl Bot {
    pub async fn new(data: data::BotData) -> Result<Self, BotError> {
        let (chat_client, events) = ChatClient::new(ChatClientData {
            access: data.store.clone(),
            bot_username: data.options.bot_username.clone(),
            channels: data.options.channels.clone(),
        })
        .await?;

        let shared = Shared {
            chat: chat_client.interface(),
            helix: Helix {
                client_id: data.client_id,
                store: data.store.clone(),
            },
            player: Player { store: data.store },
            options: Arc::new(data.options),
        };
        Ok(Bot {
            chat_client,
            events,
            shared,
        })
    }

    /// Drives the chat connection and the dispatcher until either stops.
    /// Handler tasks run unordered and independent; none of their failures
    /// reach this loop.
    pub async fn run(self) -> Result<(), BotError> {
        let Bot {
            chat_client,
            mut events,
            shared,
        } = self;

        tokio::select! {
            result = chat_client.run() => result.map_err(BotError::Chat),
            _ = async move {
                while let Some(event) = events.recv().await {
                    let shared = shared.clone();
                    tokio::spawn(async move { dispatch(event, &shared).await });
                }
            } => Ok(()),
        }
    }
}

async fn dispatch<C, S, M>(event: ChatEvent, shared: &Shared<C, S, M>)
where
    C: ChatSink,
    S: StreamApi + ClipApi,
    M: MusicApi,
{
    if let Some(reward_id) = &event.reward_id {
        let configured = shared.options.song_reward_id.as_ref();
        if shared.options.song_requests && Some(reward_id) == configured {
            handle_song_reward(&event, shared).await;
        }
        return;
    }

    match command::classify(&event.text) {
        Some(command::Command::Song { offset }) => handle_song(&event, shared, offset).await,
        Some(command::Command::Clip) => handle_clip(&event, shared).await,
        None => {}
    }
}

/// `true` when the channel is live. Offline channels and failed liveness
/// checks have already been answered in chat by the time this returns.
async fn check_live<C: ChatSink, S: StreamApi, M>(
    event: &ChatEvent,
    shared: &Shared<C, S, M>,
    offline_message: &str,
) -> bool {
    match shared.helix.stream_is_live(&event.channel).await {
        Ok(true) => true,
        Ok(false) => {
            shared.chat.say(&event.channel, offline_message);
            false
        }
        Err(err) => {
            log::warn!("Could not check whether #{} is live: {err}", event.channel);
            shared
                .chat
                .say(&event.channel, "Could not check whether the stream is live.");
            false
        }
    }
}

async fn handle_song<C, S, M>(event: &ChatEvent, shared: &Shared<C, S, M>, offset: Option<u64>)
where
    C: ChatSink,
    S: StreamApi,
    M: MusicApi,
{
    if !check_live(event, shared, OFFLINE_MESSAGE).await {
        return;
    }

    let reply = match offset {
        Some(offset) if offset >= 1 => {
            match song::recently_played_at(&shared.player, offset).await {
                Ok(reply) => reply,
                Err(err) => {
                    log::warn!("Recently-played lookup failed in #{}: {err}", event.channel);
                    String::from(
                        "The Spotify API returned an error while getting the requested track.",
                    )
                }
            }
        }
        _ => match song::now_playing(&shared.player).await {
            Ok(reply) => reply,
            Err(err) => {
                log::warn!("Now-playing lookup failed in #{}: {err}", event.channel);
                String::from(
                    "The Spotify API returned an error while getting the current playing song.",
                )
            }
        },
    };
    shared.chat.say(&event.channel, reply);
}

async fn handle_clip<C, S, M>(event: &ChatEvent, shared: &Shared<C, S, M>)
where
    C: ChatSink,
    S: StreamApi + ClipApi,
{
    if !check_live(event, shared, OFFLINE_MESSAGE).await {
        return;
    }

    let broadcaster_id = match shared.helix.broadcaster_from_login(&event.channel).await {
        Ok(id) => id,
        Err(err) => {
            log::warn!(
                "Could not resolve #{} to a broadcaster id: {err}",
                event.channel
            );
            shared
                .chat
                .say(&event.channel, "Could not look up the broadcaster for this channel.");
            return;
        }
    };

    shared.chat.say(
        &event.channel,
        "Generating the clip... This can take up to 15 seconds.",
    );
    match clip::run(
        &shared.helix,
        broadcaster_id,
        clip::POLL_INTERVAL,
        clip::POLL_ATTEMPTS,
    )
    .await
    {
        Ok(clip::ClipOutcome::Created { url }) => shared
            .chat
            .say(&event.channel, format!("Clip was successfully created: {url}")),
        Ok(clip::ClipOutcome::TimedOut) => shared
            .chat
            .say(&event.channel, "Error while creating the clip."),
        Ok(clip::ClipOutcome::Forbidden) => shared
            .chat
            .say(&event.channel, "Twitch did not allow creating a clip on this channel."),
        Err(err) => {
            log::warn!("Clip workflow failed in #{}: {err}", event.channel);
            shared
                .chat
                .say(&event.channel, "Error while creating the clip.");
        }
    }
}

async fn handle_song_reward<C, S, M>(event: &ChatEvent, shared: &Shared<C, S, M>)
where
    C: ChatSink,
    S: StreamApi,
    M: MusicApi,
{
    if !check_live(event, shared, REWARD_OFFLINE_MESSAGE).await {
        return;
    }

    log::info!(
        "Processing song request from {} in #{}",
        event.username,
        event.channel
    );
    let reply = song::handle_reward(&shared.player, &event.text).await;
    shared.chat.say(&event.channel, reply);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::spotify::{PlayedTrack, Track};
    use std::sync::Mutex;

    #[derive(Default)]
    struct SaidMessages {
        messages: Mutex<Vec<String>>,
    }

    impl ChatSink for SaidMessages {
        fn say(&self, _channel: &str, message: impl Into<String>) {
            self.messages.lock().unwrap().push(message.into());
        }
    }

    struct ScriptedStreams {
        live: bool,
        liveness_checks: Mutex<u32>,
    }

    impl ScriptedStreams {
        fn new(live: bool) -> Self {
            ScriptedStreams {
                live,
                liveness_checks: Mutex::new(0),
            }
        }
    }

    impl StreamApi for ScriptedStreams {
        async fn stream_is_live(&self, _login: &str) -> Result<bool, ApiError> {
            *self.liveness_checks.lock().unwrap() += 1;
            Ok(self.live)
        }
        async fn broadcaster_from_login(&self, _login: &str) -> Result<String, ApiError> {
            Ok(String::from("b1"))
        }
    }

    impl ClipApi for ScriptedStreams {
        async fn create(&self, _broadcaster_id: &str) -> Result<String, ApiError> {
            Err(ApiError::Status(500))
        }
        async fn poll(&self, _clip_id: &str) -> Result<Option<String>, ApiError> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct CountingMusic {
        lookups: Mutex<u32>,
        queued: Mutex<Vec<String>>,
    }

    impl MusicApi for CountingMusic {
        async fn currently_playing(&self) -> Result<Option<Track>, ApiError> {
            *self.lookups.lock().unwrap() += 1;
            Ok(None)
        }
        async fn recently_played(&self, _limit: u64) -> Result<Vec<PlayedTrack>, ApiError> {
            *self.lookups.lock().unwrap() += 1;
            Ok(Vec::new())
        }
        async fn queue(&self, track_id: &str) -> Result<(), ApiError> {
            self.queued.lock().unwrap().push(String::from(track_id));
            Ok(())
        }
    }

    fn options(song_requests: bool) -> Options {
        Options {
            bot_username: String::from("spin___bot"),
            channels: vec![String::from("somechannel")],
            song_reward_id: Some(String::from("reward-123")),
            song_requests,
        }
    }

    fn shared(
        live: bool,
        options: Options,
    ) -> Shared<SaidMessages, ScriptedStreams, CountingMusic> {
        Shared {
            chat: SaidMessages::default(),
            helix: ScriptedStreams::new(live),
            player: CountingMusic::default(),
            options: Arc::new(options),
        }
    }

    fn event(text: &str, reward_id: Option<&str>) -> ChatEvent {
        ChatEvent {
            channel: String::from("somechannel"),
            username: String::from("viewer"),
            text: String::from(text),
            reward_id: reward_id.map(String::from),
        }
    }

    #[tokio::test]
    async fn offline_song_is_rejected_before_any_music_call() {
        let shared = shared(false, options(true));
        dispatch(event("!song", None), &shared).await;

        assert_eq!(
            *shared.chat.messages.lock().unwrap(),
            vec![String::from(OFFLINE_MESSAGE)]
        );
        assert_eq!(*shared.player.lookups.lock().unwrap(), 0);
        assert!(shared.player.queued.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn online_song_reaches_the_player() {
        let shared = shared(true, options(true));
        dispatch(event("!song", None), &shared).await;

        assert_eq!(
            *shared.chat.messages.lock().unwrap(),
            vec![String::from("No track is currently playing.")]
        );
        assert_eq!(*shared.player.lookups.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn offline_redemption_is_rejected_before_any_queue_call() {
        let shared = shared(false, options(true));
        dispatch(
            event("https://open.spotify.com/track/abc123", Some("reward-123")),
            &shared,
        )
        .await;

        assert_eq!(
            *shared.chat.messages.lock().unwrap(),
            vec![String::from(REWARD_OFFLINE_MESSAGE)]
        );
        assert!(shared.player.queued.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn redemption_of_another_reward_is_ignored() {
        let shared = shared(true, options(true));
        dispatch(
            event("https://open.spotify.com/track/abc123", Some("reward-999")),
            &shared,
        )
        .await;

        assert!(shared.chat.messages.lock().unwrap().is_empty());
        assert!(shared.player.queued.lock().unwrap().is_empty());
        // Gating happens before the liveness check goes out.
        assert_eq!(*shared.helix.liveness_checks.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn disabled_song_requests_ignore_redemptions() {
        let shared = shared(true, options(false));
        dispatch(
            event("https://open.spotify.com/track/abc123", Some("reward-123")),
            &shared,
        )
        .await;

        assert!(shared.chat.messages.lock().unwrap().is_empty());
        assert!(shared.player.queued.lock().unwrap().is_empty());
        assert_eq!(*shared.helix.liveness_checks.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn matching_redemption_queues_the_track_when_live() {
        let shared = shared(true, options(true));
        dispatch(
            event("https://open.spotify.com/track/abc123", Some("reward-123")),
            &shared,
        )
        .await;

        assert_eq!(
            *shared.chat.messages.lock().unwrap(),
            vec![String::from("The song has been added to the queue.")]
        );
        assert_eq!(
            *shared.player.queued.lock().unwrap(),
            vec![String::from("abc123")]
        );
    }
}
