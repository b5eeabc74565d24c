pub mod creds;
pub mod error;
pub mod oauth;
pub mod refresh;
pub mod store;

/// The two external platforms the bot holds credentials for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Twitch,
    Spotify,
}

/// The client id/secret pair registered with one provider.
#[derive(Debug, Clone)]
pub struct ClientKeys {
    pub client_id: String,
    pub client_secret: String,
}

impl Provider {
    pub(crate) fn token_url(self) -> &'static str {
        match self {
            Provider::Twitch => "https://id.twitch.tv/oauth2/token",
            Provider::Spotify => "https://accounts.spotify.com/api/token",
        }
    }
    pub(crate) fn authorize_url(self) -> &'static str {
        match self {
            Provider::Twitch => "https://id.twitch.tv/oauth2/authorize",
            Provider::Spotify => "https://accounts.spotify.com/authorize",
        }
    }
    pub(crate) fn token_file(self) -> &'static str {
        match self {
            Provider::Twitch => "twitch.tokens",
            Provider::Spotify => "spotify.tokens",
        }
    }
    pub(crate) fn scopes(self) -> &'static [&'static str] {
        match self {
            Provider::Twitch => &["chat:read", "chat:edit", "clips:edit"],
            Provider::Spotify => &[
                "user-read-currently-playing",
                "user-read-recently-played",
                "user-read-playback-state",
                "user-modify-playback-state",
            ],
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provider::Twitch => f.write_str("Twitch"),
            Provider::Spotify => f.write_str("Spotify"),
        }
    }
}
