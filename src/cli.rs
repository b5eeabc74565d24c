use clap::Parser;

#[derive(Parser)]
#[command(name = "spinbot")]
#[command(version)]
#[command(about = "A Twitch chat bot bridging Spotify playback and Twitch clips.")]
pub struct Cli {
    /// Twitch application client id.
    #[arg(long = "twitch-id")]
    pub twitch_id: String,
    /// Twitch application client secret.
    #[arg(long = "twitch-secret")]
    pub twitch_secret: String,
    /// Spotify application client id.
    #[arg(long = "spotify-id")]
    pub spotify_id: String,
    /// Spotify application client secret.
    #[arg(long = "spotify-secret")]
    pub spotify_secret: String,
    /// Directory holding the persisted token pairs. Defaults to ~/.spinbot.
    #[arg(long)]
    pub store: Option<String>,
    /// Options file. Defaults to options.toml inside the store directory.
    #[arg(short = 'o', long = "options-file")]
    pub options_file: Option<String>,
    /// Force a fresh browser login for both providers.
    #[arg(long)]
    pub reauth: bool,
}
