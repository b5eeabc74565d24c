use serde::Deserialize;

/// Runtime options, read from a toml file.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Options {
    /// Account the bot signs into chat as.
    pub bot_username: String,
    /// Channels to join and listen on.
    pub channels: Vec<String>,
    /// The channel-point reward that triggers a song request.
    pub song_reward_id: Option<String>,
    /// Master switch for processing song-request redemptions.
    #[serde(default = "default_song_requests")]
    pub song_requests: bool,
}

fn default_song_requests() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_options_file() {
        let options: Options = toml::from_str(
            r#"
            bot_username = "spin___bot"
            channels = ["somechannel", "otherchannel"]
            song_reward_id = "reward-123"
            song_requests = false
            "#,
        )
        .unwrap();
        assert_eq!(options.bot_username, "spin___bot");
        assert_eq!(options.channels.len(), 2);
        assert_eq!(options.song_reward_id.as_deref(), Some("reward-123"));
        assert!(!options.song_requests);
    }

    #[test]
    fn song_requests_default_on() {
        let options: Options = toml::from_str(
            r#"
            bot_username = "spin___bot"
            channels = ["somechannel"]
            "#,
        )
        .unwrap();
        assert!(options.song_requests);
        assert_eq!(options.song_reward_id, None);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<Options, _> = toml::from_str(
            r#"
            bot_username = "spin___bot"
            channels = []
            song_reqests = true
            "#,
        );
        assert!(result.is_err());
    }
}
