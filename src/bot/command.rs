use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SONG_COMMAND: Regex = Regex::new(r"^!song(?:\s+(\d+))?\s*$").unwrap();
    static ref CLIP_COMMAND: Regex = Regex::new(r"^!clip\s*$").unwrap();
    static ref TRACK_LINK: Regex =
        Regex::new(r"https://open\.spotify\.com/track/([A-Za-z0-9]+)").unwrap();
}

/// What a chat message asks the bot to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!song [offset]`. No offset (or offset 0) means "what's playing right
    /// now"; an offset of `n` asks for the n-th most recently played track.
    Song { offset: Option<u64> },
    /// `!clip`
    Clip,
}

pub fn classify(text: &str) -> Option<Command> {
    let text = text.trim();
    if CLIP_COMMAND.is_match(text) {
        return Some(Command::Clip);
    }
    let captures = SONG_COMMAND.captures(text)?;
    let offset = captures.get(1).and_then(|m| m.as_str().parse().ok());
    Some(Command::Song { offset })
}

/// The track id out of an `open.spotify.com/track/...` link, if the text
/// contains one.
pub fn track_id(text: &str) -> Option<&str> {
    TRACK_LINK
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_without_offset() {
        assert_eq!(classify("!song"), Some(Command::Song { offset: None }));
        assert_eq!(classify("!song  "), Some(Command::Song { offset: None }));
    }

    #[test]
    fn song_with_offset() {
        assert_eq!(classify("!song 3"), Some(Command::Song { offset: Some(3) }));
        assert_eq!(
            classify("!song 50"),
            Some(Command::Song { offset: Some(50) })
        );
    }

    #[test]
    fn clip_takes_no_arguments() {
        assert_eq!(classify("!clip"), Some(Command::Clip));
        assert_eq!(classify("!clip "), Some(Command::Clip));
        assert_eq!(classify("!clip now"), None);
    }

    #[test]
    fn ordinary_chat_is_not_a_command() {
        assert_eq!(classify("hello there"), None);
        assert_eq!(classify("!songs"), None);
        assert_eq!(classify("!song please"), None);
    }

    #[test]
    fn track_id_from_link() {
        assert_eq!(
            track_id("https://open.spotify.com/track/4cOdK2wGLETKBW3PvgPWqT?si=abc"),
            Some("4cOdK2wGLETKBW3PvgPWqT")
        );
        assert_eq!(
            track_id("play this https://open.spotify.com/track/4cOdK2wGLETKBW3PvgPWqT"),
            Some("4cOdK2wGLETKBW3PvgPWqT")
        );
        assert_eq!(track_id("https://example.com/track/4cOdK2wGLETKBW3PvgPWqT"), None);
        assert_eq!(track_id("just words"), None);
    }
}
