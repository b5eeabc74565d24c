use irc::proto::message::Tag;

/// The PRIVMSG tags the bot cares about.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MessageTags {
    pub display_name: Option<String>,
    /// Present when the message was sent through a channel-point reward.
    pub reward_id: Option<String>,
}

pub fn message_tags(raw_tags: &[Tag]) -> MessageTags {
    let mut tags = MessageTags::default();
    for Tag(key, value) in raw_tags {
        match key.as_str() {
            "display-name" => tags.display_name = value.clone().filter(|v| !v.is_empty()),
            "custom-reward-id" => tags.reward_id = value.clone().filter(|v| !v.is_empty()),
            _ => (),
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(key: &str, value: &str) -> Tag {
        Tag(String::from(key), Some(String::from(value)))
    }

    #[test]
    fn reward_tag_is_extracted() {
        let tags = message_tags(&[
            tag("display-name", "Viewer"),
            tag("custom-reward-id", "reward-123"),
            tag("mod", "0"),
        ]);
        assert_eq!(tags.display_name.as_deref(), Some("Viewer"));
        assert_eq!(tags.reward_id.as_deref(), Some("reward-123"));
    }

    #[test]
    fn plain_message_has_no_reward() {
        let tags = message_tags(&[tag("display-name", "Viewer"), tag("custom-reward-id", "")]);
        assert_eq!(tags.reward_id, None);
    }
}
