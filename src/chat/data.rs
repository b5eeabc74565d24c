use crate::auth::store::TokenStore;

#[derive(Debug)]
pub struct ChatClientData {
    pub access: TokenStore,
    pub bot_username: String,
    pub channels: Vec<String>,
}

/// One chat message as the dispatcher consumes it. Produced once, consumed
/// once.
#[derive(Debug, Clone, Default)]
pub struct ChatEvent {
    /// Channel login, without the leading `#`.
    pub channel: String,
    pub username: String,
    pub text: String,
    /// Set when the message came in through a channel-point redemption.
    pub reward_id: Option<String>,
}
