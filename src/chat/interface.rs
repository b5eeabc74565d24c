use std::sync::Arc;

/// Handle for posting into chat. Fire and forget: delivery failures are
/// logged, never propagated to the caller.
///
/// Can be reused by cloning.
#[derive(Clone)]
pub struct ChatInterface(pub(super) Arc<irc::client::Client>);

impl ChatInterface {
    pub fn say<S: Into<String>>(&self, channel: &str, message: S) {
        if let Err(err) = self.0.send(irc::proto::Command::PRIVMSG(
            format!("#{channel}"),
            message.into(),
        )) {
            log::warn!("Could not post to #{channel}: {err}");
        }
    }
}
