use super::data::{ChatClientData, ChatEvent};
use super::error::ChatClientError;
use super::interface::ChatInterface;
use super::tag;
use crate::auth::Provider;
use futures_util::StreamExt;
use irc::client::Client;
use irc::proto::{CapSubCommand, Command};
use std::sync::Arc;
use tokio::sync::mpsc;

/// The connection to Twitch chat. Joins the configured channels and turns
/// PRIVMSGs into [ChatEvent]s on the returned receiver.
pub struct ChatClient {
    stream: irc::client::ClientStream,
    sender: Arc<Client>,
    events: mpsc::Sender<ChatEvent>,
    bot_username: String,
}

impl ChatClient {
    pub async fn new(
        data: ChatClientData,
    ) -> Result<(Self, mpsc::Receiver<ChatEvent>), ChatClientError> {
        let token = data
            .access
            .token(Provider::Twitch)
            .ok_or(ChatClientError::Unauthenticated)?;

        let mut client = Client::from_config(irc::client::prelude::Config {
            nickname: Some(data.bot_username.clone()),
            username: Some(data.bot_username.clone()),
            server: Some(String::from("irc.chat.twitch.tv")),
            ..Default::default()
        })
        .await?;
        let stream = client.stream()?;

        client.send(Command::CAP(
            None,
            CapSubCommand::REQ,
            None,
            Some(String::from("twitch.tv/tags twitch.tv/commands")),
        ))?;
        client.send(Command::PASS(format!("oauth:{token}")))?;
        client.send(Command::NICK(data.bot_username.clone()))?;
        for channel in &data.channels {
            client.send(Command::JOIN(format!("#{channel}"), None, None))?;
        }

        let (events, receiver) = mpsc::channel(64);
        Ok((
            ChatClient {
                stream,
                sender: Arc::new(client),
                events,
                bot_username: data.bot_username,
            },
            receiver,
        ))
    }

    pub fn interface(&self) -> ChatInterface {
        ChatInterface(self.sender.clone())
    }

    /// Drives the connection until it drops, forwarding each chat message as
    /// a [ChatEvent]. The bot's own messages are filtered out here.
    pub async fn run(mut self) -> Result<(), ChatClientError> {
        while let Some(message) = self.stream.next().await.transpose()? {
            let Command::PRIVMSG(target, text) = &message.command else {
                continue;
            };
            let username = String::from(message.source_nickname().unwrap_or_default());
            if username.eq_ignore_ascii_case(&self.bot_username) {
                continue;
            }

            let tags = tag::message_tags(message.tags.as_deref().unwrap_or(&[]));
            let event = ChatEvent {
                channel: String::from(target.trim_start_matches('#')),
                username: tags.display_name.unwrap_or(username),
                text: text.clone(),
                reward_id: tags.reward_id,
            };
            if self.events.send(event).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}
