#[derive(Debug)]
pub enum ChatClientError {
    Irc(irc::error::Error),
    /// The chat provider has no stored access token to sign in with.
    Unauthenticated,
}

impl std::fmt::Display for ChatClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatClientError::Irc(err) => {
                f.write_fmt(format_args!("Chat connection error: {err}"))
            }
            ChatClientError::Unauthenticated => {
                f.write_str("No chat access token available to sign in with")
            }
        }
    }
}
impl std::error::Error for ChatClientError {}
impl From<irc::error::Error> for ChatClientError {
    fn from(value: irc::error::Error) -> Self {
        ChatClientError::Irc(value)
    }
}
