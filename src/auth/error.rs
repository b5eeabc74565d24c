use super::Provider;

/// An Error returned during a token-endpoint exchange.
#[derive(Debug)]
pub enum AuthError {
    /// An error returned while making a GET or POST request.
    Net(reqwest::Error),
    /// An error returned if the provider's response could not be deserialized.
    BadData(serde_json::Error),
    /// An error returned if the provider refused to issue tokens.
    Denied {
        provider: Provider,
        status: u16,
        body: String,
    },
    /// An error returned while reading/writing tokens from/to the disk.
    IO(std::io::Error),
}

/// An Error returned by a [LoginServer](super::oauth::LoginServer).
#[derive(Debug)]
pub enum LoginError {
    /// An error returned when the server is first being created.
    OnServerCreate(Box<dyn std::error::Error + Send + Sync>),
    /// An error returned when the server is receiving a request.
    OnReceive(std::io::Error),
    /// An error returned when the server is sending a response.
    OnResponse(std::io::Error),
    /// An error returned if the provider rejects the authorization.
    OnAuth {
        error: String,
        error_description: String,
    },
    /// An error generating random data.
    Ring(ring::error::Unspecified),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Net(err) => {
                f.write_fmt(format_args!("Error sending a token request: {err}"))
            }
            AuthError::BadData(err) => {
                f.write_fmt(format_args!("Error parsing a token response: {err}"))
            }
            AuthError::Denied {
                provider,
                status,
                body,
            } => f.write_fmt(format_args!(
                "Error {status} from the {provider} token endpoint: {body}"
            )),
            AuthError::IO(err) => f.write_fmt(format_args!(
                "Error accessing the token store on disk: {err}"
            )),
        }
    }
}
impl std::error::Error for AuthError {}
impl From<std::io::Error> for AuthError {
    fn from(value: std::io::Error) -> Self {
        AuthError::IO(value)
    }
}

impl std::fmt::Display for LoginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoginError::OnServerCreate(err) => f.write_fmt(format_args!(
                "Error while creating the authentification server: {err}"
            )),
            LoginError::OnReceive(err) => f.write_fmt(format_args!(
                "Error while trying to receive a request to the server: {err}"
            )),
            LoginError::OnResponse(err) => f.write_fmt(format_args!(
                "Error while trying to send a response from the server: {err}"
            )),
            LoginError::OnAuth {
                error,
                error_description,
            } => f.write_fmt(format_args!(
                "Error {error} while validating the user's credentials: {error_description}"
            )),
            LoginError::Ring(err) => {
                f.write_fmt(format_args!("Error while creating random data: {err}"))
            }
        }
    }
}
impl std::error::Error for LoginError {}
