//! The local redirect server for the authorization-code login flow.
use super::error::LoginError;
use super::Provider;
use ring::rand::SecureRandom;
use std::collections::HashMap;
use tiny_http::{Response, StatusCode};
use tokio::task::JoinHandle;

type LoginJoinHandle = JoinHandle<Result<AuthCode, LoginError>>;

/// An authorization code handed back by a provider's login page.
#[derive(Debug)]
pub struct AuthCode(pub(super) String);

#[derive(Debug)]
pub struct LoginServer {
    join_handle: LoginJoinHandle,
}

#[derive(Debug)]
pub struct LoginOptions {
    pub provider: Provider,
    pub client_id: String,
    pub host_address: String,
    pub response_path: String,
}

impl LoginServer {
    /// Starts serving the login flow: `/` redirects the browser to the
    /// provider's authorize page, the response path receives the code.
    pub fn start(options: LoginOptions) -> Self {
        let join_handle = tokio::task::spawn_blocking(move || LoginServer::host_auth(options));
        LoginServer { join_handle }
    }
    pub fn into_inner(self) -> LoginJoinHandle {
        self.join_handle
    }

    fn host_auth(options: LoginOptions) -> Result<AuthCode, LoginError> {
        let server =
            tiny_http::Server::http(&options.host_address).map_err(LoginError::OnServerCreate)?;
        let rand = ring::rand::SystemRandom::new();
        let mut current_state = None;

        // https://docs.rs/ring/latest/ring/rand/struct.SystemRandom.html
        rand.fill(&mut []).map_err(LoginError::Ring)?;

        loop {
            let request = server.recv().map_err(LoginError::OnReceive)?;

            match request.url() {
                "/" => {
                    let (url, new_state) = LoginServer::authorize_redirect_link(
                        options.provider,
                        &options.client_id,
                        &format!("http://{}{}", options.host_address, options.response_path),
                        &rand,
                    )
                    .map_err(LoginError::Ring)?;

                    current_state = Some(new_state);

                    request.respond(Response::new(
                        StatusCode(308),
                        vec![tiny_http::Header::from_bytes("Location".as_bytes(), url).unwrap()],
                        "Redirecting...".as_bytes(),
                        None,
                        None,
                    ))
                }
                response if response.starts_with(&options.response_path) => {
                    let Some((_, response)) = response.split_once('?') else {
                        request
                            .respond(LoginServer::code(400, "Invalid response."))
                            .map_err(LoginError::OnResponse)?;
                        continue;
                    };
                    let Some(params) = LoginServer::parse_url_params(response) else {
                        request
                            .respond(LoginServer::code(400, "Invalid response."))
                            .map_err(LoginError::OnResponse)?;
                        continue;
                    };

                    if let (Some(error), Some(error_description)) =
                        (params.get("error"), params.get("error_description"))
                    {
                        request
                            .respond(LoginServer::code(500, "Provider error."))
                            .map_err(LoginError::OnResponse)?;
                        return Err(LoginError::OnAuth {
                            error: String::from(error),
                            error_description: error_description.replace('+', " "),
                        });
                    }

                    let (Some(code), Some(state)) = (params.get("code"), params.get("state"))
                    else {
                        request
                            .respond(LoginServer::code(400, "Invalid response."))
                            .map_err(LoginError::OnResponse)?;
                        continue;
                    };
                    if current_state.as_ref() != Some(state) {
                        request
                            .respond(LoginServer::code(403, "Invalid state."))
                            .map_err(LoginError::OnResponse)?;
                        continue;
                    }

                    request
                        .respond(LoginServer::code(200, "Success!"))
                        .map_err(LoginError::OnResponse)?;
                    return Ok(AuthCode(String::from(code)));
                }
                _ => request.respond(LoginServer::code(404, "Not found.")),
            }
            .map_err(LoginError::OnResponse)?
        }
    }

    fn code(code: u16, description: &str) -> Response<&[u8]> {
        Response::new(
            StatusCode(code),
            vec![
                tiny_http::Header::from_bytes("Content-Type".as_bytes(), "text/plain".as_bytes())
                    .unwrap(),
            ],
            description.as_bytes(),
            Some(description.len()),
            None,
        )
    }

    fn authorize_redirect_link(
        provider: Provider,
        client_id: &str,
        response_url: &str,
        rng: &ring::rand::SystemRandom,
    ) -> Result<(String, String), ring::error::Unspecified> {
        let mut buf = [0; 32];
        rng.fill(&mut buf)?;
        let state: String = buf.into_iter().map(|byte| format!("{:x?}", byte)).collect();
        Ok((
            format!(
                "{}?response_type=code&client_id={client_id}&redirect_uri={response_url}&state={state}&scope={}",
                provider.authorize_url(),
                urlencoding::encode(&provider.scopes().join(" "))
            ),
            state,
        ))
    }

    fn parse_url_params(params: &str) -> Option<HashMap<String, String>> {
        params
            .split('&')
            .map(|param| param.split_once('='))
            .map(|maybe_param| maybe_param.map(|(k, v)| (String::from(k), String::from(v))))
            .collect()
    }
}
