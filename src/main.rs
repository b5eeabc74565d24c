use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

mod api;
mod auth;
mod bot;
mod chat;
mod cli;
mod options;

const LOGIN_ADDRESS: &str = "localhost:3000";
const LOGIN_RESPONSE_PATH: &str = "/response";

#[tokio::main]
async fn run() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = cli::Cli::parse();

    let store_dir = match &args.store {
        Some(dir) => PathBuf::from(dir),
        None => home::home_dir()
            .ok_or("Could not locate a home directory")?
            .join(".spinbot"),
    };
    let options_path = args
        .options_file
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| store_dir.join("options.toml"));
    let options: options::Options = toml::from_str(&std::fs::read_to_string(&options_path)?)?;

    let store = auth::store::TokenStore::open(&store_dir)?;

    let twitch_keys = auth::ClientKeys {
        client_id: args.twitch_id.clone(),
        client_secret: args.twitch_secret,
    };
    let spotify_keys = auth::ClientKeys {
        client_id: args.spotify_id,
        client_secret: args.spotify_secret,
    };

    let mut refreshers = tokio::task::JoinSet::new();
    for (provider, keys) in [
        (auth::Provider::Twitch, twitch_keys),
        (auth::Provider::Spotify, spotify_keys),
    ] {
        let expires_in = authenticate(provider, &keys, &store, args.reauth).await?;
        refreshers.spawn(
            auth::refresh::Refresher {
                provider,
                keys,
                store: store.clone(),
                expires_in,
            }
            .run(),
        );
    }

    let bot = bot::Bot::new(bot::data::BotData {
        client_id: args.twitch_id,
        store,
        options,
    })
    .await?;

    log::info!("Connected; listening for commands");
    bot.run().await?;
    Ok(())
}

/// Makes sure `provider` has live credentials: refresh the stored pair if one
/// exists, otherwise walk the user through the browser login. Returns the
/// access token lifetime in seconds, for the refresher's first window.
async fn authenticate(
    provider: auth::Provider,
    keys: &auth::ClientKeys,
    store: &auth::store::TokenStore,
    reauth: bool,
) -> Result<u64, Box<dyn std::error::Error>> {
    if !reauth {
        if let Some(creds) = store.credentials(provider) {
            match auth::refresh::exchange_refresh(provider, keys, &creds.refresh_token).await {
                Ok(tokens) => {
                    let refresh_token = tokens.refresh_token.unwrap_or(creds.refresh_token);
                    store.set(provider, tokens.access_token, refresh_token, tokens.expires_in);
                    log::info!("Refreshed the stored {provider} credentials");
                    return Ok(tokens.expires_in);
                }
                Err(err) => {
                    log::warn!(
                        "Stored {provider} credentials were rejected, starting a fresh login: {err}"
                    );
                }
            }
        }
    }

    println!("{provider} needs a login. Open http://{LOGIN_ADDRESS} in a browser...");
    let login = auth::oauth::LoginServer::start(auth::oauth::LoginOptions {
        provider,
        client_id: keys.client_id.clone(),
        host_address: String::from(LOGIN_ADDRESS),
        response_path: String::from(LOGIN_RESPONSE_PATH),
    });
    let code = login.into_inner().await??;

    let tokens = auth::refresh::exchange_code(
        provider,
        keys,
        &code,
        &format!("http://{LOGIN_ADDRESS}{LOGIN_RESPONSE_PATH}"),
    )
    .await?;
    let refresh_token = tokens
        .refresh_token
        .ok_or("The login response held no refresh token")?;
    store.set(provider, tokens.access_token, refresh_token, tokens.expires_in);
    println!("{provider} login successful.");
    Ok(tokens.expires_in)
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
