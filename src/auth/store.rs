//! The shared credential store both provider clients read from.
use super::creds::Credentials;
use super::Provider;
use chrono::{Duration, Utc};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Holds the current [Credentials] for each provider.
///
/// Reads never block on I/O or on the network; writers replace the whole
/// [Credentials] value at once, so a reader sees either the old pair or the
/// new pair, never a mix. There is one writer per provider by construction:
/// the login flow before the refresher is spawned, the refresher afterwards.
///
/// Can be reused by cloning.
#[derive(Debug, Clone)]
pub struct TokenStore {
    twitch: Arc<RwLock<Option<Credentials>>>,
    spotify: Arc<RwLock<Option<Credentials>>>,
    store_dir: Arc<PathBuf>,
}

impl TokenStore {
    /// Opens the store directory, creating it if needed, and loads any token
    /// pairs persisted by an earlier run. Loaded pairs get an already-elapsed
    /// expiry so the startup refresh replaces them before first use.
    pub fn open<P: Into<PathBuf>>(store_dir: P) -> std::io::Result<Self> {
        let store_dir = store_dir.into();
        std::fs::create_dir_all(&store_dir)?;

        let store = TokenStore {
            twitch: Arc::new(RwLock::new(None)),
            spotify: Arc::new(RwLock::new(None)),
            store_dir: Arc::new(store_dir),
        };
        for provider in [Provider::Twitch, Provider::Spotify] {
            if let Some((access_token, refresh_token)) = store.read_tokens(provider)? {
                *store.write_slot(provider) = Some(Credentials {
                    access_token,
                    refresh_token,
                    expires_at: Utc::now(),
                });
            }
        }
        Ok(store)
    }

    /// The current access token for `provider`, or `None` if that provider
    /// has not completed login yet. Never blocks.
    pub fn token(&self, provider: Provider) -> Option<String> {
        self.read_slot(provider)
            .as_ref()
            .map(|creds| creds.access_token.clone())
    }

    /// A full copy of the current [Credentials] for `provider`.
    pub fn credentials(&self, provider: Provider) -> Option<Credentials> {
        self.read_slot(provider).clone()
    }

    /// Atomically replaces the [Credentials] for `provider` and best-effort
    /// persists them; a failed write to disk never loses the in-memory pair.
    pub fn set(&self, provider: Provider, access_token: String, refresh_token: String, expires_in: u64) {
        let creds = Credentials {
            access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in as i64),
        };
        log::debug!("Storing {provider} credentials valid until {}", creds.expires_at);
        *self.write_slot(provider) = Some(creds);

        if let Err(err) = self.write_tokens(provider) {
            log::warn!("Could not persist {provider} tokens: {err}");
        }
    }

    fn slot(&self, provider: Provider) -> &RwLock<Option<Credentials>> {
        match provider {
            Provider::Twitch => &self.twitch,
            Provider::Spotify => &self.spotify,
        }
    }

    // Each slot only ever holds a whole replaced value, so a panic elsewhere
    // cannot leave it half-written. Recover the guard instead of propagating
    // the poison into every later token read.
    fn read_slot(&self, provider: Provider) -> RwLockReadGuard<'_, Option<Credentials>> {
        self.slot(provider)
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slot(&self, provider: Provider) -> RwLockWriteGuard<'_, Option<Credentials>> {
        self.slot(provider)
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn token_path(&self, provider: Provider) -> PathBuf {
        self.store_dir.join(provider.token_file())
    }

    fn read_tokens(&self, provider: Provider) -> std::io::Result<Option<(String, String)>> {
        let path = self.token_path(provider);
        if !path.try_exists()? {
            return Ok(None);
        }
        let tokens = std::fs::read_to_string(&path)?;
        match tokens
            .trim()
            .split_once(' ')
            .map(|(a, b)| (String::from(a), String::from(b)))
        {
            Some(pair) => Ok(Some(pair)),
            None => {
                log::warn!("Ignoring malformed {provider} token file {}", path.display());
                Ok(None)
            }
        }
    }

    fn write_tokens(&self, provider: Provider) -> std::io::Result<()> {
        let Some(creds) = self.credentials(provider) else {
            return Ok(());
        };
        std::fs::write(
            self.token_path(provider),
            format!("{} {}", creds.access_token, creds.refresh_token),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store(name: &str) -> TokenStore {
        let dir = std::env::temp_dir().join(format!("spinbot-store-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        TokenStore::open(dir).unwrap()
    }

    #[test]
    fn set_then_token_returns_exactly_what_was_set() {
        let store = test_store("roundtrip");
        assert_eq!(store.token(Provider::Spotify), None);

        store.set(
            Provider::Spotify,
            String::from("access-1"),
            String::from("refresh-1"),
            3600,
        );
        assert_eq!(store.token(Provider::Spotify), Some(String::from("access-1")));
        // The other provider's slot is untouched.
        assert_eq!(store.token(Provider::Twitch), None);
    }

    #[test]
    fn readers_never_observe_a_mixed_pair() {
        let store = test_store("atomic");
        store.set(
            Provider::Twitch,
            String::from("access-a"),
            String::from("refresh-a"),
            3600,
        );

        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for _ in 0..200 {
                    store.set(
                        Provider::Twitch,
                        String::from("access-a"),
                        String::from("refresh-a"),
                        3600,
                    );
                    store.set(
                        Provider::Twitch,
                        String::from("access-b"),
                        String::from("refresh-b"),
                        3600,
                    );
                }
            })
        };
        for _ in 0..200 {
            let creds = store.credentials(Provider::Twitch).unwrap();
            let suffix = creds.access_token.strip_prefix("access-").unwrap();
            assert_eq!(creds.refresh_token, format!("refresh-{suffix}"));
        }
        writer.join().unwrap();
    }

    #[test]
    fn reads_and_writes_survive_a_poisoned_lock() {
        let store = test_store("poison");
        store.set(
            Provider::Twitch,
            String::from("access-p"),
            String::from("refresh-p"),
            3600,
        );

        let poisoner = {
            let store = store.clone();
            std::thread::spawn(move || {
                let _guard = store.twitch.write().unwrap();
                panic!("panic while holding the credential lock");
            })
        };
        assert!(poisoner.join().is_err());

        assert_eq!(store.token(Provider::Twitch), Some(String::from("access-p")));
        store.set(
            Provider::Twitch,
            String::from("access-q"),
            String::from("refresh-q"),
            3600,
        );
        assert_eq!(store.token(Provider::Twitch), Some(String::from("access-q")));
    }

    #[test]
    fn persisted_tokens_survive_a_reopen() {
        let dir = std::env::temp_dir().join(format!("spinbot-store-reopen-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let store = TokenStore::open(&dir).unwrap();
        store.set(
            Provider::Spotify,
            String::from("access-x"),
            String::from("refresh-x"),
            3600,
        );
        drop(store);

        let reopened = TokenStore::open(&dir).unwrap();
        let creds = reopened.credentials(Provider::Spotify).unwrap();
        assert_eq!(creds.access_token, "access-x");
        assert_eq!(creds.refresh_token, "refresh-x");
        // Unknown lifetime after a restart: already expired, so the startup
        // refresh replaces the pair before anything relies on it.
        assert!(creds.expires_at <= Utc::now());
    }
}
