use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};
use sqlx::PgPool;

use crate::config::Config;
use crate::notify::Notifier;
use crate::storage::FileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub files: FileStore,
    pub notifier: Arc<Notifier>,
    cookie_key: Key,
}

impl AppState {
    pub fn new(db: PgPool, config: Config, files: FileStore, notifier: Arc<Notifier>) -> Self {
        let cookie_key = derive_cookie_key(&config.secret_key);
        Self {
            db,
            config,
            files,
            notifier,
            cookie_key,
        }
    }
}

/// Lets `SignedCookieJar` pull its signing key out of the state.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// `Key::from` wants 64 bytes of material; SECRET_KEY is free-form, so it is
/// stretched through SHA-512 first.
fn derive_cookie_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_derivation_is_deterministic() {
        let a = derive_cookie_key("secret");
        let b = derive_cookie_key("secret");
        assert_eq!(a.master(), b.master());
    }

    #[test]
    fn different_secrets_give_different_keys() {
        let a = derive_cookie_key("secret-a");
        let b = derive_cookie_key("secret-b");
        assert_ne!(a.master(), b.master());
    }
}
