use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{Html, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::SignedCookieJar;
use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use crate::config::Config;
use crate::errors::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "admin_session";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// GET /admin/login
pub async fn handle_login_page() -> Result<Html<String>, AppError> {
    let page = tokio::fs::read_to_string("templates/admin_login.html")
        .await
        .map_err(|e| anyhow::anyhow!("templates/admin_login.html unreadable: {e}"))?;
    Ok(Html(page))
}

/// POST /admin/login
///
/// On success, sets a signed session cookie carrying its own expiry and
/// redirects into the panel. Any mismatch redirects back to the login page
/// with no cookie and no hint about which part was wrong.
pub async fn handle_login(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> (SignedCookieJar, Redirect) {
    if verify_credentials(&state.config, &form.username, &form.password) {
        let expires_at = Utc::now().timestamp() + state.config.session_ttl_secs;
        let cookie = Cookie::build((SESSION_COOKIE, expires_at.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        (jar.add(cookie), Redirect::to("/admin"))
    } else {
        warn!("failed admin login attempt for '{}'", form.username);
        (jar, Redirect::to("/admin/login"))
    }
}

/// GET /admin/logout
pub async fn handle_logout(jar: SignedCookieJar) -> (SignedCookieJar, Redirect) {
    let mut cookie = Cookie::from(SESSION_COOKIE);
    cookie.set_path("/");
    (jar.remove(cookie), Redirect::to("/admin/login"))
}

/// The bcrypt verification runs regardless of whether the username matched,
/// so both checks cost the same either way.
pub fn verify_credentials(config: &Config, username: &str, password: &str) -> bool {
    let username_ok = username == config.admin_username;
    let password_ok = bcrypt::verify(password, &config.admin_password_hash).unwrap_or(false);
    username_ok && password_ok
}

/// A signed cookie that parses to a future expiry. Signature validity is the
/// jar's job; a tampered cookie never reaches us.
fn session_is_valid(jar: &SignedCookieJar) -> bool {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse::<i64>().ok())
        .map(|expires_at| expires_at > Utc::now().timestamp())
        .unwrap_or(false)
}

/// Route-layer guard for everything under /admin except the login page.
pub async fn require_admin(
    State(_state): State<AppState>,
    jar: SignedCookieJar,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if session_is_valid(&jar) {
        Ok(next.run(request).await)
    } else {
        Err(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use axum_extra::extract::cookie::Key;

    fn config_with_password(password: &str) -> Config {
        let mut config = test_config();
        config.admin_password_hash = bcrypt::hash(password, 4).unwrap();
        config
    }

    #[test]
    fn correct_credentials_verify() {
        let config = config_with_password("s3cret");
        assert!(verify_credentials(&config, "admin", "s3cret"));
    }

    #[test]
    fn wrong_password_fails() {
        let config = config_with_password("s3cret");
        assert!(!verify_credentials(&config, "admin", "wrong"));
    }

    #[test]
    fn wrong_username_fails_even_with_right_password() {
        let config = config_with_password("s3cret");
        assert!(!verify_credentials(&config, "root", "s3cret"));
    }

    #[test]
    fn garbage_hash_fails_closed() {
        let mut config = test_config();
        config.admin_password_hash = "not-a-bcrypt-hash".into();
        assert!(!verify_credentials(&config, "admin", "anything"));
    }

    #[test]
    fn future_expiry_is_valid() {
        let key = Key::generate();
        let jar = SignedCookieJar::new(key).add(session_cookie(Utc::now().timestamp() + 60));
        assert!(session_is_valid(&jar));
    }

    #[test]
    fn past_expiry_is_rejected() {
        let key = Key::generate();
        let jar = SignedCookieJar::new(key).add(session_cookie(Utc::now().timestamp() - 60));
        assert!(!session_is_valid(&jar));
    }

    #[test]
    fn missing_cookie_is_rejected() {
        let jar = SignedCookieJar::new(Key::generate());
        assert!(!session_is_valid(&jar));
    }

    #[test]
    fn non_numeric_cookie_is_rejected() {
        let key = Key::generate();
        let jar = SignedCookieJar::new(key).add(Cookie::new(SESSION_COOKIE, "tampered"));
        assert!(!session_is_valid(&jar));
    }

    fn session_cookie(expires_at: i64) -> Cookie<'static> {
        Cookie::new(SESSION_COOKIE, expires_at.to_string())
    }
}
