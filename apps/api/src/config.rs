use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;

/// SMTP settings. Absent entirely when MAIL_SERVER is not configured,
/// in which case outgoing mail is logged and dropped (local dev).
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub server: String,
    pub username: String,
    pub password: String,
}

/// Application configuration loaded from environment variables.
/// Startup fails with context if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub mail: Option<MailConfig>,
    pub mail_from: String,
    pub admin_username: String,
    pub admin_password_hash: String,
    pub email_contact: String,
    pub email_support: String,
    pub date_limite: NaiveDate,
    pub session_ttl_secs: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let mail = std::env::var("MAIL_SERVER").ok().map(|server| MailConfig {
            server,
            username: std::env::var("MAIL_USERNAME").unwrap_or_default(),
            password: std::env::var("MAIL_PASSWORD").unwrap_or_default(),
        });

        let date_limite = std::env::var("DATE_LIMITE").unwrap_or_else(|_| "2026-01-31".to_string());
        let date_limite = NaiveDate::parse_from_str(&date_limite, "%Y-%m-%d")
            .context("DATE_LIMITE must be a date in YYYY-MM-DD format")?;

        Ok(Config {
            secret_key: require_env("SECRET_KEY")?,
            database_url: require_env("DATABASE_URL")?,
            upload_dir: std::env::var("UPLOAD_DIR")
                .unwrap_or_else(|_| "static/uploads".to_string())
                .into(),
            mail,
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "noreply@example.com".to_string()),
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password_hash: require_env("ADMIN_PASSWORD_HASH")?,
            email_contact: std::env::var("EMAIL_CONTACT")
                .unwrap_or_else(|_| "contact@example.com".to_string()),
            email_support: std::env::var("EMAIL_SUPPORT")
                .unwrap_or_else(|_| "support@example.com".to_string()),
            date_limite,
            session_ttl_secs: std::env::var("SESSION_TTL_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse::<i64>()
                .context("SESSION_TTL_SECS must be a number of seconds")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Whether the public form should advertise that applications are open.
    /// The deadline day itself is inclusive. Submissions past the deadline are
    /// still accepted; the flag is display-only.
    pub fn accepting_applications(&self, today: NaiveDate) -> bool {
        today <= self.date_limite
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        secret_key: "test-secret-key-for-unit-tests".into(),
        database_url: "postgres://localhost/test".into(),
        upload_dir: "static/uploads".into(),
        mail: None,
        mail_from: "noreply@example.com".into(),
        admin_username: "admin".into(),
        admin_password_hash: String::new(),
        email_contact: "contact@example.com".into(),
        email_support: "support@example.com".into(),
        date_limite: NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        session_ttl_secs: 3600,
        port: 8080,
        rust_log: "info".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_before_deadline() {
        let config = test_config();
        let today = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert!(config.accepting_applications(today));
    }

    #[test]
    fn deadline_day_is_inclusive() {
        let config = test_config();
        let today = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        assert!(config.accepting_applications(today));
    }

    #[test]
    fn rejects_after_deadline() {
        let config = test_config();
        let today = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
        assert!(!config.accepting_applications(today));
    }
}
