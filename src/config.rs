//! Process configuration, read once from the environment at startup.

use std::path::PathBuf;

/// Server configuration loaded from `CHOREBOARD_*` environment variables.
#[derive(Clone, Debug)]
pub struct Config {
    /// Listen host (from CHOREBOARD_HOST, default 127.0.0.1)
    pub host: String,
    /// Listen port (from CHOREBOARD_PORT, default 3000)
    pub port: u16,
    /// SQLite database path (from CHOREBOARD_DB; platform data dir if unset)
    pub db_path: Option<PathBuf>,
    /// Document root for static files (from CHOREBOARD_STATIC_DIR)
    pub static_dir: PathBuf,
    /// Admin identity the login form is checked against
    pub admin: AdminCredentials,
    /// Telegram bot token (from CHOREBOARD_TELEGRAM_TOKEN, bot mode only)
    pub telegram_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let host =
            std::env::var("CHOREBOARD_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("CHOREBOARD_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(3000);

        let db_path = std::env::var("CHOREBOARD_DB").ok().map(PathBuf::from);

        let static_dir = std::env::var("CHOREBOARD_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("static"));

        let username =
            std::env::var("CHOREBOARD_ADMIN_USER").unwrap_or_else(|_| "admin".to_string());

        let password = match std::env::var("CHOREBOARD_ADMIN_PASSWORD") {
            Ok(p) => p,
            Err(_) => {
                tracing::warn!(
                    "CHOREBOARD_ADMIN_PASSWORD not set, using default password 'admin'"
                );
                "admin".to_string()
            }
        };

        let telegram_token = std::env::var("CHOREBOARD_TELEGRAM_TOKEN").ok();

        Self {
            host,
            port,
            db_path,
            static_dir,
            admin: AdminCredentials { username, password },
            telegram_token,
        }
    }
}

/// The single statically-configured identity allowed to log in.
#[derive(Clone, Debug)]
pub struct AdminCredentials {
    pub username: String,
    password: String,
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Check a login attempt. Both fields are compared in constant time so
    /// the response latency leaks nothing about how close a guess was.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        let user_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let pass_ok = constant_time_eq(password.as_bytes(), self.password.as_bytes());
        user_ok && pass_ok
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_works() {
        assert!(constant_time_eq(b"hello", b"hello"));
        assert!(!constant_time_eq(b"hello", b"world"));
        assert!(!constant_time_eq(b"short", b"longer"));
    }

    #[test]
    fn verify_requires_both_fields_to_match() {
        let admin = AdminCredentials::new("admin", "hunter2");

        assert!(admin.verify("admin", "hunter2"));
        assert!(!admin.verify("admin", "wrong"));
        assert!(!admin.verify("root", "hunter2"));
        assert!(!admin.verify("", ""));
    }
}
