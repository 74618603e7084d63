use std::env;

use rand::{Rng, distributions::Alphanumeric};

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub profile: String,
    /// Directory served under `/media`
    pub media_dir: String,
    pub jwt_secret: String,
    pub session_hours: i64,
    pub seed_demo: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let profile = env::var("PROFILE").unwrap_or_else(|_| "default".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            if profile == "default" {
                "sqlite://bookstore.db?mode=rwc".to_string()
            } else {
                format!("sqlite://bookstore_{}.db?mode=rwc", profile)
            }
        });

        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                tracing::warn!("JWT_SECRET not set, sessions will not survive a restart");
                random_secret()
            });

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(Vec::new),
            profile,
            media_dir: env::var("MEDIA_DIR").unwrap_or_else(|_| "media".to_string()),
            jwt_secret,
            session_hours: env::var("SESSION_HOURS")
                .ok()
                .and_then(|h| h.parse().ok())
                .filter(|h| *h > 0)
                .unwrap_or(24),
            seed_demo: env::var("SEED_DEMO").is_ok(),
        }
    }

    /// Configuration for tests: in-memory database, fixed secret.
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            port: 0,
            cors_allowed_origins: Vec::new(),
            profile: "test".to_string(),
            media_dir: "media".to_string(),
            jwt_secret: "test-secret".to_string(),
            session_hours: 24,
            seed_demo: false,
        }
    }
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}
