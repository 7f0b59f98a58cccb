/// Configuration management for the content platform
///
/// Everything is read from environment variables (a `.env` file is loaded
/// by the binary before this runs). Production deployments are guarded
/// against permissive CORS and a missing token secret.
use media_core::MediaPaths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::services::feed_ranking::RankingWeights;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    /// Feed ranking weights and pagination bounds
    pub feed: FeedConfig,
    /// Where media files live on disk and how they are published
    pub storage: StorageConfig,
    pub stream: StreamConfig,
    pub auth: AuthConfig,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub recency_weight: f64,
    pub virality_weight: f64,
    pub baseline_weight: f64,
    pub tiebreak_weight: f64,
    pub like_weight: f64,
    pub comment_weight: f64,
    pub baseline_cap: i64,
    pub tiebreak_prime: u64,
    pub default_per_page: u32,
    pub max_per_page: u32,
    /// Upper bound on rows loaded per feed request before ordering
    pub max_candidates: i64,
}

impl FeedConfig {
    pub fn weights(&self) -> RankingWeights {
        RankingWeights {
            recency: self.recency_weight,
            virality: self.virality_weight,
            baseline: self.baseline_weight,
            tiebreak: self.tiebreak_weight,
            like_weight: self.like_weight,
            comment_weight: self.comment_weight,
            baseline_cap: self.baseline_cap,
            prime: self.tiebreak_prime,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        let weights = RankingWeights::default();
        Self {
            recency_weight: weights.recency,
            virality_weight: weights.virality,
            baseline_weight: weights.baseline,
            tiebreak_weight: weights.tiebreak,
            like_weight: weights.like_weight,
            comment_weight: weights.comment_weight,
            baseline_cap: weights.baseline_cap,
            tiebreak_prime: weights.prime,
            default_per_page: 20,
            max_per_page: 100,
            max_candidates: 2_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the publicly served media files
    pub root: PathBuf,
    /// URL prefix under which `root` is published
    pub public_url: String,
}

impl StorageConfig {
    /// Public URL of a stored relative path.
    pub fn public_url_for(&self, stored: &str) -> String {
        let trimmed = stored.trim().trim_start_matches('/');
        let relative = trimmed.strip_prefix("public/").unwrap_or(trimmed);
        format!("{}/{}", self.public_url.trim_end_matches('/'), relative)
    }

    /// Public URL of a record's playable file, if it has one.
    pub fn media_url<R: MediaPaths>(&self, record: &R) -> Option<String> {
        record.primary_media_path().map(|p| self.public_url_for(p))
    }

    pub fn thumbnail_url<R: MediaPaths>(&self, record: &R) -> Option<String> {
        record.thumbnail_path().map(|p| self.public_url_for(p))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    pub chunk_size: usize,
    pub cache_max_age_secs: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 secret used to validate bearer tokens
    pub jwt_secret: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let production = app_env.eq_ignore_ascii_case("production");
        let feed_defaults = FeedConfig::default();

        let feed = FeedConfig {
            recency_weight: parse_env_or_default("FEED_RECENCY_WEIGHT", feed_defaults.recency_weight)?,
            virality_weight: parse_env_or_default(
                "FEED_VIRALITY_WEIGHT",
                feed_defaults.virality_weight,
            )?,
            baseline_weight: parse_env_or_default(
                "FEED_BASELINE_WEIGHT",
                feed_defaults.baseline_weight,
            )?,
            tiebreak_weight: parse_env_or_default(
                "FEED_TIEBREAK_WEIGHT",
                feed_defaults.tiebreak_weight,
            )?,
            like_weight: parse_env_or_default("FEED_LIKE_WEIGHT", feed_defaults.like_weight)?,
            comment_weight: parse_env_or_default(
                "FEED_COMMENT_WEIGHT",
                feed_defaults.comment_weight,
            )?,
            baseline_cap: parse_env_or_default("FEED_BASELINE_CAP", feed_defaults.baseline_cap)?,
            tiebreak_prime: parse_env_or_default(
                "FEED_TIEBREAK_PRIME",
                feed_defaults.tiebreak_prime,
            )?,
            default_per_page: parse_env_or_default(
                "FEED_DEFAULT_PER_PAGE",
                feed_defaults.default_per_page,
            )?,
            max_per_page: parse_env_or_default("FEED_MAX_PER_PAGE", feed_defaults.max_per_page)?,
            max_candidates: parse_env_or_default(
                "FEED_MAX_CANDIDATES",
                feed_defaults.max_candidates,
            )?,
        };

        if feed.baseline_cap <= 0 {
            return Err("FEED_BASELINE_CAP must be positive".to_string());
        }
        if feed.tiebreak_prime == 0 {
            return Err("FEED_TIEBREAK_PRIME must be positive".to_string());
        }
        if feed.max_per_page == 0 || feed.default_per_page == 0 {
            return Err("FEED_*_PER_PAGE must be positive".to_string());
        }

        let jwt_secret = std::env::var("JWT_SECRET")
            .ok()
            .filter(|secret| !secret.trim().is_empty());
        if production && jwt_secret.is_none() {
            return Err("JWT_SECRET must be set in production".to_string());
        }

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or_default("APP_PORT", 8080)?,
                workers: parse_env_or_default("APP_WORKERS", 4)?,
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if production => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if production && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost/content_platform".to_string()),
            },
            feed,
            storage: StorageConfig {
                root: std::env::var("STORAGE_ROOT")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("storage/app/public")),
                public_url: std::env::var("STORAGE_PUBLIC_URL")
                    .unwrap_or_else(|_| "/storage".to_string()),
            },
            stream: StreamConfig {
                chunk_size: parse_env_or_default(
                    "STREAM_CHUNK_SIZE",
                    media_core::constants::DEFAULT_CHUNK_SIZE,
                )?
                .max(1),
                cache_max_age_secs: parse_env_or_default(
                    "STREAM_CACHE_MAX_AGE_SECS",
                    media_core::constants::DEFAULT_CACHE_MAX_AGE_SECS,
                )?,
            },
            auth: AuthConfig { jwt_secret },
        })
    }
}

fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(val) => val
            .trim()
            .parse()
            .map_err(|e| format!("Failed to parse {}='{}': {}", key, val, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 8] = [
        "APP_ENV",
        "APP_PORT",
        "CORS_ALLOWED_ORIGINS",
        "JWT_SECRET",
        "FEED_RECENCY_WEIGHT",
        "FEED_TIEBREAK_PRIME",
        "STREAM_CHUNK_SIZE",
        "STORAGE_ROOT",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = Config::from_env().unwrap();

        assert_eq!(config.app.port, 8080);
        assert!(!config.app.is_production());
        assert_eq!(config.feed.weights(), RankingWeights::default());
        assert_eq!(config.feed.default_per_page, 20);
        assert_eq!(config.feed.max_per_page, 100);
        assert_eq!(config.stream.chunk_size, 8 * 1024);
        assert_eq!(config.stream.cache_max_age_secs, 86_400);
        assert_eq!(config.storage.root, PathBuf::from("storage/app/public"));
        assert!(config.auth.jwt_secret.is_none());
    }

    #[test]
    #[serial]
    fn test_feed_overrides() {
        clear_env();
        std::env::set_var("FEED_RECENCY_WEIGHT", "0.5");
        std::env::set_var("FEED_TIEBREAK_PRIME", "7919");

        let weights = Config::from_env().unwrap().feed.weights();
        assert_eq!(weights.recency, 0.5);
        assert_eq!(weights.prime, 7919);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_number_is_an_error() {
        clear_env();
        std::env::set_var("FEED_RECENCY_WEIGHT", "heavy");

        let err = Config::from_env().unwrap_err();
        assert!(err.contains("FEED_RECENCY_WEIGHT"));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_zero_prime_rejected() {
        clear_env();
        std::env::set_var("FEED_TIEBREAK_PRIME", "0");
        assert!(Config::from_env().is_err());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_production_guards() {
        clear_env();
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://app.example.com");
        assert!(Config::from_env().unwrap_err().contains("JWT_SECRET"));

        std::env::set_var("JWT_SECRET", "s3cret");
        std::env::set_var("CORS_ALLOWED_ORIGINS", "*");
        assert!(Config::from_env().unwrap_err().contains("CORS_ALLOWED_ORIGINS"));

        std::env::set_var("CORS_ALLOWED_ORIGINS", "https://app.example.com");
        let config = Config::from_env().unwrap();
        assert!(config.app.is_production());
        assert!(!format!("{:?}", config.auth).contains("s3cret"));

        clear_env();
    }

    #[test]
    fn test_public_url_for() {
        let storage = StorageConfig {
            root: PathBuf::from("/srv/storage"),
            public_url: "https://cdn.example.com/storage/".to_string(),
        };
        assert_eq!(
            storage.public_url_for("public/podcasts/ep1.mp3"),
            "https://cdn.example.com/storage/podcasts/ep1.mp3"
        );
        assert_eq!(
            storage.public_url_for("/thumbs/a.jpg"),
            "https://cdn.example.com/storage/thumbs/a.jpg"
        );
    }

    struct Episode {
        audio: Option<&'static str>,
        cover: Option<&'static str>,
    }

    impl MediaPaths for Episode {
        fn media_kind(&self) -> media_core::MediaKind {
            media_core::MediaKind::Podcast
        }
        fn primary_media_path(&self) -> Option<&str> {
            self.audio
        }
        fn thumbnail_path(&self) -> Option<&str> {
            self.cover
        }
    }

    #[test]
    fn test_record_urls_follow_media_paths() {
        let storage = StorageConfig {
            root: PathBuf::from("/srv/storage"),
            public_url: "/storage".to_string(),
        };
        let episode = Episode {
            audio: Some("public/podcasts/ep2.m4a"),
            cover: Some("covers/ep2.png"),
        };
        assert_eq!(
            storage.media_url(&episode).as_deref(),
            Some("/storage/podcasts/ep2.m4a")
        );
        assert_eq!(
            storage.thumbnail_url(&episode).as_deref(),
            Some("/storage/covers/ep2.png")
        );

        let bare = Episode {
            audio: None,
            cover: None,
        };
        assert_eq!(storage.media_url(&bare), None);
        assert_eq!(storage.thumbnail_url(&bare), None);
    }
}
