//! Application configuration.
//!
//! Values are resolved with priority config.toml > .env > built-in default.
//! Scheduling knobs are collected into [`SrsConfig`] and injected where they
//! are used, so tests can vary step sequences without touching globals.

use serde::Deserialize;
use std::path::PathBuf;

// ==================== Server Configuration ====================

pub const SERVER_ADDR: &str = "0.0.0.0";
pub const SERVER_PORT: u16 = 8080;

pub fn server_bind_addr() -> String {
    format!("{}:{}", SERVER_ADDR, SERVER_PORT)
}

// ==================== SRS Configuration ====================

/// Scheduling parameters for the interval engine and queue replenisher.
///
/// The defaults mirror the tuning the service shipped with (a single short
/// learning step and 1/2 day graduation intervals); production deployments
/// override them from the `[srs]` section of config.toml.
#[derive(Debug, Clone, PartialEq)]
pub struct SrsConfig {
    /// Ordered sub-day learning steps, in minutes.
    pub learning_steps: Vec<i64>,
    /// Interval granted on normal graduation, in minutes.
    pub graduation_interval_minutes: i64,
    /// Interval granted on easy graduation, in minutes.
    pub easy_graduation_interval_minutes: i64,
    /// Daily cap on drawing new questions, unless the learner overrides it.
    pub default_new_cards_limit: i64,
    /// Unseen-question count below which a catalog refill is signalled.
    pub catalog_low_water_mark: i64,
}

impl Default for SrsConfig {
    fn default() -> Self {
        Self {
            learning_steps: vec![10],
            graduation_interval_minutes: 1440,
            easy_graduation_interval_minutes: 2880,
            default_new_cards_limit: 5,
            catalog_low_water_mark: 20,
        }
    }
}

// ==================== Grader Configuration ====================

/// Connection settings for the external grading service.
#[derive(Debug, Clone)]
pub struct GraderConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 30,
        }
    }
}

// ==================== File Layout ====================

/// config.toml structure
#[derive(Debug, Default, Deserialize)]
struct AppConfigFile {
    database: Option<DatabaseSection>,
    srs: Option<SrsSection>,
    grader: Option<GraderSection>,
    catalog: Option<CatalogSection>,
}

#[derive(Debug, Deserialize)]
struct DatabaseSection {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SrsSection {
    learning_steps: Option<Vec<i64>>,
    graduation_interval_minutes: Option<i64>,
    easy_graduation_interval_minutes: Option<i64>,
    new_cards_limit: Option<i64>,
    catalog_low_water_mark: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct GraderSection {
    endpoint: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CatalogSection {
    refill_url: Option<String>,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub srs: SrsConfig,
    pub grader: GraderConfig,
    /// Ingestion service to poke when the unseen-question pool runs low.
    /// None disables the refill signal.
    pub catalog_refill_url: Option<String>,
}

impl AppConfig {
    pub fn load() -> Self {
        // Load .env file if present (local development)
        let _ = dotenvy::dotenv();

        let file = read_config_file();

        let database_path = resolve_database_path(&file);

        let mut srs = SrsConfig::default();
        if let Some(section) = &file.srs {
            if let Some(steps) = &section.learning_steps {
                if !steps.is_empty() && steps.iter().all(|m| *m > 0) {
                    srs.learning_steps = steps.clone();
                } else {
                    tracing::warn!("Ignoring invalid srs.learning_steps in config.toml");
                }
            }
            if let Some(v) = section.graduation_interval_minutes {
                srs.graduation_interval_minutes = v;
            }
            if let Some(v) = section.easy_graduation_interval_minutes {
                srs.easy_graduation_interval_minutes = v;
            }
            if let Some(v) = section.new_cards_limit {
                srs.default_new_cards_limit = v;
            }
            if let Some(v) = section.catalog_low_water_mark {
                srs.catalog_low_water_mark = v;
            }
        }

        let mut grader = GraderConfig::default();
        if let Some(section) = &file.grader {
            if let Some(v) = &section.endpoint {
                grader.endpoint = v.clone();
            }
            if let Some(v) = &section.model {
                grader.model = v.clone();
            }
            if let Some(v) = section.timeout_secs {
                grader.timeout_secs = v;
            }
        }
        if let Ok(key) = std::env::var("GRADER_API_KEY") {
            grader.api_key = key;
        }

        let catalog_refill_url = file
            .catalog
            .and_then(|c| c.refill_url)
            .or_else(|| std::env::var("CATALOG_REFILL_URL").ok());

        Self {
            database_path,
            srs,
            grader,
            catalog_refill_url,
        }
    }
}

fn read_config_file() -> AppConfigFile {
    match std::fs::read_to_string("config.toml") {
        Ok(contents) => match toml::from_str::<AppConfigFile>(&contents) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("Failed to parse config.toml: {}", e);
                AppConfigFile::default()
            }
        },
        Err(_) => AppConfigFile::default(),
    }
}

fn resolve_database_path(file: &AppConfigFile) -> PathBuf {
    if let Some(db) = &file.database {
        if let Some(path) = &db.path {
            tracing::info!("Using database from config.toml: {}", path);
            return PathBuf::from(path);
        }
    }

    if let Ok(path) = std::env::var("DATABASE_PATH") {
        tracing::info!("Using database from DATABASE_PATH env: {}", path);
        return PathBuf::from(path);
    }

    let default = PathBuf::from("data/prepdeck.db");
    tracing::info!("Using default database path: {}", default.display());
    default
}
