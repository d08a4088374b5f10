//! Runtime settings read from the environment.

use std::collections::HashSet;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use movies_etl_shared::EntityType;
use sqlx::postgres::PgConnectOptions;

use crate::orchestrator::{OrchestratorConfig, PartialFailurePolicy};
use crate::retry::{RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY};
use crate::IndexingError;

/// Default OpenSearch URL.
const DEFAULT_OPENSEARCH_URL: &str = "http://localhost:9200";

/// Default OpenSearch request timeout in seconds.
const DEFAULT_OPENSEARCH_TIMEOUT_SECS: u64 = 30;

/// Default number of rows per batch.
const DEFAULT_BATCH_SIZE: usize = 100;

/// Default pause between cycles in seconds.
const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Default PostgreSQL pool size.
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Default watermark file.
const DEFAULT_STATE_FILE: &str = "etl_state.json";

const DEFAULT_POSTGRES_HOST: &str = "localhost";
const DEFAULT_POSTGRES_PORT: u16 = 5432;

/// How to reach the source database.
#[derive(Clone, PartialEq, Eq)]
pub enum DatabaseSettings {
    /// A full `postgres://` connection string.
    Url(String),
    /// Individual connection parameters.
    Params {
        host: String,
        port: u16,
        database: String,
        user: String,
        password: Option<String>,
    },
}

impl DatabaseSettings {
    /// Build `sqlx` connect options.
    pub fn connect_options(&self) -> Result<PgConnectOptions, IndexingError> {
        match self {
            Self::Url(url) => PgConnectOptions::from_str(url)
                .map_err(|e| IndexingError::config(format!("Invalid DATABASE_URL: {}", e))),
            Self::Params {
                host,
                port,
                database,
                user,
                password,
            } => {
                let options = PgConnectOptions::new()
                    .host(host)
                    .port(*port)
                    .database(database)
                    .username(user);
                Ok(match password {
                    Some(password) => options.password(password),
                    None => options,
                })
            }
        }
    }
}

// Credentials stay out of logs.
impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(_) => f.debug_tuple("Url").field(&"<redacted>").finish(),
            Self::Params {
                host,
                port,
                database,
                user,
                ..
            } => f
                .debug_struct("Params")
                .field("host", host)
                .field("port", port)
                .field("database", database)
                .field("user", user)
                .finish_non_exhaustive(),
        }
    }
}

/// Where watermarks are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateBackend {
    /// The `etl_state` table in the source database.
    Postgres,
    /// A JSON file on local disk.
    File(PathBuf),
}

/// All settings the ETL needs, validated up front.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub database_max_connections: u32,
    pub opensearch_url: String,
    pub opensearch_timeout: Duration,
    pub entities: Vec<EntityType>,
    pub state_backend: StateBackend,
    pub retry: RetryPolicy,
    pub orchestrator: OrchestratorConfig,
}

impl Settings {
    /// Read settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: PostgreSQL connection string, or the individual
    ///   `POSTGRES_HOST` (default: localhost), `POSTGRES_PORT` (default: 5432),
    ///   `POSTGRES_DB`, `POSTGRES_USER` and `POSTGRES_PASSWORD`
    /// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
    /// - `OPENSEARCH_URL`: OpenSearch server URL (default: http://localhost:9200)
    /// - `OPENSEARCH_TIMEOUT_SECS`: Per-request timeout (default: 30)
    /// - `ETL_ENTITIES`: Comma-separated entity types in processing order
    ///   (default: film_work,genre,person)
    /// - `ETL_BATCH_SIZE`: Rows per batch (default: 100)
    /// - `ETL_INTERVAL_SECS`: Pause between cycles (default: 60)
    /// - `ETL_MAX_ATTEMPTS`: Total attempts per external call (default: 10)
    /// - `ETL_RETRY_BASE_DELAY_MS`: Base backoff delay (default: 100)
    /// - `ETL_RETRY_MAX_DELAY_SECS`: Backoff cap (default: 10)
    /// - `ETL_STATE_BACKEND`: "file" or "postgres" (default: file)
    /// - `ETL_STATE_FILE`: Watermark file for the file backend (default: etl_state.json)
    /// - `ETL_PARTIAL_FAILURE_POLICY`: "advance" or "hold" (default: advance)
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the raw value of a key.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, IndexingError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database = match get("DATABASE_URL") {
            Some(url) => DatabaseSettings::Url(url),
            None => DatabaseSettings::Params {
                host: get("POSTGRES_HOST").unwrap_or_else(|| DEFAULT_POSTGRES_HOST.to_string()),
                port: parse_or(&get, "POSTGRES_PORT", DEFAULT_POSTGRES_PORT)?,
                database: require(&get, "POSTGRES_DB")?,
                user: require(&get, "POSTGRES_USER")?,
                password: get("POSTGRES_PASSWORD"),
            },
        };

        let database_max_connections = parse_or(
            &get,
            "DATABASE_MAX_CONNECTIONS",
            DEFAULT_DATABASE_MAX_CONNECTIONS,
        )?;
        if database_max_connections == 0 {
            return Err(IndexingError::config(
                "DATABASE_MAX_CONNECTIONS must be greater than 0",
            ));
        }

        let opensearch_url =
            get("OPENSEARCH_URL").unwrap_or_else(|| DEFAULT_OPENSEARCH_URL.to_string());
        let opensearch_timeout_secs = parse_or(
            &get,
            "OPENSEARCH_TIMEOUT_SECS",
            DEFAULT_OPENSEARCH_TIMEOUT_SECS,
        )?;
        if opensearch_timeout_secs == 0 {
            return Err(IndexingError::config(
                "OPENSEARCH_TIMEOUT_SECS must be greater than 0",
            ));
        }
        let opensearch_timeout = Duration::from_secs(opensearch_timeout_secs);

        let entities = match get("ETL_ENTITIES") {
            Some(raw) => parse_entities(&raw)?,
            None => EntityType::ALL.to_vec(),
        };

        let batch_size = parse_or(&get, "ETL_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(IndexingError::config("ETL_BATCH_SIZE must be greater than 0"));
        }

        let max_attempts = parse_or(&get, "ETL_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(IndexingError::config("ETL_MAX_ATTEMPTS must be at least 1"));
        }
        let base_delay = Duration::from_millis(parse_or(
            &get,
            "ETL_RETRY_BASE_DELAY_MS",
            DEFAULT_BASE_DELAY.as_millis() as u64,
        )?);
        let max_delay = Duration::from_secs(parse_or(
            &get,
            "ETL_RETRY_MAX_DELAY_SECS",
            DEFAULT_MAX_DELAY.as_secs(),
        )?);
        let retry = RetryPolicy::new(max_attempts, base_delay, max_delay);

        let state_backend = match get("ETL_STATE_BACKEND")
            .unwrap_or_else(|| "file".to_string())
            .to_lowercase()
            .as_str()
        {
            "file" => StateBackend::File(PathBuf::from(
                get("ETL_STATE_FILE").unwrap_or_else(|| DEFAULT_STATE_FILE.to_string()),
            )),
            "postgres" | "postgresql" => StateBackend::Postgres,
            other => {
                return Err(IndexingError::config(format!(
                    "Invalid ETL_STATE_BACKEND '{}', expected 'file' or 'postgres'",
                    other
                )))
            }
        };

        let partial_failure_policy = match get("ETL_PARTIAL_FAILURE_POLICY") {
            Some(raw) => raw.parse::<PartialFailurePolicy>().map_err(|e| {
                IndexingError::config(format!("Invalid ETL_PARTIAL_FAILURE_POLICY: {}", e))
            })?,
            None => PartialFailurePolicy::default(),
        };

        let interval = Duration::from_secs(parse_or(
            &get,
            "ETL_INTERVAL_SECS",
            DEFAULT_INTERVAL_SECS,
        )?);

        Ok(Self {
            database,
            database_max_connections,
            opensearch_url,
            opensearch_timeout,
            entities,
            state_backend,
            retry,
            orchestrator: OrchestratorConfig {
                batch_size,
                interval,
                partial_failure_policy,
            },
        })
    }
}

fn require<G>(get: &G, key: &str) -> Result<String, IndexingError>
where
    G: Fn(&str) -> Option<String>,
{
    get(key).ok_or_else(|| {
        IndexingError::config(format!(
            "{} is required when DATABASE_URL is not set",
            key
        ))
    })
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> Result<T, IndexingError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| IndexingError::config(format!("Invalid {} '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

fn parse_entities(raw: &str) -> Result<Vec<EntityType>, IndexingError> {
    let mut seen = HashSet::new();
    let mut entities = Vec::new();

    for tag in raw.split(',').map(str::trim).filter(|tag| !tag.is_empty()) {
        let entity_type = tag
            .parse::<EntityType>()
            .map_err(|e| IndexingError::config(format!("Invalid ETL_ENTITIES: {}", e)))?;
        if !seen.insert(entity_type) {
            return Err(IndexingError::config(format!(
                "Invalid ETL_ENTITIES: '{}' is listed more than once",
                entity_type
            )));
        }
        entities.push(entity_type);
    }

    if entities.is_empty() {
        return Err(IndexingError::config(
            "ETL_ENTITIES must name at least one entity type",
        ));
    }

    Ok(entities)
}
