use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use qr_sweep_core::tls::TlsPolicy;
use sqlx::postgres::PgConnectOptions;

use crate::error::ConfigError;

/// Default tick interval in `schedule` mode: 1 hour.
pub const DEFAULT_INTERVAL_SECS: u64 = 3600;

/// How the binary is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Run one invocation, print the body, exit.
    Once,
    /// Expose `POST /invoke` over HTTP.
    Serve,
    /// Invoke on a fixed in-process interval.
    Schedule,
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(Self::Once),
            "serve" => Ok(Self::Serve),
            "schedule" => Ok(Self::Schedule),
            other => Err(ConfigError::Invalid {
                var: "CLEANUP_MODE",
                reason: format!("unknown mode '{other}'; expected once, serve or schedule"),
            }),
        }
    }
}

/// Task configuration loaded from environment variables.
#[derive(Clone)]
pub struct TaskConfig {
    /// PostgreSQL URL. May embed credentials, so it is never logged.
    pub database_url: String,
    /// Explicit `DB_TLS_MODE`, or the `APP_ENV` fallback that yields to an
    /// `sslmode` in the URL.
    pub tls: TlsPolicy,
    /// Sent to the server as `statement_timeout`.
    pub statement_timeout: Option<Duration>,
    pub mode: RunMode,
    /// Tick interval in `schedule` mode.
    pub interval: Duration,
    /// Bind address in `serve` mode.
    pub host: String,
    pub port: u16,
}

impl TaskConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                   | Default        |
    /// |---------------------------|----------------|
    /// | `DATABASE_URL`            | required       |
    /// | `DB_TLS_MODE`             | from `APP_ENV` |
    /// | `APP_ENV`                 | `development`  |
    /// | `DB_STATEMENT_TIMEOUT_MS` | unset          |
    /// | `CLEANUP_MODE`            | `once`         |
    /// | `CLEANUP_INTERVAL_SECS`   | `3600`         |
    /// | `HOST`                    | `0.0.0.0`      |
    /// | `PORT`                    | `3000`         |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let app_env = var("APP_ENV").unwrap_or_else(|| "development".into());
        let tls = TlsPolicy::resolve(var("DB_TLS_MODE").as_deref(), &app_env).map_err(|e| {
            ConfigError::Invalid {
                var: "DB_TLS_MODE",
                reason: e.to_string(),
            }
        })?;

        let statement_timeout = var("DB_STATEMENT_TIMEOUT_MS")
            .map(|raw| parse_positive("DB_STATEMENT_TIMEOUT_MS", &raw))
            .transpose()?
            .map(Duration::from_millis);

        let mode = match var("CLEANUP_MODE") {
            Some(raw) => raw.parse()?,
            None => RunMode::Once,
        };

        let interval_secs = match var("CLEANUP_INTERVAL_SECS") {
            Some(raw) => parse_positive("CLEANUP_INTERVAL_SECS", &raw)?,
            None => DEFAULT_INTERVAL_SECS,
        };

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match var("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                reason: format!("'{raw}' is not a valid port"),
            })?,
            None => 3000,
        };

        Ok(Self {
            database_url,
            tls,
            statement_timeout,
            mode,
            interval: Duration::from_secs(interval_secs),
            host,
            port,
        })
    }

    /// Connect options for the configured database.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        qr_sweep_db::connect_options(&self.database_url, self.tls, self.statement_timeout)
            .map_err(|e| ConfigError::Invalid {
                var: "DATABASE_URL",
                reason: e.to_string(),
            })
    }
}

impl fmt::Debug for TaskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskConfig")
            .field("database_url", &"<redacted>")
            .field("tls", &self.tls)
            .field("statement_timeout", &self.statement_timeout)
            .field("mode", &self.mode)
            .field("interval", &self.interval)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

fn parse_positive(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(ConfigError::Invalid {
            var,
            reason: format!("'{raw}' is not a positive integer"),
        }),
        Ok(n) => Ok(n),
    }
}
