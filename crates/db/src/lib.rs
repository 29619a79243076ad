//! PostgreSQL access for the QR-token sweep.
//!
//! The sweep opens exactly one connection per invocation, so this crate
//! builds [`PgConnectOptions`] rather than a pool. Pools only appear in
//! tests, where `#[sqlx::test]` hands one out.

use std::time::Duration;

use qr_sweep_core::tls::{TlsMode, TlsPolicy};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::{Connection, PgConnection, PgExecutor};

pub mod repositories;

/// Map the configured TLS mode onto the driver's `sslmode`.
pub fn ssl_mode(mode: TlsMode) -> PgSslMode {
    match mode {
        TlsMode::Disable => PgSslMode::Disable,
        TlsMode::Prefer => PgSslMode::Prefer,
        TlsMode::Require => PgSslMode::Require,
        TlsMode::VerifyCa => PgSslMode::VerifyCa,
        TlsMode::VerifyFull => PgSslMode::VerifyFull,
    }
}

/// Build connect options from a database URL.
///
/// An explicit TLS policy always replaces any `sslmode` in the URL. A
/// fallback policy only applies when the URL names no `sslmode`. A
/// statement timeout, when given, is sent as the `statement_timeout`
/// session parameter in milliseconds.
pub fn connect_options(
    database_url: &str,
    tls: TlsPolicy,
    statement_timeout: Option<Duration>,
) -> Result<PgConnectOptions, sqlx::Error> {
    let mut options: PgConnectOptions = database_url.parse()?;

    if tls.is_explicit() || !url_names_sslmode(database_url) {
        options = options.ssl_mode(ssl_mode(tls.mode()));
    }

    if let Some(timeout) = statement_timeout {
        options = options.options([("statement_timeout", timeout.as_millis().to_string())]);
    }

    Ok(options)
}

/// Whether a connection in this mode may be encrypted without checking
/// the server certificate.
pub fn is_unverified(mode: PgSslMode) -> bool {
    matches!(mode, PgSslMode::Allow | PgSslMode::Prefer | PgSslMode::Require)
}

/// Whether the URL query carries `sslmode` (or sqlx's `ssl-mode` alias).
fn url_names_sslmode(database_url: &str) -> bool {
    database_url.split_once('?').is_some_and(|(_, query)| {
        query
            .split('&')
            .filter_map(|pair| pair.split('=').next())
            .any(|key| key.eq_ignore_ascii_case("sslmode") || key.eq_ignore_ascii_case("ssl-mode"))
    })
}

/// Open a single, unpooled connection.
pub async fn connect(options: &PgConnectOptions) -> Result<PgConnection, sqlx::Error> {
    let conn = PgConnection::connect_with(options).await?;
    tracing::debug!(host = options.get_host(), "Database connection opened");
    Ok(conn)
}

/// Verify the database answers a trivial query.
pub async fn health_check<'e, E>(executor: E) -> Result<(), sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query("SELECT 1").execute(executor).await?;
    Ok(())
}
