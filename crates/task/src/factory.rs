//! Connection factory seam.
//!
//! The cleanup task never builds a connection itself. It asks a
//! [`ConnectionFactory`] for one, runs the statement through the
//! [`SessionConnection`] it gets back, and closes it. Production wires in
//! [`PgConnectionFactory`]; tests substitute in-memory doubles.

use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::PgConnection;
use qr_sweep_db::repositories::SessionRepo;

/// An open connection able to run the sweep.
#[async_trait]
pub trait SessionConnection: Send {
    /// Run the clear statement, returning the number of rows changed.
    async fn clear_expired_qr_tokens(&mut self) -> Result<u64, sqlx::Error>;

    /// Trivial round trip used by health reporting.
    async fn ping(&mut self) -> Result<(), sqlx::Error>;

    /// Release the connection.
    async fn close(self) -> Result<(), sqlx::Error>;
}

/// Produces one fresh connection per call.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    type Connection: SessionConnection;

    async fn connect(&self) -> Result<Self::Connection, sqlx::Error>;
}

// ---------------------------------------------------------------------------
// PostgreSQL
// ---------------------------------------------------------------------------

/// Opens a single, unpooled PostgreSQL connection per call.
#[derive(Debug, Clone)]
pub struct PgConnectionFactory {
    options: PgConnectOptions,
}

impl PgConnectionFactory {
    pub fn new(options: PgConnectOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl ConnectionFactory for PgConnectionFactory {
    type Connection = PgConnection;

    async fn connect(&self) -> Result<PgConnection, sqlx::Error> {
        qr_sweep_db::connect(&self.options).await
    }
}

#[async_trait]
impl SessionConnection for PgConnection {
    async fn clear_expired_qr_tokens(&mut self) -> Result<u64, sqlx::Error> {
        SessionRepo::clear_expired_qr_tokens(&mut *self).await
    }

    async fn ping(&mut self) -> Result<(), sqlx::Error> {
        qr_sweep_db::health_check(&mut *self).await
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        sqlx::Connection::close(self).await
    }
}
