//! Repository for the QR-login columns of the `sessions` table.

use sqlx::PgExecutor;

/// Queries over session QR tokens.
pub struct SessionRepo;

impl SessionRepo {
    /// Clear the QR token and its expiry on every session whose token has
    /// expired. Returns the count of cleared rows.
    ///
    /// Sessions without a token are excluded and not counted, so running
    /// this twice in a row clears nothing the second time.
    pub async fn clear_expired_qr_tokens<'e, E>(executor: E) -> Result<u64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE sessions SET qr_token = NULL, qr_expires_at = NULL
             WHERE qr_expires_at < NOW() AND qr_token IS NOT NULL",
        )
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }
}
