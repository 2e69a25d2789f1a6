//! Keyed storage for pending OTP challenges.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::Instrument;

/// An in-flight OTP challenge for one subject email.
#[derive(Clone, Debug)]
pub struct PendingChallenge {
    pub email: String,
    pub otp_hash: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
}

impl PendingChallenge {
    /// Expiry is checked lazily at verification time; an expired record may
    /// still be present and must be rejected.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Single-record-per-email challenge storage.
///
/// `put` replaces any existing record for the email, and a `get` immediately
/// after a `put` observes the written value. No history is retained.
#[allow(async_fn_in_trait)]
pub trait VerificationStore {
    async fn put(&self, email: &str, otp_hash: &str, expires_at: DateTime<Utc>) -> Result<()>;
    async fn get(&self, email: &str) -> Result<Option<PendingChallenge>>;
    async fn delete(&self, email: &str) -> Result<()>;
    /// Count a failed verification; returns the updated attempt count.
    async fn record_failure(&self, email: &str) -> Result<i32>;
}

pub struct PgVerificationStore<'a> {
    pool: &'a PgPool,
}

impl<'a> PgVerificationStore<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

impl VerificationStore for PgVerificationStore<'_> {
    async fn put(&self, email: &str, otp_hash: &str, expires_at: DateTime<Utc>) -> Result<()> {
        // The upsert replaces the whole row atomically, so concurrent sends
        // for the same email resolve to last-writer-wins, never a torn record.
        let query = r"
            INSERT INTO email_verifications (email, otp_hash, expires_at, attempts)
            VALUES ($1, $2, $3, 0)
            ON CONFLICT (email) DO UPDATE
            SET otp_hash = EXCLUDED.otp_hash,
                expires_at = EXCLUDED.expires_at,
                attempts = 0
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(email)
            .bind(otp_hash)
            .bind(expires_at)
            .execute(self.pool)
            .instrument(span)
            .await
            .context("failed to store pending challenge")?;
        Ok(())
    }

    async fn get(&self, email: &str) -> Result<Option<PendingChallenge>> {
        let query = r"
            SELECT email, otp_hash, expires_at, attempts
            FROM email_verifications
            WHERE email = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(self.pool)
            .instrument(span)
            .await
            .context("failed to load pending challenge")?;

        Ok(row.map(|row| PendingChallenge {
            email: row.get("email"),
            otp_hash: row.get("otp_hash"),
            expires_at: row.get("expires_at"),
            attempts: row.get("attempts"),
        }))
    }

    async fn delete(&self, email: &str) -> Result<()> {
        // Idempotent; deleting an absent record is fine.
        let query = "DELETE FROM email_verifications WHERE email = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(email)
            .execute(self.pool)
            .instrument(span)
            .await
            .context("failed to delete pending challenge")?;
        Ok(())
    }

    async fn record_failure(&self, email: &str) -> Result<i32> {
        let query = r"
            UPDATE email_verifications
            SET attempts = attempts + 1
            WHERE email = $1
            RETURNING attempts
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(self.pool)
            .instrument(span)
            .await
            .context("failed to record challenge failure")?;

        Ok(row.map_or(0, |row| row.get("attempts")))
    }
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory store with the same per-email semantics, for engine tests.

    use super::{PendingChallenge, Result, VerificationStore};
    use chrono::{DateTime, Utc};
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub(crate) struct MemoryVerificationStore {
        records: Mutex<HashMap<String, PendingChallenge>>,
    }

    impl VerificationStore for MemoryVerificationStore {
        async fn put(&self, email: &str, otp_hash: &str, expires_at: DateTime<Utc>) -> Result<()> {
            self.records.lock().unwrap().insert(
                email.to_string(),
                PendingChallenge {
                    email: email.to_string(),
                    otp_hash: otp_hash.to_string(),
                    expires_at,
                    attempts: 0,
                },
            );
            Ok(())
        }

        async fn get(&self, email: &str) -> Result<Option<PendingChallenge>> {
            Ok(self.records.lock().unwrap().get(email).cloned())
        }

        async fn delete(&self, email: &str) -> Result<()> {
            self.records.lock().unwrap().remove(email);
            Ok(())
        }

        async fn record_failure(&self, email: &str) -> Result<i32> {
            let mut records = self.records.lock().unwrap();
            match records.get_mut(email) {
                Some(record) => {
                    record.attempts += 1;
                    Ok(record.attempts)
                }
                None => Ok(0),
            }
        }
    }
}
