//! Identities and the resolver seam used by login and authorization.
//!
//! The acting caller is always resolved through [`IdentityResolver`] — either
//! from a login email or from a verified bearer token's subject — never from
//! ambient process state.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::fmt;
use tracing::Instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// Closed role set; assignment happens only through the privileged
/// create-user operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Advisor,
    Student,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Advisor => "ADVISOR",
            Self::Student => "STUDENT",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "ADMIN" => Some(Self::Admin),
            "ADVISOR" => Some(Self::Advisor),
            "STUDENT" => Some(Self::Student),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A provisioned user account. Email is the stable lookup key.
#[derive(Clone, Debug)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Lookup seam for subject identities.
#[allow(async_fn_in_trait)]
pub trait IdentityResolver {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>>;
}

pub struct PgIdentityResolver<'a> {
    pool: &'a PgPool,
}

impl<'a> PgIdentityResolver<'a> {
    #[must_use]
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }
}

fn identity_from_row(row: &PgRow) -> Result<Identity> {
    let role: String = row.get("role");
    let role = Role::parse(&role).ok_or_else(|| anyhow!("invalid role in users table: {role}"))?;
    Ok(Identity {
        id: row.get("id"),
        email: row.get("email"),
        role,
        active: row.get("active"),
        created_at: row.get("created_at"),
    })
}

impl IdentityResolver for PgIdentityResolver<'_> {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>> {
        let query = "SELECT id, email, role, active, created_at FROM users WHERE email = $1";
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
            .context("failed to lookup identity by email")?;

        row.as_ref().map(identity_from_row).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>> {
        let query = "SELECT id, email, role, active, created_at FROM users WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(self.pool)
            .instrument(span)
            .await
            .context("failed to lookup identity by id")?;

        row.as_ref().map(identity_from_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parse_round_trips() {
        for role in [Role::Admin, Role::Advisor, Role::Student] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
    }

    #[test]
    fn role_parse_rejects_unknown() {
        assert_eq!(Role::parse("admin"), None);
        assert_eq!(Role::parse("SUPERUSER"), None);
        assert_eq!(Role::parse(""), None);
    }

    #[test]
    fn role_serde_uses_screaming_snake_case() -> Result<()> {
        let json = serde_json::to_string(&Role::Advisor)?;
        assert_eq!(json, "\"ADVISOR\"");
        let decoded: Role = serde_json::from_str("\"STUDENT\"")?;
        assert_eq!(decoded, Role::Student);
        Ok(())
    }

    #[test]
    fn role_display_matches_as_str() {
        assert_eq!(Role::Admin.to_string(), "ADMIN");
    }
}
