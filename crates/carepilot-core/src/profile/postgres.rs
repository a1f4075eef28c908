use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::types::{Identity, ProfileData};

use super::{ProfileStore, StoreError};

/// Postgres-backed store. The profile is one JSON document per user; the
/// core treats it as opaque apart from the sections it owns, so unknown
/// fields written by other tools survive the round trip.
#[derive(Debug, Clone)]
pub struct PostgresProfileStore {
    pool: PgPool,
}

impl PostgresProfileStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS profiles (
                 user_id TEXT PRIMARY KEY,
                 document TEXT NOT NULL,
                 updated_at TIMESTAMPTZ NOT NULL
             )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS active_session (
                 slot BOOLEAN PRIMARY KEY DEFAULT TRUE,
                 user_id TEXT NOT NULL,
                 email TEXT NOT NULL,
                 display_name TEXT NOT NULL,
                 updated_at TIMESTAMPTZ NOT NULL
             )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PostgresProfileStore {
    async fn load_profile(&self, identity: &Identity) -> Result<ProfileData, StoreError> {
        let row = sqlx::query_as::<_, (String,)>("SELECT document FROM profiles WHERE user_id = $1")
            .bind(identity.user_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(anyhow::Error::from)?;

        let Some((document,)) = row else {
            return Err(StoreError::NotFound);
        };
        let profile = serde_json::from_str(&document).map_err(anyhow::Error::from)?;
        Ok(profile)
    }

    async fn save_profile(
        &self,
        identity: &Identity,
        profile: &ProfileData,
    ) -> Result<(), StoreError> {
        let document = serde_json::to_string(profile).map_err(anyhow::Error::from)?;

        sqlx::query(
            "INSERT INTO profiles (user_id, document, updated_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id)
             DO UPDATE SET document = EXCLUDED.document, updated_at = EXCLUDED.updated_at",
        )
        .bind(identity.user_id.as_str())
        .bind(document)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await
        .map_err(anyhow::Error::from)?;

        Ok(())
    }

    async fn current_session(&self) -> Result<Option<Identity>, StoreError> {
        let row = sqlx::query_as::<_, (String, String, String)>(
            "SELECT user_id, email, display_name FROM active_session WHERE slot = TRUE",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(anyhow::Error::from)?;

        Ok(row.map(|(user_id, email, display_name)| Identity {
            user_id,
            email,
            display_name,
        }))
    }

    async fn set_current_session(&self, identity: Option<&Identity>) -> Result<(), StoreError> {
        match identity {
            Some(identity) => {
                sqlx::query(
                    "INSERT INTO active_session (slot, user_id, email, display_name, updated_at)
                     VALUES (TRUE, $1, $2, $3, $4)
                     ON CONFLICT (slot)
                     DO UPDATE SET user_id = EXCLUDED.user_id, email = EXCLUDED.email, display_name = EXCLUDED.display_name, updated_at = EXCLUDED.updated_at",
                )
                .bind(identity.user_id.as_str())
                .bind(identity.email.as_str())
                .bind(identity.display_name.as_str())
                .bind(chrono::Utc::now())
                .execute(&self.pool)
                .await
                .map_err(anyhow::Error::from)?;
            }
            None => {
                sqlx::query("DELETE FROM active_session WHERE slot = TRUE")
                    .execute(&self.pool)
                    .await
                    .map_err(anyhow::Error::from)?;
            }
        }

        Ok(())
    }
}
