use crate::core::reconciler::plan_merge;
use crate::models::{
    Interest, Profile, ProfileAttributes, RankedCandidate, ShortlistEntry, ShortlistStatus,
};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// PostgreSQL client backing both the profile store and the shortlist
/// store
///
/// Both stores live in the same database so that one refresh merge can
/// run as a single transaction. The client is the only place SQL lives;
/// the reconciler core only sees typed rows and the merge plan.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    // ---- Profile store ----

    /// Fetch a single profile, or None if the user has never saved one
    ///
    /// Malformed attribute data degrades to an empty bag instead of
    /// failing the lookup; the profile stays eligible for matching as
    /// long as its embedding is present.
    pub async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>, StoreError> {
        let query = r#"
            SELECT user_id, profile_data, embedding, created_at, updated_at
            FROM profiles
            WHERE user_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| profile_from_row(&row)))
    }

    /// List every profile with an embedding, excluding the given user
    ///
    /// This is the candidate pool for a refresh. A row whose attribute
    /// data cannot be decoded is logged and dropped so one bad profile
    /// never blocks the batch.
    pub async fn list_embedded_profiles(
        &self,
        excluding: &str,
    ) -> Result<Vec<Profile>, StoreError> {
        let query = r#"
            SELECT user_id, profile_data, embedding, created_at, updated_at
            FROM profiles
            WHERE embedding IS NOT NULL AND user_id <> $1
            ORDER BY user_id
        "#;

        let rows = sqlx::query(query)
            .bind(excluding)
            .fetch_all(&self.pool)
            .await?;

        let profiles: Vec<Profile> = rows
            .iter()
            .filter_map(|row| {
                let user_id: String = row.get("user_id");
                let data: serde_json::Value = row.get("profile_data");
                match serde_json::from_value::<ProfileAttributes>(data) {
                    Ok(attributes) => Some(Profile {
                        user_id,
                        attributes,
                        embedding: row.get("embedding"),
                        created_at: row.get("created_at"),
                        updated_at: row.get("updated_at"),
                    }),
                    Err(e) => {
                        tracing::warn!("Skipping candidate {}: malformed attributes: {}", user_id, e);
                        None
                    }
                }
            })
            .collect();

        tracing::debug!("Candidate pool for {}: {} profiles", excluding, profiles.len());

        Ok(profiles)
    }

    /// Create or replace a user's attribute bag
    ///
    /// The embedding column is left alone here: it is only ever written
    /// by `set_embedding` after the provider has produced a vector, so
    /// a failed provider call leaves it absent rather than stale-empty.
    pub async fn upsert_attributes(
        &self,
        user_id: &str,
        attributes: &ProfileAttributes,
    ) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO profiles (user_id, profile_data, created_at, updated_at)
            VALUES ($1, $2, NOW(), NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                profile_data = EXCLUDED.profile_data,
                updated_at = NOW()
        "#;

        sqlx::query(query)
            .bind(user_id)
            .bind(Json(attributes))
            .execute(&self.pool)
            .await?;

        tracing::debug!("Saved attributes for {}", user_id);

        Ok(())
    }

    /// Store a freshly computed embedding for a profile
    pub async fn set_embedding(&self, user_id: &str, embedding: &[f64]) -> Result<(), StoreError> {
        let query = r#"
            UPDATE profiles
            SET embedding = $2, updated_at = NOW()
            WHERE user_id = $1
        "#;

        let result = sqlx::query(query)
            .bind(user_id)
            .bind(embedding)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!(
                "Profile not found for user {}",
                user_id
            )));
        }

        Ok(())
    }

    /// The ordered canonical interest taxonomy
    ///
    /// Consumed by upstream attribute collection, not by scoring.
    pub async fn interest_taxonomy(&self) -> Result<Vec<Interest>, StoreError> {
        let query = r#"
            SELECT id, name
            FROM interests
            ORDER BY id
        "#;

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| Interest {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    // ---- Shortlist store ----

    /// All shortlist entries for a subject, best score first
    pub async fn list_entries(&self, subject_id: &str) -> Result<Vec<ShortlistEntry>, StoreError> {
        let query = r#"
            SELECT subject_id, candidate_id, score, status, created_at, updated_at
            FROM shortlist_entries
            WHERE subject_id = $1
            ORDER BY score DESC, candidate_id
        "#;

        let rows = sqlx::query(query)
            .bind(subject_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(entry_from_row).collect())
    }

    /// Merge a fresh ranking into the subject's persisted shortlist
    ///
    /// Runs as one transaction: either the full top-K view lands or
    /// nothing changes. A per-subject advisory lock serializes racing
    /// refreshes for the same subject; the lock is released with the
    /// transaction. The SQL itself re-checks `status = 'suggested'` on
    /// every write so a user action committed after our snapshot still
    /// wins.
    ///
    /// Returns the number of suggested entries inserted or re-scored.
    pub async fn apply_refresh(
        &self,
        subject_id: &str,
        ranked: &[RankedCandidate],
    ) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1)::bigint)")
            .bind(subject_id)
            .execute(&mut *tx)
            .await?;

        let existing_rows = sqlx::query(
            r#"
            SELECT subject_id, candidate_id, score, status, created_at, updated_at
            FROM shortlist_entries
            WHERE subject_id = $1
            "#,
        )
        .bind(subject_id)
        .fetch_all(&mut *tx)
        .await?;

        let existing: Vec<ShortlistEntry> = existing_rows.iter().map(entry_from_row).collect();
        let plan = plan_merge(ranked, &existing);

        for candidate in &plan.upserts {
            sqlx::query(
                r#"
                INSERT INTO shortlist_entries (subject_id, candidate_id, score, status, created_at, updated_at)
                VALUES ($1, $2, $3, 'suggested', NOW(), NOW())
                ON CONFLICT (subject_id, candidate_id)
                DO UPDATE SET
                    score = EXCLUDED.score,
                    updated_at = NOW()
                WHERE shortlist_entries.status = 'suggested'
                "#,
            )
            .bind(subject_id)
            .bind(&candidate.candidate_id)
            .bind(candidate.score)
            .execute(&mut *tx)
            .await?;
        }

        for candidate_id in &plan.deletes {
            sqlx::query(
                r#"
                DELETE FROM shortlist_entries
                WHERE subject_id = $1 AND candidate_id = $2 AND status = 'suggested'
                "#,
            )
            .bind(subject_id)
            .bind(candidate_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            "Merged shortlist for {}: {} upserts, {} deletes, {} retained",
            subject_id,
            plan.upserts.len(),
            plan.deletes.len(),
            plan.retained.len()
        );

        Ok(plan.upserts.len())
    }

    /// Apply a user action to a suggested entry
    ///
    /// The state machine is enforced here, not by convention: the only
    /// transition this write can make is out of `suggested`, so a
    /// repeated or late action on an already-acted entry is a no-op.
    /// Returns whether a transition actually happened.
    pub async fn record_action(
        &self,
        subject_id: &str,
        candidate_id: &str,
        status: ShortlistStatus,
    ) -> Result<bool, StoreError> {
        let query = r#"
            UPDATE shortlist_entries
            SET status = $3, updated_at = NOW()
            WHERE subject_id = $1 AND candidate_id = $2 AND status = 'suggested'
        "#;

        let result = sqlx::query(query)
            .bind(subject_id)
            .bind(candidate_id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        let transitioned = result.rows_affected() > 0;

        tracing::debug!(
            "Action on {} -> {}: {:?} (transitioned: {})",
            subject_id,
            candidate_id,
            status,
            transitioned
        );

        Ok(transitioned)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn profile_from_row(row: &PgRow) -> Profile {
    let user_id: String = row.get("user_id");
    let data: serde_json::Value = row.get("profile_data");
    let attributes = serde_json::from_value(data).unwrap_or_else(|e| {
        tracing::warn!("Malformed attributes for {}, treating as empty: {}", user_id, e);
        ProfileAttributes::default()
    });

    Profile {
        user_id,
        attributes,
        embedding: row.get("embedding"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn entry_from_row(row: &PgRow) -> ShortlistEntry {
    ShortlistEntry {
        subject_id: row.get("subject_id"),
        candidate_id: row.get("candidate_id"),
        score: row.get("score"),
        status: row.get("status"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NotFound("Profile not found for user u1".to_string());
        assert_eq!(err.to_string(), "Not found: Profile not found for user u1");
    }
}
