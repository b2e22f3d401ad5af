/*
 * Responsibility
 * - Append-only log of granted downloads (download_access_log)
 * - The signed URL itself is never stored
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadAuditEntry {
    pub user_id: String,
    pub user_email: Option<String>,
    pub download_token: Uuid,
    pub accessed_at: DateTime<Utc>,
}

#[async_trait]
pub trait DownloadAuditLog: Send + Sync {
    async fn record(&self, entry: DownloadAuditEntry) -> RepoResult<()>;
}

#[derive(Clone, Debug)]
pub struct PgDownloadAuditLog {
    pool: PgPool,
}

impl PgDownloadAuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DownloadAuditLog for PgDownloadAuditLog {
    async fn record(&self, entry: DownloadAuditEntry) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO download_access_log (user_id, user_email, download_token, accessed_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&entry.user_id)
        .bind(entry.user_email.as_deref())
        .bind(entry.download_token)
        .bind(entry.accessed_at)
        .execute(&self.pool)
        .await
        .map_err(RepoError::Db)?;

        Ok(())
    }
}
