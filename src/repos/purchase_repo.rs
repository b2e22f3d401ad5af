/*
 * Responsibility
 * - orders / order_items / products reads needed for download authorization
 * - read-only: checkout and payment webhooks own the writes
 * - row order is insertion order (created_at, then id) so "first match" is stable
 */
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::{RepoError, RepoResult};
use crate::services::identity::Principal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Paid,
    Refunded,
    Unknown(String),
}

impl OrderStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "paid" | "completed" => Self::Paid,
            "refunded" => Self::Refunded,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    /// Only paid orders unlock downloads (`completed` parses as paid).
    pub fn is_qualifying(&self) -> bool {
        matches!(self, Self::Paid)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
    pub id: Uuid,
    pub status: String,
}

impl OrderRow {
    pub fn status(&self) -> OrderStatus {
        OrderStatus::parse(&self.status)
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderItemRow {
    pub product_id: Option<Uuid>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub title: String,
    pub file_path: Option<String>,
    pub file_url: Option<String>,
}

impl ProductRow {
    /// Exact string equality against either stored location. No prefix or fuzzy matching.
    pub fn serves(&self, requested_path: &str) -> bool {
        self.file_path.as_deref() == Some(requested_path)
            || self.file_url.as_deref() == Some(requested_path)
    }
}

/// Email that may claim guest orders (no user id) for this principal.
///
/// Only a verified address counts: anyone can register an unconfirmed account
/// under someone else's email.
pub fn guest_email(principal: &Principal) -> Option<&str> {
    principal.email.as_deref().filter(|_| principal.verified)
}

#[async_trait]
pub trait PurchaseRepository: Send + Sync {
    /// Orders owned by the principal. Guest orders (no user id) match on
    /// [`guest_email`].
    async fn list_orders_for_principal(&self, principal: &Principal) -> RepoResult<Vec<OrderRow>>;

    async fn list_order_items(&self, order_id: Uuid) -> RepoResult<Vec<OrderItemRow>>;

    async fn get_product(&self, product_id: Uuid) -> RepoResult<Option<ProductRow>>;
}

#[derive(Clone, Debug)]
pub struct PgPurchaseRepo {
    pool: PgPool,
}

impl PgPurchaseRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PurchaseRepository for PgPurchaseRepo {
    async fn list_orders_for_principal(&self, principal: &Principal) -> RepoResult<Vec<OrderRow>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, status
            FROM orders
            WHERE user_id::text = $1
               OR (user_id IS NULL AND $2::text IS NOT NULL AND lower(customer_email) = lower($2))
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(&principal.id)
        .bind(guest_email(principal))
        .fetch_all(&self.pool)
        .await
        .map_err(RepoError::Db)?;

        Ok(rows)
    }

    async fn list_order_items(&self, order_id: Uuid) -> RepoResult<Vec<OrderItemRow>> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT product_id
            FROM order_items
            WHERE order_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(RepoError::Db)?;

        Ok(rows)
    }

    async fn get_product(&self, product_id: Uuid) -> RepoResult<Option<ProductRow>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, title, file_path, file_url
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepoError::Db)?;

        Ok(row)
    }
}
