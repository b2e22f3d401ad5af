//! Purchase-gated download authorization.
//!
//! A principal may download an artifact only if one of their *paid* orders has a
//! line item whose product stores exactly that path (or URL). On success a short
//! signed URL is minted and the access is audited in the background.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::repos::audit_repo::{DownloadAuditEntry, DownloadAuditLog};
use crate::repos::error::RepoError;
use crate::repos::purchase_repo::{OrderRow, ProductRow, PurchaseRepository};
use crate::services::download::error::DownloadError;
use crate::services::identity::Principal;
use crate::services::storage::SignedUrlIssuer;

/// Lifetime of a minted download URL. Long enough for the client to start the fetch
/// right after the response arrives, short enough to be useless if shared later.
pub const DOWNLOAD_URL_EXPIRY_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadGrant {
    pub download_url: String,
    pub expires_in: u64,
    pub file_name: String,
}

#[derive(Clone)]
pub struct DownloadAuthorizer {
    purchases: Arc<dyn PurchaseRepository>,
    storage: Arc<dyn SignedUrlIssuer>,
    audit: Arc<dyn DownloadAuditLog>,
}

impl DownloadAuthorizer {
    pub fn new(
        purchases: Arc<dyn PurchaseRepository>,
        storage: Arc<dyn SignedUrlIssuer>,
        audit: Arc<dyn DownloadAuditLog>,
    ) -> Self {
        Self {
            purchases,
            storage,
            audit,
        }
    }

    pub async fn authorize_download(
        &self,
        principal: Option<&Principal>,
        requested_path: &str,
    ) -> Result<DownloadGrant, DownloadError> {
        let principal = principal.ok_or(DownloadError::Unauthorized)?;

        let orders = self
            .purchases
            .list_orders_for_principal(principal)
            .await
            .map_err(|e| upstream(e, "list orders"))?;

        if orders.is_empty() {
            tracing::info!(user_id = %principal.id, path = %requested_path, "download denied: no orders");
            return Err(DownloadError::NoPurchases);
        }

        let Some(product) = self.find_purchased(&orders, requested_path).await? else {
            tracing::info!(user_id = %principal.id, path = %requested_path, "download denied: not purchased");
            return Err(DownloadError::AccessDenied);
        };

        let download_url = self
            .storage
            .create_signed_url(requested_path, DOWNLOAD_URL_EXPIRY_SECS)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, path = %requested_path, "failed to sign download url");
                DownloadError::SigningFailed
            })?;

        self.record_access(principal);

        tracing::info!(
            user_id = %principal.id,
            product_id = %product.id,
            path = %requested_path,
            "download granted"
        );

        Ok(DownloadGrant {
            download_url,
            expires_in: DOWNLOAD_URL_EXPIRY_SECS,
            file_name: product.title,
        })
    }

    /// Walk paid orders, then their items, then products; first exact match wins.
    async fn find_purchased(
        &self,
        orders: &[OrderRow],
        requested_path: &str,
    ) -> Result<Option<ProductRow>, DownloadError> {
        for order in orders.iter().filter(|o| o.status().is_qualifying()) {
            let items = self
                .purchases
                .list_order_items(order.id)
                .await
                .map_err(|e| upstream(e, "list order items"))?;

            for product_id in items.iter().filter_map(|item| item.product_id) {
                let product = self
                    .purchases
                    .get_product(product_id)
                    .await
                    .map_err(|e| upstream(e, "get product"))?;

                if let Some(product) = product
                    && product.serves(requested_path)
                {
                    return Ok(Some(product));
                }
            }
        }

        Ok(None)
    }

    /// Detached, at-most-once audit write. Failure is logged and otherwise ignored;
    /// a lost or duplicated entry is acceptable.
    fn record_access(&self, principal: &Principal) {
        let audit = Arc::clone(&self.audit);
        let entry = DownloadAuditEntry {
            user_id: principal.id.clone(),
            user_email: principal.email.clone(),
            download_token: Uuid::new_v4(),
            accessed_at: chrono::Utc::now(),
        };

        tokio::spawn(async move {
            let token = entry.download_token;
            if let Err(err) = audit.record(entry).await {
                tracing::warn!(error = %err, %token, "failed to record download access");
            }
        });
    }
}

fn upstream(err: RepoError, op: &'static str) -> DownloadError {
    tracing::error!(error = %err, op, "purchase lookup failed");
    DownloadError::Upstream
}
