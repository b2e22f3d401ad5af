//! In-memory stand-ins for the external collaborators, shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::HeaderMap;
use uuid::Uuid;

use crate::repos::audit_repo::{DownloadAuditEntry, DownloadAuditLog};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::purchase_repo::{
    OrderItemRow, OrderRow, ProductRow, PurchaseRepository, guest_email,
};
use crate::services::access::Role;
use crate::services::download::{DenialDisclosure, DownloadAuthorizer};
use crate::services::identity::session::session_token;
use crate::services::identity::{IdentityError, IdentityProvider, Principal};
use crate::services::storage::{SignedUrlIssuer, StorageError};
use crate::state::AppState;

pub fn principal(id: &str, role: Option<Role>) -> Principal {
    Principal {
        id: id.to_string(),
        email: Some(format!("{id}@example.test")),
        role,
        verified: true,
    }
}

/// Maps bearer tokens to principals. The token is whatever the test chooses.
#[derive(Default)]
pub struct FakeIdentity {
    sessions: HashMap<String, Principal>,
    unavailable: bool,
}

impl FakeIdentity {
    pub fn with_session(mut self, token: &str, principal: Principal) -> Self {
        self.sessions.insert(token.to_string(), principal);
        self
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn current_principal(
        &self,
        headers: &HeaderMap,
    ) -> Result<Option<Principal>, IdentityError> {
        if self.unavailable {
            return Err(IdentityError::Unavailable("fake outage".to_string()));
        }
        Ok(session_token(headers, "sb-access-token").and_then(|t| self.sessions.get(t).cloned()))
    }
}

struct StoredOrder {
    row: OrderRow,
    user_id: Option<String>,
    customer_email: Option<String>,
}

impl StoredOrder {
    fn owned_by(&self, principal: &Principal) -> bool {
        match &self.user_id {
            Some(user_id) => *user_id == principal.id,
            None => match (&self.customer_email, guest_email(principal)) {
                (Some(stored), Some(claimed)) => stored.eq_ignore_ascii_case(claimed),
                _ => false,
            },
        }
    }
}

/// Orders are returned in insertion order.
#[derive(Default)]
pub struct InMemoryPurchases {
    orders: Vec<StoredOrder>,
    items: Vec<(Uuid, OrderItemRow)>,
    products: Vec<ProductRow>,
    failing: bool,
}

impl InMemoryPurchases {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn add_product(&mut self, title: &str, file_path: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.products.push(ProductRow {
            id,
            title: title.to_string(),
            file_path: Some(file_path.to_string()),
            file_url: None,
        });
        id
    }

    pub fn add_order(&mut self, owner: &Principal, status: &str) -> Uuid {
        self.push_order(Some(owner.id.clone()), owner.email.clone(), status)
    }

    /// Checkout without an account: only the email ties the order to a person.
    pub fn add_guest_order(&mut self, email: &str, status: &str) -> Uuid {
        self.push_order(None, Some(email.to_string()), status)
    }

    fn push_order(
        &mut self,
        user_id: Option<String>,
        customer_email: Option<String>,
        status: &str,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.orders.push(StoredOrder {
            row: OrderRow {
                id,
                status: status.to_string(),
            },
            user_id,
            customer_email,
        });
        id
    }

    pub fn add_item(&mut self, order_id: Uuid, product_id: Option<Uuid>) {
        self.items.push((order_id, OrderItemRow { product_id }));
    }

    fn check(&self) -> RepoResult<()> {
        if self.failing {
            return Err(RepoError::Unavailable("fake outage".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PurchaseRepository for InMemoryPurchases {
    async fn list_orders_for_principal(&self, principal: &Principal) -> RepoResult<Vec<OrderRow>> {
        self.check()?;
        Ok(self
            .orders
            .iter()
            .filter(|o| o.owned_by(principal))
            .map(|o| o.row.clone())
            .collect())
    }

    async fn list_order_items(&self, order_id: Uuid) -> RepoResult<Vec<OrderItemRow>> {
        self.check()?;
        Ok(self
            .items
            .iter()
            .filter(|(owner, _)| *owner == order_id)
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn get_product(&self, product_id: Uuid) -> RepoResult<Option<ProductRow>> {
        self.check()?;
        Ok(self.products.iter().find(|p| p.id == product_id).cloned())
    }
}

#[derive(Default)]
pub struct FakeSigner {
    failing: bool,
}

impl FakeSigner {
    pub fn failing() -> Self {
        Self { failing: true }
    }
}

#[async_trait]
impl SignedUrlIssuer for FakeSigner {
    async fn create_signed_url(
        &self,
        path: &str,
        expires_in_secs: u64,
    ) -> Result<String, StorageError> {
        if self.failing {
            return Err(StorageError::Backend("fake outage".to_string()));
        }
        Ok(format!("https://storage.example.test/sign/{path}?expires_in={expires_in_secs}"))
    }
}

#[derive(Default)]
pub struct RecordingAudit {
    pub entries: Mutex<Vec<DownloadAuditEntry>>,
    attempts: AtomicUsize,
    failing: bool,
}

impl RecordingAudit {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Writes tried, including the ones that failed.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn recorded(&self) -> Vec<DownloadAuditEntry> {
        self.entries.lock().unwrap().clone()
    }

    /// Let the detached audit task run to completion.
    pub async fn settle(&self) {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl DownloadAuditLog for RecordingAudit {
    async fn record(&self, entry: DownloadAuditEntry) -> RepoResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(RepoError::Unavailable("fake outage".to_string()));
        }
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

pub fn authorizer(
    purchases: InMemoryPurchases,
    signer: FakeSigner,
    audit: Arc<RecordingAudit>,
) -> DownloadAuthorizer {
    DownloadAuthorizer::new(Arc::new(purchases), Arc::new(signer), audit)
}

pub fn app_state(identity: FakeIdentity, downloads: DownloadAuthorizer) -> AppState {
    AppState::new(Arc::new(identity), Arc::new(downloads), DenialDisclosure::Distinct)
}
