#![forbid(unsafe_code)]
//! Storage seam for the Stray Paws backend.
//!
//! The [`Store`] trait is the only surface the server talks to. [`SqliteStore`] is the
//! production backend (SQLite holding JSON documents beside a few indexed columns);
//! [`MemoryStore`] mirrors its semantics in-process for tests, including the
//! transactional placement contract.

use std::fmt::{Display, Formatter};

use async_trait::async_trait;
use stray_paws_model::{
    Invitation, InvitationId, Order, OrderId, OrderStatus, Points, Product, ProductId, Team,
    TeamId, UserAccount, UserId,
};

mod memory;
mod retry;
mod sqlite;

pub use memory::MemoryStore;
pub use retry::RetryPolicy;
pub use sqlite::SqliteStore;

pub const CRATE_NAME: &str = "stray-paws-store";

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    NotFound,
    DuplicateKey(String),
    InsufficientFunds { balance: Points, required: Points },
    Unavailable(String),
    Corrupt(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => f.write_str("document not found"),
            Self::DuplicateKey(key) => write!(f, "duplicate key: {key}"),
            Self::InsufficientFunds { balance, required } => {
                write!(f, "insufficient funds: balance {balance}, required {required}")
            }
            Self::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
            Self::Corrupt(msg) => write!(f, "stored document corrupt: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl StoreError {
    /// Whether a read-only operation may be retried. Placement and other writes are
    /// never retried automatically: there is no idempotency key, and re-running a
    /// debit risks double-spend.
    #[must_use]
    pub const fn is_retriable_read(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Async storage seam. Implementations must keep `place_order` atomic: the order
/// insert and the conditional balance debit either both happen or neither does, and
/// the debit only applies while `balance >= total_points`.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    // Ledger accounts
    async fn create_account(&self, account: &UserAccount) -> Result<(), StoreError>;
    async fn account_by_id(&self, id: &UserId) -> Result<UserAccount, StoreError>;
    async fn account_by_email(&self, email: &str) -> Result<UserAccount, StoreError>;
    /// Credit `amount` points; returns the new balance. The payment reference is
    /// recorded on the audit trail but not verified against any external ledger.
    async fn credit_points(
        &self,
        id: &UserId,
        amount: Points,
        payment_reference: Option<&str>,
    ) -> Result<Points, StoreError>;

    // Sessions (token issuance is external; the store only resolves tokens)
    async fn insert_session(&self, token: &str, user: &UserId) -> Result<(), StoreError>;
    async fn resolve_session(&self, token: &str) -> Result<UserId, StoreError>;

    // Catalog
    async fn create_product(&self, product: &Product) -> Result<(), StoreError>;
    async fn update_product(&self, product: &Product) -> Result<(), StoreError>;
    async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError>;
    async fn product_by_id(&self, id: &ProductId) -> Result<Product, StoreError>;
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    // Orders
    /// Persist the order and debit its owner's balance in one transaction.
    /// Returns the new balance. Fails with [`StoreError::NotFound`] when the owner
    /// does not exist and [`StoreError::InsufficientFunds`] when the conditional
    /// debit does not apply; in both cases nothing is persisted.
    async fn place_order(&self, order: &Order) -> Result<Points, StoreError>;
    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;
    async fn orders_for_user(&self, user: &UserId) -> Result<Vec<Order>, StoreError>;
    async fn order_by_id(&self, id: &OrderId) -> Result<Order, StoreError>;
    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        updated_at_ms: i64,
    ) -> Result<Order, StoreError>;
    /// Unconditional delete. Does not refund the ledger.
    async fn delete_order(&self, id: &OrderId) -> Result<(), StoreError>;

    // Teams and invitations
    async fn create_team(&self, team: &Team) -> Result<(), StoreError>;
    async fn team_by_id(&self, id: &TeamId) -> Result<Team, StoreError>;
    async fn save_team(&self, team: &Team) -> Result<(), StoreError>;
    async fn create_invitation(&self, invitation: &Invitation) -> Result<(), StoreError>;
    async fn invitation_by_id(&self, id: &InvitationId) -> Result<Invitation, StoreError>;
    async fn save_invitation(&self, invitation: &Invitation) -> Result<(), StoreError>;
}
