use crate::{Store, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use stray_paws_model::{
    Invitation, InvitationId, Order, OrderId, OrderStatus, Points, Product, ProductId, Team,
    TeamId, UserAccount, UserId,
};
use tokio::sync::Mutex;

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<UserId, UserAccount>,
    sessions: HashMap<String, UserId>,
    products: Vec<Product>,
    orders: Vec<Order>,
    credits: Vec<(UserId, Points, Option<String>)>,
    teams: HashMap<TeamId, Team>,
    invitations: HashMap<InvitationId, Invitation>,
}

/// In-memory store for tests. One mutex over the whole state keeps `place_order`
/// atomic the same way the SQLite transaction does. `unavailable` fails every call;
/// `flaky_reads_remaining` fails that many read calls before recovering, for
/// exercising the read-path retry.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    pub unavailable: AtomicBool,
    pub flaky_reads_remaining: AtomicU32,
}

impl MemoryStore {
    fn gate(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(StoreError::Unavailable("injected outage".to_string()));
        }
        Ok(())
    }

    fn read_gate(&self) -> Result<(), StoreError> {
        self.gate()?;
        let remaining = self.flaky_reads_remaining.load(Ordering::Relaxed);
        if remaining > 0 {
            self.flaky_reads_remaining
                .store(remaining - 1, Ordering::Relaxed);
            return Err(StoreError::Unavailable("injected flaky read".to_string()));
        }
        Ok(())
    }

    /// Current balance without going through the trait, for test assertions.
    pub async fn balance_of(&self, id: &UserId) -> Option<Points> {
        self.state
            .lock()
            .await
            .accounts
            .get(id)
            .map(|account| account.balance)
    }

    pub async fn recorded_credits(&self) -> usize {
        self.state.lock().await.credits.len()
    }
}

fn newest_first(orders: &mut [Order]) {
    // Callers pass orders in reverse insertion order; the stable sort keeps
    // same-millisecond orders newest-inserted first.
    orders.sort_by(|a, b| b.created_at_ms.cmp(&a.created_at_ms));
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_account(&self, account: &UserAccount) -> Result<(), StoreError> {
        self.gate()?;
        let mut state = self.state.lock().await;
        if state.accounts.contains_key(&account.id) {
            return Err(StoreError::DuplicateKey(account.id.to_string()));
        }
        if state.accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::DuplicateKey(account.email.clone()));
        }
        state.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn account_by_id(&self, id: &UserId) -> Result<UserAccount, StoreError> {
        self.read_gate()?;
        self.state
            .lock()
            .await
            .accounts
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn account_by_email(&self, email: &str) -> Result<UserAccount, StoreError> {
        self.read_gate()?;
        self.state
            .lock()
            .await
            .accounts
            .values()
            .find(|a| a.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn credit_points(
        &self,
        id: &UserId,
        amount: Points,
        payment_reference: Option<&str>,
    ) -> Result<Points, StoreError> {
        self.gate()?;
        let mut state = self.state.lock().await;
        let account = state.accounts.get_mut(id).ok_or(StoreError::NotFound)?;
        account.balance += amount;
        let balance = account.balance;
        state
            .credits
            .push((id.clone(), amount, payment_reference.map(str::to_string)));
        Ok(balance)
    }

    async fn insert_session(&self, token: &str, user: &UserId) -> Result<(), StoreError> {
        self.gate()?;
        self.state
            .lock()
            .await
            .sessions
            .insert(token.to_string(), user.clone());
        Ok(())
    }

    async fn resolve_session(&self, token: &str) -> Result<UserId, StoreError> {
        self.read_gate()?;
        self.state
            .lock()
            .await
            .sessions
            .get(token)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn create_product(&self, product: &Product) -> Result<(), StoreError> {
        self.gate()?;
        let mut state = self.state.lock().await;
        if state.products.iter().any(|p| p.id == product.id) {
            return Err(StoreError::DuplicateKey(product.id.to_string()));
        }
        state.products.push(product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<(), StoreError> {
        self.gate()?;
        let mut state = self.state.lock().await;
        let slot = state
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or(StoreError::NotFound)?;
        *slot = product.clone();
        Ok(())
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError> {
        self.gate()?;
        let mut state = self.state.lock().await;
        let before = state.products.len();
        state.products.retain(|p| &p.id != id);
        if state.products.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn product_by_id(&self, id: &ProductId) -> Result<Product, StoreError> {
        self.read_gate()?;
        self.state
            .lock()
            .await
            .products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.read_gate()?;
        Ok(self.state.lock().await.products.clone())
    }

    async fn place_order(&self, order: &Order) -> Result<Points, StoreError> {
        self.gate()?;
        let mut state = self.state.lock().await;
        let total = order.total_points;
        let account = state
            .accounts
            .get_mut(&order.user_id)
            .ok_or(StoreError::NotFound)?;
        if account.balance < total {
            return Err(StoreError::InsufficientFunds {
                balance: account.balance,
                required: total,
            });
        }
        account.balance -= total;
        let balance = account.balance;
        state.orders.push(order.clone());
        Ok(balance)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.read_gate()?;
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state.orders.iter().rev().cloned().collect();
        newest_first(&mut orders);
        Ok(orders)
    }

    async fn orders_for_user(&self, user: &UserId) -> Result<Vec<Order>, StoreError> {
        self.read_gate()?;
        let state = self.state.lock().await;
        let mut orders: Vec<Order> = state
            .orders
            .iter()
            .rev()
            .filter(|o| &o.user_id == user)
            .cloned()
            .collect();
        newest_first(&mut orders);
        Ok(orders)
    }

    async fn order_by_id(&self, id: &OrderId) -> Result<Order, StoreError> {
        self.read_gate()?;
        self.state
            .lock()
            .await
            .orders
            .iter()
            .find(|o| &o.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        updated_at_ms: i64,
    ) -> Result<Order, StoreError> {
        self.gate()?;
        let mut state = self.state.lock().await;
        let order = state
            .orders
            .iter_mut()
            .find(|o| &o.id == id)
            .ok_or(StoreError::NotFound)?;
        order.status = status;
        order.updated_at_ms = updated_at_ms;
        Ok(order.clone())
    }

    async fn delete_order(&self, id: &OrderId) -> Result<(), StoreError> {
        self.gate()?;
        let mut state = self.state.lock().await;
        let before = state.orders.len();
        state.orders.retain(|o| &o.id != id);
        if state.orders.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn create_team(&self, team: &Team) -> Result<(), StoreError> {
        self.gate()?;
        let mut state = self.state.lock().await;
        if state.teams.contains_key(&team.id) {
            return Err(StoreError::DuplicateKey(team.id.to_string()));
        }
        state.teams.insert(team.id.clone(), team.clone());
        Ok(())
    }

    async fn team_by_id(&self, id: &TeamId) -> Result<Team, StoreError> {
        self.read_gate()?;
        self.state
            .lock()
            .await
            .teams
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn save_team(&self, team: &Team) -> Result<(), StoreError> {
        self.gate()?;
        let mut state = self.state.lock().await;
        if !state.teams.contains_key(&team.id) {
            return Err(StoreError::NotFound);
        }
        state.teams.insert(team.id.clone(), team.clone());
        Ok(())
    }

    async fn create_invitation(&self, invitation: &Invitation) -> Result<(), StoreError> {
        self.gate()?;
        let mut state = self.state.lock().await;
        if state.invitations.contains_key(&invitation.id) {
            return Err(StoreError::DuplicateKey(invitation.id.to_string()));
        }
        state
            .invitations
            .insert(invitation.id.clone(), invitation.clone());
        Ok(())
    }

    async fn invitation_by_id(&self, id: &InvitationId) -> Result<Invitation, StoreError> {
        self.read_gate()?;
        self.state
            .lock()
            .await
            .invitations
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn save_invitation(&self, invitation: &Invitation) -> Result<(), StoreError> {
        self.gate()?;
        let mut state = self.state.lock().await;
        if !state.invitations.contains_key(&invitation.id) {
            return Err(StoreError::NotFound);
        }
        state
            .invitations
            .insert(invitation.id.clone(), invitation.clone());
        Ok(())
    }
}
