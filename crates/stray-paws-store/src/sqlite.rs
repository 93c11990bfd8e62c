// SPDX-License-Identifier: Apache-2.0

use crate::{Store, StoreError};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use stray_paws_model::{
    unix_millis, Invitation, InvitationId, Order, OrderId, OrderStatus, Points, Product,
    ProductId, Team, TeamId, UserAccount, UserId,
};
use tracing::{debug, warn};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts(
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    balance INTEGER NOT NULL,
    doc TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS sessions(
    token TEXT PRIMARY KEY,
    user_id TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS products(
    id TEXT PRIMARY KEY,
    created_at_ms INTEGER NOT NULL,
    doc TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS orders(
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at_ms INTEGER NOT NULL,
    doc TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id, created_at_ms);
CREATE TABLE IF NOT EXISTS teams(
    id TEXT PRIMARY KEY,
    doc TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS invitations(
    id TEXT PRIMARY KEY,
    doc TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS ledger_credits(
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    amount INTEGER NOT NULL,
    payment_reference TEXT,
    created_at_ms INTEGER NOT NULL
);
";

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        match error {
            rusqlite::Error::QueryReturnedNoRows => Self::NotFound,
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Self::DuplicateKey(message.unwrap_or_else(|| "constraint violation".to_string()))
            }
            other => Self::Unavailable(other.to_string()),
        }
    }
}

fn corrupt(error: serde_json::Error) -> StoreError {
    warn!(error = %error, "stored document failed to decode");
    StoreError::Corrupt(error.to_string())
}

/// SQLite-backed document store. Documents live in JSON `doc` columns; the columns
/// beside them (email, balance, status, timestamps) exist for uniqueness, the
/// conditional debit, and sorting. The balance column is authoritative; the copy
/// inside the account doc is overlaid on read.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )?;
        conn.execute_batch(SCHEMA)?;
        debug!("sqlite schema ensured");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StoreError::Unavailable("connection lock poisoned".to_string()))?;
            f(&mut guard)
        })
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?
    }
}

fn account_from_row(balance: Points, doc: &str) -> Result<UserAccount, StoreError> {
    let mut account: UserAccount = serde_json::from_str(doc).map_err(corrupt)?;
    account.balance = balance;
    Ok(account)
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_account(&self, account: &UserAccount) -> Result<(), StoreError> {
        let account = account.clone();
        self.with_conn(move |conn| {
            let doc = serde_json::to_string(&account).map_err(corrupt)?;
            conn.execute(
                "INSERT INTO accounts(id, email, balance, doc) VALUES (?1, ?2, ?3, ?4)",
                params![account.id.as_str(), account.email, account.balance, doc],
            )?;
            Ok(())
        })
        .await
    }

    async fn account_by_id(&self, id: &UserId) -> Result<UserAccount, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let (balance, doc): (Points, String) = conn.query_row(
                "SELECT balance, doc FROM accounts WHERE id = ?1",
                [id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            account_from_row(balance, &doc)
        })
        .await
    }

    async fn account_by_email(&self, email: &str) -> Result<UserAccount, StoreError> {
        let email = email.to_string();
        self.with_conn(move |conn| {
            let (balance, doc): (Points, String) = conn.query_row(
                "SELECT balance, doc FROM accounts WHERE email = ?1",
                [email],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;
            account_from_row(balance, &doc)
        })
        .await
    }

    async fn credit_points(
        &self,
        id: &UserId,
        amount: Points,
        payment_reference: Option<&str>,
    ) -> Result<Points, StoreError> {
        let id = id.clone();
        let reference = payment_reference.map(str::to_string);
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let updated = tx.execute(
                "UPDATE accounts SET balance = balance + ?1 WHERE id = ?2",
                params![amount, id.as_str()],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound);
            }
            tx.execute(
                "INSERT INTO ledger_credits(user_id, amount, payment_reference, created_at_ms) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![id.as_str(), amount, reference, unix_millis()],
            )?;
            let balance: Points = tx.query_row(
                "SELECT balance FROM accounts WHERE id = ?1",
                [id.as_str()],
                |row| row.get(0),
            )?;
            tx.commit()?;
            Ok(balance)
        })
        .await
    }

    async fn insert_session(&self, token: &str, user: &UserId) -> Result<(), StoreError> {
        let token = token.to_string();
        let user = user.clone();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO sessions(token, user_id) VALUES (?1, ?2)",
                params![token, user.as_str()],
            )?;
            Ok(())
        })
        .await
    }

    async fn resolve_session(&self, token: &str) -> Result<UserId, StoreError> {
        let token = token.to_string();
        self.with_conn(move |conn| {
            let user_id: String = conn.query_row(
                "SELECT user_id FROM sessions WHERE token = ?1",
                [token],
                |row| row.get(0),
            )?;
            UserId::parse(&user_id).map_err(|e| StoreError::Corrupt(e.to_string()))
        })
        .await
    }

    async fn create_product(&self, product: &Product) -> Result<(), StoreError> {
        let product = product.clone();
        self.with_conn(move |conn| {
            let doc = serde_json::to_string(&product).map_err(corrupt)?;
            conn.execute(
                "INSERT INTO products(id, created_at_ms, doc) VALUES (?1, ?2, ?3)",
                params![product.id.as_str(), product.created_at_ms, doc],
            )?;
            Ok(())
        })
        .await
    }

    async fn update_product(&self, product: &Product) -> Result<(), StoreError> {
        let product = product.clone();
        self.with_conn(move |conn| {
            let doc = serde_json::to_string(&product).map_err(corrupt)?;
            let updated = conn.execute(
                "UPDATE products SET doc = ?1 WHERE id = ?2",
                params![doc, product.id.as_str()],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
        .await
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let deleted = conn.execute("DELETE FROM products WHERE id = ?1", [id.as_str()])?;
            if deleted == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
        .await
    }

    async fn product_by_id(&self, id: &ProductId) -> Result<Product, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let doc: String = conn.query_row(
                "SELECT doc FROM products WHERE id = ?1",
                [id.as_str()],
                |row| row.get(0),
            )?;
            serde_json::from_str(&doc).map_err(corrupt)
        })
        .await
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT doc FROM products ORDER BY created_at_ms, id")?;
            let docs = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            docs.iter()
                .map(|doc| serde_json::from_str(doc).map_err(corrupt))
                .collect()
        })
        .await
    }

    async fn place_order(&self, order: &Order) -> Result<Points, StoreError> {
        let order = order.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let total = order.total_points;
            // Conditional debit: the balance check is part of the UPDATE predicate,
            // so a concurrent placement can never drive the balance negative.
            let debited = tx.execute(
                "UPDATE accounts SET balance = balance - ?1 WHERE id = ?2 AND balance >= ?1",
                params![total, order.user_id.as_str()],
            )?;
            if debited == 0 {
                let balance: Option<Points> = tx
                    .query_row(
                        "SELECT balance FROM accounts WHERE id = ?1",
                        [order.user_id.as_str()],
                        |row| row.get(0),
                    )
                    .optional()?;
                return match balance {
                    None => Err(StoreError::NotFound),
                    Some(balance) => Err(StoreError::InsufficientFunds {
                        balance,
                        required: total,
                    }),
                };
            }
            let doc = serde_json::to_string(&order).map_err(corrupt)?;
            tx.execute(
                "INSERT INTO orders(id, user_id, status, created_at_ms, doc) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    order.id.as_str(),
                    order.user_id.as_str(),
                    order.status.as_str(),
                    order.created_at_ms,
                    doc
                ],
            )?;
            let balance: Points = tx.query_row(
                "SELECT balance FROM accounts WHERE id = ?1",
                [order.user_id.as_str()],
                |row| row.get(0),
            )?;
            tx.commit()?;
            Ok(balance)
        })
        .await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT doc FROM orders ORDER BY created_at_ms DESC, rowid DESC")?;
            let docs = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            docs.iter()
                .map(|doc| serde_json::from_str(doc).map_err(corrupt))
                .collect()
        })
        .await
    }

    async fn orders_for_user(&self, user: &UserId) -> Result<Vec<Order>, StoreError> {
        let user = user.clone();
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT doc FROM orders WHERE user_id = ?1 \
                 ORDER BY created_at_ms DESC, rowid DESC",
            )?;
            let docs = stmt
                .query_map([user.as_str()], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            docs.iter()
                .map(|doc| serde_json::from_str(doc).map_err(corrupt))
                .collect()
        })
        .await
    }

    async fn order_by_id(&self, id: &OrderId) -> Result<Order, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let doc: String = conn.query_row(
                "SELECT doc FROM orders WHERE id = ?1",
                [id.as_str()],
                |row| row.get(0),
            )?;
            serde_json::from_str(&doc).map_err(corrupt)
        })
        .await
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        updated_at_ms: i64,
    ) -> Result<Order, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let tx = conn.transaction()?;
            let doc: Option<String> = tx
                .query_row(
                    "SELECT doc FROM orders WHERE id = ?1",
                    [id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            let doc = doc.ok_or(StoreError::NotFound)?;
            let mut order: Order = serde_json::from_str(&doc).map_err(corrupt)?;
            order.status = status;
            order.updated_at_ms = updated_at_ms;
            let doc = serde_json::to_string(&order).map_err(corrupt)?;
            tx.execute(
                "UPDATE orders SET status = ?1, doc = ?2 WHERE id = ?3",
                params![status.as_str(), doc, id.as_str()],
            )?;
            tx.commit()?;
            Ok(order)
        })
        .await
    }

    async fn delete_order(&self, id: &OrderId) -> Result<(), StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let deleted = conn.execute("DELETE FROM orders WHERE id = ?1", [id.as_str()])?;
            if deleted == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
        .await
    }

    async fn create_team(&self, team: &Team) -> Result<(), StoreError> {
        let team = team.clone();
        self.with_conn(move |conn| {
            let doc = serde_json::to_string(&team).map_err(corrupt)?;
            conn.execute(
                "INSERT INTO teams(id, doc) VALUES (?1, ?2)",
                params![team.id.as_str(), doc],
            )?;
            Ok(())
        })
        .await
    }

    async fn team_by_id(&self, id: &TeamId) -> Result<Team, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let doc: String = conn.query_row(
                "SELECT doc FROM teams WHERE id = ?1",
                [id.as_str()],
                |row| row.get(0),
            )?;
            serde_json::from_str(&doc).map_err(corrupt)
        })
        .await
    }

    async fn save_team(&self, team: &Team) -> Result<(), StoreError> {
        let team = team.clone();
        self.with_conn(move |conn| {
            let doc = serde_json::to_string(&team).map_err(corrupt)?;
            let updated = conn.execute(
                "UPDATE teams SET doc = ?1 WHERE id = ?2",
                params![doc, team.id.as_str()],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
        .await
    }

    async fn create_invitation(&self, invitation: &Invitation) -> Result<(), StoreError> {
        let invitation = invitation.clone();
        self.with_conn(move |conn| {
            let doc = serde_json::to_string(&invitation).map_err(corrupt)?;
            conn.execute(
                "INSERT INTO invitations(id, doc) VALUES (?1, ?2)",
                params![invitation.id.as_str(), doc],
            )?;
            Ok(())
        })
        .await
    }

    async fn invitation_by_id(&self, id: &InvitationId) -> Result<Invitation, StoreError> {
        let id = id.clone();
        self.with_conn(move |conn| {
            let doc: String = conn.query_row(
                "SELECT doc FROM invitations WHERE id = ?1",
                [id.as_str()],
                |row| row.get(0),
            )?;
            serde_json::from_str(&doc).map_err(corrupt)
        })
        .await
    }

    async fn save_invitation(&self, invitation: &Invitation) -> Result<(), StoreError> {
        let invitation = invitation.clone();
        self.with_conn(move |conn| {
            let doc = serde_json::to_string(&invitation).map_err(corrupt)?;
            let updated = conn.execute(
                "UPDATE invitations SET doc = ?1 WHERE id = ?2",
                params![doc, invitation.id.as_str()],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
        .await
    }
}
