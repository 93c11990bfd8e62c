// SPDX-License-Identifier: Apache-2.0

//! Shared harness for server integration tests: spawns the full router on an
//! ephemeral port and speaks raw HTTP/1.1 to it.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::Value;
use stray_paws_model::{
    sha256_hex, unix_millis, Product, ProductId, Role, UserAccount, UserId,
};
use stray_paws_server::{build_router, AppState};
use stray_paws_store::{MemoryStore, Store};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub async fn spawn_app(store: Arc<dyn Store>) -> SocketAddr {
    let app = build_router(AppState::new(store));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

pub async fn send_raw(
    addr: SocketAddr,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> (u16, Value) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let payload = body.map(Value::to_string).unwrap_or_default();
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(token) = token {
        req.push_str(&format!("Authorization: Bearer {token}\r\n"));
    }
    if body.is_some() {
        req.push_str("Content-Type: application/json\r\n");
    }
    req.push_str(&format!("Content-Length: {}\r\n\r\n", payload.len()));
    req.push_str(&payload);
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    let json = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Seed an account with a session token. Returns the account id.
pub async fn seed_user(
    store: &MemoryStore,
    id: &str,
    role: Role,
    balance: i64,
    token: &str,
) -> UserId {
    let user_id = UserId::parse(id).expect("user id");
    let mut account = UserAccount::registered(
        user_id.clone(),
        format!("User {id}"),
        format!("{id}@straypaws.org"),
        sha256_hex(b"hunter2-fixture"),
        role,
        unix_millis(),
    );
    account.balance = balance;
    store.create_account(&account).await.expect("seed account");
    store
        .insert_session(token, &user_id)
        .await
        .expect("seed session");
    user_id
}

pub async fn seed_product(store: &MemoryStore, id: &str, selling_price: i64, purchase_cost: i64) {
    store
        .create_product(&Product::new(
            ProductId::parse(id).expect("product id"),
            format!("Product {id}"),
            String::new(),
            purchase_cost,
            selling_price,
            25,
            "supplies".to_string(),
            vec![],
            unix_millis(),
        ))
        .await
        .expect("seed product");
}
