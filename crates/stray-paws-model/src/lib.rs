#![forbid(unsafe_code)]
//! Stray Paws model SSOT.
//!
//! ```compile_fail
//! use stray_paws_model::OrderStatus;
//!
//! fn exhaustive_match(s: OrderStatus) -> &'static str {
//!     match s {
//!         OrderStatus::Pending => "p",
//!         OrderStatus::OutForDelivery => "o",
//!         OrderStatus::Delivered => "d",
//!     }
//! }
//! ```

mod account;
mod catalog;
mod hash;
mod ids;
mod order;
mod team;
mod time;

pub use account::{Role, UserAccount};
pub use catalog::{PriceSnapshot, Product};
pub use hash::sha256_hex;
pub use ids::{
    InvitationId, OrderId, ParseError, ProductId, TeamId, UserId, EMAIL_MAX_LEN, ID_MAX_LEN,
    NAME_MAX_LEN,
};
pub use order::{order_total, LineItem, Order, OrderStatus, Points, ShippingInfo};
pub use team::{Invitation, InvitationStatus, Team};
pub use time::unix_millis;

pub const CRATE_NAME: &str = "stray-paws-model";
