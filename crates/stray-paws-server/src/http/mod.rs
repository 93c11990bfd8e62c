pub(crate) mod catalog;
pub(crate) mod handlers;
pub(crate) mod ledger;
pub(crate) mod orders;
pub(crate) mod teams;
pub(crate) mod users;
