//! Route modules for the server
//!
//! - send_money: Counterparty list and transfer steps
//! - activity: Transfer receipt
//! - auth: Login and logout
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: Handlers (form submissions and page entry points)
//! - page.rs: HTML rendering

pub mod activity;
pub mod auth;
pub mod send_money;
