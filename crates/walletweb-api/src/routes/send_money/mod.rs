//! Send-money routes
//!
//! Features:
//! - Counterparties that have sent money to the user, each a shortcut to step 1
//! - Step 1: destination CVU or alias, with the "account not found" notification
//! - Step 2: amount, validated before moving on
//! - Step 3: confirmation and submission
//!
//! Structure:
//! - api.rs: GET and POST handlers
//! - page.rs: Screen rendering

pub mod api;
pub mod page;

pub use api::{htmx_send_money_submit, page_send_money};
pub use page::{render_screen, screen_title, NOT_FOUND_MESSAGE};
pub use walletweb_core::transfer::SEND_MONEY_PATH;
