//! Activity routes - Transfer receipt

pub mod page;

pub use page::{page_activity_receipt, render_receipt};
