//! Authentication routes - Login form and logout
//!
//! Structure:
//! - api.rs: Login and logout submissions
//! - page.rs: Login form rendering

pub mod api;
pub mod page;

pub use api::{htmx_login, htmx_logout};
pub use page::{page_login, render_login};

/// Route of the login form
pub const LOGIN_PATH: &str = "/login";
