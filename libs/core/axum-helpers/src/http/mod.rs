//! HTTP middleware module.
//!
//! - CSRF protection (double-submit cookie)
//! - Security headers
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::http::{csrf_protection, security_headers};
//!
//! let app = Router::new()
//!     .layer(axum::middleware::from_fn(security_headers))
//!     .layer(axum::middleware::from_fn(csrf_protection));
//! ```

pub mod csrf;
pub mod security;

pub use csrf::{CSRF_FORM_FIELD, CSRF_HEADER, CsrfToken, csrf_protection};
pub use security::security_headers;
