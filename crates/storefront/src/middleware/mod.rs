//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, transaction per route)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! The [`CurrentShopper`] extractor resolves the shopper session for a request.

pub mod session;
pub mod shopper;

pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_keys};
pub use shopper::{CurrentShopper, shopper_key};
