//! Shopper session extractor.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use bramble_core::ShopperKey;
use tower_sessions::Session;

use super::session::session_keys;
use crate::backend::{PgSavedItems, SavedItemsBackend};
use crate::error::{AppError, set_sentry_user};
use crate::session::ShopperSession;
use crate::state::AppState;

/// The requesting shopper's session.
///
/// Visitors get a shopper key on their first request; it is kept in the
/// cookie session and used to look up their stores.
///
/// # Example
///
/// ```rust,ignore
/// async fn count(CurrentShopper(shopper): CurrentShopper) -> String {
///     shopper.cart().item_count().to_string()
/// }
/// ```
pub struct CurrentShopper<B = PgSavedItems>(pub Arc<ShopperSession<B>>);

impl<B: SavedItemsBackend> FromRequestParts<AppState<B>> for CurrentShopper<B> {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<B>,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer is not installed".to_string()))?;

        let key = shopper_key(&session).await?;
        set_sentry_user(&key);

        Ok(Self(state.sessions().get_or_create(&key).await))
    }
}

/// Get the shopper key from the session, assigning a new one if missing.
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn shopper_key(session: &Session) -> Result<ShopperKey, tower_sessions::session::Error> {
    if let Some(key) = session.get::<ShopperKey>(session_keys::SHOPPER_KEY).await? {
        if !key.is_blank() {
            return Ok(key);
        }
    }

    let key = ShopperKey::generate();
    session.insert(session_keys::SHOPPER_KEY, &key).await?;
    tracing::debug!(shopper = %key, "assigned shopper key");
    Ok(key)
}
