//! Shopper session lifecycle.

use axum::{extract::State, http::StatusCode};
use bramble_core::ShopperKey;
use tower_sessions::Session;
use tracing::instrument;

use crate::backend::SavedItemsBackend;
use crate::error::Result;
use crate::middleware::session_keys;
use crate::state::AppState;

/// End the shopper's in-memory session.
///
/// The active cart and recently viewed list are dropped. The shopper keeps
/// their key, so the next request starts a new session that reloads their
/// saved-for-later lines.
#[instrument(skip_all)]
pub async fn end<B: SavedItemsBackend>(
    State(state): State<AppState<B>>,
    session: Session,
) -> Result<StatusCode> {
    if let Some(key) = session
        .get::<ShopperKey>(session_keys::SHOPPER_KEY)
        .await?
    {
        let sessions = state.sessions();
        sessions.end(&key).await;
        let active = sessions.active_sessions().await;
        tracing::debug!(
            shopper = %key,
            active,
            "shopper session ended by request"
        );
    }
    Ok(StatusCode::NO_CONTENT)
}
