//! User role lookup.

use axum::{
    Json,
    extract::{Path, State},
};
use bramble_core::{UserId, UserRole};
use serde::Serialize;
use tracing::instrument;

use crate::backend::SavedItemsBackend;
use crate::db::RoleRepository;
use crate::error::Result;
use crate::state::AppState;

/// A user's role.
#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub user_id: UserId,
    pub role: UserRole,
    pub can_manage_products: bool,
}

/// Look up a user's role.
#[instrument(skip(state))]
pub async fn role<B: SavedItemsBackend>(
    State(state): State<AppState<B>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<RoleResponse>> {
    let role = RoleRepository::new(state.pool()).get_role(user_id).await?;

    Ok(Json(RoleResponse {
        user_id,
        role,
        can_manage_products: role.can_manage_products(),
    }))
}
