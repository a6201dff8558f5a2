//! User administration handlers

use crate::api::MessageResponse;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::trust::TrustedIdentity;
use axum::{body::Bytes, extract::State, Json};
use bookgate_core::{RoleUpdate, UserStore};
use tracing::{info, warn};

/// Change a user's role (`PUT /users/role`).
///
/// An email with no row is not an error: nothing changes and the call
/// still answers 200.
pub async fn update_role(
    State(state): State<AppState>,
    identity: TrustedIdentity,
    body: Bytes,
) -> ApiResult<Json<MessageResponse>> {
    let update: RoleUpdate = serde_json::from_slice(&body)?;

    let rows = state
        .store
        .update_role(&update.email, &update.role)
        .await
        .map_err(|e| ApiError::store("Failed to update role", e))?;

    crate::metrics::record_role_update(rows);
    if rows == 0 {
        warn!(email = %update.email, "Role update matched no user");
    } else {
        info!(
            email = %update.email,
            role = %update.role,
            by = identity.email_or_empty(),
            "User role updated"
        );
    }

    Ok(Json(MessageResponse::new("User role updated successfully")))
}
