//! Delete user or its address.

use axum::extract::State;
use axum::http::StatusCode;

use crate::error::Result;
use crate::router::Id;
use crate::user::UserService;

pub async fn handler(State(users): State<UserService>, Id(id): Id) -> Result<StatusCode> {
    users.delete_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /users/{id}/address`.
pub async fn address(State(users): State<UserService>, Id(id): Id) -> Result<StatusCode> {
    users.delete_users_address(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
