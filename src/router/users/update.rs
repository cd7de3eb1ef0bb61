//! Full update of a user.

use axum::Json;
use axum::extract::State;

use crate::error::Result;
use crate::router::model::{UserInfo, UserUpdateForm};
use crate::router::{Id, Valid};
use crate::user::UserService;

pub async fn handler(
    State(users): State<UserService>,
    Id(id): Id,
    Valid(body): Valid<UserUpdateForm>,
) -> Result<Json<UserInfo>> {
    let user = users.update_by_id(id, body.into()).await?;

    Ok(Json(UserInfo::try_from(user)?))
}
