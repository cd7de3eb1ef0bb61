use axum::Json;
use axum::extract::State;

use crate::error::Result;
use crate::router::Id;
use crate::router::model::UserInfo;
use crate::user::UserService;

pub async fn handler(
    State(users): State<UserService>,
    Id(id): Id,
) -> Result<Json<UserInfo>> {
    Ok(Json(UserInfo::try_from(users.get_by_id(id).await?)?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use chrono::NaiveDate;
    use http_body_util::BodyExt;

    use super::*;
    use crate::user::User;
    use crate::*;

    #[tokio::test]
    async fn test_get_user_handler() {
        let state = router::state();
        let user = User::new(
            "jane.doe@outlook.com",
            "Jane",
            "Doe",
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        );
        let id = state.users.save(user).await.unwrap().id.unwrap();
        let app = app(state);

        let response =
            make_request(app, Method::GET, &format!("/users/{id}"), String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: UserInfo = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.id, id);
        assert_eq!(body.email, "jane.doe@outlook.com");
        assert_eq!(body.first_name, "Jane");
        assert_eq!(body.last_name, "Doe");
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let app = app(router::state());

        let response = make_request(app, Method::GET, "/users/404", String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["message"], "User with id 404 was not found");
    }

    #[tokio::test]
    async fn test_get_with_invalid_id() {
        let app = app(router::state());

        let response = make_request(app, Method::GET, "/users/abc", String::default()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
