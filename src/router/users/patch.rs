//! Single field updates.

use axum::Json;
use axum::extract::State;

use crate::error::Result;
use crate::router::model::{UpdateEmailForm, UpdatePhoneForm, UserInfo};
use crate::router::{Id, Valid};
use crate::user::{Address, UserService};

/// `PATCH /users/{id}/email`.
pub async fn email(
    State(users): State<UserService>,
    Id(id): Id,
    Valid(body): Valid<UpdateEmailForm>,
) -> Result<Json<UserInfo>> {
    let user = users.update_email(id, body.email).await?;
    Ok(Json(UserInfo::try_from(user)?))
}

/// `PATCH /users/{id}/address`.
pub async fn address(
    State(users): State<UserService>,
    Id(id): Id,
    Valid(body): Valid<Address>,
) -> Result<Json<UserInfo>> {
    let user = users.update_address(id, body).await?;
    Ok(Json(UserInfo::try_from(user)?))
}

/// `PATCH /users/{id}/phone`.
pub async fn phone(
    State(users): State<UserService>,
    Id(id): Id,
    Valid(body): Valid<UpdatePhoneForm>,
) -> Result<Json<UserInfo>> {
    let user = users.update_phone(id, body.phone).await?;
    Ok(Json(UserInfo::try_from(user)?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use chrono::NaiveDate;
    use http_body_util::BodyExt;
    use serde_json::json;

    use super::*;
    use crate::user::User;
    use crate::*;

    async fn seeded() -> (AppState, i64) {
        let state = router::state();
        let user = User::new(
            "john.doe@gmail.com",
            "John",
            "Doe",
            NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        );
        let id = state.users.save(user).await.unwrap().id.unwrap();
        (state, id)
    }

    async fn info(response: axum::http::Response<axum::body::Body>) -> UserInfo {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_patch_email() {
        let (state, id) = seeded().await;
        let app = app(state);

        let path = format!("/users/{id}/email");
        let response = make_request(
            app.clone(),
            Method::PATCH,
            &path,
            json!({"email": "jack.doe@yahoo.com"}).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(info(response).await.email, "jack.doe@yahoo.com");

        for email in ["invalid.email.com", "@invalid.com", ""] {
            let response = make_request(
                app.clone(),
                Method::PATCH,
                &path,
                json!({ "email": email }).to_string(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }

        // email already registered.
        let response = make_request(
            app,
            Method::PATCH,
            &path,
            json!({"email": "jack.doe@yahoo.com"}).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_patch_address() {
        let (state, id) = seeded().await;
        let app = app(state);

        let req_body = json!({
            "street": "Svobody",
            "city": "Kharkiv",
            "country": "Ukraine",
            "number": "7a"
        });
        let response = make_request(
            app.clone(),
            Method::PATCH,
            &format!("/users/{id}/address"),
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let address = info(response).await.address.unwrap();
        assert_eq!(address.street, "Svobody");
        assert_eq!(address.city, "Kharkiv");
        assert_eq!(address.country, "Ukraine");
        assert_eq!(address.number, "7a");

        let response = make_request(
            app,
            Method::PATCH,
            "/users/999/address",
            req_body.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_patch_phone() {
        let (state, id) = seeded().await;
        let app = app(state);

        let response = make_request(
            app.clone(),
            Method::PATCH,
            &format!("/users/{id}/phone"),
            json!({"phone": "+380931112233"}).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(info(response).await.phone.as_deref(), Some("+380931112233"));

        let response = make_request(
            app,
            Method::PATCH,
            &format!("/users/{id}/phone"),
            json!({"phone": "1"}).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
