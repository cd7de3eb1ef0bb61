use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::error::Result;
use crate::router::Valid;
use crate::router::model::{UserInfo, UserRegistrationForm};
use crate::user::UserService;

/// Handler to register user.
pub async fn handler(
    State(users): State<UserService>,
    Valid(body): Valid<UserRegistrationForm>,
) -> Result<(StatusCode, Json<UserInfo>)> {
    let user = users.save(body.into()).await?;

    Ok((StatusCode::CREATED, Json(UserInfo::try_from(user)?)))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use chrono::{Months, NaiveDate, Utc};
    use http_body_util::BodyExt;
    use serde_json::json;

    use super::*;
    use crate::*;

    fn years_ago(years: u32) -> NaiveDate {
        Utc::now()
            .date_naive()
            .checked_sub_months(Months::new(years * 12))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_handler() {
        let app = app(router::state());

        let req_body = json!({
            "email": "john.doe@gmail.com",
            "firstName": "John",
            "lastName": "Doe",
            "birthDate": years_ago(25),
            "address": {
                "street": "Khreshchatyk",
                "city": "Kyiv",
                "country": "Ukraine",
                "number": "22"
            },
            "phone": "+380501234567"
        });
        let response = make_request(app, Method::POST, "/users", req_body.to_string()).await;

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: UserInfo = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.id, 1);
        assert_eq!(body.email, "john.doe@gmail.com");
        assert_eq!(body.first_name, "John");
        assert_eq!(body.birth_date, years_ago(25));
        assert_eq!(body.address.unwrap().city, "Kyiv");
        assert!(body.created_at.is_some());
    }

    #[tokio::test]
    async fn test_create_with_invalid_form() {
        let app = app(router::state());

        for (email, first_name, last_name) in [
            ("@invalid.com", "John", "Doe"),
            ("invalid@email", "John", "Doe"),
            ("invalid.email.com", "John", "Doe"),
            ("", "John", "Doe"),
            ("valid@email.com", "", "Doe"),
            ("valid@email.com", "John", ""),
        ] {
            let req_body = json!({
                "email": email,
                "firstName": first_name,
                "lastName": last_name,
                "birthDate": "1990-01-01",
            });
            let response =
                make_request(app.clone(), Method::POST, "/users", req_body.to_string()).await;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let body = response.into_body().collect().await.unwrap().to_bytes();
            let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert!(body["message"].as_str().unwrap().contains("Validation failed"));
        }
    }

    #[tokio::test]
    async fn test_create_with_future_birth_date() {
        let app = app(router::state());
        let tomorrow = Utc::now().date_naive().succ_opt().unwrap();

        let req_body = json!({
            "email": "john.doe@gmail.com",
            "firstName": "John",
            "lastName": "Doe",
            "birthDate": tomorrow,
        });
        let response = make_request(app, Method::POST, "/users", req_body.to_string()).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_underage() {
        let app = app(router::state());

        let req_body = json!({
            "email": "kid@gmail.com",
            "firstName": "Kid",
            "lastName": "Doe",
            "birthDate": years_ago(10),
        });
        let response = make_request(app, Method::POST, "/users", req_body.to_string()).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            body["message"],
            "Users age must be greater than or equal to 18"
        );
    }

    #[tokio::test]
    async fn test_create_with_malformed_body() {
        let app = app(router::state());

        let response = make_request(
            app.clone(),
            Method::POST,
            "/users",
            r#"{"email": "john.doe@gmail.com""#.to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // missing birth date.
        let response = make_request(
            app,
            Method::POST,
            "/users",
            json!({"email": "john.doe@gmail.com", "firstName": "John", "lastName": "Doe"})
                .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
