//! Request and response bodies.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::user::Address;

/// Body of `POST /users`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserRegistrationForm {
    #[validate(custom(
        function = "crate::router::validate_email",
        message = "Email must be formatted."
    ))]
    pub email: String,
    #[validate(
        length(max = 255, message = "First name must be at most 255 characters long."),
        custom(function = "crate::router::not_blank", message = "First name must not be blank.")
    )]
    pub first_name: String,
    #[validate(
        length(max = 255, message = "Last name must be at most 255 characters long."),
        custom(function = "crate::router::not_blank", message = "Last name must not be blank.")
    )]
    pub last_name: String,
    #[validate(custom(
        function = "crate::router::validate_past",
        message = "Birth date must be in the past."
    ))]
    pub birth_date: NaiveDate,
    #[validate(nested)]
    pub address: Option<Address>,
    #[validate(length(min = 3, max = 32, message = "Phone must be 3 to 32 characters long."))]
    pub phone: Option<String>,
}

/// Body of `PUT /users/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateForm {
    #[validate(custom(
        function = "crate::router::validate_email",
        message = "Email must be formatted."
    ))]
    pub email: String,
    #[validate(
        length(max = 255, message = "First name must be at most 255 characters long."),
        custom(function = "crate::router::not_blank", message = "First name must not be blank.")
    )]
    pub first_name: String,
    #[validate(
        length(max = 255, message = "Last name must be at most 255 characters long."),
        custom(function = "crate::router::not_blank", message = "Last name must not be blank.")
    )]
    pub last_name: String,
    #[validate(custom(
        function = "crate::router::validate_past",
        message = "Birth date must be in the past."
    ))]
    pub birth_date: NaiveDate,
    #[validate(nested)]
    pub address: Option<Address>,
    #[validate(length(min = 3, max = 32, message = "Phone must be 3 to 32 characters long."))]
    pub phone: Option<String>,
}

/// Body of `PATCH /users/{id}/email`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateEmailForm {
    #[validate(custom(
        function = "crate::router::validate_email",
        message = "Email must be formatted."
    ))]
    pub email: String,
}

/// Body of `PATCH /users/{id}/phone`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdatePhoneForm {
    #[validate(length(min = 3, max = 32, message = "Phone must be 3 to 32 characters long."))]
    pub phone: String,
}

/// Query of `GET /users`.
///
/// Kept as raw strings: pagination falls back to defaults on bad input while
/// dates are strictly parsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub size: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Outward representation of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub address: Option<Address>,
    pub phone: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
