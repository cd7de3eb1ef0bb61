mod memory;
mod page;
mod range;
mod repository;
mod service;

pub use memory::*;
pub use page::*;
pub use range::*;
pub use repository::*;
pub use service::*;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User as saved on database.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    /// Assigned by the store on first save, never changed afterwards.
    pub id: Option<i64>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub address: Option<Address>,
    pub phone: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a not yet persisted [`User`].
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        birth_date: NaiveDate,
    ) -> Self {
        Self {
            id: None,
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            birth_date,
            address: None,
            phone: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Update `address` of [`User`].
    pub fn with_address(mut self, address: Address) -> Self {
        self.address = Some(address);
        self
    }

    /// Update `phone` of [`User`].
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Two users are the same entity only when both carry the same identifier.
impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id.is_some() && self.id == other.id
    }
}

/// Postal address owned by a [`User`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(custom(function = "crate::router::not_blank", message = "Street must not be blank."))]
    pub street: String,
    #[validate(custom(function = "crate::router::not_blank", message = "City must not be blank."))]
    pub city: String,
    #[validate(custom(function = "crate::router::not_blank", message = "Country must not be blank."))]
    pub country: String,
    /// Building number.
    #[validate(custom(function = "crate::router::not_blank", message = "Number must not be blank."))]
    pub number: String,
}
