//! Conversions between wire bodies and [`User`].
//!
//! Identifier and timestamps are never taken from a request body.

use crate::error::ServerError;
use crate::router::model::{UserInfo, UserRegistrationForm, UserUpdateForm};
use crate::user::User;

impl From<UserRegistrationForm> for User {
    fn from(form: UserRegistrationForm) -> Self {
        Self {
            address: form.address,
            phone: form.phone,
            ..User::new(form.email, form.first_name, form.last_name, form.birth_date)
        }
    }
}

impl From<UserUpdateForm> for User {
    fn from(form: UserUpdateForm) -> Self {
        Self {
            address: form.address,
            phone: form.phone,
            ..User::new(form.email, form.first_name, form.last_name, form.birth_date)
        }
    }
}

/// Only stored users, which carry an identifier, can be sent out.
impl TryFrom<User> for UserInfo {
    type Error = ServerError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        let id = user.id.ok_or_else(|| ServerError::Internal {
            details: "user without identifier cannot be sent".into(),
        })?;

        Ok(Self {
            id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            birth_date: user.birth_date,
            address: user.address,
            phone: user.phone,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use crate::user::Address;

    fn address() -> Address {
        Address {
            street: "Sumska".into(),
            city: "Kharkiv".into(),
            country: "Ukraine".into(),
            number: "3".into(),
        }
    }

    #[test]
    fn test_registration_form_to_user() {
        let form = UserRegistrationForm {
            email: "james.doe@meta.org".into(),
            first_name: "James".into(),
            last_name: "Doe".into(),
            birth_date: NaiveDate::from_ymd_opt(1985, 1, 1).unwrap(),
            address: Some(address()),
            phone: Some("+380501112233".into()),
        };

        let user = User::from(form.clone());
        assert_eq!(user.id, None);
        assert_eq!(user.created_at, None);
        assert_eq!(user.updated_at, None);
        assert_eq!(user.email, form.email);
        assert_eq!(user.first_name, form.first_name);
        assert_eq!(user.last_name, form.last_name);
        assert_eq!(user.birth_date, form.birth_date);
        assert_eq!(user.address, form.address);
        assert_eq!(user.phone, form.phone);
    }

    #[test]
    fn test_update_form_to_user() {
        let form = UserUpdateForm {
            email: "jane@ukr.net".into(),
            first_name: "Jane".into(),
            last_name: "Roe".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            address: None,
            phone: None,
        };

        let user = User::from(form);
        assert_eq!(user.id, None);
        assert!(user.address.is_none());
        assert_eq!(user.last_name, "Roe");
    }

    #[test]
    fn test_user_to_info_keeps_every_field() {
        let now = Utc::now();
        let mut user = User::new(
            "jack@gmail.com",
            "Jack",
            "Doe",
            NaiveDate::from_ymd_opt(1970, 3, 8).unwrap(),
        )
        .with_address(address())
        .with_phone("+380631234567");
        user.id = Some(3);
        user.created_at = Some(now);
        user.updated_at = Some(now);

        let info = UserInfo::try_from(user).unwrap();
        assert_eq!(info.id, 3);
        assert_eq!(info.email, "jack@gmail.com");
        assert_eq!(info.address, Some(address()));
        assert_eq!(info.phone.as_deref(), Some("+380631234567"));
        assert_eq!(info.created_at, Some(now));
        assert_eq!(info.updated_at, Some(now));
    }

    #[test]
    fn test_unsaved_user_is_rejected() {
        let user = User::new(
            "jack@gmail.com",
            "Jack",
            "Doe",
            NaiveDate::from_ymd_opt(1970, 3, 8).unwrap(),
        );

        assert!(matches!(
            UserInfo::try_from(user),
            Err(ServerError::Internal { .. })
        ));
    }
}
